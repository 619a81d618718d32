//! # labelset-core
//!
//! Shared primitives for labelset.
//!
//! This crate provides:
//! - [`Error`] / [`Result`] — the single error type used by every labelset crate
//! - [`ImageTensor`] — a planar `[C, H, W]` float image buffer

pub mod error;
pub mod tensor;

pub use error::{BoxError, Error, Result};
pub use tensor::ImageTensor;

//! # labelset-data
//!
//! Image datasets with CSV label tables, transforms, and batching.
//!
//! This crate provides:
//! - [`Dataset`] trait — count plus fallible indexed retrieval
//! - [`ImageCsvDataset`] — images under a root directory, labels in a sidecar CSV
//! - [`LabelTable`] — the parsed `filename,label` rows
//! - [`Transform`] — per-access image and label transforms (closures included)
//! - [`DataLoader`] — batching, shuffling, optional worker threads
//   - SubsetDataset and random_split with reproducible seeding
//   - ProviderConfig for describing a dataset in TOML

pub mod combinators;
pub mod config;
pub mod dataset;
pub mod image_csv;
pub mod label_table;
pub mod loader;
pub mod transform;

pub use combinators::{random_split, SubsetDataset};
pub use config::ProviderConfig;
pub use dataset::{check_index, resolve_index, Dataset, Sample};
pub use image_csv::ImageCsvDataset;
pub use label_table::{LabelRow, LabelTable, LabelTableConfig};
pub use loader::{Batch, BatchIterator, DataLoader, DataLoaderConfig};
pub use transform::{
    Grayscale, Identity, Normalize, OneHot, Resize, Then, ToTensor, Transform, TransformExt,
};

pub use labelset_core::{Error, ImageTensor, Result};

// ImageTensor — a planar float image buffer
//
// Pixels are stored in [C, H, W] layout, row-major within each channel, so a
// batch of them can be stacked into a [N, C, H, W] array by concatenation.

use crate::error::{Error, Result};

/// A decoded image as a dense `f32` buffer in `[C, H, W]` layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Vec<f32>,
    shape: [usize; 3],
}

impl ImageTensor {
    /// Build a tensor from planar data.
    ///
    /// Fails if `data.len()` does not equal `C * H * W`.
    pub fn new(data: Vec<f32>, shape: [usize; 3]) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(Error::msg(format!(
                "ImageTensor: shape {shape:?} requires {expected} elements, got {}",
                data.len()
            )));
        }
        Ok(Self { data, shape })
    }

    /// Convert interleaved `[H, W, C]` bytes into a planar tensor scaled to `[0, 1]`.
    pub fn from_interleaved_u8(
        raw: &[u8],
        channels: usize,
        height: usize,
        width: usize,
    ) -> Result<Self> {
        let npix = height * width;
        if raw.len() != npix * channels {
            return Err(Error::msg(format!(
                "ImageTensor: {} bytes do not fit {channels}x{height}x{width}",
                raw.len()
            )));
        }
        let mut data = vec![0.0f32; channels * npix];
        for i in 0..npix {
            for c in 0..channels {
                data[c * npix + i] = raw[i * channels + c] as f32 / 255.0;
            }
        }
        Ok(Self {
            data,
            shape: [channels, height, width],
        })
    }

    /// `[C, H, W]`.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn channels(&self) -> usize {
        self.shape[0]
    }

    pub fn height(&self) -> usize {
        self.shape[1]
    }

    pub fn width(&self) -> usize {
        self.shape[2]
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Mutable view of one channel plane.
    pub fn channel_mut(&mut self, c: usize) -> &mut [f32] {
        let plane = self.shape[1] * self.shape[2];
        &mut self.data[c * plane..(c + 1) * plane]
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }
}

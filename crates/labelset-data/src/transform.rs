// Transform — per-access preprocessing of samples and labels
//
// A transform is any value that turns an input into an output, possibly
// failing. Closures of the form `Fn(In) -> Result<Out>` qualify directly, so
// callers rarely need to define their own types:
//
//   let ds = ImageCsvDataset::new("labels.csv", "images")?
//       .with_transform(Resize::new(28, 28).then(ToTensor))
//       .with_target_transform(|y: usize| Ok(y as f32));
//
// Transforms are applied fresh on every `get`; results are never cached.

use image::imageops::FilterType;
use image::DynamicImage;

use labelset_core::{Error, ImageTensor, Result};

/// A pure, fallible function from `In` to [`Transform::Output`].
pub trait Transform<In>: Send + Sync {
    type Output;

    /// Apply the transform. Errors are surfaced to the caller unchanged.
    fn apply(&self, input: In) -> Result<Self::Output>;
}

impl<In, Out, F> Transform<In> for F
where
    F: Fn(In) -> Result<Out> + Send + Sync,
{
    type Output = Out;

    fn apply(&self, input: In) -> Result<Out> {
        self(input)
    }
}

/// Chaining helper available on every transform.
pub trait TransformExt<In>: Transform<In> + Sized {
    /// Run `self`, then feed its output to `next`.
    fn then<B>(self, next: B) -> Then<Self, B>
    where
        B: Transform<Self::Output>,
    {
        Then {
            first: self,
            second: next,
        }
    }
}

impl<In, T: Transform<In>> TransformExt<In> for T {}

/// Two transforms run in sequence. Built by [`TransformExt::then`].
#[derive(Debug, Clone)]
pub struct Then<A, B> {
    first: A,
    second: B,
}

impl<In, A, B> Transform<In> for Then<A, B>
where
    A: Transform<In>,
    B: Transform<A::Output>,
{
    type Output = B::Output;

    fn apply(&self, input: In) -> Result<B::Output> {
        self.second.apply(self.first.apply(input)?)
    }
}

// Built-in transforms

/// Passes its input through untouched. Stands in for "no transform".
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<T> Transform<T> for Identity {
    type Output = T;

    fn apply(&self, input: T) -> Result<T> {
        Ok(input)
    }
}

/// Resize images to exactly (width, height) using a Lanczos3 filter.
#[derive(Debug, Clone, Copy)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
}

impl Resize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Transform<DynamicImage> for Resize {
    type Output = DynamicImage;

    fn apply(&self, img: DynamicImage) -> Result<DynamicImage> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::msg(format!(
                "Resize: target size {}x{} must be non-zero",
                self.width, self.height
            )));
        }
        Ok(img.resize_exact(self.width, self.height, FilterType::Lanczos3))
    }
}

/// Convert images to 8-bit grayscale (1 channel).
#[derive(Debug, Clone, Copy, Default)]
pub struct Grayscale;

impl Transform<DynamicImage> for Grayscale {
    type Output = DynamicImage;

    fn apply(&self, img: DynamicImage) -> Result<DynamicImage> {
        Ok(DynamicImage::ImageLuma8(img.to_luma8()))
    }
}

/// Convert an image into an [`ImageTensor`] with values in `[0, 1]`.
///
/// Images without colour become 1-channel tensors; everything else is
/// converted to RGB (alpha dropped).
#[derive(Debug, Clone, Copy, Default)]
pub struct ToTensor;

impl Transform<DynamicImage> for ToTensor {
    type Output = ImageTensor;

    fn apply(&self, img: DynamicImage) -> Result<ImageTensor> {
        let (w, h) = (img.width() as usize, img.height() as usize);
        if img.color().has_color() {
            let rgb = img.to_rgb8();
            ImageTensor::from_interleaved_u8(rgb.as_raw(), 3, h, w)
        } else {
            let gray = img.to_luma8();
            ImageTensor::from_interleaved_u8(gray.as_raw(), 1, h, w)
        }
    }
}

/// Standardize each channel: `x = (x - mean[c]) / std[c]`.
///
/// A single mean/std value is broadcast to every channel.
#[derive(Debug, Clone)]
pub struct Normalize {
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl Normalize {
    pub fn new(mean: Vec<f32>, std: Vec<f32>) -> Self {
        Self { mean, std }
    }

    fn stat(values: &[f32], c: usize, channels: usize) -> Result<f32> {
        match values.len() {
            1 => Ok(values[0]),
            n if n == channels => Ok(values[c]),
            n => Err(Error::ChannelMismatch {
                expected: n,
                got: channels,
            }),
        }
    }
}

impl Transform<ImageTensor> for Normalize {
    type Output = ImageTensor;

    fn apply(&self, mut t: ImageTensor) -> Result<ImageTensor> {
        let channels = t.channels();
        for c in 0..channels {
            let mean = Self::stat(&self.mean, c, channels)?;
            let std = Self::stat(&self.std, c, channels)?;
            if std == 0.0 {
                return Err(Error::msg(format!("Normalize: std for channel {c} is zero")));
            }
            for v in t.channel_mut(c) {
                *v = (*v - mean) / std;
            }
        }
        Ok(t)
    }
}

/// One-hot encode a class index into a vector of size `num_classes`.
#[derive(Debug, Clone, Copy)]
pub struct OneHot {
    pub num_classes: usize,
}

impl OneHot {
    pub fn new(num_classes: usize) -> Self {
        Self { num_classes }
    }
}

impl Transform<usize> for OneHot {
    type Output = Vec<f32>;

    fn apply(&self, label: usize) -> Result<Vec<f32>> {
        if label >= self.num_classes {
            return Err(Error::ClassOutOfRange {
                label,
                num_classes: self.num_classes,
            });
        }
        let mut one_hot = vec![0.0; self.num_classes];
        one_hot[label] = 1.0;
        Ok(one_hot)
    }
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn rgb(w: u32, h: u32, px: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(px)))
    }

    #[test]
    fn closures_are_transforms() {
        let double = |x: usize| -> Result<usize> { Ok(x * 2) };
        assert_eq!(double.apply(4).unwrap(), 8);
    }

    #[test]
    fn then_runs_in_order() {
        let add = |x: i32| -> Result<i32> { Ok(x + 1) };
        let mul = |x: i32| -> Result<i32> { Ok(x * 10) };
        assert_eq!(add.then(mul).apply(1).unwrap(), 20);
    }

    #[test]
    fn then_stops_at_first_error() {
        let fail = |_: i32| -> Result<i32> { Err(Error::transform("nope")) };
        let unreachable = |_: i32| -> Result<i32> { panic!("second stage ran") };
        assert!(matches!(
            fail.then(unreachable).apply(0),
            Err(Error::Transform(_))
        ));
    }

    #[test]
    fn identity_passthrough() {
        assert_eq!(Identity.apply(7usize).unwrap(), 7);
    }

    #[test]
    fn resize_exact() {
        let out = Resize::new(4, 2).apply(rgb(9, 9, [1, 2, 3])).unwrap();
        assert_eq!((out.width(), out.height()), (4, 2));
        assert!(Resize::new(0, 2).apply(rgb(1, 1, [0, 0, 0])).is_err());
    }

    #[test]
    fn grayscale_then_tensor_has_one_channel() {
        let t = Grayscale
            .then(ToTensor)
            .apply(rgb(3, 2, [255, 255, 255]))
            .unwrap();
        assert_eq!(t.shape(), [1, 2, 3]);
        assert!(t.data().iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn to_tensor_rgb_is_planar() {
        let t = ToTensor.apply(rgb(2, 2, [255, 0, 0])).unwrap();
        assert_eq!(t.shape(), [3, 2, 2]);
        assert_eq!(&t.data()[0..4], &[1.0; 4]);
        assert_eq!(&t.data()[4..12], &[0.0; 8]);
    }

    #[test]
    fn to_tensor_luma() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 1, Luma([0])));
        let t = ToTensor.apply(img).unwrap();
        assert_eq!(t.shape(), [1, 1, 2]);
    }

    #[test]
    fn normalize_per_channel() {
        let t = ImageTensor::new(vec![0.5, 0.5, 1.0, 1.0], [2, 1, 2]).unwrap();
        let n = Normalize::new(vec![0.5, 0.0], vec![0.5, 2.0]);
        let out = n.apply(t).unwrap();
        assert_eq!(out.data(), &[0.0, 0.0, 0.5, 0.5]);
    }

    #[test]
    fn normalize_broadcast_and_mismatch() {
        let t = ImageTensor::new(vec![1.0; 6], [3, 1, 2]).unwrap();
        let out = Normalize::new(vec![0.5], vec![0.5]).apply(t.clone()).unwrap();
        assert!(out.data().iter().all(|&v| (v - 1.0).abs() < 1e-6));

        let err = Normalize::new(vec![0.0, 0.0], vec![1.0, 1.0])
            .apply(t)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ChannelMismatch {
                expected: 2,
                got: 3
            }
        ));
    }

    #[test]
    fn one_hot_single_nonzero() {
        let v = OneHot::new(10).apply(3).unwrap();
        assert_eq!(v.len(), 10);
        assert_eq!(v.iter().filter(|&&x| x != 0.0).count(), 1);
        assert_eq!(v[3], 1.0);
    }

    #[test]
    fn one_hot_out_of_range() {
        assert!(matches!(
            OneHot::new(3).apply(3),
            Err(Error::ClassOutOfRange {
                label: 3,
                num_classes: 3
            })
        ));
    }
}

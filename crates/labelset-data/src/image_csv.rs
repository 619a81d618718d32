// ImageCsvDataset — images in a directory, labels in a sidecar CSV
//
//   root/
//     tshirt1.jpg
//     trouser7.png
//     ...
//   labels.csv:
//     tshirt1.jpg,0
//     trouser7.png,1
//
// Only the label table is read at construction. Image files are opened and
// decoded on each `get`, so memory stays bounded to the samples in flight and
// a missing file only surfaces when its row is requested.
//
// USAGE:
//
//   let ds = ImageCsvDataset::new("data/labels.csv", "data/images")?
//       .with_transform(ToTensor)
//       .with_target_transform(OneHot::new(10));
//   let sample = ds.get(0)?;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::DynamicImage;

use labelset_core::{Error, Result};

use crate::dataset::{check_index, Dataset, Sample};
use crate::label_table::{LabelTable, LabelTableConfig};
use crate::transform::{Identity, Transform};

/// An image classification dataset backed by a label table.
///
/// `T` transforms the decoded image and `U` transforms the integer label.
/// Both default to [`Identity`], i.e. no transform configured.
#[derive(Debug, Clone)]
pub struct ImageCsvDataset<T = Identity, U = Identity> {
    table: LabelTable,
    root: PathBuf,
    transform: T,
    target_transform: U,
}

impl ImageCsvDataset {
    /// Load the label table at `labels` (default format) for images under `root`.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(labels: P, root: Q) -> Result<Self> {
        Self::with_config(labels, root, &LabelTableConfig::default())
    }

    /// Like [`ImageCsvDataset::new`] with a custom table format.
    pub fn with_config<P: AsRef<Path>, Q: AsRef<Path>>(
        labels: P,
        root: Q,
        config: &LabelTableConfig,
    ) -> Result<Self> {
        let table = LabelTable::load_with(labels, config)?;
        Ok(Self::from_table(table, root))
    }

    /// Wrap a label table that is already in memory.
    pub fn from_table<Q: AsRef<Path>>(table: LabelTable, root: Q) -> Self {
        ImageCsvDataset {
            table,
            root: root.as_ref().to_path_buf(),
            transform: Identity,
            target_transform: Identity,
        }
    }
}

impl<T, U> ImageCsvDataset<T, U> {
    /// Set the image transform, replacing any previous one.
    pub fn with_transform<T2>(self, transform: T2) -> ImageCsvDataset<T2, U> {
        ImageCsvDataset {
            table: self.table,
            root: self.root,
            transform,
            target_transform: self.target_transform,
        }
    }

    /// Set the label transform, replacing any previous one.
    pub fn with_target_transform<U2>(self, target_transform: U2) -> ImageCsvDataset<T, U2> {
        ImageCsvDataset {
            table: self.table,
            root: self.root,
            transform: self.transform,
            target_transform,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table(&self) -> &LabelTable {
        &self.table
    }

    /// Number of classes implied by the labels (max label + 1).
    pub fn num_classes(&self) -> usize {
        self.table.num_classes()
    }

    /// Full path of the i-th sample.
    pub fn path_of(&self, index: usize) -> Result<PathBuf> {
        check_index(index, self.table.len())?;
        Ok(self.root.join(&self.table.rows()[index].file))
    }

    /// Raw (untransformed) label of the i-th sample. No file I/O.
    pub fn label_of(&self, index: usize) -> Result<usize> {
        check_index(index, self.table.len())?;
        Ok(self.table.rows()[index].label)
    }

    /// Read and decode the i-th image without applying any transform.
    pub fn load_image(&self, index: usize) -> Result<DynamicImage> {
        let path = self.path_of(index)?;
        let bytes = fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.clone()),
            _ => Error::Io(e),
        })?;
        image::load_from_memory(&bytes).map_err(|e| Error::Decode {
            path,
            reason: e.to_string(),
        })
    }
}

impl<T, U> Dataset for ImageCsvDataset<T, U>
where
    T: Transform<DynamicImage>,
    U: Transform<usize>,
{
    type Item = Sample<T::Output, U::Output>;

    fn len(&self) -> usize {
        self.table.len()
    }

    fn get(&self, index: usize) -> Result<Self::Item> {
        let img = self.load_image(index)?;
        let label = self.table.rows()[index].label;
        log::trace!("loaded sample {index} (label {label})");

        let input = self.transform.apply(img)?;
        let target = self.target_transform.apply(label)?;
        Ok(Sample { input, target })
    }

    fn name(&self) -> &str {
        "ImageCsvDataset"
    }
}

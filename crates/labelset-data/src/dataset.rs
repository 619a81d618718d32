// Dataset trait — unified interface for any indexed data source

use labelset_core::{Error, Result};

/// A single retrieved record: an input and its target, always taken from the
/// same row.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<X, Y> {
    /// The (possibly transformed) input, e.g. a decoded image.
    pub input: X,
    /// The (possibly transformed) label.
    pub target: Y,
}

impl<X, Y> Sample<X, Y> {
    pub fn new(input: X, target: Y) -> Self {
        Self { input, target }
    }

    pub fn into_parts(self) -> (X, Y) {
        (self.input, self.target)
    }
}

/// A dataset is an indexed collection of samples.
///
/// Implementations must be `Send + Sync` so a loader can read from multiple
/// threads. `get` must only read shared state: two calls with different
/// indices may run concurrently, and repeated calls with the same index must
/// produce equal results.
pub trait Dataset: Send + Sync {
    /// What a successful retrieval yields.
    type Item;

    /// Total number of samples in the dataset.
    fn len(&self) -> usize;

    /// Whether the dataset is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieve the sample at position `index`.
    ///
    /// Fails with [`Error::OutOfBounds`] if `index >= self.len()`.
    fn get(&self, index: usize) -> Result<Self::Item>;

    /// Retrieve with a signed index. Negative indices never wrap around.
    fn get_signed(&self, index: i64) -> Result<Self::Item> {
        let index = resolve_index(index, self.len())?;
        self.get(index)
    }

    /// Optional human-readable name.
    fn name(&self) -> &str {
        "dataset"
    }
}

impl<D: Dataset + ?Sized> Dataset for std::sync::Arc<D> {
    type Item = D::Item;

    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Result<Self::Item> {
        (**self).get(index)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Fail with [`Error::OutOfBounds`] unless `index < len`.
pub fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::OutOfBounds {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            len,
        })
    }
}

/// Convert a signed index into `[0, len)`.
pub fn resolve_index(index: i64, len: usize) -> Result<usize> {
    match usize::try_from(index) {
        Ok(i) if i < len => Ok(i),
        _ => Err(Error::OutOfBounds { index, len }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_index_rejects_negative() {
        assert_eq!(resolve_index(0, 2).unwrap(), 0);
        assert_eq!(resolve_index(1, 2).unwrap(), 1);
        assert!(resolve_index(2, 2).unwrap_err().is_out_of_bounds());
        match resolve_index(-1, 2) {
            Err(Error::OutOfBounds { index, len }) => {
                assert_eq!(index, -1);
                assert_eq!(len, 2);
            }
            other => panic!("expected OutOfBounds, got {other:?}"),
        }
    }

    #[test]
    fn check_index_empty() {
        assert!(check_index(0, 0).is_err());
    }
}

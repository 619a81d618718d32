// Dataset Combinators — subsets and reproducible splits

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use labelset_core::{bail, Error, Result};

use crate::dataset::{check_index, Dataset};

// SubsetDataset — view of selected indices

/// A dataset that exposes only the samples at the given indices.
///
/// Useful for train/val/test splitting.
pub struct SubsetDataset<D: Dataset> {
    inner: D,
    indices: Vec<usize>,
}

impl<D: Dataset> SubsetDataset<D> {
    /// Create a subset of `inner` containing only the samples at `indices`.
    ///
    /// Fails if any index is outside `inner`.
    pub fn new(inner: D, indices: Vec<usize>) -> Result<Self> {
        let len = inner.len();
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(Error::OutOfBounds {
                index: i64::try_from(bad).unwrap_or(i64::MAX),
                len,
            });
        }
        Ok(Self { inner, indices })
    }

    /// Positions in the inner dataset, in subset order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: Dataset> Dataset for SubsetDataset<D> {
    type Item = D::Item;

    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<D::Item> {
        check_index(index, self.indices.len())?;
        self.inner.get(self.indices[index])
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

// Train / Validation / Test Split

/// Split a dataset into 2 or 3 disjoint subsets.
///
/// `ratios` must sum to 1.0, e.g. `[0.8, 0.2]` or `[0.7, 0.15, 0.15]`.
/// The last split receives whatever is left after rounding. Indices are
/// shuffled with `seed`, so the same seed always yields the same split.
pub fn random_split<D: Dataset>(
    dataset: Arc<D>,
    ratios: &[f64],
    seed: u64,
) -> Result<Vec<SubsetDataset<Arc<D>>>> {
    if !(2..=3).contains(&ratios.len()) {
        bail!("random_split: ratios must have 2 or 3 elements, got {}", ratios.len());
    }
    if ratios.iter().any(|&r| !(0.0..=1.0).contains(&r)) {
        bail!("random_split: ratios must lie in [0, 1], got {ratios:?}");
    }
    let sum: f64 = ratios.iter().sum();
    if (sum - 1.0).abs() > 1e-6 {
        bail!("random_split: ratios must sum to 1.0, got {sum}");
    }

    let n = dataset.len();
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let mut splits = Vec::with_capacity(ratios.len());
    let mut offset = 0;
    for (i, &ratio) in ratios.iter().enumerate() {
        let count = if i == ratios.len() - 1 {
            n - offset
        } else {
            (n as f64 * ratio).round() as usize
        };
        let end = (offset + count).min(n);
        splits.push(SubsetDataset::new(
            Arc::clone(&dataset),
            indices[offset..end].to_vec(),
        )?);
        offset = end;
    }
    log::debug!(
        "split {} samples into {:?}",
        n,
        splits.iter().map(|s| s.len()).collect::<Vec<_>>()
    );

    Ok(splits)
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;

    /// Tiny helper dataset: item i is i itself.
    struct Range(usize);

    impl Dataset for Range {
        type Item = usize;
        fn len(&self) -> usize {
            self.0
        }
        fn get(&self, index: usize) -> Result<usize> {
            check_index(index, self.0)?;
            Ok(index)
        }
    }

    #[test]
    fn subset_dataset() {
        let sub = SubsetDataset::new(Range(10), vec![2, 5, 7]).unwrap();
        assert_eq!(sub.len(), 3);
        assert_eq!(sub.get(0).unwrap(), 2);
        assert_eq!(sub.get(2).unwrap(), 7);
        assert!(sub.get(3).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn subset_rejects_bad_indices() {
        assert!(SubsetDataset::new(Range(3), vec![0, 3]).is_err());
    }

    #[test]
    fn split_two_way() {
        let splits = random_split(Arc::new(Range(100)), &[0.8, 0.2], 42).unwrap();
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].len(), 80);
        assert_eq!(splits[1].len(), 20);

        let mut all: Vec<usize> = splits
            .iter()
            .flat_map(|s| s.indices().to_vec())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn split_three_way_covers_everything() {
        let splits = random_split(Arc::new(Range(101)), &[0.7, 0.15, 0.15], 1).unwrap();
        assert_eq!(splits.iter().map(|s| s.len()).sum::<usize>(), 101);
    }

    #[test]
    fn split_reproducible() {
        let a = random_split(Arc::new(Range(50)), &[0.5, 0.5], 123).unwrap();
        let b = random_split(Arc::new(Range(50)), &[0.5, 0.5], 123).unwrap();
        assert_eq!(a[0].indices(), b[0].indices());
    }

    #[test]
    fn split_rejects_bad_ratios() {
        assert!(random_split(Arc::new(Range(10)), &[1.0], 0).is_err());
        assert!(random_split(Arc::new(Range(10)), &[0.5, 0.4], 0).is_err());
    }
}

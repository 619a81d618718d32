// DataLoader — batching, shuffling, iteration
//
// A thin consumer of the Dataset contract: it only calls `len` and `get`.
// Samples of a batch are fetched sequentially, or concurrently on a dedicated
// rayon pool when `num_workers > 0`. Either way a batch keeps index order.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use rayon::prelude::*;

use labelset_core::{bail, Error, Result};

use crate::dataset::{Dataset, Sample};

/// Configuration for the DataLoader.
#[derive(Debug, Clone)]
pub struct DataLoaderConfig {
    /// Number of samples per batch.
    pub batch_size: usize,
    /// Whether to shuffle indices each pass.
    pub shuffle: bool,
    /// Whether to drop the last incomplete batch.
    pub drop_last: bool,
    /// Number of worker threads for sample fetching (0 = sequential).
    pub num_workers: usize,
    /// Optional random seed for reproducible shuffling.
    pub seed: Option<u64>,
}

impl Default for DataLoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            shuffle: true,
            drop_last: false,
            num_workers: 0,
            seed: None,
        }
    }
}

impl DataLoaderConfig {
    pub fn batch_size(mut self, bs: usize) -> Self {
        self.batch_size = bs;
        self
    }

    pub fn shuffle(mut self, s: bool) -> Self {
        self.shuffle = s;
        self
    }

    pub fn drop_last(mut self, d: bool) -> Self {
        self.drop_last = d;
        self
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = n;
        self
    }

    pub fn seed(mut self, s: u64) -> Self {
        self.seed = Some(s);
        self
    }
}

/// A group of samples split into parallel input and target collections.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<X, Y> {
    pub inputs: Vec<X>,
    pub targets: Vec<Y>,
}

impl<X, Y> Batch<X, Y> {
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl<X, Y> FromIterator<Sample<X, Y>> for Batch<X, Y> {
    fn from_iter<I: IntoIterator<Item = Sample<X, Y>>>(iter: I) -> Self {
        let (inputs, targets) = iter.into_iter().map(Sample::into_parts).unzip();
        Batch { inputs, targets }
    }
}

/// A DataLoader wraps a Dataset and produces batches.
pub struct DataLoader<'a, D: Dataset> {
    dataset: &'a D,
    config: DataLoaderConfig,
    indices: Vec<usize>,
    rng: StdRng,
    pool: Option<rayon::ThreadPool>,
}

impl<'a, D: Dataset> DataLoader<'a, D> {
    /// Create a new DataLoader over a dataset.
    pub fn new(dataset: &'a D, config: DataLoaderConfig) -> Result<Self> {
        if config.batch_size == 0 {
            bail!("DataLoader: batch_size must be at least 1");
        }
        let pool = if config.num_workers > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.num_workers)
                .thread_name(|i| format!("labelset-worker-{i}"))
                .build()
                .map_err(|e| Error::msg(format!("DataLoader: failed to start workers: {e}")))?;
            Some(pool)
        } else {
            None
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        log::debug!(
            "DataLoader over {} ({} samples, batch_size {}, {} workers)",
            dataset.name(),
            dataset.len(),
            config.batch_size,
            config.num_workers
        );
        Ok(Self {
            dataset,
            indices: (0..dataset.len()).collect(),
            config,
            rng,
            pool,
        })
    }

    /// The number of batches per pass.
    pub fn num_batches(&self) -> usize {
        if self.config.drop_last {
            self.dataset.len() / self.config.batch_size
        } else {
            self.dataset.len().div_ceil(self.config.batch_size)
        }
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Reshuffle indices (called at the start of each pass).
    pub fn reshuffle(&mut self) {
        if self.config.shuffle {
            self.indices.shuffle(&mut self.rng);
        }
    }

    /// Sample order of the current pass.
    pub fn order(&self) -> &[usize] {
        &self.indices
    }
}

impl<'a, D, X, Y> DataLoader<'a, D>
where
    D: Dataset<Item = Sample<X, Y>>,
    X: Send,
    Y: Send,
{
    /// Fetch the given samples. The first failure fails the whole batch.
    fn fetch(&self, indices: &[usize]) -> Result<Batch<X, Y>> {
        let samples: Vec<Sample<X, Y>> = match &self.pool {
            Some(pool) if indices.len() > 1 => pool.install(|| {
                indices
                    .par_iter()
                    .map(|&i| self.dataset.get(i))
                    .collect::<Result<Vec<_>>>()
            })?,
            _ => indices
                .iter()
                .map(|&i| self.dataset.get(i))
                .collect::<Result<Vec<_>>>()?,
        };
        Ok(samples.into_iter().collect())
    }

    /// Start a new pass over the dataset, reshuffling if enabled.
    ///
    /// Every pass advances the loader's RNG, so a seeded loader visits samples
    /// in a different order on its second pass. Two loaders built with the
    /// same seed still produce the same sequence of passes.
    pub fn iter(&mut self) -> BatchIterator<'_, 'a, D> {
        self.reshuffle();
        BatchIterator {
            loader: self,
            batch_idx: 0,
        }
    }

    /// Collect one full pass into memory.
    pub fn epoch_batches(&mut self) -> Result<Vec<Batch<X, Y>>> {
        self.iter().collect()
    }
}

/// Iterator that yields one batch at a time.
pub struct BatchIterator<'l, 'a, D: Dataset> {
    loader: &'l DataLoader<'a, D>,
    batch_idx: usize,
}

impl<'l, 'a, D, X, Y> Iterator for BatchIterator<'l, 'a, D>
where
    D: Dataset<Item = Sample<X, Y>>,
    X: Send,
    Y: Send,
{
    type Item = Result<Batch<X, Y>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.batch_idx >= self.loader.num_batches() {
            return None;
        }
        let bs = self.loader.config.batch_size;
        let n = self.loader.dataset.len();
        let start = self.batch_idx * bs;
        let end = (start + bs).min(n);
        self.batch_idx += 1;

        Some(self.loader.fetch(&self.loader.indices[start..end]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.loader.num_batches() - self.batch_idx;
        (left, Some(left))
    }
}

impl<'l, 'a, D, X, Y> ExactSizeIterator for BatchIterator<'l, 'a, D>
where
    D: Dataset<Item = Sample<X, Y>>,
    X: Send,
    Y: Send,
{
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::check_index;

    /// Sample i has input i and target i % 3.
    struct Toy(usize);

    impl Dataset for Toy {
        type Item = Sample<usize, usize>;
        fn len(&self) -> usize {
            self.0
        }
        fn get(&self, index: usize) -> Result<Self::Item> {
            check_index(index, self.0)?;
            if index == 13 {
                return Err(Error::msg("unlucky"));
            }
            Ok(Sample::new(index, index % 3))
        }
    }

    #[test]
    fn num_batches() {
        let ds = Toy(10);
        let cfg = DataLoaderConfig::default().batch_size(3).shuffle(false);
        assert_eq!(DataLoader::new(&ds, cfg.clone()).unwrap().num_batches(), 4);
        let cfg = cfg.drop_last(true);
        assert_eq!(DataLoader::new(&ds, cfg).unwrap().num_batches(), 3);
    }

    #[test]
    fn sequential_batches_in_order() {
        let ds = Toy(5);
        let cfg = DataLoaderConfig::default().batch_size(2).shuffle(false);
        let mut loader = DataLoader::new(&ds, cfg).unwrap();
        let batches = loader.epoch_batches().unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].inputs, vec![0, 1]);
        assert_eq!(batches[0].targets, vec![0, 1]);
        assert_eq!(batches[2].inputs, vec![4]);
    }

    #[test]
    fn parallel_matches_sequential() {
        let ds = Toy(12);
        let seq_cfg = DataLoaderConfig::default().batch_size(4).seed(7);
        let par_cfg = seq_cfg.clone().num_workers(3);
        let seq = DataLoader::new(&ds, seq_cfg).unwrap().epoch_batches().unwrap();
        let par = DataLoader::new(&ds, par_cfg).unwrap().epoch_batches().unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn shuffle_is_a_permutation_and_reproducible() {
        let ds = Toy(12);
        let cfg = DataLoaderConfig::default().batch_size(5).seed(99);
        let mut a = DataLoader::new(&ds, cfg.clone()).unwrap();
        let mut b = DataLoader::new(&ds, cfg).unwrap();

        let first: Vec<usize> = a.iter().flat_map(|batch| batch.unwrap().inputs).collect();
        let again: Vec<usize> = b.iter().flat_map(|batch| batch.unwrap().inputs).collect();
        assert_eq!(first, again);

        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn restartable() {
        let ds = Toy(6);
        let cfg = DataLoaderConfig::default().batch_size(4).shuffle(false);
        let mut loader = DataLoader::new(&ds, cfg).unwrap();
        assert_eq!(loader.iter().count(), 2);
        assert_eq!(loader.iter().count(), 2);
    }

    #[test]
    fn failing_sample_fails_batch() {
        let ds = Toy(16);
        let cfg = DataLoaderConfig::default()
            .batch_size(4)
            .shuffle(false)
            .num_workers(2);
        let mut loader = DataLoader::new(&ds, cfg).unwrap();
        let results: Vec<_> = loader.iter().collect();
        assert!(results[0].is_ok());
        assert!(results[3].is_err());
    }

    #[test]
    fn seeded_passes_differ_but_repeat_across_loaders() {
        let ds = Toy(12);
        let cfg = DataLoaderConfig::default().batch_size(12).seed(3);
        let mut a = DataLoader::new(&ds, cfg.clone()).unwrap();
        let mut b = DataLoader::new(&ds, cfg).unwrap();

        let a1 = a.epoch_batches().unwrap();
        let a2 = a.epoch_batches().unwrap();
        let b1 = b.epoch_batches().unwrap();
        let b2 = b.epoch_batches().unwrap();
        assert_ne!(a1, a2);
        assert_eq!((a1, a2), (b1, b2));
    }

    #[test]
    fn zero_batch_size_rejected() {
        let ds = Toy(1);
        assert!(DataLoader::new(&ds, DataLoaderConfig::default().batch_size(0)).is_err());
    }
}

// =============================================================================
// inspect — report the contents of an image/CSV dataset
// =============================================================================
//
// Loads an ImageCsvDataset either from a TOML config or from flags, then
// decodes every sample (optionally on worker threads) and prints per-class
// counts plus any rows that failed to load.
//
// Usage:
//   cargo run -p inspect-demo -- --config data/dataset.toml
//   cargo run -p inspect-demo -- --labels data/labels.csv --root data/images
//   RUST_LOG=debug cargo run -p inspect-demo -- --config data/dataset.toml --workers 4

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use labelset_data::{
    DataLoader, DataLoaderConfig, Dataset, ImageCsvDataset, ProviderConfig, Result,
};

#[derive(Debug, Parser)]
#[command(name = "inspect", about = "Inspect an image dataset described by a CSV label table")]
struct Args {
    /// TOML file with `labels` and `root` keys.
    #[arg(long, conflicts_with_all = ["labels", "root"])]
    config: Option<PathBuf>,

    /// Label table (`filename,label` rows).
    #[arg(long, requires = "root")]
    labels: Option<PathBuf>,

    /// Directory the label table's filenames are relative to.
    #[arg(long, requires = "labels")]
    root: Option<PathBuf>,

    /// Skip the first row of the label table.
    #[arg(long)]
    has_header: bool,

    /// Samples decoded per batch.
    #[arg(long, default_value_t = 64)]
    batch_size: usize,

    /// Worker threads used to decode a batch (0 = sequential).
    #[arg(long, default_value_t = 0)]
    workers: usize,

    /// Print the first N rows.
    #[arg(long, default_value_t = 5)]
    show: usize,
}

fn provider_config(args: &Args) -> Result<ProviderConfig> {
    match (&args.config, &args.labels, &args.root) {
        (Some(path), _, _) => ProviderConfig::load(path),
        (None, Some(labels), Some(root)) => {
            let mut cfg = ProviderConfig::new(labels.clone(), root.clone());
            cfg.has_header = args.has_header;
            Ok(cfg)
        }
        _ => Err(labelset_data::Error::Config(
            "pass either --config or both --labels and --root".to_string(),
        )),
    }
}

fn run(args: &Args) -> Result<bool> {
    let cfg = provider_config(args)?;
    let ds: ImageCsvDataset = cfg.open()?;

    println!("root:     {}", ds.root().display());
    println!("samples:  {}", ds.len());
    println!("classes:  {}", ds.num_classes());
    if ds.table().duplicate_count() > 0 {
        println!("duplicates: {}", ds.table().duplicate_count());
    }

    for row in ds.table().rows().iter().take(args.show) {
        println!("  {:<40} {}", row.file, row.label);
    }

    let mut per_class: BTreeMap<usize, usize> = BTreeMap::new();
    for row in ds.table().rows() {
        *per_class.entry(row.label).or_default() += 1;
    }
    for (label, count) in &per_class {
        println!("  class {label:>3}: {count}");
    }

    // Decode everything once. A failing batch is retried sample by sample so
    // every bad row gets reported.
    let loader_cfg = DataLoaderConfig::default()
        .batch_size(args.batch_size)
        .shuffle(false)
        .num_workers(args.workers);
    let mut loader = DataLoader::new(&ds, loader_cfg)?;
    let mut failures = 0usize;
    for (b, batch) in loader.iter().enumerate() {
        if let Err(e) = batch {
            log::debug!("batch {b} failed: {e}");
            let start = b * args.batch_size;
            let end = (start + args.batch_size).min(ds.len());
            for i in start..end {
                if let Err(e) = ds.get(i) {
                    failures += 1;
                    eprintln!("row {i}: {e}");
                }
            }
        }
    }

    println!("unreadable: {failures}");
    Ok(failures == 0)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

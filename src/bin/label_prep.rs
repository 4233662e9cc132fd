use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use serde_derive::{Deserialize, Serialize};

use smoketrack::extractor::ExtractorConfig;
use smoketrack::nms::NmsMode;
use smoketrack::{pool, yolo, Candidate};

/// Turns per-frame smoke detector predictions into reviewable candidate
/// events, one JSON report per run.
#[derive(Parser, Debug)]
#[command(name = "label_prep")]
struct Args {
    /// Sequence directories. Each holds per-frame YOLO prediction files,
    /// either directly or under a `labels_predictions/` subdirectory.
    #[arg(required = true)]
    sequences: Vec<PathBuf>,

    /// Optional TOML file with threshold settings; flags take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    iou_threshold: Option<f32>,

    #[arg(long)]
    confidence_threshold: Option<f32>,

    #[arg(long)]
    min_cluster_size: Option<usize>,

    #[arg(long)]
    context_radius: Option<usize>,

    /// Use canonical greedy NMS instead of the forward pairwise pass.
    #[arg(long)]
    greedy_nms: bool,

    /// Worker threads; defaults to the number of CPU cores.
    #[arg(long)]
    workers: Option<usize>,

    /// Output JSON path.
    #[arg(long, default_value = "candidates.json")]
    out: PathBuf,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    iou_threshold: Option<f32>,
    confidence_threshold: Option<f32>,
    min_cluster_size: Option<usize>,
    context_radius: Option<usize>,
    workers: Option<usize>,
}

#[derive(Debug, Serialize)]
struct SequenceReport {
    sequence: String,
    candidates: Vec<Candidate>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let file_cfg = match &args.config {
        Some(path) => read_config_file(path)?,
        None => ConfigFile::default(),
    };

    let defaults = ExtractorConfig::default();
    let config = ExtractorConfig {
        iou_threshold: args
            .iou_threshold
            .or(file_cfg.iou_threshold)
            .unwrap_or(defaults.iou_threshold),
        confidence_threshold: args
            .confidence_threshold
            .or(file_cfg.confidence_threshold)
            .unwrap_or(defaults.confidence_threshold),
        min_cluster_size: args
            .min_cluster_size
            .or(file_cfg.min_cluster_size)
            .unwrap_or(defaults.min_cluster_size),
        context_radius: args
            .context_radius
            .or(file_cfg.context_radius)
            .unwrap_or(defaults.context_radius),
        nms_mode: if args.greedy_nms {
            NmsMode::Greedy
        } else {
            NmsMode::PairwiseForward
        },
        ..defaults
    };

    let workers = args
        .workers
        .or(file_cfg.workers)
        .unwrap_or_else(pool::default_workers);

    let mut names = Vec::new();
    let mut sequences = Vec::new();
    for dir in &args.sequences {
        let labels = labels_dir(dir);
        match yolo::load_sequence(&labels) {
            Ok(frames) => {
                names.push(dir.display().to_string());
                sequences.push(frames);
            }
            Err(err) => log::error!("{}: {}", labels.display(), err),
        }
    }

    if sequences.is_empty() {
        bail!("no loadable sequences");
    }

    log::info!(
        "processing {} sequence(s) on {} worker(s)",
        sequences.len(),
        workers
    );

    let results = pool::process_batch(&sequences, &config, workers);

    let mut report = Vec::new();
    let mut rejected = 0usize;
    for (name, result) in names.into_iter().zip(results) {
        match result {
            Ok(candidates) => report.push(SequenceReport {
                sequence: name,
                candidates,
            }),
            Err(_) => rejected += 1,
        }
    }

    let file = fs::File::create(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;
    serde_json::to_writer_pretty(file, &report)?;

    let found: usize = report.iter().map(|r| r.candidates.len()).sum();
    log::info!(
        "wrote {} candidate(s) across {} sequence(s) to {} ({} rejected)",
        found,
        report.len(),
        args.out.display(),
        rejected
    );

    Ok(())
}

fn labels_dir(dir: &Path) -> PathBuf {
    let nested = dir.join("labels_predictions");
    if nested.is_dir() {
        nested
    } else {
        dir.to_path_buf()
    }
}

fn read_config_file(path: &Path) -> anyhow::Result<ConfigFile> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

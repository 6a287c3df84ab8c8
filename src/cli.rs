//! Command-line parsing for the MindType tool suite.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the corruption/validation code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::data::CorpusSource;
use crate::io::ExportFormat;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mt", version, about = "MindType fuzzy-typing data tools and demo")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download a clean-sentence corpus for training-data generation.
    Download(DownloadArgs),
    /// Generate corrupted/clean training pairs and write train/valid JSONL.
    Generate(GenerateArgs),
    /// Convert a pairs JSONL file into a fine-tuning format.
    Convert(ConvertArgs),
    /// Run LoRA fine-tuning via the MLX trainer.
    Train(TrainArgs),
    /// Evaluate a model (or compare two) against the held-out gold cases.
    Eval(EvalArgs),
    /// Launch the interactive correction demo.
    ///
    /// Type, pause, and watch the marker sweep the interpreted text in. Uses
    /// the same correction engine as the evaluator.
    Demo(DemoArgs),
}

#[derive(Debug, Parser)]
pub struct DownloadArgs {
    /// Data source to pull sentences from.
    #[arg(short = 's', long, value_enum, default_value_t = CorpusSource::Wikipedia)]
    pub source: CorpusSource,

    /// Target number of sentences.
    #[arg(short = 'n', long, default_value_t = 10_000)]
    pub sentences: usize,

    /// Output corpus file (one sentence per line).
    #[arg(short = 'o', long, default_value = "corpus.txt")]
    pub output: PathBuf,

    /// Random seed for shuffling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Input corpus file; the built-in seed corpus is used when omitted.
    #[arg(short = 'i', long)]
    pub input: Option<PathBuf>,

    /// Output directory for train.jsonl / valid.jsonl.
    #[arg(short = 'o', long, default_value = "data")]
    pub output: PathBuf,

    /// Number of synthetic pairs to generate.
    #[arg(short = 'n', long, default_value_t = 2000)]
    pub samples: usize,

    /// Fraction of pairs held out for validation.
    #[arg(long, default_value_t = 0.1)]
    pub val_ratio: f64,

    /// Random seed for reproducibility.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Skip the curated gold examples.
    #[arg(long)]
    pub no_handcrafted: bool,
}

#[derive(Debug, Parser)]
pub struct ConvertArgs {
    /// Pairs JSONL file produced by `mt generate`.
    pub input: PathBuf,

    /// Target fine-tuning format.
    #[arg(short = 'f', long, value_enum, default_value_t = ExportFormat::Sharegpt)]
    pub format: ExportFormat,

    /// Output file (defaults to the input name with the format's extension).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Fraction split into a `_val` sibling file (0 disables).
    #[arg(long, default_value_t = 0.0)]
    pub split: f64,

    /// Seed for the split shuffle.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Parser)]
pub struct TrainArgs {
    /// Base model to fine-tune (HuggingFace id or local path).
    #[arg(short = 'm', long, default_value = "Qwen/Qwen2.5-1.5B-Instruct")]
    pub model: String,

    /// Directory containing train.jsonl / valid.jsonl in messages format.
    #[arg(short = 'd', long, default_value = "data")]
    pub data: PathBuf,

    /// Adapter output directory.
    #[arg(long, default_value = "adapters")]
    pub adapter_path: PathBuf,

    #[arg(long, default_value_t = 4)]
    pub batch_size: usize,

    /// Number of transformer layers to apply LoRA to.
    #[arg(long, default_value_t = 16)]
    pub lora_layers: usize,

    #[arg(long, default_value_t = 1e-4)]
    pub learning_rate: f64,

    #[arg(long, default_value_t = 500)]
    pub iters: usize,

    /// Checkpoint interval (iterations).
    #[arg(long, default_value_t = 100)]
    pub save_every: usize,

    /// Python interpreter with mlx_lm installed.
    #[arg(long, default_value = "python3")]
    pub python: String,

    /// Fuse adapters into a standalone model at this path after training.
    #[arg(long)]
    pub fuse: Option<PathBuf>,

    /// Print the trainer invocation without running it.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Parser)]
pub struct EvalArgs {
    /// Completion server base URL (falls back to MINDTYPE_SERVER_URL).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Model id to evaluate (falls back to MINDTYPE_MODEL).
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Compare two model ids: BASE then FINE-TUNED.
    #[arg(long, num_args = 2, value_names = ["BASE", "FINETUNED"])]
    pub compare: Option<Vec<String>>,

    /// Token cap per interpretation.
    #[arg(long, default_value_t = 100)]
    pub max_tokens: usize,

    /// Write per-case results to a JSON file.
    #[arg(long)]
    pub save: Option<PathBuf>,
}

/// Validation preset for the demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Preset {
    Strict,
    Balanced,
    Lenient,
}

#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Completion server base URL (falls back to MINDTYPE_SERVER_URL).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Model id (falls back to MINDTYPE_MODEL).
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Validation preset.
    #[arg(long, value_enum, default_value_t = Preset::Balanced)]
    pub preset: Preset,

    /// Milliseconds of typing pause before auto-correction.
    #[arg(long, default_value_t = 600)]
    pub pause_ms: u64,

    /// Minimum words before the engine is invoked.
    #[arg(long, default_value_t = 3)]
    pub min_words: usize,
}

//! Fine-tuning orchestration.
//!
//! Training itself happens in the MLX LoRA trainer (`python -m mlx_lm lora`);
//! this module only assembles the invocation, runs it, and optionally fuses
//! the adapters into a standalone model afterwards. Keeping the trainer
//! external means the data tooling has no ML runtime dependency.

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Local;

use crate::error::AppError;

/// LoRA training settings. The defaults are tuned for a small instruct model
/// on unified-memory hardware.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Base model to fine-tune (HuggingFace id or local path).
    pub model: String,
    /// Directory containing `train.jsonl` / `valid.jsonl` in messages format.
    pub data_dir: PathBuf,
    /// Where adapter checkpoints land; a timestamped subdirectory is created
    /// per run.
    pub adapter_dir: PathBuf,
    pub batch_size: usize,
    pub lora_layers: usize,
    pub learning_rate: f64,
    pub iters: usize,
    pub save_every: usize,
    /// Python interpreter that has `mlx_lm` installed.
    pub python: String,
    /// Fuse adapters into a standalone model after training.
    pub fuse: Option<PathBuf>,
    /// Print the commands without running them.
    pub dry_run: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model: "Qwen/Qwen2.5-1.5B-Instruct".to_string(),
            data_dir: PathBuf::from("data"),
            adapter_dir: PathBuf::from("adapters"),
            batch_size: 4,
            lora_layers: 16,
            learning_rate: 1e-4,
            iters: 500,
            save_every: 100,
            python: "python3".to_string(),
            fuse: None,
            dry_run: false,
        }
    }
}

/// Outcome of a training run: where the adapters (and fused model) ended up.
#[derive(Debug, Clone)]
pub struct TrainOutput {
    pub adapter_path: PathBuf,
    pub fused_path: Option<PathBuf>,
}

/// Run LoRA training (and the optional fuse step).
pub fn run_training(config: &TrainConfig) -> Result<TrainOutput, AppError> {
    if config.iters == 0 {
        return Err(AppError::usage("Iteration count must be > 0."));
    }
    let train_file = config.data_dir.join("train.jsonl");
    if !config.dry_run && !train_file.exists() {
        return Err(AppError::usage(format!(
            "Training data not found at '{}'. Run `mt generate` first.",
            train_file.display()
        )));
    }

    let run_stamp = Local::now().format("%Y%m%d_%H%M%S");
    let adapter_path = config.adapter_dir.join(format!("run_{run_stamp}"));

    let lora_args = lora_arguments(config, &adapter_path);
    if config.dry_run {
        println!("{}", render_command(&config.python, &lora_args));
    } else {
        create_dir_all(&adapter_path).map_err(|e| {
            AppError::failure(format!(
                "Failed to create adapter directory '{}': {e}",
                adapter_path.display()
            ))
        })?;
        run_command(&config.python, &lora_args)?;
    }

    let mut fused_path = None;
    if let Some(save_path) = &config.fuse {
        let fuse_args = fuse_arguments(config, &adapter_path, save_path);
        if config.dry_run {
            println!("{}", render_command(&config.python, &fuse_args));
        } else {
            run_command(&config.python, &fuse_args)?;
        }
        fused_path = Some(save_path.clone());
    }

    Ok(TrainOutput {
        adapter_path,
        fused_path,
    })
}

fn lora_arguments(config: &TrainConfig, adapter_path: &Path) -> Vec<String> {
    vec![
        "-m".to_string(),
        "mlx_lm".to_string(),
        "lora".to_string(),
        "--model".to_string(),
        config.model.clone(),
        "--train".to_string(),
        "--data".to_string(),
        config.data_dir.display().to_string(),
        "--batch-size".to_string(),
        config.batch_size.to_string(),
        "--num-layers".to_string(),
        config.lora_layers.to_string(),
        "--learning-rate".to_string(),
        config.learning_rate.to_string(),
        "--iters".to_string(),
        config.iters.to_string(),
        "--save-every".to_string(),
        config.save_every.to_string(),
        "--adapter-path".to_string(),
        adapter_path.display().to_string(),
        "--test".to_string(),
        "--test-batches".to_string(),
        "20".to_string(),
    ]
}

fn fuse_arguments(config: &TrainConfig, adapter_path: &Path, save_path: &Path) -> Vec<String> {
    vec![
        "-m".to_string(),
        "mlx_lm".to_string(),
        "fuse".to_string(),
        "--model".to_string(),
        config.model.clone(),
        "--adapter-path".to_string(),
        adapter_path.display().to_string(),
        "--save-path".to_string(),
        save_path.display().to_string(),
    ]
}

fn run_command(program: &str, args: &[String]) -> Result<(), AppError> {
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|e| AppError::failure(format!("Failed to launch '{program}': {e}")))?;

    if !status.success() {
        return Err(AppError::failure(format!(
            "'{}' exited with {}.",
            render_command(program, args),
            status
        )));
    }
    Ok(())
}

fn render_command(program: &str, args: &[String]) -> String {
    let mut out = String::from(program);
    for arg in args {
        out.push(' ');
        if arg.contains(' ') {
            out.push('\'');
            out.push_str(arg);
            out.push('\'');
        } else {
            out.push_str(arg);
        }
    }
    out
}

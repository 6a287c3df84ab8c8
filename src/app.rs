//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - dispatches to download/generate/convert/train/eval/demo
//! - prints reports and writes outputs

use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cli::{
    Cli, Command, ConvertArgs, DemoArgs, DownloadArgs, EvalArgs, GenerateArgs, Preset, TrainArgs,
};
use crate::data::{generate_dataset, split_dataset, CorpusClient, DatasetConfig};
use crate::engine::EngineConfig;
use crate::error::AppError;
use crate::infer::CompletionClient;

/// Entry point for the `mt` binary.
pub fn run() -> Result<(), AppError> {
    // We want bare `mt` (and `mt --preset strict`) to behave like `mt demo`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while keeping the demo one keystroke away.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);

    match cli.command {
        Command::Download(args) => handle_download(args),
        Command::Generate(args) => handle_generate(args),
        Command::Convert(args) => handle_convert(args),
        Command::Train(args) => handle_train(args),
        Command::Eval(args) => handle_eval(args),
        Command::Demo(args) => handle_demo(args),
    }
}

fn handle_download(args: DownloadArgs) -> Result<(), AppError> {
    if args.sentences == 0 {
        return Err(AppError::usage("Sentence target must be > 0."));
    }

    let client = CorpusClient::new()?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    println!(
        "Downloading up to {} sentences from {:?}...",
        args.sentences, args.source
    );
    let sentences = client.download(args.source, args.sentences, &mut rng)?;

    crate::io::write_corpus(&args.output, &sentences)?;
    println!("Saved {} sentences to {}", sentences.len(), args.output.display());
    println!(
        "Next: mt generate --input {} --samples 10000",
        args.output.display()
    );
    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let corpus = match &args.input {
        Some(path) => crate::io::read_corpus(path)?,
        None => Vec::new(),
    };

    let config = DatasetConfig {
        samples: args.samples,
        include_handcrafted: !args.no_handcrafted,
        seed: args.seed,
        ..DatasetConfig::default()
    };
    let pairs = generate_dataset(&corpus, &config)?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let (train, valid) = split_dataset(pairs.clone(), args.val_ratio, &mut rng);

    std::fs::create_dir_all(&args.output).map_err(|e| {
        AppError::usage(format!(
            "Failed to create output directory '{}': {e}",
            args.output.display()
        ))
    })?;
    let train_path = args.output.join("train.jsonl");
    let valid_path = args.output.join("valid.jsonl");
    crate::io::write_pairs(&train_path, &train)?;
    crate::io::write_pairs(&valid_path, &valid)?;

    println!(
        "{}",
        crate::report::format_dataset_summary(&pairs, train.len(), valid.len())
    );
    println!("Wrote {} and {}", train_path.display(), valid_path.display());
    Ok(())
}

fn handle_convert(args: ConvertArgs) -> Result<(), AppError> {
    let pairs = crate::io::read_pairs(&args.input)?;
    if pairs.is_empty() {
        return Err(AppError::usage(format!(
            "No training pairs found in '{}'.",
            args.input.display()
        )));
    }

    let output = args.output.clone().unwrap_or_else(|| {
        default_convert_output(&args.input, args.format.extension())
    });

    if args.split > 0.0 {
        let mut rng = StdRng::seed_from_u64(args.seed);
        let (train, valid) = split_dataset(pairs, args.split, &mut rng);
        crate::io::write_format(&output, &train, args.format)?;
        let val_path = sibling_with_suffix(&output, "_val");
        crate::io::write_format(&val_path, &valid, args.format)?;
        println!(
            "Converted {} train + {} validation pairs to {} and {}",
            train.len(),
            valid.len(),
            output.display(),
            val_path.display()
        );
    } else {
        crate::io::write_format(&output, &pairs, args.format)?;
        println!("Converted {} pairs to {}", pairs.len(), output.display());
    }
    Ok(())
}

fn handle_train(args: TrainArgs) -> Result<(), AppError> {
    let config = crate::train::TrainConfig {
        model: args.model,
        data_dir: args.data,
        adapter_dir: args.adapter_path,
        batch_size: args.batch_size,
        lora_layers: args.lora_layers,
        learning_rate: args.learning_rate,
        iters: args.iters,
        save_every: args.save_every,
        python: args.python,
        fuse: args.fuse,
        dry_run: args.dry_run,
    };

    let output = crate::train::run_training(&config)?;
    if !config.dry_run {
        println!("Adapters saved to {}", output.adapter_path.display());
        if let Some(fused) = output.fused_path {
            println!("Fused model saved to {}", fused.display());
        }
    }
    Ok(())
}

fn handle_eval(args: EvalArgs) -> Result<(), AppError> {
    let client = CompletionClient::from_env(args.base_url.as_deref(), args.model.as_deref())?;

    if let Some(models) = &args.compare {
        let base = client.with_model(models[0].clone());
        let tuned = client.with_model(models[1].clone());

        println!("Evaluating {} ...", base.model());
        let base_outcomes = crate::eval::evaluate(&base, args.max_tokens)?;
        println!("{}", crate::report::format_eval_results(&base_outcomes, base.model()));

        println!("Evaluating {} ...", tuned.model());
        let tuned_outcomes = crate::eval::evaluate(&tuned, args.max_tokens)?;
        println!(
            "{}",
            crate::report::format_eval_results(&tuned_outcomes, tuned.model())
        );

        println!(
            "{}",
            crate::report::format_comparison(
                base.model(),
                crate::eval::overall_scores(&base_outcomes),
                tuned.model(),
                crate::eval::overall_scores(&tuned_outcomes),
            )
        );
        return Ok(());
    }

    println!("Evaluating {} ...", client.model());
    let outcomes = crate::eval::evaluate(&client, args.max_tokens)?;
    println!(
        "{}",
        crate::report::format_eval_results(&outcomes, client.model())
    );

    if let Some(path) = &args.save {
        let file = std::fs::File::create(path).map_err(|e| {
            AppError::usage(format!("Failed to create '{}': {e}", path.display()))
        })?;
        serde_json::to_writer_pretty(file, &outcomes)
            .map_err(|e| AppError::usage(format!("Failed to write results JSON: {e}")))?;
        println!("Results saved to {}", path.display());
    }
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let client = CompletionClient::from_env(args.base_url.as_deref(), args.model.as_deref())?;

    let mut config = match args.preset {
        Preset::Strict => EngineConfig::strict(),
        Preset::Balanced => EngineConfig::balanced(),
        Preset::Lenient => EngineConfig::lenient(),
    };
    config.min_words = args.min_words;

    crate::demo::run(client, config, args.pause_ms)
}

fn default_convert_output(input: &PathBuf, extension: &str) -> PathBuf {
    let mut output = input.clone();
    output.set_extension(extension);
    if output == *input {
        // Same extension as the input; avoid clobbering it.
        return sibling_with_suffix(&output, "_converted");
    }
    output
}

fn sibling_with_suffix(path: &PathBuf, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let name = if ext.is_empty() {
        format!("{stem}{suffix}")
    } else {
        format!("{stem}{suffix}.{ext}")
    };
    path.with_file_name(name)
}

/// Rewrite argv so `mt` defaults to `mt demo`.
///
/// Rules:
/// - `mt`                      -> `mt demo`
/// - `mt --preset strict ...`  -> `mt demo --preset strict ...`
/// - `mt --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("demo".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "download" | "generate" | "convert" | "train" | "eval" | "demo"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "demo flags".
    if arg1.starts_with('-') {
        argv.insert(1, "demo".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

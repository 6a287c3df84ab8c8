//! Fine-tuning format conversion.
//!
//! Every trainer wants the same pairs in a different wrapper:
//!
//! - `sharegpt`: conversation array (Unsloth, Axolotl, LLaMA-Factory)
//! - `alpaca`: instruction format (Stanford Alpaca derivatives)
//! - `chatml`: plain-text ChatML blocks (llama.cpp finetune)
//! - `pairs`: tab-separated values (quick inspection, simple scripts)
//! - `openai`: `messages` JSONL (OpenAI fine-tuning, MLX LoRA)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;

use crate::data::TrainingPair;
use crate::error::AppError;

/// System prompt embedded in the chat-shaped formats.
pub const DECODE_SYSTEM_PROMPT: &str = "\
You decode garbled speed-typing into clear English. \
Consider phonetic similarity, keyboard adjacency, and context. \
Return ONLY the corrected text, nothing else.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Sharegpt,
    Alpaca,
    Chatml,
    Pairs,
    Openai,
}

impl ExportFormat {
    /// Conventional file extension for the format.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Sharegpt | ExportFormat::Alpaca => "json",
            ExportFormat::Chatml | ExportFormat::Pairs => "txt",
            ExportFormat::Openai => "jsonl",
        }
    }
}

#[derive(Debug, Serialize)]
struct ShareGptTurn<'a> {
    from: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct ShareGptConversation<'a> {
    conversations: [ShareGptTurn<'a>; 3],
}

#[derive(Debug, Serialize)]
struct AlpacaExample<'a> {
    instruction: &'static str,
    input: &'a str,
    output: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatExample<'a> {
    messages: [ChatMessage<'a>; 3],
}

/// Write `pairs` to `path` in the requested format.
pub fn write_format(
    path: &Path,
    pairs: &[TrainingPair],
    format: ExportFormat,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::usage(format!("Failed to create '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Sharegpt => {
            let converted: Vec<ShareGptConversation> = pairs
                .iter()
                .map(|p| ShareGptConversation {
                    conversations: [
                        ShareGptTurn {
                            from: "system",
                            value: DECODE_SYSTEM_PROMPT,
                        },
                        ShareGptTurn {
                            from: "human",
                            value: &p.input,
                        },
                        ShareGptTurn {
                            from: "gpt",
                            value: &p.output,
                        },
                    ],
                })
                .collect();
            serde_json::to_writer_pretty(&mut writer, &converted)
                .map_err(|e| AppError::usage(format!("Failed to write ShareGPT JSON: {e}")))?;
        }
        ExportFormat::Alpaca => {
            let converted: Vec<AlpacaExample> = pairs
                .iter()
                .map(|p| AlpacaExample {
                    instruction:
                        "Decode this garbled typing into clear English. Return only the corrected text.",
                    input: &p.input,
                    output: &p.output,
                })
                .collect();
            serde_json::to_writer_pretty(&mut writer, &converted)
                .map_err(|e| AppError::usage(format!("Failed to write Alpaca JSON: {e}")))?;
        }
        ExportFormat::Chatml => {
            let blocks: Vec<String> = pairs.iter().map(|p| chatml_block(p)).collect();
            write!(writer, "{}", blocks.join("\n\n"))
                .map_err(|e| AppError::usage(format!("Failed to write ChatML text: {e}")))?;
        }
        ExportFormat::Pairs => {
            writeln!(writer, "input\toutput")
                .map_err(|e| AppError::usage(format!("Failed to write TSV header: {e}")))?;
            for p in pairs {
                writeln!(writer, "{}\t{}", tsv_escape(&p.input), tsv_escape(&p.output))
                    .map_err(|e| AppError::usage(format!("Failed to write TSV row: {e}")))?;
            }
        }
        ExportFormat::Openai => {
            for p in pairs {
                let example = ChatExample {
                    messages: [
                        ChatMessage {
                            role: "system",
                            content: DECODE_SYSTEM_PROMPT,
                        },
                        ChatMessage {
                            role: "user",
                            content: &p.input,
                        },
                        ChatMessage {
                            role: "assistant",
                            content: &p.output,
                        },
                    ],
                };
                let line = serde_json::to_string(&example)
                    .map_err(|e| AppError::usage(format!("Failed to write messages JSONL: {e}")))?;
                writeln!(writer, "{line}")
                    .map_err(|e| AppError::usage(format!("Failed to write messages JSONL: {e}")))?;
            }
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::usage(format!("Failed to write '{}': {e}", path.display())))
}

fn chatml_block(pair: &TrainingPair) -> String {
    format!(
        "<|im_start|>system\n{DECODE_SYSTEM_PROMPT}<|im_end|>\n\
         <|im_start|>user\n{}<|im_end|>\n\
         <|im_start|>assistant\n{}<|im_end|>",
        pair.input, pair.output
    )
}

fn tsv_escape(text: &str) -> String {
    text.replace(['\t', '\n'], " ")
}

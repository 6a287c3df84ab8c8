//! Read/write the native training-pair format and corpus text files.
//!
//! Training pairs are JSON Lines: one object per line, blank lines ignored.
//! Corpus files are UTF-8 plain text, one clean sentence per line. The schema
//! is defined by [`crate::data::TrainingPair`].

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::data::TrainingPair;
use crate::error::AppError;

/// Write pairs as JSONL, one object per line.
pub fn write_pairs(path: &Path, pairs: &[TrainingPair]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::usage(format!("Failed to create '{}': {e}", path.display()))
    })?;
    let mut writer = BufWriter::new(file);

    for pair in pairs {
        let line = serde_json::to_string(pair)
            .map_err(|e| AppError::usage(format!("Failed to serialize training pair: {e}")))?;
        writeln!(writer, "{line}")
            .map_err(|e| AppError::usage(format!("Failed to write '{}': {e}", path.display())))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::usage(format!("Failed to write '{}': {e}", path.display())))
}

/// Read a JSONL pairs file, skipping blank lines.
pub fn read_pairs(path: &Path) -> Result<Vec<TrainingPair>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open '{}': {e}", path.display())))?;
    let reader = BufReader::new(file);

    let mut pairs = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line
            .map_err(|e| AppError::usage(format!("Failed to read '{}': {e}", path.display())))?;
        if line.trim().is_empty() {
            continue;
        }
        let pair: TrainingPair = serde_json::from_str(&line).map_err(|e| {
            AppError::usage(format!(
                "Invalid training pair at {}:{}: {e}",
                path.display(),
                idx + 1
            ))
        })?;
        pairs.push(pair);
    }
    Ok(pairs)
}

/// Read a corpus file: one sentence per line, blanks dropped.
pub fn read_corpus(path: &Path) -> Result<Vec<String>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::usage(format!("Failed to open '{}': {e}", path.display())))?;
    let reader = BufReader::new(file);

    let mut sentences = Vec::new();
    for line in reader.lines() {
        let line = line
            .map_err(|e| AppError::usage(format!("Failed to read '{}': {e}", path.display())))?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            sentences.push(trimmed.to_string());
        }
    }
    Ok(sentences)
}

/// Write a corpus file, one sentence per line.
pub fn write_corpus(path: &Path, sentences: &[String]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::usage(format!("Failed to create '{}': {e}", path.display()))
    })?;
    let mut writer = BufWriter::new(file);

    for sentence in sentences {
        writeln!(writer, "{sentence}")
            .map_err(|e| AppError::usage(format!("Failed to write '{}': {e}", path.display())))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::usage(format!("Failed to write '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corrupt::{ErrorKind, Severity};
    use crate::data::PairSource;

    fn sample_pairs() -> Vec<TrainingPair> {
        vec![
            TrainingPair {
                input: "teh qick fox".to_string(),
                output: "the quick fox".to_string(),
                error_types: vec![ErrorKind::Misspelling, ErrorKind::Delete],
                level: Some(Severity::Medium),
                source: PairSource::Synthetic,
            },
            TrainingPair {
                input: "clean text".to_string(),
                output: "clean text".to_string(),
                error_types: Vec::new(),
                level: None,
                source: PairSource::Identity,
            },
        ]
    }

    #[test]
    fn pairs_survive_a_write_read_cycle() {
        let dir = std::env::temp_dir().join("mindtype_jsonl_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pairs.jsonl");

        let pairs = sample_pairs();
        write_pairs(&path, &pairs).unwrap();
        let loaded = read_pairs(&path).unwrap();
        assert_eq!(loaded, pairs);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn optional_fields_are_omitted_from_the_wire() {
        let json = serde_json::to_string(&sample_pairs()[1]).unwrap();
        assert!(!json.contains("error_types"));
        assert!(!json.contains("level"));
        assert!(json.contains(r#""source":"identity""#));
    }

    #[test]
    fn level_and_error_names_serialize_lowercase() {
        let json = serde_json::to_string(&sample_pairs()[0]).unwrap();
        assert!(json.contains(r#""level":"medium""#), "{json}");
        assert!(json.contains(r#""error_types":["misspelling","delete"]"#), "{json}");
    }

    #[test]
    fn external_pairs_without_metadata_still_parse() {
        let line = r#"{"input": "teh", "output": "the"}"#;
        let pair: TrainingPair = serde_json::from_str(line).unwrap();
        assert_eq!(pair.level, None);
        assert!(pair.error_types.is_empty());
        assert_eq!(pair.source, PairSource::Synthetic);
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let err = read_pairs(Path::new("/nonexistent/pairs.jsonl")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}

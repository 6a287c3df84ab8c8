//! Terminal report formatting.
//!
//! All user-facing summary text is built here as plain strings so:
//! - the generation/evaluation code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use std::collections::BTreeMap;

use crate::corrupt::Severity;
use crate::data::{PairSource, TrainingPair};
use crate::eval::{EvalOutcome, EvalScores, DIFFICULTY_ORDER};

/// Format the dataset composition summary printed after `mt generate`.
pub fn format_dataset_summary(pairs: &[TrainingPair], train_n: usize, val_n: usize) -> String {
    let mut out = String::new();

    out.push_str("=== mt - fuzzy typing dataset ===\n");
    out.push_str(&format!(
        "Pairs: {} total | {} train | {} validation\n",
        pairs.len(),
        train_n,
        val_n
    ));

    out.push_str("\nComposition by level:\n");
    for level in Severity::ALL {
        let count = pairs.iter().filter(|p| p.level == Some(level)).count();
        out.push_str(&format_share(level.display_name(), count, pairs.len()));
    }
    for source in [PairSource::Curated, PairSource::Identity] {
        let count = pairs.iter().filter(|p| p.source == source).count();
        out.push_str(&format_share(source.display_name(), count, pairs.len()));
    }

    let mut error_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for pair in pairs {
        for kind in &pair.error_types {
            *error_counts.entry(kind.name()).or_insert(0) += 1;
        }
    }
    if !error_counts.is_empty() {
        let mut sorted: Vec<(&str, usize)> = error_counts.into_iter().collect();
        sorted.sort_by_key(|&(name, count)| (std::cmp::Reverse(count), name));
        out.push_str("\nError type distribution:\n");
        for (name, count) in sorted {
            out.push_str(&format!("  {name:<14} {count}\n"));
        }
    }

    out.push_str("\nSample pairs:\n");
    for pair in pairs.iter().take(3) {
        let tag = pair
            .level
            .map(Severity::display_name)
            .unwrap_or_else(|| pair.source.display_name());
        out.push_str(&format!("[{tag}]\n  IN:  {}\n  OUT: {}\n", pair.input, pair.output));
    }

    out
}

fn format_share(label: &str, count: usize, total: usize) -> String {
    let pct = if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    };
    format!("  {label:<12} {count:>6} ({pct:.1}%)\n")
}

/// Format evaluation results grouped by difficulty band.
pub fn format_eval_results(outcomes: &[EvalOutcome], label: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {label} evaluation ===\n"));

    for band in DIFFICULTY_ORDER {
        let group: Vec<&EvalOutcome> = outcomes
            .iter()
            .filter(|o| o.difficulty == *band)
            .collect();
        if group.is_empty() {
            continue;
        }

        let avg = group.iter().map(|o| o.similarity).sum::<f64>() / group.len() as f64;
        let exact = group.iter().filter(|o| o.exact).count();
        out.push_str(&format!(
            "\n--- {} ({} cases) ---\n  avg similarity: {:.1}% | exact: {}/{}\n",
            band.to_uppercase(),
            group.len(),
            avg * 100.0,
            exact,
            group.len()
        ));

        for o in group {
            let mark = if o.exact {
                '='
            } else if o.similarity > 0.8 {
                '~'
            } else {
                'x'
            };
            out.push_str(&format!("  {mark} [{:>3.0}%] {}\n", o.similarity * 100.0, o.note));
            out.push_str(&format!("      IN:  {}\n", o.input));
            out.push_str(&format!("      EXP: {}\n", o.expected));
            if !o.exact {
                out.push_str(&format!("      GOT: {}\n", o.actual));
            }
        }
    }

    let scores = crate::eval::overall_scores(outcomes);
    out.push_str(&format!(
        "\nOverall: similarity {:.1}% | exact {:.1}%\n",
        scores.similarity * 100.0,
        scores.exact_rate * 100.0
    ));

    out
}

/// Format the base vs fine-tuned comparison.
pub fn format_comparison(
    base_label: &str,
    base: EvalScores,
    tuned_label: &str,
    tuned: EvalScores,
) -> String {
    let mut out = String::new();

    out.push_str("=== comparison ===\n");
    out.push_str(&format_delta_line(
        "similarity",
        base.similarity,
        tuned.similarity,
    ));
    out.push_str(&format_delta_line(
        "exact match",
        base.exact_rate,
        tuned.exact_rate,
    ));

    let delta = tuned.similarity - base.similarity;
    let verdict = if delta > 0.05 {
        format!("{tuned_label} improved over {base_label}")
    } else if delta < -0.05 {
        format!("{tuned_label} degraded versus {base_label} - consider reverting")
    } else {
        "minimal effect".to_string()
    };
    out.push_str(&format!("\nVerdict: {verdict}\n"));

    out
}

fn format_delta_line(label: &str, base: f64, tuned: f64) -> String {
    let delta = tuned - base;
    let arrow = if delta > 0.0 {
        "up"
    } else if delta < 0.0 {
        "down"
    } else {
        "flat"
    };
    format!(
        "  {label:<12} {:.1}% -> {:.1}% ({arrow} {:.1}%)\n",
        base * 100.0,
        tuned * 100.0,
        delta.abs() * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corrupt::ErrorKind;

    fn pair(level: Option<Severity>, source: PairSource, kinds: Vec<ErrorKind>) -> TrainingPair {
        TrainingPair {
            input: "in".to_string(),
            output: "out".to_string(),
            error_types: kinds,
            level,
            source,
        }
    }

    #[test]
    fn dataset_summary_counts_levels_and_errors() {
        let pairs = vec![
            pair(
                Some(Severity::Light),
                PairSource::Synthetic,
                vec![ErrorKind::Adjacent],
            ),
            pair(
                Some(Severity::Heavy),
                PairSource::Synthetic,
                vec![ErrorKind::Adjacent, ErrorKind::Transpose],
            ),
            pair(None, PairSource::Curated, vec![]),
            pair(None, PairSource::Identity, vec![]),
        ];
        let text = format_dataset_summary(&pairs, 3, 1);
        assert!(text.contains("Pairs: 4 total | 3 train | 1 validation"));
        assert!(text.contains("light"));
        assert!(text.contains("curated"));
        assert!(text.contains("adjacent"), "{text}");
        assert!(text.contains("transpose"));
    }

    #[test]
    fn eval_report_shows_failures_with_model_output() {
        let outcomes = vec![EvalOutcome {
            input: "teh".to_string(),
            expected: "the".to_string(),
            actual: "tea".to_string(),
            difficulty: "light".to_string(),
            note: "smoke".to_string(),
            similarity: 0.66,
            exact: false,
        }];
        let text = format_eval_results(&outcomes, "base");
        assert!(text.contains("LIGHT (1 cases)"));
        assert!(text.contains("GOT: tea"));
        assert!(text.contains("Overall"));
    }

    #[test]
    fn comparison_verdict_tracks_the_similarity_delta() {
        let base = EvalScores {
            similarity: 0.6,
            exact_rate: 0.2,
        };
        let better = EvalScores {
            similarity: 0.8,
            exact_rate: 0.5,
        };
        let text = format_comparison("base", base, "fine-tuned", better);
        assert!(text.contains("improved"), "{text}");

        let text = format_comparison("base", better, "fine-tuned", base);
        assert!(text.contains("degraded"), "{text}");

        let text = format_comparison("base", base, "fine-tuned", base);
        assert!(text.contains("minimal effect"));
    }
}

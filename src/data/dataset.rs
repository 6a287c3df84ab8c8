//! Training-pair generation and dataset assembly.
//!
//! Combines three kinds of pairs into one shuffled dataset:
//!
//! - synthetic pairs (seed corpus or downloaded corpus run through the
//!   corruption policy, one level at a time)
//! - handcrafted gold pairs (curated garbled → clean examples)
//! - identity pairs (clean → clean, to teach the model not to over-correct)
//!
//! Generation is deterministic for a given base seed: every sentence draw
//! gets its own rng seeded from `(base seed, level, index)`, which also makes
//! the per-level batches safe to generate in parallel.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::corrupt::{corrupt_sentence, ErrorKind, Severity};
use crate::error::AppError;

/// One line of the training JSONL file. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPair {
    /// Corrupted text as the model sees it.
    pub input: String,
    /// Clean text the model should produce.
    pub output: String,
    /// Operators that actually fired while corrupting.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub error_types: Vec<ErrorKind>,
    /// Severity tier; absent for curated and identity pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Severity>,
    #[serde(default)]
    pub source: PairSource,
}

/// Where a pair came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairSource {
    #[default]
    Synthetic,
    Curated,
    Identity,
}

impl PairSource {
    pub fn display_name(self) -> &'static str {
        match self {
            PairSource::Synthetic => "synthetic",
            PairSource::Curated => "curated",
            PairSource::Identity => "identity",
        }
    }
}

/// Generation settings.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// Number of synthetic pairs (identity pairs are added on top).
    pub samples: usize,
    /// Include the curated gold examples.
    pub include_handcrafted: bool,
    /// Fraction of `samples` emitted as clean→clean pairs.
    pub identity_fraction: f64,
    pub seed: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            samples: 2000,
            include_handcrafted: true,
            identity_fraction: 0.1,
            seed: 42,
        }
    }
}

/// Built-in clean sentences for offline generation. Deliberately spread over
/// registers (narrative, business, academic, casual, instructions) so the
/// model sees varied sentence shapes.
pub const SEED_CORPUS: &[&str] = &[
    // Narrative
    "Once upon a time there was a prince who wanted to create something new",
    "The masses had no idea who he was however he was a visionary",
    "She walked through the ancient forest looking for answers",
    "The old wizard spoke words of wisdom to the young apprentice",
    "They traveled across mountains and valleys to reach the kingdom",
    // Business
    "Please review the quarterly report and provide your feedback",
    "The meeting has been rescheduled to next Thursday afternoon",
    "We need to discuss the budget allocation for the upcoming project",
    "The client requested additional features for the mobile application",
    "Our team will deliver the presentation by end of day Friday",
    // Academic and technical
    "The research demonstrates a significant correlation between variables",
    "Neural networks have revolutionized the field of machine learning",
    "The hypothesis was validated through extensive experimentation",
    "Quantum computing promises to transform computational capabilities",
    "The algorithm processes data with logarithmic time complexity",
    // Casual
    "I think we should grab coffee sometime this week",
    "The weather has been really nice lately dont you think",
    "My favorite restaurant just opened a new location downtown",
    "Have you seen the latest episode of that show everyone talks about",
    "The concert last night was absolutely incredible",
    // Descriptive
    "The sunset painted the sky in brilliant shades of orange and purple",
    "Music filled the air as dancers moved gracefully across the stage",
    "The ancient library held secrets waiting to be discovered",
    "Waves crashed against the rocky shore under the moonlit sky",
    "The garden bloomed with flowers of every imaginable color",
    // Instructions
    "First you need to install the required dependencies",
    "Make sure to save your work before closing the application",
    "The process involves several steps that must be followed carefully",
    "Remember to check your email for the verification link",
    "Please complete the form and submit it by the deadline",
    // Opinion
    "I believe that education is the foundation of a better society",
    "Technology has fundamentally changed how we communicate",
    "The evidence suggests that early intervention is most effective",
    "We should prioritize sustainable solutions for future generations",
    "Quality matters more than quantity in most situations",
    // Questions
    "What do you think about the proposed changes to the policy",
    "How long have you been working on this particular problem",
    "Where should we meet for the discussion tomorrow",
    "Can you explain the reasoning behind your decision",
    "Would it be possible to extend the deadline by a few days",
];

/// Curated gold pairs: garbled text a generator is unlikely to reproduce,
/// paired with its intended reading. These anchor the interpretation style
/// (context-dependent decoding, abbreviation expansion, hand-shift recovery).
pub const HANDCRAFTED_PAIRS: &[(&str, &str)] = &[
    // Ambiguous skeletons the sentence context must disambiguate.
    (
        "the msses were amzd by the prfrmance on stage",
        "The masses were amazed by the performance on stage",
    ),
    (
        "she msses her fmly when shes away frm home",
        "She misses her family when she's away from home",
    ),
    (
        "he mde a lot of msses while lrning to cook",
        "He made a lot of messes while learning to cook",
    ),
    ("i cnt bleve how fst time flys", "I can't believe how fast time flies"),
    (
        "plz cnt the nmber of itms in the bx",
        "Please count the number of items in the box",
    ),
    (
        "she will prsnt her findngs at the confrnce",
        "She will present her findings at the conference",
    ),
    (
        "we mst prsnt ths from happning agn",
        "We must prevent this from happening again",
    ),
    ("i rd the book lst nght it ws grt", "I read the book last night it was great"),
    ("the rd car drve dwn the strret", "The red car drove down the street"),
    ("the rd to sccss is nvr strght", "The road to success is never straight"),
    // Hand-shift garbling.
    (
        "once iualpio a time tbere weas a prince who wntd to chng the wrld",
        "Once upon a time there was a prince who wanted to change the world",
    ),
    (
        "teh msaasexd had no idea who he ws hwever he ws a visionsary",
        "The masses had no idea who he was however he was a visionary",
    ),
    (
        "he creatd a nw ftookl tht the wrld hadnt exprienced bfre",
        "He created a new tool that the world hadn't experienced before",
    ),
    // Vowel-skeleton sentences.
    (
        "th algrthm prcsss th dat vry effcntly wth lgrthmuc complxty",
        "The algorithm processes the data very efficiently with logarithmic complexity",
    ),
    (
        "th nurl ntwrk ws trnd on mlllns of exmpls",
        "The neural network was trained on millions of examples",
    ),
    (
        "th mtng ws rschduld to thrsdy bcse of cnflcts",
        "The meeting was rescheduled to Thursday because of conflicts",
    ),
    (
        "pls rvw th rport nd snd fdbck by eod frdy",
        "Please review the report and send feedback by end of day Friday",
    ),
    (
        "i thnk w shld grb cffe smtm ths wk if ur fre",
        "I think we should grab coffee sometime this week if you're free",
    ),
    (
        "th wthr hs bn rly nce ltly dnt u thnk",
        "The weather has been really nice lately don't you think",
    ),
    (
        "th snsst pntd th sky n brllnt shds of orng nd prpl",
        "The sunset painted the sky in brilliant shades of orange and purple",
    ),
    (
        "msc flld th ar as dncrs mvd grclly acrss th stg",
        "Music filled the air as dancers moved gracefully across the stage",
    ),
    (
        "th ancnt lbrry hld scrts wtng to b dscvrd",
        "The ancient library held secrets waiting to be discovered",
    ),
    (
        "wvs crshd agnst th rcky shr undr th mnlt sky",
        "Waves crashed against the rocky shore under the moonlit sky",
    ),
    (
        "i ws wrtng a lttr to my frnd abt th mtng we hd ystrd",
        "I was writing a letter to my friend about the meeting we had yesterday",
    ),
    (
        "th tm ndds to fnsh th prjct bfr th ddlne nxt wk",
        "The team needs to finish the project before the deadline next week",
    ),
    (
        "cn u hlp me undrstnd hw ths systm wrks its cnfsng",
        "Can you help me understand how this system works it's confusing",
    ),
    // Velocity abbreviations.
    ("plz reviw th rport asap", "Please review the report as soon as possible"),
    ("mtg reschd to thurs aftrnn", "Meeting rescheduled to Thursday afternoon"),
    ("frst u nd to instll dpndncs", "First you need to install dependencies"),
    ("wat do u thnk abt th chngs", "What do you think about the changes"),
    ("cn u expln yr rsnng", "Can you explain your reasoning"),
    ("pls snd th dcmnts b4 tmrw", "Please send the documents before tomorrow"),
    ("lts scdl a cll fr nxt wk", "Let's schedule a call for next week"),
    ("thx fr yr hlp w ths", "Thanks for your help with this"),
];

/// Generate the full dataset from `corpus` (falling back to the seed corpus
/// when empty).
pub fn generate_dataset(
    corpus: &[String],
    config: &DatasetConfig,
) -> Result<Vec<TrainingPair>, AppError> {
    if config.samples == 0 {
        return Err(AppError::usage("Sample count must be > 0."));
    }
    if !(0.0..=0.5).contains(&config.identity_fraction) {
        return Err(AppError::usage("Identity fraction must be within [0, 0.5]."));
    }

    let seed_corpus: Vec<String>;
    let sentences: &[String] = if corpus.is_empty() {
        seed_corpus = SEED_CORPUS.iter().map(|s| s.to_string()).collect();
        &seed_corpus
    } else {
        corpus
    };

    let mut pairs: Vec<TrainingPair> = Vec::new();

    if config.include_handcrafted {
        pairs.extend(HANDCRAFTED_PAIRS.iter().map(|(input, output)| TrainingPair {
            input: (*input).to_string(),
            output: (*output).to_string(),
            error_types: Vec::new(),
            level: None,
            source: PairSource::Curated,
        }));
    }

    for level in Severity::ALL {
        let count = (config.samples as f64 * level.default_proportion()) as usize;
        let batch: Vec<TrainingPair> = (0..count)
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(derive_seed(config.seed, level, i));
                let sentence = sentences
                    .choose(&mut rng)
                    .map(String::as_str)
                    .unwrap_or_default();
                let outcome = corrupt_sentence(sentence, level, &mut rng);
                TrainingPair {
                    input: outcome.text,
                    output: sentence.to_string(),
                    error_types: outcome.applied,
                    level: Some(level),
                    source: PairSource::Synthetic,
                }
            })
            .collect();
        pairs.extend(batch);
    }

    let identity_count = (config.samples as f64 * config.identity_fraction) as usize;
    let mut rng = StdRng::seed_from_u64(config.seed);
    for _ in 0..identity_count {
        if let Some(sentence) = sentences.choose(&mut rng) {
            pairs.push(TrainingPair {
                input: sentence.clone(),
                output: sentence.clone(),
                error_types: Vec::new(),
                level: None,
                source: PairSource::Identity,
            });
        }
    }

    pairs.shuffle(&mut rng);
    Ok(pairs)
}

/// Shuffle and split into `(train, validation)`.
pub fn split_dataset(
    mut pairs: Vec<TrainingPair>,
    val_ratio: f64,
    rng: &mut StdRng,
) -> (Vec<TrainingPair>, Vec<TrainingPair>) {
    let val_ratio = val_ratio.clamp(0.0, 0.5);
    pairs.shuffle(rng);
    let split = ((pairs.len() as f64) * (1.0 - val_ratio)) as usize;
    let validation = pairs.split_off(split.min(pairs.len()));
    (pairs, validation)
}

fn derive_seed(base: u64, level: Severity, index: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    base.hash(&mut hasher);
    level.hash(&mut hasher);
    index.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(samples: usize) -> DatasetConfig {
        DatasetConfig {
            samples,
            ..DatasetConfig::default()
        }
    }

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let a = generate_dataset(&[], &config(120)).unwrap();
        let b = generate_dataset(&[], &config(120)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate_dataset(&[], &config(120)).unwrap();
        let b = generate_dataset(
            &[],
            &DatasetConfig {
                seed: 7,
                ..config(120)
            },
        )
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn composition_matches_the_level_distribution() {
        let pairs = generate_dataset(&[], &config(400)).unwrap();

        let curated = pairs
            .iter()
            .filter(|p| p.source == PairSource::Curated)
            .count();
        assert_eq!(curated, HANDCRAFTED_PAIRS.len());

        let identity = pairs
            .iter()
            .filter(|p| p.source == PairSource::Identity)
            .count();
        assert_eq!(identity, 40);

        for level in Severity::ALL {
            let expected = (400.0 * level.default_proportion()) as usize;
            let actual = pairs.iter().filter(|p| p.level == Some(level)).count();
            assert_eq!(actual, expected, "level {level:?}");
        }
    }

    #[test]
    fn identity_pairs_are_untouched_and_unleveled() {
        let pairs = generate_dataset(&[], &config(100)).unwrap();
        for pair in pairs.iter().filter(|p| p.source == PairSource::Identity) {
            assert_eq!(pair.input, pair.output);
            assert_eq!(pair.level, None);
            assert!(pair.error_types.is_empty());
        }
    }

    #[test]
    fn synthetic_outputs_are_the_clean_sentences() {
        let pairs = generate_dataset(&[], &config(200)).unwrap();
        for pair in pairs.iter().filter(|p| p.source == PairSource::Synthetic) {
            assert!(
                SEED_CORPUS.contains(&pair.output.as_str()),
                "output not from corpus: {:?}",
                pair.output
            );
        }
    }

    #[test]
    fn custom_corpus_is_used_when_provided() {
        let corpus = vec!["The defendant claimed the contract was invalid today".to_string()];
        let pairs = generate_dataset(&corpus, &config(40)).unwrap();
        for pair in pairs.iter().filter(|p| p.source == PairSource::Synthetic) {
            assert_eq!(pair.output, corpus[0]);
        }
    }

    #[test]
    fn zero_samples_is_an_input_error() {
        assert!(generate_dataset(&[], &config(0)).is_err());
    }

    #[test]
    fn split_respects_the_ratio() {
        let pairs = generate_dataset(&[], &config(200)).unwrap();
        let total = pairs.len();
        let mut rng = StdRng::seed_from_u64(1);
        let (train, val) = split_dataset(pairs, 0.1, &mut rng);
        assert_eq!(train.len() + val.len(), total);
        let expected_val = total - ((total as f64) * 0.9) as usize;
        assert_eq!(val.len(), expected_val);
    }

    #[test]
    fn handcrafted_pairs_can_be_excluded() {
        let pairs = generate_dataset(
            &[],
            &DatasetConfig {
                include_handcrafted: false,
                ..config(50)
            },
        )
        .unwrap();
        assert!(pairs.iter().all(|p| p.source != PairSource::Curated));
    }
}

//! Clean-text corpus acquisition.
//!
//! Three sources feed training-data generation:
//!
//! - Wikipedia (MediaWiki extracts API: curated article list, then random
//!   articles until the target is met)
//! - Project Gutenberg (public-domain books, header/footer stripped)
//! - generated news-style sentences (template expansion, no network)
//!
//! Downloaded text goes through sentence extraction and a quality filter so
//! only well-formed standalone sentences reach the generator.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use clap::ValueEnum;
use once_cell::sync::Lazy;
use rand::prelude::*;
use regex::Regex;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::AppError;

const WIKIPEDIA_API: &str = "https://en.wikipedia.org/w/api.php";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const FETCH_PAUSE: Duration = Duration::from_millis(500);
const BOOK_PAUSE: Duration = Duration::from_secs(1);

/// Give up after this many consecutive failed fetches; the network is gone,
/// not unlucky.
const MAX_CONSECUTIVE_FAILURES: usize = 10;

/// Curated high-quality articles fetched before falling back to random ones.
const WIKIPEDIA_ARTICLES: &[&str] = &[
    "Artificial_intelligence",
    "Machine_learning",
    "Natural_language_processing",
    "Computer_science",
    "Software_engineering",
    "Data_science",
    "Climate_change",
    "Renewable_energy",
    "Electric_vehicle",
    "Cryptocurrency",
    "Blockchain",
    "United_States",
    "European_Union",
    "United_Nations",
    "World_War_II",
    "Industrial_Revolution",
    "Renaissance",
    "Democracy",
    "Human_rights",
    "International_law",
    "Psychology",
    "Cognitive_science",
    "Neuroscience",
    "Medicine",
    "Public_health",
    "Vaccination",
    "Education",
    "University",
    "Internet",
    "Social_media",
    "Space_exploration",
    "Evolution",
    "Genetics",
    "Economics",
    "Inflation",
];

/// Public-domain books with reliably clean English prose.
const GUTENBERG_BOOKS: &[(&str, &str)] = &[
    ("1342", "Pride and Prejudice"),
    ("11", "Alice's Adventures in Wonderland"),
    ("1661", "The Adventures of Sherlock Holmes"),
    ("98", "A Tale of Two Cities"),
    ("84", "Frankenstein"),
    ("1232", "The Prince"),
    ("2701", "Moby Dick"),
    ("74", "The Adventures of Tom Sawyer"),
    ("1400", "Great Expectations"),
    ("5200", "Metamorphosis"),
];

/// Where to pull clean sentences from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CorpusSource {
    Wikipedia,
    Gutenberg,
    News,
    All,
}

pub struct CorpusClient {
    client: Client,
}

impl CorpusClient {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("mindtype-corpus/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::failure(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Download sentences from the given source. The result is deduplicated,
    /// shuffled with `rng`, and truncated to `target`.
    pub fn download(
        &self,
        source: CorpusSource,
        target: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<String>, AppError> {
        let mut sentences = match source {
            CorpusSource::Wikipedia => self.download_wikipedia(target)?,
            CorpusSource::Gutenberg => self.download_gutenberg(target)?,
            CorpusSource::News => generate_news(target, rng),
            CorpusSource::All => {
                let mut all = self.download_wikipedia(target / 2)?;
                all.extend(self.download_gutenberg(target / 3)?);
                all.extend(generate_news(target / 6, rng));
                all
            }
        };

        sentences = dedup(sentences);
        sentences.shuffle(rng);
        sentences.truncate(target);
        Ok(sentences)
    }

    fn download_wikipedia(&self, target: usize) -> Result<Vec<String>, AppError> {
        let mut sentences = Vec::new();
        let mut failures = 0usize;

        for title in WIKIPEDIA_ARTICLES {
            if sentences.len() >= target {
                break;
            }
            match self.fetch_article(title) {
                Ok(Some(content)) => {
                    failures = 0;
                    sentences.extend(extract_sentences(&content, 100));
                }
                Ok(None) => {}
                Err(err) => {
                    failures += 1;
                    eprintln!("warning: skipping article {title}: {err}");
                    if failures >= MAX_CONSECUTIVE_FAILURES {
                        return Err(AppError::failure(
                            "Too many consecutive Wikipedia failures; aborting download.",
                        ));
                    }
                }
            }
            thread::sleep(FETCH_PAUSE);
        }

        while sentences.len() < target {
            let fetched = self
                .fetch_random_title()
                .and_then(|title| self.fetch_article(&title));
            match fetched {
                Ok(Some(content)) => {
                    failures = 0;
                    sentences.extend(extract_sentences(&content, 50));
                }
                Ok(None) => {}
                Err(err) => {
                    failures += 1;
                    eprintln!("warning: random article fetch failed: {err}");
                    if failures >= MAX_CONSECUTIVE_FAILURES {
                        return Err(AppError::failure(
                            "Too many consecutive Wikipedia failures; aborting download.",
                        ));
                    }
                }
            }
            thread::sleep(FETCH_PAUSE);
        }

        Ok(sentences)
    }

    fn fetch_article(&self, title: &str) -> Result<Option<String>, AppError> {
        let resp = self
            .client
            .get(WIKIPEDIA_API)
            .query(&[
                ("action", "query"),
                ("titles", title),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("format", "json"),
            ])
            .send()
            .map_err(|e| AppError::failure(format!("Wikipedia request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::failure(format!(
                "Wikipedia request failed with status {}.",
                resp.status()
            )));
        }

        let body: ExtractResponse = resp
            .json()
            .map_err(|e| AppError::failure(format!("Failed to parse Wikipedia response: {e}")))?;

        let extract = body.query.and_then(|q| {
            q.pages
                .into_iter()
                .find(|(id, _)| id != "-1")
                .and_then(|(_, page)| page.extract)
        });
        Ok(extract.filter(|e| !e.is_empty()))
    }

    fn fetch_random_title(&self) -> Result<String, AppError> {
        let resp = self
            .client
            .get(WIKIPEDIA_API)
            .query(&[
                ("action", "query"),
                ("list", "random"),
                ("rnnamespace", "0"),
                ("rnlimit", "1"),
                ("format", "json"),
            ])
            .send()
            .map_err(|e| AppError::failure(format!("Wikipedia request failed: {e}")))?;

        let body: RandomResponse = resp
            .json()
            .map_err(|e| AppError::failure(format!("Failed to parse Wikipedia response: {e}")))?;

        body.query
            .and_then(|q| q.random.into_iter().next())
            .map(|page| page.title)
            .ok_or_else(|| AppError::failure("Wikipedia returned no random article."))
    }

    fn download_gutenberg(&self, target: usize) -> Result<Vec<String>, AppError> {
        let mut sentences = Vec::new();

        for (book_id, title) in GUTENBERG_BOOKS {
            if sentences.len() >= target {
                break;
            }
            match self.fetch_book(book_id) {
                Ok(content) => {
                    let body = strip_gutenberg_boilerplate(&content);
                    sentences.extend(extract_sentences(body, 500));
                }
                Err(err) => {
                    eprintln!("warning: skipping book {title}: {err}");
                }
            }
            thread::sleep(BOOK_PAUSE);
        }

        Ok(sentences)
    }

    fn fetch_book(&self, book_id: &str) -> Result<String, AppError> {
        // Gutenberg hosts files under two URL schemes; try both.
        let urls = [
            format!("https://www.gutenberg.org/files/{book_id}/{book_id}-0.txt"),
            format!("https://www.gutenberg.org/cache/epub/{book_id}/pg{book_id}.txt"),
        ];

        let mut last_err = AppError::failure("No Gutenberg URL attempted.");
        for url in urls {
            match self.client.get(&url).send() {
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .text()
                        .map_err(|e| AppError::failure(format!("Failed to read book body: {e}")));
                }
                Ok(resp) => {
                    last_err =
                        AppError::failure(format!("Book fetch failed with status {}.", resp.status()));
                }
                Err(e) => {
                    last_err = AppError::failure(format!("Book fetch failed: {e}"));
                }
            }
        }
        Err(last_err)
    }
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    pages: std::collections::HashMap<String, ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    #[serde(default)]
    extract: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RandomResponse {
    query: Option<RandomQuery>,
}

#[derive(Debug, Deserialize)]
struct RandomQuery {
    random: Vec<RandomPage>,
}

#[derive(Debug, Deserialize)]
struct RandomPage {
    title: String,
}

/// Drop the Project Gutenberg license header/footer.
fn strip_gutenberg_boilerplate(content: &str) -> &str {
    let mut body = content;
    for marker in ["*** START OF", "***START OF"] {
        if let Some(idx) = body.find(marker) {
            // Skip to the end of the marker line.
            body = match body[idx..].find('\n') {
                Some(nl) => &body[idx + nl + 1..],
                None => &body[idx..],
            };
            break;
        }
    }
    for marker in ["*** END OF", "***END OF"] {
        if let Some(idx) = body.find(marker) {
            body = &body[..idx];
            break;
        }
    }
    body
}

/// News-style sentences via template expansion. No network involved; this
/// source exists because real news APIs require keys.
pub fn generate_news(target: usize, rng: &mut StdRng) -> Vec<String> {
    const TEMPLATES: &[&str] = &[
        "The {adj} {noun} announced new initiatives on {day}.",
        "Experts say the {noun} could {verb} by {percent} percent this year.",
        "The government is considering new {noun} regulations.",
        "Scientists discovered a {adj} method for {gerund} {noun}.",
        "The company reported {adj} earnings for the quarter.",
        "Officials confirmed the {noun} will begin next month.",
        "The study found that {percent} percent of participants {verb}.",
        "Leaders gathered to discuss the future of {noun}.",
        "The report highlights concerns about {noun} in the region.",
        "Analysts predict the market will {verb} in the coming weeks.",
    ];
    const ADJECTIVES: &[&str] = &[
        "new", "significant", "major", "important", "recent", "growing", "increasing", "notable",
        "substantial", "remarkable",
    ];
    const NOUNS: &[&str] = &[
        "policy",
        "technology",
        "economy",
        "industry",
        "research",
        "development",
        "initiative",
        "program",
        "investment",
        "partnership",
    ];
    const VERBS: &[&str] = &["improve", "change", "grow", "expand", "develop", "increase", "advance"];
    const GERUNDS: &[&str] = &[
        "improving",
        "developing",
        "understanding",
        "processing",
        "analyzing",
    ];
    const DAYS: &[&str] = &["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];
    const PERCENTS: &[&str] = &["5", "10", "15", "20", "25", "30"];

    let pick = |list: &[&'static str], rng: &mut StdRng| -> &'static str {
        list.choose(rng).copied().unwrap_or("")
    };

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(target);
    // Bounded attempts: the template space is finite, so demanding too many
    // unique sentences must terminate rather than spin.
    let max_attempts = target.saturating_mul(20).max(1000);

    for _ in 0..max_attempts {
        if out.len() >= target {
            break;
        }
        let template = TEMPLATES.choose(rng).copied().unwrap_or(TEMPLATES[0]);
        let sentence = template
            .replace("{adj}", pick(ADJECTIVES, rng))
            .replace("{noun}", pick(NOUNS, rng))
            .replace("{verb}", pick(VERBS, rng))
            .replace("{gerund}", pick(GERUNDS, rng))
            .replace("{day}", pick(DAYS, rng))
            .replace("{percent}", pick(PERCENTS, rng));
        if seen.insert(sentence.clone()) {
            out.push(sentence);
        }
    }

    out
}

static CITATIONS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").expect("citation pattern"));
static PAREN_REFS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\d{4}[^)]*\)").expect("paren-ref pattern"));
static URLS: Lazy<Regex> = Lazy::new(|| Regex::new(r"http\S+").expect("url pattern"));
static EMAILS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+@\S+").expect("email pattern"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern"));

/// Normalize raw article/book text before sentence splitting.
pub fn clean_text(text: &str) -> String {
    let text = CITATIONS.replace_all(text, "");
    let text = PAREN_REFS.replace_all(&text, "");
    let text = URLS.replace_all(&text, "");
    let text = EMAILS.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Split on terminal-punctuation runs followed by whitespace. Keeps the
/// punctuation with the preceding sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0usize;
    let mut in_ending = false;

    for (idx, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            in_ending = true;
        } else if in_ending {
            if c.is_whitespace() {
                let sentence = text[start..idx].trim();
                if !sentence.is_empty() {
                    out.push(sentence.to_string());
                }
                start = idx + c.len_utf8();
            }
            in_ending = false;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail.to_string());
    }
    out
}

/// Quality filter for training sentences.
pub fn is_clean_sentence(sentence: &str) -> bool {
    let sentence = sentence.trim();
    let char_count = sentence.chars().count();
    if !(30..=500).contains(&char_count) {
        return false;
    }

    let Some(first) = sentence.chars().next() else {
        return false;
    };
    if !first.is_uppercase() {
        return false;
    }
    if !sentence.ends_with(['.', '!', '?']) {
        return false;
    }

    let words: Vec<&str> = sentence.split_whitespace().collect();
    if !(5..=80).contains(&words.len()) {
        return false;
    }

    let digits = sentence.chars().filter(|c| c.is_ascii_digit()).count();
    if digits as f64 > char_count as f64 * 0.2 {
        return false;
    }

    if sentence.chars().any(|c| "{}[]<>|\\^~`".contains(c)) {
        return false;
    }

    if ["•", "-", "*", "1.", "2.", "a)", "b)"]
        .iter()
        .any(|prefix| sentence.starts_with(prefix))
    {
        return false;
    }

    // ALL-CAPS words are usually headers leaking through extraction.
    if words
        .iter()
        .any(|w| w.len() > 2 && w.chars().all(|c| c.is_uppercase()))
    {
        return false;
    }

    true
}

/// Clean, split, and filter raw text down to at most `max` usable sentences.
pub fn extract_sentences(text: &str, max: usize) -> Vec<String> {
    let cleaned = clean_text(text);
    split_sentences(&cleaned)
        .into_iter()
        .filter(|s| is_clean_sentence(s))
        .take(max)
        .collect()
}

fn dedup(sentences: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    sentences
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_citations_urls_and_emails() {
        let raw = "Photosynthesis[1] converts light.  See https://example.org or\nmail bob@example.com now.";
        let cleaned = clean_text(raw);
        assert_eq!(cleaned, "Photosynthesis converts light. See or mail now.");
    }

    #[test]
    fn split_sentences_keeps_punctuation_runs_together() {
        let parts = split_sentences("First one. Second?! Third has no ending");
        assert_eq!(
            parts,
            vec!["First one.", "Second?!", "Third has no ending"]
        );
    }

    #[test]
    fn sentence_filter_enforces_shape() {
        assert!(is_clean_sentence(
            "The research demonstrates a significant correlation between variables."
        ));
        // Too short.
        assert!(!is_clean_sentence("Too short."));
        // No terminal punctuation.
        assert!(!is_clean_sentence(
            "This sentence is long enough but never actually ends properly"
        ));
        // Lowercase start.
        assert!(!is_clean_sentence(
            "this sentence is long enough and ends with punctuation."
        ));
        // Header leak.
        assert!(!is_clean_sentence(
            "The CHAPTER heading leaked into this otherwise fine sentence."
        ));
        // List marker.
        assert!(!is_clean_sentence(
            "- The bullet survived extraction and should be filtered out."
        ));
    }

    #[test]
    fn extract_sentences_applies_the_full_pipeline() {
        let raw = "The ancient library held secrets waiting to be discovered.[2] \
                   tiny. The garden bloomed with flowers of every imaginable color.";
        let sentences = extract_sentences(raw, 10);
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].starts_with("The ancient library"));
    }

    #[test]
    fn gutenberg_boilerplate_is_removed() {
        let content = "junk header\n*** START OF THE PROJECT GUTENBERG EBOOK ***\nThe story begins here.\n*** END OF THE PROJECT GUTENBERG EBOOK ***\nlicense text";
        let body = strip_gutenberg_boilerplate(content);
        assert_eq!(body.trim(), "The story begins here.");
    }

    #[test]
    fn news_generation_is_seeded_and_unique() {
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        let first = generate_news(25, &mut a);
        let second = generate_news(25, &mut b);
        assert_eq!(first, second, "same seed, same sentences");
        assert_eq!(first.len(), 25);
        let unique: HashSet<&String> = first.iter().collect();
        assert_eq!(unique.len(), first.len());
    }
}

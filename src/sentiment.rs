//! Headline sentiment: a lexicon classifier behind a trait, plus the
//! best-effort annotator that never propagates a classification failure.

use crate::error::ClassifyError;
use crate::news::NewsItem;
use regex::Regex;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentResult {
    pub title: String,
    pub label: SentimentLabel,
}

/// Single-text-in, single-label-out classifier seam. Swappable for a model
/// client without touching callers.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<SentimentLabel, ClassifyError>;
}

// Word lists in the spirit of financial sentiment lexicons. Net sign of
// bullish minus bearish hits decides the label.
const BULLISH_WORDS: &[&str] = &[
    "beat", "beats", "breakout", "bullish", "buyback", "gain", "gains", "growth", "jump",
    "jumps", "outperform", "profit", "rally", "rebound", "record", "rise", "rises", "soar",
    "soars", "strong", "surge", "surges", "upgrade", "upgraded", "win", "wins",
];

const BEARISH_WORDS: &[&str] = &[
    "bearish", "crash", "cut", "cuts", "decline", "declines", "default", "downgrade",
    "downgraded", "drop", "drops", "fall", "falls", "fraud", "lawsuit", "loss", "losses",
    "miss", "misses", "plunge", "plunges", "probe", "recall", "slump", "slumps", "tumble",
    "tumbles", "weak",
];

pub struct LexiconClassifier {
    word_re: Regex,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            // Alphabetic runs only; prices, tickers and punctuation carry no
            // sentiment here.
            word_re: Regex::new(r"[a-z]+").expect("static word regex"),
        }
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<SentimentLabel, ClassifyError> {
        let lowered = text.to_lowercase();
        let mut tokens = 0usize;
        let mut score = 0i32;

        for word in self.word_re.find_iter(&lowered) {
            tokens += 1;
            let word = word.as_str();
            if BULLISH_WORDS.contains(&word) {
                score += 1;
            } else if BEARISH_WORDS.contains(&word) {
                score -= 1;
            }
        }

        if tokens == 0 {
            return Err(ClassifyError::EmptyInput);
        }

        Ok(match score {
            s if s > 0 => SentimentLabel::Positive,
            s if s < 0 => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        })
    }
}

/// Classify each item, in order. A failing item degrades to Neutral and the
/// rest still get real labels; this function never errors.
pub fn annotate(classifier: &dyn Classifier, items: &[NewsItem]) -> Vec<SentimentResult> {
    items
        .iter()
        .map(|item| {
            let text = format!("{} {}", item.title, item.description);
            let label = match classifier.classify(&text) {
                Ok(label) => label,
                Err(err) => {
                    debug!(title = %item.title, error = %err, "classification failed, labeling neutral");
                    SentimentLabel::Neutral
                }
            };
            SentimentResult {
                title: item.title.clone(),
                label,
            }
        })
        .collect()
}

//! Sentiment classification for review text.
//!
//! [`SentimentClassifier`] is the only entry point the rest of the crate uses.
//! It owns at most one inference backend, loaded once when the classifier is
//! built. If loading fails the classifier stays degraded for the life of the
//! process and every call returns [`SentimentVerdict::FALLBACK`]. Inference
//! itself runs on tokio's blocking pool, and any failure there (an error, a
//! panic, a timeout, or a nonsensical confidence) is absorbed into the same
//! neutral verdict. `classify` therefore has no error type.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use regex::Regex;
use tracing::{debug, error, info, warn};
use unicode_normalization::UnicodeNormalization;

use crate::config::{BackendKind, SentimentConfig};
use crate::metrics::MetricsCollector;
use crate::models::{SentimentLabel, SentimentVerdict};

/// Binary class reported by an inference backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Positive class
    Positive,
    /// Negative class
    Negative,
}

/// Raw backend output: a class and the model's confidence in it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class
    pub polarity: Polarity,
    /// Confidence in `polarity`, expected in [0, 1]
    pub confidence: f64,
}

/// A loaded binary sentiment model.
///
/// Implementations are shared read-only across concurrent classifications.
#[cfg_attr(test, mockall::automock)]
pub trait SentimentBackend: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Classify one piece of text. May block; it is always called off the async runtime.
    fn predict(&self, text: &str) -> Result<Prediction>;
}

/// Turn a backend prediction into a verdict.
///
/// The score is the confidence signed by class. Returns `None` when the
/// confidence is not a usable number, which the classifier treats as a failed
/// inference. Confidences above 1 are clamped.
#[must_use]
pub fn verdict_from_prediction(prediction: &Prediction) -> Option<SentimentVerdict> {
    let confidence = prediction.confidence;
    if !confidence.is_finite() || confidence <= 0.0 {
        return None;
    }
    let confidence = confidence.min(1.0);

    Some(match prediction.polarity {
        Polarity::Positive => SentimentVerdict {
            score: confidence,
            label: SentimentLabel::Positive,
        },
        Polarity::Negative => SentimentVerdict {
            score: -confidence,
            label: SentimentLabel::Negative,
        },
    })
}

/// Process-wide sentiment classifier with a documented degraded mode
#[derive(Clone)]
pub struct SentimentClassifier {
    backend: Option<Arc<dyn SentimentBackend>>,
    max_text_length: usize,
    timeout: Duration,
    metrics: MetricsCollector,
}

impl SentimentClassifier {
    /// Load the configured backend. Never fails: a load error leaves the
    /// classifier permanently degraded.
    ///
    /// Loading a pretrained model can take a while and may touch the network,
    /// so call this from a blocking context.
    #[must_use]
    pub fn load(config: &SentimentConfig) -> Self {
        let backend = match load_backend(config.backend) {
            Ok(Some(backend)) => {
                info!(backend = backend.name(), "Sentiment model loaded");
                Some(backend)
            }
            Ok(None) => {
                warn!("Sentiment backend disabled; all reviews will be recorded as neutral");
                None
            }
            Err(e) => {
                error!(error = %e, "Model load failed; sentiment classification degraded to neutral");
                None
            }
        };

        Self::build(backend, config)
    }

    /// Build a classifier around an already-loaded backend
    #[must_use]
    pub fn with_backend(backend: Arc<dyn SentimentBackend>, config: &SentimentConfig) -> Self {
        Self::build(Some(backend), config)
    }

    /// A classifier with no backend; every verdict is the fallback
    #[must_use]
    pub fn unavailable(config: &SentimentConfig) -> Self {
        Self::build(None, config)
    }

    fn build(backend: Option<Arc<dyn SentimentBackend>>, config: &SentimentConfig) -> Self {
        let metrics = MetricsCollector::default();
        metrics.set_classifier_available(backend.is_some());

        Self {
            backend,
            max_text_length: config.max_text_length,
            timeout: Duration::from_secs(config.inference_timeout_secs),
            metrics,
        }
    }

    /// True when a backend is loaded
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Name of the loaded backend, if any
    #[must_use]
    pub fn backend_name(&self) -> Option<&'static str> {
        self.backend.as_ref().map(|backend| backend.name())
    }

    /// Classify review text. Never fails.
    pub async fn classify(&self, text: &str) -> SentimentVerdict {
        let Some(backend) = &self.backend else {
            return self.fallback("model_unavailable");
        };

        let backend = Arc::clone(backend);
        let input = truncate_chars(text, self.max_text_length).to_owned();
        let start = Instant::now();

        let task = tokio::task::spawn_blocking(move || backend.predict(&input));

        let verdict = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(prediction))) => match verdict_from_prediction(&prediction) {
                Some(verdict) => verdict,
                None => {
                    warn!(
                        confidence = prediction.confidence,
                        "Sentiment backend returned an unusable confidence"
                    );
                    self.fallback("invalid_confidence")
                }
            },
            Ok(Ok(Err(e))) => {
                warn!(error = %e, "Sentiment inference failed");
                self.fallback("inference_error")
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Sentiment inference task did not complete");
                self.fallback("task_failed")
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "Sentiment inference timed out");
                self.fallback("timeout")
            }
        };

        let elapsed = start.elapsed();
        self.metrics.record_classification(&verdict, elapsed);
        debug!(
            label = %verdict.label,
            score = verdict.score,
            duration_ms = elapsed.as_millis(),
            "Review text classified"
        );

        verdict
    }

    fn fallback(&self, reason: &'static str) -> SentimentVerdict {
        self.metrics.record_fallback(reason);
        SentimentVerdict::FALLBACK
    }
}

impl std::fmt::Debug for SentimentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentClassifier")
            .field("backend", &self.backend_name())
            .field("max_text_length", &self.max_text_length)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn load_backend(kind: BackendKind) -> Result<Option<Arc<dyn SentimentBackend>>> {
    match kind {
        BackendKind::Lexicon => Ok(Some(Arc::new(LexiconBackend::new()?))),
        BackendKind::Transformer => load_transformer(),
        BackendKind::Disabled => Ok(None),
    }
}

#[cfg(feature = "advanced-nlp")]
fn load_transformer() -> Result<Option<Arc<dyn SentimentBackend>>> {
    Ok(Some(Arc::new(transformer::TransformerBackend::load()?)))
}

#[cfg(not(feature = "advanced-nlp"))]
fn load_transformer() -> Result<Option<Arc<dyn SentimentBackend>>> {
    Err(anyhow::anyhow!(
        "transformer backend requested but the crate was built without the `advanced-nlp` feature"
    ))
}

/// Longest prefix of `text` with at most `max_chars` characters
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("good", 1.0),
    ("great", 1.5),
    ("excellent", 2.0),
    ("amazing", 2.0),
    ("wonderful", 1.8),
    ("fantastic", 1.8),
    ("happy", 1.2),
    ("love", 2.0),
    ("loved", 2.0),
    ("like", 1.0),
    ("best", 1.5),
    ("better", 1.2),
    ("awesome", 1.8),
    ("perfect", 2.0),
    ("brilliant", 1.8),
    ("outstanding", 1.8),
    ("superb", 1.8),
    ("delightful", 1.5),
    ("pleased", 1.2),
    ("satisfied", 1.0),
    ("recommend", 1.5),
    ("reliable", 1.2),
    ("sturdy", 1.0),
    ("comfortable", 1.2),
    ("fast", 0.8),
    ("worth", 1.0),
    ("impressed", 1.5),
    ("works", 0.6),
    ("nice", 1.0),
    ("easy", 0.8),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("bad", -1.0),
    ("terrible", -2.0),
    ("awful", -2.0),
    ("horrible", -2.0),
    ("worst", -2.0),
    ("hate", -2.0),
    ("dislike", -1.0),
    ("poor", -1.2),
    ("disappointing", -1.5),
    ("disappointed", -1.5),
    ("frustrated", -1.5),
    ("annoyed", -1.2),
    ("useless", -1.5),
    ("worthless", -1.8),
    ("broken", -1.5),
    ("broke", -1.5),
    ("defective", -1.8),
    ("cheap", -0.8),
    ("flimsy", -1.2),
    ("waste", -1.8),
    ("refund", -1.0),
    ("returned", -1.0),
    ("slow", -0.8),
    ("junk", -1.8),
    ("garbage", -2.0),
    ("mediocre", -1.0),
    ("overpriced", -1.2),
    ("fails", -1.2),
    ("failed", -1.2),
    ("meh", -0.5),
];

// Intensifiers that scale the following sentiment word
const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("extremely", 2.0),
    ("incredibly", 2.0),
    ("absolutely", 2.0),
    ("completely", 1.8),
    ("totally", 1.8),
    ("really", 1.3),
    ("so", 1.2),
    ("quite", 1.2),
    ("somewhat", 0.8),
    ("slightly", 0.7),
    ("barely", 0.5),
];

// Negation words that flip sentiment; apostrophes are stripped before lookup
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nothing", "neither", "nor", "dont", "doesnt", "didnt", "isnt", "wasnt",
    "cant", "wont", "hardly",
];

/// Weighted-lexicon backend.
///
/// Scores each sentiment word (scaled by a preceding intensifier, flipped by a
/// negation in the two preceding words), averages them into [-1, 1] and maps
/// the magnitude onto a confidence in [0.5, 1] so its output has the same shape
/// as a binary classifier's.
pub struct LexiconBackend {
    url_regex: Regex,
    special_chars_regex: Regex,
    extra_spaces_regex: Regex,
}

impl LexiconBackend {
    /// Compile the text-cleaning expressions
    pub fn new() -> Result<Self> {
        let url_regex = Regex::new(r"https?://\S+|www\.\S+")
            .map_err(|e| anyhow::anyhow!("Failed to compile URL regex: {e}"))?;
        let special_chars_regex = Regex::new(r"[^\w\s]")
            .map_err(|e| anyhow::anyhow!("Failed to compile special chars regex: {e}"))?;
        let extra_spaces_regex = Regex::new(r"\s+")
            .map_err(|e| anyhow::anyhow!("Failed to compile spaces regex: {e}"))?;

        Ok(Self {
            url_regex,
            special_chars_regex,
            extra_spaces_regex,
        })
    }

    /// Normalize, strip URLs and punctuation, collapse whitespace, lowercase
    #[must_use]
    pub fn clean_text(&self, text: &str) -> String {
        let normalized = text.nfc().collect::<String>();
        let no_urls = self.url_regex.replace_all(&normalized, " ");
        // "don't" -> "dont" so negations survive punctuation removal
        let no_apostrophes = no_urls.replace(['\'', '\u{2019}'], "");
        let no_special = self.special_chars_regex.replace_all(&no_apostrophes, " ");
        let normalized_spaces = self.extra_spaces_regex.replace_all(&no_special, " ");

        normalized_spaces.trim().to_lowercase()
    }

    /// Lexicon score in [-1, 1]; 0 when no sentiment words are present
    #[must_use]
    pub fn raw_score(&self, text: &str) -> f64 {
        let cleaned = self.clean_text(text);
        let words: Vec<&str> = cleaned.split_whitespace().collect();

        let mut total_sentiment = 0.0;
        let mut word_count = 0.0;

        for (i, word) in words.iter().enumerate() {
            let Some(weight) = lookup(POSITIVE_WORDS, word).or_else(|| lookup(NEGATIVE_WORDS, word))
            else {
                continue;
            };
            let mut sentiment = weight;

            if i > 0 {
                if let Some(intensity) = lookup(INTENSIFIERS, words[i - 1]) {
                    sentiment *= intensity;
                }
            }

            let has_negation = (i >= 1 && NEGATIONS.contains(&words[i - 1]))
                || (i >= 2 && NEGATIONS.contains(&words[i - 2]));
            if has_negation {
                sentiment = -sentiment * 0.8; // Flip and reduce intensity
            }

            total_sentiment += sentiment;
            word_count += 1.0;
        }

        if word_count == 0.0 {
            0.0
        } else {
            (total_sentiment / word_count).clamp(-1.0, 1.0)
        }
    }
}

fn lookup(table: &[(&str, f64)], word: &str) -> Option<f64> {
    table.iter().find(|(w, _)| *w == word).map(|(_, weight)| *weight)
}

impl SentimentBackend for LexiconBackend {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    fn predict(&self, text: &str) -> Result<Prediction> {
        let raw = self.raw_score(text);
        let polarity = if raw < 0.0 {
            Polarity::Negative
        } else {
            Polarity::Positive
        };

        Ok(Prediction {
            polarity,
            confidence: 0.5 + raw.abs() / 2.0,
        })
    }
}

#[cfg(feature = "advanced-nlp")]
mod transformer {
    use std::sync::Mutex;

    use anyhow::Result;
    use rust_bert::pipelines::sentiment::{SentimentConfig, SentimentModel, SentimentPolarity};

    use super::{Polarity, Prediction, SentimentBackend};

    /// DistilBERT fine-tuned on SST-2, via rust-bert.
    ///
    /// The libtorch-backed model is `Send` but not `Sync`, so it sits behind a mutex.
    /// Inferences through one backend therefore run one at a time; callers queue
    /// on the lock and each waits under its own timeout.
    pub(super) struct TransformerBackend {
        model: Mutex<SentimentModel>,
    }

    impl TransformerBackend {
        pub(super) fn load() -> Result<Self> {
            let model = SentimentModel::new(SentimentConfig::default())
                .map_err(|e| anyhow::anyhow!("Failed to load sentiment model: {e}"))?;
            Ok(Self {
                model: Mutex::new(model),
            })
        }
    }

    impl SentimentBackend for TransformerBackend {
        fn name(&self) -> &'static str {
            "distilbert-sst2"
        }

        fn predict(&self, text: &str) -> Result<Prediction> {
            let model = self
                .model
                .lock()
                .map_err(|_| anyhow::anyhow!("Sentiment model lock poisoned"))?;
            let output = model.predict([text]);
            let sentiment = output
                .first()
                .ok_or_else(|| anyhow::anyhow!("Sentiment model returned no prediction"))?;

            Ok(Prediction {
                polarity: match sentiment.polarity {
                    SentimentPolarity::Positive => Polarity::Positive,
                    SentimentPolarity::Negative => Polarity::Negative,
                },
                confidence: sentiment.score,
            })
        }
    }
}

//! Complexity classifiers: request text in, tier out.

use cascade_core::{ClassifierConfig, ClassifierPolicy, Result, Tier};

/// A total, deterministic mapping from request text to a tier.
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Tier;

    /// Short policy name for logs and reports.
    fn name(&self) -> &'static str;
}

fn lower_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).filter(|s| !s.is_empty()).collect()
}

fn first_match<'a>(text: &str, indicators: &'a [String]) -> Option<&'a str> {
    indicators.iter().find(|kw| text.contains(kw.as_str())).map(|kw| kw.as_str())
}

/// Word count plus indicator phrases.
///
/// Complex indicators (or a long request) are checked before simple
/// indicators, so text matching both lists lands in [`Tier::Complex`].
/// Anything matching neither list is [`Tier::Medium`].
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    word_threshold: usize,
    complex_indicators: Vec<String>,
    simple_indicators: Vec<String>,
}

impl KeywordClassifier {
    pub fn new(word_threshold: usize, complex_indicators: &[String], simple_indicators: &[String]) -> Self {
        Self {
            word_threshold,
            complex_indicators: lower_all(complex_indicators),
            simple_indicators: lower_all(simple_indicators),
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.word_threshold, &config.complex_indicators, &config.simple_indicators)
    }

    pub fn word_threshold(&self) -> usize {
        self.word_threshold
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }
}

impl Classifier for KeywordClassifier {
    fn classify(&self, text: &str) -> Tier {
        let lower = text.to_lowercase();
        let word_count = text.split_whitespace().count();

        if word_count > self.word_threshold {
            tracing::trace!(word_count, "long request");
            return Tier::Complex;
        }
        if let Some(kw) = first_match(&lower, &self.complex_indicators) {
            tracing::trace!(indicator = kw, "complex indicator");
            return Tier::Complex;
        }
        if let Some(kw) = first_match(&lower, &self.simple_indicators) {
            tracing::trace!(indicator = kw, "simple indicator");
            return Tier::Simple;
        }
        Tier::Medium
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Two-tier policy: character length above the threshold is "high"
/// ([`Tier::Complex`]), everything else is "low" ([`Tier::Simple`]).
#[derive(Debug, Clone, Copy)]
pub struct LengthClassifier {
    threshold: usize,
}

impl LengthClassifier {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }
}

impl Classifier for LengthClassifier {
    fn classify(&self, text: &str) -> Tier {
        if text.chars().count() > self.threshold {
            Tier::Complex
        } else {
            Tier::Simple
        }
    }

    fn name(&self) -> &'static str {
        "length"
    }
}

/// Build the classifier strategy named by the configuration.
pub fn classifier_from_config(config: &ClassifierConfig) -> Result<Box<dyn Classifier>> {
    config.validate()?;
    Ok(match config.policy {
        ClassifierPolicy::Keyword => Box::new(KeywordClassifier::from_config(config)),
        ClassifierPolicy::Length => Box::new(LengthClassifier::new(config.length_threshold)),
    })
}

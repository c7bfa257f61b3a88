//! Enricher: sentiment classification and key-phrase extraction over a record's
//! text fields, through injected analysis capabilities.

use crate::error::ScorerFault;
use crate::record::{EnrichedRecord, FieldValue, NormalizedRecord};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Sentiment class derived from the sign of a polarity score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Error,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Error => "error",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            "error" => Ok(Sentiment::Error),
            other => Err(format!("unknown sentiment `{other}`")),
        }
    }
}

/// `score > 0` positive, `score < 0` negative, exactly zero neutral.
pub fn classify(score: f64) -> Sentiment {
    if score > 0.0 {
        Sentiment::Positive
    } else if score < 0.0 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Output of a polarity scorer.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Polarity {
    pub score: f64,
    pub magnitude: f64,
}

/// Document-level polarity backend.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> Result<Polarity, ScorerFault>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Determiner,
    Preposition,
    Conjunction,
    Number,
    Punctuation,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub tag: PartOfSpeech,
}

/// Syntax backend producing part-of-speech tagged tokens.
pub trait SyntaxAnalyzer: Send + Sync {
    fn analyze_syntax(&self, text: &str) -> Result<Vec<Token>, ScorerFault>;
}

/// Key phrases: token text of nouns and verbs, in order, joined by `", "`.
pub fn key_phrases(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter(|t| matches!(t.tag, PartOfSpeech::Noun | PartOfSpeech::Verb))
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Join the named fields (missing or non-string values read as empty) with a single space.
pub fn analysis_text(record: &NormalizedRecord, text_fields: &[String]) -> String {
    text_fields
        .iter()
        .map(|f| match record.get(f) {
            Some(FieldValue::Str(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Per-record enrichment with pluggable backends. Cheap to clone.
#[derive(Clone)]
pub struct Enricher {
    scorer: Arc<dyn SentimentScorer>,
    syntax: Option<Arc<dyn SyntaxAnalyzer>>,
}

impl Enricher {
    pub fn new(scorer: Arc<dyn SentimentScorer>) -> Self {
        Self { scorer, syntax: None }
    }

    pub fn with_syntax(mut self, syntax: Arc<dyn SyntaxAnalyzer>) -> Self {
        self.syntax = Some(syntax);
        self
    }

    /// Built-in lexicon scorer and tagger.
    pub fn lexicon() -> Self {
        let lex = Arc::new(crate::lexicon::LexiconScorer::default());
        Self::new(lex).with_syntax(Arc::new(crate::lexicon::LexiconTagger::default()))
    }

    /// Never fails: any backend fault becomes an `error` record with zeroed fields.
    pub fn enrich(&self, record: NormalizedRecord, text_fields: &[String]) -> EnrichedRecord {
        let text = analysis_text(&record, text_fields);
        if text.trim().is_empty() {
            return EnrichedRecord {
                record,
                sentiment: Sentiment::Neutral,
                sentiment_score: 0.0,
                sentiment_magnitude: 0.0,
                key_phrases: String::new(),
            };
        }
        match self.analyze(&text) {
            Ok((polarity, phrases)) => EnrichedRecord {
                record,
                sentiment: classify(polarity.score),
                sentiment_score: polarity.score,
                sentiment_magnitude: polarity.magnitude,
                key_phrases: phrases,
            },
            Err(fault) => {
                tracing::warn!(error = %fault, "sentiment analysis failed; marking record as error");
                EnrichedRecord {
                    record,
                    sentiment: Sentiment::Error,
                    sentiment_score: 0.0,
                    sentiment_magnitude: 0.0,
                    key_phrases: String::new(),
                }
            }
        }
    }

    fn analyze(&self, text: &str) -> Result<(Polarity, String), ScorerFault> {
        let polarity = self.scorer.score(text)?;
        if !polarity.score.is_finite() || !polarity.magnitude.is_finite() {
            return Err(ScorerFault::Backend(format!(
                "non-finite polarity (score {}, magnitude {})",
                polarity.score, polarity.magnitude
            )));
        }
        let phrases = match &self.syntax {
            Some(syntax) => key_phrases(&syntax.analyze_syntax(text)?),
            None => String::new(),
        };
        Ok((polarity, phrases))
    }
}

//! Lightweight, dependency-free analysis backend: a word-valence sentiment lexicon
//! and a heuristic part-of-speech tagger.

use crate::error::ScorerFault;
use crate::sentiment::{PartOfSpeech, Polarity, SentimentScorer, SyntaxAnalyzer, Token};
use std::collections::HashMap;

const POSITIVE: &[(&str, f64)] = &[
    ("good", 0.7), ("great", 0.8), ("excellent", 1.0), ("amazing", 0.9), ("awesome", 0.9),
    ("love", 0.8), ("loved", 0.8), ("loving", 0.7), ("like", 0.3), ("liked", 0.3),
    ("happy", 0.8), ("glad", 0.5), ("nice", 0.6), ("best", 1.0), ("better", 0.5),
    ("wonderful", 1.0), ("fantastic", 0.9), ("beautiful", 0.85), ("brilliant", 0.9),
    ("positive", 0.5), ("win", 0.6), ("won", 0.6), ("success", 0.7), ("successful", 0.75),
    ("helpful", 0.6), ("thanks", 0.4), ("thank", 0.4), ("grateful", 0.7), ("hope", 0.4),
    ("hopeful", 0.5), ("fair", 0.4), ("affordable", 0.5), ("cheap", 0.3), ("easy", 0.4),
    ("safe", 0.5), ("proud", 0.7), ("enjoy", 0.6), ("enjoyed", 0.6), ("fun", 0.6),
    ("exciting", 0.7), ("excited", 0.7), ("welcome", 0.6), ("strong", 0.4), ("free", 0.4),
    ("benefit", 0.5), ("improve", 0.5), ("improved", 0.5), ("support", 0.4), ("perfect", 1.0),
    ("recommend", 0.5), ("interesting", 0.5), ("kind", 0.6), ("lucky", 0.6), ("calm", 0.3),
];

const NEGATIVE: &[(&str, f64)] = &[
    ("bad", -0.7), ("terrible", -1.0), ("awful", -1.0), ("horrible", -1.0), ("worst", -1.0),
    ("worse", -0.6), ("hate", -0.8), ("hated", -0.8), ("sad", -0.6), ("angry", -0.7),
    ("poor", -0.5), ("wrong", -0.5), ("fail", -0.6), ("failed", -0.6), ("failure", -0.7),
    ("problem", -0.4), ("problems", -0.4), ("crisis", -0.7), ("expensive", -0.5),
    ("unaffordable", -0.7), ("scam", -0.8), ("broken", -0.6), ("stupid", -0.8),
    ("disappointed", -0.7), ("disappointing", -0.7), ("annoying", -0.6), ("difficult", -0.4),
    ("hard", -0.2), ("sick", -0.5), ("pain", -0.6), ("hurt", -0.6), ("lost", -0.4),
    ("lose", -0.4), ("unfair", -0.6), ("corrupt", -0.8), ("dangerous", -0.7), ("fear", -0.6),
    ("scared", -0.6), ("worried", -0.5), ("worry", -0.5), ("stress", -0.5), ("stressed", -0.5),
    ("ugly", -0.7), ("boring", -0.5), ("useless", -0.7), ("nightmare", -0.9), ("disaster", -0.9),
    ("rejected", -0.6), ("denied", -0.5), ("delay", -0.4), ("delayed", -0.4), ("unemployed", -0.5),
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nobody", "nothing", "neither", "nor", "without", "hardly",
    "barely", "isn't", "aren't", "wasn't", "weren't", "don't", "doesn't", "didn't", "can't",
    "cannot", "won't", "wouldn't", "shouldn't", "couldn't",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3), ("really", 1.3), ("extremely", 1.5), ("so", 1.2), ("super", 1.3),
    ("incredibly", 1.5), ("totally", 1.3), ("absolutely", 1.4), ("quite", 1.1),
    ("slightly", 0.5), ("somewhat", 0.7),
];

/// Words within this many tokens after a negation have their valence flipped.
const NEGATION_WINDOW: usize = 3;
/// Scale applied to a negated valence.
const NEGATION_SCALE: f64 = -0.5;

/// Lexicon-based polarity scorer.
///
/// `score` is the mean valence of the sentiment-bearing words in the text, clamped to
/// `[-1, 1]`; `magnitude` is the sum of their absolute valences.
pub struct LexiconScorer {
    valence: HashMap<&'static str, f64>,
    intensity: HashMap<&'static str, f64>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        let valence = POSITIVE.iter().chain(NEGATIVE.iter()).copied().collect();
        let intensity = INTENSIFIERS.iter().copied().collect();
        Self { valence, intensity }
    }
}

impl LexiconScorer {
    /// Add or override a word's valence (clamped to `[-1, 1]`).
    pub fn with_word(mut self, word: &'static str, valence: f64) -> Self {
        self.valence.insert(word, valence.clamp(-1.0, 1.0));
        self
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> Result<Polarity, ScorerFault> {
        let words: Vec<String> = words(text).map(|w| w.to_lowercase()).collect();

        let mut sum = 0.0;
        let mut magnitude = 0.0;
        let mut hits = 0usize;
        let mut negated_for = 0usize;
        let mut boost = 1.0;

        for w in &words {
            if NEGATIONS.contains(&w.as_str()) {
                negated_for = NEGATION_WINDOW;
                continue;
            }
            if let Some(m) = self.intensity.get(w.as_str()) {
                boost *= m;
                continue;
            }
            if let Some(v) = self.valence.get(w.as_str()) {
                let mut v = (v * boost).clamp(-1.0, 1.0);
                if negated_for > 0 {
                    v *= NEGATION_SCALE;
                    negated_for = 0;
                }
                sum += v;
                magnitude += v.abs();
                hits += 1;
            } else {
                negated_for = negated_for.saturating_sub(1);
            }
            boost = 1.0;
        }

        let score = if hits == 0 { 0.0 } else { (sum / hits as f64).clamp(-1.0, 1.0) };
        Ok(Polarity { score, magnitude })
    }
}

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any",
    "all", "both", "either", "another", "such", "what", "which", "whose", "my", "your",
    "his", "her", "its", "our", "their",
];
const PRONOUNS: &[&str] = &[
    "i", "me", "you", "he", "him", "she", "it", "we", "us", "they", "them", "myself",
    "yourself", "itself", "ourselves", "themselves", "who", "whom", "someone", "anyone",
    "everyone", "something", "anything", "everything", "i'm", "you're", "it's", "we're",
    "they're", "i've", "i'd", "i'll",
];
const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "by", "for", "with", "about", "against", "between", "into", "through",
    "during", "before", "after", "above", "below", "to", "from", "up", "down", "of", "off",
    "over", "under", "around", "near", "since", "until", "via", "per", "than", "like",
];
const CONJUNCTIONS: &[&str] = &[
    "and", "or", "but", "nor", "so", "yet", "because", "although", "though", "if", "unless",
    "while", "whereas", "whether", "when", "where", "as",
];
const ADVERBS: &[&str] = &[
    "not", "never", "very", "really", "too", "also", "just", "so", "still", "already",
    "always", "often", "sometimes", "here", "there", "now", "then", "again", "ever",
    "quite", "almost", "even", "soon", "today", "tomorrow", "yesterday", "how", "why",
];
const VERBS: &[&str] = &[
    "be", "is", "are", "was", "were", "been", "am", "have", "has", "had", "do", "does",
    "did", "will", "would", "can", "could", "should", "may", "might", "must", "shall",
    "get", "got", "go", "went", "gone", "make", "made", "take", "took", "know", "knew",
    "think", "thought", "see", "saw", "come", "came", "want", "need", "find", "found",
    "give", "gave", "tell", "told", "work", "call", "try", "ask", "feel", "felt", "leave",
    "left", "put", "mean", "keep", "let", "begin", "seem", "help", "show", "hear", "play",
    "run", "move", "live", "believe", "buy", "bought", "pay", "paid", "rent", "sell",
    "sold", "apply", "say", "said", "love", "hate", "enjoy", "hope", "worry", "fail",
    "win", "won", "lose", "lost", "hurt", "improve", "support", "recommend", "thank",
    "delay", "fear",
];

/// Heuristic tagger: closed-class word tables, a verb list, the sentiment lexicon
/// (as adjectives) and suffix rules. Everything else is a noun.
#[derive(Default)]
pub struct LexiconTagger;

impl LexiconTagger {
    pub fn tag_word(&self, word: &str) -> PartOfSpeech {
        if word.chars().all(|c| !c.is_alphanumeric()) {
            return PartOfSpeech::Punctuation;
        }
        let w = word.to_lowercase();
        let w = w.as_str();
        if w.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
            return PartOfSpeech::Number;
        }
        if DETERMINERS.contains(&w) {
            return PartOfSpeech::Determiner;
        }
        if PRONOUNS.contains(&w) {
            return PartOfSpeech::Pronoun;
        }
        if CONJUNCTIONS.contains(&w) {
            return PartOfSpeech::Conjunction;
        }
        if PREPOSITIONS.contains(&w) {
            return PartOfSpeech::Preposition;
        }
        if NEGATIONS.contains(&w) && w.ends_with("n't") {
            return PartOfSpeech::Verb;
        }
        if ADVERBS.contains(&w) {
            return PartOfSpeech::Adverb;
        }
        if VERBS.contains(&w) {
            return PartOfSpeech::Verb;
        }
        if POSITIVE.iter().chain(NEGATIVE.iter()).any(|(lw, _)| *lw == w) {
            return PartOfSpeech::Adjective;
        }
        let len = w.chars().count();
        if len > 4 && w.ends_with("ly") {
            return PartOfSpeech::Adverb;
        }
        const ADJ_SUFFIXES: &[&str] = &["ful", "ous", "ive", "able", "ible", "less", "ish", "ical"];
        if len > 5 && ADJ_SUFFIXES.iter().any(|s| w.ends_with(s)) {
            return PartOfSpeech::Adjective;
        }
        const VERB_SUFFIXES: &[&str] = &["ing", "ed", "ize", "ise", "ify"];
        if len > 4 && VERB_SUFFIXES.iter().any(|s| w.ends_with(s)) {
            return PartOfSpeech::Verb;
        }
        PartOfSpeech::Noun
    }
}

impl SyntaxAnalyzer for LexiconTagger {
    fn analyze_syntax(&self, text: &str) -> Result<Vec<Token>, ScorerFault> {
        Ok(tokens(text)
            .map(|t| Token { text: t.to_string(), tag: self.tag_word(t) })
            .collect())
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\'' || c == '’'
}

/// Words only (no punctuation), apostrophes kept inside words.
fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_word_char(c))
        .map(|w| w.trim_matches(|c: char| c == '\'' || c == '’'))
        .filter(|w| !w.is_empty())
}

/// Words plus single-character punctuation tokens, in text order.
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        if is_word_char(c) {
            if start.is_none() {
                start = Some(i);
            }
            continue;
        }
        if let Some(s) = start.take() {
            out.push(&text[s..i]);
        }
        if !c.is_whitespace() {
            out.push(&text[i..i + c.len_utf8()]);
        }
    }
    if let Some(s) = start {
        out.push(&text[s..]);
    }
    out.into_iter()
        .map(|t| t.trim_matches(|c: char| c == '\'' || c == '’'))
        .filter(|t| !t.is_empty())
}

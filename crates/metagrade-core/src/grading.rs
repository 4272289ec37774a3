//! Per-item grading strategies.
//!
//! Every function here is total: malformed or empty input grades as
//! incorrect, never as an error.

use serde::{Deserialize, Serialize};

use crate::model::{AnswerKeyEntry, GradingStrategy, LearnerResponse};

/// Minimum trimmed length, in characters, that a `keyword_match` answer
/// without keywords must exceed.
pub const DEFAULT_MIN_ANSWER_CHARS: usize = 5;

/// Fraction of required keywords that must appear for `keyword_match`.
pub const DEFAULT_KEYWORD_RATIO: f64 = 0.7;

/// Tunable thresholds for the grading strategies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradingConfig {
    /// Length threshold for the keyword-less fallback.
    #[serde(default = "default_min_answer_chars")]
    pub min_answer_chars: usize,
    /// Required keyword coverage, compared with `>=`.
    #[serde(default = "default_keyword_ratio")]
    pub keyword_ratio: f64,
}

fn default_min_answer_chars() -> usize {
    DEFAULT_MIN_ANSWER_CHARS
}

fn default_keyword_ratio() -> f64 {
    DEFAULT_KEYWORD_RATIO
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            min_answer_chars: DEFAULT_MIN_ANSWER_CHARS,
            keyword_ratio: DEFAULT_KEYWORD_RATIO,
        }
    }
}

/// Grade one response with the default thresholds.
///
/// The caller is responsible for pairing the response with the key entry of
/// the same `(part, question)`.
pub fn grade(response: &LearnerResponse, key: &AnswerKeyEntry) -> bool {
    grade_with(response, key, &GradingConfig::default())
}

/// Grade one response with explicit thresholds.
pub fn grade_with(response: &LearnerResponse, key: &AnswerKeyEntry, config: &GradingConfig) -> bool {
    let answer = response.answer.as_str();
    if answer.trim().is_empty() {
        return false;
    }

    match &key.strategy {
        GradingStrategy::Exact => grade_exact(answer, &key.answer),
        GradingStrategy::Strict => grade_strict(answer, &key.answer),
        GradingStrategy::KeywordMatch => grade_keywords(answer, &key.keyword_list(), config),
        GradingStrategy::Unknown(tag) => {
            tracing::warn!(
                part = key.part,
                question = key.question,
                strategy = %tag,
                "unknown grading strategy, marking answer incorrect"
            );
            false
        }
    }
}

/// Strip every whitespace character and lower-case the rest.
pub fn normalize_exact(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whitespace- and case-insensitive comparison.
pub fn grade_exact(answer: &str, canonical: &str) -> bool {
    normalize_exact(answer) == normalize_exact(canonical)
}

/// Only outer whitespace is forgiven; case and inner spacing must match.
pub fn grade_strict(answer: &str, canonical: &str) -> bool {
    answer.trim() == canonical.trim()
}

/// Keyword coverage, or a length check when no keywords are configured.
pub fn grade_keywords(answer: &str, keywords: &[&str], config: &GradingConfig) -> bool {
    let answer = answer.trim();

    if keywords.is_empty() {
        return answer.chars().count() > config.min_answer_chars;
    }

    let matched = keywords.iter().filter(|k| answer.contains(**k)).count();
    matched as f64 >= config.keyword_ratio * keywords.len() as f64
}

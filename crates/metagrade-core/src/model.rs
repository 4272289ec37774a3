//! Core data model types for metagrade.
//!
//! These are the fundamental types that the grader, the classifier, and the
//! report layer share: answer-key entries, learner responses, graded items,
//! and the exam layout.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RecordError;
use crate::quadrant::{classify, Quadrant};

/// Identifies one question by part and question number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId {
    /// Exam part, 1-based.
    pub part: u32,
    /// Question within the part, 1-based.
    pub question: u32,
}

impl ItemId {
    pub fn new(part: u32, question: u32) -> Self {
        Self { part, question }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}-Q{}", self.part, self.question)
    }
}

// ---------------------------------------------------------------------------
// Closed sets
// ---------------------------------------------------------------------------

/// How a raw answer is compared against the canonical answer.
///
/// Unrecognized tags are kept as [`GradingStrategy::Unknown`] so that the
/// grader can fail them closed instead of rejecting the whole answer key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GradingStrategy {
    /// Whitespace-free, case-insensitive equality.
    #[default]
    Exact,
    /// Equality after trimming the outer whitespace only.
    Strict,
    /// Required keywords must appear as substrings of the answer.
    KeywordMatch,
    /// Any other tag.
    Unknown(String),
}

impl GradingStrategy {
    pub fn tag(&self) -> &str {
        match self {
            GradingStrategy::Exact => "exact",
            GradingStrategy::Strict => "strict",
            GradingStrategy::KeywordMatch => "keyword_match",
            GradingStrategy::Unknown(tag) => tag,
        }
    }
}

impl fmt::Display for GradingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for GradingStrategy {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "exact" => GradingStrategy::Exact,
            "strict" => GradingStrategy::Strict,
            "keyword_match" => GradingStrategy::KeywordMatch,
            other => GradingStrategy::Unknown(other.to_string()),
        })
    }
}

impl From<String> for GradingStrategy {
    fn from(tag: String) -> Self {
        match tag.parse() {
            Ok(strategy) => strategy,
            Err(never) => match never {},
        }
    }
}

impl From<GradingStrategy> for String {
    fn from(strategy: GradingStrategy) -> Self {
        strategy.tag().to_string()
    }
}

/// A learner's self-reported certainty about one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Confident,
    Unsure,
    Unknown,
}

impl ConfidenceLevel {
    pub fn is_confident(self) -> bool {
        self == ConfidenceLevel::Confident
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::Confident => write!(f, "confident"),
            ConfidenceLevel::Unsure => write!(f, "unsure"),
            ConfidenceLevel::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for ConfidenceLevel {
    type Err = RecordError;

    /// Accepts the English literals and the labels shown on the exam form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "confident" | "확신" => Ok(ConfidenceLevel::Confident),
            "unsure" | "애매" => Ok(ConfidenceLevel::Unsure),
            "unknown" | "모름" => Ok(ConfidenceLevel::Unknown),
            _ => Err(RecordError::UnknownConfidence(trimmed.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Answer key
// ---------------------------------------------------------------------------

/// The scoring rule for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerKeyEntry {
    pub part: u32,
    pub question: u32,
    /// Canonical answer.
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub strategy: GradingStrategy,
    /// Comma-separated required keywords for `keyword_match`.
    #[serde(default)]
    pub keywords: Option<String>,
}

impl AnswerKeyEntry {
    pub fn new(part: u32, question: u32, answer: impl Into<String>, strategy: GradingStrategy) -> Self {
        Self {
            part,
            question,
            answer: answer.into(),
            strategy,
            keywords: None,
        }
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn id(&self) -> ItemId {
        ItemId::new(self.part, self.question)
    }

    /// Required keywords, trimmed, with blanks dropped.
    pub fn keyword_list(&self) -> Vec<&str> {
        self.keywords
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// Read-only answer key with exact `(part, question)` lookup.
///
/// When an identifier appears more than once, the first entry wins for
/// lookup; the duplicates are still kept so validation can report them.
#[derive(Debug, Clone, Default)]
pub struct AnswerKey {
    entries: Vec<AnswerKeyEntry>,
    index: HashMap<ItemId, usize>,
}

impl AnswerKey {
    pub fn new(entries: Vec<AnswerKeyEntry>) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            index.entry(entry.id()).or_insert(i);
        }
        Self { entries, index }
    }

    pub fn get(&self, id: ItemId) -> Option<&AnswerKeyEntry> {
        self.index.get(&id).map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[AnswerKeyEntry] {
        &self.entries
    }

    /// Number of distinct keyed questions.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl FromIterator<AnswerKeyEntry> for AnswerKey {
    fn from_iter<I: IntoIterator<Item = AnswerKeyEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Placeholder the exam form submits when no choice was selected.
pub const NO_SELECTION: &str = "선택안함";

/// One submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearnerResponse {
    pub learner: String,
    pub part: u32,
    pub question: u32,
    /// Raw answer text; may be empty.
    pub answer: String,
    pub confidence: ConfidenceLevel,
}

impl LearnerResponse {
    pub fn new(
        learner: impl Into<String>,
        part: u32,
        question: u32,
        answer: impl Into<String>,
        confidence: ConfidenceLevel,
    ) -> Self {
        Self {
            learner: learner.into(),
            part,
            question,
            answer: answer.into(),
            confidence,
        }
    }

    pub fn id(&self) -> ItemId {
        ItemId::new(self.part, self.question)
    }
}

/// A response row as it comes out of storage, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseRow {
    /// Learner identifier (the phone number on the original form).
    #[serde(alias = "phone", deserialize_with = "text_or_number")]
    pub learner: String,
    pub part: u32,
    #[serde(alias = "q_num")]
    pub question: u32,
    #[serde(default, deserialize_with = "text_or_number")]
    pub answer: String,
    #[serde(default)]
    pub confidence: Option<String>,
}

/// Spreadsheet exports store phone numbers and choice answers as number cells.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match Cell::deserialize(deserializer)? {
        Cell::Text(s) => s,
        Cell::Integer(n) => n.to_string(),
        Cell::Float(f) => f.to_string(),
    })
}

impl TryFrom<ResponseRow> for LearnerResponse {
    type Error = RecordError;

    fn try_from(row: ResponseRow) -> Result<Self, Self::Error> {
        let learner = row.learner.trim().to_string();
        if learner.is_empty() {
            return Err(RecordError::MissingLearner {
                part: row.part,
                question: row.question,
            });
        }
        for (field, value) in [("part", row.part), ("question", row.question)] {
            if value == 0 {
                return Err(RecordError::InvalidIdentifier {
                    learner,
                    field,
                    value,
                });
            }
        }

        // A missing confidence was stored as "unknown" by the exam form.
        let confidence = match row.confidence.as_deref().map(str::trim) {
            None | Some("") => ConfidenceLevel::Unknown,
            Some(label) => label.parse()?,
        };

        let answer = if row.answer.trim() == NO_SELECTION {
            String::new()
        } else {
            row.answer
        };

        Ok(LearnerResponse {
            learner,
            part: row.part,
            question: row.question,
            answer,
            confidence,
        })
    }
}

// ---------------------------------------------------------------------------
// Graded items
// ---------------------------------------------------------------------------

/// The outcome of grading one response against its key entry.
///
/// The quadrant is always derived from correctness and confidence; it is
/// recomputed on deserialization rather than trusted from the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GradedItemRecord")]
pub struct GradedItem {
    part: u32,
    question: u32,
    is_correct: bool,
    confidence: ConfidenceLevel,
    quadrant: Quadrant,
}

#[derive(Deserialize)]
struct GradedItemRecord {
    part: u32,
    question: u32,
    is_correct: bool,
    confidence: ConfidenceLevel,
}

impl From<GradedItemRecord> for GradedItem {
    fn from(r: GradedItemRecord) -> Self {
        GradedItem::new(r.part, r.question, r.is_correct, r.confidence)
    }
}

impl GradedItem {
    pub fn new(part: u32, question: u32, is_correct: bool, confidence: ConfidenceLevel) -> Self {
        Self {
            part,
            question,
            is_correct,
            confidence,
            quadrant: classify(is_correct, confidence),
        }
    }

    pub fn part(&self) -> u32 {
        self.part
    }

    pub fn question(&self) -> u32 {
        self.question
    }

    pub fn id(&self) -> ItemId {
        ItemId::new(self.part, self.question)
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn confidence(&self) -> ConfidenceLevel {
        self.confidence
    }

    pub fn quadrant(&self) -> Quadrant {
        self.quadrant
    }
}

// ---------------------------------------------------------------------------
// Exam layout
// ---------------------------------------------------------------------------

/// How a part's questions are answered on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerFormat {
    /// One of the numbered choices `1`..=`5`.
    Choice,
    /// Free-form written text.
    FreeText,
}

/// Number of choices offered for a [`AnswerFormat::Choice`] question.
pub const CHOICE_COUNT: u32 = 5;

/// One part of the exam.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartLayout {
    pub part: u32,
    pub questions: u32,
    #[serde(default = "default_format")]
    pub format: AnswerFormat,
}

fn default_format() -> AnswerFormat {
    AnswerFormat::Choice
}

/// The shape of the exam: which parts exist and how many questions each holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamLayout {
    pub parts: Vec<PartLayout>,
}

impl ExamLayout {
    /// Eight parts: parts 1-7 hold three multiple-choice questions, part 8
    /// holds two written answers.
    pub fn standard() -> Self {
        let mut parts: Vec<PartLayout> = (1..=7)
            .map(|part| PartLayout {
                part,
                questions: 3,
                format: AnswerFormat::Choice,
            })
            .collect();
        parts.push(PartLayout {
            part: 8,
            questions: 2,
            format: AnswerFormat::FreeText,
        });
        Self { parts }
    }

    pub fn part(&self, part: u32) -> Option<&PartLayout> {
        self.parts.iter().find(|p| p.part == part)
    }

    pub fn question_count(&self, part: u32) -> u32 {
        self.part(part).map_or(0, |p| p.questions)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        id.question >= 1 && id.question <= self.question_count(id.part)
    }

    pub fn total_questions(&self) -> u32 {
        self.parts.iter().map(|p| p.questions).sum()
    }
}

impl Default for ExamLayout {
    fn default() -> Self {
        Self::standard()
    }
}

/// A named group of parts reported together (e.g. "grammar" = parts 1-3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartGroup {
    pub name: String,
    pub parts: Vec<u32>,
}

/// Identifying metadata for one exam version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Everything needed to grade one exam version.
#[derive(Debug, Clone)]
pub struct ExamDefinition {
    pub info: ExamInfo,
    pub layout: ExamLayout,
    pub groups: Vec<PartGroup>,
    pub key: AnswerKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_parses_english_and_form_labels() {
        assert_eq!("confident".parse::<ConfidenceLevel>().unwrap(), ConfidenceLevel::Confident);
        assert_eq!("Unsure".parse::<ConfidenceLevel>().unwrap(), ConfidenceLevel::Unsure);
        assert_eq!("확신".parse::<ConfidenceLevel>().unwrap(), ConfidenceLevel::Confident);
        assert_eq!("애매".parse::<ConfidenceLevel>().unwrap(), ConfidenceLevel::Unsure);
        assert_eq!("모름".parse::<ConfidenceLevel>().unwrap(), ConfidenceLevel::Unknown);
        assert_eq!(
            "maybe".parse::<ConfidenceLevel>(),
            Err(RecordError::UnknownConfidence("maybe".into()))
        );
    }

    #[test]
    fn strategy_keeps_unknown_tags() {
        assert_eq!("exact".parse::<GradingStrategy>().unwrap(), GradingStrategy::Exact);
        assert_eq!(
            "keyword_match".parse::<GradingStrategy>().unwrap(),
            GradingStrategy::KeywordMatch
        );
        let fuzzy: GradingStrategy = "fuzzy".parse().unwrap();
        assert_eq!(fuzzy, GradingStrategy::Unknown("fuzzy".into()));
        assert_eq!(fuzzy.to_string(), "fuzzy");
    }

    #[test]
    fn strategy_serializes_as_tag() {
        let entry = AnswerKeyEntry::new(1, 1, "2", GradingStrategy::KeywordMatch);
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"strategy\":\"keyword_match\""));
    }

    #[test]
    fn keyword_list_trims_and_drops_blanks() {
        let entry = AnswerKeyEntry::new(8, 1, "", GradingStrategy::KeywordMatch)
            .with_keywords(" fast, reliable ,, ");
        assert_eq!(entry.keyword_list(), vec!["fast", "reliable"]);

        let bare = AnswerKeyEntry::new(8, 1, "", GradingStrategy::KeywordMatch);
        assert!(bare.keyword_list().is_empty());
    }

    #[test]
    fn answer_key_first_entry_wins() {
        let key = AnswerKey::new(vec![
            AnswerKeyEntry::new(1, 1, "2", GradingStrategy::Exact),
            AnswerKeyEntry::new(1, 1, "3", GradingStrategy::Exact),
            AnswerKeyEntry::new(1, 2, "1", GradingStrategy::Exact),
        ]);
        assert_eq!(key.len(), 2);
        assert_eq!(key.entries().len(), 3);
        assert_eq!(key.get(ItemId::new(1, 1)).unwrap().answer, "2");
        assert!(key.get(ItemId::new(2, 1)).is_none());
    }

    #[test]
    fn response_row_defaults_and_placeholders() {
        let row = ResponseRow {
            learner: " 010-1234-5678 ".into(),
            part: 1,
            question: 2,
            answer: NO_SELECTION.into(),
            confidence: None,
        };
        let response = LearnerResponse::try_from(row).unwrap();
        assert_eq!(response.learner, "010-1234-5678");
        assert_eq!(response.answer, "");
        assert_eq!(response.confidence, ConfidenceLevel::Unknown);
    }

    #[test]
    fn response_row_rejects_bad_identifiers() {
        let row = ResponseRow {
            learner: "a".into(),
            part: 0,
            question: 1,
            answer: "1".into(),
            confidence: Some("확신".into()),
        };
        assert!(matches!(
            LearnerResponse::try_from(row),
            Err(RecordError::InvalidIdentifier { field: "part", .. })
        ));

        let row = ResponseRow {
            learner: "  ".into(),
            part: 1,
            question: 1,
            answer: "1".into(),
            confidence: None,
        };
        assert!(matches!(
            LearnerResponse::try_from(row),
            Err(RecordError::MissingLearner { .. })
        ));
    }

    #[test]
    fn response_row_accepts_sheet_column_names() {
        let json = r#"{"phone":"0101","part":2,"q_num":1,"answer":"5","confidence":"애매"}"#;
        let row: ResponseRow = serde_json::from_str(json).unwrap();
        let response = LearnerResponse::try_from(row).unwrap();
        assert_eq!(response.learner, "0101");
        assert_eq!(response.id(), ItemId::new(2, 1));
        assert_eq!(response.confidence, ConfidenceLevel::Unsure);
    }

    #[test]
    fn graded_item_recomputes_quadrant_on_load() {
        let json = r#"{"part":1,"question":1,"is_correct":false,"confidence":"confident","quadrant":"Master"}"#;
        let item: GradedItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.quadrant(), Quadrant::Delusion);
    }

    #[test]
    fn standard_layout_shape() {
        let layout = ExamLayout::standard();
        assert_eq!(layout.parts.len(), 8);
        assert_eq!(layout.question_count(1), 3);
        assert_eq!(layout.question_count(8), 2);
        assert_eq!(layout.question_count(9), 0);
        assert_eq!(layout.total_questions(), 23);
        assert!(layout.contains(ItemId::new(7, 3)));
        assert!(!layout.contains(ItemId::new(8, 3)));
        assert_eq!(layout.part(8).unwrap().format, AnswerFormat::FreeText);
    }
}

//! Record mapping errors.
//!
//! Storage rows arrive loosely typed. These errors describe rows that cannot
//! be mapped onto the closed-set model types before they reach the grader.

use thiserror::Error;

/// Errors raised while mapping raw storage rows onto model types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// The confidence label is not one of the known literals.
    #[error("unknown confidence level: {0:?}")]
    UnknownConfidence(String),

    /// A part or question number was zero.
    #[error("invalid {field} number {value} for learner {learner}")]
    InvalidIdentifier {
        learner: String,
        field: &'static str,
        value: u32,
    },

    /// The learner identifier was blank.
    #[error("response row for part {part} question {question} has no learner")]
    MissingLearner { part: u32, question: u32 },
}

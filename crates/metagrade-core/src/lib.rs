//! metagrade-core — Grading engine, quadrant classifier, and statistics.
//!
//! This crate defines the exam data model, the per-item grading strategies,
//! the metacognitive quadrant classification, and the aggregate statistics
//! that the rest of metagrade builds on.

pub mod config;
pub mod engine;
pub mod error;
pub mod grading;
pub mod model;
pub mod parser;
pub mod quadrant;
pub mod report;
pub mod statistics;

pub use engine::{grade_all, GradingEngine};
pub use error::RecordError;
pub use grading::grade;
pub use model::{AnswerKey, AnswerKeyEntry, ConfidenceLevel, GradedItem, LearnerResponse};
pub use quadrant::{classify, Quadrant};
pub use report::DiagnosticReport;
pub use statistics::{
    aggregate, aggregate_by_group, aggregate_by_part, aggregate_parts, QuadrantAggregate,
};

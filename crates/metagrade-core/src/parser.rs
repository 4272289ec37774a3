//! Answer key and response file parsing.
//!
//! Answer keys are TOML files; response exports are JSON arrays of storage
//! rows. Both are mapped onto the closed-set model types here so the grader
//! never sees untyped data.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{
    AnswerFormat, AnswerKey, AnswerKeyEntry, ExamDefinition, ExamInfo, ExamLayout, GradingStrategy,
    ItemId, LearnerResponse, PartGroup, PartLayout, ResponseRow, CHOICE_COUNT,
};

/// Intermediate TOML structure for answer key files.
#[derive(Debug, Deserialize)]
struct TomlKeyFile {
    exam: ExamInfo,
    #[serde(default)]
    layout: Vec<PartLayout>,
    #[serde(default)]
    groups: Vec<PartGroup>,
    #[serde(default)]
    entries: Vec<AnswerKeyEntry>,
}

/// Parse a single TOML answer key file.
pub fn parse_answer_key(path: &Path) -> Result<ExamDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer key file: {}", path.display()))?;

    parse_answer_key_str(&content, path)
}

/// Parse TOML answer key text (useful for testing).
pub fn parse_answer_key_str(content: &str, source_path: &Path) -> Result<ExamDefinition> {
    let parsed: TomlKeyFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let layout = if parsed.layout.is_empty() {
        ExamLayout::standard()
    } else {
        ExamLayout {
            parts: parsed.layout,
        }
    };

    Ok(ExamDefinition {
        info: parsed.exam,
        layout,
        groups: parsed.groups,
        key: AnswerKey::new(parsed.entries),
    })
}

/// Recursively load every `.toml` answer key under a directory.
pub fn load_key_directory(dir: &Path) -> Result<Vec<ExamDefinition>> {
    let mut exams = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            exams.extend(load_key_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_answer_key(&path) {
                Ok(exam) => exams.push(exam),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(exams)
}

/// Parse a JSON response export.
pub fn parse_responses(path: &Path) -> Result<Vec<LearnerResponse>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read responses file: {}", path.display()))?;

    parse_responses_str(&content)
        .with_context(|| format!("invalid responses file: {}", path.display()))
}

/// Parse JSON response rows and map each onto a [`LearnerResponse`].
pub fn parse_responses_str(content: &str) -> Result<Vec<LearnerResponse>> {
    let rows: Vec<ResponseRow> =
        serde_json::from_str(content).context("failed to parse responses JSON")?;

    rows.into_iter()
        .enumerate()
        .map(|(i, row)| {
            LearnerResponse::try_from(row).with_context(|| format!("response row {i}"))
        })
        .collect()
}

/// A warning from answer key or response validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question concerned (if applicable).
    pub item: Option<ItemId>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn at(item: ItemId, message: impl Into<String>) -> Self {
        Self {
            item: Some(item),
            message: message.into(),
        }
    }
}

/// Validate an answer key for common issues.
pub fn validate_answer_key(exam: &ExamDefinition) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if exam.key.is_empty() {
        warnings.push(ValidationWarning {
            item: None,
            message: "answer key has no entries; every response will be ungraded".into(),
        });
    }

    let mut seen = HashSet::new();
    for entry in exam.key.entries() {
        let id = entry.id();

        if !seen.insert(id) {
            warnings.push(ValidationWarning::at(
                id,
                format!("duplicate answer key entry for {id}; the first one is used"),
            ));
        }

        if !exam.layout.contains(id) {
            warnings.push(ValidationWarning::at(
                id,
                format!("{id} is outside the exam layout"),
            ));
        }

        match &entry.strategy {
            GradingStrategy::Unknown(tag) => warnings.push(ValidationWarning::at(
                id,
                format!("unknown grading strategy {tag:?}; answers will be marked incorrect"),
            )),
            GradingStrategy::Exact | GradingStrategy::Strict => {
                if entry.answer.trim().is_empty() {
                    warnings.push(ValidationWarning::at(id, "canonical answer is empty"));
                }
            }
            GradingStrategy::KeywordMatch => {
                if entry.keyword_list().is_empty() {
                    warnings.push(ValidationWarning::at(
                        id,
                        "keyword_match without keywords; grading falls back to answer length",
                    ));
                }
            }
        }
    }

    for group in &exam.groups {
        for part in &group.parts {
            if exam.layout.part(*part).is_none() {
                warnings.push(ValidationWarning {
                    item: None,
                    message: format!("group {:?} names unknown part {part}", group.name),
                });
            }
        }
    }

    let unkeyed = exam
        .layout
        .parts
        .iter()
        .flat_map(|p| (1..=p.questions).map(move |q| ItemId::new(p.part, q)))
        .filter(|id| exam.key.get(*id).is_none())
        .count();
    if unkeyed > 0 {
        warnings.push(ValidationWarning {
            item: None,
            message: format!("{unkeyed} question(s) in the layout have no answer key entry"),
        });
    }

    warnings
}

/// Check responses against the exam layout.
pub fn validate_responses(
    responses: &[LearnerResponse],
    layout: &ExamLayout,
) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for r in responses {
        let id = r.id();
        let Some(part) = layout.part(r.part).filter(|_| layout.contains(id)) else {
            warnings.push(ValidationWarning::at(
                id,
                format!("learner {} answered {id}, which is outside the exam layout", r.learner),
            ));
            continue;
        };

        if part.format == AnswerFormat::Choice && !r.answer.trim().is_empty() {
            let valid_choice = r
                .answer
                .trim()
                .parse::<u32>()
                .is_ok_and(|c| (1..=CHOICE_COUNT).contains(&c));
            if !valid_choice {
                warnings.push(ValidationWarning::at(
                    id,
                    format!(
                        "learner {} chose {:?}, expected 1-{CHOICE_COUNT}",
                        r.learner, r.answer
                    ),
                ));
            }
        }
    }

    warnings
}

//! Batch grading.
//!
//! Joins learner responses to the answer key, grades each matched pair, and
//! records which responses could not be graded because no key entry exists.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::grading::{grade_with, GradingConfig};
use crate::model::{AnswerKey, AnswerKeyEntry, GradedItem, ItemId, LearnerResponse};

/// Grades responses with a fixed set of thresholds.
#[derive(Debug, Clone, Default)]
pub struct GradingEngine {
    config: GradingConfig,
}

impl GradingEngine {
    pub fn new(config: GradingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// Grade a single pre-joined pair.
    pub fn grade(&self, response: &LearnerResponse, key: &AnswerKeyEntry) -> bool {
        grade_with(response, key, &self.config)
    }

    /// Grade every response that has a key entry; unmatched responses are skipped.
    pub fn grade_all(&self, responses: &[LearnerResponse], key: &AnswerKey) -> Vec<GradedItem> {
        let mut items = Vec::with_capacity(responses.len());
        for response in responses {
            let Some(entry) = key.get(response.id()) else {
                tracing::debug!(
                    learner = %response.learner,
                    item = %response.id(),
                    "no answer key entry, skipping"
                );
                continue;
            };
            let is_correct = self.grade(response, entry);
            items.push(GradedItem::new(
                response.part,
                response.question,
                is_correct,
                response.confidence,
            ));
        }

        tracing::debug!(
            responses = responses.len(),
            graded = items.len(),
            "graded response batch"
        );
        items
    }
}

/// Grade with the default thresholds.
pub fn grade_all(responses: &[LearnerResponse], key: &AnswerKey) -> Vec<GradedItem> {
    GradingEngine::default().grade_all(responses, key)
}

/// How many responses were graded and which were not keyed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub responses: usize,
    pub graded: usize,
    /// Response identifiers with no answer key entry, in submission order.
    pub ungraded: Vec<ItemId>,
}

impl Coverage {
    pub fn compute(responses: &[LearnerResponse], key: &AnswerKey) -> Self {
        let ungraded: Vec<ItemId> = responses
            .iter()
            .map(LearnerResponse::id)
            .filter(|id| key.get(*id).is_none())
            .collect();

        Self {
            responses: responses.len(),
            graded: responses.len() - ungraded.len(),
            ungraded,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.ungraded.is_empty()
    }
}

/// Split a mixed response set by learner, preserving submission order.
pub fn group_by_learner(responses: &[LearnerResponse]) -> BTreeMap<String, Vec<LearnerResponse>> {
    let mut grouped: BTreeMap<String, Vec<LearnerResponse>> = BTreeMap::new();
    for r in responses {
        grouped.entry(r.learner.clone()).or_default().push(r.clone());
    }
    grouped
}

/// Keep only the last submission for each `(learner, part, question)`.
///
/// Re-submitting a part appends new rows rather than replacing old ones, so
/// the latest row is the answer that counts. The relative order of the
/// surviving rows is preserved.
pub fn latest_responses(responses: &[LearnerResponse]) -> Vec<LearnerResponse> {
    let mut last: HashMap<(&str, ItemId), usize> = HashMap::new();
    for (i, r) in responses.iter().enumerate() {
        last.insert((r.learner.as_str(), r.id()), i);
    }

    responses
        .iter()
        .enumerate()
        .filter(|(i, r)| last.get(&(r.learner.as_str(), r.id())) == Some(i))
        .map(|(_, r)| r.clone())
        .collect()
}

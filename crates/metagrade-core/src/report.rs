//! Diagnostic report types with JSON persistence and markdown rendering.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::{Coverage, GradingEngine};
use crate::grading::GradingConfig;
use crate::model::{ExamDefinition, GradedItem, LearnerResponse, PartGroup};
use crate::quadrant::Quadrant;
use crate::statistics::{aggregate, aggregate_by_group, aggregate_by_part, QuadrantAggregate};

/// A complete diagnostic report for one learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Learner identifier.
    pub learner: String,
    /// Summary of the exam version.
    pub exam: ExamSummary,
    /// Thresholds the items were graded with.
    pub grading: GradingConfig,
    /// Individual graded items, in submission order.
    pub items: Vec<GradedItem>,
    /// Which responses were graded.
    pub coverage: Coverage,
    /// Aggregate over the whole exam.
    pub overall: QuadrantAggregate,
    /// Aggregate per part.
    pub per_part: BTreeMap<u32, QuadrantAggregate>,
    /// Aggregate per named part group.
    #[serde(default)]
    pub per_group: BTreeMap<String, QuadrantAggregate>,
}

/// Summary of an exam version (without the answer key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    pub question_count: u32,
    /// Part groups the report was aggregated by.
    #[serde(default)]
    pub groups: Vec<PartGroup>,
}

impl DiagnosticReport {
    /// Grade one learner's responses and aggregate the results.
    pub fn build(
        exam: &ExamDefinition,
        learner: &str,
        responses: &[LearnerResponse],
        engine: &GradingEngine,
    ) -> Self {
        let items = engine.grade_all(responses, &exam.key);
        let coverage = Coverage::compute(responses, &exam.key);
        if !coverage.is_complete() {
            tracing::warn!(
                learner,
                ungraded = coverage.ungraded.len(),
                "some responses have no answer key entry"
            );
        }

        let mut report = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            learner: learner.to_string(),
            exam: ExamSummary {
                id: exam.info.id.clone(),
                name: exam.info.name.clone(),
                version: exam.info.version.clone(),
                question_count: exam.layout.total_questions(),
                groups: exam.groups.clone(),
            },
            grading: *engine.config(),
            items,
            coverage,
            overall: QuadrantAggregate::default(),
            per_part: BTreeMap::new(),
            per_group: BTreeMap::new(),
        };
        report.recompute();
        report
    }

    /// Rebuild every aggregate from the graded items.
    pub fn recompute(&mut self) {
        self.overall = aggregate(&self.items);
        self.per_part = aggregate_by_part(&self.items);
        self.per_group = aggregate_by_group(&self.items, &self.exam.groups);
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    ///
    /// Aggregates are recomputed from the stored items rather than trusted
    /// from the file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let mut report: DiagnosticReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        report.recompute();
        Ok(report)
    }

    /// Items answered wrongly with confidence, the highest-risk quadrant.
    pub fn misconceptions(&self) -> impl Iterator<Item = &GradedItem> {
        self.items
            .iter()
            .filter(|i| i.quadrant() == Quadrant::Delusion)
    }

    /// Format the report as markdown tables.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "## {} ({})\n\n**Learner:** {} | **Graded:** {}/{} responses | {}\n\n",
            escape_cell(&self.exam.name),
            escape_cell(&self.exam.id),
            escape_cell(&self.learner),
            self.coverage.graded,
            self.coverage.responses,
            self.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        md.push_str("### Overall\n\n");
        push_aggregate_table(&mut md, "Scope", [("All".to_string(), &self.overall)]);

        if !self.per_part.is_empty() {
            md.push_str("### By part\n\n");
            push_aggregate_table(
                &mut md,
                "Part",
                self.per_part.iter().map(|(p, a)| (p.to_string(), a)),
            );
        }

        if !self.per_group.is_empty() {
            md.push_str("### By group\n\n");
            push_aggregate_table(&mut md, "Group", self.per_group.iter().map(|(g, a)| (escape_cell(g), a)));
        }

        let misconceptions: Vec<String> = self.misconceptions().map(|i| i.id().to_string()).collect();
        if !misconceptions.is_empty() {
            md.push_str(&format!(
                "### Misconceptions\n\n{} ({}): {}\n\n",
                Quadrant::Delusion,
                Quadrant::Delusion.description(),
                misconceptions.join(", ")
            ));
        }

        if !self.coverage.ungraded.is_empty() {
            let ids: Vec<String> = self.coverage.ungraded.iter().map(|id| id.to_string()).collect();
            md.push_str(&format!("### Ungraded\n\n{}\n\n", ids.join(", ")));
        }

        md.push_str("### Items\n\n");
        md.push_str("| Item | Correct | Confidence | Quadrant |\n");
        md.push_str("|------|---------|------------|----------|\n");
        for item in &self.items {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                item.id(),
                if item.is_correct() { "yes" } else { "no" },
                item.confidence(),
                item.quadrant()
            ));
        }

        md
    }
}

/// Keep user-supplied names from splitting a markdown table row.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn push_aggregate_table<'a>(
    md: &mut String,
    label: &str,
    rows: impl IntoIterator<Item = (String, &'a QuadrantAggregate)>,
) {
    md.push_str(&format!(
        "| {label} | Master | Lucky | Delusion | Deficiency | Purity | Error resistance | Calibration |\n"
    ));
    md.push_str("|---|---|---|---|---|---|---|---|\n");
    for (name, a) in rows {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {:.1}% | {:.1}% | {:.1}% |\n",
            name,
            a.master,
            a.lucky,
            a.delusion,
            a.deficiency,
            a.score_purity * 100.0,
            a.error_resistance * 100.0,
            a.calibration_accuracy * 100.0
        ));
    }
    md.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AnswerKey, AnswerKeyEntry, ConfidenceLevel, ExamInfo, ExamLayout, GradingStrategy, ItemId,
    };

    fn make_exam() -> ExamDefinition {
        ExamDefinition {
            info: ExamInfo {
                id: "diag".into(),
                name: "Diagnostic".into(),
                version: "1".into(),
            },
            layout: ExamLayout::standard(),
            groups: vec![PartGroup {
                name: "part-one".into(),
                parts: vec![1],
            }],
            key: AnswerKey::new(vec![
                AnswerKeyEntry::new(1, 1, "2", GradingStrategy::Exact),
                AnswerKeyEntry::new(1, 2, "right", GradingStrategy::Exact),
                AnswerKeyEntry::new(2, 1, "4", GradingStrategy::Exact),
            ]),
        }
    }

    fn make_responses() -> Vec<LearnerResponse> {
        vec![
            LearnerResponse::new("s1", 1, 1, "2", ConfidenceLevel::Confident),
            LearnerResponse::new("s1", 1, 2, "wrong", ConfidenceLevel::Unsure),
            LearnerResponse::new("s1", 2, 1, "3", ConfidenceLevel::Confident),
            LearnerResponse::new("s1", 3, 1, "1", ConfidenceLevel::Confident),
        ]
    }

    #[test]
    fn build_aggregates_and_coverage() {
        let report = DiagnosticReport::build(
            &make_exam(),
            "s1",
            &make_responses(),
            &GradingEngine::default(),
        );
        assert_eq!(report.items.len(), 3);
        assert_eq!(report.coverage.ungraded, vec![ItemId::new(3, 1)]);
        assert_eq!(report.overall.total, 3);
        assert_eq!(report.overall.delusion, 1);
        assert_eq!(report.per_part.len(), 2);
        assert_eq!(report.per_group["part-one"].total, 2);
        assert_eq!(report.exam.question_count, 23);
        assert_eq!(report.misconceptions().count(), 1);
    }

    #[test]
    fn json_roundtrip_recomputes_aggregates() {
        let report = DiagnosticReport::build(
            &make_exam(),
            "s1",
            &make_responses(),
            &GradingEngine::default(),
        );
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        report.save_json(&path).unwrap();

        // Tamper with the stored aggregate; loading must not trust it.
        let content = std::fs::read_to_string(&path).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&content).unwrap();
        value["overall"]["master"] = serde_json::json!(99);
        std::fs::write(&path, value.to_string()).unwrap();

        let loaded = DiagnosticReport::load_json(&path).unwrap();
        assert_eq!(loaded.learner, "s1");
        assert_eq!(loaded.items.len(), 3);
        assert_eq!(loaded.overall.master, 1);
        assert_eq!(loaded.per_group["part-one"].total, 2);
    }

    #[test]
    fn markdown_output() {
        let report = DiagnosticReport::build(
            &make_exam(),
            "s1",
            &make_responses(),
            &GradingEngine::default(),
        );
        let md = report.to_markdown();
        assert!(md.contains("Diagnostic"));
        assert!(md.contains("### By part"));
        assert!(md.contains("### Misconceptions"));
        assert!(md.contains("P2-Q1"));
        assert!(md.contains("### Ungraded"));
        assert!(md.contains("P3-Q1"));
        assert!(md.contains("| P1-Q1 | yes | confident | Master |"));
    }

    #[test]
    fn markdown_escapes_pipes_in_names() {
        let mut exam = make_exam();
        exam.info.name = "Grammar | Reading".into();
        exam.groups[0].name = "read|write".into();
        let report =
            DiagnosticReport::build(&exam, "Kim | Lee", &make_responses(), &GradingEngine::default());
        let md = report.to_markdown();
        assert!(md.contains(r"## Grammar \| Reading (diag)"));
        assert!(md.contains(r"**Learner:** Kim \| Lee |"));
        assert!(md.contains(r"| read\|write |"));
        assert!(!md.contains("| read|write |"));
    }
}

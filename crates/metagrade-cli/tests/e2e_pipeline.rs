//! End-to-end pipeline tests over the library API.
//!
//! These tests run the parse → grade → classify → aggregate → report
//! pipeline on in-memory fixtures.

use std::path::PathBuf;

use metagrade_core::engine::{grade_all, group_by_learner, latest_responses, Coverage, GradingEngine};
use metagrade_core::model::ConfidenceLevel;
use metagrade_core::parser::{parse_answer_key_str, parse_responses_str};
use metagrade_core::quadrant::Quadrant;
use metagrade_core::report::DiagnosticReport;
use metagrade_core::statistics::{aggregate, aggregate_by_part};

const KEY: &str = r#"
[exam]
id = "e2e"
name = "E2E"

[[groups]]
name = "writing"
parts = [8]

[[entries]]
part = 1
question = 1
answer = "2"
strategy = "exact"

[[entries]]
part = 1
question = 2
answer = "right"
strategy = "exact"

[[entries]]
part = 8
question = 1
strategy = "keyword_match"
keywords = "fast, reliable"

[[entries]]
part = 8
question = 2
answer = "I have been to Seoul."
strategy = "strict"
"#;

#[test]
fn two_item_scenario() {
    let exam = parse_answer_key_str(KEY, &PathBuf::from("e2e.toml")).unwrap();
    let responses = parse_responses_str(
        r#"[
            {"learner": "s1", "part": 1, "question": 1, "answer": "2", "confidence": "confident"},
            {"learner": "s1", "part": 1, "question": 2, "answer": "wrong", "confidence": "unsure"}
        ]"#,
    )
    .unwrap();

    let items = grade_all(&responses, &exam.key);
    assert_eq!(items.len(), 2);
    assert!(items[0].is_correct());
    assert_eq!(items[0].quadrant(), Quadrant::Master);
    assert!(!items[1].is_correct());
    assert_eq!(items[1].quadrant(), Quadrant::Deficiency);

    let agg = aggregate(&items);
    assert_eq!(agg.score_purity, 1.0);
    assert_eq!(agg.error_resistance, 0.0);
    assert_eq!(agg.calibration_accuracy, 1.0);
}

#[test]
fn written_answers() {
    let exam = parse_answer_key_str(KEY, &PathBuf::from("e2e.toml")).unwrap();
    let responses = parse_responses_str(
        r#"[
            {"learner": "s1", "part": 8, "question": 1, "answer": "The system is fast and very reliable", "confidence": "확신"},
            {"learner": "s1", "part": 8, "question": 2, "answer": "  I have been to Seoul.  ", "confidence": "애매"},
            {"learner": "s2", "part": 8, "question": 1, "answer": "The system is fast", "confidence": "확신"},
            {"learner": "s2", "part": 8, "question": 2, "answer": "i have been to seoul.", "confidence": "확신"}
        ]"#,
    )
    .unwrap();

    let by_learner = group_by_learner(&responses);
    let engine = GradingEngine::default();

    let s1 = engine.grade_all(&by_learner["s1"], &exam.key);
    assert_eq!(
        s1.iter().map(|i| i.quadrant()).collect::<Vec<_>>(),
        vec![Quadrant::Master, Quadrant::Lucky]
    );

    let s2 = engine.grade_all(&by_learner["s2"], &exam.key);
    assert_eq!(
        s2.iter().map(|i| i.quadrant()).collect::<Vec<_>>(),
        vec![Quadrant::Delusion, Quadrant::Delusion]
    );
    let s2_agg = aggregate(&s2);
    assert_eq!(s2_agg.error_resistance, 1.0);
    assert_eq!(s2_agg.calibration_accuracy, 0.0);
}

#[test]
fn resubmission_and_coverage() {
    let exam = parse_answer_key_str(KEY, &PathBuf::from("e2e.toml")).unwrap();
    let raw = parse_responses_str(
        r#"[
            {"learner": "s1", "part": 1, "question": 1, "answer": "3", "confidence": "애매"},
            {"learner": "s1", "part": 2, "question": 1, "answer": "4", "confidence": "확신"},
            {"learner": "s1", "part": 1, "question": 1, "answer": "2", "confidence": "확신"}
        ]"#,
    )
    .unwrap();

    let responses = latest_responses(&raw);
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[1].confidence, ConfidenceLevel::Confident);

    let items = grade_all(&responses, &exam.key);
    assert!(items.len() <= responses.len());
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quadrant(), Quadrant::Master);

    let coverage = Coverage::compute(&responses, &exam.key);
    assert_eq!(coverage.responses - coverage.graded, 1);

    let by_part = aggregate_by_part(&items);
    assert!(!by_part.contains_key(&2));
}

#[test]
fn report_roundtrip() {
    let exam = parse_answer_key_str(KEY, &PathBuf::from("e2e.toml")).unwrap();
    let responses = parse_responses_str(
        r#"[
            {"learner": "s1", "part": 1, "question": 1, "answer": "2", "confidence": "confident"},
            {"learner": "s1", "part": 8, "question": 1, "answer": "fast", "confidence": "unknown"}
        ]"#,
    )
    .unwrap();

    let report = DiagnosticReport::build(&exam, "s1", &responses, &GradingEngine::default());
    assert_eq!(report.per_group["writing"].deficiency, 1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    report.save_json(&path).unwrap();
    let loaded = DiagnosticReport::load_json(&path).unwrap();

    assert_eq!(loaded.id, report.id);
    assert_eq!(loaded.items, report.items);
    assert_eq!(loaded.overall, report.overall);
    assert_eq!(loaded.per_group, report.per_group);
}

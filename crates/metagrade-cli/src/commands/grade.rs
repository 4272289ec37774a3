//! The `metagrade grade` command.

use std::path::PathBuf;

use anyhow::Result;

use metagrade_core::config::load_config_from;
use metagrade_core::engine::{group_by_learner, latest_responses, GradingEngine};
use metagrade_core::parser;
use metagrade_core::report::DiagnosticReport;
use metagrade_report::html::write_html_report;

pub fn execute(
    key_path: PathBuf,
    responses_path: PathBuf,
    learner: Option<String>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html", "markdown"]
    } else {
        format.split(',').map(str::trim).collect()
    };
    for fmt in &formats {
        anyhow::ensure!(
            matches!(*fmt, "json" | "html" | "markdown" | "md"),
            "unknown format: {fmt}"
        );
    }

    let exam = parser::parse_answer_key(&key_path)?;
    for w in parser::validate_answer_key(&exam) {
        match w.item {
            Some(id) => tracing::warn!("answer key [{id}]: {}", w.message),
            None => tracing::warn!("answer key: {}", w.message),
        }
    }

    let mut responses = latest_responses(&parser::parse_responses(&responses_path)?);
    if let Some(only) = &learner {
        responses.retain(|r| &r.learner == only);
        anyhow::ensure!(!responses.is_empty(), "no responses found for learner {only}");
    }
    anyhow::ensure!(!responses.is_empty(), "response file contains no responses");

    for w in parser::validate_responses(&responses, &exam.layout) {
        tracing::warn!("{}", w.message);
    }

    let engine = GradingEngine::new(config.grading);
    let by_learner = group_by_learner(&responses);

    eprintln!(
        "metagrade v{} — Grading {} learner(s) against {} ({} keyed questions)",
        env!("CARGO_PKG_VERSION"),
        by_learner.len(),
        exam.info.name,
        exam.key.len()
    );

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");

    for (learner, learner_responses) in &by_learner {
        let report = DiagnosticReport::build(&exam, learner, learner_responses, &engine);

        eprintln!("\nLearner {learner}: {}/{} graded", report.coverage.graded, report.coverage.responses);
        eprintln!("{}", super::summary_table(&report));

        let stem = format!("report-{}-{timestamp}", file_stem(learner));
        for fmt in &formats {
            match *fmt {
                "json" => {
                    let path = output.join(format!("{stem}.json"));
                    report.save_json(&path)?;
                    eprintln!("Results saved to: {}", path.display());
                }
                "html" => {
                    let path = output.join(format!("{stem}.html"));
                    write_html_report(&report, &path)?;
                    eprintln!("HTML report: {}", path.display());
                }
                _ => {
                    let path = output.join(format!("{stem}.md"));
                    std::fs::write(&path, report.to_markdown())?;
                    eprintln!("Markdown report: {}", path.display());
                }
            }
        }
    }

    Ok(())
}

/// Learner identifiers are phone numbers or names; keep them filename-safe.
fn file_stem(learner: &str) -> String {
    learner
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

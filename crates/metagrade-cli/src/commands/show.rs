//! The `metagrade show` command.

use std::path::PathBuf;

use anyhow::Result;

use metagrade_core::report::DiagnosticReport;

pub fn execute(report_path: PathBuf, format: String) -> Result<()> {
    let report = DiagnosticReport::load_json(&report_path)?;

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "{} | learner {} | {}/{} responses graded",
                report.exam.name,
                report.learner,
                report.coverage.graded,
                report.coverage.responses
            );
            println!("{}", super::summary_table(&report));

            let misconceptions: Vec<String> =
                report.misconceptions().map(|i| i.id().to_string()).collect();
            if !misconceptions.is_empty() {
                println!("\nConfidently wrong: {}", misconceptions.join(", "));
            }
            if !report.coverage.ungraded.is_empty() {
                println!("{} response(s) had no answer key entry", report.coverage.ungraded.len());
            }
        }
    }

    Ok(())
}

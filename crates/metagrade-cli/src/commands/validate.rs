//! The `metagrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(key_path: PathBuf) -> Result<()> {
    let exams = if key_path.is_dir() {
        metagrade_core::parser::load_key_directory(&key_path)?
    } else {
        vec![metagrade_core::parser::parse_answer_key(&key_path)?]
    };

    let mut total_warnings = 0;

    for exam in &exams {
        println!(
            "Answer key: {} ({} entries, {} parts)",
            exam.info.name,
            exam.key.len(),
            exam.layout.parts.len()
        );

        let warnings = metagrade_core::parser::validate_answer_key(exam);
        for w in &warnings {
            let prefix = w
                .item
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All answer keys valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

//! The `metagrade init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create metagrade.toml
    if std::path::Path::new("metagrade.toml").exists() {
        println!("metagrade.toml already exists, skipping.");
    } else {
        std::fs::write("metagrade.toml", SAMPLE_CONFIG)?;
        println!("Created metagrade.toml");
    }

    // Create example answer key
    std::fs::create_dir_all("keys")?;
    let example_path = std::path::Path::new("keys/example.toml");
    if example_path.exists() {
        println!("keys/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_KEY)?;
        println!("Created keys/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Fill in keys/example.toml with the answers for your exam");
    println!("  2. Run: metagrade validate --key keys/example.toml");
    println!("  3. Run: metagrade grade --key keys/example.toml --responses answers.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# metagrade configuration

output_dir = "./metagrade-results"

[grading]
# keyword_match answers without keywords pass when longer than this
min_answer_chars = 5
# share of required keywords that must appear
keyword_ratio = 0.7
"#;

const EXAMPLE_KEY: &str = r#"[exam]
id = "example"
name = "Example Diagnostic"
version = "1"

# Parts 1-7: three multiple-choice questions each. Part 8: two written answers.

[[groups]]
name = "grammar"
parts = [1, 2, 3]

[[groups]]
name = "reading"
parts = [4, 5, 6, 7]

[[entries]]
part = 1
question = 1
answer = "2"

[[entries]]
part = 1
question = 2
answer = "1"

[[entries]]
part = 1
question = 3
answer = "3"

[[entries]]
part = 2
question = 1
answer = "5"

[[entries]]
part = 2
question = 2
answer = "2"

[[entries]]
part = 8
question = 1
strategy = "keyword_match"
keywords = "because, however"

[[entries]]
part = 8
question = 2
answer = "I have lived here since 2020."
strategy = "strict"
"#;

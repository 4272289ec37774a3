//! metagrade CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "metagrade", version, about = "Diagnostic exam grader with metacognitive quadrants")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade exported responses against an answer key
    Grade {
        /// Path to the .toml answer key
        #[arg(long)]
        key: PathBuf,

        /// Path to the .json response export
        #[arg(long)]
        responses: PathBuf,

        /// Only grade this learner
        #[arg(long)]
        learner: Option<String>,

        /// Output directory (default: from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, markdown, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate answer key TOML files
    Validate {
        /// Path to answer key file or directory
        #[arg(long)]
        key: PathBuf,
    },

    /// Render a saved report
    Show {
        /// Report JSON
        #[arg(long)]
        report: PathBuf,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create starter config and example answer key
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("metagrade=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            key,
            responses,
            learner,
            output,
            format,
            config,
        } => commands::grade::execute(key, responses, learner, output, format, config),
        Commands::Validate { key } => commands::validate::execute(key),
        Commands::Show { report, format } => commands::show::execute(report, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

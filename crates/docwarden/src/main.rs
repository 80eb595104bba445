// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Docwarden - a local document assistant that answers with citations.
//!
//! This is the binary entry point.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use clap::{Parser, Subcommand};
use colored::Colorize;
use docwarden::runtime::Runtime;
use docwarden::{selfcheck, shell};
use docwarden_config::DocwardenConfig;
use docwarden_core::DocwardenError;
use docwarden_security::RedactingWriter;
use tracing::{error, info};

/// Docwarden - a local document assistant that answers with citations.
#[derive(Parser, Debug)]
#[command(name = "docwarden", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the document index from the source directory.
    Ingest {
        /// Directory to index, overriding `ingest.source_dir`.
        #[arg(long)]
        source_dir: Option<String>,
    },
    /// Launch an interactive chat session.
    Chat {
        /// Rebuild the index before starting.
        #[arg(long)]
        rebuild: bool,
        /// Passages retrieved per question.
        #[arg(long)]
        top_k: Option<usize>,
        /// Generation model name.
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        source_dir: Option<String>,
    },
    /// Answer a single question and exit.
    Ask {
        question: String,
        #[arg(long)]
        rebuild: bool,
    },
    /// Show stored user and company facts.
    Memory,
    /// Run the offline end-to-end check and write a JSON report.
    Selfcheck {
        #[arg(long, default_value = "artifacts/sanity_output.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => docwarden_config::load_and_validate_path(path),
        None => docwarden_config::load_and_validate(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            docwarden_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    apply_overrides(&mut config, &cli.command);
    init_tracing(&config.agent.log_level);

    if let Err(e) = run(config, cli.command).await {
        error!(error = %e, "command failed");
        eprintln!("{}: {}", "error".red(), e.user_message());
        std::process::exit(1);
    }
}

async fn run(config: DocwardenConfig, command: Commands) -> Result<(), DocwardenError> {
    match command {
        Commands::Selfcheck { output } => {
            let report = selfcheck::run_selfcheck(&output).await?;
            println!("selfcheck {}: {}", report.meta.status, output.display());
            for problem in &report.meta.errors {
                println!("  {}", problem.yellow());
            }
            Ok(())
        }
        Commands::Ingest { .. } => {
            let runtime = Runtime::new(config).await?;
            let report = runtime.reindex().await?;
            println!(
                "indexed {} chunks from {} documents",
                report.chunks, report.documents
            );
            for failure in &report.failures {
                println!("{} {}", "skipped".yellow(), failure.path.display());
            }
            runtime.shutdown().await;
            Ok(())
        }
        Commands::Chat { rebuild, .. } => {
            let runtime = Runtime::new(config).await?;
            let chunks = runtime.open_index(rebuild).await?;
            info!(chunks, "index ready");
            shell::run_shell(&runtime).await
        }
        Commands::Ask { question, rebuild } => {
            let runtime = Runtime::new(config).await?;
            runtime.open_index(rebuild).await?;
            let reply = runtime.ask(&question).await;
            runtime.shutdown().await;
            shell::print_reply(&reply?);
            Ok(())
        }
        Commands::Memory => {
            let runtime = Runtime::new(config).await?;
            shell::print_memory(&runtime).await
        }
    }
}

/// Fold command-line flags into the loaded configuration.
fn apply_overrides(config: &mut DocwardenConfig, command: &Commands) {
    match command {
        Commands::Ingest { source_dir } => {
            if let Some(dir) = source_dir {
                config.ingest.source_dir = dir.clone();
            }
        }
        Commands::Chat {
            top_k,
            model,
            source_dir,
            ..
        } => {
            if let Some(dir) = source_dir {
                config.ingest.source_dir = dir.clone();
            }
            if let Some(k) = top_k {
                config.retrieval.top_k = (*k).max(1);
            }
            if let Some(model) = model {
                config.generation.model = model.clone();
            }
        }
        _ => {}
    }
}

/// Initialize the tracing subscriber.
///
/// Every formatted line passes through [`RedactingWriter`] before it reaches
/// stderr.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docwarden={log_level},warn")));
    let extra_values = Arc::new(RwLock::new(Vec::new()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(move || RedactingWriter::new(std::io::stderr(), Arc::clone(&extra_values)))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = docwarden_config::load_and_validate_str("").expect("defaults are valid");
        assert_eq!(config.agent.name, "docwarden");
    }

    #[test]
    fn chat_flags_override_config() {
        let cli = Cli::parse_from([
            "docwarden", "chat", "--top-k", "0", "--model", "llama3", "--source-dir", "corpus",
        ]);
        let mut config = DocwardenConfig::default();
        apply_overrides(&mut config, &cli.command);
        assert_eq!(config.retrieval.top_k, 1);
        assert_eq!(config.generation.model, "llama3");
        assert_eq!(config.ingest.source_dir, "corpus");
    }

    #[test]
    fn selfcheck_output_has_default() {
        let cli = Cli::parse_from(["docwarden", "selfcheck"]);
        match cli.command {
            Commands::Selfcheck { output } => {
                assert_eq!(output, PathBuf::from("artifacts/sanity_output.json"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from(["docwarden", "memory", "--config", "custom.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }
}

// SPDX-FileCopyrightText: 2026 Docwarden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `docwarden chat` command implementation.
//!
//! Interactive REPL with colored prompt and readline history. Each line is
//! one turn through the pipeline; slash commands are handled locally.

use colored::Colorize;
use docwarden_agent::{SlashCommand, TurnKind, TurnReply};
use docwarden_core::DocwardenError;
use docwarden_memory::WriteStatus;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::error;

use crate::runtime::Runtime;

const HELP: &str = "\
  /help      show this message
  /memory    list stored user and company facts
  /reindex   rebuild the document index
  /exit      leave the shell (also /quit, Ctrl+D)";

/// Runs the `docwarden chat` interactive REPL.
pub async fn run_shell(runtime: &Runtime) -> Result<(), DocwardenError> {
    let mut rl = DefaultEditor::new()
        .map_err(|e| DocwardenError::Internal(format!("failed to initialize readline: {e}")))?;

    let name = runtime.config().agent.name.clone();
    println!("{}", format!("{name} chat").bold().green());
    if let Some(warning) = runtime.check_generator().await {
        println!("{} {warning}", "warning:".yellow());
    }
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/exit".yellow());

    let prompt = format!("{}> ", name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if let Some(command) = SlashCommand::parse(trimmed) {
                    if command == SlashCommand::Exit {
                        break;
                    }
                    run_command(runtime, command).await;
                    continue;
                }

                match runtime.ask(trimmed).await {
                    Ok(reply) => print_reply(&reply),
                    Err(e) => {
                        error!(error = %e, "turn failed");
                        eprintln!("{}: {}", "error".red(), e.user_message());
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {}", "error".red(), input_failure(&e));
                break;
            }
        }
    }

    runtime.shutdown().await;
    println!("{}", "goodbye".dimmed());
    Ok(())
}

const INPUT_FAILED: &str = "Could not read from the terminal. Ending the session.";

/// Log the terminal failure and return the sentence shown to the user.
fn input_failure(err: &ReadlineError) -> &'static str {
    error!(error = %err, "readline failed");
    INPUT_FAILED
}

async fn run_command(runtime: &Runtime, command: SlashCommand) {
    match command {
        SlashCommand::Help => println!("{HELP}"),
        SlashCommand::Memory => {
            if let Err(e) = print_memory(runtime).await {
                eprintln!("{}: {}", "error".red(), e.user_message());
            }
        }
        SlashCommand::Reindex => {
            println!("{}", "rebuilding index...".dimmed());
            match runtime.reindex().await {
                Ok(report) => {
                    println!(
                        "indexed {} chunks from {} documents",
                        report.chunks, report.documents
                    );
                    for failure in &report.failures {
                        println!("{} {}", "skipped".yellow(), failure.path.display());
                    }
                }
                Err(e) => {
                    error!(error = %e, "reindex failed");
                    eprintln!("{}: {}", "error".red(), e.user_message());
                }
            }
        }
        SlashCommand::Unknown(input) => {
            println!("unknown command {input}; type {} for help", "/help".yellow());
        }
        SlashCommand::Exit => {}
    }
}

/// Print both fact stores.
pub async fn print_memory(runtime: &Runtime) -> Result<(), DocwardenError> {
    let ledger = runtime.ledger();
    if !ledger.is_enabled() {
        println!("{}", "memory is disabled".dimmed());
        return Ok(());
    }
    for (label, facts) in [
        ("user", ledger.user_facts().await?),
        ("company", ledger.company_facts().await?),
    ] {
        println!("{}", label.bold());
        if facts.is_empty() {
            println!("  {}", "(empty)".dimmed());
        }
        for fact in facts {
            println!("  • {fact}");
        }
    }
    Ok(())
}

pub fn print_reply(reply: &TurnReply) {
    match reply.kind {
        TurnKind::Empty => return,
        TurnKind::Blocked(_) => println!("{}", reply.text.yellow()),
        _ => println!("{}", reply.text),
    }

    if !reply.citations.is_empty() {
        println!("{}", "sources:".dimmed());
        for citation in &reply.citations {
            println!("  {}", citation.to_string().dimmed());
        }
    }

    for event in &reply.memory_events {
        let note = match event.status {
            WriteStatus::Written => format!("remembered ({}): {}", event.target, event.summary),
            WriteStatus::Duplicate => format!("already known ({}): {}", event.target, event.summary),
            WriteStatus::BelowThreshold => continue,
        };
        println!("{}", note.dimmed());
    }
}

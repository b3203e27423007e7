//! Binary entry point for reminisce.
//!
//! Runs the proposal engine over a JSON snapshot of subjects and memories and
//! prints the resulting proposals as JSON.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use reminisce::models::{IdHash, Proposal};
use reminisce::observability;
use reminisce::{InMemoryStore, ProposalConfig, ProposalEngine, ReminisceConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// Reminisce - surfaces past subjects and memories relevant to a conversation.
#[derive(Parser)]
#[command(name = "reminisce")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "REMINISCE_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Path to the JSON snapshot of topics, subjects, and memories.
    #[arg(short, long, global = true, default_value = "snapshot.json")]
    snapshot: PathBuf,

    /// Override the minimum Jaccard similarity.
    #[arg(long, global = true)]
    min_jaccard: Option<f64>,

    /// Override the maximum number of proposals.
    #[arg(long, global = true)]
    max_proposals: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Propose past subjects for the current subjects of a topic.
    Topic {
        /// Current topic.
        #[arg(short, long)]
        topic: String,

        /// Display ids of the topic's current subjects.
        #[arg(short = 'S', long = "subject", required = true)]
        subjects: Vec<String>,
    },

    /// Propose past subjects for text being typed.
    Input {
        /// Current topic.
        #[arg(short, long)]
        topic: String,

        /// The typed text.
        text: String,
    },

    /// Propose memories for a set of keyword terms.
    Memories {
        /// Keyword terms (comma-separated).
        #[arg(short = 'k', long, value_delimiter = ',', required = true)]
        terms: Vec<String>,
    },

    /// Propose past subjects and memories, merged and ranked.
    Combined {
        /// Current topic.
        #[arg(short, long)]
        topic: String,

        /// Display ids of the topic's current subjects.
        #[arg(short = 'S', long = "subject", required = true)]
        subjects: Vec<String>,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init_logging(&config.logging, cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: &ReminisceConfig) -> anyhow::Result<()> {
    let proposal_config = proposal_config(config, cli.min_jaccard, cli.max_proposals)?;

    let store = Arc::new(
        InMemoryStore::load_snapshot(&cli.snapshot)
            .with_context(|| format!("loading snapshot {}", cli.snapshot.display()))?,
    );
    let engine = ProposalEngine::new(store.clone(), store.clone(), store.clone())
        .with_memory_store(store);

    let proposals = match cli.command {
        Commands::Topic { topic, subjects } => {
            let refs = subject_refs(&topic, &subjects);
            engine.proposals_for_topic(&topic, &refs, &proposal_config, None)
        },
        Commands::Input { topic, text } => {
            engine.proposals_for_input(&topic, &text, &proposal_config)
        },
        Commands::Memories { terms } => {
            let terms: Vec<String> = terms
                .iter()
                .map(|t| reminisce::models::normalize_term(t))
                .filter(|t| !t.is_empty())
                .collect();
            engine.memory_proposals(&terms, &proposal_config)
        },
        Commands::Combined { topic, subjects } => {
            let refs = subject_refs(&topic, &subjects);
            engine.combined_proposals(&topic, &refs, &proposal_config)
        },
    };

    print_proposals(&proposals)
}

/// Loads configuration.
fn load_config(path: Option<&Path>) -> anyhow::Result<ReminisceConfig> {
    match path {
        Some(path) => ReminisceConfig::load_from_file(path)
            .with_context(|| format!("reading {}", path.display())),
        None => Ok(ReminisceConfig::load_default()),
    }
}

/// Applies CLI overrides to the configured proposal settings.
fn proposal_config(
    config: &ReminisceConfig,
    min_jaccard: Option<f64>,
    max_proposals: Option<usize>,
) -> anyhow::Result<ProposalConfig> {
    let mut proposal_config = config.proposals;
    if let Some(v) = min_jaccard {
        proposal_config = proposal_config.with_min_jaccard(v);
    }
    if let Some(v) = max_proposals {
        proposal_config = proposal_config.with_max_proposals(v);
    }
    proposal_config
        .validate()
        .context("invalid proposal settings")?;
    Ok(proposal_config)
}

/// Maps subject display ids within a topic to id hashes.
fn subject_refs(topic: &str, subjects: &[String]) -> Vec<IdHash> {
    subjects
        .iter()
        .map(|id| InMemoryStore::calculate_subject_id_hash(topic, id))
        .collect()
}

/// Prints proposals as pretty JSON.
fn print_proposals(proposals: &[Proposal]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(proposals).context("serializing proposals")?;
    println!("{json}");
    Ok(())
}

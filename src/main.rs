//! codex-duel - relay a dialogue between two agent CLI instances
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use codex_duel::core::{LocalProvider, OutputCapture};
use codex_duel::executor::AgentExecutor;
use codex_duel::{CodexExecutor, Config, Relay, ScriptedExecutor};

/// Let two Codex CLI instances talk to each other, one utterance at a time
#[derive(Parser, Debug)]
#[command(name = "codex-duel")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of round-trips (A then B counts as one)
    #[arg(long, short = 't')]
    turns: Option<usize>,

    /// Initial topic or instruction, given to Agent A only
    #[arg(long, short = 's', required_unless_present = "init_config")]
    seed: Option<String>,

    /// Model for Agent A (backend default if unset)
    #[arg(long)]
    a_model: Option<String>,

    /// Model for Agent B (backend default if unset)
    #[arg(long)]
    b_model: Option<String>,

    /// Use a local open-source model provider
    #[arg(long)]
    oss: bool,

    /// Local provider to use with --oss
    #[arg(long, value_enum)]
    local_provider: Option<LocalProvider>,

    /// Transcript destination
    #[arg(long, short = 'l')]
    log: Option<PathBuf>,

    /// Agent program to launch
    #[arg(long)]
    program: Option<String>,

    /// How to read the agent's final message
    #[arg(long, value_enum)]
    capture: Option<OutputCapture>,

    /// Kill an agent invocation after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Relay canned utterances instead of launching the agent program
    #[arg(long)]
    dry_run: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    init_config: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(turns) = args.turns {
        config.relay.turns = turns;
    }

    if let Some(log) = args.log {
        config.relay.log_path = log;
    }

    if args.a_model.is_some() {
        config.models.agent_a = args.a_model;
    }

    if args.b_model.is_some() {
        config.models.agent_b = args.b_model;
    }

    if args.oss {
        config.backend.oss = true;
    }

    if args.local_provider.is_some() {
        config.backend.local_provider = args.local_provider;
    }

    if let Some(program) = args.program {
        config.backend.program = program;
    }

    if let Some(capture) = args.capture {
        config.backend.capture = capture;
    }

    if args.timeout.is_some() {
        config.backend.timeout_secs = args.timeout;
    }

    if args.init_config {
        let path = config.save()?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let seed = args.seed.context("--seed is required")?;
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let relay_config = config.relay_config(seed, cwd)?;

    let executor: Arc<dyn AgentExecutor> = if args.dry_run {
        Arc::new(ScriptedExecutor::numbered())
    } else {
        if !CodexExecutor::is_available(&relay_config.backend().program).await {
            tracing::warn!(
                program = %relay_config.backend().program,
                "agent program did not answer --version; the first invocation will likely fail"
            );
        }
        Arc::new(CodexExecutor::new())
    };

    let mut relay = Relay::new(relay_config, executor);
    relay.run().await?;

    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

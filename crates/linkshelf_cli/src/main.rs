//! Linkshelf CLI
//!
//! Interactive shell over the Linkshelf sync engine.
//!
//! Starts an in-process reference backend, signs the given user in and reads
//! commands from stdin. Type `help` for the command list.

mod commands;

use clap::Parser;
use commands::{seed, shell, ShellResult};
use linkshelf_backend::{BackendConfig, MemoryBackend};
use linkshelf_sync_engine::{EngineConfig, SessionContext, SyncEngine};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Linkshelf bookmark shell.
#[derive(Parser)]
#[command(name = "linkshelf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Email to sign in with
    #[arg(short, long, default_value = "demo@linkshelf.dev")]
    email: String,

    /// JSON file of bookmarks to add at startup
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    run(&cli)?;
    Ok(())
}

fn run(cli: &Cli) -> ShellResult<()> {
    let backend = MemoryBackend::new(BackendConfig::default());
    let client = backend.sign_in(&cli.email)?;
    let context = SessionContext::new(client.clone(), client);
    let mut engine = SyncEngine::start(context, EngineConfig::default())?;

    if let Some(path) = &cli.seed {
        let entries = seed::load(path)?;
        let added = seed::apply(&mut engine, &entries);
        info!(added, total = entries.len(), "seed file applied");
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Some(name) = engine.welcome_name() {
        writeln!(out, "Welcome, {name}")?;
    }
    writeln!(out, "{} bookmark(s); type `help` for commands", engine.bookmarks().len())?;

    shell::run(&mut engine, io::stdin().lock(), &mut out)?;
    info!(stats = ?engine.stats(), "shell closed");
    Ok(())
}

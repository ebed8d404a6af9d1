mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    arrange, edit, init, list, new, show, suggest, ArrangeArgs, EditArgs, InitArgs, NewArgs,
    ShowArgs, SuggestArgs,
};
use config::Workspace;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Vitae CLI - edit and autosave résumé documents from the terminal
#[derive(Parser, Debug)]
#[command(name = "vitae")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Document store directory (defaults to ./.vitae)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Log session activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default vitae.config.json
    Init(InitArgs),

    /// List stored documents, most recent first
    List,

    /// Create and save a new document
    New(NewArgs),

    /// Print a document and its visible sections
    Show(ShowArgs),

    /// Move or reorder sections
    Arrange(ArrangeArgs),

    /// Apply a suggestion patch to a section
    Suggest(SuggestArgs),

    /// Interactive editing with autosave
    Edit(EditArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let workspace = || Workspace::load(&cwd, cli.store.as_deref());

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::List => list(&workspace()?).await,
        Command::New(args) => new(args, &workspace()?).await,
        Command::Show(args) => show(args, &workspace()?).await,
        Command::Arrange(args) => arrange(args, &workspace()?).await,
        Command::Suggest(args) => suggest(args, &workspace()?).await,
        Command::Edit(args) => edit(args, &workspace()?).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

//! Ignis CLI - bootstrap config generation for clusters

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use ignis::util::diagnostic::{self, Diagnostic};
use ignis::GlobalContext;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        diagnostic::emit(&Diagnostic::from_error(&e), color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("ignis=debug")
    } else {
        EnvFilter::new("ignis=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let mut ctx = GlobalContext::new()?;
    ctx.set_verbose(cli.verbose);

    // Execute command
    match cli.command {
        Commands::Create(args) => commands::create::execute(&ctx, args),
        Commands::Graph(args) => commands::graph::execute(&ctx, args),
        Commands::Destroy(args) => commands::destroy::execute(&ctx, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

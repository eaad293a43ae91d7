//! `syncd` -- reconciliation daemon for the beads system.
//!
//! Parses CLI arguments with clap and dispatches to a command handler, the
//! same shape `bd` uses, but two verbs (`generate`, `serve`) are async since
//! they drive upstream HTTP clients and the axum server.

mod cli;
mod commands;
mod error;
mod http;

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

use cli::{Cli, Commands};
use error::CliError;

static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

#[tokio::main]
async fn main() {
    let _ = ctrlc::set_handler(|| {
        if CTRLC_RECEIVED.swap(true, Ordering::SeqCst) {
            std::process::exit(1);
        }
        std::process::exit(0);
    });

    let cli = Cli::parse();

    if cli.global.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("syncd=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("syncd=info")
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match &cli.command {
        Commands::Compile(args) => commands::compile::run(args),
        Commands::Init(args) => commands::init::run(args),
        Commands::Generate(args) => commands::generate::run(args).await,
        Commands::Watch(args) => commands::watch::run(args),
        Commands::Sync => commands::sync_cmd::run(&cli.global),
        Commands::Serve => commands::serve::run(&cli.global).await,
    };

    if let Err(e) = result {
        report_error(&cli.global, &e);
        std::process::exit(e.exit_code());
    }
}

fn report_error(global: &cli::GlobalArgs, err: &CliError) {
    if global.json {
        let body = serde_json::json!({"error": err.to_string()});
        eprintln!("{body}");
    } else {
        eprintln!("error: {err}");
    }
}

// Copyright 2026 Vahan Lookup Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::sync::Arc;
use vahan_lookup::fetch::PageClient;
use vahan_lookup::{extract, rest};

#[derive(Parser)]
#[command(
    name = "vahan",
    about = "Vehicle info lookup over the vahanx.in RC-search pages",
    version
)]
struct Cli {
    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP lookup API
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8000")]
        port: u16,
        /// Override the upstream base URL
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Look up a single registration number and print the record
    Lookup {
        /// Vehicle registration number (e.g. "MH12DE1433")
        rc: String,
        /// Override the upstream base URL
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

/// Initialize tracing from the environment filter plus a crate default.
fn init_tracing(verbose: bool) {
    let directive = if verbose {
        "vahan_lookup=debug"
    } else {
        "vahan_lookup=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().unwrap()),
        )
        .init();
}

fn page_client(base_url: Option<String>) -> PageClient {
    match base_url {
        Some(base) => PageClient::with_base_url(base),
        None => PageClient::new(),
    }
}

/// One-shot lookup: same pipeline as the HTTP route, printed to stdout.
async fn run_lookup(rc: &str, base_url: Option<String>) -> Result<()> {
    let client = page_client(base_url);
    let body = client.fetch_page(rc).await?;
    let record = extract::scrape_record(&body);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { port, base_url } => {
            init_tracing(cli.verbose);
            let state = Arc::new(rest::AppState {
                client: page_client(base_url),
            });
            rest::start(port, state).await
        }
        Commands::Lookup { rc, base_url } => {
            init_tracing(cli.verbose);
            run_lookup(&rc, base_url).await
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "vahan", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    result
}

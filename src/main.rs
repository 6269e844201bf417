//! usage-cost - Price provider usage records against a per-model price list

use clap::Parser;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use usage_cost::{
    Result,
    batch::calculate_usage_costs,
    cli::{CalculateArgs, Cli, Command},
    output::get_formatter,
    types::CostRequest,
};
use usage_cost_http::HttpServer;

const CRATE_TARGETS: [&str; 4] = [
    "usage_cost",
    "usage_cost_core",
    "usage_cost_pricing",
    "usage_cost_http",
];

fn init_logging(cli: &Cli) {
    // --quiet and --verbose override RUST_LOG
    let directives = |level: &str| {
        CRATE_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .chain(std::iter::once(format!("tower_http={level}")))
            .collect::<Vec<_>>()
            .join(",")
    };

    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new(directives("debug"))
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directives("info")))
    };

    // Logs go to stderr so `calculate --json` output stays parseable
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn read_request_body(args: &CalculateArgs) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    match args.input_path() {
        Some(path) => {
            info!("Reading request from {}", path.display());
            body = tokio::fs::read(path).await?;
        }
        None => {
            info!("Reading request from stdin");
            tokio::io::stdin().read_to_end(&mut body).await?;
        }
    }
    Ok(body)
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve(args) => {
            info!("Starting HTTP server");
            HttpServer::new(args.into()).run().await?;
        }

        Command::Calculate(args) => {
            info!("Running one-off cost calculation");

            let body = read_request_body(&args).await?;
            let request = CostRequest::from_slice(&body)?;
            let envelope = calculate_usage_costs(request);

            let color = !args.no_color
                && std::env::var_os("NO_COLOR").is_none()
                && is_terminal::is_terminal(std::io::stdout());
            let formatter = get_formatter(args.json, args.pretty, color);
            println!("{}", formatter.format_envelope(&envelope)?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if e.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

//! CLI interface for usage-cost
//!
//! This module defines the command-line interface using clap.
//!
//! # Example
//!
//! ```bash
//! # Serve the calculator over HTTP, requiring a function key
//! USAGE_COST_FUNCTION_KEY=s3cret usage-cost serve --port 7071
//!
//! # Price a request document once and print a table
//! usage-cost calculate --input request.json
//!
//! # Same, as pretty-printed JSON from stdin
//! cat request.json | usage-cost calculate --json --pretty
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use usage_cost_http::ServerConfig;
use usage_cost_http::server::{DEFAULT_HOST, DEFAULT_PORT};

/// Price provider usage records against a per-model price list
#[derive(Parser, Debug, Clone)]
#[command(name = "usage-cost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Only show warnings and errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Show debug output, including per-record costs
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve the calculator over HTTP
    Serve(ServeArgs),

    /// Price a single request document
    Calculate(CalculateArgs),
}

/// Arguments for the serve command
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "USAGE_COST_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(long, short = 'p', env = "USAGE_COST_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Key callers must present in `x-functions-key` or `?code=`
    #[arg(long, env = "USAGE_COST_FUNCTION_KEY", hide_env_values = true)]
    pub function_key: Option<String>,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            // An empty key from the environment means "no key"
            function_key: args.function_key.filter(|k| !k.is_empty()),
        }
    }
}

/// Arguments for the calculate command
#[derive(Args, Debug, Clone)]
pub struct CalculateArgs {
    /// Request document to read; stdin when omitted or `-`
    #[arg(long, short = 'i')]
    pub input: Option<PathBuf>,

    /// Output the result envelope as JSON
    #[arg(long)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, requires = "json")]
    pub pretty: bool,

    /// Disable colored table output
    #[arg(long, conflicts_with = "json")]
    pub no_color: bool,
}

impl CalculateArgs {
    /// Input file, or `None` for stdin
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input
            .as_ref()
            .filter(|path| path.as_os_str() != "-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["usage-cost", "serve"]).unwrap();
        match cli.command {
            Command::Serve(args) => {
                let config = ServerConfig::from(args);
                assert_eq!(config.port, DEFAULT_PORT);
                assert_eq!(config.host, DEFAULT_HOST);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "usage-cost",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--function-key",
            "s3cret",
        ])
        .unwrap();
        match cli.command {
            Command::Serve(args) => {
                let config = ServerConfig::from(args);
                assert_eq!(config.host, "0.0.0.0");
                assert_eq!(config.port, 8080);
                assert_eq!(config.function_key.as_deref(), Some("s3cret"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_empty_function_key_disables_auth() {
        let args = ServeArgs {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            function_key: Some(String::new()),
        };
        assert_eq!(ServerConfig::from(args).function_key, None);
    }

    #[test]
    fn test_calculate_stdin_dash() {
        let cli = Cli::try_parse_from(["usage-cost", "calculate", "-i", "-", "--json"]).unwrap();
        match cli.command {
            Command::Calculate(args) => {
                assert!(args.input_path().is_none());
                assert!(args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_pretty_requires_json() {
        assert!(Cli::try_parse_from(["usage-cost", "calculate", "--pretty"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["usage-cost", "-q", "-v", "calculate"]).is_err());
    }
}

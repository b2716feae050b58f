//! pipecall command-line probe
//!
//! Sends one method call to a pipe RPC receiver and prints the outcome.
//! Replaces the pile of ad hoc probe scripts: point it at the request pipe
//! (and optionally the response pipe), name a method, pass arguments as JSON.
//!
//! Exit codes: 0 success, 1 application error, 2 timeout, 3 transport error,
//! 4 cancelled.

use anyhow::Result;
use clap::Parser;
use pipecall_client::{CallOptions, ClientConfig, RpcClient};
use pipecall_core::Outcome;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// FIFO the receiver reads method calls from
    #[arg(long, default_value = "/tmp/dreambot_shim_pipe")]
    request_pipe: PathBuf,

    /// FIFO the receiver writes replies to
    #[arg(long, default_value = "/tmp/dreambot_shim_response_pipe")]
    response_pipe: PathBuf,

    /// Send without waiting for a response
    #[arg(long)]
    no_wait: bool,

    /// Response deadline in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Verbose wire logging to stderr
    #[arg(long, short)]
    verbose: bool,

    /// Method name to invoke
    method: String,

    /// Arguments, each parsed as JSON (bare words fall back to strings)
    args: Vec<String>,
}

/// `3222` is a number, `true` a boolean, `"x"` a string; anything that is
/// not valid JSON is taken as a plain string so item names need no quoting
fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ClientConfig {
        request_path: args.request_pipe,
        response_path: if args.no_wait {
            None
        } else {
            Some(args.response_pipe)
        },
        default_timeout: Duration::from_millis(args.timeout_ms),
        open_timeout: Duration::from_secs(5),
    };

    let call_args: Vec<Value> = args.args.iter().map(|a| parse_arg(a)).collect();

    let client = RpcClient::connect(config).await?;
    info!("Calling {} with {} args", args.method, call_args.len());

    let outcome = client
        .call_with(&args.method, call_args, CallOptions::default())
        .await?;

    let code = match &outcome {
        Outcome::Success(result) => {
            println!("{}", serde_json::to_string_pretty(result)?);
            0
        }
        Outcome::ApplicationError(message) => {
            eprintln!("application error: {}", message);
            1
        }
        Outcome::Timeout => {
            eprintln!("timeout: no response within {}ms", args.timeout_ms);
            2
        }
        Outcome::TransportError(message) => {
            eprintln!("transport error: {}", message);
            3
        }
        Outcome::Cancelled => {
            eprintln!("cancelled");
            4
        }
    };

    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arg_parsing() {
        assert_eq!(parse_arg("3222"), json!(3222));
        assert_eq!(parse_arg("true"), json!(true));
        assert_eq!(parse_arg("\"Lobster\""), json!("Lobster"));
        // Unquoted item names pass through as strings
        assert_eq!(parse_arg("Lobster"), json!("Lobster"));
    }

    #[test]
    fn test_cli_shape() {
        let args = Args::parse_from([
            "pipecall",
            "--timeout-ms",
            "200",
            "walk_to_location",
            "3222",
            "3218",
        ]);
        assert_eq!(args.method, "walk_to_location");
        assert_eq!(args.args, vec!["3222", "3218"]);
        assert_eq!(args.timeout_ms, 200);
        assert!(!args.no_wait);
    }
}

//! # signet CLI entry point
//!
//! Parses the flag surface, initializes tracing from the verbosity count,
//! and dispatches the single message operation.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use signet_cli::{run_message, MessageArgs};

/// Exchange signed, encrypted messages inside a closed participant network.
///
/// With `--recipient`, the source file is signed with the selected identity
/// and encrypted for the recipient; without it, the source file is treated
/// as a received envelope to decrypt and verify.
#[derive(Parser, Debug)]
#[command(name = "signet", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(flatten)]
    message: MessageArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run_message(&cli.message) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use signet_cli::message::StoreType;

    const BASE: [&str; 9] = [
        "signet",
        "--source",
        "in.txt",
        "--sink",
        "out.sgnv",
        "--keystore",
        "store.sgks",
        "--store-pass",
        "pw",
    ];

    fn parse(extra: &[&str]) -> Cli {
        let mut argv: Vec<&str> = BASE.to_vec();
        argv.extend_from_slice(&["--alias", "main"]);
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn cli_parse_seal_mode() {
        let cli = parse(&["--recipient", "bob"]);
        assert_eq!(cli.message.recipient.as_deref(), Some("bob"));
        assert_eq!(cli.message.source, PathBuf::from("in.txt"));
        assert_eq!(cli.message.sink, PathBuf::from("out.sgnv"));
        assert_eq!(cli.message.alias, "main");
    }

    #[test]
    fn cli_parse_open_mode() {
        let cli = parse(&[]);
        assert!(cli.message.recipient.is_none());
        assert!(cli.message.key_pass.is_none());
        assert!(cli.message.remote.is_none());
    }

    #[test]
    fn cli_parse_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.message.store_type, StoreType::Signet);
        assert_eq!(cli.message.remote_timeout, 10);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn cli_parse_remote_options() {
        let cli = parse(&[
            "--remote",
            "https://directory.example.com",
            "--remote-timeout",
            "3",
        ]);
        assert_eq!(
            cli.message.remote.as_deref(),
            Some("https://directory.example.com")
        );
        assert_eq!(cli.message.remote_timeout, 3);
    }

    #[test]
    fn cli_parse_key_pass() {
        let cli = parse(&["--key-pass", "entry-pw"]);
        assert_eq!(cli.message.key_pass.as_deref(), Some("entry-pw"));
    }

    #[test]
    fn cli_parse_verbose_levels() {
        assert_eq!(parse(&[]).verbose, 0);
        assert_eq!(parse(&["-v"]).verbose, 1);
        assert_eq!(parse(&["-vv"]).verbose, 2);
        assert_eq!(parse(&["-vvv"]).verbose, 3);
    }

    #[test]
    fn cli_parse_missing_alias_errors() {
        let result = Cli::try_parse_from(BASE);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_missing_store_pass_errors() {
        let result = Cli::try_parse_from([
            "signet",
            "--source",
            "in",
            "--sink",
            "out",
            "--keystore",
            "store.sgks",
            "--alias",
            "main",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_unsupported_store_type_errors() {
        let mut argv: Vec<&str> = BASE.to_vec();
        argv.extend_from_slice(&["--alias", "main", "--store-type", "pkcs12"]);
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn cli_debug_impl() {
        let cli = parse(&[]);
        let debug = format!("{cli:?}");
        assert!(debug.contains("Cli"));
    }
}

//! CLI argument parsing for bridges.

use std::path::PathBuf;

use clap::Args;

/// Common CLI arguments for all bridges.
///
/// Flatten into a bridge's own parser with `#[command(flatten)]`.
#[derive(Args, Debug, Clone)]
pub struct BridgeArgs {
    /// Carbon host to send metrics to.
    pub host: String,

    /// Carbon port [default: 2004, or `carbon.port` from the config file].
    pub port: Option<u16>,

    /// Path to configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

impl BridgeArgs {
    /// Port from the command line, falling back to `configured`.
    pub fn port_or(&self, configured: u16) -> u16 {
        self.port.unwrap_or(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct Cli {
        #[command(flatten)]
        args: BridgeArgs,
    }

    #[test]
    fn test_host_only() {
        let cli = Cli::try_parse_from(["pfgraph", "carbon.example.org"]).unwrap();
        assert_eq!(cli.args.host, "carbon.example.org");
        assert_eq!(cli.args.port, None);
        assert_eq!(cli.args.port_or(2004), 2004);
        assert!(cli.args.config.is_none());
    }

    #[test]
    fn test_host_and_port() {
        let cli = Cli::try_parse_from(["pfgraph", "10.0.0.5", "2014", "--log-level", "debug"])
            .unwrap();
        assert_eq!(cli.args.port_or(2004), 2014);
        assert_eq!(cli.args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_missing_host_is_usage_error() {
        let err = Cli::try_parse_from(["pfgraph"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(Cli::try_parse_from(["pfgraph", "host", "not-a-port"]).is_err());
        assert!(Cli::try_parse_from(["pfgraph", "host", "70000"]).is_err());
    }
}

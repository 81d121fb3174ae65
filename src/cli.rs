// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `assetpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "assetpipe",
    version,
    about = "Build, watch and serve static front-end assets.",
    long_about = None
)]
pub struct CliArgs {
    /// Task or composite target to run (clean, vendor, img, svg, css, js,
    /// dist, build, watch, deploy).
    #[arg(value_name = "TARGET", default_value = "default")]
    pub target: String,

    /// Path to the config file (TOML).
    ///
    /// Default: `Assetpipe.toml` in the current working directory. The
    /// default file is optional; an explicitly given one must exist.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Project root that all source and output paths are relative to.
    #[arg(long, value_name = "DIR")]
    pub root: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ASSETPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print registered tasks and targets, but don't run anything.
    #[arg(long)]
    pub list: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_defaults_to_default_alias() {
        let args = CliArgs::parse_from(["assetpipe"]);
        assert_eq!(args.target, "default");
        assert!(args.config.is_none());
        assert!(!args.list);
    }

    #[test]
    fn parses_target_and_flags() {
        let args = CliArgs::parse_from([
            "assetpipe",
            "watch",
            "--root",
            "site",
            "--log-level",
            "debug",
        ]);
        assert_eq!(args.target, "watch");
        assert_eq!(args.root.as_deref(), Some("site"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}

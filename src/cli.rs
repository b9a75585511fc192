//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_PATH;

/// macrodex - catalog service for shareable image macros
#[derive(Parser, Debug)]
#[command(name = "macrodex")]
#[command(version)]
#[command(about = "Catalog service for shareable image and animation macros", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Run the standalone rehost worker
    Worker,

    /// Write a sample configuration file
    ConfigGen {
        /// Output path
        path: String,
    },
}

impl Cli {
    /// 未指定子命令时默认 serve
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_serve() {
        let cli = Cli::parse_from(["macrodex"]);
        assert_eq!(cli.command(), Commands::Serve);
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
    }

    #[test]
    fn test_worker_with_config() {
        let cli = Cli::parse_from(["macrodex", "worker", "--config", "/etc/macrodex.toml"]);
        assert_eq!(cli.command(), Commands::Worker);
        assert_eq!(cli.config, "/etc/macrodex.toml");
    }

    #[test]
    fn test_config_gen_path() {
        let cli = Cli::parse_from(["macrodex", "config-gen", "out.toml"]);
        assert_eq!(
            cli.command(),
            Commands::ConfigGen {
                path: "out.toml".to_string()
            }
        );
    }
}

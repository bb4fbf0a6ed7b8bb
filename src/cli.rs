//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sprig incremental blog renderer CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Site root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output directory path (relative to site root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file name (default: sprig.toml)
    #[arg(short = 'C', long, default_value = "sprig.toml")]
    pub config: PathBuf,

    /// Print debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long)]
    pub quiet: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render every page, post and index from scratch
    Rebuild,

    /// Render only what the last commit touched, falling back to a rebuild
    Update {
        /// Read the change batch from a JSON file instead of git
        #[arg(short, long)]
        batch: Option<PathBuf>,
    },

    /// Print what an update (or rebuild) would render and delete
    Plan {
        /// Read the change batch from a JSON file instead of git
        #[arg(short, long)]
        batch: Option<PathBuf>,

        /// Plan a full rebuild instead of an update
        #[arg(long, conflicts_with = "batch")]
        rebuild: bool,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_rebuild(&self) -> bool {
        matches!(self.command, Commands::Rebuild)
    }
    pub const fn is_update(&self) -> bool {
        matches!(self.command, Commands::Update { .. })
    }
    pub const fn is_plan(&self) -> bool {
        matches!(self.command, Commands::Plan { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update_with_batch() {
        let cli = Cli::parse_from(["sprig", "-v", "update", "--batch", "changes.json"]);
        assert!(cli.verbose);
        assert!(cli.is_update());
        match cli.command {
            Commands::Update { batch } => assert_eq!(batch, Some(PathBuf::from("changes.json"))),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_default_config_name() {
        let cli = Cli::parse_from(["sprig", "rebuild"]);
        assert_eq!(cli.config, PathBuf::from("sprig.toml"));
        assert!(cli.is_rebuild());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["sprig", "-v", "-q", "rebuild"]).is_err());
    }

    #[test]
    fn test_plan_rebuild_conflicts_with_batch() {
        assert!(Cli::try_parse_from(["sprig", "plan", "--rebuild", "--batch", "x.json"]).is_err());
    }
}

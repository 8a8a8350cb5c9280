use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::fields::HydrationPolicy;

/// Task list client for a REST task store, with a local snapshot cache.
/// Settings come from ~/.tasklist/config.toml or a path passed via --config.
#[derive(Parser)]
#[command(name = "tl", version, about = "Task list backed by a REST store")]
pub struct Cli {
    /// Path to a TOML config file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the task API, e.g. http://localhost:5000/api.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Directory holding the cache snapshot.
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Keep the snapshot in memory only for this run.
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Startup precedence between cache and remote store.
    #[arg(long, global = true, value_enum)]
    pub hydration: Option<HydrationPolicy>,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Filter;

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tl", "list", "--filter", "completed", "--no-cache"]).unwrap();
        assert!(cli.no_cache);
        assert!(matches!(cli.command, Commands::List { filter: Filter::Completed }));
    }

    #[test]
    fn hydration_flag_parses() {
        let cli = Cli::try_parse_from(["tl", "--hydration", "remote-first", "refresh"]).unwrap();
        assert_eq!(cli.hydration, Some(HydrationPolicy::RemoteFirst));
    }

    #[test]
    fn add_keeps_name_verbatim() {
        let cli = Cli::try_parse_from(["tl", "add", " Buy milk "]).unwrap();
        match cli.command {
            Commands::Add { name } => assert_eq!(name, " Buy milk "),
            _ => panic!("expected add"),
        }
    }
}

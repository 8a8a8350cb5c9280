use anyhow::Context;
use clap::Parser;
use tracing::warn;

use task_list::cache::{FileCache, LocalCache, MemoryCache};
use task_list::cli::Cli;
use task_list::cmd::*;
use task_list::config::{self, AppConfig};
use task_list::controller::TaskListController;
use task_list::logging;
use task_list::remote::HttpRemote;
use task_list::tui::run::run_tui;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Fold command-line flags over the loaded configuration.
fn apply_flags(cfg: &mut AppConfig, cli: &Cli) {
    if let Some(url) = &cli.base_url {
        cfg.remote.base_url = url.clone();
    }
    if let Some(dir) = &cli.cache_dir {
        cfg.cache.directory = Some(dir.clone());
    }
    if cli.no_cache {
        cfg.cache.enabled = false;
    }
    if let Some(policy) = cli.hydration {
        cfg.hydration = policy;
    }
}

fn build_cache(cfg: &AppConfig) -> Box<dyn LocalCache> {
    if cfg.cache.enabled {
        Box::new(FileCache::new(cfg.cache_dir()))
    } else {
        Box::new(MemoryCache::new())
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Completions need neither config nor network.
    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let mut cfg = config::load(cli.config.as_deref()).context("loading configuration")?;
    apply_flags(&mut cfg, &cli);

    let is_ui = matches!(cli.command, Commands::Ui);
    let _log_guard = if is_ui {
        let dir = cfg.log_dir();
        Some(
            logging::init_file(&cfg.logging.level, &dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?,
        )
    } else {
        logging::init_console(&cfg.logging.level);
        None
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    let remote = HttpRemote::new(&cfg.remote.base_url, cfg.remote.timeout_ms)
        .context("building HTTP client")?;

    if let Commands::Health = cli.command {
        return rt.block_on(cmd_health(&remote));
    }

    let mut controller = TaskListController::new(remote, build_cache(&cfg))
        .with_cache_key(cfg.cache.key.clone())
        .with_policy(cfg.hydration);

    if is_ui {
        return run_tui(rt.handle().clone(), controller).context("running terminal UI");
    }

    // Refresh does its own forced fetch.
    if !matches!(cli.command, Commands::Refresh) {
        if let Err(e) = rt.block_on(controller.hydrate()) {
            warn!(target: "tasklist", error = %e, "could not load tasks");
            eprintln!("Warning: could not load tasks: {e}");
        }
    }

    rt.block_on(async {
        match cli.command {
            Commands::Ui | Commands::Health | Commands::Completions { .. } => Ok(()),
            Commands::List { filter } => {
                cmd_list(&mut controller, filter);
                Ok(())
            }
            Commands::Add { name } => cmd_add(&mut controller, name).await,
            Commands::Toggle { id } => cmd_toggle(&mut controller, id).await,
            Commands::Rename { id, name } => cmd_rename(&mut controller, id, name).await,
            Commands::Delete { id, yes } => cmd_delete(&mut controller, id, yes).await,
            Commands::ClearCompleted { yes } => cmd_clear_completed(&mut controller, yes).await,
            Commands::ClearAll { yes } => cmd_clear_all(&mut controller, yes).await,
            Commands::Refresh => cmd_refresh(&mut controller).await,
            Commands::Counts { remote } => cmd_counts(&controller, remote).await,
        }
    })
}

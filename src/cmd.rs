//! Command implementations for the CLI interface.
//!
//! Each handler runs against an already hydrated controller, performs one
//! operation and prints the outcome. Destructive commands ask for a `y/N`
//! answer on stdin unless `--yes` was given.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::cache::LocalCache;
use crate::cli::Cli;
use crate::controller::{Confirmation, TaskListController};
use crate::fields::Filter;
use crate::list::{format_status, print_counts, print_table};
use crate::remote::{HttpRemote, RemoteStore};
use crate::task::TaskId;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI.
    Ui,

    /// List tasks.
    List {
        /// Which tasks to show: all | pending | completed.
        #[arg(long, value_enum, default_value_t = Filter::All)]
        filter: Filter,
    },

    /// Add a new task. The name is sent exactly as given.
    Add {
        name: String,
    },

    /// Toggle a task between pending and completed.
    Toggle {
        id: String,
    },

    /// Rename a task.
    Rename {
        id: String,
        name: String,
    },

    /// Delete a task.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Delete every completed task.
    ClearCompleted {
        #[arg(long, short)]
        yes: bool,
    },

    /// Delete every task.
    ClearAll {
        #[arg(long, short)]
        yes: bool,
    },

    /// Re-fetch the list from the remote store and overwrite the cache.
    Refresh,

    /// Show pending/completed/total counts.
    Counts {
        /// Ask the remote store instead of counting the local list.
        #[arg(long)]
        remote: bool,
    },

    /// Check that the remote store is reachable.
    Health,

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Ask `prompt` on `output` and read a y/N answer from `input`.
pub fn ask_confirmation<I: BufRead, O: Write>(prompt: &str, input: &mut I, output: &mut O) -> io::Result<bool> {
    write!(output, "{prompt} [y/N] ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

async fn confirm_and_run<R: RemoteStore, C: LocalCache>(
    c: &mut TaskListController<R, C>,
    confirmation: Confirmation,
    yes: bool,
) -> anyhow::Result<bool> {
    if !yes {
        let stdin = io::stdin();
        let accepted = ask_confirmation(&confirmation.prompt(), &mut stdin.lock(), &mut io::stdout())?;
        if !accepted {
            println!("Cancelled");
            return Ok(false);
        }
    }
    c.confirm(confirmation).await?;
    Ok(true)
}

/// List tasks under `filter`, followed by counts over the whole list.
pub fn cmd_list<R: RemoteStore, C: LocalCache>(c: &mut TaskListController<R, C>, filter: Filter) {
    c.set_filter(filter);
    let visible = c.visible_tasks();
    if visible.is_empty() {
        println!("No tasks");
    } else {
        print_table(&visible);
    }
    print_counts(c.counts());
}

pub async fn cmd_add<R: RemoteStore, C: LocalCache>(c: &mut TaskListController<R, C>, name: String) -> anyhow::Result<()> {
    c.set_draft_name(name);
    let task = c.create().await?;
    println!("Added task {}: {}", task.id, task.name);
    Ok(())
}

pub async fn cmd_toggle<R: RemoteStore, C: LocalCache>(c: &mut TaskListController<R, C>, id: String) -> anyhow::Result<()> {
    let id = TaskId::from(id.as_str());
    c.toggle(&id).await?;
    if let Some(task) = c.tasks().iter().find(|t| t.id == id) {
        println!("Task {} is now {}", task.id, format_status(task.status));
    }
    Ok(())
}

pub async fn cmd_rename<R: RemoteStore, C: LocalCache>(
    c: &mut TaskListController<R, C>,
    id: String,
    name: String,
) -> anyhow::Result<()> {
    let id = TaskId::from(id.as_str());
    c.rename(&id, &name).await?;
    println!("Renamed task {id}");
    Ok(())
}

pub async fn cmd_delete<R: RemoteStore, C: LocalCache>(
    c: &mut TaskListController<R, C>,
    id: String,
    yes: bool,
) -> anyhow::Result<()> {
    let id = TaskId::from(id.as_str());
    let confirmation = c.request_delete(&id)?;
    if confirm_and_run(c, confirmation, yes).await? {
        println!("Deleted task {id}");
    }
    Ok(())
}

pub async fn cmd_clear_completed<R: RemoteStore, C: LocalCache>(
    c: &mut TaskListController<R, C>,
    yes: bool,
) -> anyhow::Result<()> {
    let Some(confirmation) = c.request_clear_completed() else {
        println!("No completed tasks");
        return Ok(());
    };
    if confirm_and_run(c, confirmation, yes).await? {
        println!("Completed tasks cleared");
    }
    Ok(())
}

pub async fn cmd_clear_all<R: RemoteStore, C: LocalCache>(c: &mut TaskListController<R, C>, yes: bool) -> anyhow::Result<()> {
    let Some(confirmation) = c.request_clear_all() else {
        println!("No tasks");
        return Ok(());
    };
    if confirm_and_run(c, confirmation, yes).await? {
        println!("All tasks cleared");
    }
    Ok(())
}

pub async fn cmd_refresh<R: RemoteStore, C: LocalCache>(c: &mut TaskListController<R, C>) -> anyhow::Result<()> {
    c.refresh().await?;
    println!("Fetched {} task(s)", c.tasks().len());
    Ok(())
}

pub async fn cmd_counts<C: LocalCache>(c: &TaskListController<HttpRemote, C>, remote: bool) -> anyhow::Result<()> {
    let counts = if remote {
        c.remote().counts().await.context("fetching counts")?
    } else {
        c.counts()
    };
    print_counts(counts);
    Ok(())
}

pub async fn cmd_health(remote: &HttpRemote) -> anyhow::Result<()> {
    let health = remote
        .health()
        .await
        .with_context(|| format!("remote store at {} is unreachable", remote.base_url()))?;
    if health.status != "ok" {
        bail!("remote store reported status '{}'", health.status);
    }
    println!("{}: {}", remote.base_url(), health.status);
    Ok(())
}

pub fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "tl", &mut io::stdout());
}

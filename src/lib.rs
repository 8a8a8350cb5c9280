//! # tl - task list client
//!
//! A single flat list of tasks kept in a remote REST store, with a local
//! snapshot cache so the list shows up instantly on the next start.
//!
//! The core is [`controller::TaskListController`]: it owns the in-memory list,
//! talks to a [`remote::RemoteStore`], and mirrors every successful change into a
//! [`cache::LocalCache`]. The CLI (`cmd`) and the terminal UI (`tui`) are thin
//! layers on top of it.
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the interactive UI
//! tl ui
//!
//! # Add a task and list what is still open
//! tl add "Buy milk"
//! tl list --filter pending
//!
//! # Check the server
//! tl health --base-url http://localhost:5000/api
//! ```
//!
//! The snapshot lives in `~/.tasklist/cache/tasks.json` unless configured
//! otherwise in `~/.tasklist/config.toml`.

pub mod cache;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod controller;
pub mod error;
pub mod fields;
pub mod list;
pub mod logging;
pub mod remote;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
}

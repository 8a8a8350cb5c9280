//! Enumerations and field types for the task list.
//!
//! This module defines the small closed sets the rest of the crate switches on:
//! task status, the list filter selector and the startup hydration policy.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task completion status.
///
/// New tasks always start `Pending`; the remote store flips it in response to a
/// toggle call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Completed")]
    Completed,
}

impl Status {
    pub fn is_completed(self) -> bool {
        self == Status::Completed
    }
}

/// Which slice of the list is shown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    /// Whether a task with `status` is visible under this selector.
    pub fn matches(self, status: Status) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => status == Status::Pending,
            Filter::Completed => status == Status::Completed,
        }
    }

    /// Cycle all -> pending -> completed -> all.
    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Pending,
            Filter::Pending => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Pending => "Pending",
            Filter::Completed => "Completed",
        }
    }
}

/// Precedence between the local cache and the remote store at startup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum HydrationPolicy {
    /// A readable cache snapshot wins; the remote store is only asked on a cold start.
    #[default]
    CacheFirst,
    /// The remote store is authoritative; the cache is read only if the fetch fails.
    RemoteFirst,
}

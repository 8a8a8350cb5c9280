//! List transitions and utility functions for the task list.
//!
//! Every mutation of the in-memory list goes through one of the reducers below.
//! They take the previous list by value together with what the remote store
//! answered and return the next list, so they can be tested without a network
//! or a terminal. Formatting helpers for the command-line table live here too.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::fields::{Filter, Status};
use crate::task::{Task, TaskId};

/// Pending, completed and total counts over the full list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub pending: usize,
    pub completed: usize,
    pub total: usize,
}

/// Append a task returned by a create call.
///
/// If the store hands back an id that is already present the existing entry is
/// replaced in place, keeping one task per id.
pub fn append(mut tasks: Vec<Task>, task: Task) -> Vec<Task> {
    match tasks.iter_mut().find(|t| t.id == task.id) {
        Some(slot) => *slot = task,
        None => tasks.push(task),
    }
    tasks
}

/// Swap the entry with the same id for the store's version of it.
pub fn replace(mut tasks: Vec<Task>, task: Task) -> Vec<Task> {
    if let Some(slot) = tasks.iter_mut().find(|t| t.id == task.id) {
        *slot = task;
    }
    tasks
}

/// Drop the entry with `id`.
pub fn remove(mut tasks: Vec<Task>, id: &TaskId) -> Vec<Task> {
    tasks.retain(|t| &t.id != id);
    tasks
}

/// Drop every completed entry.
pub fn remove_completed(mut tasks: Vec<Task>) -> Vec<Task> {
    tasks.retain(|t| !t.is_completed());
    tasks
}

/// Get a task by id.
pub fn find<'a>(tasks: &'a [Task], id: &TaskId) -> Option<&'a Task> {
    tasks.iter().find(|t| &t.id == id)
}

/// Tasks visible under `filter`, in list order.
pub fn filtered(tasks: &[Task], filter: Filter) -> Vec<&Task> {
    tasks.iter().filter(|t| filter.matches(t.status)).collect()
}

pub fn counts(tasks: &[Task]) -> TaskCounts {
    let completed = tasks.iter().filter(|t| t.is_completed()).count();
    TaskCounts {
        pending: tasks.len() - completed,
        completed,
        total: tasks.len(),
    }
}

/// Format a task status for display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::Pending => "Pending",
        Status::Completed => "Completed",
    }
}

pub fn format_checkbox(s: Status) -> &'static str {
    match s {
        Status::Pending => "[ ]",
        Status::Completed => "[x]",
    }
}

/// Format a creation timestamp relative to `now` ("just now", "5m ago", "3d ago").
pub fn format_created_relative(created: Option<NaiveDateTime>, now: NaiveDateTime) -> String {
    let Some(created) = created else {
        return "-".into();
    };
    let delta = now - created;
    if delta.num_seconds() < 60 {
        "just now".into()
    } else if delta.num_minutes() < 60 {
        format!("{}m ago", delta.num_minutes())
    } else if delta.num_hours() < 24 {
        format!("{}h ago", delta.num_hours())
    } else {
        format!("{}d ago", delta.num_days())
    }
}

/// Truncate a string to a maximum display width, adding an ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let budget = width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Print tasks in a formatted table.
pub fn print_table(tasks: &[&Task]) {
    println!("{:<38} {:<4} {:<10} {}", "ID", "", "Created", "Name");
    let now = Local::now().naive_local();
    for t in tasks {
        println!(
            "{:<38} {:<4} {:<10} {}",
            truncate(t.id.as_str(), 38),
            format_checkbox(t.status),
            format_created_relative(t.created_at, now),
            t.name
        );
    }
}

pub fn print_counts(c: TaskCounts) {
    println!(
        "{} pending, {} completed, {} total",
        c.pending, c.completed, c.total
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn task(id: u64, status: Status) -> Task {
        Task {
            id: TaskId::from(id),
            name: format!("task {id}"),
            status,
            created_at: None,
        }
    }

    #[test]
    fn append_keeps_insertion_order() {
        let tasks = append(vec![task(1, Status::Pending)], task(2, Status::Pending));
        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[test]
    fn append_never_duplicates_an_id() {
        let mut dup = task(1, Status::Completed);
        dup.name = "again".into();
        let tasks = append(vec![task(1, Status::Pending), task(2, Status::Pending)], dup);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].name, "again");
    }

    #[test]
    fn replace_touches_only_matching_id() {
        let before = vec![task(1, Status::Pending), task(2, Status::Pending), task(3, Status::Completed)];
        let after = replace(before.clone(), task(2, Status::Completed));
        assert_eq!(after[0], before[0]);
        assert_eq!(after[2], before[2]);
        assert_eq!(after[1].status, Status::Completed);
    }

    #[test]
    fn replace_unknown_id_is_noop() {
        let before = vec![task(1, Status::Pending)];
        assert_eq!(replace(before.clone(), task(9, Status::Completed)), before);
    }

    #[test]
    fn remove_completed_keeps_pending_in_order() {
        let tasks = vec![
            task(1, Status::Completed),
            task(2, Status::Pending),
            task(3, Status::Completed),
            task(4, Status::Pending),
        ];
        let ids: Vec<_> = remove_completed(tasks).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![TaskId::from(2), TaskId::from(4)]);
    }

    #[test]
    fn filter_sizes_add_up() {
        let tasks = vec![
            task(1, Status::Pending),
            task(2, Status::Completed),
            task(3, Status::Pending),
            task(4, Status::Pending),
            task(5, Status::Completed),
        ];
        let pending = filtered(&tasks, Filter::Pending);
        let completed = filtered(&tasks, Filter::Completed);
        assert_eq!(pending.len(), 3);
        assert!(pending.iter().all(|t| t.status == Status::Pending));
        assert_eq!(completed.len(), 2);
        assert!(completed.iter().all(|t| t.status == Status::Completed));
        assert_eq!(filtered(&tasks, Filter::All).len(), 5);

        let c = counts(&tasks);
        assert_eq!(c, TaskCounts { pending: 3, completed: 2, total: 5 });
    }

    #[test]
    fn relative_created_formatting() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(format_created_relative(None, now), "-");
        assert_eq!(format_created_relative(Some(now - Duration::seconds(5)), now), "just now");
        assert_eq!(format_created_relative(Some(now - Duration::minutes(7)), now), "7m ago");
        assert_eq!(format_created_relative(Some(now - Duration::hours(3)), now), "3h ago");
        assert_eq!(format_created_relative(Some(now - Duration::days(2)), now), "2d ago");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn truncate_measures_display_width() {
        assert_eq!(truncate("anything", 0), "");
        assert_eq!(truncate("日本語", 6), "日本語");
        assert_eq!(truncate("日本語", 5), "日本…");
        assert_eq!(truncate("日本語", 4), "日…");
    }
}

//! Task data structure.
//!
//! A `Task` is the only entity the list deals with. Every field is assigned by
//! the remote store; the client never mints ids or flips status on its own.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque task identifier assigned by the remote store.
///
/// The wire may carry either a string (UUID) or a number. Both are kept as
/// text so that equality and URL building behave the same either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        TaskId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        TaskId(n.to_string())
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => TaskId(s),
            RawId::Unsigned(n) => TaskId(n.to_string()),
            RawId::Signed(n) => TaskId(n.to_string()),
        })
    }
}

/// A single entry in the task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub status: crate::fields::Status,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<NaiveDateTime>,
}

/// Parse a display-only timestamp: RFC 3339 (shifted to local time) or naive
/// ISO-8601. Anything else, including non-string values, becomes `None`.
fn lenient_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<RawTimestamp>::deserialize(deserializer)? {
        Some(RawTimestamp::Text(s)) => parse_timestamp(&s),
        Some(RawTimestamp::Other(_)) | None => None,
    })
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Status;

    #[test]
    fn numeric_and_string_ids_both_parse() {
        let a: Task = serde_json::from_str(r#"{"id":1,"name":"a","status":"pending"}"#).unwrap();
        let b: Task = serde_json::from_str(r#"{"id":"1","name":"a","status":"pending"}"#).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.as_str(), "1");
    }

    #[test]
    fn parses_server_timestamp() {
        let t: Task = serde_json::from_str(
            r#"{"id":"9b2c","name":"Buy milk","status":"completed","created_at":"2024-05-01T09:30:12.123456"}"#,
        )
        .unwrap();
        assert_eq!(t.status, Status::Completed);
        assert!(t.created_at.is_some());
        assert!(t.is_completed());
    }

    #[test]
    fn zoned_timestamp_does_not_break_the_list() {
        let tasks: Vec<Task> = serde_json::from_str(
            r#"[{"id":"1","name":"a","status":"pending","created_at":"2024-05-01T09:30:12Z"},
                {"id":"2","name":"b","status":"pending","created_at":"2024-05-01 09:30:12"}]"#,
        )
        .unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.created_at.is_some()));
    }

    #[test]
    fn unparseable_timestamp_becomes_none() {
        let tasks: Vec<Task> = serde_json::from_str(
            r#"[{"id":"1","name":"a","status":"pending","created_at":"yesterday"},
                {"id":"2","name":"b","status":"pending","created_at":1714555812},
                {"id":"3","name":"c","status":"pending","created_at":null}]"#,
        )
        .unwrap();
        assert!(tasks.iter().all(|t| t.created_at.is_none()));
    }

    #[test]
    fn timestamp_survives_snapshot_round_trip() {
        let raw = r#"{"id":"1","name":"a","status":"pending","created_at":"2024-05-01T09:30:12.123456"}"#;
        let t: Task = serde_json::from_str(raw).unwrap();
        let again: Task = serde_json::from_str(&serde_json::to_string(&t).unwrap()).unwrap();
        assert_eq!(again.created_at, t.created_at);
    }

    #[test]
    fn missing_status_is_rejected() {
        let err = serde_json::from_str::<Task>(r#"{"id":"1","name":"a"}"#).unwrap_err();
        assert!(err.to_string().contains("status"));
    }

    #[test]
    fn missing_timestamp_is_not_serialized() {
        let t = Task {
            id: TaskId::from("x"),
            name: "n".into(),
            status: Status::Pending,
            created_at: None,
        };
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"{"id":"x","name":"n","status":"pending"}"#);
    }
}

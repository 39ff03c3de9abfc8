// Data models for Taskboard

use serde::{Deserialize, Serialize};

/// A single tracked task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned by the repository at insertion and
    /// never changed afterwards
    pub id: String,
    pub description: String,
    pub is_completed: bool,
    /// Creation time in milliseconds since the Unix epoch, assigned at
    /// insertion and immutable
    pub created_at: i64,
}

/// Field a task listing is ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Lexical order of descriptions
    Name,
    /// Creation time
    #[default]
    Date,
    /// Open tasks before completed ones (when ascending)
    Status,
}

impl SortKey {
    /// Parse a sort key name. Unrecognized names fall back to `Date`.
    pub fn parse(name: &str) -> Self {
        match name {
            "name" => SortKey::Name,
            "status" => SortKey::Status,
            _ => SortKey::Date,
        }
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time before Unix epoch")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        assert!(ts > 0);
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_sort_key_parse_falls_back_to_date() {
        assert_eq!(SortKey::parse("name"), SortKey::Name);
        assert_eq!(SortKey::parse("status"), SortKey::Status);
        assert_eq!(SortKey::parse("date"), SortKey::Date);
        assert_eq!(SortKey::parse("priority"), SortKey::Date);
        assert_eq!(SortKey::parse(""), SortKey::Date);
    }

    #[test]
    fn test_sort_key_serialization() {
        let json = serde_json::to_string(&SortKey::Name).unwrap();
        assert_eq!(json, "\"name\"");

        let key: SortKey = serde_json::from_str("\"status\"").unwrap();
        assert_eq!(key, SortKey::Status);
    }

    #[test]
    fn test_task_serialization_round_trip() {
        let task = Task {
            id: "0192f3a1-test".to_string(),
            description: "Write report".to_string(),
            is_completed: false,
            created_at: 1000,
        };

        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }
}

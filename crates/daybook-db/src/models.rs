//! Database row types, mapping directly to SQLite rows. Distinct from the
//! daybook-types models so the storage layer stays independent of the API
//! surface.

use chrono::{DateTime, Utc};
use tracing::warn;

use daybook_types::models::{ChatMessage, Idea, Priority, Role, Task, User};

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

impl UserRow {
    pub fn into_model(self) -> User {
        User {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: parse_created_at(&self.created_at, "user", self.id),
        }
    }
}

pub struct TaskRow {
    pub id: i64,
    pub owner_id: i64,
    pub text: String,
    pub priority: String,
    pub completed: bool,
    pub created_at: String,
    pub time_label: String,
}

impl TaskRow {
    pub fn into_model(self) -> Task {
        Task {
            id: self.id,
            owner_id: self.owner_id,
            text: self.text,
            priority: Priority::parse(&self.priority).unwrap_or_else(|| {
                warn!("Corrupt priority '{}' on task {}", self.priority, self.id);
                Priority::Medium
            }),
            completed: self.completed,
            created_at: parse_created_at(&self.created_at, "task", self.id),
            time_label: self.time_label,
        }
    }
}

pub struct IdeaRow {
    pub id: i64,
    pub owner_id: i64,
    pub text: String,
    pub category: String,
    pub created_at: String,
    pub time_label: String,
}

impl IdeaRow {
    pub fn into_model(self) -> Idea {
        Idea {
            id: self.id,
            owner_id: self.owner_id,
            text: self.text,
            category: self.category,
            created_at: parse_created_at(&self.created_at, "idea", self.id),
            time_label: self.time_label,
        }
    }
}

pub struct MessageRow {
    pub id: i64,
    pub owner_id: i64,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

impl MessageRow {
    pub fn into_model(self) -> ChatMessage {
        ChatMessage {
            id: self.id,
            owner_id: self.owner_id,
            role: Role::parse(&self.role).unwrap_or_else(|| {
                warn!("Corrupt role '{}' on message {}", self.role, self.id);
                Role::User
            }),
            content: self.content,
            created_at: parse_created_at(&self.created_at, "message", self.id),
        }
    }
}

/// SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
/// Parse as naive UTC, accepting RFC 3339 as well.
fn parse_created_at(raw: &str, kind: &str, id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on {} {}: {}", raw, kind, id, e);
            DateTime::default()
        })
}

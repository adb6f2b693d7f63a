//! Database row types. These map directly to SQLite rows and are kept
//! apart from the jotter-types wire models so the DB layer stays
//! independent of the API shape.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use jotter_types::models::{Note, User};

pub struct UserRow {
    pub id: String,
    pub full_name: String,
    pub email: String,
    /// Stored exactly as submitted.
    pub password: String,
    pub created_at: String,
}

pub struct NoteRow {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub created_at: String,
    pub updated_on: String,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            id: parse_id(&self.id, "user id", &self.id),
            created_at: parse_timestamp(&self.created_at, "created_at", &self.id),
            full_name: self.full_name,
            email: self.email,
            password: Some(self.password),
        }
    }
}

impl NoteRow {
    pub fn into_note(self) -> Note {
        Note {
            id: parse_id(&self.id, "note id", &self.id),
            user_id: parse_id(&self.user_id, "user_id", &self.id),
            created_at: parse_timestamp(&self.created_at, "created_at", &self.id),
            updated_on: parse_timestamp(&self.updated_on, "updated_on", &self.id),
            title: self.title,
            content: self.content,
            tags: self.tags,
            is_pinned: self.is_pinned,
        }
    }

    /// Case-insensitive substring match against title, content and tags.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.content.to_lowercase().contains(needle)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
    }
}

fn parse_id(raw: &str, field: &str, row_id: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}' on row '{}': {}", field, raw, row_id, e);
        Uuid::default()
    })
}

fn parse_timestamp(raw: &str, field: &str, row_id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // Rows written by hand through the sqlite shell use
            // "YYYY-MM-DD HH:MM:SS" without a timezone. Treat as UTC.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt {} '{}' on row '{}': {}", field, raw, row_id, e);
            DateTime::default()
        })
}

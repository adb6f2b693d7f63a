use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Note, User};

// -- JWT Claims --

/// Payload of an access token. Shared by the issuing side (account
/// handlers) and the verifying side (auth middleware).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub user: User,
    pub iat: usize,
    pub exp: usize,
}

// -- Accounts --
//
// Request fields are optional so a missing field reaches the handler and is
// reported as such, instead of failing JSON extraction.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub error: bool,
    pub message: String,
    pub user: User,
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub error: bool,
    pub message: String,
    pub user: User,
}

// -- Notes --

#[derive(Debug, Default, Deserialize)]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_pinned: Option<serde_json::Value>,
}

/// Kept as a raw JSON value so a non-boolean can be reported as invalid
/// input rather than a malformed body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinStatusRequest {
    pub is_pinned: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NoteResponse {
    pub error: bool,
    pub message: String,
    pub note: Note,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotesResponse {
    pub error: bool,
    pub message: String,
    pub notes: Vec<Note>,
}

/// Envelope for responses that carry nothing but the outcome.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub error: bool,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            error: false,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
        }
    }
}

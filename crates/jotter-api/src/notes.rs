use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use jotter_db::models::NoteRow;
use jotter_types::api::{
    Claims, CreateNoteRequest, EditNoteRequest, NoteResponse, NotesResponse, PinStatusRequest,
    SearchQuery, StatusResponse,
};

use crate::error::ApiError;
use crate::non_empty;
use crate::state::{AppState, blocking};

const NOTE_NOT_FOUND: &str = "Note not found.";

pub async fn add_note(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<CreateNoteRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(title), Some(content)) = (non_empty(req.title), non_empty(req.content)) else {
        return Err(ApiError::MissingField("Title and content are required."));
    };

    let now = Utc::now().to_rfc3339();
    let row = NoteRow {
        id: Uuid::new_v4().to_string(),
        user_id: claims.sub.to_string(),
        title,
        content,
        tags: req.tags.unwrap_or_default(),
        is_pinned: false,
        created_at: now.clone(),
        updated_on: now,
    };

    let db = state.clone();
    let row = blocking(move || {
        db.db.insert_note(&row)?;
        Ok(row)
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(NoteResponse {
            error: false,
            message: "Note created successfully.".to_string(),
            note: row.into_note(),
        }),
    ))
}

pub async fn edit_note(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<EditNoteRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let edit = NoteEdit::from_request(req)?;

    let db = state.clone();
    let owner = claims.sub.to_string();
    let note = blocking(move || {
        let Some(mut note) = db.db.get_note(&note_id, &owner)? else {
            return Ok(None);
        };
        edit.apply(&mut note, Utc::now().to_rfc3339());
        // Deleted between the read and the write.
        if !db.db.save_note(&note)? {
            return Ok(None);
        }
        Ok(Some(note))
    })
    .await?
    .ok_or(ApiError::NotFound(NOTE_NOT_FOUND))?;

    Ok(Json(NoteResponse {
        error: false,
        message: "Note updated successfully.".to_string(),
        note: note.into_note(),
    }))
}

pub async fn get_all_notes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let owner = claims.sub.to_string();
    let rows = blocking(move || db.db.list_notes(&owner)).await?;

    // An empty list is reported as 404, unlike search.
    if rows.is_empty() {
        return Err(ApiError::NotFound("No notes found."));
    }

    Ok(Json(NotesResponse {
        error: false,
        message: "Notes fetched successfully.".to_string(),
        notes: rows.into_iter().map(NoteRow::into_note).collect(),
    }))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let owner = claims.sub.to_string();
    let deleted = blocking(move || db.db.delete_note(&note_id, &owner)).await?;

    if !deleted {
        return Err(ApiError::NotFound(NOTE_NOT_FOUND));
    }

    Ok(Json(StatusResponse::ok("Note deleted successfully.")))
}

pub async fn get_pinned_notes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let owner = claims.sub.to_string();
    let rows = blocking(move || db.db.list_pinned_notes(&owner)).await?;

    if rows.is_empty() {
        return Err(ApiError::NotFound("No pinned notes found."));
    }

    Ok(Json(NotesResponse {
        error: false,
        message: "Pinned notes fetched successfully.".to_string(),
        notes: rows.into_iter().map(NoteRow::into_note).collect(),
    }))
}

pub async fn update_pin_status(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<PinStatusRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let pinned = req
        .is_pinned
        .as_ref()
        .and_then(Value::as_bool)
        .ok_or(ApiError::InvalidInput(
            "Invalid value for isPinned. It must be a boolean.",
        ))?;

    let db = state.clone();
    let owner = claims.sub.to_string();
    let note = blocking(move || {
        db.db
            .set_note_pinned(&note_id, &owner, pinned, &Utc::now().to_rfc3339())
    })
    .await?
    .ok_or(ApiError::NotFound(NOTE_NOT_FOUND))?;

    let message = if pinned {
        "Note pinned successfully."
    } else {
        "Note unpinned successfully."
    };

    Ok(Json(NoteResponse {
        error: false,
        message: message.to_string(),
        note: note.into_note(),
    }))
}

pub async fn search_notes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Query(params), _): WithRejection<Query<SearchQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let query = non_empty(params.query).ok_or(ApiError::MissingQuery)?;

    let db = state.clone();
    let owner = claims.sub.to_string();
    let rows = blocking(move || db.db.search_notes(&owner, &query)).await?;

    Ok(Json(NotesResponse {
        error: false,
        message: "Notes retrieved successfully.".to_string(),
        notes: rows.into_iter().map(NoteRow::into_note).collect(),
    }))
}

/// The part of an edit request that actually changes something.
#[derive(Debug)]
struct NoteEdit {
    title: Option<String>,
    content: Option<String>,
    tags: Option<Vec<String>>,
    pin: bool,
}

impl NoteEdit {
    /// Empty strings count as absent. A present `tags` array counts as a
    /// change even when empty; `isPinned` on its own does not.
    fn from_request(req: EditNoteRequest) -> Result<Self, ApiError> {
        let edit = NoteEdit {
            title: non_empty(req.title),
            content: non_empty(req.content),
            tags: req.tags,
            pin: req.is_pinned.as_ref().is_some_and(is_truthy),
        };

        if edit.title.is_none() && edit.content.is_none() && edit.tags.is_none() {
            return Err(ApiError::NoChanges);
        }
        Ok(edit)
    }

    fn apply(self, note: &mut NoteRow, now: String) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(content) = self.content {
            note.content = content;
        }
        if let Some(tags) = self.tags {
            note.tags = tags;
        }
        // `isPinned: false` leaves an existing pin alone; unpinning goes
        // through update-pin-status.
        if self.pin {
            note.is_pinned = true;
        }
        note.updated_on = now;
    }
}

/// JavaScript truthiness, which is how clients have always sent the flag.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note() -> NoteRow {
        NoteRow {
            id: "n1".to_string(),
            user_id: "u1".to_string(),
            title: "Old title".to_string(),
            content: "Old content".to_string(),
            tags: vec!["keep".to_string()],
            is_pinned: true,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
            updated_on: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    fn request(json: &str) -> EditNoteRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn pin_alone_is_not_a_change() {
        let result = NoteEdit::from_request(request(r#"{"isPinned": true}"#));
        assert!(matches!(result, Err(ApiError::NoChanges)));

        let result = NoteEdit::from_request(request(r#"{"title": "", "content": ""}"#));
        assert!(matches!(result, Err(ApiError::NoChanges)));
    }

    #[test]
    fn empty_tags_clear_the_list() {
        let edit = NoteEdit::from_request(request(r#"{"tags": []}"#)).unwrap();
        let mut note = note();
        edit.apply(&mut note, "later".to_string());

        assert!(note.tags.is_empty());
        assert_eq!(note.title, "Old title");
        assert_eq!(note.updated_on, "later");
    }

    #[test]
    fn only_present_fields_are_written() {
        let edit = NoteEdit::from_request(request(
            r#"{"title": "New title", "content": "", "isPinned": false}"#,
        ))
        .unwrap();
        let mut note = note();
        edit.apply(&mut note, "later".to_string());

        assert_eq!(note.title, "New title");
        assert_eq!(note.content, "Old content");
        assert_eq!(note.tags, vec!["keep"]);
        // false does not unpin
        assert!(note.is_pinned);
    }

    #[test]
    fn pin_true_is_applied_alongside_other_changes() {
        let edit = NoteEdit::from_request(request(r#"{"content": "c", "isPinned": true}"#)).unwrap();
        let mut note = note();
        note.is_pinned = false;
        edit.apply(&mut note, "later".to_string());

        assert!(note.is_pinned);
        assert_eq!(note.content, "c");
    }

    #[test]
    fn pin_flag_follows_truthiness() {
        for (flag, pinned) in [
            (r#""yes""#, true),
            ("1", true),
            ("[]", true),
            ("0", false),
            (r#""""#, false),
            ("null", false),
        ] {
            let edit =
                NoteEdit::from_request(request(&format!(r#"{{"title": "t", "isPinned": {flag}}}"#)))
                    .unwrap();
            assert_eq!(edit.pin, pinned, "isPinned: {flag}");
        }
    }
}

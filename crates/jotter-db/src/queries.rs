use crate::models::{NoteRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, Row, types::Type};

const NOTE_COLUMNS: &str =
    "id, user_id, title, content, tags, is_pinned, created_at, updated_on";

impl Database {
    // -- Users --

    /// Insert a new account. Returns `false` when the email is already
    /// registered; the check and the insert are a single statement.
    pub fn create_user(&self, user: &UserRow) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (id, full_name, email, password, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(email) DO NOTHING",
                (
                    &user.id,
                    &user.full_name,
                    &user.email,
                    &user.password,
                    &user.created_at,
                ),
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Notes --
    //
    // Every lookup below takes the owner's id and filters on it alongside
    // the note id. A note id alone never reaches a row.

    pub fn insert_note(&self, note: &NoteRow) -> Result<()> {
        let tags = serde_json::to_string(&note.tags)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notes (id, user_id, title, content, tags, is_pinned, created_at, updated_on)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    note.id,
                    note.user_id,
                    note.title,
                    note.content,
                    tags,
                    note.is_pinned,
                    note.created_at,
                    note.updated_on,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_note(&self, id: &str, user_id: &str) -> Result<Option<NoteRow>> {
        self.with_conn(|conn| query_note(conn, id, user_id))
    }

    /// Write back the mutable fields of a note. Returns `false` if the note
    /// is gone or owned by someone else.
    pub fn save_note(&self, note: &NoteRow) -> Result<bool> {
        let tags = serde_json::to_string(&note.tags)?;
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE notes
                 SET title = ?1, content = ?2, tags = ?3, is_pinned = ?4, updated_on = ?5
                 WHERE id = ?6 AND user_id = ?7",
                rusqlite::params![
                    note.title,
                    note.content,
                    tags,
                    note.is_pinned,
                    note.updated_on,
                    note.id,
                    note.user_id,
                ],
            )?;
            Ok(updated == 1)
        })
    }

    /// Overwrite the pin flag and return the updated note, or `None` if no
    /// such note belongs to `user_id`.
    pub fn set_note_pinned(
        &self,
        id: &str,
        user_id: &str,
        pinned: bool,
        updated_on: &str,
    ) -> Result<Option<NoteRow>> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE notes SET is_pinned = ?1, updated_on = ?2 WHERE id = ?3 AND user_id = ?4",
                rusqlite::params![pinned, updated_on, id, user_id],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            query_note(conn, id, user_id)
        })
    }

    pub fn delete_note(&self, id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM notes WHERE id = ?1 AND user_id = ?2",
                [id, user_id],
            )?;
            Ok(deleted == 1)
        })
    }

    pub fn list_notes(&self, user_id: &str) -> Result<Vec<NoteRow>> {
        self.with_conn(|conn| query_notes(conn, user_id, false))
    }

    pub fn list_pinned_notes(&self, user_id: &str) -> Result<Vec<NoteRow>> {
        self.with_conn(|conn| query_notes(conn, user_id, true))
    }

    /// Notes of `user_id` whose title, content or any tag contains `query`,
    /// ignoring case. Matching happens here rather than in SQL because
    /// SQLite's `lower()` only folds ASCII.
    pub fn search_notes(&self, user_id: &str, query: &str) -> Result<Vec<NoteRow>> {
        let needle = query.to_lowercase();
        let notes = self.list_notes(user_id)?;
        Ok(notes.into_iter().filter(|note| note.matches(&needle)).collect())
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // `column` is one of two literals chosen by this module, never user input.
    let sql = format!(
        "SELECT id, full_name, email, password, created_at FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                full_name: row.get(1)?,
                email: row.get(2)?,
                password: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_note(conn: &Connection, id: &str, user_id: &str) -> Result<Option<NoteRow>> {
    let sql = format!(
        "SELECT {} FROM notes WHERE id = ?1 AND user_id = ?2",
        NOTE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt.query_row([id, user_id], note_from_row).optional()?;
    Ok(row)
}

fn query_notes(conn: &Connection, user_id: &str, pinned_only: bool) -> Result<Vec<NoteRow>> {
    let sql = if pinned_only {
        format!(
            "SELECT {} FROM notes WHERE user_id = ?1 AND is_pinned = 1 ORDER BY rowid",
            NOTE_COLUMNS
        )
    } else {
        format!(
            "SELECT {} FROM notes WHERE user_id = ?1 ORDER BY rowid",
            NOTE_COLUMNS
        )
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([user_id], note_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<NoteRow> {
    let raw_tags: String = row.get(4)?;
    let tags = serde_json::from_str(&raw_tags)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(NoteRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        tags,
        is_pinned: row.get(5)?,
        created_at: row.get(6)?,
        updated_on: row.get(7)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: &str = "2026-01-05T10:00:00+00:00";

    fn user(id: &str, email: &str) -> UserRow {
        UserRow {
            id: id.to_string(),
            full_name: "Test User".to_string(),
            email: email.to_string(),
            password: "p".to_string(),
            created_at: NOW.to_string(),
        }
    }

    fn note(id: &str, user_id: &str, title: &str, tags: &[&str]) -> NoteRow {
        NoteRow {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            content: "body".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_pinned: false,
            created_at: NOW.to_string(),
            updated_on: NOW.to_string(),
        }
    }

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        assert!(db.create_user(&user("u1", "a@x.com")).unwrap());
        assert!(db.create_user(&user("u2", "b@x.com")).unwrap());
        db
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = seeded();
        assert!(!db.create_user(&user("u3", "a@x.com")).unwrap());
        // Exact match only: a different case is a different email.
        assert!(db.create_user(&user("u4", "A@x.com")).unwrap());

        let found = db.get_user_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(found.id, "u1");
        assert!(db.get_user_by_id("u3").unwrap().is_none());
    }

    #[test]
    fn note_owner_need_not_be_a_stored_user() {
        let db = seeded();
        db.insert_note(&note("n1", "gone", "Orphan", &[])).unwrap();
        assert_eq!(db.list_notes("gone").unwrap().len(), 1);
    }

    #[test]
    fn notes_are_scoped_to_their_owner() {
        let db = seeded();
        db.insert_note(&note("n1", "u1", "Groceries", &[])).unwrap();

        assert!(db.get_note("n1", "u1").unwrap().is_some());
        assert!(db.get_note("n1", "u2").unwrap().is_none());
        assert!(db.list_notes("u2").unwrap().is_empty());
        assert!(db.set_note_pinned("n1", "u2", true, NOW).unwrap().is_none());
        assert!(!db.delete_note("n1", "u2").unwrap());

        let mut stolen = note("n1", "u2", "Hijacked", &[]);
        stolen.is_pinned = true;
        assert!(!db.save_note(&stolen).unwrap());

        let kept = db.get_note("n1", "u1").unwrap().unwrap();
        assert_eq!(kept.title, "Groceries");
        assert!(!kept.is_pinned);
    }

    #[test]
    fn save_and_pin_round_trip() {
        let db = seeded();
        db.insert_note(&note("n1", "u1", "Draft", &["work"])).unwrap();

        let mut edited = db.get_note("n1", "u1").unwrap().unwrap();
        edited.title = "Final".to_string();
        edited.tags = vec!["work".to_string(), "done".to_string()];
        assert!(db.save_note(&edited).unwrap());

        let stored = db.get_note("n1", "u1").unwrap().unwrap();
        assert_eq!(stored.title, "Final");
        assert_eq!(stored.tags, vec!["work", "done"]);

        let pinned = db.set_note_pinned("n1", "u1", true, NOW).unwrap().unwrap();
        assert!(pinned.is_pinned);
        assert_eq!(db.list_pinned_notes("u1").unwrap().len(), 1);

        db.set_note_pinned("n1", "u1", false, NOW).unwrap().unwrap();
        assert!(db.list_pinned_notes("u1").unwrap().is_empty());
    }

    #[test]
    fn delete_reports_missing_rows() {
        let db = seeded();
        db.insert_note(&note("n1", "u1", "Old", &[])).unwrap();

        assert!(db.delete_note("n1", "u1").unwrap());
        assert!(!db.delete_note("n1", "u1").unwrap());
        assert!(!db.delete_note("never-existed", "u1").unwrap());
    }

    #[test]
    fn search_ignores_case_and_looks_at_tags() {
        let db = seeded();
        db.insert_note(&note("n1", "u1", "Meeting Notes", &[])).unwrap();
        db.insert_note(&note("n2", "u1", "Recipes", &["Dinner"])).unwrap();
        db.insert_note(&note("n3", "u1", "Ideas", &[])).unwrap();
        db.insert_note(&note("n4", "u2", "meeting with u1", &[])).unwrap();

        let hits = db.search_notes("u1", "MEETING").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "n1");

        let hits = db.search_notes("u1", "dinn").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "n2");

        // Regex metacharacters are literal.
        assert!(db.search_notes("u1", ".*").unwrap().is_empty());
    }

    #[test]
    fn list_keeps_insertion_order() {
        let db = seeded();
        for id in ["n1", "n2", "n3"] {
            db.insert_note(&note(id, "u1", id, &[])).unwrap();
        }

        let ids: Vec<String> = db.list_notes("u1").unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["n1", "n2", "n3"]);
    }

    #[test]
    fn rows_convert_to_wire_models() {
        let id = uuid::Uuid::new_v4();
        let owner = uuid::Uuid::new_v4();
        let mut row = note(&id.to_string(), &owner.to_string(), "T", &["a"]);
        row.is_pinned = true;

        let converted = row.into_note();
        assert_eq!(converted.id, id);
        assert_eq!(converted.user_id, owner);
        assert!(converted.is_pinned);
        assert_eq!(converted.created_at.to_rfc3339(), NOW);
    }
}

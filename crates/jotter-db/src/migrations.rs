use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            full_name   TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS notes (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            title       TEXT NOT NULL,
            content     TEXT NOT NULL,
            tags        TEXT NOT NULL DEFAULT '[]',
            is_pinned   INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL,
            updated_on  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_notes_user
            ON notes(user_id, is_pinned);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

use rusqlite::Connection;
use tracing::info;

use crate::StoreResult;

pub fn run(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY,
            username      TEXT NOT NULL UNIQUE,
            email         TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id          INTEGER PRIMARY KEY,
            owner_id    INTEGER NOT NULL REFERENCES users(id),
            text        TEXT NOT NULL,
            priority    TEXT NOT NULL DEFAULT 'medium',
            completed   INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            time_label  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_owner
            ON tasks(owner_id, id);

        CREATE TABLE IF NOT EXISTS ideas (
            id          INTEGER PRIMARY KEY,
            owner_id    INTEGER NOT NULL REFERENCES users(id),
            text        TEXT NOT NULL,
            category    TEXT NOT NULL DEFAULT 'General',
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            time_label  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_ideas_owner
            ON ideas(owner_id, id);

        CREATE TABLE IF NOT EXISTS messages (
            id          INTEGER PRIMARY KEY,
            owner_id    INTEGER NOT NULL REFERENCES users(id),
            role        TEXT NOT NULL,
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_owner
            ON messages(owner_id, id);
        ",
    )?;

    info!("Database schema ready");
    Ok(())
}

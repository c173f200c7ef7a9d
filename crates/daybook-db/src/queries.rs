use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::models::{IdeaRow, MessageRow, TaskRow, UserRow};
use crate::{Database, StoreError, StoreResult};

impl Database {
    // -- Users --

    /// Insert a new user. Uniqueness of username and email is enforced by the
    /// single INSERT: a constraint failure maps to `Conflict`, so there is no
    /// check-then-insert window.
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> StoreResult<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
                (username, email, password_hash),
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    StoreError::Conflict
                } else {
                    e.into()
                }
            })?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Tasks --

    pub fn insert_task(
        &self,
        owner_id: i64,
        text: &str,
        priority: &str,
        time_label: &str,
    ) -> StoreResult<TaskRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (owner_id, text, priority, time_label) VALUES (?1, ?2, ?3, ?4)",
                params![owner_id, text, priority, time_label],
            )?;
            query_task(conn, conn.last_insert_rowid())
        })
    }

    /// All tasks for an owner, newest-created first.
    pub fn list_tasks(&self, owner_id: i64) -> StoreResult<Vec<TaskRow>> {
        self.with_conn(|conn| query_tasks(conn, owner_id))
    }

    /// Returns false when no row matched; a stale id is a no-op, not an error.
    pub fn set_task_completed(
        &self,
        owner_id: i64,
        task_id: i64,
        completed: bool,
    ) -> StoreResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tasks SET completed = ?3 WHERE owner_id = ?1 AND id = ?2",
                params![owner_id, task_id, completed],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_task(&self, owner_id: i64, task_id: i64) -> StoreResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM tasks WHERE owner_id = ?1 AND id = ?2",
                (owner_id, task_id),
            )?;
            Ok(changed > 0)
        })
    }

    // -- Ideas --

    pub fn insert_idea(
        &self,
        owner_id: i64,
        text: &str,
        category: &str,
        time_label: &str,
    ) -> StoreResult<IdeaRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO ideas (owner_id, text, category, time_label) VALUES (?1, ?2, ?3, ?4)",
                params![owner_id, text, category, time_label],
            )?;
            query_idea(conn, conn.last_insert_rowid())
        })
    }

    /// All ideas for an owner, newest-created first.
    pub fn list_ideas(&self, owner_id: i64) -> StoreResult<Vec<IdeaRow>> {
        self.with_conn(|conn| query_ideas(conn, owner_id))
    }

    pub fn delete_idea(&self, owner_id: i64, idea_id: i64) -> StoreResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM ideas WHERE owner_id = ?1 AND id = ?2",
                (owner_id, idea_id),
            )?;
            Ok(changed > 0)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, owner_id: i64, role: &str, content: &str) -> StoreResult<MessageRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (owner_id, role, content) VALUES (?1, ?2, ?3)",
                params![owner_id, role, content],
            )?;
            query_message(conn, conn.last_insert_rowid())
        })
    }

    /// Messages for an owner, newest-created first, optionally capped.
    /// Callers wanting conversation order reverse the result.
    pub fn list_messages(&self, owner_id: i64, limit: Option<u32>) -> StoreResult<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, owner_id, limit))
    }

    /// Internal compensation hook for a failed assistant exchange; the API
    /// surface never deletes messages.
    pub fn delete_message(&self, owner_id: i64, message_id: i64) -> StoreResult<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM messages WHERE owner_id = ?1 AND id = ?2",
                (owner_id, message_id),
            )?;
            Ok(changed > 0)
        })
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn query_user_by_username(conn: &Connection, username: &str) -> StoreResult<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?1",
    )?;

    let row = stmt.query_row([username], user_row).optional()?;
    Ok(row)
}

fn query_task(conn: &Connection, task_id: i64) -> StoreResult<TaskRow> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, text, priority, completed, created_at, time_label
         FROM tasks WHERE id = ?1",
    )?;
    Ok(stmt.query_row([task_id], task_row)?)
}

fn query_tasks(conn: &Connection, owner_id: i64) -> StoreResult<Vec<TaskRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, text, priority, completed, created_at, time_label
         FROM tasks
         WHERE owner_id = ?1
         ORDER BY id DESC",
    )?;

    let rows = stmt
        .query_map([owner_id], task_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_idea(conn: &Connection, idea_id: i64) -> StoreResult<IdeaRow> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, text, category, created_at, time_label
         FROM ideas WHERE id = ?1",
    )?;
    Ok(stmt.query_row([idea_id], idea_row)?)
}

fn query_ideas(conn: &Connection, owner_id: i64) -> StoreResult<Vec<IdeaRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, text, category, created_at, time_label
         FROM ideas
         WHERE owner_id = ?1
         ORDER BY id DESC",
    )?;

    let rows = stmt
        .query_map([owner_id], idea_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_message(conn: &Connection, message_id: i64) -> StoreResult<MessageRow> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, role, content, created_at FROM messages WHERE id = ?1",
    )?;
    Ok(stmt.query_row([message_id], message_row)?)
}

fn query_messages(conn: &Connection, owner_id: i64, limit: Option<u32>) -> StoreResult<Vec<MessageRow>> {
    // SQLite treats a negative LIMIT as unlimited.
    let limit = limit.map_or(-1, i64::from);

    let mut stmt = conn.prepare(
        "SELECT id, owner_id, role, content, created_at
         FROM messages
         WHERE owner_id = ?1
         ORDER BY id DESC
         LIMIT ?2",
    )?;

    let rows = stmt
        .query_map(params![owner_id, limit], message_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn user_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn task_row(row: &Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        text: row.get(2)?,
        priority: row.get(3)?,
        completed: row.get(4)?,
        created_at: row.get(5)?,
        time_label: row.get(6)?,
    })
}

fn idea_row(row: &Row<'_>) -> rusqlite::Result<IdeaRow> {
    Ok(IdeaRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        text: row.get(2)?,
        category: row.get(3)?,
        created_at: row.get(4)?,
        time_label: row.get(5)?,
    })
}

fn message_row(row: &Row<'_>) -> rusqlite::Result<MessageRow> {
    Ok(MessageRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        role: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn owner(db: &Database) -> i64 {
        db.create_user("alice", "alice@example.com", "hash").unwrap()
    }

    fn count(db: &Database, table: &str) -> i64 {
        db.with_conn(|conn| {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
        })
        .unwrap()
    }

    #[test]
    fn duplicate_username_is_conflict() {
        let db = test_db();
        owner(&db);

        let err = db
            .create_user("alice", "other@example.com", "hash2")
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
        assert_eq!(count(&db, "users"), 1);
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let db = test_db();
        owner(&db);

        let err = db
            .create_user("bob", "alice@example.com", "hash2")
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict));
        assert_eq!(count(&db, "users"), 1);
    }

    #[test]
    fn tasks_list_newest_first_and_roundtrip() {
        let db = test_db();
        let uid = owner(&db);

        db.insert_task(uid, "first", "low", "09:00").unwrap();
        db.insert_task(uid, "second", "medium", "09:01").unwrap();
        db.insert_task(uid, "third", "high", "09:02").unwrap();

        let tasks = db.list_tasks(uid).unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].text, "third");
        assert_eq!(tasks[0].priority, "high");
        assert_eq!(tasks[0].time_label, "09:02");
        assert!(!tasks[0].completed);
        assert_eq!(tasks[1].text, "second");
        assert_eq!(tasks[2].text, "first");
        assert_eq!(tasks[2].owner_id, uid);
    }

    #[test]
    fn set_completed_touches_only_the_target() {
        let db = test_db();
        let uid = owner(&db);

        let a = db.insert_task(uid, "a", "low", "09:00").unwrap();
        let b = db.insert_task(uid, "b", "low", "09:00").unwrap();

        assert!(db.set_task_completed(uid, a.id, true).unwrap());

        let tasks = db.list_tasks(uid).unwrap();
        let completed: Vec<_> = tasks.iter().filter(|t| t.completed).collect();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, a.id);
        assert!(!tasks.iter().find(|t| t.id == b.id).unwrap().completed);
    }

    #[test]
    fn stale_ids_are_noops() {
        let db = test_db();
        let uid = owner(&db);
        db.insert_task(uid, "keep", "low", "09:00").unwrap();
        db.insert_idea(uid, "keep", "General", "09:00").unwrap();

        assert!(!db.delete_task(uid, 9999).unwrap());
        assert!(!db.delete_idea(uid, 9999).unwrap());
        assert!(!db.set_task_completed(uid, 9999, true).unwrap());

        assert_eq!(db.list_tasks(uid).unwrap().len(), 1);
        assert_eq!(db.list_ideas(uid).unwrap().len(), 1);
    }

    #[test]
    fn writes_are_scoped_to_the_owner() {
        let db = test_db();
        let alice = owner(&db);
        let bob = db.create_user("bob", "bob@example.com", "hash").unwrap();

        let task = db.insert_task(bob, "bob's task", "high", "10:00").unwrap();

        // Alice cannot reach Bob's row even with a valid id.
        assert!(!db.delete_task(alice, task.id).unwrap());
        assert!(!db.set_task_completed(alice, task.id, true).unwrap());
        assert_eq!(db.list_tasks(bob).unwrap().len(), 1);
        assert!(db.list_tasks(alice).unwrap().is_empty());
    }

    #[test]
    fn records_require_an_existing_owner() {
        let db = test_db();

        assert!(db.insert_task(4242, "orphan", "low", "09:00").is_err());
        assert!(db.insert_idea(4242, "orphan", "General", "09:00").is_err());
        assert!(db.insert_message(4242, "user", "orphan").is_err());
    }

    #[test]
    fn message_page_caps_then_reverses_to_conversation_order() {
        let db = test_db();
        let uid = owner(&db);

        for i in 1..=6 {
            db.insert_message(uid, "user", &format!("m{i}")).unwrap();
        }

        let mut page = db.list_messages(uid, Some(5)).unwrap();
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].content, "m6");

        page.reverse();
        let contents: Vec<_> = page.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4", "m5", "m6"]);

        assert_eq!(db.list_messages(uid, None).unwrap().len(), 6);
    }

    #[test]
    fn delete_message_by_id() {
        let db = test_db();
        let uid = owner(&db);

        let m = db.insert_message(uid, "user", "oops").unwrap();
        db.insert_message(uid, "assistant", "kept").unwrap();

        assert!(db.delete_message(uid, m.id).unwrap());
        assert!(!db.delete_message(uid, m.id).unwrap());

        let left = db.list_messages(uid, None).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].content, "kept");
    }
}

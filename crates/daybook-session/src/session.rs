//! A logged-in user's working state. The session keeps an in-memory mirror of
//! the user's records and writes through to the store on every mutation, so
//! the mirror and the store never drift within a session.
//!
//! Ordering contract: `tasks` and `ideas` are newest-created first (position 0
//! is the latest entry), `messages` are in conversation order. Positional
//! operations index into that ordering.

use std::sync::Arc;

use chrono::Local;

use daybook_db::{Database, StoreResult};
use daybook_types::models::{ChatMessage, Idea, Priority, Role, Task, User};

pub struct Session {
    db: Arc<Database>,
    user: User,
    tasks: Vec<Task>,
    ideas: Vec<Idea>,
    messages: Vec<ChatMessage>,
}

impl Session {
    /// Load the user's records into a fresh mirror.
    pub fn load(db: Arc<Database>, user: User) -> StoreResult<Self> {
        let tasks = db
            .list_tasks(user.id)?
            .into_iter()
            .map(|row| row.into_model())
            .collect();
        let ideas = db
            .list_ideas(user.id)?
            .into_iter()
            .map(|row| row.into_model())
            .collect();
        let mut messages: Vec<ChatMessage> = db
            .list_messages(user.id, None)?
            .into_iter()
            .map(|row| row.into_model())
            .collect();
        messages.reverse();

        Ok(Self { db, user, tasks, ideas, messages })
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    /// Newest-created first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Newest-created first.
    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    /// Conversation order, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The last `n` messages in conversation order.
    pub fn recent_messages(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    // -- Tasks --

    pub fn add_task(&mut self, text: &str, priority: Priority) -> StoreResult<Task> {
        let time_label = Local::now().format("%H:%M").to_string();
        let row = self
            .db
            .insert_task(self.user.id, text, priority.as_str(), &time_label)?;
        let task = row.into_model();
        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    /// Flip the completion flag of the task at `position`. Out-of-range
    /// positions are a silent no-op (None).
    pub fn toggle_completed(&mut self, position: usize) -> StoreResult<Option<Task>> {
        let Some(task) = self.tasks.get(position) else {
            return Ok(None);
        };
        let task_id = task.id;
        let target = !task.completed;

        if self.db.set_task_completed(self.user.id, task_id, target)? {
            let task = &mut self.tasks[position];
            task.completed = target;
            Ok(Some(task.clone()))
        } else {
            // The row vanished from the store; drop the stale mirror entry.
            self.tasks.remove(position);
            Ok(None)
        }
    }

    pub fn delete_task(&mut self, position: usize) -> StoreResult<Option<Task>> {
        if position >= self.tasks.len() {
            return Ok(None);
        }
        self.db.delete_task(self.user.id, self.tasks[position].id)?;
        Ok(Some(self.tasks.remove(position)))
    }

    // -- Ideas --

    pub fn add_idea(&mut self, text: &str, category: &str) -> StoreResult<Idea> {
        let time_label = Local::now().format("%H:%M").to_string();
        let row = self
            .db
            .insert_idea(self.user.id, text, category, &time_label)?;
        let idea = row.into_model();
        self.ideas.insert(0, idea.clone());
        Ok(idea)
    }

    pub fn delete_idea(&mut self, position: usize) -> StoreResult<Option<Idea>> {
        if position >= self.ideas.len() {
            return Ok(None);
        }
        self.db.delete_idea(self.user.id, self.ideas[position].id)?;
        Ok(Some(self.ideas.remove(position)))
    }

    // -- Messages --

    pub fn push_message(&mut self, role: Role, content: &str) -> StoreResult<ChatMessage> {
        let row = self.db.insert_message(self.user.id, role.as_str(), content)?;
        let message = row.into_model();
        self.messages.push(message.clone());
        Ok(message)
    }

    /// Undo a just-pushed message after a failed assistant exchange.
    pub fn retract_message(&mut self, message_id: i64) -> StoreResult<()> {
        self.db.delete_message(self.user.id, message_id)?;
        self.messages.retain(|m| m.id != message_id);
        Ok(())
    }
}

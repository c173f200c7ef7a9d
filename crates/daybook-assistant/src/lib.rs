pub mod client;
pub mod gemini;
pub mod prompt;

use std::sync::{Arc, MutexGuard};

use tracing::warn;

use daybook_db::StoreError;
use daybook_session::{Session, SharedSession};
use daybook_types::models::{ChatMessage, Role};

pub use client::{AssistantClient, AssistantError};
pub use gemini::{DEFAULT_MODEL, GeminiClient};
pub use prompt::{HISTORY_WINDOW, QUICK_PROMPTS, build_prompt};

#[derive(Debug, thiserror::Error)]
pub enum AskError {
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("ask task failed: {0}")]
    Join(String),
}

/// One chat exchange: record the user's message, call the model with the
/// session context, record the reply. If the model call fails the user
/// message is retracted, so a failed exchange leaves the history untouched.
///
/// The session lock is taken for the bookkeeping on either side of the call
/// but never held across the await.
pub async fn ask(
    session: SharedSession,
    client: Arc<dyn AssistantClient>,
    user_text: String,
) -> Result<ChatMessage, AskError> {
    let prep = Arc::clone(&session);
    let (user_message_id, prompt) = tokio::task::spawn_blocking(move || {
        let mut locked = lock_session(&prep)?;
        let message = locked.push_message(Role::User, &user_text)?;
        let prompt = prompt::build_prompt(&locked, &user_text);
        Ok::<_, AskError>((message.id, prompt))
    })
    .await
    .map_err(|e| AskError::Join(e.to_string()))??;

    let outcome = client.generate(&prompt).await;

    tokio::task::spawn_blocking(move || {
        let mut locked = lock_session(&session)?;
        match outcome {
            Ok(reply) => Ok(locked.push_message(Role::Assistant, &reply)?),
            Err(model_err) => {
                if let Err(e) = locked.retract_message(user_message_id) {
                    warn!(
                        "Could not retract message {} after failed exchange: {}",
                        user_message_id, e
                    );
                }
                Err(AskError::Assistant(model_err))
            }
        }
    })
    .await
    .map_err(|e| AskError::Join(e.to_string()))?
}

fn lock_session(session: &SharedSession) -> Result<MutexGuard<'_, Session>, AskError> {
    session
        .lock()
        .map_err(|e| AskError::Store(StoreError::Lock(e.to_string())))
}

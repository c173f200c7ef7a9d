use std::fmt::Write;

use chrono::Local;

use daybook_session::Session;

/// How many trailing chat messages the prompt carries.
pub const HISTORY_WINDOW: usize = 5;

/// Canned shortcut inputs the view renders as buttons. A tapped shortcut goes
/// through the same ask path as typed text.
pub const QUICK_PROMPTS: [&str; 3] = [
    "Help me plan my day productively",
    "Help me brainstorm creative ideas",
    "Help me set my priorities",
];

/// Assemble the context prompt for one exchange. Expects the user's message to
/// already be in the session, so the history window includes it.
pub fn build_prompt(session: &Session, user_text: &str) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "Today is {}.", Local::now().format("%d/%m/%Y"));

    let _ = writeln!(prompt, "\nThe user's open tasks:");
    let mut any = false;
    for task in session.tasks().iter().rev().filter(|t| !t.completed) {
        any = true;
        let _ = writeln!(prompt, "- {}", task.text);
    }
    if !any {
        let _ = writeln!(prompt, "(none)");
    }

    let _ = writeln!(prompt, "\nThe user's ideas:");
    if session.ideas().is_empty() {
        let _ = writeln!(prompt, "(none)");
    }
    for idea in session.ideas().iter().rev() {
        let _ = writeln!(prompt, "- {}", idea.text);
    }

    let _ = writeln!(prompt, "\nConversation so far:");
    for message in session.recent_messages(HISTORY_WINDOW) {
        let _ = writeln!(prompt, "{}: {}", message.role.as_str(), message.content);
    }

    let _ = writeln!(prompt, "\nThe user asks: {user_text}");

    let _ = write!(
        prompt,
        "\nYou are an assistant specialized in organization, productivity and \
         task management. Answer helpfully and motivationally, focusing on \
         personal organization."
    );

    prompt
}

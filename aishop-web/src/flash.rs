/// One-shot notices carried across a redirect
///
/// A handler pushes a message before redirecting; the next page that renders
/// takes (and thereby clears) every pending message.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session key holding pending messages
const MESSAGES_KEY: &str = "_messages";

/// Message severity, used as the CSS class in templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

impl FlashMessage {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }

    /// CSS class for the message
    pub fn class(&self) -> &'static str {
        self.level.as_str()
    }
}

/// Queues a message for the next rendered page
///
/// # Errors
///
/// Returns an error if the session store cannot be reached.
pub async fn push(
    session: &Session,
    level: Level,
    text: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    let mut pending: Vec<FlashMessage> = session.get(MESSAGES_KEY).await?.unwrap_or_default();
    pending.push(FlashMessage::new(level, text));
    session.insert(MESSAGES_KEY, pending).await
}

/// Removes and returns all pending messages
///
/// # Errors
///
/// Returns an error if the session store cannot be reached.
pub async fn take(session: &Session) -> Result<Vec<FlashMessage>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<FlashMessage>>(MESSAGES_KEY)
        .await?
        .unwrap_or_default())
}

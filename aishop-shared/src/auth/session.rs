/// Session helpers for the login state of a browser
///
/// A session is either anonymous or authenticated. Authenticated sessions
/// carry the user id under [`USER_ID_KEY`]; nothing else about the user is
/// cached in the session, so every request re-reads the user record.
///
/// # Example
///
/// ```no_run
/// use aishop_shared::auth::session::{log_in, log_out, current_user_id};
/// use tower_sessions::Session;
/// use uuid::Uuid;
///
/// # async fn example(session: Session, user_id: Uuid) -> Result<(), tower_sessions::session::Error> {
/// log_in(&session, user_id).await?;
/// assert_eq!(current_user_id(&session).await?, Some(user_id));
///
/// log_out(&session).await?;
/// assert_eq!(current_user_id(&session).await?, None);
/// # Ok(())
/// # }
/// ```

use tower_sessions::Session;
use tracing::debug;
use uuid::Uuid;

/// Session key holding the authenticated user id
pub const USER_ID_KEY: &str = "_auth_user_id";

/// Marks the session as authenticated for `user_id`
///
/// The session id is cycled first so an id obtained before login cannot be
/// reused afterwards.
///
/// # Errors
///
/// Returns an error if the session store cannot be reached.
pub async fn log_in(session: &Session, user_id: Uuid) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await?;
    debug!(user_id = %user_id, "Session authenticated");
    Ok(())
}

/// Returns the session to the anonymous state
///
/// All session data is dropped and the stored record is deleted.
///
/// # Errors
///
/// Returns an error if the session store cannot be reached.
pub async fn log_out(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await?;
    debug!("Session flushed");
    Ok(())
}

/// Returns the authenticated user id, if any
///
/// # Errors
///
/// Returns an error if the session store cannot be reached or the stored
/// value is not a UUID.
pub async fn current_user_id(session: &Session) -> Result<Option<Uuid>, tower_sessions::session::Error> {
    session.get::<Uuid>(USER_ID_KEY).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    fn new_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_anonymous_session_has_no_user() {
        let session = new_session();
        assert_eq!(current_user_id(&session).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_log_in_then_log_out() {
        let session = new_session();
        let user_id = Uuid::new_v4();

        log_in(&session, user_id).await.unwrap();
        assert_eq!(current_user_id(&session).await.unwrap(), Some(user_id));

        log_out(&session).await.unwrap();
        assert_eq!(current_user_id(&session).await.unwrap(), None);
    }
}

use prep_core::model::{AuthSession, User};
use storage::repository::Record;
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};

use crate::error::StoreError;

/// Holds the bearer token and signed-in user.
pub struct AuthService {
    record: Record<AuthSession>,
    state: watch::Sender<AuthSession>,
    write_lock: Mutex<()>,
}

impl AuthService {
    /// Load the persisted session. A record that cannot be read is logged and
    /// replaced by the demo session rather than failing start-up.
    pub async fn load(record: Record<AuthSession>) -> Self {
        let initial = match record.load().await {
            Ok(Some(session)) => session,
            Ok(None) => AuthSession::default(),
            Err(err) => {
                warn!(error = %err, "failed to read auth session; using default");
                AuthSession::default()
            }
        };
        let (state, _) = watch::channel(initial);
        Self {
            record,
            state,
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn current(&self) -> AuthSession {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSession> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.state.borrow().token().map(ToOwned::to_owned)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// # Errors
    ///
    /// Returns `StoreError` if the session cannot be persisted.
    pub async fn set_auth(&self, token: &str, user: User) -> Result<(), StoreError> {
        let mut next = self.current();
        next.set(token, user);
        self.replace(next).await
    }

    /// # Errors
    ///
    /// Returns `StoreError` if the signed-out session cannot be persisted.
    pub async fn logout(&self) -> Result<(), StoreError> {
        self.replace(AuthSession::signed_out()).await?;
        info!("signed out");
        Ok(())
    }

    async fn replace(&self, next: AuthSession) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.record.save(&next).await?;
        self.state.send_replace(next);
        Ok(())
    }
}

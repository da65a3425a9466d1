//! Session access for views.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::warn;

use super::{Resolution, Session, SessionStore, UserIdentity};
use crate::verifier::CredentialVerifier;

/// What a view may see and do with the session.
///
/// Read access to the current state plus the two verbs `login` and
/// `logout`. The store's transitions stay private behind this.
#[async_trait]
pub trait SessionAccessor: Send + Sync {
    /// Current session view.
    fn session(&self) -> Session;

    fn is_authenticated(&self) -> bool {
        self.session().is_authenticated
    }

    fn user(&self) -> Option<UserIdentity> {
        self.session().user
    }

    fn loading(&self) -> bool {
        self.session().loading
    }

    fn error(&self) -> Option<String> {
        self.session().error
    }

    /// Attempt a login. Resolves to `true` iff this attempt ends authenticated.
    async fn login(&self, email: &str, password: &str) -> bool;

    /// End the session. Always succeeds.
    fn logout(&self);
}

/// Cloneable handle onto the one session of the process.
///
/// Every clone observes and drives the same [`SessionStore`].
#[derive(Clone)]
pub struct SessionHandle {
    store: Arc<SessionStore>,
    verifier: Arc<dyn CredentialVerifier>,
}

impl SessionHandle {
    pub fn new(store: Arc<SessionStore>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { store, verifier }
    }

    /// Drop the error of the last failed attempt.
    pub fn clear_error(&self) {
        if let Err(e) = self.store.error_cleared() {
            warn!(error = %e, "failed to clear session error");
        }
    }

    /// Watch the session for changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.store.subscribe()
    }

    /// Whether the session lost its persistent storage.
    pub fn is_degraded(&self) -> bool {
        self.store.is_degraded()
    }
}

#[async_trait]
impl SessionAccessor for SessionHandle {
    fn session(&self) -> Session {
        self.store.snapshot().unwrap_or_else(|e| {
            warn!(error = %e, "session unreadable, treating as anonymous");
            Session::default()
        })
    }

    async fn login(&self, email: &str, password: &str) -> bool {
        let attempt = match self.store.login_requested() {
            Ok(attempt) => attempt,
            Err(e) => {
                warn!(error = %e, "login request ignored");
                return false;
            }
        };

        match self.verifier.verify(email, password).await {
            Ok(verified) => match self.store.login_succeeded(attempt, verified) {
                Ok(outcome) => outcome == Resolution::Applied,
                Err(e) => {
                    warn!(error = %e, "could not apply login success");
                    false
                }
            },
            Err(failure) => {
                if let Err(e) = self.store.login_failed(attempt, failure.failure_message()) {
                    warn!(error = %e, "could not apply login failure");
                }
                false
            }
        }
    }

    fn logout(&self) {
        if let Err(e) = self.store.logout() {
            warn!(error = %e, "logout failed");
        }
    }
}

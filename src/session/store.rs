//! Session storage and transitions.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{RwLock, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{AttemptId, Resolution, Session, SessionState, StateKind};
use crate::error::SessionError;
use crate::storage::{MemoryStorage, TokenStorage};
use crate::verifier::VerifiedSession;
use crate::Result;

/// What a persisted token means at process start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestorePolicy {
    /// A stored token alone marks the session authenticated, user unknown.
    #[default]
    TrustToken,
    /// A stored token without a resolved identity starts anonymous.
    RequireIdentity,
}

/// Owner of the single session of the process.
///
/// All mutation goes through the named transitions below; storage writes
/// happen under the same lock as the state change, so the persisted token
/// always matches the last applied transition. When storage fails the store
/// stops saving and keeps working from memory for the rest of the process;
/// logout still tries to clear the persisted token.
pub struct SessionStore {
    state: RwLock<SessionState>,
    storage: Box<dyn TokenStorage>,
    degraded: AtomicBool,
    next_attempt: AtomicU64,
    changes: watch::Sender<Session>,
}

impl SessionStore {
    /// Create a store, restoring a persisted token if present.
    pub fn new(storage: Box<dyn TokenStorage>) -> Self {
        Self::with_policy(storage, RestorePolicy::default())
    }

    /// Create a store with an explicit cold-start policy.
    pub fn with_policy(storage: Box<dyn TokenStorage>, policy: RestorePolicy) -> Self {
        let mut degraded = false;
        let restored = match storage.load() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "token storage unavailable, session will not persist");
                degraded = true;
                None
            }
        };

        let state = match (restored, policy) {
            (Some(token), RestorePolicy::TrustToken) => {
                info!("restored session from persisted token");
                SessionState::restored(token)
            }
            (Some(_), RestorePolicy::RequireIdentity) => {
                info!("persisted token found without identity, starting anonymous");
                SessionState::default()
            }
            (None, _) => SessionState::default(),
        };

        let (changes, _) = watch::channel(state.snapshot());

        Self {
            state: RwLock::new(state),
            storage,
            degraded: AtomicBool::new(degraded),
            next_attempt: AtomicU64::new(1),
            changes,
        }
    }

    /// Store with process-local storage only.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Current session view.
    pub fn snapshot(&self) -> Result<Session> {
        let state = self.state.read().map_err(|_| SessionError::LockPoisoned)?;
        Ok(state.snapshot())
    }

    /// Current state discriminant.
    pub fn kind(&self) -> Result<StateKind> {
        let state = self.state.read().map_err(|_| SessionError::LockPoisoned)?;
        Ok(state.kind())
    }

    /// Receive a fresh [`Session`] after every transition.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.changes.subscribe()
    }

    /// Whether storage failed and new tokens are no longer saved.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// `loginRequested`. Returns the id the resolution must present.
    pub(crate) fn login_requested(&self) -> Result<AttemptId> {
        let mut state = self.write()?;
        let attempt = AttemptId::from_raw(self.next_attempt.fetch_add(1, Ordering::Relaxed));
        state.request_login(attempt)?;
        debug!(%attempt, "login requested");
        self.publish(&state);
        Ok(attempt)
    }

    /// `loginSucceeded`. Persists the token when applied.
    pub(crate) fn login_succeeded(
        &self,
        attempt: AttemptId,
        verified: VerifiedSession,
    ) -> Result<Resolution> {
        let mut state = self.write()?;
        let VerifiedSession { user, token } = verified;
        let user_id = user.id;

        let outcome = state.succeed(attempt, user, token.clone());
        match outcome {
            Resolution::Applied => {
                self.persist(|s| s.save(&token));
                info!(%attempt, user_id, "login succeeded");
                self.publish(&state);
            }
            Resolution::Stale => debug!(%attempt, "discarding stale login success"),
        }
        Ok(outcome)
    }

    /// `loginFailed`. Leaves storage untouched.
    pub(crate) fn login_failed(&self, attempt: AttemptId, reason: String) -> Result<Resolution> {
        let mut state = self.write()?;

        let outcome = state.fail(attempt, reason);
        match outcome {
            Resolution::Applied => {
                info!(%attempt, "login failed");
                self.publish(&state);
            }
            Resolution::Stale => debug!(%attempt, "discarding stale login failure"),
        }
        Ok(outcome)
    }

    /// `logout`. Accepted in every state; clears the persisted token.
    pub(crate) fn logout(&self) -> Result<()> {
        let mut state = self.write()?;
        let was = state.kind();
        state.logout();
        self.clear_persisted();
        info!(from = ?was, "logged out");
        self.publish(&state);
        Ok(())
    }

    /// `errorCleared`.
    pub(crate) fn error_cleared(&self) -> Result<()> {
        let mut state = self.write()?;
        state.clear_error();
        self.publish(&state);
        Ok(())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, SessionState>> {
        self.state.write().map_err(|_| SessionError::LockPoisoned)
    }

    fn publish(&self, state: &SessionState) {
        self.changes.send_replace(state.snapshot());
    }

    fn persist<F>(&self, op: F)
    where
        F: FnOnce(&dyn TokenStorage) -> Result<()>,
    {
        if self.is_degraded() {
            return;
        }
        if let Err(e) = op(self.storage.as_ref()) {
            warn!(error = %e, "token storage unavailable, continuing in memory");
            self.degraded.store(true, Ordering::Relaxed);
        }
    }

    /// Runs even when degraded; logout never leaves a token behind.
    fn clear_persisted(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "could not clear persisted token");
            self.degraded.store(true, Ordering::Relaxed);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Role, UserIdentity};
    use std::sync::Arc;

    /// Storage that shares its slot with the test so writes can be inspected.
    struct Shared(Arc<MemoryStorage>);

    impl TokenStorage for Shared {
        fn save(&self, token: &str) -> Result<()> {
            self.0.save(token)
        }
        fn load(&self) -> Result<Option<String>> {
            self.0.load()
        }
        fn clear(&self) -> Result<()> {
            self.0.clear()
        }
    }

    /// Storage whose every operation fails.
    struct Broken;

    impl TokenStorage for Broken {
        fn save(&self, _: &str) -> Result<()> {
            Err(SessionError::StorageUnavailable("disk gone".into()))
        }
        fn load(&self) -> Result<Option<String>> {
            Err(SessionError::StorageUnavailable("disk gone".into()))
        }
        fn clear(&self) -> Result<()> {
            Err(SessionError::StorageUnavailable("disk gone".into()))
        }
    }

    /// Storage whose first `load` fails, then behaves normally.
    struct FlakyOnStart {
        backing: Arc<MemoryStorage>,
        failed: AtomicBool,
    }

    impl TokenStorage for FlakyOnStart {
        fn save(&self, token: &str) -> Result<()> {
            self.backing.save(token)
        }
        fn load(&self) -> Result<Option<String>> {
            if !self.failed.swap(true, Ordering::Relaxed) {
                return Err(SessionError::StorageUnavailable("file busy".into()));
            }
            self.backing.load()
        }
        fn clear(&self) -> Result<()> {
            self.backing.clear()
        }
    }

    fn shared(token: Option<&str>) -> (Arc<MemoryStorage>, SessionStore) {
        let backing = Arc::new(match token {
            Some(t) => MemoryStorage::with_token(t),
            None => MemoryStorage::new(),
        });
        let store = SessionStore::new(Box::new(Shared(Arc::clone(&backing))));
        (backing, store)
    }

    fn admin() -> VerifiedSession {
        VerifiedSession {
            user: UserIdentity::new(1, "Admin", "User", "admin@example.com", Role::Admin),
            token: "admin-mock-jwt-token".into(),
        }
    }

    #[test]
    fn test_starts_anonymous_without_token() {
        let (_, store) = shared(None);
        assert_eq!(store.kind().unwrap(), StateKind::Anonymous);
        assert!(!store.snapshot().unwrap().is_authenticated);
    }

    #[test]
    fn test_restores_token_as_authenticated() {
        let (_, store) = shared(Some("persisted"));
        let snap = store.snapshot().unwrap();
        assert!(snap.is_authenticated);
        assert!(snap.user.is_none());
        assert_eq!(snap.token.as_deref(), Some("persisted"));
    }

    #[test]
    fn test_empty_token_is_absent() {
        let (_, store) = shared(Some(""));
        let snap = store.snapshot().unwrap();
        assert!(!snap.is_authenticated);
        assert!(snap.token.is_none());
    }

    #[test]
    fn test_logout_clears_storage_after_failed_start() {
        let backing = Arc::new(MemoryStorage::with_token("old-token"));
        let store = SessionStore::new(Box::new(FlakyOnStart {
            backing: Arc::clone(&backing),
            failed: AtomicBool::new(false),
        }));
        assert!(store.is_degraded());

        let attempt = store.login_requested().unwrap();
        store.login_succeeded(attempt, admin()).unwrap();
        store.logout().unwrap();

        assert_eq!(backing.load().unwrap(), None);
        let restarted = SessionStore::new(Box::new(Shared(Arc::clone(&backing))));
        assert!(!restarted.snapshot().unwrap().is_authenticated);
    }

    #[test]
    fn test_require_identity_policy_starts_anonymous() {
        let backing = Arc::new(MemoryStorage::with_token("persisted"));
        let store = SessionStore::with_policy(
            Box::new(Shared(Arc::clone(&backing))),
            RestorePolicy::RequireIdentity,
        );
        assert!(!store.snapshot().unwrap().is_authenticated);
        assert_eq!(backing.load().unwrap().as_deref(), Some("persisted"));
    }

    #[test]
    fn test_success_persists_token() {
        let (backing, store) = shared(None);
        let attempt = store.login_requested().unwrap();
        assert!(store.snapshot().unwrap().loading);

        let outcome = store.login_succeeded(attempt, admin()).unwrap();
        assert_eq!(outcome, Resolution::Applied);
        assert_eq!(
            backing.load().unwrap().as_deref(),
            Some("admin-mock-jwt-token")
        );
    }

    #[test]
    fn test_failure_does_not_touch_storage() {
        let (backing, store) = shared(None);
        let attempt = store.login_requested().unwrap();
        store.login_failed(attempt, "nope".into()).unwrap();

        assert_eq!(backing.load().unwrap(), None);
        assert_eq!(store.snapshot().unwrap().error.as_deref(), Some("nope"));
    }

    #[test]
    fn test_logout_clears_storage() {
        let (backing, store) = shared(Some("persisted"));
        store.logout().unwrap();
        assert_eq!(backing.load().unwrap(), None);
        assert_eq!(store.snapshot().unwrap(), Session::default());
    }

    #[test]
    fn test_late_success_after_logout_is_discarded() {
        let (backing, store) = shared(None);
        let attempt = store.login_requested().unwrap();
        store.logout().unwrap();

        let outcome = store.login_succeeded(attempt, admin()).unwrap();
        assert_eq!(outcome, Resolution::Stale);
        assert_eq!(store.kind().unwrap(), StateKind::Anonymous);
        assert_eq!(backing.load().unwrap(), None);
    }

    #[test]
    fn test_attempt_ids_are_fresh() {
        let store = SessionStore::in_memory();
        let first = store.login_requested().unwrap();
        store.logout().unwrap();
        let second = store.login_requested().unwrap();
        assert_ne!(first, second);

        assert_eq!(
            store.login_succeeded(first, admin()).unwrap(),
            Resolution::Stale
        );
        assert!(store.snapshot().unwrap().loading);
    }

    #[test]
    fn test_broken_storage_degrades_to_memory() {
        let store = SessionStore::new(Box::new(Broken));
        assert!(store.is_degraded());

        let attempt = store.login_requested().unwrap();
        store.login_succeeded(attempt, admin()).unwrap();
        assert!(store.snapshot().unwrap().is_authenticated);

        store.logout().unwrap();
        assert!(!store.snapshot().unwrap().is_authenticated);
    }

    #[test]
    fn test_subscribers_see_transitions() {
        let store = SessionStore::in_memory();
        let mut rx = store.subscribe();
        assert!(!rx.borrow_and_update().loading);

        let attempt = store.login_requested().unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().loading);

        store.login_failed(attempt, "bad".into()).unwrap();
        assert_eq!(rx.borrow_and_update().error.as_deref(), Some("bad"));

        store.error_cleared().unwrap();
        assert!(rx.borrow_and_update().error.is_none());
    }
}

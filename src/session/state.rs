//! Session state machine.

use std::fmt;

use serde::Serialize;

use super::UserIdentity;
use crate::error::SessionError;

/// Identifier of one login attempt.
///
/// Each `loginRequested` gets a fresh id; a resolution is only applied
/// while the machine is still pending on that same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(u64);

impl AttemptId {
    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt-{}", self.0)
    }
}

/// Events accepted by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    LoginRequested,
    LoginSucceeded,
    LoginFailed,
    Logout,
    ErrorCleared,
}

/// Discriminant of [`SessionState`], used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    Anonymous,
    Pending,
    Authenticated,
}

/// Authentication state of the process.
///
/// `Failed` is not a separate state: it is `Anonymous` carrying an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No session. `error` holds the reason of the last failed attempt.
    Anonymous { error: Option<String> },
    /// A login attempt is in flight.
    Pending { attempt: AttemptId },
    /// Logged in. `user` is absent when restored from a bare persisted token.
    Authenticated {
        user: Option<UserIdentity>,
        token: String,
    },
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Anonymous { error: None }
    }
}

/// Outcome of applying a verifier resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The machine was pending on this attempt and moved on.
    Applied,
    /// The attempt was superseded (logout, newer attempt); nothing changed.
    Stale,
}

impl SessionState {
    /// Initial state for a process that found `token` in storage.
    pub fn restored(token: String) -> Self {
        SessionState::Authenticated { user: None, token }
    }

    pub fn kind(&self) -> StateKind {
        match self {
            SessionState::Anonymous { .. } => StateKind::Anonymous,
            SessionState::Pending { .. } => StateKind::Pending,
            SessionState::Authenticated { .. } => StateKind::Authenticated,
        }
    }

    /// Check if `event` is accepted in this state.
    ///
    /// - Anonymous -> LoginRequested
    /// - Pending -> LoginSucceeded | LoginFailed
    /// - any -> Logout | ErrorCleared
    pub fn accepts(&self, event: SessionEvent) -> bool {
        use SessionEvent::*;
        match event {
            LoginRequested => matches!(self, SessionState::Anonymous { .. }),
            LoginSucceeded | LoginFailed => matches!(self, SessionState::Pending { .. }),
            Logout | ErrorCleared => true,
        }
    }

    fn reject(&self, event: SessionEvent) -> SessionError {
        SessionError::InvalidTransition {
            from: self.kind(),
            event,
        }
    }

    /// `loginRequested`: Anonymous -> Pending, clearing any error.
    pub fn request_login(&mut self, attempt: AttemptId) -> crate::Result<()> {
        if !self.accepts(SessionEvent::LoginRequested) {
            return Err(self.reject(SessionEvent::LoginRequested));
        }
        *self = SessionState::Pending { attempt };
        Ok(())
    }

    /// `loginSucceeded`: Pending(attempt) -> Authenticated.
    pub fn succeed(&mut self, attempt: AttemptId, user: UserIdentity, token: String) -> Resolution {
        if !self.is_pending_on(attempt) {
            return Resolution::Stale;
        }
        *self = SessionState::Authenticated {
            user: Some(user),
            token,
        };
        Resolution::Applied
    }

    /// `loginFailed`: Pending(attempt) -> Anonymous(error = reason).
    pub fn fail(&mut self, attempt: AttemptId, reason: String) -> Resolution {
        if !self.is_pending_on(attempt) {
            return Resolution::Stale;
        }
        *self = SessionState::Anonymous {
            error: Some(reason),
        };
        Resolution::Applied
    }

    /// `logout`: any -> Anonymous.
    pub fn logout(&mut self) {
        *self = SessionState::Anonymous { error: None };
    }

    /// `errorCleared`: same state, error dropped.
    pub fn clear_error(&mut self) {
        if let SessionState::Anonymous { error } = self {
            *error = None;
        }
    }

    pub fn is_pending_on(&self, attempt: AttemptId) -> bool {
        matches!(self, SessionState::Pending { attempt: current } if *current == attempt)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Authenticated { token, .. } => Some(token),
            _ => None,
        }
    }

    /// Public projection of this state.
    pub fn snapshot(&self) -> Session {
        match self {
            SessionState::Anonymous { error } => Session {
                error: error.clone(),
                ..Session::default()
            },
            SessionState::Pending { .. } => Session {
                loading: true,
                ..Session::default()
            },
            SessionState::Authenticated { user, token } => Session {
                user: user.clone(),
                token: Some(token.clone()),
                is_authenticated: true,
                ..Session::default()
            },
        }
    }
}

/// Read-only view of the session, as observed by views and the route guard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: Option<UserIdentity>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub error: Option<String>,
}

//! # session-gate
//!
//! Client-side session management for single-page applications.
//!
//! A [`SessionStore`] owns the one session of the process and moves it
//! through an explicit state machine (anonymous, pending, authenticated).
//! Login attempts go through a pluggable [`CredentialVerifier`]; the issued
//! token is persisted through a [`TokenStorage`] so the session survives a
//! restart. Views get a [`SessionHandle`], which exposes the session read-only
//! plus `login`/`logout`, and navigation is checked by a stateless
//! [`RouteGuard`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use session_gate::{
//!     FileStorage, Route, RouteGuard, SessionAccessor, SessionHandle, SessionStore,
//!     StaticVerifier,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     session_gate::logging::try_init().ok();
//!
//!     let store = SessionStore::new(Box::new(FileStorage::new("session.json")));
//!     let session = SessionHandle::new(Arc::new(store), Arc::new(StaticVerifier::demo()));
//!
//!     if session.login("admin@example.com", "password").await {
//!         let guard = RouteGuard::default();
//!         let decision = guard.can_enter(&Route::protected("/dashboard"), &session.session());
//!         assert!(decision.is_allow());
//!     }
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod guard;
pub mod logging;
pub mod session;
pub mod storage;
pub mod verifier;

// Re-export commonly used types
pub use error::{Result, SessionError};
pub use guard::{GuardDecision, Navigation, Route, RouteGuard, RouteTable};
pub use session::{
    Role, Session, SessionAccessor, SessionHandle, SessionState, SessionStore, UserIdentity,
};
pub use storage::{FileStorage, MemoryStorage, TokenStorage};
pub use verifier::{CredentialVerifier, StaticVerifier, VerifiedSession};

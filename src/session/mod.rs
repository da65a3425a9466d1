//! Session management module.
//!
//! This module holds the authentication state machine, the store that owns
//! the single session of the process, and the accessor handed to views.

mod accessor;
mod identity;
mod state;
mod store;

pub use accessor::{SessionAccessor, SessionHandle};
pub use identity::{Role, UserIdentity};
pub use state::{AttemptId, Resolution, Session, SessionEvent, SessionState, StateKind};
pub use store::{RestorePolicy, SessionStore};

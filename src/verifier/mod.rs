//! Credential verification.
//!
//! The session store only sees the [`CredentialVerifier`] trait. The
//! bundled [`StaticVerifier`] is a fixed lookup table standing in for a
//! remote identity provider; a deployment swaps in its own implementation
//! without touching the state machine.

mod table;

pub use table::{DemoAccount, StaticVerifier, DEFAULT_LATENCY};

use async_trait::async_trait;

use crate::session::UserIdentity;
use crate::Result;

/// Identity and token issued for an accepted credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    pub user: UserIdentity,
    pub token: String,
}

/// Resolves an email/password pair to a session or a failure.
///
/// Inputs are untrusted and not validated here. Implementations must be
/// safe to call repeatedly and have no side effects beyond the lookup.
/// Failures are [`SessionError::InvalidCredentials`](crate::SessionError::InvalidCredentials)
/// for a rejected pair and [`SessionError::Transport`](crate::SessionError::Transport)
/// when the call itself fails.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, email: &str, password: &str) -> Result<VerifiedSession>;
}

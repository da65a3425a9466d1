//! Fixed credential table with simulated latency.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{CredentialVerifier, VerifiedSession};
use crate::error::SessionError;
use crate::session::{Role, UserIdentity};
use crate::Result;

/// Delay the demo verifier waits before answering.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1000);

/// One accepted credential pair and what it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoAccount {
    pub email: String,
    pub password: String,
    pub user: UserIdentity,
    pub token: String,
}

impl DemoAccount {
    fn new(password: &str, user: UserIdentity, token: &str) -> Self {
        Self {
            email: user.email.clone(),
            password: password.to_string(),
            user,
            token: token.to_string(),
        }
    }
}

/// Verifier backed by an in-memory account table.
#[derive(Debug, Clone)]
pub struct StaticVerifier {
    accounts: Vec<DemoAccount>,
    latency: Duration,
}

impl StaticVerifier {
    /// Verifier with the given table and no latency.
    pub fn new(accounts: Vec<DemoAccount>) -> Self {
        Self {
            accounts,
            latency: Duration::ZERO,
        }
    }

    /// The three demo accounts with the default latency.
    pub fn demo() -> Self {
        Self::new(demo_accounts()).with_latency(DEFAULT_LATENCY)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Accepted accounts, in table order.
    pub fn accounts(&self) -> &[DemoAccount] {
        &self.accounts
    }

    fn lookup(&self, email: &str, password: &str) -> Option<&DemoAccount> {
        self.accounts
            .iter()
            .find(|a| a.email == email && a.password == password)
    }
}

impl Default for StaticVerifier {
    fn default() -> Self {
        Self::demo()
    }
}

#[async_trait]
impl CredentialVerifier for StaticVerifier {
    async fn verify(&self, email: &str, password: &str) -> Result<VerifiedSession> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.lookup(email, password) {
            Some(account) => {
                debug!(user_id = account.user.id, "credentials accepted");
                Ok(VerifiedSession {
                    user: account.user.clone(),
                    token: account.token.clone(),
                })
            }
            None => {
                debug!("credentials rejected");
                Err(SessionError::InvalidCredentials)
            }
        }
    }
}

fn demo_accounts() -> Vec<DemoAccount> {
    vec![
        DemoAccount::new(
            "password",
            UserIdentity::new(1, "Admin", "User", "admin@example.com", Role::Admin),
            "admin-mock-jwt-token",
        ),
        DemoAccount::new(
            "therapist123",
            UserIdentity::new(
                2,
                "Sarah",
                "Thompson",
                "therapist@mentalspace.com",
                Role::Therapist,
            ),
            "therapist-mock-jwt-token",
        ),
        DemoAccount::new(
            "manager123",
            UserIdentity::new(
                3,
                "Michael",
                "Johnson",
                "manager@mentalspace.com",
                Role::Manager,
            ),
            "manager-mock-jwt-token",
        ),
    ]
}

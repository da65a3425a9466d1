//! Authenticated user identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role label attached to a user. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Therapist,
    Manager,
}

impl Role {
    /// Label as shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Therapist => "Therapist",
            Role::Manager => "Manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Therapist" => Ok(Role::Therapist),
            "Manager" => Ok(Role::Manager),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Identity of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Stable unique id.
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    /// Unique within the credential set.
    pub email: String,
    pub role: Role,
}

impl UserIdentity {
    pub fn new(
        id: u64,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            role,
        }
    }

    /// "First Last", as used in the dashboard greeting.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip_label() {
        for role in [Role::Admin, Role::Therapist, Role::Manager] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("Owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_display_name() {
        let user = UserIdentity::new(2, "Sarah", "Thompson", "s@x.com", Role::Therapist);
        assert_eq!(user.display_name(), "Sarah Thompson");
    }

    #[test]
    fn test_serializes_camel_case() {
        let user = UserIdentity::new(1, "Admin", "User", "admin@example.com", Role::Admin);
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["firstName"], "Admin");
        assert_eq!(json["lastName"], "User");
        assert_eq!(json["role"], "Admin");
        assert_eq!(json["id"], 1);
    }
}

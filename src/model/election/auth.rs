use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Different privilege levels.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Operator,
    #[default]
    Voter,
}

impl Display for UserRole {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Admin => "admin",
                Self::Operator => "operator",
                Self::Voter => "voter",
            }
        )
    }
}

/// Who is using the client, as reported by `GET /personal_info`.
/// Passed explicitly to every operation that needs a permission check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    #[serde(rename = "islogged")]
    pub is_logged: bool,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub role: UserRole,
}

impl AuthContext {
    /// May this user drive the election lifecycle?
    pub fn is_authorized(&self) -> bool {
        self.is_logged && matches!(self.role, UserRole::Admin | UserRole::Operator)
    }
}

/// Example test data.
#[cfg(test)]
mod examples {
    use super::*;

    impl AuthContext {
        pub fn example(role: UserRole) -> Self {
            Self {
                is_logged: true,
                firstname: "Alice".to_string(),
                lastname: "Smith".to_string(),
                role,
            }
        }
    }
}

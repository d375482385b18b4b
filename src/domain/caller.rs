use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(DomainError::InvalidInput(format!("Unknown role '{}'", other))),
        }
    }
}

/// The authenticated identity a request runs as.
///
/// Authentication happens upstream; by the time a `Caller` exists its
/// identity is trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Allows the owner of a resource, or an admin. Everyone else is refused.
    pub fn check_permissions(&self, owner_id: Uuid) -> Result<(), DomainError> {
        if self.is_admin() || self.user_id == owner_id {
            return Ok(());
        }
        Err(DomainError::Forbidden(
            "Not authorized to access this order".to_string(),
        ))
    }

    pub fn require_role(&self, role: Role) -> Result<(), DomainError> {
        if self.role == role {
            Ok(())
        } else {
            Err(DomainError::Forbidden(
                "Unauthorized to access this route".to_string(),
            ))
        }
    }
}

//! User model
//!
//! Defines the User entity for the chat server. Accounts are keyed by
//! email; guest accounts are full users with a synthetic identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing an account in the system.
///
/// Both registered users and guests are stored here; `user_type`
/// distinguishes them. Guests authenticate like any other user but
/// carry a generated email and password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account type (regular/guest)
    pub user_type: UserType,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: The password should already be hashed before calling this function.
    /// Use `services::password::hash_password()` to hash the password.
    pub fn new(email: String, password_hash: String, user_type: UserType) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            email,
            password_hash,
            user_type,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this is a guest account
    pub fn is_guest(&self) -> bool {
        self.user_type == UserType::Guest
    }
}

/// Account type.
///
/// - Regular: self-registered with chosen credentials
/// - Guest: issued automatically when an unauthenticated visitor
///   reaches the chat entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    /// Registered account
    Regular,
    /// Auto-issued guest account
    Guest,
}

impl Default for UserType {
    fn default() -> Self {
        Self::Regular
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserType::Regular => write!(f, "regular"),
            UserType::Guest => write!(f, "guest"),
        }
    }
}

impl FromStr for UserType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "regular" => Ok(UserType::Regular),
            "guest" => Ok(UserType::Guest),
            _ => Err(anyhow::anyhow!("Invalid user type: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new(
            "test@example.com".to_string(),
            "hashed_password".to_string(),
            UserType::Regular,
        );

        assert_eq!(user.id, 0);
        assert_eq!(user.email, "test@example.com");
        assert_eq!(user.user_type, UserType::Regular);
        assert!(!user.is_guest());
    }

    #[test]
    fn test_user_is_guest() {
        let guest = User::new(
            "guest-abc@parley.local".to_string(),
            "hash".to_string(),
            UserType::Guest,
        );
        assert!(guest.is_guest());
    }

    #[test]
    fn test_user_type_display() {
        assert_eq!(UserType::Regular.to_string(), "regular");
        assert_eq!(UserType::Guest.to_string(), "guest");
    }

    #[test]
    fn test_user_type_from_str() {
        assert_eq!(UserType::from_str("regular").unwrap(), UserType::Regular);
        assert_eq!(UserType::from_str("REGULAR").unwrap(), UserType::Regular);
        assert_eq!(UserType::from_str("Guest").unwrap(), UserType::Guest);
        assert!(UserType::from_str("invalid").is_err());
    }

    #[test]
    fn test_user_type_default() {
        assert_eq!(UserType::default(), UserType::Regular);
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new(
            "test@example.com".to_string(),
            "secret-hash".to_string(),
            UserType::Regular,
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("test@example.com"));
    }
}

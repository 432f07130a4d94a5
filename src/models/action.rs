//! Auth action result status
//!
//! Login and registration submissions resolve to exactly one status
//! from a closed set, and each terminal status maps to exactly one
//! user-facing message. The frontend keys its notifications off the
//! status, so the mapping must stay one-to-one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result status of a login or registration action.
///
/// `Idle` is the initial client-side value; the server only ever
/// produces terminal statuses. `UserExists` is produced by
/// registration only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// No submission has happened yet
    Idle,
    /// The action completed and a session was established
    Success,
    /// The action ran and was rejected (bad credentials, create failure)
    Failed,
    /// The submission did not pass validation
    InvalidData,
    /// Registration hit an already-registered email
    UserExists,
}

impl ActionStatus {
    /// Notification message for a login result.
    ///
    /// Login never produces `UserExists`; `Idle` and `Success` show no
    /// notification.
    pub fn login_message(self) -> Option<&'static str> {
        match self {
            ActionStatus::Failed => Some("Invalid credentials!"),
            ActionStatus::InvalidData => Some("Failed validating your submission!"),
            _ => None,
        }
    }

    /// Notification message for a registration result.
    pub fn register_message(self) -> Option<&'static str> {
        match self {
            ActionStatus::Success => Some("Account created successfully!"),
            ActionStatus::Failed => Some("Failed to create account!"),
            ActionStatus::InvalidData => Some("Failed validating your submission!"),
            ActionStatus::UserExists => Some("Account already exists!"),
            ActionStatus::Idle => None,
        }
    }

    /// Whether this status establishes a session (sets the cookie)
    pub fn is_success(self) -> bool {
        self == ActionStatus::Success
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionStatus::Idle => write!(f, "idle"),
            ActionStatus::Success => write!(f, "success"),
            ActionStatus::Failed => write!(f, "failed"),
            ActionStatus::InvalidData => write!(f, "invalid_data"),
            ActionStatus::UserExists => write!(f, "user_exists"),
        }
    }
}

impl FromStr for ActionStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle" => Ok(ActionStatus::Idle),
            "success" => Ok(ActionStatus::Success),
            "failed" => Ok(ActionStatus::Failed),
            "invalid_data" => Ok(ActionStatus::InvalidData),
            "user_exists" => Ok(ActionStatus::UserExists),
            _ => Err(anyhow::anyhow!("Invalid action status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [ActionStatus; 5] = [
        ActionStatus::Idle,
        ActionStatus::Success,
        ActionStatus::Failed,
        ActionStatus::InvalidData,
        ActionStatus::UserExists,
    ];

    #[test]
    fn test_login_messages() {
        assert_eq!(
            ActionStatus::Failed.login_message(),
            Some("Invalid credentials!")
        );
        assert_eq!(
            ActionStatus::InvalidData.login_message(),
            Some("Failed validating your submission!")
        );
        assert_eq!(ActionStatus::Success.login_message(), None);
        assert_eq!(ActionStatus::Idle.login_message(), None);
    }

    #[test]
    fn test_register_messages() {
        assert_eq!(
            ActionStatus::Success.register_message(),
            Some("Account created successfully!")
        );
        assert_eq!(
            ActionStatus::Failed.register_message(),
            Some("Failed to create account!")
        );
        assert_eq!(
            ActionStatus::InvalidData.register_message(),
            Some("Failed validating your submission!")
        );
        assert_eq!(
            ActionStatus::UserExists.register_message(),
            Some("Account already exists!")
        );
        assert_eq!(ActionStatus::Idle.register_message(), None);
    }

    #[test]
    fn test_user_exists_message_distinct_from_failed() {
        assert_ne!(
            ActionStatus::UserExists.register_message(),
            ActionStatus::Failed.register_message()
        );
    }

    #[test]
    fn test_each_status_maps_to_one_message() {
        // The mapping is a function of the status: calling it twice for
        // the same status yields the same message.
        for status in ALL_STATUSES {
            assert_eq!(status.login_message(), status.login_message());
            assert_eq!(status.register_message(), status.register_message());
        }
    }

    #[test]
    fn test_only_success_establishes_session() {
        for status in ALL_STATUSES {
            assert_eq!(status.is_success(), status == ActionStatus::Success);
        }
    }

    #[test]
    fn test_serde_wire_format() {
        assert_eq!(
            serde_json::to_string(&ActionStatus::InvalidData).unwrap(),
            "\"invalid_data\""
        );
        assert_eq!(
            serde_json::to_string(&ActionStatus::UserExists).unwrap(),
            "\"user_exists\""
        );

        let parsed: ActionStatus = serde_json::from_str("\"success\"").unwrap();
        assert_eq!(parsed, ActionStatus::Success);
    }

    #[test]
    fn test_display_from_str_round_trip() {
        for status in ALL_STATUSES {
            let text = status.to_string();
            let parsed = ActionStatus::from_str(&text).unwrap();
            assert_eq!(parsed, status);
        }
        assert!(ActionStatus::from_str("unknown").is_err());
    }
}

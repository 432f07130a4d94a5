//! Data models
//!
//! Database entities and shared data structures: users (regular and
//! guest accounts), the sessions that authenticate them, and the
//! discriminated result statuses of the auth actions.

mod action;
mod session;
mod user;

pub use action::ActionStatus;
pub use session::Session;
pub use user::{User, UserType};

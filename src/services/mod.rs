//! Services layer - Business logic
//!
//! Services implement the business rules, coordinate repositories and
//! handle validation and error cases.

pub mod password;
pub mod rate_limiter;
pub mod user;

pub use password::{hash_password, verify_password};
pub use rate_limiter::LoginRateLimiter;
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};

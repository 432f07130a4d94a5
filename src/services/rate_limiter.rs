//! Rate limiter for login attempts
//!
//! Provides protection against brute force attacks by:
//! - Limiting failed login attempts per email (5 attempts per 15 minutes)
//! - Limiting login requests per IP address (10 requests per minute)

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Failed attempts allowed per email within the email window
const EMAIL_ATTEMPT_LIMIT: usize = 5;
/// Email window in minutes
const EMAIL_WINDOW_MINUTES: i64 = 15;
/// Requests allowed per IP within the IP window
const IP_REQUEST_LIMIT: usize = 10;
/// IP window in minutes
const IP_WINDOW_MINUTES: i64 = 1;

/// Login rate limiter
pub struct LoginRateLimiter {
    /// Failed login attempts by email
    email_attempts: Arc<RwLock<HashMap<String, Vec<DateTime<Utc>>>>>,
    /// Request attempts by IP address
    ip_attempts: Arc<RwLock<HashMap<IpAddr, Vec<DateTime<Utc>>>>>,
}

impl LoginRateLimiter {
    /// Create a new rate limiter
    pub fn new() -> Self {
        Self {
            email_attempts: Arc::new(RwLock::new(HashMap::new())),
            ip_attempts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check if an email is rate limited
    pub async fn is_email_limited(&self, email: &str) -> bool {
        let mut attempts = self.email_attempts.write().await;
        let now = Utc::now();
        let cutoff = now - Duration::minutes(EMAIL_WINDOW_MINUTES);

        let email_attempts = attempts.entry(email.to_lowercase()).or_insert_with(Vec::new);

        // Remove attempts outside the window
        email_attempts.retain(|time| *time > cutoff);

        email_attempts.len() >= EMAIL_ATTEMPT_LIMIT
    }

    /// Record a failed login attempt for an email
    pub async fn record_failed_attempt(&self, email: &str) {
        let mut attempts = self.email_attempts.write().await;
        let now = Utc::now();

        let email_attempts = attempts.entry(email.to_lowercase()).or_insert_with(Vec::new);
        email_attempts.push(now);
    }

    /// Clear failed attempts for an email (on successful login)
    pub async fn clear_email_attempts(&self, email: &str) {
        let mut attempts = self.email_attempts.write().await;
        attempts.remove(&email.to_lowercase());
    }

    /// Check if an IP is rate limited
    pub async fn is_ip_limited(&self, ip: IpAddr) -> bool {
        let mut attempts = self.ip_attempts.write().await;
        let now = Utc::now();
        let cutoff = now - Duration::minutes(IP_WINDOW_MINUTES);

        let ip_attempts = attempts.entry(ip).or_insert_with(Vec::new);

        // Remove requests outside the window
        ip_attempts.retain(|time| *time > cutoff);

        ip_attempts.len() >= IP_REQUEST_LIMIT
    }

    /// Record a login request from an IP
    pub async fn record_ip_request(&self, ip: IpAddr) {
        let mut attempts = self.ip_attempts.write().await;
        let now = Utc::now();

        let ip_attempts = attempts.entry(ip).or_insert_with(Vec::new);
        ip_attempts.push(now);
    }

    /// Clean up old entries (should be called periodically)
    pub async fn cleanup(&self) {
        let now = Utc::now();
        let email_cutoff = now - Duration::minutes(EMAIL_WINDOW_MINUTES);
        let ip_cutoff = now - Duration::minutes(IP_WINDOW_MINUTES);

        {
            let mut attempts = self.email_attempts.write().await;
            attempts.retain(|_, times| {
                times.retain(|time| *time > email_cutoff);
                !times.is_empty()
            });
        }

        {
            let mut attempts = self.ip_attempts.write().await;
            attempts.retain(|_, times| {
                times.retain(|time| *time > ip_cutoff);
                !times.is_empty()
            });
        }
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[tokio::test]
    async fn test_email_rate_limit() {
        let limiter = LoginRateLimiter::new();

        // First 4 attempts should not be limited
        for _ in 0..4 {
            assert!(!limiter.is_email_limited("user@example.com").await);
            limiter.record_failed_attempt("user@example.com").await;
        }

        limiter.record_failed_attempt("user@example.com").await;

        // 5 attempts recorded, should now be limited
        assert!(limiter.is_email_limited("user@example.com").await);

        limiter.clear_email_attempts("user@example.com").await;
        assert!(!limiter.is_email_limited("user@example.com").await);
    }

    #[tokio::test]
    async fn test_ip_rate_limit() {
        let limiter = LoginRateLimiter::new();
        let ip = IpAddr::from_str("127.0.0.1").unwrap();

        // First 9 requests should not be limited
        for _ in 0..9 {
            assert!(!limiter.is_ip_limited(ip).await);
            limiter.record_ip_request(ip).await;
        }

        limiter.record_ip_request(ip).await;

        // 10 requests recorded, should now be limited
        assert!(limiter.is_ip_limited(ip).await);
    }

    #[tokio::test]
    async fn test_case_insensitive_email() {
        let limiter = LoginRateLimiter::new();

        limiter.record_failed_attempt("User@Example.com").await;
        limiter.record_failed_attempt("user@example.com").await;
        limiter.record_failed_attempt("USER@EXAMPLE.COM").await;

        // All count against the same account
        assert!(!limiter.is_email_limited("user@example.com").await);
        limiter.record_failed_attempt("user@example.com").await;
        limiter.record_failed_attempt("user@example.com").await;
        assert!(limiter.is_email_limited("User@Example.com").await);
    }

    #[tokio::test]
    async fn test_emails_limited_independently() {
        let limiter = LoginRateLimiter::new();

        for _ in 0..5 {
            limiter.record_failed_attempt("first@example.com").await;
        }

        assert!(limiter.is_email_limited("first@example.com").await);
        assert!(!limiter.is_email_limited("second@example.com").await);
    }
}

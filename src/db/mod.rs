//! Database layer
//!
//! SQLite-backed storage for accounts, sessions and login logs.
//!
//! # Usage
//!
//! ```ignore
//! use parley::config::DatabaseConfig;
//! use parley::db::{create_pool, migrations};
//!
//! let config = DatabaseConfig::default();
//! let pool = create_pool(&config).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};

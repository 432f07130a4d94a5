//! Parley - a self-hosted chat backend for Ollama
//!
//! Session-cookie authentication (with guest accounts), a logical
//! model catalog, and a thin proxy that relays chat requests to a
//! local Ollama instance.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod provider;
pub mod services;

//! Shared types and configuration for the rewards wallet.
//!
//! This crate provides common pieces used across all other crates:
//! - Typed user identifiers
//! - Application configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
pub use types::{InvalidUserId, UserId};

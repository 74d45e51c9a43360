//! Configuration for the chat-tabs tab registry and persistence layer.
//!
//! This crate provides:
//!
//! - `TabsConfig`: storage key, storage location and write strategy
//! - `WriteMode`: inline vs background persistence writes
//! - `ConfigError`: typed failures for config I/O and validation

pub mod config;
pub mod error;

pub use config::{DEFAULT_STORAGE_KEY, TabsConfig, WriteMode};
pub use error::ConfigError;

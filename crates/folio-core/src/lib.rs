//! Folio Core Library
//!
//! This crate provides the domain models, error types, configuration, and validation
//! shared by the Folio storage, database, service, and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{CleanupConfig, Config, StorageConfig, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
// Storage, StorageError and StorageResult live in folio-storage

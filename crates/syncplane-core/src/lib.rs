//! SyncPlane Core Library
//!
//! This crate provides the domain models, stored enum mapping, catalog documents with their
//! protocol-version migration, error types and configuration shared by all SyncPlane crates.

pub mod catalog;
pub mod config;
pub mod enums;
pub mod error;
pub mod models;
pub mod version;

// Re-export commonly used types
pub use catalog::CatalogMigrationMode;
pub use config::PersistenceConfig;
pub use enums::{EnumDecodeError, StoredEnum};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use version::{ProtocolVersion, Version};

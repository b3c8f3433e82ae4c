//! Data models for the control plane configuration
//!
//! Each sub-module represents one area of the stored configuration.

mod actor_catalog;
mod actor_definition;
mod connection;
mod organization;
mod permission;
mod user;

pub use actor_catalog::*;
pub use actor_definition::*;
pub use connection::*;
pub use organization::*;
pub use permission::*;
pub use user::*;

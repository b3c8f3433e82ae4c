//! Read-side repositories for connections, connector definitions and discovered catalogs.
//!
//! Each read loads the main row plus its dependent rows and hands them to
//! [`crate::db::converter`]; a row that cannot be mapped fails the whole read.

pub mod actor_catalog;
pub mod actor_definition;
pub mod connection;

pub use actor_catalog::ActorCatalogRepository;
pub use actor_definition::ActorDefinitionRepository;
pub use connection::ConnectionRepository;

//! Database repositories for the data access layer
//!
//! Repositories are organized into control/ (organizations, users, permissions) and
//! connector/ (connections, connector definitions, catalogs). Rows are read into the shapes in
//! [`rows`] and turned into domain values by [`converter`].
//
// Organization, user and permission repositories
pub mod control;
//
// Connection, definition and catalog repositories
pub mod connector;
//
// Row-to-domain mapping
pub mod converter;
//
// Row shapes
pub mod rows;
//
// Transaction utilities
pub mod transaction;
//
// Constraint violation mapping
pub(crate) mod constraint;

pub use connector::{ActorCatalogRepository, ActorDefinitionRepository, ConnectionRepository};
pub use control::{OrganizationRepository, PermissionRepository, UserRepository};
pub use converter::ConverterContext;
pub use transaction::TransactionGuard;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::AirbyteCatalog;

/// Catalog discovered from a source, deduplicated by hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorCatalog {
    pub id: Uuid,
    pub catalog: AirbyteCatalog,
    pub catalog_hash: String,
}

/// [`ActorCatalog`] with the time of the discovery that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorCatalogWithUpdatedAt {
    pub id: Uuid,
    pub catalog: AirbyteCatalog,
    pub catalog_hash: String,
    /// Epoch seconds, UTC
    pub updated_at: i64,
}

/// One discovery run of an actor that resolved to a stored catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorCatalogFetchEvent {
    pub actor_id: Uuid,
    pub actor_catalog_id: Uuid,
    /// Epoch seconds, UTC
    pub created_at: i64,
}

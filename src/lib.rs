//! Event Mesh Catalog Sync
//!
//! Synchronizes the topology of a Knative event mesh (brokers and event
//! types with producer/consumer relationships) into an external software
//! catalog graph, and resolves declared consumer identifiers into
//! bidirectional relation edges.
//!
//! # Architecture
//!
//! Data flows through three stages:
//!
//! - [`mesh`] fetches the raw topology snapshot from the configured
//!   control plane endpoint.
//! - [`provider`] maps every raw record into a canonical catalog entity
//!   and submits the complete set as one `full` mutation keyed by the
//!   provider's location key, on a recurring schedule. Repeated runs
//!   replace the catalog's view of the source, so entities missing from
//!   a new snapshot are retracted.
//! - [`processor`] resolves each admitted event-type entity's consumer
//!   identifiers to concrete components through the catalog's paginated
//!   search and emits `apiConsumedBy`/`consumesApi` edge pairs.
//!
//! The catalog itself (storage, schema validation, relation indexing) is
//! an external collaborator behind [`catalog::CatalogStore`].
//!
//! # Example
//!
//! ```no_run
//! use eventmesh_sync::catalog::client::HttpCatalogStore;
//! use eventmesh_sync::config::{ProviderConfig, ScheduleDefinition};
//! use eventmesh_sync::provider::EventMeshProvider;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(HttpCatalogStore::new("http://catalog.example.com/api", None)?);
//! let configs = vec![ProviderConfig {
//!     id: "dev".to_string(),
//!     base_url: "http://eventmesh.dev.example.com".to_string(),
//!     token: None,
//!     schedule: Some(ScheduleDefinition::every_seconds(60)),
//! }];
//!
//! for provider in EventMeshProvider::from_configs(&configs, store, None)? {
//!     Arc::new(provider).start();
//! }
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod catalog;
pub mod config;
pub mod mesh;
pub mod processor;
pub mod provider;

// Re-export main types for convenience
pub use catalog::{
    CatalogError, CatalogResult, CatalogStore, EntityMutation, EntityQuery, EntityRef,
    GraphEntity, ProcessorResult, QueryResponse, Relation, RelationType,
};

pub use config::{
    AppConfig, CatalogConfig, ConfigError, ConfigResult, ProviderConfig, ScheduleDefinition,
};

pub use mesh::{Broker, EventType, MeshError, MeshResult, TopologySnapshot, TopologySource};

pub use processor::{EventMeshProcessor, DEFAULT_QUERY_PAGE_LIMIT};

pub use provider::{EventMeshProvider, SyncError, SyncResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

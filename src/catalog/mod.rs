//! Catalog-side data model and store access
//!
//! Types mirroring the catalog's entity schema (API and Component kinds),
//! the relation edges emitted by the processor, and the [`CatalogStore`]
//! trait covering the two store capabilities this crate consumes:
//! full-set mutation and paginated entity search.

pub mod client;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Schema version stamped on every entity this crate produces
pub const API_VERSION: &str = "catalog.io/v1alpha1";

/// Annotation recording where the entity is currently managed from
pub const ANNOTATION_LOCATION: &str = "catalog.io/managed-by-location";

/// Annotation recording where the entity originally came from
pub const ANNOTATION_ORIGIN_LOCATION: &str = "catalog.io/managed-by-origin-location";

/// Annotation carrying the workload identifier components are looked up by
pub const ANNOTATION_CONSUMER_ID: &str = "catalog.io/kubernetes-id";

/// Catalog access errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Entity query failed (network, status or decode)
    #[error("catalog query error: {0}")]
    Query(String),

    /// Mutation submission failed
    #[error("catalog mutation error: {0}")]
    Mutation(String),

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Client(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Address of an entity in the catalog graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: RefKind,
    pub namespace: String,
    pub name: String,
}

/// Entity kind referenced by a relation endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefKind {
    #[serde(rename = "API")]
    Api,
    Component,
}

/// External link attached to entity metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityLink {
    pub title: String,
    pub icon: String,
    pub url: String,
}

/// Common metadata block carried by every catalog entity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub labels: IndexMap<String, String>,
    #[serde(default)]
    pub annotations: IndexMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub links: Vec<EntityLink>,
    /// Identifiers of components expected to consume this entity.
    /// Kept in metadata so the processor can resolve them without
    /// re-fetching the source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumed_by: Vec<String>,
}

/// Declared type of an API entity's spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApiSpecType {
    EventType,
    /// API entities registered by other sources; never processed here
    Other,
}

impl From<String> for ApiSpecType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "eventType" => ApiSpecType::EventType,
            _ => ApiSpecType::Other,
        }
    }
}

impl From<ApiSpecType> for String {
    fn from(value: ApiSpecType) -> Self {
        match value {
            ApiSpecType::EventType => "eventType".to_string(),
            ApiSpecType::Other => "unknown".to_string(),
        }
    }
}

/// Spec block of an API entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSpec {
    #[serde(rename = "type")]
    pub spec_type: ApiSpecType,
    #[serde(default)]
    pub lifecycle: String,
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub definition: String,
}

/// Spec block of a Component entity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    #[serde(rename = "type", default)]
    pub spec_type: String,
    #[serde(default)]
    pub lifecycle: String,
    #[serde(default)]
    pub system: String,
    #[serde(default)]
    pub owner: String,
    /// `api:<namespace>/<name>` references to the APIs this component provides
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides_apis: Vec<String>,
}

/// API-kind entity body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEntity {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub metadata: EntityMetadata,
    pub spec: ApiSpec,
}

/// Component-kind entity body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentEntity {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub metadata: EntityMetadata,
    pub spec: ComponentSpec,
}

/// A catalog entity, closed over the two kinds this crate works with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum GraphEntity {
    #[serde(rename = "API")]
    Api(ApiEntity),
    Component(ComponentEntity),
}

impl GraphEntity {
    pub fn metadata(&self) -> &EntityMetadata {
        match self {
            GraphEntity::Api(api) => &api.metadata,
            GraphEntity::Component(component) => &component.metadata,
        }
    }
}

/// Type of a relation edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationType {
    ApiConsumedBy,
    ConsumesApi,
}

/// Directed typed edge between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    pub source: EntityRef,
    pub target: EntityRef,
}

/// Result record handed to the store's relation indexer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProcessorResult {
    Relation { relation: Relation },
}

/// An entity tagged with the location key attributing it to its source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocatedEntity {
    pub entity: GraphEntity,
    pub location_key: String,
}

/// Mutation submitted to the store. `Full` replaces every entity
/// previously registered under the same location key with exactly the
/// given set, so entities missing from the source are retracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EntityMutation {
    Full { entities: Vec<LocatedEntity> },
}

/// Filter of a component-by-consumer-identifier query. The annotation
/// field name must stay in sync with [`ANNOTATION_CONSUMER_ID`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFilter {
    pub kind: String,
    #[serde(rename = "metadata.namespace")]
    pub namespace: String,
    #[serde(rename = "metadata.annotations.catalog.io/kubernetes-id")]
    pub consumer_id: String,
}

impl EntityFilter {
    /// Components in `namespace` annotated with the given workload identifier
    pub fn component_consumer(namespace: &str, consumer_id: &str) -> Self {
        EntityFilter {
            kind: "component".to_string(),
            namespace: namespace.to_string(),
            consumer_id: consumer_id.to_string(),
        }
    }
}

/// One page request against the store's entity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityQuery {
    pub filter: EntityFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    pub limit: usize,
}

/// Pagination info carried by a query response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// One page of query results
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub items: Vec<GraphEntity>,
    #[serde(default)]
    pub page_info: PageInfo,
}

/// The two store capabilities this crate consumes. Implemented over HTTP
/// by [`client::HttpCatalogStore`]; tests substitute in-memory fakes.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Submit one mutation against the store
    async fn apply_mutation(&self, mutation: EntityMutation) -> CatalogResult<()>;

    /// Fetch one page of entities matching the query
    async fn query_entities(&self, query: EntityQuery) -> CatalogResult<QueryResponse>;
}

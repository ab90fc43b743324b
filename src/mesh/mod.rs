//! Event mesh topology model
//!
//! The raw records served by the event mesh control plane: event types,
//! brokers and the full snapshot both arrive in. A snapshot is the unit
//! of truth per sync tick; there is no partial-snapshot concept.

pub mod client;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Topology fetch errors
#[derive(Error, Debug)]
pub enum MeshError {
    /// Transport failure or non-success status from the topology endpoint
    #[error("failed to fetch topology from {url}: {message}")]
    Fetch {
        url: String,
        message: String,
        status: Option<u16>,
    },

    /// Response body is not a well-formed snapshot
    #[error("failed to decode topology snapshot: {0}")]
    Decode(String),

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Client(String),
}

pub type MeshResult<T> = Result<T, MeshError>;

/// An event type registered in the mesh
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventType {
    pub name: String,
    pub namespace: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_data: Option<String>,
    #[serde(rename = "schemaURL", default, skip_serializing_if = "Option::is_none")]
    pub schema_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<IndexMap<String, String>>,
    /// Workload identifiers of the components consuming this event type,
    /// resolved to concrete entities later by the processor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_by: Option<Vec<String>>,
}

/// A broker registered in the mesh
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broker {
    pub name: String,
    pub namespace: String,
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<IndexMap<String, String>>,
    /// `namespace/name` references to the event types this broker provides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provided_event_types: Option<Vec<String>>,
}

/// Full topology snapshot, fetched as a whole each sync tick
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologySnapshot {
    #[serde(default)]
    pub event_types: Vec<EventType>,
    #[serde(default)]
    pub brokers: Vec<Broker>,
}

/// Source of topology snapshots. Implemented over HTTP by
/// [`client::HttpTopologySource`]; tests substitute static fakes.
#[async_trait]
pub trait TopologySource: Send + Sync {
    async fn fetch(&self) -> MeshResult<TopologySnapshot>;
}

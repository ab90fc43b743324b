//! HTTP client for the event mesh topology endpoint

use crate::mesh::{MeshError, MeshResult, TopologySnapshot, TopologySource};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Fetches the topology snapshot with a single `GET <baseUrl>`. An
/// optional bearer token covers control planes running behind the
/// auth-token middleware.
pub struct HttpTopologySource {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpTopologySource {
    pub fn new(base_url: &str, token: Option<String>) -> MeshResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MeshError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            token,
        })
    }
}

#[async_trait]
impl TopologySource for HttpTopologySource {
    async fn fetch(&self) -> MeshResult<TopologySnapshot> {
        let mut req = self.client.get(&self.base_url);
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let resp = req.send().await.map_err(|e| MeshError::Fetch {
            url: self.base_url.clone(),
            message: e.to_string(),
            status: e.status().map(|s| s.as_u16()),
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MeshError::Fetch {
                url: self.base_url.clone(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
                status: Some(status.as_u16()),
            });
        }

        resp.json::<TopologySnapshot>()
            .await
            .map_err(|e| MeshError::Decode(e.to_string()))
    }
}

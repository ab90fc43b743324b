//! HTTP client for the catalog store API

use crate::catalog::{
    CatalogError, CatalogResult, CatalogStore, EntityMutation, EntityQuery, QueryResponse,
};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Store client speaking the catalog's HTTP API: `POST /entities/by-query`
/// for paginated search and `POST /mutations` for full-set mutations.
pub struct HttpCatalogStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCatalogStore {
    pub fn new(base_url: &str, token: Option<String>) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CatalogError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn request(&self, url: &str, body: &impl serde::Serialize) -> reqwest::RequestBuilder {
        let mut req = self.client.post(url).json(body);
        if let Some(token) = &self.token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }
}

#[async_trait]
impl CatalogStore for HttpCatalogStore {
    async fn apply_mutation(&self, mutation: EntityMutation) -> CatalogResult<()> {
        let url = format!("{}/mutations", self.base_url);
        let resp = self
            .request(&url, &mutation)
            .send()
            .await
            .map_err(|e| CatalogError::Mutation(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CatalogError::Mutation(format!(
                "catalog returned status {}",
                resp.status()
            )));
        }
        Ok(())
    }

    async fn query_entities(&self, query: EntityQuery) -> CatalogResult<QueryResponse> {
        let url = format!("{}/entities/by-query", self.base_url);
        let resp = self
            .request(&url, &query)
            .send()
            .await
            .map_err(|e| CatalogError::Query(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CatalogError::Query(format!(
                "catalog returned status {}",
                resp.status()
            )));
        }

        resp.json::<QueryResponse>()
            .await
            .map_err(|e| CatalogError::Query(e.to_string()))
    }
}

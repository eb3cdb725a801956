//! Chroma HTTP (v2) adapter for the vector index

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::OnceCell;

use super::VectorIndex;
use crate::config::IndexConfig;
use crate::error::{Result, Upstream};
use crate::http::{build_client, parse_json_response, send_error};
use crate::types::{DocumentMetadata, RawHit};

type MetadataMap = HashMap<String, serde_json::Value>;

pub struct ChromaIndex {
    config: IndexConfig,
    client: Client,
    collection_id: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct CollectionResponse {
    id: String,
}

/// One list per query embedding submitted
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<MetadataMap>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f32>>>>,
}

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(default)]
    documents: Option<Vec<Option<String>>>,
    #[serde(default)]
    metadatas: Option<Vec<Option<MetadataMap>>>,
}

impl ChromaIndex {
    pub fn new(config: IndexConfig) -> Result<Self> {
        let client = build_client(Upstream::VectorIndex)?;
        tracing::info!(
            url = %config.url,
            tenant = %config.tenant,
            database = %config.database,
            collection = %config.collection,
            "Creating Chroma index client"
        );
        Ok(Self {
            config,
            client,
            collection_id: OnceCell::new(),
        })
    }

    fn database_url(&self) -> String {
        format!(
            "{}/api/v2/tenants/{}/databases/{}",
            self.config.url.trim_end_matches('/'),
            self.config.tenant,
            self.config.database
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header("x-chroma-token", key),
            None => request,
        }
    }

    async fn collection_id(&self) -> Result<&str> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let endpoint = format!(
                    "{}/collections/{}",
                    self.database_url(),
                    self.config.collection
                );
                let response = self
                    .authorize(self.client.get(&endpoint))
                    .send()
                    .await
                    .map_err(|e| send_error(Upstream::VectorIndex, &endpoint, e))?;
                let collection: CollectionResponse =
                    parse_json_response(response, &endpoint, Upstream::VectorIndex).await?;
                tracing::debug!(id = %collection.id, "Resolved Chroma collection");
                Ok::<_, crate::error::Error>(collection.id)
            })
            .await?;
        Ok(id.as_str())
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        operation: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let id = self.collection_id().await?;
        let endpoint = format!("{}/collections/{}/{}", self.database_url(), id, operation);
        let response = self
            .authorize(self.client.post(&endpoint))
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(Upstream::VectorIndex, &endpoint, e))?;
        parse_json_response(response, &endpoint, Upstream::VectorIndex).await
    }
}

fn into_hit(document: Option<String>, metadata: Option<MetadataMap>, distance: f32) -> RawHit {
    RawHit {
        text: document.unwrap_or_default(),
        metadata: metadata
            .map(DocumentMetadata::from_json_map)
            .unwrap_or_default(),
        distance,
    }
}

/// Zip the parallel arrays for the first (only) query embedding.
fn hits_from_query(response: QueryResponse) -> Vec<RawHit> {
    let documents = response
        .documents
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default();
    let mut metadatas = response
        .metadatas
        .and_then(|m| m.into_iter().next())
        .unwrap_or_default()
        .into_iter();
    let mut distances = response
        .distances
        .and_then(|d| d.into_iter().next())
        .unwrap_or_default()
        .into_iter();

    documents
        .into_iter()
        .map(|document| {
            let metadata = metadatas.next().flatten();
            let distance = distances.next().flatten().unwrap_or(f32::NAN);
            into_hit(document, metadata, distance)
        })
        .collect()
}

fn hits_from_get(response: GetResponse) -> Vec<RawHit> {
    let mut metadatas = response.metadatas.unwrap_or_default().into_iter();
    response
        .documents
        .unwrap_or_default()
        .into_iter()
        .map(|document| into_hit(document, metadatas.next().flatten(), 0.0))
        .collect()
}

#[async_trait]
impl VectorIndex for ChromaIndex {
    async fn query(&self, embedding: &[f32], n_results: usize) -> Result<Vec<RawHit>> {
        let body = json!({
            "query_embeddings": [embedding],
            "n_results": n_results,
            "include": ["documents", "metadatas", "distances"],
        });
        let response: QueryResponse = self.post("query", body).await?;
        Ok(hits_from_query(response))
    }

    async fn sample(&self, limit: usize) -> Result<Vec<RawHit>> {
        let body = json!({
            "limit": limit,
            "include": ["documents", "metadatas"],
        });
        let response: GetResponse = self.post("get", body).await?;
        Ok(hits_from_get(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_response_zips_parallel_arrays() {
        let response: QueryResponse = serde_json::from_value(json!({
            "ids": [["a", "b", "c"]],
            "documents": [["first", null, "third"]],
            "metadatas": [[{"lang": "en", "topic": "contract_law"}, null, {"lang": "ur"}]],
            "distances": [[0.25, 0.5, null]],
            "embeddings": null
        }))
        .unwrap();

        let hits = hits_from_query(response);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].text, "first");
        assert_eq!(hits[0].metadata.topic.as_deref(), Some("contract_law"));
        assert_eq!(hits[0].distance, 0.25);
        assert_eq!(hits[1].text, "");
        assert_eq!(hits[1].metadata, DocumentMetadata::default());
        assert_eq!(hits[2].metadata.lang, "ur");
        assert!(hits[2].distance.is_nan());
    }

    #[test]
    fn test_query_response_without_results() {
        let response: QueryResponse = serde_json::from_value(json!({
            "ids": [[]],
            "documents": [[]],
            "metadatas": [[]],
            "distances": [[]]
        }))
        .unwrap();
        assert!(hits_from_query(response).is_empty());

        let response: QueryResponse = serde_json::from_value(json!({})).unwrap();
        assert!(hits_from_query(response).is_empty());
    }

    #[test]
    fn test_get_response_has_zero_distance() {
        let response: GetResponse = serde_json::from_value(json!({
            "ids": ["doc_1", "doc_2"],
            "documents": ["contract law", "property transfer"],
            "metadatas": [{"lang": "en", "topic": "contract_law"}]
        }))
        .unwrap();

        let hits = hits_from_get(response);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.distance == 0.0));
        assert_eq!(hits[0].metadata.lang, "en");
        assert_eq!(hits[1].metadata.lang, "");
    }

    #[test]
    fn test_database_url_trims_trailing_slash() {
        let index = ChromaIndex::new(IndexConfig {
            url: "http://localhost:8000/".to_string(),
            tenant: "t".to_string(),
            database: "d".to_string(),
            ..IndexConfig::default()
        })
        .unwrap();
        assert_eq!(
            index.database_url(),
            "http://localhost:8000/api/v2/tenants/t/databases/d"
        );
    }
}

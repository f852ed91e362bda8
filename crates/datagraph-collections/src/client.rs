//! REST client for the collection backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::{
    errors::{CollectionError, CollectionResult},
    model::{
        CollectionPage, CreateCollection, DatasetDetail, ListQuery, PathItem, SyncResult,
        UpdateCollection,
    },
};

/// Collection operations offered by the backend.
#[async_trait]
pub trait CollectionApi: Send + Sync {
    /// One page of collections under a parent folder, filtered by search text.
    async fn list(&self, query: ListQuery) -> CollectionResult<CollectionPage>;

    /// Breadcrumb path from the dataset root to `parent_id`.
    async fn get_path(&self, parent_id: &str) -> CollectionResult<Vec<PathItem>>;

    /// Creates a collection and returns its id.
    async fn create(&self, request: CreateCollection) -> CollectionResult<String>;

    async fn update(&self, request: UpdateCollection) -> CollectionResult<()>;

    async fn delete(&self, id: &str) -> CollectionResult<()>;

    /// Starts an external sync of a link collection.
    async fn sync(&self, id: &str) -> CollectionResult<SyncResult>;

    async fn dataset_detail(&self, dataset_id: &str) -> CollectionResult<DatasetDetail>;
}

/// Configuration for the REST collection client
#[derive(Debug, Clone)]
pub struct CollectionClientConfig {
    /// Base URL of the backend API, without trailing slash
    pub service_url: String,
    /// Timeout in seconds for HTTP requests
    pub timeout_secs: u64,
}

impl Default for CollectionClientConfig {
    fn default() -> Self {
        Self {
            service_url: "http://localhost:3000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

impl CollectionClientConfig {
    /// Reads `COLLECTION_API_URL` and `COLLECTION_API_TIMEOUT_SECS` over the defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("COLLECTION_API_URL") {
            config.service_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(timeout) = std::env::var("COLLECTION_API_TIMEOUT_SECS") {
            match timeout.parse() {
                Ok(secs) => config.timeout_secs = secs,
                Err(_) => warn!("Invalid COLLECTION_API_TIMEOUT_SECS value: {}", timeout),
            }
        }
        config
    }
}

/// Response envelope used by every backend route
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
struct ApiResponse<T> {
    code: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SyncRequest<'a> {
    collection_id: &'a str,
}

/// Client for the collection backend over HTTP
#[derive(Debug, Clone)]
pub struct RestCollectionApi {
    config: CollectionClientConfig,
    client: Client,
}

impl RestCollectionApi {
    pub fn new(config: CollectionClientConfig) -> CollectionResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CollectionError::Communication(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.service_url, path)
    }

    /// Maps a transport error to a CollectionError
    fn map_http_error(error: reqwest::Error) -> CollectionError {
        if error.is_timeout() {
            CollectionError::Communication(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            CollectionError::Communication(format!("Connection error: {}", error))
        } else {
            CollectionError::Communication(format!("HTTP error: {}", error))
        }
    }

    /// Sends the request and unwraps the envelope, returning its `data`.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> CollectionResult<Option<T>> {
        let response = request.send().await.map_err(Self::map_http_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| format!("HTTP error: {}", status));
            return Err(CollectionError::Http { status: status.as_u16(), body });
        }

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| CollectionError::Decode(format!("Failed to parse response: {}", e)))?;

        if envelope.code != 200 {
            return Err(CollectionError::Api {
                code: envelope.code,
                message: envelope.message,
            });
        }
        Ok(envelope.data)
    }

    async fn send_for_data<T: DeserializeOwned>(&self, request: RequestBuilder) -> CollectionResult<T> {
        self.send(request)
            .await?
            .ok_or_else(|| CollectionError::Decode("Response carried no data".to_string()))
    }
}

#[async_trait]
impl CollectionApi for RestCollectionApi {
    #[instrument(skip(self), fields(page_num = query.page_num))]
    async fn list(&self, query: ListQuery) -> CollectionResult<CollectionPage> {
        debug!("Listing collections under {:?}", query.parent_id);
        let request = self.client.post(self.url("/core/dataset/collection/list")).json(&query);
        self.send_for_data(request).await
    }

    #[instrument(skip(self))]
    async fn get_path(&self, parent_id: &str) -> CollectionResult<Vec<PathItem>> {
        if parent_id.is_empty() {
            return Ok(Vec::new());
        }
        let request = self
            .client
            .get(self.url("/core/dataset/collection/paths"))
            .query(&[("parentId", parent_id)]);
        Ok(self.send(request).await?.unwrap_or_default())
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create(&self, request: CreateCollection) -> CollectionResult<String> {
        if request.name.trim().is_empty() {
            return Err(CollectionError::Validation("Collection name cannot be empty".to_string()));
        }
        let request = self.client.post(self.url("/core/dataset/collection/create")).json(&request);
        self.send_for_data(request).await
    }

    #[instrument(skip(self, request), fields(id = %request.id))]
    async fn update(&self, request: UpdateCollection) -> CollectionResult<()> {
        let request = self.client.post(self.url("/core/dataset/collection/update")).json(&request);
        self.send::<serde_json::Value>(request).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> CollectionResult<()> {
        let request = self
            .client
            .delete(self.url("/core/dataset/collection/delete"))
            .query(&[("id", id)]);
        self.send::<serde_json::Value>(request).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn sync(&self, id: &str) -> CollectionResult<SyncResult> {
        let request = self
            .client
            .post(self.url("/core/dataset/collection/sync/link"))
            .json(&SyncRequest { collection_id: id });
        self.send_for_data(request).await
    }

    #[instrument(skip(self))]
    async fn dataset_detail(&self, dataset_id: &str) -> CollectionResult<DatasetDetail> {
        let request = self
            .client
            .get(self.url("/core/dataset/detail"))
            .query(&[("id", dataset_id)]);
        self.send_for_data(request).await
    }
}

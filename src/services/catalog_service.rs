use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::models::product::Product;
use crate::models::tour::{Tour, TourRecord};

#[derive(Debug)]
pub enum CatalogError {
    RequestError(String),
    ApiError(String),
    /// A tour row carried malformed slot-type/slot-field JSON. Surfaced
    /// as a structured error instead of reaching a render path.
    BadTourConfig(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::RequestError(err) => write!(f, "Request error: {}", err),
            CatalogError::ApiError(err) => write!(f, "API error: {}", err),
            CatalogError::BadTourConfig(err) => write!(f, "Bad tour configuration: {}", err),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Read-only tour/product catalog access.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn fetch_tours(&self) -> Result<Vec<Tour>, CatalogError>;
    async fn fetch_tour(&self, tour_id: &str) -> Result<Option<Tour>, CatalogError>;
    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError>;
}

pub struct HttpCatalogClient {
    config: BackendConfig,
    client: reqwest::Client,
}

impl HttpCatalogClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, CatalogError> {
        self.client
            .get(self.config.endpoint(path))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .send()
            .await
            .map_err(|e| CatalogError::RequestError(e.to_string()))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_tours(&self) -> Result<Vec<Tour>, CatalogError> {
        let response = self.get("tours").await?;
        if !response.status().is_success() {
            return Err(CatalogError::ApiError(format!(
                "Status: {}",
                response.status()
            )));
        }

        let records = response
            .json::<Vec<TourRecord>>()
            .await
            .map_err(|e| CatalogError::ApiError(e.to_string()))?;

        records
            .into_iter()
            .map(|record| {
                record
                    .into_tour()
                    .map_err(|e| CatalogError::BadTourConfig(e.to_string()))
            })
            .collect()
    }

    async fn fetch_tour(&self, tour_id: &str) -> Result<Option<Tour>, CatalogError> {
        let response = self.get(&format!("tours/{}", tour_id)).await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(CatalogError::ApiError(format!(
                "Status: {}",
                response.status()
            )));
        }

        let record = response
            .json::<TourRecord>()
            .await
            .map_err(|e| CatalogError::ApiError(e.to_string()))?;

        record
            .into_tour()
            .map(Some)
            .map_err(|e| CatalogError::BadTourConfig(e.to_string()))
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let response = self.get("products").await?;
        if !response.status().is_success() {
            return Err(CatalogError::ApiError(format!(
                "Status: {}",
                response.status()
            )));
        }

        response
            .json::<Vec<Product>>()
            .await
            .map_err(|e| CatalogError::ApiError(e.to_string()))
    }
}

//! Where the service list comes from.
//!
//! Every source is re-read on each [`CatalogSource::load`], so edits to the
//! backing document take effect on the next tool call without a restart.

use crate::error::CatalogError;
use crate::service::{Catalog, Service};
use async_trait::async_trait;
use spa_receptionist_core::Result;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};

/// A source of the current service list.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Loads the current list of services.
    async fn load(&self) -> Result<Vec<Service>, CatalogError>;
}

fn parse(location: &str, document: &str) -> Result<Vec<Service>, CatalogError> {
    let catalog = Catalog::from_json(document).map_err(|e| CatalogError::InvalidDocument {
        location: location.to_string(),
        details: e.to_string(),
    })?;
    Ok(catalog.services)
}

/// Catalog document stored on local disk.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalog {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Vec<Service>, CatalogError> {
        let location = self.path.display().to_string();
        let document = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CatalogError::ReadFailed {
                location: location.clone(),
                details: e.to_string(),
            })?;

        let services = parse(&location, &document)?;
        debug!(count = services.len(), "loaded catalog");
        Ok(services)
    }
}

/// Catalog document served over HTTP, e.g. from an object-storage bucket.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    http: reqwest::Client,
    url: String,
}

impl HttpCatalog {
    /// Creates a source fetching `url`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::InvalidConfig {
                details: e.to_string(),
            })?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn load(&self) -> Result<Vec<Service>, CatalogError> {
        let read_failed = |e: reqwest::Error| CatalogError::ReadFailed {
            location: self.url.clone(),
            details: e.to_string(),
        };

        let document = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(read_failed)?
            .text()
            .await
            .map_err(read_failed)?;

        let services = parse(&self.url, &document)?;
        debug!(count = services.len(), "loaded catalog");
        Ok(services)
    }
}

/// Fixed in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    services: Vec<Service>,
}

impl StaticCatalog {
    #[must_use]
    pub fn new(services: Vec<Service>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn load(&self) -> Result<Vec<Service>, CatalogError> {
        Ok(self.services.clone())
    }
}

use super::naming::{HashedName, NamingStrategy};
use super::route::{self, Endpoint};
use super::{read_local_file, require_path, StorageService};
use crate::models::{Config, ListingEntry, Upload};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_LENGTH};
use reqwest::{redirect, Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::path::Path;

const ACCESS_KEY_HEADER: &str = "accesskey";
const JSON: &str = "application/json";

/// HTTP client for one storage zone and its pull zone.
///
/// Holds no state besides configuration, so a single instance can be shared
/// across tasks.
pub struct StorageClient {
    client: Client,
    config: Config,
    naming: Box<dyn NamingStrategy>,
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StorageClient {
    /// Build a client without touching the network.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .connection_verbose(config.debug)
            .build()?;

        Ok(Self {
            client,
            config,
            naming: Box::new(HashedName),
        })
    }

    /// Build a client and check that the administrative API answers.
    pub async fn connect(config: Config) -> Result<Self> {
        let client = Self::new(config)?;

        match client.ping().await {
            Ok(true) => Ok(client),
            Ok(false) => Err(Error::ServiceUnavailable {
                message: "connectivity check was rejected by the API".to_string(),
                source: None,
            }),
            Err(Error::Transport(e)) => Err(Error::ServiceUnavailable {
                message: "could not reach the API".to_string(),
                source: Some(e),
            }),
            Err(e) => Err(e),
        }
    }

    pub fn with_naming(mut self, naming: Box<dyn NamingStrategy>) -> Self {
        self.naming = naming;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn request(&self, method: Method, endpoint: Endpoint, url: &str) -> RequestBuilder {
        tracing::debug!("{} {}", method, url);
        let route = self.config.route(endpoint);
        self.client
            .request(method, url)
            .header(ACCESS_KEY_HEADER, route.access_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request.send().await.map_err(|e| {
            tracing::error!("Request to storage API failed: {}", e);
            Error::Transport(e)
        })
    }

    /// HEAD a stored file, treating transport failures as "no answer".
    async fn probe(&self, path: &str) -> Option<Response> {
        let url = route::storage_url(&self.config, path);
        let request = self
            .request(Method::HEAD, Endpoint::Storage, &url)
            .header(ACCEPT, JSON);

        match request.send().await {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::warn!("HEAD {} failed: {}", path, e);
                None
            }
        }
    }
}

fn check_status(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(path.to_string()));
    }
    if status.as_u16() >= 400 {
        tracing::error!("Storage API error (status {}) for {}", status, path);
        return Err(Error::Response {
            status: status.as_u16(),
            path: path.to_string(),
        });
    }
    Ok(response)
}

#[async_trait]
impl StorageService for StorageClient {
    async fn ping(&self) -> Result<bool> {
        let url = route::admin_url(&self.config, "statistics");
        let response = self
            .send(
                self.request(Method::HEAD, Endpoint::Admin, &url)
                    .header(ACCEPT, JSON),
            )
            .await?;

        Ok(response.status().is_success())
    }

    async fn list(&self, path: &str) -> Result<Vec<ListingEntry>> {
        let url = route::storage_url(&self.config, path);
        let response = self
            .send(
                self.request(Method::GET, Endpoint::Storage, &url)
                    .header(ACCEPT, JSON),
            )
            .await?;
        let response = check_status(response, path)?;
        if !response.status().is_success() {
            tracing::error!(
                "Unexpected listing status {} for '{}'",
                response.status(),
                path
            );
            return Err(Error::Response {
                status: response.status().as_u16(),
                path: path.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse listing for '{}': {}", path, e);
            Error::Serialization(e)
        })
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        require_path(path)?;

        Ok(self
            .probe(path)
            .await
            .is_some_and(|response| response.status().is_success()))
    }

    async fn size(&self, path: &str) -> Result<Option<u64>> {
        require_path(path)?;

        let Some(response) = self.probe(path).await else {
            return Ok(None);
        };
        if !response.status().is_success() {
            return Ok(None);
        }

        Ok(response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok()))
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        require_path(path)?;

        let url = route::storage_url(&self.config, path);
        let response = self
            .send(self.request(Method::GET, Endpoint::Storage, &url))
            .await?;
        let response = check_status(response, path)?;

        Ok(response.bytes().await?.to_vec())
    }

    async fn upload(
        &self,
        local_path: &Path,
        remote_path: &str,
        randomize_name: bool,
    ) -> Result<Upload> {
        require_path(remote_path)?;
        let data = read_local_file(local_path).await?;

        let remote_path = if randomize_name {
            self.naming.rename(remote_path)
        } else {
            remote_path.to_string()
        };

        let url = route::storage_url(&self.config, &remote_path);
        tracing::debug!("Uploading {} bytes to {}", data.len(), remote_path);

        let response = self
            .request(Method::PUT, Endpoint::Storage, &url)
            .body(data)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Upload of {} failed: {}", remote_path, e);
                Error::Upload(e.to_string())
            })?;

        let status = response.status();
        if status.as_u16() >= 400 {
            tracing::error!("Upload of {} failed (status {})", remote_path, status);
            return Err(Error::Upload(format!(
                "Upload failed with HTTP status: {}",
                status.as_u16()
            )));
        }

        // Only 201 Created confirms the write.
        let stored = status == StatusCode::CREATED;
        if !stored {
            tracing::warn!(
                "Upload of {} returned status {}, not 201; reporting failure",
                remote_path,
                status
            );
        }

        Ok(Upload {
            stored,
            remote_path,
        })
    }

    async fn delete(&self, path: &str) -> Result<bool> {
        require_path(path)?;

        let url = route::storage_url(&self.config, path);
        let response = self
            .send(
                self.request(Method::DELETE, Endpoint::Storage, &url)
                    .header(ACCEPT, JSON),
            )
            .await?;

        Ok(response.status().is_success())
    }

    async fn purge(&self, path: &str) -> Result<Value> {
        require_path(path)?;

        let url = route::admin_url(&self.config, "purge");
        let target = route::purge_target(&self.config, path);
        tracing::debug!("Purging {}", target);

        let response = self
            .send(
                self.request(Method::POST, Endpoint::Admin, &url)
                    .query(&[("url", target.as_str())])
                    .header(ACCEPT, JSON),
            )
            .await?;

        let status = response.status();
        if status.as_u16() >= 400 {
            tracing::error!("Purge of {} failed (status {})", target, status);
            return Err(Error::Response {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

//! Docker Engine API client.
//!
//! This module defines the [`ContainerClient`] capability the container
//! resource is checked and applied through, plus the HTTP implementation
//! that speaks the Engine REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::DockerError;

use super::types::{ContainerDetails, ContainerSummary, CreateRequest, CreateResponse, Image};

/// Default Engine API endpoint when `DOCKER_HOST` is unset.
const DEFAULT_ENGINE_URL: &str = "http://localhost:2375";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for transient failures.
const MAX_RETRIES: u32 = 3;

/// Delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 500;

/// Capability for querying and mutating the container runtime.
///
/// The reconciliation core never talks to the engine directly; it is handed
/// an implementation of this trait. Tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContainerClient: Send + Sync {
    /// Finds a container by name.
    ///
    /// Returns `None` when no container with that name exists.
    async fn find_container(&self, name: &str) -> Result<Option<ContainerDetails>, DockerError>;

    /// Inspects an image by reference or identifier.
    async fn find_image(&self, reference: &str) -> Result<Image, DockerError>;

    /// Creates a container, returning its identifier.
    async fn create_container(&self, request: &CreateRequest) -> Result<String, DockerError>;
}

/// HTTP client for the Docker Engine REST API.
#[derive(Debug, Clone)]
pub struct EngineClient {
    /// HTTP client.
    http: Client,
    /// Base URL of the engine endpoint.
    base_url: String,
}

impl EngineClient {
    /// Creates a client against the endpoint named by `DOCKER_HOST`,
    /// falling back to the local TCP default.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self, DockerError> {
        Self::with_endpoint(&endpoint_from_env(), DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with an explicit endpoint and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_endpoint(endpoint: &str, timeout_secs: u64) -> Result<Self, DockerError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DockerError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Executes a GET request with retries for transient failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DockerError> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                debug!("Retry attempt {attempt} of {MAX_RETRIES} for {path}");
                tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt)))
                    .await;
            }

            let result = self.get_json_once(path, query).await;
            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() => last_error = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| DockerError::network("max retries exceeded")))
    }

    /// Executes a single GET request.
    async fn get_json_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DockerError> {
        trace!("GET {}{path}", self.base_url);

        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await
            .map_err(|e| DockerError::network(format!("request failed: {e}")))?;

        Self::decode(response).await
    }

    /// Executes a POST request carrying a JSON body.
    async fn post_json<T: DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &B,
    ) -> Result<T, DockerError> {
        trace!("POST {}{path}", self.base_url);

        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|e| DockerError::network(format!("request failed: {e}")))?;

        Self::decode(response).await
    }

    /// Maps a response to a decoded value or an API error.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, DockerError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DockerError::api(status.as_u16(), body.trim().to_string()));
        }

        response
            .json()
            .await
            .map_err(|e| DockerError::invalid_response(format!("failed to decode response: {e}")))
    }
}

#[async_trait]
impl ContainerClient for EngineClient {
    async fn find_container(&self, name: &str) -> Result<Option<ContainerDetails>, DockerError> {
        let filters = serde_json::json!({ "name": [format!("^/{name}$")] }).to_string();
        let summaries: Vec<ContainerSummary> = self
            .get_json(
                "/containers/json",
                &[("all", String::from("true")), ("filters", filters)],
            )
            .await?;

        // The name filter matches substrings on older engines; verify exactly.
        let target = format!("/{name}");
        let Some(summary) = summaries
            .into_iter()
            .find(|s| s.names.iter().any(|n| n == &target || n == name))
        else {
            debug!("No container named {name}");
            return Ok(None);
        };

        let details = self
            .get_json(&format!("/containers/{}/json", summary.id), &[])
            .await?;
        Ok(Some(details))
    }

    async fn find_image(&self, reference: &str) -> Result<Image, DockerError> {
        self.get_json(&format!("/images/{reference}/json"), &[])
            .await
    }

    async fn create_container(&self, request: &CreateRequest) -> Result<String, DockerError> {
        let response: CreateResponse = self
            .post_json(
                "/containers/create",
                &[("name", request.name.clone())],
                request,
            )
            .await?;

        for warning in &response.warnings {
            debug!("Engine warning for container {}: {warning}", request.name);
        }

        Ok(response.id)
    }
}

/// Resolves the engine endpoint from `DOCKER_HOST`.
fn endpoint_from_env() -> String {
    match std::env::var("DOCKER_HOST") {
        Ok(host) if host.starts_with("tcp://") => host.replacen("tcp://", "http://", 1),
        Ok(host) if host.starts_with("http://") || host.starts_with("https://") => host,
        _ => String::from(DEFAULT_ENGINE_URL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_find_image_decodes_config() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images/nginx:latest/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Id": "sha256:deadbeef",
                "RepoTags": ["nginx:latest", "nginx:1.27"],
                "Config": {
                    "Env": ["PATH=/usr/bin"],
                    "Cmd": ["nginx", "-g", "daemon off;"],
                    "ExposedPorts": {"80/tcp": {}}
                }
            })))
            .mount(&server)
            .await;

        let client = EngineClient::with_endpoint(&server.uri(), 5).unwrap();
        let image = client.find_image("nginx:latest").await.unwrap();
        assert_eq!(image.repo_tags.len(), 2);
        assert_eq!(image.config.cmd, vec!["nginx", "-g", "daemon off;"]);
        assert!(image.config.exposed_ports.contains_key("80/tcp"));
    }

    #[tokio::test]
    async fn test_find_image_maps_missing_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/images/ghost/json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such image"))
            .mount(&server)
            .await;

        let client = EngineClient::with_endpoint(&server.uri(), 5).unwrap();
        let err = client.find_image("ghost").await.unwrap_err();
        match err {
            DockerError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such image");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_find_container_requires_exact_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/containers/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"Id": "aaa", "Names": ["/web-backup"], "Image": "nginx", "State": "running"}
            ])))
            .mount(&server)
            .await;

        let client = EngineClient::with_endpoint(&server.uri(), 5).unwrap();
        let found = client.find_container("web").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_container_inspects_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/containers/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"Id": "aaa", "Names": ["/web"], "Image": "nginx", "State": "running"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/containers/aaa/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Id": "aaa",
                "Name": "/web",
                "Image": "sha256:deadbeef",
                "State": {"Status": "running"},
                "Config": {"Env": [], "Cmd": ["nginx"]},
                "HostConfig": {"PublishAllPorts": false}
            })))
            .mount(&server)
            .await;

        let client = EngineClient::with_endpoint(&server.uri(), 5).unwrap();
        let found = client.find_container("web").await.unwrap().unwrap();
        assert_eq!(found.id, "aaa");
        assert_eq!(found.state.status, "running");
    }

    #[tokio::test]
    async fn test_create_container_returns_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/containers/create"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "Id": "bbb",
                "Warnings": null
            })))
            .mount(&server)
            .await;

        let client = EngineClient::with_endpoint(&server.uri(), 5).unwrap();
        let request = CreateRequest {
            name: String::from("web"),
            image: String::from("nginx:latest"),
            ..CreateRequest::default()
        };
        let id = client.create_container(&request).await.unwrap();
        assert_eq!(id, "bbb");
    }
}

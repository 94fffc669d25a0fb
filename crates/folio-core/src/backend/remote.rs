//! REST API backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{Asset, PostBackend};
use crate::config::ClientConfig;
use crate::error::{BackendError, Error, Result, UploadError};
use crate::models::{Post, PostDraft, PostId, PostPatch};
use crate::util::{compact_text, normalize_base_url};

/// HTTP client for the posts API mounted at `{api_host}/api`.
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    api_host: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: String,
}

impl RemoteBackend {
    /// Builds a client for an explicit API host such as `http://localhost:8000`.
    pub fn new(api_host: &str, timeout: Duration) -> Result<Self> {
        let api_host = normalize_base_url(api_host).map_err(Error::Config)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::Config(format!("Failed to construct HTTP client: {error}")))?;
        Ok(Self { api_host, client })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    /// Returns the host this client was configured with.
    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.api_host)
    }

    fn post_url(&self, id: &PostId) -> String {
        self.url(&format!("/posts/{}", urlencoding::encode(id.as_str())))
    }

    /// Send the request and turn non-2xx answers into `BackendError::Status`.
    async fn execute(request: RequestBuilder) -> std::result::Result<Response, BackendError> {
        let response = request
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|error| BackendError::Network(error.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Status {
            status,
            body: compact_text(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> std::result::Result<T, BackendError> {
        let body = response
            .text()
            .await
            .map_err(|error| BackendError::Network(error.to_string()))?;
        serde_json::from_str(&body).map_err(|error| BackendError::ParseFailure(error.to_string()))
    }

    async fn fetch<T: DeserializeOwned>(
        request: RequestBuilder,
        id: Option<&PostId>,
    ) -> Result<T> {
        let response = Self::execute(request)
            .await
            .map_err(|error| map_not_found(error, id))?;
        Ok(Self::decode(response).await?)
    }
}

fn map_not_found(error: BackendError, id: Option<&PostId>) -> Error {
    match id {
        Some(id) if error.status() == Some(StatusCode::NOT_FOUND.as_u16()) => {
            Error::NotFound(id.to_string())
        }
        _ => error.into(),
    }
}

#[async_trait]
impl PostBackend for RemoteBackend {
    async fn list(&self) -> Result<Vec<Post>> {
        tracing::debug!("GET {}", self.url("/posts"));
        Self::fetch(self.client.get(self.url("/posts")), None).await
    }

    async fn get(&self, id: &PostId) -> Result<Post> {
        Self::fetch(self.client.get(self.post_url(id)), Some(id)).await
    }

    async fn create(&self, draft: &PostDraft) -> Result<Post> {
        Self::fetch(self.client.post(self.url("/posts")).json(draft), None).await
    }

    async fn update(&self, id: &PostId, patch: &PostPatch) -> Result<Post> {
        Self::fetch(self.client.put(self.post_url(id)).json(patch), Some(id)).await
    }

    async fn delete(&self, id: &PostId) -> Result<()> {
        Self::execute(self.client.delete(self.post_url(id)))
            .await
            .map_err(|error| map_not_found(error, Some(id)))?;
        Ok(())
    }

    async fn upload_asset(&self, asset: &Asset) -> Result<String> {
        let file_part = multipart::Part::bytes(asset.bytes.clone())
            .file_name(asset.file_name.clone())
            .mime_str(&asset.content_type)
            .map_err(|error| UploadError::InvalidResponse(error.to_string()))?;
        let form = multipart::Form::new().part("file", file_part);

        let response = self
            .client
            .post(self.url("/posts/upload-image"))
            .multipart(form)
            .send()
            .await
            .map_err(|error| UploadError::Network(error.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status {
                status,
                body: compact_text(&body),
            }
            .into());
        }

        let payload = response
            .json::<UploadResponse>()
            .await
            .map_err(|error| UploadError::InvalidResponse(error.to_string()))?;

        // The API answers with a host-relative path.
        if payload.url.starts_with('/') {
            Ok(format!("{}{}", self.api_host, payload.url))
        } else {
            Ok(payload.url)
        }
    }
}

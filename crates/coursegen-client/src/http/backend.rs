use futures::TryStreamExt as _;
use tracing::debug;

use coursegen_outline::RawOutlineDoc;

use crate::backend::{ByteStream, GenerateRequest, GenerationBackend};
use crate::errors::{BackendError, ClientError, FetchError};

use super::config::HttpBackendConfig;

/// Generation backend speaking the service's HTTP API.
pub struct HttpBackend {
    client: reqwest::Client,
    config: HttpBackendConfig,
}

impl HttpBackend {
    /// Creates a backend from explicit configuration.
    pub fn new(config: HttpBackendConfig) -> Result<Self, ClientError> {
        if config.base_url.trim().is_empty() {
            return Err(ClientError::Config(
                "HTTP backend base_url must not be empty".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a backend using `COURSEGEN_API_URL`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(HttpBackendConfig::from_env()?)
    }
}

#[async_trait::async_trait]
impl GenerationBackend for HttpBackend {
    async fn start_generation(
        &self,
        request: &GenerateRequest,
    ) -> Result<ByteStream, BackendError> {
        debug!(topic = %request.topic, grade_level = %request.grade_level, "starting generation request");
        let response = self
            .client
            .post(self.config.generate_url())
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::transport(format!("generation request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(BackendError::backend(
                format!("generation request failed with status {status}: {body}"),
                Some(status.as_u16()),
            ));
        }

        let stream = response
            .bytes_stream()
            .map_err(|e| BackendError::transport(format!("streaming read failed: {e}")));
        Ok(Box::pin(stream))
    }

    async fn fetch_document(
        &self,
        curriculum_id: &str,
        teacher_id: &str,
    ) -> Result<RawOutlineDoc, FetchError> {
        debug!(curriculum_id, "fetching outline document");
        let response = self
            .client
            .get(self.config.curriculum_url(curriculum_id))
            .query(&[("teacher_id", teacher_id)])
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                message: format!("outline fetch failed: {e}"),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                curriculum_id: curriculum_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Transport {
                message: format!("outline fetch failed with status {status}"),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Transport {
            message: format!("failed to read outline document body: {e}"),
        })?;
        serde_json::from_str::<RawOutlineDoc>(&body).map_err(|e| FetchError::MalformedDocument {
            message: e.to_string(),
        })
    }
}

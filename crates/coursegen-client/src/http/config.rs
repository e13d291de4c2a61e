use std::time::Duration;

use crate::errors::ClientError;

/// Configuration for the HTTP generation backend.
#[derive(Clone, Debug)]
pub struct HttpBackendConfig {
    /// Base URL of the generation service.
    pub base_url: String,
    /// HTTP timeout covering the full request, including the streamed body.
    ///
    /// Generation jobs run for minutes, so this is deliberately generous.
    pub timeout: Duration,
}

impl HttpBackendConfig {
    /// Creates a config with default timeout and the provided base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(600),
        }
    }

    /// Builds a config from `COURSEGEN_API_URL`.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = std::env::var("COURSEGEN_API_URL").unwrap_or_default();
        if base_url.trim().is_empty() {
            return Err(ClientError::Config(
                "missing COURSEGEN_API_URL for HTTP backend".into(),
            ));
        }
        Ok(Self::new(base_url))
    }

    /// Overrides the HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn generate_url(&self) -> String {
        format!("{}/generate-curriculum", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn curriculum_url(&self, curriculum_id: &str) -> String {
        format!(
            "{}/curricula/{curriculum_id}",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_tolerate_trailing_slash() {
        let config = HttpBackendConfig::new("https://api.example.test/");
        assert_eq!(
            config.generate_url(),
            "https://api.example.test/generate-curriculum"
        );
        assert_eq!(
            config.curriculum_url("c-1"),
            "https://api.example.test/curricula/c-1"
        );
    }
}

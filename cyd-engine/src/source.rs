//! The network seam: fetching raw dataset bodies by relative path.

use cyd_core::error::FetchError;

/// A source of raw dataset text, addressed by relative path.
///
/// Implementations perform a single retrieval per call: no internal
/// retries (fallback policy belongs to the orchestrator) and no shared
/// state mutation.
pub trait DataSource {
    fn get_text(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<String, FetchError>>;
}

/// HTTP-backed data source rooted at a base URL.
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        HttpSource {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl DataSource for HttpSource {
    async fn get_text(&self, path: &str) -> Result<String, FetchError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }
}

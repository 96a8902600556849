// Where poll cycles get their StatusResponse from

use std::future::Future;

use crate::models::StatusResponse;

use super::render::RenderError;

pub const STATUS_PATH: &str = "/api/status";

/// Everything that can end a poll cycle without a render. The poller logs
/// these and waits for the next tick.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("response not ok: {0}")]
    NotOk(reqwest::StatusCode),
    #[error("malformed status body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
}

pub trait StatusSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<StatusResponse, PollError>> + Send;
}

/// `GET {base_url}/api/status` with no parameters, headers or auth.
#[derive(Debug, Clone)]
pub struct HttpStatusSource {
    url: String,
    client: reqwest::Client,
}

impl HttpStatusSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            url: format!("{}{}", base_url.trim_end_matches('/'), STATUS_PATH),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl StatusSource for HttpStatusSource {
    async fn fetch(&self) -> Result<StatusResponse, PollError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PollError::NotOk(status));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

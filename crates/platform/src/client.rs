use async_trait::async_trait;
use serde::Serialize;

use crate::config::PlatformConfig;
use crate::error::PlatformError;
use crate::traits::{AccessEvents, LearningProgress, OutcomeReporter};
use crate::types::{OutcomeReport, ReadEventSync, StatusWrite};

const STATUS_PATH: &str = "/api/learning-progress/status";
const READ_EVENT_PATH: &str = "/api/read-events/sync";
const OUTCOME_PATH: &str = "/api/outcomes";

/// Longest error body kept in [`PlatformError::HttpStatus`].
const MAX_ERROR_BODY_LEN: usize = 500;

/// Client for the host platform's tracking endpoints.
pub struct HttpPlatformClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for HttpPlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlatformClient")
            .field("client", &self.client)
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl HttpPlatformClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built (TLS backend failure).
    pub fn new(config: &PlatformConfig) -> Result<Self, PlatformError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PlatformError::ClientInit(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<(), PlatformError> {
        let mut request = self.client.post(format!("{}{path}", self.base_url)).json(body);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }
        let response = request.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body =
            response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());
        tracing::warn!(path, code = status.as_u16(), "platform call rejected");
        Err(PlatformError::HttpStatus {
            code: status.as_u16(),
            body: truncate(&body, MAX_ERROR_BODY_LEN).to_owned(),
        })
    }
}

fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end = end.saturating_sub(1);
    }
    s.get(..end).unwrap_or_default()
}

#[async_trait]
impl LearningProgress for HttpPlatformClient {
    async fn write_status(
        &self,
        package_id: i64,
        user_id: i64,
        status: i32,
        percentage: Option<i32>,
    ) -> Result<(), PlatformError> {
        self.post(STATUS_PATH, &StatusWrite { package_id, user_id, status, percentage }).await
    }
}

#[async_trait]
impl AccessEvents for HttpPlatformClient {
    async fn sync_read_event(
        &self,
        package_id: i64,
        user_id: i64,
        event_type: &str,
        ref_id: i64,
        time_from_lms: bool,
    ) -> Result<(), PlatformError> {
        let body = ReadEventSync {
            package_id,
            user_id,
            event_type: event_type.to_owned(),
            ref_id,
            time_from_lms,
        };
        self.post(READ_EVENT_PATH, &body).await
    }
}

#[async_trait]
impl OutcomeReporter for HttpPlatformClient {
    async fn report_outcome(
        &self,
        package_id: i64,
        user_id: i64,
        score: f64,
    ) -> Result<(), PlatformError> {
        self.post(OUTCOME_PATH, &OutcomeReport { package_id, user_id, score }).await
    }
}

use scorm_sync_core::{PLATFORM_HTTP_TIMEOUT_SECS, env_non_empty, env_parse_with_default};

/// Where and how to reach the host platform.
#[derive(Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for PlatformConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl PlatformConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), token: None, timeout_secs: PLATFORM_HTTP_TIMEOUT_SECS }
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Reads `SCORM_SYNC_PLATFORM_URL`, `SCORM_SYNC_PLATFORM_TOKEN` and
    /// `SCORM_SYNC_HTTP_TIMEOUT_SECS`. `None` when no URL is configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env_non_empty("SCORM_SYNC_PLATFORM_URL")?;
        Some(Self {
            base_url,
            token: env_non_empty("SCORM_SYNC_PLATFORM_TOKEN"),
            timeout_secs: env_parse_with_default(
                "SCORM_SYNC_HTTP_TIMEOUT_SECS",
                PLATFORM_HTTP_TIMEOUT_SECS,
            ),
        })
    }
}

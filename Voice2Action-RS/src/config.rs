use std::time::Duration;

use crate::poller::FallbackPolicy;

/// Default API location, matching a locally running service.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

/// Characters of transcript shown when the analysis carries no summary.
pub const DEFAULT_PREVIEW_CHARS: usize = 500;

/// Configuration for [`crate::V2aClient`].
///
/// Use [`ClientConfig::builder()`] for ergonomic construction, or
/// [`ClientConfig::default()`] for a local service polled every 2 seconds
/// for up to 3 minutes.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API, without a trailing slash.
    pub endpoint: String,

    /// Delay between two status checks.
    pub poll_interval: Duration,

    /// Maximum number of status checks before giving up.
    pub max_attempts: u32,

    /// When to probe `/api/status/{id}` after a failed `/api/jobs/{id}`.
    pub fallback: FallbackPolicy,

    /// Timeout for the multipart upload.
    pub upload_timeout: Duration,

    /// Timeout for each status and listing request.
    pub request_timeout: Duration,

    /// Transcript preview length used when no summary is available.
    pub preview_chars: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poll_interval: Duration::from_secs(2),
            max_attempts: 90,
            fallback: FallbackPolicy::default(),
            upload_timeout: Duration::from_secs(120),
            request_timeout: Duration::from_secs(10),
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl ClientConfig {
    /// Start building a config with the builder pattern.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Total time polling may take, ignoring request latency.
    pub fn poll_budget(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }
}

/// Builder for [`ClientConfig`].
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the API base URL. Trailing slashes are dropped.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = normalize(endpoint.into());
        self
    }

    /// Set the delay between status checks.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the status-check budget. `60` gives the short 2 minute window.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    /// Set when the alternate status endpoint is probed.
    pub fn with_fallback(mut self, policy: FallbackPolicy) -> Self {
        self.config.fallback = policy;
        self
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.config.upload_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set how many transcript characters stand in for a missing summary.
    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.config.preview_chars = chars;
        self
    }

    /// Build the final [`ClientConfig`].
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

pub(crate) fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

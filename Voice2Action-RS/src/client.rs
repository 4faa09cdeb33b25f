use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;

use crate::config::{normalize, ClientConfig};
use crate::error::{Result, V2aError};
use crate::poller::{PollContext, Poller, StatusSource};
use crate::results::{self, JobResults};
use crate::server_error::normalize_server_error;
use crate::types::*;
use crate::upload::AudioFile;

/// Async client for a Voice2Action API instance.
///
/// Provides the upload, status polling and result endpoints, plus the
/// job history endpoints exposed by the service.
///
/// # Example
/// ```no_run
/// use voice2action_client::V2aClient;
///
/// # async fn example() -> voice2action_client::Result<()> {
/// let client = V2aClient::new("http://127.0.0.1:8000");
/// let health = client.health().await?;
/// println!("service is {}", health.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct V2aClient {
    http: Client,
    config: ClientConfig,
}

impl V2aClient {
    /// Create a client for the given endpoint with default settings.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::builder().with_endpoint(endpoint).build())
    }

    /// Create a client from a full configuration.
    pub fn with_config(mut config: ClientConfig) -> Self {
        config.endpoint = normalize(config.endpoint);
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Use a custom `reqwest::Client` (for connection pooling, proxies, TLS).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Returns the configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Endpoint URL with `segments` appended, each percent-encoded so a job
    /// id can never add or climb path components.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.config.endpoint)
            .map_err(|e| V2aError::InvalidEndpoint(format!("{}: {}", self.config.endpoint, e)))?;
        url.path_segments_mut()
            .map_err(|_| V2aError::InvalidEndpoint(self.config.endpoint.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn unreachable_context(&self) -> String {
        format!(
            "Cannot connect to Voice2Action at {} (is the service running?)",
            self.config.endpoint
        )
    }

    /// Send a request and turn non-success statuses into [`V2aError::Server`].
    async fn send(&self, request: RequestBuilder, context: String) -> Result<Response> {
        let resp = request.send().await.map_err(|e| V2aError::Network {
            context,
            source: e,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(V2aError::Server {
                status,
                message: normalize_server_error(&body, status),
            });
        }
        Ok(resp)
    }

    async fn get_json(&self, url: Url, context: &str) -> Result<Value> {
        let request = self.http.get(url).timeout(self.config.request_timeout);
        let resp = self.send(request, self.unreachable_context()).await?;
        resp.json().await.map_err(|e| V2aError::Network {
            context: format!("Failed to parse {}", context),
            source: e,
        })
    }

    // ── Health ──────────────────────────────────────────────────────

    /// Fetch `/health`. A degraded service still answers with a report.
    pub async fn health(&self) -> Result<HealthReport> {
        let json = self.get_json(self.url(&["health"])?, "health response").await?;
        Ok(serde_json::from_value(json)?)
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Validate and upload an audio file. Returns the created job.
    ///
    /// Validation failures return before any request is made.
    pub async fn submit(&self, file: &AudioFile, analysis: &AnalysisType) -> Result<SubmittedJob> {
        file.validate()?;
        let form = file.to_form(analysis)?;

        tracing::info!(
            filename = %file.filename,
            size = file.size(),
            analysis_type = analysis.as_str(),
            "uploading audio"
        );
        let request = self
            .http
            .post(self.url(&["api", "process-audio"])?)
            .timeout(self.config.upload_timeout)
            .multipart(form);
        let resp = self.send(request, self.unreachable_context()).await?;

        let json: Value = resp.json().await.map_err(|e| V2aError::Network {
            context: "Failed to parse /api/process-audio response".into(),
            source: e,
        })?;
        let job_id = json
            .get("job_id")
            .and_then(|v| v.as_str())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| V2aError::InvalidResponse("Response missing job_id".into()))?;
        let text = |key: &str| json.get(key).and_then(|v| v.as_str()).map(String::from);
        let job = SubmittedJob {
            job_id: job_id.to_string(),
            message: text("message"),
            status_url: text("status_url"),
            transcript_url: text("transcript_url"),
            analysis_url: text("analysis_url"),
            monitor_url: text("monitor_url"),
            created_at: text("created_at"),
        };

        tracing::info!(job_id = %job.job_id, "job started");
        Ok(job)
    }

    // ── Status ──────────────────────────────────────────────────────

    /// Fetch `/api/jobs/{id}`, the primary status endpoint.
    pub async fn job_status(&self, job_id: &str) -> Result<JobSnapshot> {
        let json = self
            .get_json(self.url(&["api", "jobs", job_id])?, "job status")
            .await?;
        Ok(JobSnapshot::from_value(job_id, json))
    }

    /// Fetch `/api/status/{id}`, the alternate status endpoint.
    pub async fn status(&self, job_id: &str) -> Result<JobSnapshot> {
        let json = self
            .get_json(self.url(&["api", "status", job_id])?, "job status")
            .await?;
        Ok(JobSnapshot::from_value(job_id, json))
    }

    // ── Completion waiting ──────────────────────────────────────────

    /// Poll until the job completes, fails, or the attempt budget is spent.
    /// Calls `on_update` once per status reply.
    pub async fn wait_for_completion<F>(&self, job_id: &str, on_update: F) -> Result<JobSnapshot>
    where
        F: FnMut(PollUpdate),
    {
        Poller::from_config(&self.config)
            .run(self, job_id, on_update)
            .await
    }

    /// Upload a file and wait for its job to finish.
    pub async fn analyze<F>(
        &self,
        file: &AudioFile,
        analysis: &AnalysisType,
        mut on_event: F,
    ) -> Result<JobSnapshot>
    where
        F: FnMut(AnalyzeEvent),
    {
        file.validate()?;
        let mut ctx = PollContext::submitting(self.config.max_attempts);
        on_event(AnalyzeEvent::Uploading {
            filename: file.filename.clone(),
            size: file.size(),
        });

        let job = self.submit(file, analysis).await?;
        ctx.accept_job(job.job_id.clone());
        on_event(AnalyzeEvent::Accepted {
            job_id: job.job_id.clone(),
        });

        Poller::from_config(&self.config)
            .drive(self, &mut ctx, |u| on_event(AnalyzeEvent::Progress(u)))
            .await
    }

    /// Normalize a completed job's payload.
    pub fn results(&self, snapshot: &JobSnapshot) -> JobResults {
        results::normalize(&snapshot.payload, self.config.preview_chars)
    }

    // ── History ─────────────────────────────────────────────────────

    /// List recent jobs.
    pub async fn list_jobs(&self, limit: u32, offset: u32) -> Result<Vec<JobSummary>> {
        let mut url = self.url(&["api", "jobs"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());
        let json = self.get_json(url, "job list").await?;
        Ok(serde_json::from_value(json)?)
    }

    /// Fetch the full transcript of a job.
    pub async fn transcript(&self, job_id: &str) -> Result<Transcript> {
        let json = self
            .get_json(self.url(&["api", "jobs", job_id, "transcript"])?, "transcript")
            .await?;
        Ok(serde_json::from_value(json)?)
    }

    /// Fetch the raw analysis of a job.
    pub async fn analysis(&self, job_id: &str) -> Result<Value> {
        let json = self
            .get_json(self.url(&["api", "jobs", job_id, "analysis"])?, "analysis")
            .await?;
        json.get("analysis")
            .cloned()
            .ok_or_else(|| V2aError::InvalidResponse("Response missing analysis".into()))
    }

    /// Delete a job from the service history.
    pub async fn delete_job(&self, job_id: &str) -> Result<()> {
        let request = self
            .http
            .delete(self.url(&["api", "jobs", job_id])?)
            .timeout(self.config.request_timeout);
        self.send(request, format!("Failed to delete job {}", job_id))
            .await?;
        tracing::info!(job_id, "job deleted");
        Ok(())
    }

    /// Fetch aggregate statistics.
    pub async fn stats(&self) -> Result<Value> {
        let json = self.get_json(self.url(&["api", "stats"])?, "statistics").await?;
        Ok(json.get("statistics").cloned().unwrap_or(json))
    }

    /// Full-text search over transcripts.
    pub async fn search(&self, query: &str, limit: u32) -> Result<SearchResults> {
        let mut url = self.url(&["api", "search"])?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("limit", &limit.to_string());
        let json = self.get_json(url, "search response").await?;
        Ok(serde_json::from_value(json)?)
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Ask the service to export a completed job to the given targets,
    /// e.g. `google_docs`. The service refuses jobs that are unfinished,
    /// failed or without results.
    pub async fn export(&self, job_id: &str, targets: &[&str]) -> Result<ExportReport> {
        let body = serde_json::json!({
            "job_id": job_id,
            "exports": targets,
        });
        let request = self
            .http
            .post(self.url(&["api", "export"])?)
            .timeout(self.config.request_timeout)
            .json(&body);
        let resp = self.send(request, self.unreachable_context()).await?;

        let report: ExportReport = resp.json().await.map_err(|e| V2aError::Network {
            context: "Failed to parse export response".into(),
            source: e,
        })?;
        tracing::info!(job_id, exports = report.exports.len(), "export requested");
        Ok(report)
    }
}

impl StatusSource for V2aClient {
    async fn primary_status(&self, job_id: &str) -> Result<JobSnapshot> {
        self.job_status(job_id).await
    }

    async fn fallback_status(&self, job_id: &str) -> Result<JobSnapshot> {
        self.status(job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::FallbackPolicy;

    #[test]
    fn test_client_builder() {
        let client = V2aClient::new("http://127.0.0.1:8000/");
        assert_eq!(client.endpoint(), "http://127.0.0.1:8000");
        assert_eq!(client.config().max_attempts, 90);
    }

    #[test]
    fn test_with_config_normalizes_endpoint() {
        let config = ClientConfig {
            endpoint: "http://host:8000//".into(),
            ..ClientConfig::default()
        };
        let client = V2aClient::with_config(config);
        assert_eq!(client.endpoint(), "http://host:8000");
        assert_eq!(
            client.url(&["api", "jobs", "x"]).unwrap().as_str(),
            "http://host:8000/api/jobs/x"
        );
    }

    #[test]
    fn test_job_id_is_a_single_path_segment() {
        let client = V2aClient::new("http://host:8000");
        assert_eq!(
            client.url(&["api", "jobs", "../stats"]).unwrap().as_str(),
            "http://host:8000/api/jobs/..%2Fstats"
        );
        assert_eq!(
            client.url(&["api", "jobs", "a b?c"]).unwrap().as_str(),
            "http://host:8000/api/jobs/a%20b%3Fc"
        );
    }

    #[test]
    fn test_endpoint_base_path_is_kept() {
        let client = V2aClient::new("http://host/v2a/");
        assert_eq!(
            client.url(&["api", "stats"]).unwrap().as_str(),
            "http://host/v2a/api/stats"
        );
    }

    #[test]
    fn test_unusable_endpoint_is_reported() {
        let client = V2aClient::new("not a url");
        assert!(matches!(
            client.url(&["health"]),
            Err(V2aError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_custom_config_is_kept() {
        let client = V2aClient::with_config(
            ClientConfig::builder()
                .with_max_attempts(60)
                .with_fallback(FallbackPolicy::Never)
                .build(),
        );
        assert_eq!(client.config().max_attempts, 60);
        assert_eq!(client.config().fallback, FallbackPolicy::Never);
    }

    #[test]
    fn test_results_use_configured_preview() {
        let client = V2aClient::with_config(ClientConfig::builder().with_preview_chars(3).build());
        let snapshot = JobSnapshot::from_value(
            "abc",
            serde_json::json!({"status": "completed", "transcript_text": "hello"}),
        );
        assert_eq!(client.results(&snapshot).summary.as_deref(), Some("hel..."));
    }
}

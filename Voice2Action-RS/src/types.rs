use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle label reported by the API for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Queued,
    Uploading,
    Transcribing,
    Processing,
    Analyzing,
    Exporting,
    Completed,
    Failed,
    /// A label this client does not know. Kept verbatim.
    Other(String),
}

impl JobStatus {
    /// Parse a status label. A missing label reads as `processing`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.unwrap_or("processing") {
            "queued" => Self::Queued,
            "uploading" => Self::Uploading,
            "transcribing" => Self::Transcribing,
            "processing" => Self::Processing,
            "analyzing" => Self::Analyzing,
            "exporting" => Self::Exporting,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Uploading => "uploading",
            Self::Transcribing => "transcribing",
            Self::Processing => "processing",
            Self::Analyzing => "analyzing",
            Self::Exporting => "exporting",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Other(s) => s,
        }
    }

    /// `completed` and `failed` end polling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Analysis mode sent alongside the upload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnalysisType {
    /// Let the service pick the analysis.
    #[default]
    Auto,
    /// An explicit analysis type tag, e.g. `meeting` or `lecture`.
    Explicit(String),
}

impl AnalysisType {
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "" | "auto" => Self::Auto,
            other => Self::Explicit(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => "auto",
            Self::Explicit(tag) => tag,
        }
    }
}

/// Reply to a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedJob {
    pub job_id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status_url: Option<String>,
    #[serde(default)]
    pub transcript_url: Option<String>,
    #[serde(default)]
    pub analysis_url: Option<String>,
    #[serde(default)]
    pub monitor_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl SubmittedJob {
    /// First eight characters of the id, for status lines.
    pub fn short_id(&self) -> &str {
        short_id(&self.job_id)
    }
}

/// First eight characters of a job id.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// One parsed reply from a status endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub job_id: String,
    pub status: JobStatus,
    /// Whether the reply carried a `status` label. A missing label still
    /// reads as `processing` but is not looked up in the progress table.
    pub has_status: bool,
    /// Numeric progress exactly as the server sent it, if any.
    pub progress: Option<f64>,
    pub error: Option<String>,
    /// The complete JSON body, kept for result normalization.
    pub payload: Value,
}

impl JobSnapshot {
    /// Build a snapshot from a status reply. `job_id` is used when the body
    /// does not echo the id back.
    pub fn from_value(job_id: &str, payload: Value) -> Self {
        let label = payload.get("status").and_then(|v| v.as_str());
        let has_status = label.is_some();
        let status = JobStatus::from_label(label);
        let progress = payload.get("progress").and_then(|v| v.as_f64());
        let error = payload
            .get("error")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from);
        let id = payload
            .get("job_id")
            .or_else(|| payload.get("id"))
            .and_then(|v| v.as_str())
            .unwrap_or(job_id)
            .to_string();

        Self {
            job_id: id,
            status,
            has_status,
            progress,
            error,
            payload,
        }
    }
}

/// Progress notification delivered once per status reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PollUpdate {
    pub job_id: String,
    /// 1-based attempt number that produced this update.
    pub attempt: u32,
    pub status: JobStatus,
    /// Ratcheted progress in `[0, 100]`.
    pub progress: f64,
    /// Human-readable stage description.
    pub text: String,
}

/// Events emitted by [`crate::V2aClient::analyze`].
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeEvent {
    /// The file passed validation and is being uploaded.
    Uploading { filename: String, size: u64 },
    /// The server accepted the upload and created a job.
    Accepted { job_id: String },
    /// A status reply was received.
    Progress(PollUpdate),
}

/// Service health as reported by `/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub services: BTreeMap<String, bool>,
    #[serde(default)]
    pub statistics: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Row of the job listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub job_id: String,
    #[serde(default)]
    pub filename: Option<String>,
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub has_analysis: bool,
}

/// Full transcript of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub job_id: String,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub characters: u64,
}

/// One transcript search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub job_id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Reply of the transcript search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub count: usize,
}

/// Outcome of one export target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOutcome {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply of the export endpoint, keyed by target name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReport {
    pub job_id: String,
    #[serde(default)]
    pub exports: BTreeMap<String, ExportOutcome>,
}

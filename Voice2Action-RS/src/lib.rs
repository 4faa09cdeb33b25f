//! # voice2action-client
//!
//! Async Rust client for the Voice2Action audio analysis API.
//!
//! Validates and uploads an audio file, polls the resulting job until the
//! server finishes transcription and analysis, and turns the loosely-shaped
//! results into typed values, escaped HTML, or terminal text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use voice2action_client::{AnalysisType, AnalyzeEvent, AudioFile, V2aClient};
//!
//! # async fn example() -> voice2action_client::Result<()> {
//! let client = V2aClient::new("http://127.0.0.1:8000");
//! let file = AudioFile::from_path("standup.mp3").await?;
//!
//! let job = client
//!     .analyze(&file, &AnalysisType::Auto, |event| {
//!         if let AnalyzeEvent::Progress(p) = event {
//!             println!("{:>3.0}% {}", p.progress, p.text);
//!         }
//!     })
//!     .await?;
//!
//! let results = client.results(&job);
//! for task in &results.tasks {
//!     println!("- {}", task.description);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod poller;
pub mod progress;
pub mod render;
pub mod results;
pub mod server_error;
pub mod types;
pub mod upload;

pub use client::V2aClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Result, V2aError, ValidationError};
pub use poller::{FallbackPolicy, JobSession, PollContext, PollState, Poller, StatusSource};
pub use progress::ProgressRatchet;
pub use results::{DocumentKind, DocumentLink, JobResults, TaskItem};
pub use types::{
    short_id, AnalysisType, AnalyzeEvent, ExportOutcome, ExportReport, HealthReport, JobSnapshot,
    JobStatus, JobSummary, PollUpdate, SearchHit, SearchResults, SubmittedJob, Transcript,
};
pub use upload::AudioFile;

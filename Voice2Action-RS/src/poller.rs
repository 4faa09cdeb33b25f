//! Job polling state machine.
//!
//! A job moves through [`PollState`]s: `Submitting` while the upload is in
//! flight, `Polling` once the server has assigned an id, and then exactly one
//! of `Succeeded`, `Failed` or `TimedOut`. All mutable polling state lives in
//! a [`PollContext`] owned by a single job, so two jobs polled side by side
//! never share a progress value.

use std::future::Future;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::error::{Result, V2aError};
use crate::progress::{status_text, ProgressRatchet};
use crate::types::{JobSnapshot, JobStatus, PollUpdate};

/// Message used when a failed job carries no error of its own.
pub const GENERIC_JOB_FAILURE: &str = "Server error";

/// When to probe the alternate status endpoint after the primary one fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Never probe; a failed attempt is simply retried after the delay.
    Never,
    /// Probe only when the very first attempt fails.
    FirstAttempt,
    /// Probe on every failed attempt.
    #[default]
    EveryAttempt,
}

impl FallbackPolicy {
    /// Whether a failure on the given 1-based attempt triggers a probe.
    pub fn applies(&self, attempt: u32) -> bool {
        match self {
            Self::Never => false,
            Self::FirstAttempt => attempt == 1,
            Self::EveryAttempt => true,
        }
    }
}

/// Where a job is in the submit/poll cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// The upload has not produced a job id yet.
    Submitting,
    /// `attempt` status checks have been started so far.
    Polling { attempt: u32 },
    Succeeded,
    Failed,
    TimedOut,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::TimedOut)
    }
}

/// Per-job polling state: id, attempt counter, progress ratchet.
#[derive(Debug, Clone)]
pub struct PollContext {
    job_id: Option<String>,
    state: PollState,
    ratchet: ProgressRatchet,
    max_attempts: u32,
}

impl PollContext {
    /// A context for an upload that has not been answered yet.
    pub fn submitting(max_attempts: u32) -> Self {
        Self {
            job_id: None,
            state: PollState::Submitting,
            ratchet: ProgressRatchet::new(),
            max_attempts,
        }
    }

    /// A context for an already known job.
    pub fn for_job(job_id: impl Into<String>, max_attempts: u32) -> Self {
        let mut ctx = Self::submitting(max_attempts);
        ctx.accept_job(job_id);
        ctx
    }

    /// Record the id assigned by the server and start polling it.
    ///
    /// Only valid while submitting; otherwise this is a no-op.
    pub fn accept_job(&mut self, job_id: impl Into<String>) {
        if self.state == PollState::Submitting {
            self.job_id = Some(job_id.into());
            self.ratchet = ProgressRatchet::new();
            self.state = PollState::Polling { attempt: 0 };
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Number of status checks this context allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Last progress shown for this job.
    pub fn progress(&self) -> f64 {
        self.ratchet.current()
    }

    /// Start the next status check. Returns its 1-based number, or `None`
    /// when the budget is spent (the context is then `TimedOut`) or the
    /// context is not polling.
    pub fn begin_attempt(&mut self) -> Option<u32> {
        match self.state {
            PollState::Polling { attempt } if attempt < self.max_attempts => {
                self.state = PollState::Polling {
                    attempt: attempt + 1,
                };
                Some(attempt + 1)
            }
            PollState::Polling { .. } => {
                self.state = PollState::TimedOut;
                None
            }
            _ => None,
        }
    }

    /// Fold a status reply into the context and produce the update to show.
    ///
    /// A `completed` reply moves to `Succeeded`, a `failed` reply to
    /// `Failed`. Replies arriving after a terminal state only read the
    /// ratchet.
    pub fn observe(&mut self, snapshot: &JobSnapshot) -> PollUpdate {
        let attempt = match self.state {
            PollState::Polling { attempt } => attempt,
            _ => 0,
        };

        let progress = if self.state.is_terminal() {
            self.ratchet.current()
        } else if snapshot.has_status {
            self.ratchet.observe_status(&snapshot.status, snapshot.progress)
        } else {
            self.ratchet.observe_reading(snapshot.progress)
        };

        if matches!(self.state, PollState::Polling { .. }) {
            match snapshot.status {
                JobStatus::Completed => self.state = PollState::Succeeded,
                JobStatus::Failed => self.state = PollState::Failed,
                _ => {}
            }
        }

        PollUpdate {
            job_id: self
                .job_id
                .clone()
                .unwrap_or_else(|| snapshot.job_id.clone()),
            attempt,
            status: snapshot.status.clone(),
            progress,
            text: status_text(&snapshot.status, progress),
        }
    }
}

/// Anything that can answer status queries for a job.
///
/// [`crate::V2aClient`] implements this against the HTTP API.
pub trait StatusSource: Send + Sync {
    /// Query the primary status endpoint.
    fn primary_status(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<JobSnapshot>> + Send;

    /// Query the alternate status endpoint.
    fn fallback_status(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<JobSnapshot>> + Send;
}

/// Bounded fixed-interval poller.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
    max_attempts: u32,
    fallback: FallbackPolicy,
}

impl Poller {
    pub fn new(interval: Duration, max_attempts: u32, fallback: FallbackPolicy) -> Self {
        Self {
            interval,
            max_attempts,
            fallback,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.poll_interval, config.max_attempts, config.fallback)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Poll `job_id` until it completes, fails, or the budget runs out.
    pub async fn run<S, F>(&self, source: &S, job_id: &str, on_update: F) -> Result<JobSnapshot>
    where
        S: StatusSource,
        F: FnMut(PollUpdate),
    {
        let mut ctx = PollContext::for_job(job_id, self.max_attempts);
        self.drive(source, &mut ctx, on_update).await
    }

    /// Drive an accepted context to a terminal state.
    ///
    /// The attempt budget is the context's own. Returns the completed
    /// snapshot, [`V2aError::JobFailed`] with the server's reason, or
    /// [`V2aError::Timeout`].
    pub async fn drive<S, F>(
        &self,
        source: &S,
        ctx: &mut PollContext,
        mut on_update: F,
    ) -> Result<JobSnapshot>
    where
        S: StatusSource,
        F: FnMut(PollUpdate),
    {
        let job_id = ctx
            .job_id()
            .map(String::from)
            .ok_or_else(|| V2aError::InvalidResponse("No job id to poll".into()))?;
        let budget = ctx.max_attempts();

        while let Some(attempt) = ctx.begin_attempt() {
            if let Some(snapshot) = self.check(source, &job_id, attempt).await {
                let update = ctx.observe(&snapshot);
                tracing::debug!(
                    job_id = %job_id,
                    attempt,
                    status = %update.status,
                    progress = update.progress,
                    "job status"
                );
                on_update(update);

                match ctx.state() {
                    PollState::Succeeded => {
                        tracing::info!(job_id = %job_id, attempt, "job completed");
                        return Ok(snapshot);
                    }
                    PollState::Failed => {
                        let reason = snapshot
                            .error
                            .clone()
                            .unwrap_or_else(|| GENERIC_JOB_FAILURE.to_string());
                        tracing::warn!(job_id = %job_id, attempt, %reason, "job failed");
                        return Err(V2aError::JobFailed(reason));
                    }
                    _ => {}
                }
            }

            if attempt < budget {
                tokio::time::sleep(self.interval).await;
            }
        }

        tracing::warn!(job_id = %job_id, attempts = budget, "polling timed out");
        Err(V2aError::Timeout { attempts: budget })
    }

    /// One status check, including the fallback probe when the policy asks
    /// for it. Errors are logged and swallowed; `None` means "try again".
    async fn check<S: StatusSource>(
        &self,
        source: &S,
        job_id: &str,
        attempt: u32,
    ) -> Option<JobSnapshot> {
        let primary_err = match source.primary_status(job_id).await {
            Ok(snapshot) => return Some(snapshot),
            Err(e) => e,
        };

        if !self.fallback.applies(attempt) {
            tracing::warn!(job_id, attempt, error = %primary_err, "status check failed");
            return None;
        }

        tracing::warn!(
            job_id,
            attempt,
            error = %primary_err,
            "status check failed, probing alternate endpoint"
        );
        match source.fallback_status(job_id).await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(job_id, attempt, error = %e, "alternate status check failed");
                None
            }
        }
    }
}

/// Tracks which job the caller is currently interested in.
///
/// Starting a new submission replaces the active job, so updates still
/// arriving for an abandoned job can be told apart and dropped.
#[derive(Debug, Clone, Default)]
pub struct JobSession {
    active: Option<String>,
}

impl JobSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `job_id` the active job, abandoning any previous one.
    pub fn start(&mut self, job_id: impl Into<String>) {
        self.active = Some(job_id.into());
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Forget the active job.
    pub fn reset(&mut self) {
        self.active = None;
    }

    /// Whether an update belongs to the active job.
    pub fn accepts(&self, update: &PollUpdate) -> bool {
        self.active.as_deref() == Some(update.job_id.as_str())
    }
}

use crate::types::JobStatus;

/// Representative progress for a status label when the server sends none.
///
/// Returns `None` for labels outside the table.
pub fn status_progress(status: &JobStatus) -> Option<f64> {
    let value = match status {
        JobStatus::Queued => 5.0,
        JobStatus::Uploading => 12.0,
        JobStatus::Transcribing => 35.0,
        JobStatus::Processing => 60.0,
        JobStatus::Analyzing => 80.0,
        JobStatus::Exporting => 90.0,
        JobStatus::Completed | JobStatus::Failed => 100.0,
        JobStatus::Other(_) => return None,
    };
    Some(value)
}

/// High-water mark of the progress shown for one job.
///
/// Every observation is clamped to `[0, 100]` and the displayed value only
/// ever moves up.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressRatchet {
    last: f64,
}

impl ProgressRatchet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last displayed value.
    pub fn current(&self) -> f64 {
        self.last
    }

    /// Record a reading and return the value to display.
    pub fn observe(&mut self, value: f64) -> f64 {
        // NaN compares false against everything; treat it as no reading.
        if !value.is_nan() {
            self.last = self.last.max(value.clamp(0.0, 100.0));
        }
        self.last
    }

    /// Resolve the progress for a status reply and record it.
    ///
    /// Completion always reads 100. Otherwise an explicit numeric progress
    /// wins, then the status table, then the last displayed value.
    pub fn observe_status(&mut self, status: &JobStatus, reported: Option<f64>) -> f64 {
        let raw = if *status == JobStatus::Completed {
            100.0
        } else {
            reported
                .or_else(|| status_progress(status))
                .unwrap_or(self.last)
        };
        self.observe(raw)
    }

    /// Record a reply that carried no status label: its numeric progress if
    /// any, otherwise the last displayed value.
    pub fn observe_reading(&mut self, reported: Option<f64>) -> f64 {
        self.observe(reported.unwrap_or(self.last))
    }
}

/// Human-readable description of where a job is.
///
/// `processing` is a catch-all on the server, so the stage is inferred from
/// the progress value. Other labels are shown as-is.
pub fn status_text(status: &JobStatus, progress: f64) -> String {
    match status {
        JobStatus::Processing if progress < 30.0 => "Transcribing audio...".into(),
        JobStatus::Processing if progress < 70.0 => "Analyzing transcript...".into(),
        JobStatus::Processing if progress < 90.0 => "Generating documents...".into(),
        JobStatus::Processing => "Finishing...".into(),
        other => other.as_str().to_string(),
    }
}

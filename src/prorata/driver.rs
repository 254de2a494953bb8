use anyhow::{Context, Result};
use log::{debug, info};

use super::feedback::{try_is_canceled, try_notify, try_set_progress, Feedback};
use super::{build_feature, FeatureSink, Prorata};

/// Lifecycle of a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// Stopped on request; features written so far are kept.
    Canceled,
    Completed,
}

/// Outcome of [`Prorata::run`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub state: RunState,
    /// Output features written to the sink.
    pub written: usize,
    /// Targets skipped for lack of geometry.
    pub skipped: usize,
    /// Targets in the layer.
    pub total: usize,
}

/// Integer progress over a known number of steps.
#[derive(Debug)]
struct Progress {
    total: usize,
    percent: Option<u32>, // last reported percentage
    logged: Option<u32>,  // last decile pushed as a message
    finalized: bool,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self { total, percent: None, logged: None, finalized: false }
    }

    /// Floor of `done / total` in percent, so it never decreases.
    fn percent_of(&self, done: usize) -> u32 {
        if self.total == 0 { return 100 }
        (done.min(self.total) * 100 / self.total) as u32
    }

    /// Record that `done` steps are finished and notify on change.
    fn advance(&mut self, done: usize, feedback: Option<&dyn Feedback>) {
        let percent = self.percent_of(done);
        if self.percent == Some(percent) { return }
        self.percent = Some(percent);

        try_set_progress(feedback, percent);

        if percent % 10 == 0 && self.logged != Some(percent) {
            try_notify(feedback, &format!("{percent}% of features processed..."));
            self.logged = Some(percent);
        }

        if percent == 100 && !self.finalized {
            try_notify(feedback, "Finalizing...");
            self.finalized = true;
        }
    }
}

impl Prorata<'_> {
    /// Process every target feature in id order, writing one output feature
    /// per target with a geometry.
    ///
    /// Cancellation is polled before each feature; a canceled run returns
    /// normally with what was written so far.
    pub fn run(&self, sink: &mut dyn FeatureSink, feedback: Option<&dyn Feedback>) -> Result<RunSummary> {
        let total = self.target().len();
        let mut summary = RunSummary { state: RunState::Idle, written: 0, skipped: 0, total };
        let mut progress = Progress::new(total);

        info!("processing {} target features", total);
        summary.state = RunState::Running;

        for (i, feature) in self.target().features().iter().enumerate() {
            if try_is_canceled(feedback) {
                summary.state = RunState::Canceled;
                break;
            }

            match self.compute(feature) {
                None => {
                    debug!("{} of {:?}: no geometry, skipped", feature.id, self.target().name());
                    summary.skipped += 1;
                }
                Some(result) => {
                    let output = build_feature(feature, self.output_fields(), &result)?;
                    sink.add_feature(output)
                        .with_context(|| format!("Failed to write output for {}", feature.id))?;
                    summary.written += 1;
                }
            }

            progress.advance(i + 1, feedback);
        }

        if summary.state == RunState::Running {
            summary.state = RunState::Completed;
        }

        try_notify(feedback, &format!("Done: {} features written", summary.written));
        Ok(summary)
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use log::{debug, info};

/// Host channel for progress, messages and cancellation.
///
/// Implementations may fail; the run only ever reaches them through the
/// `try_*` helpers below, which swallow those failures.
pub trait Feedback {
    /// Report progress as a percentage in `0..=100`.
    fn set_progress(&self, percent: u32) -> Result<()>;

    /// Show a human-readable message.
    fn push_info(&self, message: &str) -> Result<()>;

    /// Whether the user asked to stop.
    fn is_canceled(&self) -> Result<bool>;
}

/// Push `message`, ignoring a missing or failing channel.
pub fn try_notify(feedback: Option<&dyn Feedback>, message: &str) {
    if let Some(feedback) = feedback {
        if let Err(e) = feedback.push_info(message) {
            debug!("feedback message dropped: {e:#}");
        }
    }
}

/// Report progress, ignoring a missing or failing channel.
pub fn try_set_progress(feedback: Option<&dyn Feedback>, percent: u32) {
    if let Some(feedback) = feedback {
        if let Err(e) = feedback.set_progress(percent) {
            debug!("progress update dropped: {e:#}");
        }
    }
}

/// Poll for cancellation. A missing or failing channel means "not canceled".
pub fn try_is_canceled(feedback: Option<&dyn Feedback>) -> bool {
    feedback.is_some_and(|feedback| feedback.is_canceled().unwrap_or(false))
}

/// Feedback through the `log` facade, canceled by raising a shared flag.
#[derive(Debug, Clone, Default)]
pub struct LogFeedback {
    cancel: Arc<AtomicBool>,
}

impl LogFeedback {
    pub fn new() -> Self { Self::default() }

    /// Use an existing flag, e.g. one set from a Ctrl-C handler.
    pub fn of(cancel: Arc<AtomicBool>) -> Self { Self { cancel } }

    /// Handle to the cancellation flag.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> { self.cancel.clone() }

    /// Ask the run to stop before its next feature.
    pub fn cancel(&self) { self.cancel.store(true, Ordering::SeqCst) }
}

impl Feedback for LogFeedback {
    fn set_progress(&self, percent: u32) -> Result<()> {
        debug!("progress: {percent}%");
        Ok(())
    }

    fn push_info(&self, message: &str) -> Result<()> {
        info!("{message}");
        Ok(())
    }

    fn is_canceled(&self) -> Result<bool> {
        Ok(self.cancel.load(Ordering::SeqCst))
    }
}

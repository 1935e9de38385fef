use std::fmt;
use std::sync::Arc;

/// A user-visible progress event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Free-text stage message ("Scrolling page... (3/15)")
    Stage(String),
    /// Classification batches finished so far
    Batches { completed: usize, total: usize },
}

impl Progress {
    pub fn stage(message: impl Into<String>) -> Self {
        Progress::Stage(message.into())
    }

    /// Completed fraction in `0.0..=1.0`, for batch events only
    pub fn fraction(&self) -> Option<f32> {
        match self {
            Progress::Batches { total: 0, .. } => Some(1.0),
            Progress::Batches { completed, total } => Some(*completed as f32 / *total as f32),
            Progress::Stage(_) => None,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::Stage(message) => f.write_str(message),
            Progress::Batches { completed, total } => {
                write!(f, "Processing reviews... ({}/{} batches)", completed, total)
            }
        }
    }
}

/// Receives progress events; called from worker tasks.
pub type ProgressSink = Arc<dyn Fn(Progress) + Send + Sync>;

/// A sink that drops every event
pub fn silent() -> ProgressSink {
    Arc::new(|_| {})
}

use std::sync::mpsc::Sender;

/// Events a workflow publishes while it runs. A phase brackets one stage of a workflow;
/// inside it, a task counts chromosome jobs.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// `total` is the number of chromosome jobs about to run.
    TaskStart { total: u64 },
    TaskIncrement,
    TaskFinish,

    /// The chromosome a worker has just picked up.
    StatusUpdate { text: String },

    /// A one-off notice worth showing to the user, such as targets that were skipped.
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    /// Publishes every event to a channel. Events sent after the receiver is dropped are
    /// discarded.
    pub fn with_channel(sender: Sender<Progress>) -> Self {
        Self::with_callback(Box::new(move |event| {
            let _ = sender.send(event);
        }))
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }
}

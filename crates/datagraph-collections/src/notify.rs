//! User-facing notifications raised by list operations

use parking_lot::Mutex;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStatus {
    Success,
    Error,
}

/// A short notification shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub status: ToastStatus,
    pub title: String,
}

impl Toast {
    pub fn success(title: impl Into<String>) -> Self {
        Self { status: ToastStatus::Success, title: title.into() }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self { status: ToastStatus::Error, title: title.into() }
    }
}

/// Receives toasts. Implemented by whatever renders the list.
pub trait Notifier: Send + Sync {
    fn toast(&self, toast: Toast);
}

/// Writes toasts to the log. Used when no rendering layer is attached.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn toast(&self, toast: Toast) {
        match toast.status {
            ToastStatus::Success => info!(title = %toast.title, "toast"),
            ToastStatus::Error => warn!(title = %toast.title, "toast"),
        }
    }
}

/// Keeps every toast in memory, for tests and headless callers.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn toast(&self, toast: Toast) {
        self.toasts.lock().push(toast);
    }
}

//! Transient notifications (toasts)
//!
//! Every store reports failures here instead of holding an error field. The
//! front-end drains the queue after each command and renders what it finds.

use connect_common::ApiError;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{info, warn};

/// Oldest toasts are dropped past this many.
const MAX_QUEUED: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    Default,
    Success,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub title: String,
    pub description: Option<String>,
    pub variant: ToastVariant,
    /// Flag image shown next to the text, for placement toasts.
    pub flag: Option<String>,
}

impl Toast {
    pub fn new(title: impl Into<String>, variant: ToastVariant) -> Self {
        Self {
            title: title.into(),
            description: None,
            variant,
            flag: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_flag(mut self, flag_url: impl Into<String>) -> Self {
        self.flag = Some(flag_url.into());
        self
    }
}

#[derive(Debug, Default)]
pub struct NotificationCenter {
    queue: Mutex<VecDeque<Toast>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, toast: Toast) {
        let mut queue = self.queue.lock();
        if queue.len() == MAX_QUEUED {
            queue.pop_front();
        }
        queue.push_back(toast);
    }

    /// `Success!` toast.
    pub fn success(&self, description: impl Into<String>) {
        let toast = Toast::new("Success!", ToastVariant::Success).with_description(description);
        info!(description = ?toast.description, "notify");
        self.push(toast);
    }

    /// Destructive toast carrying the server's own message.
    pub fn api_error(&self, operation: &str, err: &ApiError) {
        warn!(operation, error = %err, status = ?err.status_code(), "request failed");
        self.push(Toast::new("Error", ToastVariant::Destructive).with_description(err.user_message()));
    }

    /// Destructive toast with a fixed description; the cause goes to the log only.
    pub fn failed(&self, operation: &str, description: impl Into<String>, err: &ApiError) {
        warn!(operation, error = %err, status = ?err.status_code(), "request failed");
        self.push(Toast::new("Error", ToastVariant::Destructive).with_description(description));
    }

    /// Destructive toast for a user mistake, with no request involved.
    pub fn warning(&self, description: impl Into<String>) {
        let toast = Toast::new("Error!", ToastVariant::Destructive).with_description(description);
        warn!(description = ?toast.description, "notify");
        self.push(toast);
    }

    pub fn drain(&self) -> Vec<Toast> {
        self.queue.lock().drain(..).collect()
    }

    pub fn latest(&self) -> Option<Toast> {
        self.queue.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

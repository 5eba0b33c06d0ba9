// src/notify.rs

use std::sync::Mutex;

use crate::models::Status;

/// Called after every status change that reaches the store.
pub trait Notifier: Send + Sync {
    fn notify(&self, complaint_id: &str, status: Status);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, complaint_id: &str, status: Status) {
        tracing::info!(complaint = complaint_id, %status, "complaint status changed");
    }
}

/// Keeps every notification in order; handy for inspecting what a flow
/// announced.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<(String, Status)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Status)> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn statuses_for(&self, complaint_id: &str) -> Vec<Status> {
        self.events()
            .into_iter()
            .filter(|(id, _)| id == complaint_id)
            .map(|(_, s)| s)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, complaint_id: &str, status: Status) {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((complaint_id.to_string(), status));
    }
}

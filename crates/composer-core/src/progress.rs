//! Progress events and the per-execution listener registry
//!
//! Events arrive from the backend's progress socket independently of the HTTP
//! response for the same execution. The channel routes each event to the one
//! listener registered for its execution id; events with no listener are
//! dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Lifecycle of a remote execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Running,
    Completed,
    Failed,
}

/// One progress frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub execution_id: String,
    #[serde(default)]
    pub step: String,
    /// 0-100; any JSON number is accepted, rounded and clamped into range
    #[serde(deserialize_with = "progress_percent")]
    pub progress: u8,
    pub status: ProgressStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

fn progress_percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_nan() {
        return Ok(0);
    }
    Ok(value.round().clamp(0.0, 100.0) as u8)
}

impl ProgressUpdate {
    pub fn running(execution_id: impl Into<String>, step: impl Into<String>, progress: u8) -> Self {
        Self {
            execution_id: execution_id.into(),
            step: step.into(),
            progress: progress.min(100),
            status: ProgressStatus::Running,
            message: None,
            data: None,
        }
    }

    pub fn completed(execution_id: impl Into<String>, step: impl Into<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            step: step.into(),
            progress: 100,
            status: ProgressStatus::Completed,
            message: None,
            data: None,
        }
    }

    pub fn failed(
        execution_id: impl Into<String>,
        step: impl Into<String>,
        message: Option<String>,
    ) -> Self {
        Self {
            execution_id: execution_id.into(),
            step: step.into(),
            progress: 0,
            status: ProgressStatus::Failed,
            message,
            data: None,
        }
    }
}

/// Callback invoked for each event of one execution
pub type ProgressListener = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

/// Registry of progress listeners keyed by execution id.
///
/// Cloning shares the registry, so the socket task and the coordinator can
/// each hold a handle.
#[derive(Clone, Default)]
pub struct ProgressChannel {
    listeners: Arc<Mutex<HashMap<String, ProgressListener>>>,
}

impl fmt::Debug for ProgressChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressChannel")
            .field("subscriptions", &self.listeners.lock().len())
            .finish()
    }
}

impl ProgressChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the listener for an execution, replacing any previous one
    pub fn subscribe(&self, execution_id: impl Into<String>, listener: ProgressListener) {
        let execution_id = execution_id.into();
        debug!(%execution_id, "Subscribing to progress");
        self.listeners.lock().insert(execution_id, listener);
    }

    /// Drop the listener for an execution
    pub fn unsubscribe(&self, execution_id: &str) {
        if self.listeners.lock().remove(execution_id).is_some() {
            debug!(%execution_id, "Unsubscribed from progress");
        }
    }

    pub fn is_subscribed(&self, execution_id: &str) -> bool {
        self.listeners.lock().contains_key(execution_id)
    }

    /// Deliver an event to its listener. Returns false when nobody listens.
    pub fn dispatch(&self, mut update: ProgressUpdate) -> bool {
        update.progress = update.progress.min(100);

        // Clone the listener out so it runs without the registry locked
        let listener = self.listeners.lock().get(&update.execution_id).cloned();
        match listener {
            Some(listener) => {
                listener(update);
                true
            }
            None => {
                debug!(execution_id = %update.execution_id, "Dropping progress event without listener");
                false
            }
        }
    }

    /// Parse a raw transport frame and dispatch it. Malformed frames are logged
    /// and dropped.
    pub fn dispatch_frame(&self, frame: &str) -> bool {
        match serde_json::from_str::<ProgressUpdate>(frame) {
            Ok(update) => self.dispatch(update),
            Err(e) => {
                warn!("Failed to parse progress update: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_listener(counter: Arc<AtomicUsize>) -> ProgressListener {
        Arc::new(move |_update| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn last_subscription_wins() {
        let channel = ProgressChannel::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        channel.subscribe("exec-1", counting_listener(first.clone()));
        channel.subscribe("exec-1", counting_listener(second.clone()));

        assert!(channel.dispatch(ProgressUpdate::running("exec-1", "research", 40)));
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn events_without_listener_are_dropped() {
        let channel = ProgressChannel::new();
        let counter = Arc::new(AtomicUsize::new(0));

        assert!(!channel.dispatch(ProgressUpdate::running("early", "research", 10)));

        channel.subscribe("early", counting_listener(counter.clone()));
        channel.unsubscribe("early");
        assert!(!channel.dispatch(ProgressUpdate::completed("early", "research")));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn frames_are_parsed_and_clamped() {
        let channel = ProgressChannel::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        channel.subscribe(
            "exec-2",
            Arc::new(move |update: ProgressUpdate| sink.lock().push(update)),
        );

        assert!(channel.dispatch_frame(
            r#"{"executionId":"exec-2","step":"draft","progress":250,"status":"running"}"#
        ));
        assert!(!channel.dispatch_frame("not json"));

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].progress, 100);
        assert_eq!(seen[0].status, ProgressStatus::Running);
    }

    #[test]
    fn fractional_and_out_of_range_percentages_are_accepted() {
        let channel = ProgressChannel::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        channel.subscribe(
            "exec-4",
            Arc::new(move |update: ProgressUpdate| sink.lock().push(update.progress)),
        );

        for progress in ["42.5", "300", "-5", "100.0"] {
            let frame = format!(
                r#"{{"executionId":"exec-4","step":"research","progress":{},"status":"running"}}"#,
                progress
            );
            assert!(channel.dispatch_frame(&frame), "frame with progress {}", progress);
        }

        assert_eq!(*seen.lock(), vec![43, 100, 0, 100]);
    }

    #[test]
    fn completed_frame_with_float_progress_is_delivered() {
        let channel = ProgressChannel::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        channel.subscribe(
            "exec-5",
            Arc::new(move |update: ProgressUpdate| *sink.lock() = Some(update.status)),
        );

        assert!(channel.dispatch_frame(
            r#"{"executionId":"exec-5","step":"export","progress":100.0,"status":"completed"}"#
        ));
        assert_eq!(*seen.lock(), Some(ProgressStatus::Completed));
    }

    #[test]
    fn listener_may_unsubscribe_itself() {
        let channel = ProgressChannel::new();
        let handle = channel.clone();
        channel.subscribe(
            "exec-3",
            Arc::new(move |update: ProgressUpdate| handle.unsubscribe(&update.execution_id)),
        );

        assert!(channel.dispatch(ProgressUpdate::completed("exec-3", "export")));
        assert!(!channel.is_subscribed("exec-3"));
    }
}

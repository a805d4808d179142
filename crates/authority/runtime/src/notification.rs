//! Notification sinks
//!
//! Committed notices are fanned out to every registered sink after the
//! operation that produced them has been applied. Aborted operations never
//! reach a sink.

use authority_types::AuthorityNotice;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Consumer of committed notices (telemetry, audit export, ...)
pub trait NotificationSink: Send + fmt::Debug {
    fn notify(&mut self, notice: &AuthorityNotice);
}

/// Logs every notice through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&mut self, notice: &AuthorityNotice) {
        info!(
            notice_id = %notice.notice_id,
            kind = notice.event.kind(),
            authority = %notice.event.authority(),
            caller = ?notice.caller,
            "Authority notice"
        );
    }
}

/// Collects notices into a shared buffer. Clones observe the same buffer.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    notices: Arc<Mutex<Vec<AuthorityNotice>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<AuthorityNotice> {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.notices.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for CollectingSink {
    fn notify(&mut self, notice: &AuthorityNotice) {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notice.clone());
    }
}

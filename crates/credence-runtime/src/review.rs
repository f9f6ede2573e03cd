//! Destinations for emitted review requests.
//!
//! Submission is write-only: the runtime never waits for a request to be
//! resolved and never reads one back.

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

use credence_core::ReviewRequest;

/// A sink refused or lost a request.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("review sink '{sink}' rejected request {request_id}: {reason}")]
pub struct SinkError {
    pub sink: String,
    pub request_id: Uuid,
    pub reason: String,
}

/// Receives review requests.
#[async_trait]
pub trait ReviewSink: Send + Sync {
    fn name(&self) -> &str;

    async fn submit(&self, request: &ReviewRequest) -> Result<(), SinkError>;
}

/// Keeps requests in memory, oldest first.
#[derive(Debug, Default)]
pub struct InMemoryReviewQueue {
    requests: Mutex<Vec<ReviewRequest>>,
}

impl InMemoryReviewQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.lock().is_empty()
    }

    /// Copy of the queued requests.
    pub fn pending(&self) -> Vec<ReviewRequest> {
        self.requests.lock().clone()
    }

    /// Remove and return every queued request.
    pub fn drain(&self) -> Vec<ReviewRequest> {
        std::mem::take(&mut *self.requests.lock())
    }
}

#[async_trait]
impl ReviewSink for InMemoryReviewQueue {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn submit(&self, request: &ReviewRequest) -> Result<(), SinkError> {
        self.requests.lock().push(request.clone());
        Ok(())
    }
}

/// Logs each request as a structured warning.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

#[async_trait]
impl ReviewSink for TracingSink {
    fn name(&self) -> &str {
        "tracing"
    }

    async fn submit(&self, request: &ReviewRequest) -> Result<(), SinkError> {
        tracing::warn!(
            request_id = %request.request_id,
            subject_id = %request.subject_id,
            context_id = %request.context_id,
            triggered_by = %request.triggered_by,
            severity = %request.severity,
            action = %request.action_taken,
            reason = %request.reason,
            "Review requested"
        );
        Ok(())
    }
}

//! Publish webhook placeholder.
//!
//! `POST /_ingest/github` is reserved for the publish pipeline. Until that
//! pipeline exists the gate only reports its state: 501 `disabled` when the
//! flag is off, 501 `not_implemented` when it is on.

use crate::error::ResolveError;

/// Work the publish pipeline still needs, reported with `disabled` responses.
pub const PENDING_INGEST_WORK: [&str; 3] = [
    "verify the webhook signature",
    "download and extract the release artifacts",
    "write artifacts, registry listings and latest pointers to the stores",
];

/// Feature-flagged gate in front of the publish webhook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestGate {
    enabled: bool,
}

impl IngestGate {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Handle a webhook delivery. Always an error for now.
    pub fn handle(&self) -> ResolveError {
        if self.enabled {
            ResolveError::NotImplemented
        } else {
            ResolveError::Disabled
        }
    }
}

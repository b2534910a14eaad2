//! Simulator error types

use thiserror::Error;

/// Errors returned by a [`crate::SnapshotSink`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    #[error("Transport not available yet")]
    TransportUnavailable,
}

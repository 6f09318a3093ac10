//! Error types for chan-stream
//!
//! Errors here describe the engine itself: a producer that lost its
//! consumer, a directory that could not be listed, a stage that died.
//! Values flowing through a stream never carry errors of their own.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for stream operations
#[derive(Debug, Error)]
pub enum StreamError {
    /// The reading side of the conveyor was dropped
    #[error("stream consumer is gone")]
    ConsumerGone,
    /// Non-blocking emit on a full conveyor
    #[error("stream buffer is full")]
    BufferFull,
    /// A directory could not be listed, so no stream was produced
    #[error("cannot list directory {}: {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A stage task panicked or was aborted
    #[error("stage failed: {0}")]
    StageFailed(String),
    /// I/O related errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<tokio::task::JoinError> for StreamError {
    fn from(err: tokio::task::JoinError) -> Self {
        StreamError::StageFailed(err.to_string())
    }
}

/// Result type for chan-stream operations
pub type StreamResult<T> = Result<T, StreamError>;

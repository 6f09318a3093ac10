//! Bounded conveyor between a producing stage and its consumer
//!
//! A conveyor is a tokio mpsc channel split into two restricted halves:
//! the producer only ever sees an [`Emitter`], the consumer only ever sees
//! the receiving side wrapped in a [`Stream`](crate::stream::Stream).
//! The stage that owns the emitter also holds a [`StageGuard`], so the
//! conveyor closes only once the emitter is gone *and* the stage returned.

use std::fmt;

use tokio::sync::mpsc;

use crate::error::{StreamError, StreamResult};

/// Allocate a conveyor of `capacity` slots.
///
/// `capacity` must be at least 1; callers go through
/// [`BufferConfig::capacity_for`](crate::stream_configuration::BufferConfig::capacity_for).
pub(crate) fn conveyor<T>(capacity: usize) -> (Emitter<T>, mpsc::Receiver<T>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (Emitter { sender }, receiver)
}

/// Write-only handle to a conveyor, handed to the producer of a stream.
///
/// Not `Clone`: each conveyor has exactly one writer.
pub struct Emitter<T> {
    sender: mpsc::Sender<T>,
}

/// Second sender held by the spawned stage itself, dropped when the stage
/// returns or unwinds.
pub(crate) struct StageGuard<T> {
    _sender: mpsc::Sender<T>,
}

impl<T> Emitter<T> {
    pub(crate) fn guard(&self) -> StageGuard<T> {
        StageGuard {
            _sender: self.sender.clone(),
        }
    }

    /// Enqueue an item, waiting while the conveyor is full
    pub async fn emit(&self, item: T) -> StreamResult<()> {
        self.sender
            .send(item)
            .await
            .map_err(|_| StreamError::ConsumerGone)
    }

    /// Try to enqueue an item without waiting
    pub fn try_emit(&self, item: T) -> StreamResult<()> {
        match self.sender.try_send(item) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(StreamError::BufferFull),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(StreamError::ConsumerGone),
        }
    }

    /// Enqueue an item from synchronous code, blocking the current thread.
    ///
    /// Panics if called from within an async execution context, like
    /// tokio's own `blocking_send`.
    pub fn blocking_emit(&self, item: T) -> StreamResult<()> {
        self.sender
            .blocking_send(item)
            .map_err(|_| StreamError::ConsumerGone)
    }

    /// Whether the consumer has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Free slots right now
    pub fn available_capacity(&self) -> usize {
        self.sender.capacity()
    }

    /// Total slots of the conveyor
    pub fn max_capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter")
            .field("capacity", &self.sender.max_capacity())
            .field("available", &self.sender.capacity())
            .field("is_closed", &self.sender.is_closed())
            .finish()
    }
}

/// Conveyor statistics for monitoring and debugging
#[derive(Debug, Clone, PartialEq)]
pub struct ConveyorStats {
    pub length: usize,
    pub capacity: usize,
    pub utilization: f64, // 0.0 to 1.0
    pub is_closed: bool,
}

impl ConveyorStats {
    pub(crate) fn of<T>(receiver: &mpsc::Receiver<T>, capacity: usize) -> Self {
        let length = receiver.len();
        let utilization = if capacity > 0 {
            length as f64 / capacity as f64
        } else {
            0.0
        };
        Self {
            length,
            capacity,
            utilization,
            is_closed: receiver.is_closed(),
        }
    }
}

impl fmt::Display for ConveyorStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Conveyor({}/{}, {:.1}%{})",
            self.length,
            self.capacity,
            self.utilization * 100.0,
            if self.is_closed { ", closed" } else { "" }
        )
    }
}

//! The stream engine
//!
//! A [`Stream`] is the reading side of a bounded conveyor fed by exactly one
//! spawned stage. Non-terminal combinators (`map`, `filter`) consume the
//! stream and spawn a new stage that drains it into a fresh conveyor.
//! Terminal operations (`reduce`, `for_each`, `collect`) drain it in the
//! awaiting caller.
//!
//! Every stage is a tokio task, so streams must be built from inside a
//! tokio runtime.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::conveyor::{conveyor, ConveyorStats, Emitter};
use crate::error::StreamResult;
use crate::stream_configuration::BufferConfig;

/// Lifecycle of a stream's conveyor. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// The producing stage is still running
    Open,
    /// The producer is done, buffered values remain
    Closing,
    /// Closed and empty; every read yields end-of-sequence
    Drained,
}

/// Completion handle of a spawned stage
#[derive(Debug)]
pub struct StageHandle {
    label: &'static str,
    task: JoinHandle<()>,
}

impl StageHandle {
    /// Name of the stage this handle belongs to
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Whether the stage task has run to completion
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the stage to finish. A panicked stage yields
    /// [`StreamError::StageFailed`](crate::error::StreamError::StageFailed).
    pub async fn join(self) -> StreamResult<()> {
        self.task.await?;
        Ok(())
    }
}

/// A lazy, concurrently produced, closable sequence of values.
pub struct Stream<T> {
    receiver: mpsc::Receiver<T>,
    capacity: usize,
    label: &'static str,
    config: BufferConfig,
    handle: Option<StageHandle>,
}

impl<T> Stream<T>
where
    T: Send + 'static,
{
    /// Allocate a conveyor and spawn the stage that feeds it.
    ///
    /// The conveyor stays open until the producer future completes or
    /// unwinds, even if the producer drops its emitter earlier.
    pub(crate) fn spawn<F, Fut>(
        label: &'static str,
        config: BufferConfig,
        capacity_hint: usize,
        producer: F,
    ) -> Self
    where
        F: FnOnce(Emitter<T>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let capacity = config.capacity_for(capacity_hint);
        let (emitter, receiver) = conveyor(capacity);
        let guard = emitter.guard();
        let work = producer(emitter);

        let task = tokio::spawn(async move {
            log::trace!("{} stage started (capacity {})", label, capacity);
            work.await;
            drop(guard);
            log::trace!("{} stage finished", label);
        });

        Self::with_handle(receiver, capacity, label, config, StageHandle { label, task })
    }

    /// Like [`Stream::spawn`] for a synchronous producer, run on tokio's
    /// blocking pool.
    pub(crate) fn spawn_blocking<F>(
        label: &'static str,
        config: BufferConfig,
        capacity_hint: usize,
        producer: F,
    ) -> Self
    where
        F: FnOnce(Emitter<T>) + Send + 'static,
    {
        let capacity = config.capacity_for(capacity_hint);
        let (emitter, receiver) = conveyor(capacity);
        let guard = emitter.guard();

        let task = tokio::task::spawn_blocking(move || {
            log::trace!("{} stage started (capacity {})", label, capacity);
            producer(emitter);
            drop(guard);
            log::trace!("{} stage finished", label);
        });

        Self::with_handle(receiver, capacity, label, config, StageHandle { label, task })
    }

    fn with_handle(
        receiver: mpsc::Receiver<T>,
        capacity: usize,
        label: &'static str,
        config: BufferConfig,
        handle: StageHandle,
    ) -> Self {
        Self {
            receiver,
            capacity,
            label,
            config,
            handle: Some(handle),
        }
    }

    /// Transform every value on a new stage.
    ///
    /// The output conveyor inherits this stream's capacity unless the
    /// stream's [`BufferConfig`] fixes a stage capacity.
    pub fn map<U, F>(self, mut f: F) -> Stream<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        let config = self.config;
        let capacity = config.stage_capacity_for(self.capacity);
        let mut input = self;

        Stream::spawn("map", config, capacity, move |out| async move {
            while let Some(item) = input.recv().await {
                if out.emit(f(item)).await.is_err() {
                    log::debug!("map stage: consumer gone, stopping");
                    break;
                }
            }
        })
    }

    /// Keep only the values matching `predicate`, on a new stage.
    pub fn filter<F>(self, mut predicate: F) -> Stream<T>
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        let config = self.config;
        let capacity = config.stage_capacity_for(self.capacity);
        let mut input = self;

        Stream::spawn("filter", config, capacity, move |out| async move {
            while let Some(item) = input.recv().await {
                if !predicate(&item) {
                    continue;
                }
                if out.emit(item).await.is_err() {
                    log::debug!("filter stage: consumer gone, stopping");
                    break;
                }
            }
        })
    }
}

impl<T> Stream<T> {
    /// Pull the next value, waiting while the conveyor is empty and open.
    /// Returns `None` once the stream is drained.
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Fold the stream left to right, seeding the accumulator with the
    /// first value. An empty stream reduces to `T::default()`.
    pub async fn reduce<F>(mut self, mut combine: F) -> T
    where
        T: Default,
        F: FnMut(T, T) -> T,
    {
        let mut acc = match self.recv().await {
            Some(first) => first,
            None => return T::default(),
        };
        while let Some(item) = self.recv().await {
            acc = combine(acc, item);
        }
        acc
    }

    /// Run `action` on every value in delivery order
    pub async fn for_each<F>(mut self, mut action: F)
    where
        F: FnMut(T),
    {
        while let Some(item) = self.recv().await {
            action(item);
        }
    }

    /// Drain the stream into a vector, preserving delivery order
    pub async fn collect(mut self) -> Vec<T> {
        let mut items = Vec::with_capacity(self.receiver.len());
        while let Some(item) = self.recv().await {
            items.push(item);
        }
        items
    }

    /// Consume the stream from synchronous code.
    ///
    /// Each `next()` blocks the current thread, so the iterator must not be
    /// driven from inside an async context.
    pub fn into_blocking_iter(self) -> BlockingIter<T> {
        BlockingIter {
            receiver: self.receiver,
        }
    }

    /// Detach the completion handle of the stage feeding this stream
    pub fn take_handle(&mut self) -> Option<StageHandle> {
        self.handle.take()
    }

    pub fn state(&self) -> StreamState {
        if !self.receiver.is_closed() {
            StreamState::Open
        } else if !self.receiver.is_empty() {
            StreamState::Closing
        } else {
            StreamState::Drained
        }
    }

    /// Name of the stage feeding this stream
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Conveyor capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Values currently buffered
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    pub fn stats(&self) -> ConveyorStats {
        ConveyorStats::of(&self.receiver, self.capacity)
    }
}

impl<T> futures_core::Stream for Stream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().receiver.poll_recv(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.receiver.len(), None)
    }
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("label", &self.label)
            .field("capacity", &self.capacity)
            .field("length", &self.receiver.len())
            .field("state", &self.state())
            .finish()
    }
}

/// Blocking iterator over a stream, see [`Stream::into_blocking_iter`]
#[derive(Debug)]
pub struct BlockingIter<T> {
    receiver: mpsc::Receiver<T>,
}

impl<T> Iterator for BlockingIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.receiver.blocking_recv()
    }
}

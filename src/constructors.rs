//! Stream constructors: from_fn, from_blocking_fn, from_iter, from_map, of!
//!
//! Each constructor allocates one conveyor, spawns exactly one producer
//! stage and returns without waiting for it.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::conveyor::Emitter;
use crate::error::{StreamError, StreamResult};
use crate::stream::Stream;
use crate::stream_configuration::BufferConfig;

/// One entry of an associative container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pair<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Pair<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    pub fn into_tuple(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> From<(K, V)> for Pair<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self { key, value }
    }
}

impl<K, V> From<Pair<K, V>> for (K, V) {
    fn from(pair: Pair<K, V>) -> Self {
        pair.into_tuple()
    }
}

fn log_generator_exit(label: &str, result: StreamResult<()>) {
    match result {
        Ok(()) => {}
        Err(StreamError::ConsumerGone) => {
            log::debug!("{} generator stopped: consumer gone", label)
        }
        Err(err) => log::warn!("{} generator failed: {}", label, err),
    }
}

/// Build a stream from an async generator.
///
/// The generator receives the write handle and emits zero or more values.
/// The stream closes once the generator's future completes, whatever its
/// result; an `Err` is only logged. `capacity` is clamped to at least 1.
///
/// # Examples
/// ```
/// use chan_stream::from_fn;
///
/// # #[tokio::main]
/// # async fn main() {
/// let squares = from_fn(4, |out| async move {
///     for i in 1..=4 {
///         out.emit(i * i).await?;
///     }
///     Ok(())
/// });
/// assert_eq!(squares.collect().await, vec![1, 4, 9, 16]);
/// # }
/// ```
pub fn from_fn<T, F, Fut>(capacity: usize, generator: F) -> Stream<T>
where
    T: Send + 'static,
    F: FnOnce(Emitter<T>) -> Fut + Send + 'static,
    Fut: Future<Output = StreamResult<()>> + Send + 'static,
{
    Stream::spawn("from_fn", BufferConfig::default(), capacity, move |out| async move {
        log_generator_exit("from_fn", generator(out).await);
    })
}

/// Build a stream from a synchronous generator running on the blocking pool.
///
/// Use [`Emitter::blocking_emit`] inside the generator.
pub fn from_blocking_fn<T, F>(capacity: usize, generator: F) -> Stream<T>
where
    T: Send + 'static,
    F: FnOnce(Emitter<T>) -> StreamResult<()> + Send + 'static,
{
    Stream::spawn_blocking("from_blocking_fn", BufferConfig::default(), capacity, move |out| {
        log_generator_exit("from_blocking_fn", generator(out));
    })
}

fn spawn_iter<I>(label: &'static str, config: BufferConfig, iter: I) -> Stream<I::Item>
where
    I: Iterator + Send + 'static,
    I::Item: Send + 'static,
{
    let (lower, upper) = iter.size_hint();
    Stream::spawn(label, config, upper.unwrap_or(lower), move |out| async move {
        for item in iter {
            if out.emit(item).await.is_err() {
                log::debug!("{} stage: consumer gone, stopping", label);
                break;
            }
        }
    })
}

/// Create a stream from a sequence, preserving its order
pub fn from_iter<I>(iter: I) -> Stream<I::Item>
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    from_iter_with_config(iter, BufferConfig::default())
}

pub fn from_iter_with_config<I>(iter: I, config: BufferConfig) -> Stream<I::Item>
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
    I::Item: Send + 'static,
{
    spawn_iter("from_iter", config, iter.into_iter())
}

/// Create a stream of [`Pair`]s from an associative container.
///
/// Entries arrive in the container's own iteration order, which is
/// unspecified for hash maps.
pub fn from_map<M, K, V>(map: M) -> Stream<Pair<K, V>>
where
    M: IntoIterator<Item = (K, V)>,
    M::IntoIter: Send + 'static,
    K: Send + 'static,
    V: Send + 'static,
{
    from_map_with_config(map, BufferConfig::default())
}

pub fn from_map_with_config<M, K, V>(map: M, config: BufferConfig) -> Stream<Pair<K, V>>
where
    M: IntoIterator<Item = (K, V)>,
    M::IntoIter: Send + 'static,
    K: Send + 'static,
    V: Send + 'static,
{
    spawn_iter("from_map", config, map.into_iter().map(Pair::from))
}

/// Create a stream from a list of values.
///
/// ```
/// # #[tokio::main]
/// # async fn main() {
/// let s = chan_stream::of![1, 2, 3];
/// assert_eq!(s.reduce(|a, b| a + b).await, 6);
/// # }
/// ```
#[macro_export]
macro_rules! of {
    ($($value:expr),* $(,)?) => {
        $crate::constructors::from_iter(::std::vec![$($value),*])
    };
}

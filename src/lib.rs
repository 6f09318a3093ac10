//! chan-stream: lazy streams produced by concurrent tokio stages
//!
//! Every constructor and every non-terminal combinator spawns exactly one
//! task that writes into a bounded conveyor. Terminal operations drain the
//! final conveyor in the awaiting caller.
//!
//! ```
//! use chan_stream::from_iter;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let total = from_iter(1..=4)
//!     .filter(|x| x % 2 == 0)
//!     .map(|x| x * 10)
//!     .reduce(|a, b| a + b)
//!     .await;
//! assert_eq!(total, 60);
//! # }
//! ```

pub mod conveyor;
pub mod error;
pub mod stream;
pub mod constructors;

pub mod pipe;
pub mod files;

pub mod stream_configuration;

pub use constructors::{
    from_blocking_fn, from_fn, from_iter, from_iter_with_config, from_map, from_map_with_config,
    Pair,
};
pub use conveyor::{ConveyorStats, Emitter};
pub use error::{StreamError, StreamResult};
pub use files::{dir, files, BoxFile, File, FileBuffer, OsFile};
pub use stream::{BlockingIter, StageHandle, Stream, StreamState};
pub use stream_configuration::BufferConfig;

//! Configuration types for conveyor buffering

use serde::{Deserialize, Serialize};

/// Buffer configuration for stream conveyors.
///
/// Capacities are a throughput knob only. A stage never relies on its
/// buffer being large enough to hold the whole sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Smallest conveyor ever allocated. Values below 1 are treated as 1.
    pub min_capacity: usize,
    /// Largest conveyor ever allocated, whatever the source length.
    pub max_capacity: usize,
    /// Fixed capacity for `map`/`filter` outputs instead of inheriting
    /// the upstream capacity.
    pub stage_capacity: Option<usize>,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            min_capacity: 1,
            max_capacity: 64 * 1024,
            stage_capacity: None,
        }
    }
}

impl BufferConfig {
    /// Conveyor capacity to allocate for a source with the given length hint
    pub fn capacity_for(&self, hint: usize) -> usize {
        let min = self.min_capacity.max(1);
        let max = self.max_capacity.max(min);
        hint.clamp(min, max)
    }

    /// Conveyor capacity for a combinator stage fed by an upstream of `upstream` capacity
    pub fn stage_capacity_for(&self, upstream: usize) -> usize {
        self.capacity_for(self.stage_capacity.unwrap_or(upstream))
    }
}

//! Bounded batching primitives
//!
//! `partition` and `plan` split work items to respect a provider ceiling;
//! `Aggregator` merges the chunk results back into one outcome without
//! dropping any per-item failure.

pub mod aggregate;
pub mod partition;

pub use aggregate::{aggregate, Accumulate, Aggregator, ChunkOutcome};
pub use partition::{partition, plan, Plan};

use thiserror::Error;

use crate::memory::MemoryError;

/// Precondition violations aborting a trace-generation run.
///
/// None of these can be produced by a well-formed instruction stream. Once
/// one is returned, the run is over and the builder must be reset before it
/// is used again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("internal return with an empty call stack")]
    EmptyCallStack,

    #[error(
        "trace capacity exceeded: {main} main rows and {memory} memory accesses do not fit in {capacity} rows"
    )]
    CapacityExceeded {
        main: usize,
        memory: usize,
        capacity: usize,
    },

    #[error("invalid trace configuration: {0}")]
    InvalidConfig(String),

    #[error("calldata range {offset}..{offset}+{size} exceeds calldata of length {len}")]
    CalldataOutOfBounds { offset: u32, size: u32, len: usize },
}

use thiserror::Error;

/// Violations of the memory access contract.
///
/// These never describe a provable runtime condition: tag mismatches are
/// recorded in the memory trace instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("memory address {addr} is out of bounds (memory size is {size})")]
    OutOfBounds { addr: u32, size: usize },
}

//! Execution-trace generator of the MiniVM.
//!
//! The VM executes a small instruction set over a tagged flat memory whose
//! cells hold elements of the BN254 scalar field. Running a program produces
//! two logs: the main trace, one [`Row`] per executed step, and the memory
//! trace, one entry per load or store. [`TraceBuilder::finalize`] sorts the
//! memory trace and merges both into a single fixed-size trace meant to be
//! consumed by a constraint system.
//!
//! Runtime faults a proof must be able to express, such as a division by
//! zero or a memory tag mismatch, never abort execution: they are recorded
//! as flags and witnesses in the trace.

pub mod config;
pub mod execution;
pub mod field;
pub mod memory;
mod opcodes;
pub mod stats;
pub mod util;

pub use config::TraceConfig;
pub use execution::{run, Instruction, Row, TraceBuilder, TraceError};
pub use field::FF;
pub use memory::{Memory, MemoryError, MemoryTag, MemoryTraceEntry};
pub use opcodes::Opcode;

//! Execution of the instruction set and construction of the main trace.

mod error;
mod finalize;
mod interpreter;
mod row;
mod trace_builder;

pub use error::TraceError;
pub use interpreter::{run, Instruction};
pub use row::Row;
pub use trace_builder::TraceBuilder;

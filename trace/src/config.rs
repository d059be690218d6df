use crate::execution::TraceError;

/// Sizes of a trace-generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceConfig {
    /// Number of rows of the finalized trace, shift row included.
    pub trace_size: usize,
    /// Number of memory cells.
    pub memory_size: usize,
    /// First memory address of the internal call stack region.
    pub callstack_offset: u32,
}

impl TraceConfig {
    pub const DEFAULT_TRACE_SIZE: usize = 256;
    pub const DEFAULT_MEMORY_SIZE: usize = 1024;
    pub const DEFAULT_CALLSTACK_OFFSET: u32 = 896;

    pub const fn new(trace_size: usize, memory_size: usize, callstack_offset: u32) -> Self {
        Self {
            trace_size,
            memory_size,
            callstack_offset,
        }
    }

    pub fn validate(&self) -> Result<(), TraceError> {
        if self.trace_size < 2 {
            return Err(TraceError::InvalidConfig(format!(
                "trace size must hold the shift row and one step, got {}",
                self.trace_size
            )));
        }
        if self.callstack_offset as usize >= self.memory_size {
            return Err(TraceError::InvalidConfig(format!(
                "call stack offset {} lies outside a memory of {} cells",
                self.callstack_offset, self.memory_size
            )));
        }
        Ok(())
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_TRACE_SIZE,
            Self::DEFAULT_MEMORY_SIZE,
            Self::DEFAULT_CALLSTACK_OFFSET,
        )
    }
}

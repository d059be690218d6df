use ark_ff::One;
use tracing::{debug, instrument};

use super::{Row, TraceBuilder, TraceError};
use crate::field::FF;

impl TraceBuilder {
    /// Finalizes the run into a trace of exactly `trace_size` rows.
    ///
    /// The memory trace is sorted and spliced into the `mem_*` columns row by
    /// row, the main trace is padded with empty rows, the last executed step
    /// is flagged and a shift row is prepended. The builder is reset
    /// afterwards.
    ///
    /// Both traces must be strictly shorter than `trace_size`, leaving room
    /// for the shift row.
    #[instrument(level = "debug", skip(self))]
    pub fn finalize(&mut self) -> Result<Vec<Row>, TraceError> {
        let capacity = self.config().trace_size;
        let main_trace_size = self.main_trace.len();
        let mem_trace_size = self.memory.trace_len();

        if main_trace_size >= capacity || mem_trace_size >= capacity {
            return Err(TraceError::CapacityExceeded {
                main: main_trace_size,
                memory: mem_trace_size,
                capacity,
            });
        }

        let mem_trace = self.memory.finalize();
        let mut main_trace = std::mem::take(&mut self.main_trace);

        // Fill the rest with zeros.
        main_trace.resize(capacity - 1, Row::default());

        if let Some(last_step) = main_trace_size.checked_sub(1) {
            main_trace[last_step].last = FF::one();
        }

        for (dest, src) in main_trace.iter_mut().zip(&mem_trace) {
            dest.splice_memory_entry(src);
        }
        if let Some(last_access) = mem_trace_size.checked_sub(1) {
            main_trace[last_access].mem_last = FF::one();
        }

        // Shift row giving every shifted column a predecessor.
        let first_row = Row {
            first: FF::one(),
            mem_last_access: FF::one(),
            ..Row::default()
        };
        main_trace.insert(0, first_row);

        debug!(
            steps = main_trace_size,
            memory_accesses = mem_trace_size,
            padding = capacity - 1 - main_trace_size,
            "finalized trace"
        );
        self.stats.log_summary();
        self.reset();

        Ok(main_trace)
    }
}

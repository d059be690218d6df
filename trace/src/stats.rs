use std::time::{Duration, Instant};

use strum::{EnumCount, IntoEnumIterator};
use tracing::info;

use crate::Opcode;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeStats {
    pub count: u64,
    pub rows: u64,
    pub total_time: Duration,
}

impl OpcodeStats {
    pub fn average_time(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total_time.div_f64(self.count as f64)
        }
    }
}

/// Per-opcode execution counters of a single run.
#[derive(Debug, Clone)]
pub struct AllOpcodeStats {
    stats: [OpcodeStats; Opcode::COUNT],
}

impl Default for AllOpcodeStats {
    fn default() -> Self {
        Self {
            stats: [OpcodeStats::default(); Opcode::COUNT],
        }
    }
}

impl AllOpcodeStats {
    /// Runs `f`, which must return the number of rows it emitted, and
    /// accounts the invocation to `opcode`.
    pub(crate) fn record<T, E>(
        &mut self,
        opcode: Opcode,
        f: impl FnOnce() -> Result<(T, usize), E>,
    ) -> Result<T, E> {
        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        let (value, rows) = result?;
        self.account(opcode, rows, elapsed);
        Ok(value)
    }

    /// Same as [`Self::record`] for steps that cannot fail.
    pub(crate) fn record_infallible<T>(
        &mut self,
        opcode: Opcode,
        f: impl FnOnce() -> (T, usize),
    ) -> T {
        let start = Instant::now();
        let (value, rows) = f();
        self.account(opcode, rows, start.elapsed());
        value
    }

    fn account(&mut self, opcode: Opcode, rows: usize, elapsed: Duration) {
        let entry = &mut self.stats[u8::from(opcode) as usize];
        entry.count += 1;
        entry.rows += rows as u64;
        entry.total_time += elapsed;
    }

    pub fn get(&self, opcode: Opcode) -> &OpcodeStats {
        &self.stats[u8::from(opcode) as usize]
    }

    pub fn total_count(&self) -> u64 {
        self.stats.iter().map(|s| s.count).sum()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn log_summary(&self) {
        for opcode in Opcode::iter() {
            let stats = self.get(opcode);
            if stats.count == 0 {
                continue;
            }
            info!(
                %opcode,
                count = stats.count,
                rows = stats.rows,
                average = ?stats.average_time(),
                "opcode stats"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts_only_successes() {
        let mut stats = AllOpcodeStats::default();
        let ok: Result<u32, ()> = stats.record(Opcode::Add, || Ok((7, 1)));
        assert_eq!(ok, Ok(7));
        let err: Result<u32, ()> = stats.record(Opcode::Add, || Err(()));
        assert!(err.is_err());
        let _: Result<(), ()> = stats.record(Opcode::CallDataCopy, || Ok(((), 3)));

        assert_eq!(stats.get(Opcode::Add).count, 1);
        assert_eq!(stats.get(Opcode::CallDataCopy).rows, 3);
        assert_eq!(stats.total_count(), 2);

        stats.reset();
        assert_eq!(stats.total_count(), 0);
    }

    #[test]
    fn test_record_infallible() {
        let mut stats = AllOpcodeStats::default();
        let value = stats.record_infallible(Opcode::Jump, || ("jumped", 1));
        assert_eq!(value, "jumped");
        stats.record_infallible(Opcode::Jump, || ((), 1));

        assert_eq!(stats.get(Opcode::Jump).count, 2);
        assert_eq!(stats.get(Opcode::Jump).rows, 2);
    }

    #[test]
    fn test_average_time_with_large_count() {
        let stats = OpcodeStats {
            count: 1 << 32,
            rows: 1 << 32,
            total_time: Duration::from_secs(1 << 32),
        };
        assert_eq!(stats.average_time(), Duration::from_secs(1));

        let stats = OpcodeStats {
            count: 3,
            rows: 3,
            total_time: Duration::from_secs(6),
        };
        assert_eq!(stats.average_time(), Duration::from_secs(2));
        assert_eq!(OpcodeStats::default().average_time(), Duration::ZERO);
    }
}

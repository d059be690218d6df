#![allow(dead_code)]

use ark_ff::One;
use minivm_trace::{Opcode, Row, FF};

pub fn ff(value: u64) -> FF {
    FF::from(value)
}

pub fn ffs(values: &[u64]) -> Vec<FF> {
    values.iter().copied().map(ff).collect()
}

/// First row carrying the selector of `opcode`.
pub fn find_row(trace: &[Row], opcode: Opcode) -> &Row {
    trace
        .iter()
        .find(|row| row.is_selected(opcode))
        .unwrap_or_else(|| panic!("no {opcode} row in trace"))
}

/// Rows holding an executed step, shift row excluded.
pub fn executed_rows(trace: &[Row]) -> &[Row] {
    let last = trace
        .iter()
        .rposition(|row| row.last.is_one())
        .expect("trace has no last row");
    &trace[1..=last]
}

/// Rows holding a memory trace entry, shift row excluded.
pub fn memory_rows(trace: &[Row]) -> &[Row] {
    let last = trace
        .iter()
        .rposition(|row| row.mem_last.is_one())
        .expect("trace has no memory rows");
    &trace[1..=last]
}

use ark_ff::One;

use crate::{
    field::{ff_bool, ff_u32, FF},
    memory::{IntermRegister, MemoryTraceEntry},
    Opcode,
};

/// One row of the main execution trace.
///
/// The upper columns describe one executed step in program order. The
/// `mem_*` columns are filled by finalize with the sorted memory trace and
/// are unrelated to the step recorded on the same row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    // Control
    pub clk: FF,
    pub pc: FF,
    pub internal_return_ptr: FF,
    pub first: FF,
    pub last: FF,

    // Selectors
    pub sel_op_add: FF,
    pub sel_op_sub: FF,
    pub sel_op_mul: FF,
    pub sel_op_div: FF,
    pub sel_jump: FF,
    pub sel_internal_call: FF,
    pub sel_internal_return: FF,
    pub sel_halt: FF,

    // Instruction tag and errors
    pub in_tag: FF,
    pub op_err: FF,
    pub tag_err: FF,
    /// Inverse of the divisor on division rows, `1` when none exists.
    pub inv: FF,

    // Intermediate registers
    pub ia: FF,
    pub ib: FF,
    pub ic: FF,

    // Memory operations per register
    pub mem_op_a: FF,
    pub mem_op_b: FF,
    pub mem_op_c: FF,
    pub rwa: FF,
    pub rwb: FF,
    pub rwc: FF,
    pub mem_idx_a: FF,
    pub mem_idx_b: FF,
    pub mem_idx_c: FF,

    // Sorted memory trace
    pub mem_clk: FF,
    pub mem_sub_clk: FF,
    pub mem_addr: FF,
    pub mem_val: FF,
    pub mem_rw: FF,
    pub mem_in_tag: FF,
    pub mem_tag: FF,
    pub mem_tag_err: FF,
    pub mem_one_min_inv: FF,
    pub mem_last_access: FF,
    pub mem_last: FF,
}

impl Row {
    /// Copies a sorted memory trace entry into the `mem_*` columns.
    pub(crate) fn splice_memory_entry(&mut self, entry: &MemoryTraceEntry) {
        self.mem_clk = ff_u32(entry.clk);
        self.mem_sub_clk = ff_u32(entry.sub_clk);
        self.mem_addr = ff_u32(entry.addr);
        self.mem_val = entry.val;
        self.mem_rw = ff_bool(entry.rw);
        self.mem_in_tag = entry.in_tag.to_ff();
        self.mem_tag = entry.tag.to_ff();
        self.mem_tag_err = ff_bool(entry.tag_err);
        self.mem_one_min_inv = entry.one_min_inv;
        self.mem_last_access = ff_bool(entry.last_access);
    }

    /// Sets the selector column of `opcode`. `CallDataCopy` has none.
    pub(crate) fn set_selector(&mut self, opcode: Opcode) {
        let selector = match opcode {
            Opcode::Add => &mut self.sel_op_add,
            Opcode::Sub => &mut self.sel_op_sub,
            Opcode::Mul => &mut self.sel_op_mul,
            Opcode::Div => &mut self.sel_op_div,
            Opcode::Jump => &mut self.sel_jump,
            Opcode::InternalCall => &mut self.sel_internal_call,
            Opcode::InternalReturn => &mut self.sel_internal_return,
            Opcode::Return | Opcode::Halt => &mut self.sel_halt,
            Opcode::CallDataCopy => return,
        };
        *selector = FF::one();
    }

    /// Records a memory operation of `reg` moving `val` at `addr`.
    pub(crate) fn set_register(&mut self, reg: IntermRegister, val: FF, addr: u32, write: bool) {
        let (ir, mem_op, rw, mem_idx) = match reg {
            IntermRegister::Ia => (
                &mut self.ia,
                &mut self.mem_op_a,
                &mut self.rwa,
                &mut self.mem_idx_a,
            ),
            IntermRegister::Ib => (
                &mut self.ib,
                &mut self.mem_op_b,
                &mut self.rwb,
                &mut self.mem_idx_b,
            ),
            IntermRegister::Ic => (
                &mut self.ic,
                &mut self.mem_op_c,
                &mut self.rwc,
                &mut self.mem_idx_c,
            ),
        };
        *ir = val;
        *mem_op = FF::one();
        *rw = ff_bool(write);
        *mem_idx = ff_u32(addr);
    }

    /// Whether the selector of `opcode` is set on this row.
    pub fn is_selected(&self, opcode: Opcode) -> bool {
        let selector = match opcode {
            Opcode::Add => self.sel_op_add,
            Opcode::Sub => self.sel_op_sub,
            Opcode::Mul => self.sel_op_mul,
            Opcode::Div => self.sel_op_div,
            Opcode::Jump => self.sel_jump,
            Opcode::InternalCall => self.sel_internal_call,
            Opcode::InternalReturn => self.sel_internal_return,
            Opcode::Return | Opcode::Halt => self.sel_halt,
            Opcode::CallDataCopy => return false,
        };
        selector.is_one()
    }
}

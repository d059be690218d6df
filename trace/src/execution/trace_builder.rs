use ark_ff::{Field, One, Zero};
use tracing::instrument;

use super::{Row, TraceError};
use crate::{
    config::TraceConfig,
    field::{ff_bool, ff_u32, FF},
    memory::{IntermRegister, MemRead, Memory, MemoryError, MemoryTag},
    stats::AllOpcodeStats,
    Opcode,
};

const REGISTERS: [IntermRegister; 3] = [
    IntermRegister::Ia,
    IntermRegister::Ib,
    IntermRegister::Ic,
];

/// Builds the main execution trace of a run, one row per executed step.
///
/// Each opcode method performs its memory accesses through the owned
/// [`Memory`], then appends exactly one row (or one row per group of three
/// elements for the copy opcodes). Callers must invoke opcodes strictly in
/// program order, since the row index is the clock.
#[derive(Debug, Clone)]
pub struct TraceBuilder {
    config: TraceConfig,
    pub(super) main_trace: Vec<Row>,
    pub(super) memory: Memory,
    pc: u32,
    internal_return_ptr: u32,
    internal_call_stack: Vec<u32>,
    pub(super) stats: AllOpcodeStats,
}

impl Default for TraceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TraceBuilder {
    /// Creates a builder with the default [`TraceConfig`].
    pub fn new() -> Self {
        Self::from_valid_config(TraceConfig::default())
    }

    pub fn with_config(config: TraceConfig) -> Result<Self, TraceError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: TraceConfig) -> Self {
        Self {
            config,
            main_trace: Vec::with_capacity(config.trace_size),
            memory: Memory::new(config.memory_size),
            pc: 0,
            internal_return_ptr: config.callstack_offset,
            internal_call_stack: Vec::new(),
            stats: AllOpcodeStats::default(),
        }
    }

    /// Brings the builder back to its initial state so that a new trace can
    /// be built with the same object.
    pub fn reset(&mut self) {
        self.main_trace.clear();
        self.memory.reset();
        self.pc = 0;
        self.internal_return_ptr = self.config.callstack_offset;
        self.internal_call_stack.clear();
        self.stats.reset();
    }

    pub const fn config(&self) -> &TraceConfig {
        &self.config
    }

    pub const fn pc(&self) -> u32 {
        self.pc
    }

    pub const fn internal_return_ptr(&self) -> u32 {
        self.internal_return_ptr
    }

    /// Depth of the internal call stack.
    pub fn call_depth(&self) -> usize {
        self.internal_call_stack.len()
    }

    /// Rows recorded so far, before padding.
    pub fn rows(&self) -> &[Row] {
        &self.main_trace
    }

    pub const fn memory(&self) -> &Memory {
        &self.memory
    }

    pub const fn stats(&self) -> &AllOpcodeStats {
        &self.stats
    }

    fn clk(&self) -> u32 {
        self.main_trace.len() as u32
    }

    /// Row skeleton carrying the control columns of the current step.
    fn new_row(&self, opcode: Opcode) -> Row {
        let mut row = Row {
            clk: ff_u32(self.clk()),
            pc: ff_u32(self.pc),
            internal_return_ptr: ff_u32(self.internal_return_ptr),
            ..Row::default()
        };
        row.set_selector(opcode);
        row
    }

    fn push_row(&mut self, opcode: Opcode, row: Row) {
        assert!(
            row.op_err.is_zero() || opcode.may_raise_op_err(),
            "{opcode} cannot raise an operation error"
        );
        self.main_trace.push(row);
    }

    /// Runs `f` and accounts it, with the rows it appended, to `opcode`.
    fn record<T>(
        &mut self,
        opcode: Opcode,
        f: impl FnOnce(&mut Self) -> Result<T, TraceError>,
    ) -> Result<T, TraceError> {
        let mut stats = std::mem::take(&mut self.stats);
        let rows_before = self.main_trace.len();
        let result = stats.record(opcode, || {
            let value = f(self)?;
            Ok((value, self.main_trace.len() - rows_before))
        });
        self.stats = stats;
        result
    }

    /// Same as [`Self::record`] for steps without a failure path.
    fn record_infallible(&mut self, opcode: Opcode, f: impl FnOnce(&mut Self)) {
        let mut stats = std::mem::take(&mut self.stats);
        let rows_before = self.main_trace.len();
        stats.record_infallible(opcode, || {
            f(self);
            ((), self.main_trace.len() - rows_before)
        });
        self.stats = stats;
    }

    /// Checks that `[offset, offset + size)` lies in memory.
    fn check_range(&self, offset: u32, size: u32) -> Result<(), TraceError> {
        if size == 0 {
            return Ok(());
        }
        let last = offset
            .checked_add(size - 1)
            .ok_or(MemoryError::OutOfBounds {
                addr: u32::MAX,
                size: self.memory.size(),
            })?;
        self.memory.check_addr(offset)?;
        self.memory.check_addr(last)?;
        Ok(())
    }

    /// Loads both operands of a binary operation into `ia` and `ib`.
    ///
    /// All three addresses are checked first so that a rejected instruction
    /// leaves no trace behind.
    fn load_operands(
        &mut self,
        a_offset: u32,
        b_offset: u32,
        dst_offset: u32,
        in_tag: MemoryTag,
    ) -> Result<(MemRead, MemRead), TraceError> {
        for addr in [a_offset, b_offset, dst_offset] {
            self.memory.check_addr(addr)?;
        }
        let clk = self.clk();
        let a = self.memory.read(clk, IntermRegister::Ia, a_offset, in_tag)?;
        let b = self.memory.read(clk, IntermRegister::Ib, b_offset, in_tag)?;
        Ok((a, b))
    }

    /// Row of a binary operation `c = a op b` with operands in memory.
    ///
    /// Register values are only exposed when both tags matched.
    #[allow(clippy::too_many_arguments)]
    fn binary_op_row(
        &self,
        opcode: Opcode,
        a_offset: u32,
        b_offset: u32,
        dst_offset: u32,
        in_tag: MemoryTag,
        tag_match: bool,
        [a, b, c]: [FF; 3],
    ) -> Row {
        let trusted = |v: FF| if tag_match { v } else { FF::zero() };

        let mut row = self.new_row(opcode);
        row.in_tag = in_tag.to_ff();
        row.tag_err = ff_bool(!tag_match);
        row.set_register(IntermRegister::Ia, trusted(a), a_offset, false);
        row.set_register(IntermRegister::Ib, trusted(b), b_offset, false);
        row.set_register(IntermRegister::Ic, trusted(c), dst_offset, true);
        row
    }

    fn binary_op(
        &mut self,
        opcode: Opcode,
        a_offset: u32,
        b_offset: u32,
        dst_offset: u32,
        in_tag: MemoryTag,
        op: impl FnOnce(FF, FF) -> FF,
    ) -> Result<(), TraceError> {
        self.record(opcode, |this| {
            let (a, b) = this.load_operands(a_offset, b_offset, dst_offset, in_tag)?;
            let tag_match = a.tag_match && b.tag_match;
            let c = op(a.val, b.val);

            let clk = this.clk();
            this.memory
                .write(clk, IntermRegister::Ic, dst_offset, c, in_tag)?;

            let row = this.binary_op_row(
                opcode,
                a_offset,
                b_offset,
                dst_offset,
                in_tag,
                tag_match,
                [a.val, b.val, c],
            );
            this.push_row(opcode, row);
            this.pc = this.pc.wrapping_add(1);
            Ok(())
        })
    }

    /// Addition with direct memory access: `M[dst] = M[a] + M[b]`.
    #[instrument(level = "trace", skip(self))]
    pub fn add(
        &mut self,
        a_offset: u32,
        b_offset: u32,
        dst_offset: u32,
        in_tag: MemoryTag,
    ) -> Result<(), TraceError> {
        self.binary_op(Opcode::Add, a_offset, b_offset, dst_offset, in_tag, |a, b| a + b)
    }

    /// Subtraction with direct memory access: `M[dst] = M[a] - M[b]`.
    #[instrument(level = "trace", skip(self))]
    pub fn sub(
        &mut self,
        a_offset: u32,
        b_offset: u32,
        dst_offset: u32,
        in_tag: MemoryTag,
    ) -> Result<(), TraceError> {
        self.binary_op(Opcode::Sub, a_offset, b_offset, dst_offset, in_tag, |a, b| a - b)
    }

    /// Multiplication with direct memory access: `M[dst] = M[a] * M[b]`.
    #[instrument(level = "trace", skip(self))]
    pub fn mul(
        &mut self,
        a_offset: u32,
        b_offset: u32,
        dst_offset: u32,
        in_tag: MemoryTag,
    ) -> Result<(), TraceError> {
        self.binary_op(Opcode::Mul, a_offset, b_offset, dst_offset, in_tag, |a, b| a * b)
    }

    /// Division with direct memory access: `M[dst] = M[a] * M[b]^-1`.
    ///
    /// A zero divisor stores `0`, records `inv = 1` and raises `op_err`. A tag
    /// mismatch on either operand raises `op_err` as well, whatever the
    /// divisor.
    #[instrument(level = "trace", skip(self))]
    pub fn div(
        &mut self,
        a_offset: u32,
        b_offset: u32,
        dst_offset: u32,
        in_tag: MemoryTag,
    ) -> Result<(), TraceError> {
        self.record(Opcode::Div, |this| {
            let (a, b) = this.load_operands(a_offset, b_offset, dst_offset, in_tag)?;
            let tag_match = a.tag_match && b.tag_match;

            let (c, inv, div_by_zero) = match b.val.inverse() {
                Some(inv) => (a.val * inv, inv, false),
                None => (FF::zero(), FF::one(), true),
            };

            let clk = this.clk();
            this.memory
                .write(clk, IntermRegister::Ic, dst_offset, c, in_tag)?;

            let mut row = this.binary_op_row(
                Opcode::Div,
                a_offset,
                b_offset,
                dst_offset,
                in_tag,
                tag_match,
                [a.val, b.val, c],
            );
            row.op_err = ff_bool(div_by_zero || !tag_match);
            row.inv = if tag_match { inv } else { FF::one() };
            this.push_row(Opcode::Div, row);
            this.pc = this.pc.wrapping_add(1);
            Ok(())
        })
    }

    /// CALLDATACOPY with direct memory access:
    /// `M[dst_offset..dst_offset + copy_size] = calldata[cd_offset..cd_offset + copy_size]`.
    ///
    /// Stores are grouped by three, one per intermediate register, and each
    /// group emits one row. Values are stored with the `FF` tag.
    #[instrument(level = "trace", skip(self, calldata))]
    pub fn call_data_copy(
        &mut self,
        cd_offset: u32,
        copy_size: u32,
        dst_offset: u32,
        calldata: &[FF],
    ) -> Result<(), TraceError> {
        self.record(Opcode::CallDataCopy, |this| {
            let cd_start = cd_offset as usize;
            if cd_start + copy_size as usize > calldata.len() {
                return Err(TraceError::CalldataOutOfBounds {
                    offset: cd_offset,
                    size: copy_size,
                    len: calldata.len(),
                });
            }
            this.check_range(dst_offset, copy_size)?;

            let mut pos = 0;
            while pos < copy_size {
                let clk = this.clk();
                let chunk = (copy_size - pos).min(3);
                let mut row = this.new_row(Opcode::CallDataCopy);
                row.in_tag = MemoryTag::FF.to_ff();

                for (i, reg) in (0..chunk).zip(REGISTERS) {
                    let addr = dst_offset + pos + i;
                    let val = calldata[cd_start + (pos + i) as usize];
                    this.memory.write(clk, reg, addr, val, MemoryTag::FF)?;
                    row.set_register(reg, val, addr, true);
                }

                this.push_row(Opcode::CallDataCopy, row);
                this.pc = this.pc.wrapping_add(1);
                pos += chunk;
            }
            Ok(())
        })
    }

    /// RETURN with direct memory access: returns `M[ret_offset..ret_offset + ret_size]`.
    ///
    /// Loads are grouped by three like in [`Self::call_data_copy`] and every
    /// emitted row carries the halt selector. A slot whose tag is not `FF`
    /// is returned as zero and flags `tag_err` on its row.
    #[instrument(level = "trace", skip(self))]
    pub fn return_op(&mut self, ret_offset: u32, ret_size: u32) -> Result<Vec<FF>, TraceError> {
        self.record(Opcode::Return, |this| {
            this.check_range(ret_offset, ret_size)?;

            let mut returned = Vec::with_capacity(ret_size as usize);
            let mut pos = 0;
            while pos < ret_size {
                let clk = this.clk();
                let chunk = (ret_size - pos).min(3);
                let mut row = this.new_row(Opcode::Return);
                row.in_tag = MemoryTag::FF.to_ff();

                for (i, reg) in (0..chunk).zip(REGISTERS) {
                    let addr = ret_offset + pos + i;
                    let read = this.memory.read(clk, reg, addr, MemoryTag::FF)?;
                    let val = if read.tag_match {
                        read.val
                    } else {
                        row.tag_err = FF::one();
                        FF::zero()
                    };
                    row.set_register(reg, val, addr, false);
                    returned.push(val);
                }

                this.push_row(Opcode::Return, row);
                pos += chunk;
            }
            Ok(returned)
        })
    }

    /// JUMP to `dest`.
    #[instrument(level = "trace", skip(self))]
    pub fn jump(&mut self, dest: u32) {
        self.record_infallible(Opcode::Jump, |this| {
            let mut row = this.new_row(Opcode::Jump);
            row.ia = ff_u32(dest);
            this.push_row(Opcode::Jump, row);
            this.pc = dest;
        });
    }

    /// INTERNAL_CALL to `dest`.
    ///
    /// The return location `pc + 1` is pushed on the call stack and stored
    /// through `ib` at `internal_return_ptr`, which is then incremented.
    #[instrument(level = "trace", skip(self))]
    pub fn internal_call(&mut self, dest: u32) -> Result<(), TraceError> {
        self.record(Opcode::InternalCall, |this| {
            let ptr = this.internal_return_ptr;
            this.memory.check_addr(ptr)?;

            let clk = this.clk();
            let stored_pc = this.pc.wrapping_add(1);
            this.memory
                .write(clk, IntermRegister::Ib, ptr, ff_u32(stored_pc), MemoryTag::FF)?;
            this.internal_call_stack.push(stored_pc);

            let mut row = this.new_row(Opcode::InternalCall);
            row.ia = ff_u32(dest);
            row.set_register(IntermRegister::Ib, ff_u32(stored_pc), ptr, true);
            this.push_row(Opcode::InternalCall, row);

            this.pc = dest;
            this.internal_return_ptr += 1;
            Ok(())
        })
    }

    /// INTERNAL_RETURN from the innermost internal call.
    ///
    /// The return location is loaded through `ia` from
    /// `internal_return_ptr - 1` and popped from the call stack.
    #[instrument(level = "trace", skip(self))]
    pub fn internal_return(&mut self) -> Result<(), TraceError> {
        self.record(Opcode::InternalReturn, |this| {
            if this.internal_call_stack.is_empty() {
                return Err(TraceError::EmptyCallStack);
            }

            let clk = this.clk();
            let ptr = this.internal_return_ptr - 1;
            let read = this.memory.read(clk, IntermRegister::Ia, ptr, MemoryTag::FF)?;

            let mut row = this.new_row(Opcode::InternalReturn);
            row.tag_err = ff_bool(!read.tag_match);
            let ia = if read.tag_match { read.val } else { FF::zero() };
            row.set_register(IntermRegister::Ia, ia, ptr, false);
            this.push_row(Opcode::InternalReturn, row);

            if let Some(return_pc) = this.internal_call_stack.pop() {
                this.pc = return_pc;
            }
            this.internal_return_ptr = ptr;
            Ok(())
        })
    }

    /// HALT. The program counter freezes.
    #[instrument(level = "trace", skip(self))]
    pub fn halt(&mut self) {
        self.record_infallible(Opcode::Halt, |this| {
            let row = this.new_row(Opcode::Halt);
            this.push_row(Opcode::Halt, row);
        });
    }
}

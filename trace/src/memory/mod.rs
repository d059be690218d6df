//! Tagged flat memory and its access trace.
//!
//! Every cell holds a field element together with a [`MemoryTag`] describing
//! the type the value claims to have. Loads and stores are served directly
//! from the cell array and each of them appends a [`MemoryTraceEntry`], so that
//! the whole memory history can later be checked for read/write consistency.

mod entry;
mod error;

use ark_ff::{Field, One, Zero};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumCount, EnumIter};
use tracing::debug;

pub use entry::MemoryTraceEntry;
pub use error::MemoryError;

use crate::field::{ff_u32, FF};

/// Claimed type of a memory cell.
///
/// `U0` marks a cell that was never written.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumCount,
    EnumIter,
    TryFromPrimitive,
    IntoPrimitive,
)]
#[repr(u8)]
pub enum MemoryTag {
    #[default]
    U0 = 0,
    U8 = 1,
    U16 = 2,
    U32 = 3,
    U64 = 4,
    U128 = 5,
    FF = 6,
}

impl MemoryTag {
    pub fn to_ff(self) -> FF {
        ff_u32(u8::from(self) as u32)
    }
}

/// The three intermediate registers through which every memory-mediated
/// value flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntermRegister {
    Ia,
    Ib,
    Ic,
}

impl IntermRegister {
    pub const fn load_sub_clk(self) -> u32 {
        match self {
            IntermRegister::Ia => Memory::SUB_CLK_LOAD_A,
            IntermRegister::Ib => Memory::SUB_CLK_LOAD_B,
            IntermRegister::Ic => Memory::SUB_CLK_LOAD_C,
        }
    }

    pub const fn store_sub_clk(self) -> u32 {
        match self {
            IntermRegister::Ia => Memory::SUB_CLK_STORE_A,
            IntermRegister::Ib => Memory::SUB_CLK_STORE_B,
            IntermRegister::Ic => Memory::SUB_CLK_STORE_C,
        }
    }
}

/// Outcome of a load.
///
/// `val` is the stored value in every case, but it must only be trusted when
/// `tag_match` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemRead {
    pub val: FF,
    pub tag_match: bool,
    /// Mismatch witness, see [`MemoryTraceEntry::one_min_inv`].
    pub one_min_inv: FF,
}

/// Fixed-size tagged memory recording every access.
#[derive(Debug, Clone)]
pub struct Memory {
    cells: Vec<(FF, MemoryTag)>,
    trace: Vec<MemoryTraceEntry>,
}

impl Memory {
    pub const SUB_CLK_LOAD_A: u32 = 0;
    pub const SUB_CLK_LOAD_B: u32 = 1;
    pub const SUB_CLK_LOAD_C: u32 = 2;
    pub const SUB_CLK_STORE_A: u32 = 3;
    pub const SUB_CLK_STORE_B: u32 = 4;
    pub const SUB_CLK_STORE_C: u32 = 5;

    /// Creates a memory of `size` cells, all set to `(0, U0)`.
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![(FF::zero(), MemoryTag::U0); size],
            trace: Vec::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Number of accesses recorded since the last reset.
    pub fn trace_len(&self) -> usize {
        self.trace.len()
    }

    /// Accesses recorded so far, in execution order.
    pub fn trace(&self) -> &[MemoryTraceEntry] {
        &self.trace
    }

    /// Returns the value and tag held at `addr`, without recording an access.
    pub fn cell(&self, addr: u32) -> Option<(FF, MemoryTag)> {
        self.cells.get(addr as usize).copied()
    }

    /// Clears every cell back to `(0, U0)` and drops the access trace.
    pub fn reset(&mut self) {
        self.cells.fill((FF::zero(), MemoryTag::U0));
        self.trace.clear();
    }

    pub fn check_addr(&self, addr: u32) -> Result<(), MemoryError> {
        if (addr as usize) < self.cells.len() {
            Ok(())
        } else {
            Err(MemoryError::OutOfBounds {
                addr,
                size: self.cells.len(),
            })
        }
    }

    /// Loads `addr` into `reg`, checking the cell's tag against `in_tag`.
    ///
    /// An untyped cell matches any instruction tag. On a mismatch a dedicated
    /// entry is recorded carrying both tags and the inverse witness.
    pub fn read(
        &mut self,
        clk: u32,
        reg: IntermRegister,
        addr: u32,
        in_tag: MemoryTag,
    ) -> Result<MemRead, MemoryError> {
        self.check_addr(addr)?;
        let (val, tag) = self.cells[addr as usize];
        let sub_clk = reg.load_sub_clk();

        if tag == MemoryTag::U0 || tag == in_tag {
            self.trace.push(MemoryTraceEntry {
                clk,
                sub_clk,
                addr,
                val,
                in_tag,
                tag: in_tag,
                rw: false,
                tag_err: false,
                one_min_inv: FF::zero(),
                last_access: false,
            });
            return Ok(MemRead {
                val,
                tag_match: true,
                one_min_inv: FF::zero(),
            });
        }

        debug!(clk, addr, %in_tag, %tag, "memory tag mismatch");
        let one_min_inv = one_minus_inverse_diff(in_tag, tag);
        self.trace.push(MemoryTraceEntry {
            clk,
            sub_clk,
            addr,
            val,
            in_tag,
            tag,
            rw: false,
            tag_err: true,
            one_min_inv,
            last_access: false,
        });
        Ok(MemRead {
            val,
            tag_match: false,
            one_min_inv,
        })
    }

    /// Stores `val` with `tag` at `addr` from `reg`. Stores are never tag
    /// checked.
    pub fn write(
        &mut self,
        clk: u32,
        reg: IntermRegister,
        addr: u32,
        val: FF,
        tag: MemoryTag,
    ) -> Result<(), MemoryError> {
        self.check_addr(addr)?;
        self.cells[addr as usize] = (val, tag);
        self.trace.push(MemoryTraceEntry {
            clk,
            sub_clk: reg.store_sub_clk(),
            addr,
            val,
            in_tag: tag,
            tag,
            rw: true,
            tag_err: false,
            one_min_inv: FF::zero(),
            last_access: false,
        });
        Ok(())
    }

    /// Drains the access trace sorted by `(addr, clk, sub_clk)`, flags the
    /// last access of every address, and resets the memory.
    pub fn finalize(&mut self) -> Vec<MemoryTraceEntry> {
        let mut trace = std::mem::take(&mut self.trace);
        trace.sort_by_key(MemoryTraceEntry::sort_key);

        let len = trace.len();
        for i in 0..len {
            trace[i].last_access = i + 1 == len || trace[i].addr != trace[i + 1].addr;
        }

        self.reset();
        trace
    }
}

fn one_minus_inverse_diff(in_tag: MemoryTag, tag: MemoryTag) -> FF {
    // The tags differ, so the difference is invertible.
    match (in_tag.to_ff() - tag.to_ff()).inverse() {
        Some(inv) => FF::one() - inv,
        None => FF::zero(),
    }
}

use super::MemoryTag;
use crate::field::FF;

/// One load or store, as seen by the memory trace.
///
/// Entries are appended in execution order and only reordered once, by
/// [`Memory::finalize`](super::Memory::finalize), which sorts them by
/// `(addr, clk, sub_clk)` and fills in `last_access`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTraceEntry {
    pub clk: u32,
    pub sub_clk: u32,
    pub addr: u32,
    pub val: FF,
    /// Tag carried by the instruction.
    pub in_tag: MemoryTag,
    /// Tag resolved from the cell. Equal to `in_tag` unless `tag_err` is set.
    pub tag: MemoryTag,
    /// Set for stores.
    pub rw: bool,
    pub tag_err: bool,
    /// `1 - (in_tag - tag)^-1` on a tag mismatch, zero otherwise.
    pub one_min_inv: FF,
    /// Set once sorted if the next entry targets another address, or if
    /// this is the last entry.
    pub last_access: bool,
}

impl MemoryTraceEntry {
    pub(crate) fn sort_key(&self) -> (u32, u32, u32) {
        (self.addr, self.clk, self.sub_clk)
    }
}

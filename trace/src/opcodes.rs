use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::{Display, EnumCount, EnumIter};

/// Every instruction kind the trace builder can execute.
#[derive(
    Debug,
    Clone,
    Copy,
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
pub enum Opcode {
    // Arithmetic instructions
    Add = 0x00,
    Sub = 0x01,
    Mul = 0x02,
    Div = 0x03,

    // Data movement instructions
    CallDataCopy = 0x04,
    Return = 0x05,

    // Control flow instructions
    Jump = 0x06,
    InternalCall = 0x07,
    InternalReturn = 0x08,
    Halt = 0x09,
}

impl Opcode {
    /// Whether this opcode is allowed to raise `op_err`.
    pub const fn may_raise_op_err(&self) -> bool {
        matches!(self, Opcode::Div)
    }

    /// Whether this opcode ends execution.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Opcode::Return | Opcode::Halt)
    }
}

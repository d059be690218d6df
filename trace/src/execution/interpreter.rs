use tracing::{debug, instrument};

use super::{Row, TraceBuilder, TraceError};
use crate::{config::TraceConfig, field::FF, memory::MemoryTag, Opcode};

/// A decoded instruction together with its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Add {
        a_offset: u32,
        b_offset: u32,
        dst_offset: u32,
        tag: MemoryTag,
    },
    Sub {
        a_offset: u32,
        b_offset: u32,
        dst_offset: u32,
        tag: MemoryTag,
    },
    Mul {
        a_offset: u32,
        b_offset: u32,
        dst_offset: u32,
        tag: MemoryTag,
    },
    Div {
        a_offset: u32,
        b_offset: u32,
        dst_offset: u32,
        tag: MemoryTag,
    },
    CallDataCopy {
        cd_offset: u32,
        copy_size: u32,
        dst_offset: u32,
    },
    Return {
        ret_offset: u32,
        ret_size: u32,
    },
    Jump {
        dest: u32,
    },
    InternalCall {
        dest: u32,
    },
    InternalReturn,
    Halt,
}

impl Instruction {
    pub const fn opcode(&self) -> Opcode {
        match self {
            Instruction::Add { .. } => Opcode::Add,
            Instruction::Sub { .. } => Opcode::Sub,
            Instruction::Mul { .. } => Opcode::Mul,
            Instruction::Div { .. } => Opcode::Div,
            Instruction::CallDataCopy { .. } => Opcode::CallDataCopy,
            Instruction::Return { .. } => Opcode::Return,
            Instruction::Jump { .. } => Opcode::Jump,
            Instruction::InternalCall { .. } => Opcode::InternalCall,
            Instruction::InternalReturn => Opcode::InternalReturn,
            Instruction::Halt => Opcode::Halt,
        }
    }
}

impl TraceBuilder {
    /// Executes a single instruction.
    ///
    /// Returns the returned memory region for `Return`, `None` otherwise.
    pub fn execute(
        &mut self,
        instruction: &Instruction,
        calldata: &[FF],
    ) -> Result<Option<Vec<FF>>, TraceError> {
        match *instruction {
            Instruction::Add {
                a_offset,
                b_offset,
                dst_offset,
                tag,
            } => self.add(a_offset, b_offset, dst_offset, tag)?,
            Instruction::Sub {
                a_offset,
                b_offset,
                dst_offset,
                tag,
            } => self.sub(a_offset, b_offset, dst_offset, tag)?,
            Instruction::Mul {
                a_offset,
                b_offset,
                dst_offset,
                tag,
            } => self.mul(a_offset, b_offset, dst_offset, tag)?,
            Instruction::Div {
                a_offset,
                b_offset,
                dst_offset,
                tag,
            } => self.div(a_offset, b_offset, dst_offset, tag)?,
            Instruction::CallDataCopy {
                cd_offset,
                copy_size,
                dst_offset,
            } => self.call_data_copy(cd_offset, copy_size, dst_offset, calldata)?,
            Instruction::Return {
                ret_offset,
                ret_size,
            } => return self.return_op(ret_offset, ret_size).map(Some),
            Instruction::Jump { dest } => self.jump(dest),
            Instruction::InternalCall { dest } => self.internal_call(dest)?,
            Instruction::InternalReturn => self.internal_return()?,
            Instruction::Halt => self.halt(),
        }
        Ok(None)
    }
}

/// Replays `instructions` in order until the first `Return` or `Halt`, then
/// finalizes the trace.
///
/// Returns the data returned by the program (empty if it halted without
/// returning) and the finalized trace.
#[instrument(level = "debug", skip_all, fields(instructions = instructions.len()))]
pub fn run(
    config: TraceConfig,
    instructions: &[Instruction],
    calldata: &[FF],
) -> Result<(Vec<FF>, Vec<Row>), TraceError> {
    let mut builder = TraceBuilder::with_config(config)?;
    let mut returndata = Vec::new();

    for instruction in instructions {
        if let Some(data) = builder.execute(instruction, calldata)? {
            returndata = data;
        }
        if instruction.opcode().is_terminal() {
            break;
        }
    }
    debug!(rows = builder.rows().len(), "execution stopped");

    let trace = builder.finalize()?;
    Ok((returndata, trace))
}

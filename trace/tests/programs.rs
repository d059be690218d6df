pub mod common;

use anyhow::Result;
use ark_ff::{One, Zero};
use common::{executed_rows, ff, ffs, find_row, memory_rows};
use minivm_trace::{
    run, Instruction, MemoryTag, Opcode, TraceBuilder, TraceConfig, TraceError, FF,
};

#[test]
fn test_add_program() -> Result<()> {
    let calldata = ffs(&[37, 4, 11]);
    let program = [
        Instruction::CallDataCopy {
            cd_offset: 0,
            copy_size: 3,
            dst_offset: 0,
        },
        Instruction::Add {
            a_offset: 0,
            b_offset: 1,
            dst_offset: 4,
            tag: MemoryTag::FF,
        },
        Instruction::Return {
            ret_offset: 0,
            ret_size: 5,
        },
    ];

    let (returndata, trace) = run(TraceConfig::default(), &program, &calldata)?;

    assert_eq!(returndata, ffs(&[37, 4, 11, 0, 41]));
    assert_eq!(trace.len(), TraceConfig::DEFAULT_TRACE_SIZE);

    let add = find_row(&trace, Opcode::Add);
    assert_eq!((add.ia, add.ib, add.ic), (ff(37), ff(4), ff(41)));
    assert!(add.tag_err.is_zero());
    assert_eq!(add.in_tag, MemoryTag::FF.to_ff());

    // calldatacopy, add, and two return rows
    assert_eq!(executed_rows(&trace).len(), 4);
    Ok(())
}

#[test]
fn test_sub_and_mul_program() {
    let calldata = ffs(&[6, 7, 100]);
    let program = [
        Instruction::CallDataCopy {
            cd_offset: 0,
            copy_size: 3,
            dst_offset: 0,
        },
        Instruction::Mul {
            a_offset: 0,
            b_offset: 1,
            dst_offset: 3,
            tag: MemoryTag::FF,
        },
        Instruction::Sub {
            a_offset: 2,
            b_offset: 3,
            dst_offset: 4,
            tag: MemoryTag::FF,
        },
        Instruction::Return {
            ret_offset: 3,
            ret_size: 2,
        },
    ];

    let (returndata, trace) = run(TraceConfig::default(), &program, &calldata).unwrap();
    assert_eq!(returndata, ffs(&[42, 58]));

    let mul = find_row(&trace, Opcode::Mul);
    assert_eq!(mul.ic, ff(42));
    let sub = find_row(&trace, Opcode::Sub);
    assert_eq!((sub.ia, sub.ib, sub.ic), (ff(100), ff(42), ff(58)));
}

#[test]
fn test_division() -> Result<()> {
    let mut builder = TraceBuilder::new();
    builder.call_data_copy(0, 2, 0, &ffs(&[15, 315]))?;
    builder.div(1, 0, 2, MemoryTag::FF)?;
    let trace = builder.finalize()?;

    let div = find_row(&trace, Opcode::Div);
    assert_eq!(div.ic, ff(21));
    assert!(div.op_err.is_zero());
    assert_eq!(div.inv * div.ib, FF::one());
    Ok(())
}

#[test]
fn test_division_by_zero() {
    let mut builder = TraceBuilder::new();
    builder.call_data_copy(0, 2, 0, &ffs(&[15, 0])).unwrap();
    builder.div(0, 1, 2, MemoryTag::FF).unwrap();
    let trace = builder.finalize().unwrap();

    let div = find_row(&trace, Opcode::Div);
    assert!(div.op_err.is_one());
    assert!(div.ic.is_zero());
    assert!(div.inv.is_one());
}

#[test]
fn test_division_zero_by_zero() {
    let mut builder = TraceBuilder::new();
    builder.call_data_copy(0, 2, 0, &ffs(&[0, 0])).unwrap();
    builder.div(0, 1, 2, MemoryTag::FF).unwrap();
    let trace = builder.finalize().unwrap();

    let div = find_row(&trace, Opcode::Div);
    assert!(div.op_err.is_one());
    assert!(div.ic.is_zero());
    assert!(div.inv.is_one());
}

#[test]
fn test_tag_mismatch_recorded_in_memory_trace() {
    let mut builder = TraceBuilder::new();
    builder.call_data_copy(0, 2, 0, &ffs(&[2, 3])).unwrap();
    builder.mul(0, 1, 2, MemoryTag::U64).unwrap();
    let trace = builder.finalize().unwrap();

    let mul = find_row(&trace, Opcode::Mul);
    assert!(mul.tag_err.is_one());
    assert!(mul.ic.is_zero());

    let mismatches: Vec<_> = memory_rows(&trace)
        .iter()
        .filter(|row| row.mem_tag_err.is_one())
        .collect();
    assert_eq!(mismatches.len(), 2);
    for row in mismatches {
        assert_eq!(row.mem_in_tag, MemoryTag::U64.to_ff());
        assert_eq!(row.mem_tag, MemoryTag::FF.to_ff());
        // (1 - one_min_inv) * (in_tag - tag) == 1
        let diff = row.mem_in_tag - row.mem_tag;
        assert!(((FF::one() - row.mem_one_min_inv) * diff).is_one());
    }
}

#[test]
fn test_internal_call_and_return() {
    let program = [
        Instruction::Jump { dest: 3 },
        Instruction::InternalCall { dest: 10 },
        Instruction::InternalReturn,
        Instruction::Halt,
    ];

    let (returndata, trace) = run(TraceConfig::default(), &program, &[]).unwrap();
    assert!(returndata.is_empty());

    let call = find_row(&trace, Opcode::InternalCall);
    assert_eq!(call.pc, ff(3));
    assert_eq!(call.ib, ff(4));
    let ret = find_row(&trace, Opcode::InternalReturn);
    assert_eq!(ret.pc, ff(10));
    assert_eq!(ret.ia, ff(4));
    let halt = find_row(&trace, Opcode::Halt);
    assert_eq!(halt.pc, ff(4));
    assert!(halt.last.is_one());
}

#[test]
fn test_run_stops_at_first_halt() {
    let program = [
        Instruction::Halt,
        Instruction::Jump { dest: 7 },
        Instruction::Halt,
    ];

    let (_, trace) = run(TraceConfig::default(), &program, &[]).unwrap();
    assert_eq!(executed_rows(&trace).len(), 1);
    assert!(trace.iter().all(|row| row.sel_jump.is_zero()));
}

#[test]
fn test_run_propagates_errors() {
    let program = [Instruction::InternalReturn];
    assert_eq!(
        run(TraceConfig::default(), &program, &[]),
        Err(TraceError::EmptyCallStack)
    );

    let invalid = TraceConfig::new(1, 16, 8);
    assert!(matches!(
        run(invalid, &[Instruction::Halt], &[]),
        Err(TraceError::InvalidConfig(_))
    ));
}

#[test]
fn test_small_memory_config() {
    let config = TraceConfig::new(16, 8, 6);
    let program = [
        Instruction::InternalCall { dest: 2 },
        Instruction::InternalCall { dest: 5 },
        Instruction::InternalCall { dest: 9 },
    ];
    // Third frame lands on address 8, past the end of memory.
    assert!(matches!(
        run(config, &program, &[]),
        Err(TraceError::Memory(_))
    ));
}

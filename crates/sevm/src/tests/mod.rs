#![allow(
    clippy::needless_update,
    unreachable_pub,
    dead_code,
    missing_docs,
    missing_debug_implementations
)]

use crate::{
    word::{I256_MAX, I256_MIN},
    *,
};
use alloy_primitives::{hex, uint, U256};



pub use runner::*;

tests! {
    ret {
        empty(@raw {}),
        no_stop(@raw {
            bytecode: &[op::PUSH0],
            expected_stack: &[U256::ZERO],
            expected_steps: Some(1),
        }),
        stop(@raw {
            bytecode: &[op::STOP, op::PUSH0],
            expected_steps: Some(1),
        }),
        invalid(@raw {
            bytecode: &[op::INVALID],
            expected_error: Some(ExecError::InvalidOperation(Opcode::Invalid)),
        }),
        unknown(@raw {
            bytecode: &[0x21],
            expected_error: Some(ExecError::InvalidOperation(Opcode::Unknown(0x21))),
        }),
        underflow1(@raw {
            bytecode: &[op::ADD],
            expected_error: Some(ExecError::StackUnderflow),
        }),
        underflow2(@raw {
            bytecode: &[op::PUSH0, op::ADD],
            expected_error: Some(ExecError::StackUnderflow),
        }),
        underflow3(@raw {
            bytecode: &[op::PUSH0, op::POP, op::POP],
            expected_error: Some(ExecError::StackUnderflow),
        }),
        return_data(@raw {
            bytecode: &[op::PUSH1, 0x69, op::PUSH0, op::MSTORE, op::PUSH1, 2, op::PUSH1, 30, op::RETURN],
            expected_memory: &hex!("0000000000000000000000000000000000000000000000000000000000000069"),
            expected_output: &[0x00, 0x69],
        }),
        return_empty(@raw {
            bytecode: &[op::PUSH0, op::PUSH8, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, op::RETURN],
        }),
        revert(@raw {
            bytecode: &[op::PUSH1, 0x69, op::PUSH0, op::MSTORE8, op::PUSH1, 1, op::PUSH0, op::REVERT],
            expected_memory: &hex!("6900000000000000000000000000000000000000000000000000000000000000"),
            expected_output: &[0x69],
            expected_reverted: true,
        }),
        truncated_push(@raw {
            bytecode: &[op::PUSH2, 0x69],
            expected_stack: &[0x6900_U256],
        }),
    }

    stack {
        pop(@raw {
            bytecode: &[op::PUSH1, 1, op::POP],
        }),
        dup(@raw {
            bytecode: &[op::PUSH1, 1, op::DUP1],
            expected_stack: &[1_U256, 1_U256],
        }),
        dup3(@raw {
            bytecode: &[op::PUSH1, 1, op::PUSH1, 2, op::PUSH1, 3, op::DUP3],
            expected_stack: &[1_U256, 2_U256, 3_U256, 1_U256],
        }),
        dup_underflow(@raw {
            bytecode: &[op::PUSH1, 1, op::DUP2],
            expected_error: Some(ExecError::StackUnderflow),
        }),
        swap(@raw {
            bytecode: &[op::PUSH1, 1, op::PUSH1, 2, op::SWAP1],
            expected_stack: &[2_U256, 1_U256],
        }),
        swap2(@raw {
            bytecode: &[op::PUSH1, 1, op::PUSH1, 2, op::PUSH1, 3, op::SWAP2],
            expected_stack: &[3_U256, 2_U256, 1_U256],
        }),
        swap_underflow(@raw {
            bytecode: &[op::PUSH1, 1, op::SWAP1],
            expected_error: Some(ExecError::StackUnderflow),
        }),
        push32(@raw {
            bytecode: &bytecode_binop(op::ADD, 0x22_U256, 0x11_U256),
            expected_stack: &[0x33_U256],
            expected_steps: Some(3),
        }),
    }

    control_flow {
        basic_jump(@raw {
            bytecode: &[op::PUSH1, 3, op::JUMP, op::JUMPDEST, op::PUSH1, 69],
            expected_stack: &[69_U256],
        }),
        bad_jump(@raw {
            bytecode: &[op::JUMP],
            expected_error: Some(ExecError::StackUnderflow),
        }),
        bad_jumpi1(@raw {
            bytecode: &[op::JUMPI],
            expected_error: Some(ExecError::StackUnderflow),
        }),
        bad_jumpi2(@raw {
            bytecode: &[op::PUSH0, op::JUMPI],
            expected_error: Some(ExecError::StackUnderflow),
        }),
        jump_not_jumpdest(@raw {
            bytecode: &[op::PUSH1, 2, op::JUMP, op::STOP],
            expected_error: Some(ExecError::InvalidJumpDest(2_U256)),
        }),
        jump_into_push_literal(@raw {
            bytecode: &[op::PUSH1, 4, op::JUMP, op::PUSH1, op::JUMPDEST],
            expected_error: Some(ExecError::InvalidJumpDest(4_U256)),
        }),
        jump_out_of_bounds(@raw {
            bytecode: &[op::PUSH1, 0xff, op::JUMP],
            expected_error: Some(ExecError::InvalidJumpDest(0xff_U256)),
        }),
        jump_huge(@raw {
            bytecode: &bytecode_unop(op::JUMP, U256::MAX),
            expected_error: Some(ExecError::InvalidJumpDest(U256::MAX)),
        }),

        basic_jumpi1(@raw {
            bytecode: &[op::JUMPDEST, op::PUSH0, op::PUSH0, op::JUMPI, op::PUSH1, 69],
            expected_stack: &[69_U256],
        }),
        basic_jumpi1_lazy_invalid_target(@raw {
            bytecode: &[op::PUSH0, op::PUSH0, op::JUMPI, op::PUSH1, 69],
            expected_stack: &[69_U256],
        }),
        basic_jumpi2(@raw {
            bytecode: &[op::PUSH1, 1, op::PUSH1, 5, op::JUMPI, op::JUMPDEST, op::PUSH1, 69],
            expected_stack: &[69_U256],
            expected_steps: Some(5),
        }),
        basic_jumpi2_lazy_invalid_target(@raw {
            bytecode: &[op::PUSH1, 1, op::PUSH0, op::JUMPI, op::PUSH1, 69],
            expected_error: Some(ExecError::InvalidJumpDest(U256::ZERO)),
        }),

        basic_loop(@raw {
            bytecode: &[
                op::PUSH1, 3,  // i=3
                op::JUMPDEST,  // i
                op::PUSH1, 1,  // 1, i
                op::SWAP1,     // i, 1
                op::SUB,       // i-1
                op::DUP1,      // i-1, i-1
                op::PUSH1, 2,  // dst, i-1, i-1
                op::JUMPI,     // i=i-1
                op::POP,       //
                op::PUSH1, 69, // 69
            ],
            expected_stack: &[69_U256],
            expected_steps: Some(1 + 7 * 3 + 2),
        }),

        pc(@raw {
            bytecode: &[op::PC, op::PC, op::PUSH1, 69, op::PC, op::PUSH0, op::PC],
            expected_stack: &[0_U256, 1_U256, 69_U256, 4_U256, 0_U256, 6_U256],
        }),
    }

    arith {
        add1(op::ADD, 0_U256, 0_U256 => 0_U256),
        add2(op::ADD, 1_U256, 2_U256 => 3_U256),
        add_overflow1(op::ADD, U256::MAX, 1_U256 => 0_U256),
        add_overflow2(op::ADD, U256::MAX, U256::MAX => U256::MAX - 1_U256),

        sub1(op::SUB, 3_U256, 2_U256 => 1_U256),
        sub2(op::SUB, 1_U256, 2_U256 => -1_U256),
        sub_underflow(op::SUB, 0_U256, 1_U256 => U256::MAX),

        mul1(op::MUL, 1_U256, 2_U256 => 2_U256),
        mul2(op::MUL, 32_U256, 32_U256 => 1024_U256),
        mul_overflow(op::MUL, U256::MAX, 2_U256 => U256::MAX - 1_U256),

        div1(op::DIV, 32_U256, 32_U256 => 1_U256),
        div2(op::DIV, 1_U256, 2_U256 => 0_U256),
        div3(op::DIV, 3_U256, 2_U256 => 1_U256),
        div_by_zero1(op::DIV, 0_U256, 0_U256 => 0_U256),
        div_by_zero2(op::DIV, 32_U256, 0_U256 => 0_U256),

        rem1(op::MOD, 32_U256, 32_U256 => 0_U256),
        rem2(op::MOD, 1_U256, 2_U256 => 1_U256),
        rem3(op::MOD, 3_U256, 2_U256 => 1_U256),
        rem_by_zero1(op::MOD, 0_U256, 0_U256 => 0_U256),
        rem_by_zero2(op::MOD, 32_U256, 0_U256 => 0_U256),

        sdiv1(op::SDIV, 32_U256, 32_U256 => 1_U256),
        sdiv2(op::SDIV, 1_U256, 2_U256 => 0_U256),
        sdiv3(op::SDIV, 3_U256, 2_U256 => 1_U256),
        sdiv_neg_neg(op::SDIV, -0x33_U256, -0x11_U256 => 3_U256),
        sdiv_pos_neg(op::SDIV, 0x33_U256, -0x11_U256 => -3_U256),
        sdiv_neg_pos(op::SDIV, -7_U256, 2_U256 => -3_U256),
        sdiv_by_zero1(op::SDIV, 0_U256, 0_U256 => 0_U256),
        sdiv_by_zero2(op::SDIV, 32_U256, 0_U256 => 0_U256),
        sdiv_min_by_1(op::SDIV, I256_MIN, 1_U256 => I256_MIN),
        sdiv_min_by_minus_1(op::SDIV, I256_MIN, -1_U256 => I256_MIN),
        sdiv_max1(op::SDIV, I256_MAX, 1_U256 => I256_MAX),
        sdiv_max2(op::SDIV, I256_MAX, -1_U256 => -I256_MAX),

        srem1(op::SMOD, 32_U256, 32_U256 => 0_U256),
        srem2(op::SMOD, 1_U256, 2_U256 => 1_U256),
        srem_neg_neg(op::SMOD, -33_U256, -5_U256 => -3_U256),
        srem_pos_neg(op::SMOD, 33_U256, -5_U256 => 3_U256),
        srem_neg_pos(op::SMOD, -33_U256, 5_U256 => -3_U256),
        srem_by_zero1(op::SMOD, 0_U256, 0_U256 => 0_U256),
        srem_by_zero2(op::SMOD, -32_U256, 0_U256 => 0_U256),

        addmod1(op::ADDMOD, 1_U256, 2_U256, 3_U256 => 0_U256),
        addmod2(op::ADDMOD, 1_U256, 2_U256, 4_U256 => 3_U256),
        addmod_overflow(op::ADDMOD, U256::MAX, 2_U256, 3_U256 => 2_U256),
        addmod_by_zero(op::ADDMOD, 1_U256, 2_U256, 0_U256 => 0_U256),

        mulmod1(op::MULMOD, 2_U256, 3_U256, 4_U256 => 2_U256),
        mulmod2(op::MULMOD, 2_U256, 3_U256, 7_U256 => 6_U256),
        mulmod_overflow(op::MULMOD, U256::MAX, U256::MAX, 12_U256 => 9_U256),
        mulmod_by_zero(op::MULMOD, 2_U256, 3_U256, 0_U256 => 0_U256),

        exp1(op::EXP, 0_U256, 0_U256 => 1_U256),
        exp2(op::EXP, 2_U256, 0_U256 => 1_U256),
        exp3(op::EXP, 2_U256, 3_U256 => 8_U256),
        exp4(op::EXP, 2_U256, 255_U256 => I256_MIN),
        exp_overflow(op::EXP, 2_U256, 256_U256 => 0_U256),

        signextend1(op::SIGNEXTEND, 0_U256, 0_U256 => 0_U256),
        signextend2(op::SIGNEXTEND, 1_U256, 0_U256 => 0_U256),
        signextend3(op::SIGNEXTEND, 0_U256, -1_U256 => -1_U256),
        signextend4(op::SIGNEXTEND, 0_U256, 0x7f_U256 => 0x7f_U256),
        signextend5(op::SIGNEXTEND, 0_U256, 0x80_U256 => -0x80_U256),
        signextend6(op::SIGNEXTEND, 0_U256, 0xff_U256 => U256::MAX),
        signextend7(op::SIGNEXTEND, 1_U256, 0xff7fff_U256 => 0x7fff_U256),
        signextend8(op::SIGNEXTEND, 1_U256, 0x118000_U256 => -0x8000_U256),
        signextend9(op::SIGNEXTEND, 31_U256, 0xff_U256 => 0xff_U256),
        signextend10(op::SIGNEXTEND, U256::MAX, 0x80_U256 => 0x80_U256),
    }

    cmp {
        lt1(op::LT, 1_U256, 2_U256 => 1_U256),
        lt2(op::LT, 2_U256, 1_U256 => 0_U256),
        lt3(op::LT, 1_U256, 1_U256 => 0_U256),
        lt4(op::LT, -1_U256, 1_U256 => 0_U256),

        gt1(op::GT, 1_U256, 2_U256 => 0_U256),
        gt2(op::GT, 2_U256, 1_U256 => 1_U256),
        gt3(op::GT, 1_U256, 1_U256 => 0_U256),
        gt4(op::GT, -1_U256, 1_U256 => 1_U256),

        slt1(op::SLT, 1_U256, 2_U256 => 1_U256),
        slt2(op::SLT, 2_U256, 1_U256 => 0_U256),
        slt3(op::SLT, -1_U256, 1_U256 => 1_U256),
        slt4(op::SLT, I256_MIN, I256_MAX => 1_U256),

        sgt1(op::SGT, 1_U256, 2_U256 => 0_U256),
        sgt2(op::SGT, 2_U256, 1_U256 => 1_U256),
        sgt3(op::SGT, -1_U256, 1_U256 => 0_U256),
        sgt4(op::SGT, 1_U256, -1_U256 => 1_U256),

        eq1(op::EQ, 1_U256, 2_U256 => 0_U256),
        eq2(op::EQ, 2_U256, 2_U256 => 1_U256),

        iszero1(op::ISZERO, 0_U256 => 1_U256),
        iszero2(op::ISZERO, 1_U256 => 0_U256),
        iszero3(op::ISZERO, U256::MAX => 0_U256),
    }

    bitwise {
        and1(op::AND, 0_U256, 0_U256 => 0_U256),
        and2(op::AND, 0b1100_U256, 0b1010_U256 => 0b1000_U256),
        or1(op::OR, 0b1100_U256, 0b1010_U256 => 0b1110_U256),
        xor1(op::XOR, 0b1100_U256, 0b1010_U256 => 0b0110_U256),
        not1(op::NOT, 0_U256 => U256::MAX),
        not2(op::NOT, U256::MAX => 0_U256),

        byte1(op::BYTE, 0_U256, 0x1122334400000000000000000000000000000000000000000000000000000000_U256 => 0x11_U256),
        byte2(op::BYTE, 3_U256, 0x1122334400000000000000000000000000000000000000000000000000000000_U256 => 0x44_U256),
        byte3(op::BYTE, 31_U256, 0x1234_U256 => 0x34_U256),
        byte_oob(op::BYTE, 32_U256, U256::MAX => 0_U256),

        shl1(op::SHL, 0_U256, 1_U256 => 1_U256),
        shl2(op::SHL, 1_U256, 1_U256 => 2_U256),
        shl3(op::SHL, 255_U256, 1_U256 => I256_MIN),
        shl4(op::SHL, 256_U256, 1_U256 => 0_U256),

        shr1(op::SHR, 0_U256, 1_U256 => 1_U256),
        shr2(op::SHR, 1_U256, 2_U256 => 1_U256),
        shr3(op::SHR, 255_U256, I256_MIN => 1_U256),
        shr4(op::SHR, 256_U256, U256::MAX => 0_U256),

        sar1(op::SAR, 0_U256, 1_U256 => 1_U256),
        sar2(op::SAR, 1_U256, 2_U256 => 1_U256),
        sar3(op::SAR, 1_U256, -1_U256 => -1_U256),
        sar4(op::SAR, 256_U256, -1_U256 => -1_U256),
        sar5(op::SAR, 255_U256, 0x1100000000000000000000000000000000000000000000000000000000000000_U256 => 0_U256),
        sar6(op::SAR, 255_U256, 0xf000000000000000000000000000000000000000000000000000000000000000_U256 => U256::MAX),
        sar7(op::SAR, 4_U256, 0xf000000000000000000000000000000000000000000000000000000000000000_U256 => 0xff00000000000000000000000000000000000000000000000000000000000000_U256),
    }

    system {
        keccak256_empty1(@raw {
            bytecode: &[op::PUSH0, op::PUSH0, op::KECCAK256],
            expected_stack: &[KECCAK_EMPTY],
        }),
        keccak256_empty2(@raw {
            bytecode: &[op::PUSH0, op::PUSH8, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, op::KECCAK256],
            expected_stack: &[KECCAK_EMPTY],
        }),
        keccak256_1(@raw {
            bytecode: &[op::PUSH1, 32, op::PUSH0, op::KECCAK256],
            expected_stack: &[0x290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563_U256],
            expected_memory: &[0; 32],
        }),
    }

    calldata {
        callvalue(@raw {
            bytecode: &[op::CALLVALUE],
            expected_stack: &[DEF_VALUE],
        }),
        calldataload1(op::CALLDATALOAD, 0_U256 => U256::from_be_bytes([0xaa; 32])),
        calldataload2(op::CALLDATALOAD, 63_U256 => 0xaa00000000000000000000000000000000000000000000000000000000000000_U256),
        calldataload3(op::CALLDATALOAD, 64_U256 => 0_U256),
        calldataload4(op::CALLDATALOAD, U256::MAX => 0_U256),
        calldatasize(@raw {
            bytecode: &[op::CALLDATASIZE],
            expected_stack: &[64_U256],
        }),
        calldatacopy(@raw {
            bytecode: &[op::PUSH1, 3, op::PUSH1, 62, op::PUSH0, op::CALLDATACOPY],
            expected_memory: &hex!("aaaa000000000000000000000000000000000000000000000000000000000000"),
        }),
        calldatacopy_empty(@raw {
            bytecode: &[op::PUSH0, op::PUSH0, op::PUSH8, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, op::CALLDATACOPY],
        }),
        calldata_empty(@raw {
            bytecode: &[op::CALLDATASIZE, op::PUSH0, op::CALLDATALOAD],
            calldata: &[],
            expected_stack: &[0_U256, 0_U256],
        }),
    }

    code {
        codesize(@raw {
            bytecode: &[op::CODESIZE, op::PUSH0],
            expected_stack: &[2_U256, 0_U256],
        }),
        codecopy(@raw {
            bytecode: &[op::PUSH1, 8, op::PUSH0, op::PUSH0, op::CODECOPY],
            expected_memory: &hex!("60085f5f39000000000000000000000000000000000000000000000000000000"),
        }),
    }

    memory {
        mload1(@raw {
            bytecode: &bytecode_unop(op::MLOAD, 0_U256),
            expected_stack: &[0_U256],
            expected_memory: &[0; 32],
        }),
        mstore_mload(@raw {
            bytecode: &[op::PUSH1, 0x69, op::PUSH1, 1, op::MSTORE, op::PUSH1, 1, op::MLOAD],
            expected_stack: &[0x69_U256],
            expected_memory: &hex!("00000000000000000000000000000000000000000000000000000000000000006900000000000000000000000000000000000000000000000000000000000000"),
        }),
        mstore8(@raw {
            bytecode: &[op::PUSH2, 0x12, 0x34, op::PUSH1, 31, op::MSTORE8],
            expected_memory: &hex!("0000000000000000000000000000000000000000000000000000000000000034"),
        }),
        msize1(@raw {
            bytecode: &[op::MSIZE],
            expected_stack: &[0_U256],
        }),
        msize2(@raw {
            bytecode: &[op::PUSH1, 33, op::MLOAD, op::POP, op::MSIZE],
            expected_stack: &[96_U256],
            expected_memory: &[0; 96],
        }),
        mcopy(@raw {
            bytecode: &[op::PUSH1, 0x69, op::PUSH0, op::MSTORE, op::PUSH1, 32, op::PUSH0, op::PUSH1, 32, op::MCOPY],
            expected_memory: &hex!("00000000000000000000000000000000000000000000000000000000000000690000000000000000000000000000000000000000000000000000000000000069"),
        }),
        mcopy_empty(@raw {
            bytecode: &[op::PUSH0, op::PUSH0, op::PUSH8, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, op::MCOPY],
        }),
        mload_unaddressable(@raw {
            bytecode: &bytecode_unop(op::MLOAD, U256::MAX),
            expected_error: Some(ExecError::MemoryLimitExceeded),
        }),
        mstore_overflow(@raw {
            bytecode: &[op::PUSH0, op::PUSH8, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, op::MSTORE],
            expected_error: Some(ExecError::MemoryLimitExceeded),
        }),
    }

    impure {
        address(@raw {
            bytecode: &[op::ADDRESS],
            expected_error: Some(ExecError::Impure(Opcode::Address)),
        }),
        origin(@raw {
            bytecode: &[op::ORIGIN],
            expected_error: Some(ExecError::Impure(Opcode::Origin)),
        }),
        gas(@raw {
            bytecode: &[op::GAS],
            expected_error: Some(ExecError::Impure(Opcode::Gas)),
        }),
        sload(@raw {
            bytecode: &[op::PUSH0, op::SLOAD],
            expected_error: Some(ExecError::Impure(Opcode::SLoad)),
        }),
        sstore_empty_stack(@raw {
            bytecode: &[op::SSTORE],
            expected_error: Some(ExecError::Impure(Opcode::SStore)),
        }),
        tload(@raw {
            bytecode: &[op::TLOAD],
            expected_error: Some(ExecError::Impure(Opcode::TLoad)),
        }),
        log2(@raw {
            bytecode: &[op::LOG2],
            expected_error: Some(ExecError::Impure(Opcode::Log(2))),
        }),
        blobbasefee(@raw {
            bytecode: &[op::BLOBBASEFEE],
            expected_error: Some(ExecError::Impure(Opcode::BlobBaseFee)),
        }),
        call(@raw {
            bytecode: &[op::CALL],
            expected_error: Some(ExecError::Impure(Opcode::Call)),
        }),
        create2(@raw {
            bytecode: &[op::CREATE2],
            expected_error: Some(ExecError::Impure(Opcode::Create2)),
        }),
        selfdestruct(@raw {
            bytecode: &[op::SELFDESTRUCT],
            expected_error: Some(ExecError::Impure(Opcode::SelfDestruct)),
        }),
        after_pure_prefix(@raw {
            bytecode: &[op::PUSH1, 1, op::CALLER],
            expected_error: Some(ExecError::Impure(Opcode::Caller)),
        }),
    }
}

const KECCAK_EMPTY: U256 =
    uint!(0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470_U256);

#[test]
fn step_limit() {
    let program = load(&[op::JUMPDEST, op::PUSH0, op::JUMP]);
    let mut interpreter = Interpreter::new();
    interpreter.step_limit(Some(100));
    assert_eq!(
        interpreter.exec(&program, &Env::default()),
        Err(ExecError::StepLimitReached(100))
    );
}

#[test]
fn stack_limit() {
    let program = load(&[op::PUSH0; 5]);
    let mut interpreter = Interpreter::new();
    interpreter.stack_limit(Some(4));
    assert_eq!(
        interpreter.exec(&program, &Env::default()),
        Err(ExecError::StackOverflow { limit: 4 })
    );
    interpreter.stack_limit(Some(5));
    assert_eq!(interpreter.exec(&program, &Env::default()).unwrap().stack, [U256::ZERO; 5]);
}

#[test]
fn memory_limit() {
    let program = load(&[op::PUSH1, 64, op::MLOAD]);
    let mut interpreter = Interpreter::new();
    interpreter.memory_limit(Some(64));
    assert_eq!(
        interpreter.exec(&program, &Env::default()),
        Err(ExecError::MemoryLimitExceeded)
    );
    interpreter.memory_limit(Some(96));
    assert_eq!(interpreter.exec(&program, &Env::default()).unwrap().memory.len(), 96);
}

#[test]
fn independent_runs() {
    let program = load(&[op::CALLVALUE, op::PUSH0, op::MSTORE, op::PUSH1, 32, op::PUSH0, op::RETURN]);
    let results = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4u64)
            .map(|i| {
                let program = &program;
                s.spawn(move || exec(program, &[], U256::from(i)).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>()
    });
    for (i, r) in results.iter().enumerate() {
        assert_eq!(r.output[..], U256::from(i).to_be_bytes::<32>());
    }
}

fn bytecode_unop(op: u8, a: U256) -> [u8; 34] {
    let mut code = [0; 34];
    let mut i = 0;
    build_push32!(code[i], a);
    code[i] = op;
    code
}

fn bytecode_binop(op: u8, a: U256, b: U256) -> [u8; 67] {
    let mut code = [0; 67];
    let mut i = 0;
    build_push32!(code[i], b);
    build_push32!(code[i], a);
    code[i] = op;
    code
}

fn bytecode_ternop(op: u8, a: U256, b: U256, c: U256) -> [u8; 100] {
    let mut code = [0; 100];
    let mut i = 0;
    build_push32!(code[i], c);
    build_push32!(code[i], b);
    build_push32!(code[i], a);
    code[i] = op;
    code
}

use super::op;
use crate::Opcode;
use bitflags::bitflags;
use revm_interpreter::OPCODE_INFO_JUMPTABLE;

bitflags! {
    /// Opcode flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct OpFlags: u8 {
        /// The byte is not assigned to any opcode.
        const UNKNOWN = 1 << 0;
        /// The opcode depends on, or modifies, state outside of the current run.
        const IMPURE = 1 << 1;
        /// Execution never continues with the next instruction.
        const DIVERGING = 1 << 2;
    }
}

/// Static opcode information.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// The number of stack items the opcode pops.
    pub inputs: u8,
    /// The number of stack items the opcode pushes.
    pub outputs: u8,
    /// The opcode flags.
    pub flags: OpFlags,
}

impl OpcodeInfo {
    const UNKNOWN: Self = Self::new(0, 0, OpFlags::UNKNOWN);

    /// Creates a new opcode info.
    #[inline]
    pub const fn new(inputs: u8, outputs: u8, flags: OpFlags) -> Self {
        Self { inputs, outputs, flags }
    }

    /// Returns `true` if the opcode is unknown.
    #[inline]
    pub const fn is_unknown(self) -> bool {
        self.flags.contains(OpFlags::UNKNOWN)
    }

    /// Returns `true` if the opcode can't be executed without chain state.
    #[inline]
    pub const fn is_impure(self) -> bool {
        self.flags.contains(OpFlags::IMPURE)
    }

    /// Returns `true` if execution never continues with the next instruction.
    #[inline]
    pub const fn is_diverging(self) -> bool {
        self.flags.contains(OpFlags::DIVERGING)
    }

    /// Returns the net change of the stack length.
    #[inline]
    pub const fn stack_diff(self) -> i16 {
        self.outputs as i16 - self.inputs as i16
    }
}

const OP_INFO_MAP: [OpcodeInfo; 256] = make_map();

/// Returns the static information of the given opcode byte.
#[inline]
pub const fn op_info(byte: u8) -> OpcodeInfo {
    OP_INFO_MAP[byte as usize]
}

const fn make_map() -> [OpcodeInfo; 256] {
    let mut map = [OpcodeInfo::UNKNOWN; 256];

    // Stack I/O of every opcode that `Opcode` decodes.
    let mut i = 0;
    while i < 256 {
        if !Opcode::from_byte(i as u8).is_unknown() {
            if let Some(info) = &OPCODE_INFO_JUMPTABLE[i] {
                map[i] = OpcodeInfo::new(info.inputs(), info.outputs(), OpFlags::empty());
            }
        }
        i += 1;
    }

    macro_rules! flag {
        ($flag:ident: $($op:ident),* $(,)?) => {
            $(
                map[op::$op as usize].flags = map[op::$op as usize].flags.union(OpFlags::$flag);
            )*
        };
    }
    flag!(DIVERGING: STOP, JUMP, RETURN, REVERT, INVALID, SELFDESTRUCT);
    flag!(IMPURE:
        ADDRESS, BALANCE, ORIGIN, CALLER, GASPRICE, EXTCODESIZE, EXTCODECOPY, RETURNDATASIZE,
        RETURNDATACOPY, EXTCODEHASH, BLOCKHASH, COINBASE, TIMESTAMP, NUMBER, DIFFICULTY, GASLIMIT,
        CHAINID, SELFBALANCE, BASEFEE, BLOBHASH, BLOBBASEFEE, SLOAD, SSTORE, GAS, TLOAD, TSTORE,
        CREATE, CALL, CALLCODE, DELEGATECALL, CREATE2, STATICCALL, SELFDESTRUCT,
    );
    let mut n = 0u8;
    while n <= 4 {
        map[(op::LOG0 + n) as usize].flags = OpFlags::IMPURE;
        n += 1;
    }

    map
}

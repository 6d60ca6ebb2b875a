use crate::OpcodeInfo;
use revm_interpreter::{OpCode, OPCODE_INFO_JUMPTABLE};
use std::{fmt, slice};

/// Opcode byte constants.
pub use revm_interpreter::opcode as op;

macro_rules! opcodes {
    ($($name:ident => $variant:ident;)*) => {
        /// An EVM opcode.
        ///
        /// Every byte decodes to exactly one variant: assigned bytes map to their opcode, the
        /// `PUSH`, `DUP`, `SWAP` and `LOG` families carry their parameter, and every other byte is
        /// [`Opcode::Unknown`].
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Opcode {
            $(
                #[doc = concat!("`", stringify!($name), "`.")]
                $variant,
            )*
            /// `PUSH0` to `PUSH32`. The parameter is the number of immediate bytes, `0..=32`.
            Push(u8),
            /// `DUP1` to `DUP16`. The parameter is the 1-based stack index, `1..=16`.
            Dup(u8),
            /// `SWAP1` to `SWAP16`. The parameter is the 1-based stack index, `1..=16`.
            Swap(u8),
            /// `LOG0` to `LOG4`. The parameter is the number of topics, `0..=4`.
            Log(u8),
            /// A byte that is not assigned to any opcode.
            Unknown(u8),
        }

        impl Opcode {
            /// Decodes an opcode byte.
            pub const fn from_byte(byte: u8) -> Self {
                match byte {
                    $(op::$name => Self::$variant,)*
                    op::PUSH0..=op::PUSH32 => Self::Push(byte - op::PUSH0),
                    op::DUP1..=op::DUP16 => Self::Dup(byte - op::DUP1 + 1),
                    op::SWAP1..=op::SWAP16 => Self::Swap(byte - op::SWAP1 + 1),
                    op::LOG0..=op::LOG4 => Self::Log(byte - op::LOG0),
                    _ => Self::Unknown(byte),
                }
            }

            /// Returns the opcode byte.
            ///
            /// The parameter of a family variant must be within its documented range.
            pub const fn to_byte(self) -> u8 {
                debug_assert!(self.is_valid(), "opcode parameter out of range");
                match self {
                    $(Self::$variant => op::$name,)*
                    Self::Push(n) => op::PUSH0 + n,
                    Self::Dup(n) => op::DUP1 + n - 1,
                    Self::Swap(n) => op::SWAP1 + n - 1,
                    Self::Log(n) => op::LOG0 + n,
                    Self::Unknown(byte) => byte,
                }
            }
        }
    };
}

opcodes! {
    STOP => Stop;
    ADD => Add;
    MUL => Mul;
    SUB => Sub;
    DIV => Div;
    SDIV => SDiv;
    MOD => Mod;
    SMOD => SMod;
    ADDMOD => AddMod;
    MULMOD => MulMod;
    EXP => Exp;
    SIGNEXTEND => SignExtend;
    LT => Lt;
    GT => Gt;
    SLT => SLt;
    SGT => SGt;
    EQ => Eq;
    ISZERO => IsZero;
    AND => And;
    OR => Or;
    XOR => Xor;
    NOT => Not;
    BYTE => Byte;
    SHL => Shl;
    SHR => Shr;
    SAR => Sar;
    KECCAK256 => Keccak256;
    ADDRESS => Address;
    BALANCE => Balance;
    ORIGIN => Origin;
    CALLER => Caller;
    CALLVALUE => CallValue;
    CALLDATALOAD => CallDataLoad;
    CALLDATASIZE => CallDataSize;
    CALLDATACOPY => CallDataCopy;
    CODESIZE => CodeSize;
    CODECOPY => CodeCopy;
    GASPRICE => GasPrice;
    EXTCODESIZE => ExtCodeSize;
    EXTCODECOPY => ExtCodeCopy;
    RETURNDATASIZE => ReturnDataSize;
    RETURNDATACOPY => ReturnDataCopy;
    EXTCODEHASH => ExtCodeHash;
    BLOCKHASH => BlockHash;
    COINBASE => Coinbase;
    TIMESTAMP => Timestamp;
    NUMBER => Number;
    DIFFICULTY => PrevRandao;
    GASLIMIT => GasLimit;
    CHAINID => ChainId;
    SELFBALANCE => SelfBalance;
    BASEFEE => BaseFee;
    BLOBHASH => BlobHash;
    BLOBBASEFEE => BlobBaseFee;
    POP => Pop;
    MLOAD => MLoad;
    MSTORE => MStore;
    MSTORE8 => MStore8;
    SLOAD => SLoad;
    SSTORE => SStore;
    JUMP => Jump;
    JUMPI => JumpI;
    PC => Pc;
    MSIZE => MSize;
    GAS => Gas;
    JUMPDEST => JumpDest;
    TLOAD => TLoad;
    TSTORE => TStore;
    MCOPY => MCopy;
    CREATE => Create;
    CALL => Call;
    CALLCODE => CallCode;
    RETURN => Return;
    DELEGATECALL => DelegateCall;
    CREATE2 => Create2;
    STATICCALL => StaticCall;
    REVERT => Revert;
    INVALID => Invalid;
    SELFDESTRUCT => SelfDestruct;
}

impl Opcode {
    /// Returns `true` if the parameter of a family variant is within its range, and an
    /// [`Opcode::Unknown`] byte is really unassigned.
    pub const fn is_valid(self) -> bool {
        match self {
            Self::Push(n) => n <= 32,
            Self::Dup(n) | Self::Swap(n) => matches!(n, 1..=16),
            Self::Log(n) => n <= 4,
            Self::Unknown(byte) => matches!(Self::from_byte(byte), Self::Unknown(_)),
            _ => true,
        }
    }

    /// Returns the mnemonic of the opcode, or `UNKNOWN`.
    ///
    /// `PREVRANDAO` is named `DIFFICULTY`, as in the opcode table it is read from.
    pub fn name(self) -> &'static str {
        if self.is_unknown() || !self.is_valid() {
            return "UNKNOWN";
        }
        match &OPCODE_INFO_JUMPTABLE[self.to_byte() as usize] {
            Some(info) => info.name(),
            None => "UNKNOWN",
        }
    }

    /// Parses a mnemonic, ignoring ASCII case.
    ///
    /// `SHA3` and `PREVRANDAO` are accepted as aliases of `KECCAK256` and `DIFFICULTY`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.to_ascii_uppercase();
        match s.as_str() {
            "SHA3" => return Some(Self::Keccak256),
            "PREVRANDAO" | "DIFFICULTY" => return Some(Self::PrevRandao),
            _ => {}
        }
        let op = Self::from_byte(OpCode::parse(&s)?.get());
        (!op.is_unknown()).then_some(op)
    }

    /// Returns the static information of this opcode.
    #[inline]
    pub const fn info(self) -> OpcodeInfo {
        crate::op_info(self.to_byte())
    }

    /// Returns the number of immediate bytes that follow this opcode in the byte stream.
    #[inline]
    pub const fn imm_len(self) -> usize {
        match self {
            Self::Push(n) => n as usize,
            _ => 0,
        }
    }

    /// Returns `true` if the byte is not assigned to any opcode.
    #[inline]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown(_))
    }

    /// Returns `true` if this opcode reads chain state and can't be executed.
    #[inline]
    pub const fn is_impure(self) -> bool {
        self.info().is_impure()
    }

    /// Returns `true` if this opcode always stops execution.
    #[inline]
    pub const fn is_diverging(self) -> bool {
        self.info().is_diverging()
    }
}

impl From<u8> for Opcode {
    #[inline]
    fn from(byte: u8) -> Self {
        Self::from_byte(byte)
    }
}

impl From<Opcode> for u8 {
    #[inline]
    fn from(op: Opcode) -> Self {
        op.to_byte()
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Unknown(byte) => write!(f, "UNKNOWN(0x{byte:02x})"),
            Self::Push(n) if n > 32 => write!(f, "PUSH{n}"),
            Self::Dup(n) | Self::Swap(n) if !matches!(n, 1..=16) => {
                let family = if matches!(self, Self::Dup(_)) { "DUP" } else { "SWAP" };
                write!(f, "{family}{n}")
            }
            Self::Log(n) if n > 4 => write!(f, "LOG{n}"),
            _ => f.write_str(self.name()),
        }
    }
}

/// A bytecode iterator that yields opcodes and their immediate data, alongside the program counter.
///
/// Created by calling [`OpcodesIter::with_pc`].
#[derive(Debug)]
pub struct OpcodesIterWithPc<'a> {
    iter: OpcodesIter<'a>,
    pc: usize,
}

impl<'a> Iterator for OpcodesIterWithPc<'a> {
    type Item = (usize, RawOpcode<'a>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|raw| {
            let pc = self.pc;
            self.pc += 1 + raw.opcode.imm_len();
            (pc, raw)
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl std::iter::FusedIterator for OpcodesIterWithPc<'_> {}

/// An iterator that yields opcodes and their immediate data.
///
/// Immediate bytes are never decoded as opcodes. If the bytecode ends in the middle of a push
/// immediate, the last item carries the truncated immediate; for example `PUSH2 0x69` yields
/// `PUSH2, Some([0x69])`.
#[derive(Clone, Debug)]
pub struct OpcodesIter<'a> {
    iter: slice::Iter<'a, u8>,
}

impl fmt::Display for OpcodesIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, op) in self.clone().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

impl<'a> OpcodesIter<'a> {
    /// Create a new iterator over the given bytecode slice.
    #[inline]
    pub fn new(slice: &'a [u8]) -> Self {
        Self { iter: slice.iter() }
    }

    /// Returns a new iterator that also yields the program counter alongside the opcode and
    /// immediate data.
    #[inline]
    pub fn with_pc(self) -> OpcodesIterWithPc<'a> {
        OpcodesIterWithPc { iter: self, pc: 0 }
    }

    /// Returns the inner iterator.
    #[inline]
    pub fn into_inner(self) -> slice::Iter<'a, u8> {
        self.iter
    }
}

impl<'a> Iterator for OpcodesIter<'a> {
    type Item = RawOpcode<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|&byte| {
            let opcode = Opcode::from_byte(byte);
            let len = opcode.imm_len();
            let immediate = if len > 0 {
                let rest = self.iter.as_slice();
                let imm = &rest[..len.min(rest.len())];
                self.iter = rest[imm.len()..].iter();
                Some(imm)
            } else {
                None
            };
            RawOpcode { opcode, immediate }
        })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.iter.len();
        ((len != 0) as usize, Some(len))
    }
}

impl std::iter::FusedIterator for OpcodesIter<'_> {}

/// An opcode and its immediate data. Returned by [`OpcodesIter`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RawOpcode<'a> {
    /// The opcode.
    pub opcode: Opcode,
    /// The immediate data, if any.
    pub immediate: Option<&'a [u8]>,
}

impl fmt::Debug for RawOpcode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for RawOpcode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.opcode, f)?;
        match self.immediate {
            Some(imm) if !imm.is_empty() => {
                write!(f, " {}", alloy_primitives::hex::encode_prefixed(imm))
            }
            _ => Ok(()),
        }
    }
}

/// Returns a string representation of the given bytecode.
pub fn format_bytecode(bytecode: &[u8]) -> String {
    let mut w = String::new();
    format_bytecode_to(bytecode, &mut w).unwrap();
    w
}

/// Formats an EVM bytecode to the given writer.
pub fn format_bytecode_to<W: fmt::Write + ?Sized>(bytecode: &[u8], w: &mut W) -> fmt::Result {
    write!(w, "{}", OpcodesIter::new(bytecode))
}

//! EVM bytecode and instruction representation.

use crate::AsmError;
use alloy_primitives::{hex, Bytes, U256};
use bitvec::vec::BitVec;
use rustc_hash::FxHashMap;
use std::fmt;

mod info;
pub use info::*;

mod opcode;
pub use opcode::*;

/// An index into the instructions of a [`Program`].
///
/// Also known as `ic`, or instruction counter; not to be confused with the program counter, which
/// is a byte offset into the code.
pub type Inst = usize;

/// A single instruction.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// An opcode without immediate data.
    Op(Opcode),
    /// `PUSH0` to `PUSH32` with its literal.
    Push(Push),
    /// `JUMPDEST`.
    JumpDest,
}

impl From<Opcode> for Instruction {
    /// Converts an opcode to an instruction. `PUSHn` pushes `n` zero bytes.
    fn from(opcode: Opcode) -> Self {
        match opcode {
            Opcode::JumpDest => Self::JumpDest,
            Opcode::Push(width) => {
                Self::Push(Push { width, imm: vec![0; width as usize].into(), value: U256::ZERO })
            }
            _ => Self::Op(opcode),
        }
    }
}

impl From<Push> for Instruction {
    fn from(push: Push) -> Self {
        Self::Push(push)
    }
}

impl Instruction {
    /// Returns the opcode of this instruction.
    #[inline]
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Op(op) => *op,
            Self::Push(push) => Opcode::Push(push.width),
            Self::JumpDest => Opcode::JumpDest,
        }
    }

    /// Returns the encoded size of this instruction in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        match self {
            Self::Push(push) => 1 + push.imm.len(),
            _ => 1,
        }
    }

    /// Appends the encoded instruction to `out`.
    pub fn encode_to(&self, out: &mut Vec<u8>) {
        out.push(self.opcode().to_byte());
        if let Self::Push(push) = self {
            out.extend_from_slice(&push.imm);
        }
    }

    /// Rewrites `Op(JUMPDEST)` and `Op(PUSHn)` into their dedicated variants.
    fn normalize(self) -> Self {
        match self {
            Self::Op(op @ (Opcode::JumpDest | Opcode::Push(_))) => op.into(),
            inst => inst,
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Op(op) => fmt::Display::fmt(op, f),
            Self::Push(push) => fmt::Display::fmt(push, f),
            Self::JumpDest => f.write_str("JUMPDEST"),
        }
    }
}

/// The literal of a `PUSH` instruction.
///
/// The immediate is stored as it appears in the byte stream. It is shorter than the width only for
/// a push truncated by the end of the code, in which case the missing bytes read as zero.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Push {
    width: u8,
    imm: Box<[u8]>,
    value: U256,
}

impl Push {
    /// Creates a push of the minimal width that holds `value`, but at least one byte.
    pub fn from_value(value: U256) -> Self {
        let width = value.byte_len().max(1);
        let bytes = value.to_be_bytes::<32>();
        Self { width: width as u8, imm: bytes[32 - width..].into(), value }
    }

    /// Creates a push of the given width. Returns `None` if `width > 32` or `value` does not fit.
    pub fn with_width(value: U256, width: u8) -> Option<Self> {
        if width > 32 || value.byte_len() > width as usize {
            return None;
        }
        let bytes = value.to_be_bytes::<32>();
        let imm = bytes[32 - width as usize..].into();
        Some(Self { width, imm, value })
    }

    /// Creates a push of the given big-endian bytes. Returns `None` if there are more than 32.
    pub fn from_slice(imm: &[u8]) -> Option<Self> {
        (imm.len() <= 32).then(|| Self::truncated(imm.len() as u8, imm))
    }

    /// `imm.len() <= width <= 32`.
    fn truncated(width: u8, imm: &[u8]) -> Self {
        debug_assert!(imm.len() <= width as usize && width <= 32);
        let mut word = [0u8; 32];
        word[32 - width as usize..][..imm.len()].copy_from_slice(imm);
        Self { width, imm: imm.into(), value: U256::from_be_bytes(word) }
    }

    /// Returns the declared number of immediate bytes.
    #[inline]
    pub fn width(&self) -> u8 {
        self.width
    }

    /// Returns the immediate bytes as they appear in the code.
    #[inline]
    pub fn immediate(&self) -> &[u8] {
        &self.imm
    }

    /// Returns the pushed value.
    #[inline]
    pub fn value(&self) -> U256 {
        self.value
    }

    /// Returns `true` if the immediate was cut short by the end of the code.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.imm.len() < self.width as usize
    }
}

impl fmt::Debug for Push {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Push {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Opcode::Push(self.width), f)?;
        if !self.imm.is_empty() {
            write!(f, " {}", hex::encode_prefixed(&self.imm))?;
        }
        Ok(())
    }
}

/// The set of valid jump destinations of a program.
///
/// `jump_table.contains(pc)` is `true` if a `JUMPDEST` instruction starts at `pc`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct JumpTable(BitVec);

impl JumpTable {
    /// Returns `true` if `pc` is a valid jump destination.
    #[inline]
    pub fn contains(&self, pc: usize) -> bool {
        self.0.get(pc).is_some_and(|bit| *bit)
    }

    /// Returns the number of jump destinations.
    pub fn len(&self) -> usize {
        self.0.count_ones()
    }

    /// Returns `true` if there are no jump destinations.
    pub fn is_empty(&self) -> bool {
        self.0.not_any()
    }

    /// Returns an iterator over the jump destinations, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter_ones()
    }
}

impl fmt::Debug for JumpTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// A loaded or assembled program.
///
/// Immutable once built. Holds the raw code, the instruction stream, the byte offset of each
/// instruction and the [`JumpTable`].
#[derive(Clone)]
pub struct Program {
    code: Bytes,
    insts: Vec<Instruction>,
    /// `pcs[inst]` is the byte offset of `insts[inst]`.
    pcs: Vec<usize>,
    jumpdests: JumpTable,
    /// Mapping from program counter to instruction.
    pc_to_inst: FxHashMap<usize, Inst>,
}

impl Program {
    /// Creates a new program from a list of instructions, serializing them to code.
    ///
    /// `Op(JUMPDEST)` and `Op(PUSHn)` are normalized as in [`Instruction::from`]. Fails with
    /// [`AsmError::InvalidOpcode`] if an opcode has no encoding, such as `DUP17`.
    pub fn new(insts: impl IntoIterator<Item = Instruction>) -> Result<Self, AsmError> {
        let insts = insts
            .into_iter()
            .map(|inst| match inst.opcode() {
                op if op.is_valid() => Ok(inst.normalize()),
                op => Err(AsmError::InvalidOpcode(op)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut code = Vec::with_capacity(insts.iter().map(Instruction::size).sum());
        let mut pcs = Vec::with_capacity(insts.len());
        for inst in &insts {
            pcs.push(code.len());
            inst.encode_to(&mut code);
        }
        Ok(Self::from_parts(code.into(), insts, pcs))
    }

    fn from_parts(code: Bytes, insts: Vec<Instruction>, pcs: Vec<usize>) -> Self {
        debug_assert_eq!(insts.len(), pcs.len());
        let mut jumpdests = BitVec::repeat(false, code.len());
        let mut pc_to_inst = FxHashMap::with_capacity_and_hasher(insts.len(), Default::default());
        for (inst, (data, &pc)) in insts.iter().zip(&pcs).enumerate() {
            pc_to_inst.insert(pc, inst);
            if let Instruction::JumpDest = data {
                jumpdests.set(pc, true);
            }
        }
        Self { code, insts, pcs, jumpdests: JumpTable(jumpdests), pc_to_inst }
    }

    /// Returns the raw code.
    #[inline]
    pub fn code(&self) -> &Bytes {
        &self.code
    }

    /// Consumes the program, returning the raw code.
    #[inline]
    pub fn into_code(self) -> Bytes {
        self.code
    }

    /// Returns the instructions.
    #[inline]
    pub fn insts(&self) -> &[Instruction] {
        &self.insts
    }

    /// Returns the instruction at the given instruction counter.
    #[inline]
    #[track_caller]
    pub fn inst(&self, inst: Inst) -> &Instruction {
        &self.insts[inst]
    }

    /// Returns the number of instructions.
    #[inline]
    pub fn len(&self) -> usize {
        self.insts.len()
    }

    /// Returns `true` if the program has no instructions.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    /// Returns the byte offset of the given instruction.
    #[inline]
    #[track_caller]
    pub fn pc(&self, inst: Inst) -> usize {
        self.pcs[inst]
    }

    /// Returns the instruction that starts at the given byte offset, if any.
    #[inline]
    pub fn inst_at_pc(&self, pc: usize) -> Option<Inst> {
        self.pc_to_inst.get(&pc).copied()
    }

    /// Returns the valid jump destinations.
    #[inline]
    pub fn jump_table(&self) -> &JumpTable {
        &self.jumpdests
    }

    /// Returns an iterator over the instructions and their byte offsets.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (usize, &Instruction)> + '_ {
        self.pcs.iter().copied().zip(&self.insts)
    }
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.insts == other.insts
    }
}

impl Eq for Program {}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = format!("{:^6} | {:^6} | {}", "ic", "pc", "instruction");
        writeln!(f, "{header}")?;
        writeln!(f, "{}", "-".repeat(header.len().max(40)))?;
        for (inst, (pc, data)) in self.iter().enumerate() {
            writeln!(f, "{inst:>6} | {pc:>6} | {data}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("code", &hex::encode(&self.code))
            .field("insts", &self.insts)
            .field("jumpdests", &self.jumpdests)
            .finish()
    }
}

/// Loads raw bytecode into a [`Program`].
///
/// Never fails: unassigned bytes become [`Opcode::Unknown`] and only error when executed. Push
/// literals are never decoded as opcodes, so a `JUMPDEST` byte inside a literal is not a jump
/// destination.
#[instrument(level = "debug", skip_all)]
pub fn load(code: &[u8]) -> Program {
    let mut insts = Vec::with_capacity(code.len());
    let mut pcs = Vec::with_capacity(code.len());
    for (pc, RawOpcode { opcode, immediate }) in OpcodesIter::new(code).with_pc() {
        pcs.push(pc);
        insts.push(match opcode {
            Opcode::Push(width) => {
                Instruction::Push(Push::truncated(width, immediate.unwrap_or_default()))
            }
            Opcode::JumpDest => Instruction::JumpDest,
            _ => Instruction::Op(opcode),
        });
    }
    let program = Program::from_parts(Bytes::copy_from_slice(code), insts, pcs);
    debug!(
        code_len = code.len(),
        insts = program.len(),
        jumpdests = program.jump_table().len(),
        "loaded program"
    );
    program
}

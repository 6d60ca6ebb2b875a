//! Macro-assembler.
//!
//! Lowers a tree of [`Node`]s into a flat [`Program`]. Labels are resolved in a single pass: every
//! jump pointer is a push of a fixed width, so the offset of each instruction is known before any
//! label is.

use crate::{AsmError, Instruction, Opcode, Program, Push};
use alloy_primitives::{ruint::UintTryFrom, U256};
use rustc_hash::FxHashMap;
use std::fmt;

/// A jump label.
///
/// Only named labels can be created outside of the assembler, so they never collide with the
/// labels it generates for [`Node::If`].
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(LabelKind);

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum LabelKind {
    Named(String),
    /// Numbered from 0 for each compilation.
    Anon(u32),
}

impl Label {
    /// Creates a named label.
    pub fn named(name: impl Into<String>) -> Self {
        Self(LabelKind::Named(name.into()))
    }

    const fn anon(n: u32) -> Self {
        Self(LabelKind::Anon(n))
    }

    /// Returns the name of the label, or `None` if it was generated by the assembler.
    pub fn name(&self) -> Option<&str> {
        match &self.0 {
            LabelKind::Named(name) => Some(name),
            LabelKind::Anon(_) => None,
        }
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            LabelKind::Named(name) => write!(f, "@{name}"),
            LabelKind::Anon(n) => write!(f, "@.L{n}"),
        }
    }
}

/// A node of the assembler input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// An opcode without immediate data.
    Op(Opcode),
    /// A push literal.
    Push(Push),
    /// `JUMPDEST`.
    JumpDest,
    /// Pushes the offset of a label.
    JumpPtr(Label),
    /// Defines a label at the current offset, emitting a `JUMPDEST`.
    Label(Label),
    /// `op` with its operands. `args` are lowered in reverse order, so the first argument ends up
    /// on top of the stack.
    Call(Opcode, Vec<Node>),
    /// Executes `then` if `cond` leaves a non-zero value on the stack, `otherwise` if not.
    ///
    /// The layout is `cond; JUMPI(then); otherwise; then`, so `otherwise` must not fall through
    /// unless [`Assembler::guard_branches`] is enabled.
    If {
        /// The condition.
        cond: Box<Node>,
        /// The branch taken on a non-zero condition.
        then: Box<Node>,
        /// The branch taken on zero.
        otherwise: Box<Node>,
    },
    /// A sequence of nodes.
    Block(Vec<Node>),
}

impl Node {
    /// Creates a push of `value` using the minimal width, but at least one byte.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not fit in a word, as `U256::from` does.
    pub fn push<T>(value: T) -> Self
    where
        U256: UintTryFrom<T>,
    {
        Self::Push(Push::from_value(U256::from(value)))
    }

    /// Creates an `if` node.
    pub fn if_(cond: Self, then: Self, otherwise: Self) -> Self {
        Self::If { cond: Box::new(cond), then: Box::new(then), otherwise: Box::new(otherwise) }
    }

    /// Creates a call node.
    pub fn call(op: Opcode, args: impl IntoIterator<Item = Self>) -> Self {
        Self::Call(op, args.into_iter().collect())
    }

    /// Returns `true` if execution never continues after this node.
    pub fn is_diverging(&self) -> bool {
        match self {
            Self::Op(op) | Self::Call(op, _) => op.is_diverging(),
            Self::Block(nodes) => nodes.last().is_some_and(Self::is_diverging),
            Self::If { then, otherwise, .. } => then.is_diverging() && otherwise.is_diverging(),
            Self::Push(_) | Self::JumpDest | Self::JumpPtr(_) | Self::Label(_) => false,
        }
    }
}

impl From<Opcode> for Node {
    fn from(op: Opcode) -> Self {
        match Instruction::from(op) {
            Instruction::Op(op) => Self::Op(op),
            Instruction::Push(push) => Self::Push(push),
            Instruction::JumpDest => Self::JumpDest,
        }
    }
}

impl From<Instruction> for Node {
    fn from(inst: Instruction) -> Self {
        match inst {
            Instruction::Op(op) => Self::Op(op),
            Instruction::Push(push) => Self::Push(push),
            Instruction::JumpDest => Self::JumpDest,
        }
    }
}

/// A lowered node: an instruction, or a pseudo-instruction waiting for label resolution.
#[derive(Debug)]
enum Flat {
    Inst(Instruction),
    JumpPtr(Label),
    Label(Label),
}

/// Assembler configuration.
#[derive(Clone, Debug)]
pub struct Assembler {
    jump_ptr_width: u8,
    guard_branches: bool,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    /// The default jump pointer width in bytes.
    pub const DEFAULT_JUMP_PTR_WIDTH: u8 = 4;

    /// Creates a new assembler with the default configuration.
    pub const fn new() -> Self {
        Self { jump_ptr_width: Self::DEFAULT_JUMP_PTR_WIDTH, guard_branches: false }
    }

    /// Sets the width in bytes of the push emitted for each [`Node::JumpPtr`].
    ///
    /// Must be between 1 and 32. Defaults to [`DEFAULT_JUMP_PTR_WIDTH`](Self::DEFAULT_JUMP_PTR_WIDTH).
    pub fn jump_ptr_width(&mut self, width: u8) -> &mut Self {
        self.jump_ptr_width = width;
        self
    }

    /// Whether to make the branches of [`Node::If`] rejoin after `then` instead of relying on both
    /// branches halting.
    ///
    /// When enabled, `otherwise` is followed by a jump over `then`. Defaults to `false`.
    pub fn guard_branches(&mut self, yes: bool) -> &mut Self {
        self.guard_branches = yes;
        self
    }

    /// Lowers and resolves the nodes into a program.
    #[instrument(level = "debug", skip_all)]
    pub fn compile(&self, nodes: &[Node]) -> Result<Program, AsmError> {
        if !(1..=32).contains(&self.jump_ptr_width) {
            return Err(AsmError::InvalidPointerWidth(self.jump_ptr_width));
        }
        let mut lower = Lower { flat: Vec::new(), next_label: 0, guard_branches: self.guard_branches };
        for node in nodes {
            lower.node(node);
        }
        debug!(len = lower.flat.len(), labels = lower.next_label, "lowered");
        self.resolve(lower.flat)
    }

    /// Lowers, resolves and serializes the nodes.
    pub fn build(&self, nodes: &[Node]) -> Result<Vec<u8>, AsmError> {
        self.compile(nodes).map(|program| program.code().to_vec())
    }

    fn resolve(&self, flat: Vec<Flat>) -> Result<Program, AsmError> {
        let width = self.jump_ptr_width;

        // Pass 1: offsets.
        let mut labels = FxHashMap::default();
        let mut pc = 0usize;
        for item in &flat {
            match item {
                Flat::Inst(inst) => {
                    let op = inst.opcode();
                    if !op.is_valid() {
                        return Err(AsmError::InvalidOpcode(op));
                    }
                    pc += inst.size();
                }
                Flat::JumpPtr(_) => pc += 1 + width as usize,
                Flat::Label(label) => {
                    if labels.insert(label, pc).is_some() {
                        return Err(AsmError::DuplicateLabel(label.clone()));
                    }
                    pc += 1;
                }
            }
        }

        // Pass 2: patch.
        let mut insts = Vec::with_capacity(flat.len());
        for item in &flat {
            insts.push(match item {
                Flat::Inst(inst) => inst.clone(),
                Flat::JumpPtr(label) => {
                    let &offset =
                        labels.get(label).ok_or_else(|| AsmError::UnresolvedLabel(label.clone()))?;
                    let push = Push::with_width(U256::from(offset), width).ok_or_else(|| {
                        AsmError::LabelOutOfRange { label: label.clone(), offset, width }
                    })?;
                    Instruction::Push(push)
                }
                Flat::Label(_) => Instruction::JumpDest,
            });
        }
        Program::new(insts)
    }
}

struct Lower {
    flat: Vec<Flat>,
    next_label: u32,
    guard_branches: bool,
}

impl Lower {
    fn anon(&mut self) -> Label {
        let label = Label::anon(self.next_label);
        self.next_label += 1;
        label
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Op(op) => self.flat.push(Flat::Inst(Instruction::from(*op))),
            Node::Push(push) => self.flat.push(Flat::Inst(Instruction::Push(push.clone()))),
            Node::JumpDest => self.flat.push(Flat::Inst(Instruction::JumpDest)),
            Node::JumpPtr(label) => self.flat.push(Flat::JumpPtr(label.clone())),
            Node::Label(label) => self.flat.push(Flat::Label(label.clone())),
            Node::Call(op, args) => {
                for arg in args.iter().rev() {
                    self.node(arg);
                }
                self.flat.push(Flat::Inst(Instruction::from(*op)));
            }
            Node::If { cond, then, otherwise } => {
                let then_label = self.anon();
                self.node(cond);
                self.flat.push(Flat::JumpPtr(then_label.clone()));
                self.flat.push(Flat::Inst(Instruction::Op(Opcode::JumpI)));
                self.node(otherwise);
                if self.guard_branches {
                    let end_label = self.anon();
                    self.flat.push(Flat::JumpPtr(end_label.clone()));
                    self.flat.push(Flat::Inst(Instruction::Op(Opcode::Jump)));
                    self.flat.push(Flat::Label(then_label));
                    self.node(then);
                    self.flat.push(Flat::Label(end_label));
                } else {
                    if !otherwise.is_diverging() {
                        warn!(%then_label, "`else` branch falls through into `then` branch");
                    }
                    self.flat.push(Flat::Label(then_label));
                    self.node(then);
                }
            }
            Node::Block(nodes) => {
                for node in nodes {
                    self.node(node);
                }
            }
        }
    }
}

/// Compiles the nodes with the default [`Assembler`] configuration.
pub fn compile(nodes: &[Node]) -> Result<Program, AsmError> {
    Assembler::new().compile(nodes)
}

/// Compiles and serializes the nodes with the default [`Assembler`] configuration.
pub fn build(nodes: &[Node]) -> Result<Vec<u8>, AsmError> {
    Assembler::new().build(nodes)
}

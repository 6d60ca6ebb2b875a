//! Bytecode interpreter.

use crate::{
    word::{self, as_usize_saturated},
    ExecError, Inst, Instruction, Opcode, Program,
};
use alloy_primitives::{keccak256, Bytes, U256};
use std::{cmp::Ordering, ops::Range};

mod memory;
use memory::Memory;

mod stack;
use stack::Stack;

/// The per-run input of the interpreter.
#[derive(Clone, Copy, Debug, Default)]
pub struct Env<'a> {
    /// The call data.
    pub calldata: &'a [u8],
    /// The call value.
    pub callvalue: U256,
}

impl<'a> Env<'a> {
    /// Creates a new environment.
    pub const fn new(calldata: &'a [u8], callvalue: U256) -> Self {
        Self { calldata, callvalue }
    }
}

/// The outcome of a run that did not fail.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    /// The final stack, bottom first.
    pub stack: Vec<U256>,
    /// The final memory.
    pub memory: Vec<u8>,
    /// The data passed to `RETURN` or `REVERT`. Empty on `STOP`.
    pub output: Bytes,
    /// Whether execution ended with `REVERT`.
    pub reverted: bool,
    /// The number of executed instructions.
    pub steps: u64,
}

impl ExecutionResult {
    /// Returns `true` if execution did not revert.
    #[inline]
    pub fn is_success(&self) -> bool {
        !self.reverted
    }
}

/// Bytecode interpreter configuration.
///
/// Runs are independent: the interpreter keeps no state between calls to [`exec`](Self::exec).
#[derive(Clone, Debug, Default)]
pub struct Interpreter {
    step_limit: Option<u64>,
    stack_limit: Option<usize>,
    memory_limit: Option<usize>,
}

impl Interpreter {
    /// Creates a new interpreter with no limits.
    pub const fn new() -> Self {
        Self { step_limit: None, stack_limit: None, memory_limit: None }
    }

    /// Sets the maximum number of instructions to execute.
    ///
    /// Defaults to no limit.
    pub fn step_limit(&mut self, limit: Option<u64>) -> &mut Self {
        self.step_limit = limit;
        self
    }

    /// Sets the maximum number of stack items.
    ///
    /// Defaults to no limit.
    pub fn stack_limit(&mut self, limit: Option<usize>) -> &mut Self {
        self.stack_limit = limit;
        self
    }

    /// Sets the maximum memory size in bytes.
    ///
    /// Defaults to the addressable range. Offsets and sizes that can't be addressed are always
    /// reported as [`ExecError::MemoryLimitExceeded`].
    pub fn memory_limit(&mut self, limit: Option<usize>) -> &mut Self {
        self.memory_limit = limit;
        self
    }

    /// Executes the program.
    #[instrument(level = "debug", skip_all)]
    pub fn exec(&self, program: &Program, env: &Env<'_>) -> Result<ExecutionResult, ExecError> {
        let mut machine = Machine {
            program,
            env,
            stack: Stack::new(self.stack_limit),
            memory: Memory::new(self.memory_limit.unwrap_or(usize::MAX)),
            steps: 0,
        };
        let res = machine.run(self.step_limit);
        let steps = machine.steps;
        let halt = match res {
            Ok(halt) => halt,
            Err(err) => {
                debug!(%err, steps, "execution failed");
                return Err(err);
            }
        };
        let (output, reverted) = match halt {
            Halt::Stop => (Bytes::new(), false),
            Halt::Return(range) => (Bytes::copy_from_slice(machine.memory.slice(range)), false),
            Halt::Revert(range) => (Bytes::copy_from_slice(machine.memory.slice(range)), true),
        };
        debug!(steps, reverted, output_len = output.len(), "halted");
        Ok(ExecutionResult {
            stack: machine.stack.into_vec(),
            memory: machine.memory.into_vec(),
            output,
            reverted,
            steps,
        })
    }
}

/// Executes the program with the default [`Interpreter`] configuration.
pub fn exec(
    program: &Program,
    calldata: &[u8],
    callvalue: U256,
) -> Result<ExecutionResult, ExecError> {
    Interpreter::new().exec(program, &Env::new(calldata, callvalue))
}

#[derive(Debug)]
enum Halt {
    Stop,
    Return(Range<usize>),
    Revert(Range<usize>),
}

enum Flow {
    Next,
    Jump(Inst),
    Halt(Halt),
}

struct Machine<'a> {
    program: &'a Program,
    env: &'a Env<'a>,
    stack: Stack,
    memory: Memory,
    steps: u64,
}

impl Machine<'_> {
    fn run(&mut self, step_limit: Option<u64>) -> Result<Halt, ExecError> {
        let program = self.program;
        let mut ic = 0;
        // Running past the last instruction is an implicit `STOP`.
        while let Some(inst) = program.insts().get(ic) {
            if step_limit.is_some_and(|limit| self.steps >= limit) {
                return Err(ExecError::StepLimitReached(self.steps));
            }
            trace!(ic, pc = program.pc(ic), %inst, stack_len = self.stack.len(), "step");
            self.steps += 1;
            match self.step(ic, inst)? {
                Flow::Next => ic += 1,
                Flow::Jump(target) => ic = target,
                Flow::Halt(halt) => return Ok(halt),
            }
        }
        Ok(Halt::Stop)
    }

    fn step(&mut self, ic: Inst, inst: &Instruction) -> Result<Flow, ExecError> {
        match inst {
            Instruction::Push(push) => self.stack.push(push.value())?,
            Instruction::JumpDest => {}
            Instruction::Op(op) => return self.op(ic, *op),
        }
        Ok(Flow::Next)
    }

    fn op(&mut self, ic: Inst, op: Opcode) -> Result<Flow, ExecError> {
        macro_rules! unop {
            (|$a:ident| $e:expr) => {{
                let $a = self.stack.pop()?;
                self.stack.push($e)?;
            }};
        }
        macro_rules! binop {
            (|$a:ident, $b:ident| $e:expr) => {{
                let [$a, $b] = self.stack.popn()?;
                self.stack.push($e)?;
            }};
        }

        match op {
            Opcode::Stop => return Ok(Flow::Halt(Halt::Stop)),

            Opcode::Add => binop!(|a, b| a.wrapping_add(b)),
            Opcode::Mul => binop!(|a, b| a.wrapping_mul(b)),
            Opcode::Sub => binop!(|a, b| a.wrapping_sub(b)),
            Opcode::Div => binop!(|a, b| a.checked_div(b).unwrap_or_default()),
            Opcode::SDiv => binop!(|a, b| word::i256_div(a, b)),
            Opcode::Mod => binop!(|a, b| a.checked_rem(b).unwrap_or_default()),
            Opcode::SMod => binop!(|a, b| word::i256_mod(a, b)),
            Opcode::AddMod => {
                let [a, b, n] = self.stack.popn()?;
                self.stack.push(a.add_mod(b, n))?;
            }
            Opcode::MulMod => {
                let [a, b, n] = self.stack.popn()?;
                self.stack.push(a.mul_mod(b, n))?;
            }
            Opcode::Exp => binop!(|base, exponent| base.wrapping_pow(exponent)),
            Opcode::SignExtend => binop!(|k, x| word::signextend(k, x)),

            Opcode::Lt => binop!(|a, b| U256::from(a < b)),
            Opcode::Gt => binop!(|a, b| U256::from(a > b)),
            Opcode::SLt => binop!(|a, b| U256::from(word::i256_cmp(&a, &b) == Ordering::Less)),
            Opcode::SGt => binop!(|a, b| U256::from(word::i256_cmp(&a, &b) == Ordering::Greater)),
            Opcode::Eq => binop!(|a, b| U256::from(a == b)),
            Opcode::IsZero => unop!(|a| U256::from(a.is_zero())),
            Opcode::And => binop!(|a, b| a & b),
            Opcode::Or => binop!(|a, b| a | b),
            Opcode::Xor => binop!(|a, b| a ^ b),
            Opcode::Not => unop!(|a| !a),
            Opcode::Byte => binop!(|i, x| word::byte(i, x)),
            Opcode::Shl => binop!(|shift, x| word::shl(shift, x)),
            Opcode::Shr => binop!(|shift, x| word::shr(shift, x)),
            Opcode::Sar => binop!(|shift, x| word::sar(shift, x)),

            Opcode::Keccak256 => {
                let [offset, len] = self.stack.popn()?;
                let range = self.memory.range(offset, len)?;
                let hash = keccak256(self.memory.slice(range));
                self.stack.push(U256::from_be_bytes(hash.0))?;
            }

            Opcode::CallValue => self.stack.push(self.env.callvalue)?,
            Opcode::CallDataLoad => {
                unop!(|offset| word::read_padded(self.env.calldata, as_usize_saturated(offset)))
            }
            Opcode::CallDataSize => self.stack.push(U256::from(self.env.calldata.len()))?,
            Opcode::CallDataCopy => {
                let calldata = self.env.calldata;
                self.copy_padded(calldata)?
            }
            Opcode::CodeSize => self.stack.push(U256::from(self.program.code().len()))?,
            Opcode::CodeCopy => {
                let program = self.program;
                self.copy_padded(program.code())?
            }

            Opcode::Pop => {
                self.stack.pop()?;
            }
            Opcode::MLoad => {
                let offset = self.stack.pop()?;
                let value = self.memory.load(offset)?;
                self.stack.push(value)?;
            }
            Opcode::MStore => {
                let [offset, value] = self.stack.popn()?;
                self.memory.store(offset, value)?;
            }
            Opcode::MStore8 => {
                let [offset, value] = self.stack.popn()?;
                self.memory.store8(offset, value)?;
            }
            Opcode::MSize => self.stack.push(U256::from(self.memory.len()))?,
            Opcode::MCopy => {
                let [dst, src, len] = self.stack.popn()?;
                let src = self.memory.range(src, len)?;
                let dst = self.memory.range(dst, len)?;
                self.memory.copy_within(src, dst.start);
            }

            Opcode::Jump => {
                let target = self.stack.pop()?;
                return self.jump(target).map(Flow::Jump);
            }
            Opcode::JumpI => {
                let [target, cond] = self.stack.popn()?;
                if !cond.is_zero() {
                    return self.jump(target).map(Flow::Jump);
                }
            }
            Opcode::Pc => self.stack.push(U256::from(self.program.pc(ic)))?,
            Opcode::JumpDest => {}

            // `Program::new` stores these as `Instruction::Push`.
            Opcode::Push(_) => self.stack.push(U256::ZERO)?,
            Opcode::Dup(n) => self.stack.dup(n)?,
            Opcode::Swap(n) => self.stack.swap(n)?,

            Opcode::Return => {
                let [offset, len] = self.stack.popn()?;
                return Ok(Flow::Halt(Halt::Return(self.memory.range(offset, len)?)));
            }
            Opcode::Revert => {
                let [offset, len] = self.stack.popn()?;
                return Ok(Flow::Halt(Halt::Revert(self.memory.range(offset, len)?)));
            }

            Opcode::Address
            | Opcode::Balance
            | Opcode::Origin
            | Opcode::Caller
            | Opcode::GasPrice
            | Opcode::ExtCodeSize
            | Opcode::ExtCodeCopy
            | Opcode::ReturnDataSize
            | Opcode::ReturnDataCopy
            | Opcode::ExtCodeHash
            | Opcode::BlockHash
            | Opcode::Coinbase
            | Opcode::Timestamp
            | Opcode::Number
            | Opcode::PrevRandao
            | Opcode::GasLimit
            | Opcode::ChainId
            | Opcode::SelfBalance
            | Opcode::BaseFee
            | Opcode::BlobHash
            | Opcode::BlobBaseFee
            | Opcode::SLoad
            | Opcode::SStore
            | Opcode::Gas
            | Opcode::TLoad
            | Opcode::TStore
            | Opcode::Log(_)
            | Opcode::Create
            | Opcode::Call
            | Opcode::CallCode
            | Opcode::DelegateCall
            | Opcode::Create2
            | Opcode::StaticCall
            | Opcode::SelfDestruct => return Err(ExecError::Impure(op)),

            Opcode::Invalid | Opcode::Unknown(_) => return Err(ExecError::InvalidOperation(op)),
        }
        Ok(Flow::Next)
    }

    fn jump(&self, target: U256) -> Result<Inst, ExecError> {
        word::as_usize(target)
            .filter(|&pc| self.program.jump_table().contains(pc))
            .and_then(|pc| self.program.inst_at_pc(pc))
            .ok_or(ExecError::InvalidJumpDest(target))
    }

    /// `CALLDATACOPY` and `CODECOPY`.
    fn copy_padded(&mut self, src: &[u8]) -> Result<(), ExecError> {
        let [mem_offset, src_offset, len] = self.stack.popn()?;
        let range = self.memory.range(mem_offset, len)?;
        self.memory.copy_padded(range, src, as_usize_saturated(src_offset));
        Ok(())
    }
}

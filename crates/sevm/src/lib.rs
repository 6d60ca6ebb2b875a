#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), warn(unused_extern_crates))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[macro_use]
extern crate tracing;

mod asm;
pub use asm::{build, compile, Assembler, Label, Node};

mod bytecode;
pub use bytecode::*;

mod error;
pub use error::{AsmError, Error, ExecError, Result};

mod interpreter;
pub use interpreter::{exec, Env, ExecutionResult, Interpreter};

pub mod word;

#[cfg(test)]
mod tests;

#[doc(no_inline)]
pub use alloy_primitives::{self, Bytes, U256};

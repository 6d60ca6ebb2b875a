#![allow(missing_docs)]

use eyre::{bail, eyre, Result, WrapErr};
use sevm::{alloy_primitives::hex, Assembler, Label, Node, Opcode, Push, U256};
use std::{cmp::Ordering, path::Path};

/// Reads code from a hex string, a `.hex`, `.bin` or `.evm` file, or an inline mnemonic listing.
pub fn read_code(code: &str, asm: &Assembler) -> Result<Vec<u8>> {
    let path = Path::new(code);
    if path.is_file() {
        let contents =
            std::fs::read(path).wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let ext = path.extension().and_then(|s| s.to_str());
        tracing::debug!(path = %path.display(), ext, len = contents.len(), "reading code file");
        return read_code_string(&contents, ext, asm);
    }
    read_code_string(code.trim().as_bytes(), None, asm)
}

pub fn read_code_string(contents: &[u8], ext: Option<&str>, asm: &Assembler) -> Result<Vec<u8>> {
    let has_prefix = contents.starts_with(b"0x") || contents.starts_with(b"0X");
    let is_hex = ext != Some("bin") && (ext == Some("hex") || has_prefix);
    let utf8 =
        || std::str::from_utf8(contents).wrap_err("given code is not valid UTF-8").map(str::trim);
    if is_hex {
        let input = utf8()?;
        let mut lines = input.lines().map(str::trim);
        let first_line = lines.next().unwrap_or_default();
        hex::decode(first_line).wrap_err("given code is not valid hex")
    } else if ext == Some("bin") || !contents.is_ascii() {
        Ok(contents.to_vec())
    } else if ext == Some("evm") {
        assemble(utf8()?, asm)
    } else {
        let s = utf8()?;
        assemble(s, asm).or_else(|_| hex::decode(s).wrap_err("given code is not valid hex"))
    }
}

/// Parses and assembles a mnemonic listing.
pub fn assemble(s: &str, asm: &Assembler) -> Result<Vec<u8>> {
    let nodes = parse_asm_dsl(s)?;
    Ok(asm.build(&nodes)?)
}

/// Parses a mnemonic listing.
///
/// Words are separated by whitespace and `;` starts a comment that runs to the end of the line.
/// `PUSH <n>` pushes `n` with the minimal width, `PUSHk <n>` with exactly `k` bytes. `@name:`
/// defines a label and `PUSH @name` pushes its offset.
pub fn parse_asm_dsl(s: &str) -> Result<Vec<Node>> {
    const COM: char = ';';

    let mut nodes = Vec::with_capacity(32);

    let lines = s.lines().map(str::trim).filter(|s| !s.is_empty());
    let words = lines.flat_map(|s| s.split_whitespace().take_while(|s| !s.starts_with(COM)));
    let mut words = words.peekable();
    while let Some(word) = words.next() {
        if let Some(label) = word.strip_prefix('@') {
            let Some(name) = label.strip_suffix(':') else {
                bail!("label reference {word:?} must follow PUSH");
            };
            nodes.push(Node::Label(parse_label(name)?));
        } else if word.eq_ignore_ascii_case("PUSH") {
            let next = words.next().ok_or_else(|| eyre!("missing immediate for opcode PUSH"))?;
            if let Some(name) = next.strip_prefix('@') {
                nodes.push(Node::JumpPtr(parse_label(name)?));
            } else {
                nodes.push(Node::push(parse_imm(next)?));
            }
        } else {
            let op = Opcode::parse(word).ok_or_else(|| eyre!("invalid opcode: {word:?}"))?;
            let imm_len = op.imm_len();
            if imm_len > 0 {
                let imm = words.next().ok_or_else(|| eyre!("missing immediate for opcode {op}"))?;
                nodes.push(Node::Push(parse_sized_imm(imm, imm_len as u8)?));
            } else {
                if let Some(next) = words.peek() {
                    if next.parse::<U256>().is_ok() {
                        bail!("unexpected immediate for opcode {op}");
                    }
                }
                nodes.push(op.into());
            }
        }
    }

    Ok(nodes)
}

fn parse_label(name: &str) -> Result<Label> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("invalid label name: {name:?}");
    }
    Ok(Label::named(name))
}

fn parse_imm(s: &str) -> Result<U256> {
    s.parse().wrap_err_with(|| format!("failed to parse immediate {s:?}"))
}

fn parse_sized_imm(s: &str, size: u8) -> Result<Push> {
    let num = parse_imm(s)?;
    match num.byte_len().cmp(&(size as usize)) {
        Ordering::Less | Ordering::Equal => {}
        Ordering::Greater => {
            bail!("expected at most {size} immediate bytes, got {}", num.byte_len())
        }
    }
    Push::with_width(num, size).ok_or_else(|| eyre!("invalid push width {size}"))
}

use crate::{word::as_usize, ExecError};
use alloy_primitives::U256;
use std::ops::Range;

/// Byte-addressable memory, growing in 32-byte words.
#[derive(Debug)]
pub(crate) struct Memory {
    data: Vec<u8>,
    limit: usize,
}

impl Memory {
    pub(crate) fn new(limit: usize) -> Self {
        Self { data: Vec::new(), limit }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `offset..offset + len`, expanding memory to cover it.
    ///
    /// A zero `len` returns an empty range and never expands memory, whatever the offset.
    pub(crate) fn range(&mut self, offset: U256, len: U256) -> Result<Range<usize>, ExecError> {
        if len.is_zero() {
            return Ok(0..0);
        }
        let (Some(offset), Some(len)) = (as_usize(offset), as_usize(len)) else {
            return Err(ExecError::MemoryLimitExceeded);
        };
        let end = offset.checked_add(len).ok_or(ExecError::MemoryLimitExceeded)?;
        self.expand(end)?;
        Ok(offset..end)
    }

    fn expand(&mut self, end: usize) -> Result<(), ExecError> {
        if end <= self.data.len() {
            return Ok(());
        }
        let new_len = end
            .checked_next_multiple_of(32)
            .filter(|&len| len <= self.limit)
            .ok_or(ExecError::MemoryLimitExceeded)?;
        self.data
            .try_reserve_exact(new_len - self.data.len())
            .map_err(|_| ExecError::MemoryLimitExceeded)?;
        self.data.resize(new_len, 0);
        trace!(len = new_len, "expanded memory");
        Ok(())
    }

    #[inline]
    pub(crate) fn slice(&self, range: Range<usize>) -> &[u8] {
        &self.data[range]
    }

    pub(crate) fn load(&mut self, offset: U256) -> Result<U256, ExecError> {
        let range = self.range(offset, U256::from(32))?;
        Ok(U256::from_be_slice(&self.data[range]))
    }

    pub(crate) fn store(&mut self, offset: U256, value: U256) -> Result<(), ExecError> {
        let range = self.range(offset, U256::from(32))?;
        self.data[range].copy_from_slice(&value.to_be_bytes::<32>());
        Ok(())
    }

    pub(crate) fn store8(&mut self, offset: U256, value: U256) -> Result<(), ExecError> {
        let range = self.range(offset, U256::from(1))?;
        self.data[range.start] = value.byte(0);
        Ok(())
    }

    /// Copies `src[src_offset..]` into `range`, filling the rest with zeros.
    pub(crate) fn copy_padded(&mut self, range: Range<usize>, src: &[u8], src_offset: usize) {
        let dst = &mut self.data[range];
        let n = src.len().saturating_sub(src_offset).min(dst.len());
        if n > 0 {
            dst[..n].copy_from_slice(&src[src_offset..src_offset + n]);
        }
        dst[n..].fill(0);
    }

    #[inline]
    pub(crate) fn copy_within(&mut self, src: Range<usize>, dst: usize) {
        self.data.copy_within(src, dst);
    }

    pub(crate) fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

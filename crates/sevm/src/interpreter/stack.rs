use crate::ExecError;
use alloy_primitives::U256;

/// The operand stack. The last element is the top of the stack.
#[derive(Debug, Default)]
pub(crate) struct Stack {
    data: Vec<U256>,
    limit: Option<usize>,
}

impl Stack {
    pub(crate) fn new(limit: Option<usize>) -> Self {
        Self { data: Vec::with_capacity(limit.unwrap_or(16).min(1024)), limit }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub(crate) fn push(&mut self, value: U256) -> Result<(), ExecError> {
        if let Some(limit) = self.limit {
            if self.data.len() >= limit {
                return Err(ExecError::StackOverflow { limit });
            }
        }
        self.data.push(value);
        Ok(())
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Result<U256, ExecError> {
        self.data.pop().ok_or(ExecError::StackUnderflow)
    }

    /// Pops `N` values. The first element of the returned array is the former top of the stack.
    #[inline]
    pub(crate) fn popn<const N: usize>(&mut self) -> Result<[U256; N], ExecError> {
        if self.data.len() < N {
            return Err(ExecError::StackUnderflow);
        }
        let mut values = [U256::ZERO; N];
        for value in &mut values {
            *value = self.data.pop().unwrap_or_default();
        }
        Ok(values)
    }

    /// Duplicates the `n`th value from the top, 1-based.
    pub(crate) fn dup(&mut self, n: u8) -> Result<(), ExecError> {
        let n = n as usize;
        if n == 0 || self.data.len() < n {
            return Err(ExecError::StackUnderflow);
        }
        self.push(self.data[self.data.len() - n])
    }

    /// Swaps the top of the stack with the `n + 1`th value from the top.
    pub(crate) fn swap(&mut self, n: u8) -> Result<(), ExecError> {
        let n = n as usize;
        let len = self.data.len();
        if n == 0 || len <= n {
            return Err(ExecError::StackUnderflow);
        }
        self.data.swap(len - 1, len - 1 - n);
        Ok(())
    }

    pub(crate) fn into_vec(self) -> Vec<U256> {
        self.data
    }
}

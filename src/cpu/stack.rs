// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The call stack: return addresses only, sixteen deep

use super::Adr;

/// Maximum number of nested calls
pub const STACK_DEPTH: usize = 16;

/// Bounded stack of return addresses
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stack {
    frames: Vec<Adr>,
}

impl Stack {
    /// Pushes a return address. Returns false, and pushes nothing, when full.
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let mut stack = Stack::default();
    /// for addr in 0..16 {
    ///     assert!(stack.push(addr));
    /// }
    /// assert!(!stack.push(0x200));
    /// assert_eq!(16, stack.len());
    /// ```
    #[must_use]
    pub fn push(&mut self, addr: Adr) -> bool {
        if self.is_full() {
            return false;
        }
        self.frames.push(addr);
        true
    }

    /// Pops the most recent return address
    pub fn pop(&mut self) -> Option<Adr> {
        self.frames.pop()
    }

    /// Number of frames in use
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if there are no frames
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns true if another push would overflow
    pub fn is_full(&self) -> bool {
        self.frames.len() >= STACK_DEPTH
    }

    /// Drops every frame
    pub fn clear(&mut self) {
        self.frames.clear()
    }

    /// The frames, oldest first
    pub fn as_slice(&self) -> &[Adr] {
        &self.frames
    }
}

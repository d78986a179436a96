// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The hexadecimal keypad, and the state kept by `Fx0A` while it waits on it
//!
//! The host owns the key latch and writes to it from key events. The CPU only
//! ever reads it, through the [Keypad] trait.

use crate::error::{Error, Result};

/// Number of keys on the keypad
pub const KEY_COUNT: usize = 16;

/// Read-only view of the keypad, as seen by the CPU
pub trait Keypad {
    /// Returns true if `key` (`0..=0xF`) is held down. Out-of-range keys are never held.
    fn is_pressed(&self, key: usize) -> bool;

    /// Copies the state of every key
    fn snapshot(&self) -> [bool; KEY_COUNT] {
        std::array::from_fn(|key| self.is_pressed(key))
    }
}

impl Keypad for [bool; KEY_COUNT] {
    fn is_pressed(&self, key: usize) -> bool {
        self.get(key).copied().unwrap_or_default()
    }
}

/// The key latch: current pressed/released state of each of the sixteen keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keys {
    keys: [bool; KEY_COUNT],
}

impl Keys {
    /// Sets the state of a key, and reports whether the key's state changed.  
    /// If key does not exist, returns [Error::InvalidKey].
    ///
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let mut keys = Keys::default();
    /// // press key `7`
    /// assert!(keys.set_key(0x7, true).unwrap());
    /// // press key `7` again, even though it's already pressed
    /// assert!(!keys.set_key(0x7, true).unwrap());
    /// assert!(keys.is_pressed(0x7));
    /// // there is no key `16`
    /// assert!(keys.set_key(0x10, true).is_err());
    /// ```
    pub fn set_key(&mut self, key: usize, pressed: bool) -> Result<bool> {
        let keyref = self.keys.get_mut(key).ok_or(Error::InvalidKey { key })?;
        let changed = *keyref != pressed;
        *keyref = pressed;
        Ok(changed)
    }

    /// Presses a key, and reports whether the key's state changed.
    pub fn press(&mut self, key: usize) -> Result<bool> {
        self.set_key(key, true)
    }

    /// Releases a key, and reports whether the key's state changed.
    pub fn release(&mut self, key: usize) -> Result<bool> {
        self.set_key(key, false)
    }

    /// Releases every key
    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }
}

impl Keypad for Keys {
    fn is_pressed(&self, key: usize) -> bool {
        self.keys.is_pressed(key)
    }
}

/// Progress of a blocking key read (`Fx0A`)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyWait {
    /// No key read in progress
    #[default]
    Idle,
    /// Waiting for any key to change from its state when the wait began
    AwaitingPress,
    /// Saw `key` change; waiting for it to be let go
    AwaitingRelease {
        /// The key that changed
        key: usize,
    },
}

impl KeyWait {
    /// True while `Fx0A` is holding the program counter
    pub fn is_waiting(&self) -> bool {
        !matches!(self, KeyWait::Idle)
    }
}

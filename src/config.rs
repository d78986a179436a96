// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Host-side configuration: execution rate, timer rate, and screen geometry

use crate::cpu::quirks::Quirks;

/// Settings the host uses to drive a [Chip8](crate::Chip8).
///
/// None of this is persisted; the host builds one at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Instructions executed per second
    pub instructions_per_second: usize,
    /// Timer decrements per second. Always 60 on real hardware.
    pub timer_hz: usize,
    /// Width of the display buffer, in pixels
    pub width: usize,
    /// Height of the display buffer, in pixels
    pub height: usize,
    /// Compatibility switches for the CPU
    pub quirks: Quirks,
}

impl Config {
    /// Number of instructions to run between two timer ticks
    ///
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// assert_eq!(11, Config::default().instructions_per_frame());
    /// let slow = Config { instructions_per_second: 10, ..Default::default() };
    /// assert_eq!(1, slow.instructions_per_frame());
    /// ```
    pub fn instructions_per_frame(&self) -> usize {
        let hz = self.timer_hz.max(1);
        ((self.instructions_per_second + hz / 2) / hz).max(1)
    }
}

impl Default for Config {
    /// | value                     | default |
    /// |---------------------------|---------|
    /// | `instructions_per_second` | 660     |
    /// | `timer_hz`                | 60      |
    /// | `width`                   | 64      |
    /// | `height`                  | 32      |
    fn default() -> Self {
        Config {
            instructions_per_second: 660,
            timer_hz: 60,
            width: 64,
            height: 32,
            quirks: Quirks::default(),
        }
    }
}

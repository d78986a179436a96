// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The delay and sound timers
//!
//! Instructions only ever load or read these. Counting down is the host's job,
//! through [Timers::tick], at 60Hz.

/// The delay/sound timer pair
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timers {
    delay: u8,
    sound: u8,
}

impl Timers {
    /// Decrements both timers by one, stopping at zero
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let mut timers = Timers::default();
    /// timers.set_delay(1);
    /// timers.set_sound(2);
    /// timers.tick();
    /// timers.tick();
    /// assert_eq!((0, 0), (timers.delay(), timers.sound()));
    /// timers.tick();
    /// assert_eq!((0, 0), (timers.delay(), timers.sound()));
    /// ```
    pub fn tick(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// Value of the delay timer
    pub fn delay(&self) -> u8 {
        self.delay
    }

    /// Value of the sound timer
    pub fn sound(&self) -> u8 {
        self.sound
    }

    /// Loads the delay timer
    pub fn set_delay(&mut self, value: u8) {
        self.delay = value;
    }

    /// Loads the sound timer
    pub fn set_sound(&mut self, value: u8) {
        self.sound = value;
    }

    /// True while the buzzer should sound
    pub fn sound_active(&self) -> bool {
        self.sound > 0
    }
}

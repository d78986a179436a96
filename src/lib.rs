// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE.txt for details)

//! This crate implements the Chip-8 virtual machine as if it were a real CPU
//! architecture: 4 KiB of memory, sixteen byte registers, a sixteen-deep call
//! stack, two 60Hz timers, and a 64x32 XOR-composited display.
//!
//! The core never touches a window, a speaker, or a clock. A host drives it:
//! it calls [Chip8::cycle] at the instruction rate, [Chip8::tick_timers] at
//! 60Hz, forwards key events to [Chip8::set_key], and draws [Chip8::screen].
//!
//! ```rust
//! # use vip8::*;
//! # fn main() -> Result<()> {
//! let mut ch8 = Chip8::default();
//! ch8.load(&[
//!     0x60, 0x05, // mov #05, v0
//!     0x70, 0x02, // add #02, v0
//! ])?;
//! ch8.cycle()?.cycle()?;
//! assert_eq!(7, ch8.cpu.v()[0]);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod cpu;
pub mod error;

/// A [CPU], the key latch the host writes into, and the host's [Config]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Chip8 {
    /// The execution engine and everything it owns
    pub cpu: CPU,
    /// The key latch, written by the host and read by the CPU
    pub keys: Keys,
    /// Rates and geometry the host runs at
    pub config: Config,
}

impl Chip8 {
    /// Builds a machine with the screen size and quirks from `config`
    pub fn new(config: Config) -> Self {
        Chip8 {
            cpu: CPU::new(&config),
            keys: Keys::default(),
            config,
        }
    }

    /// Resets the machine and loads `rom` at 0x200
    ///
    /// Unlike [CPU::load], which only copies bytes, this clears registers, stack,
    /// timers, screen, keys and program memory first.
    ///
    /// Fails with [error::Error::ProgramTooLarge] before anything runs if `rom`
    /// doesn't fit in memory.
    pub fn load(&mut self, rom: &[u8]) -> Result<&mut Self> {
        self.load_at(rom, PROGRAM_ADDR)
    }

    /// Resets the machine and loads `rom` at `addr`, where execution starts
    pub fn load_at(&mut self, rom: &[u8], addr: Adr) -> Result<&mut Self> {
        self.cpu.load_program_at(rom, addr)?;
        self.keys.release_all();
        Ok(self)
    }

    /// Executes one instruction
    pub fn cycle(&mut self) -> Result<&mut Self> {
        self.cpu.cycle(&self.keys)?;
        Ok(self)
    }

    /// Decrements the delay and sound timers
    pub fn tick_timers(&mut self) -> &mut Self {
        self.cpu.tick_timers();
        self
    }

    /// Runs one 60Hz frame: [Config::instructions_per_frame] cycles, then a timer tick
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// # fn main() -> Result<()> {
    /// let mut ch8 = Chip8::default();
    /// ch8.load(&[
    ///     0x60, 0x02, // mov #02, v0
    ///     0xf0, 0x15, // mov v0, DT
    ///     0x12, 0x04, // jmp 204
    /// ])?;
    /// ch8.frame()?;
    /// assert_eq!(1, ch8.cpu.delay());
    /// assert_eq!(11, ch8.cpu.cycle_count());
    /// # Ok(())
    /// # }
    /// ```
    pub fn frame(&mut self) -> Result<&mut Self> {
        self.cpu
            .multistep(&self.keys, self.config.instructions_per_frame())?;
        self.cpu.tick_timers();
        Ok(self)
    }

    /// Records a key going down (`pressed`) or up. Returns whether anything changed.
    ///
    /// Keys outside `0..=0xF` are rejected with [error::Error::InvalidKey].
    pub fn set_key(&mut self, key: usize, pressed: bool) -> Result<bool> {
        self.keys.set_key(key, pressed)
    }

    /// True while the host should be playing a tone
    pub fn sound_timer_active(&self) -> bool {
        self.cpu.sound_timer_active()
    }

    /// The display buffer
    pub fn screen(&self) -> &Screen {
        self.cpu.screen()
    }

    /// Returns true if the screen changed since the last call
    pub fn take_draw(&mut self) -> bool {
        std::mem::take(&mut self.cpu.flags.draw)
    }

    /// True if `key` is held, as far as the CPU can tell
    pub fn is_pressed(&self, key: usize) -> bool {
        self.keys.is_pressed(key)
    }
}

/// Common imports for vip8
pub mod prelude {
    pub use super::{config::Config, Chip8};
    pub use crate::cpu::{
        flags::Flags,
        instruction::{
            disassembler::{Dis, Disassembler},
            Insn,
        },
        keys::{KeyWait, Keypad, Keys, KEY_COUNT},
        mem::{Mem, Region, Region::*, FONT, MEM_SIZE, PROGRAM_ADDR},
        mode::Mode,
        quirks::Quirks,
        screen::Screen,
        stack::{Stack, STACK_DEPTH},
        timers::Timers,
        Adr, CPU,
    };
    pub use crate::error::{Error, Result};
}

pub use prelude::*;

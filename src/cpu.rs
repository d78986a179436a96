// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Decodes and runs instructions

#[cfg(test)]
mod tests;

pub mod behavior;
pub mod flags;
pub mod instruction;
pub mod keys;
pub mod mem;
pub mod mode;
pub mod quirks;
pub mod screen;
pub mod stack;
pub mod timers;

use self::{
    flags::Flags,
    instruction::{
        disassembler::{Dis, Disassembler},
        Insn,
    },
    keys::{KeyWait, Keypad, KEY_COUNT},
    mem::{Mem, Region, PROGRAM_ADDR},
    quirks::Quirks,
    screen::Screen,
    stack::Stack,
    timers::Timers,
};
use crate::{
    config::Config,
    error::{Error, Result},
};
use owo_colors::OwoColorize;
use std::fmt::Debug;

type Reg = usize;
/// A 12-bit Chip-8 address, stored in 16 bits
pub type Adr = u16;
type Nib = u8;

/// Represents the internal state of the CPU interpreter
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CPU {
    /// Flags that control how the CPU behaves, but which aren't inherent to the
    /// chip-8. Includes [Quirks], debug mode, etc.
    pub flags: Flags,
    // memory
    mem: Mem,
    screen: Screen,
    stack: Stack,
    // registers
    pc: Adr,
    i: Adr,
    v: [u8; 16],
    timers: Timers,
    // I/O
    keywait: KeyWait,
    key_cache: [bool; KEY_COUNT],
    // Execution data
    cycle: usize,
    halted: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    disassembler: Dis,
}

// public interface
impl CPU {
    /// Constructs a new CPU with the screen size and [Quirks] from `config`
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let config = Config { width: 128, height: 64, ..Default::default() };
    /// let cpu = CPU::new(&config);
    /// assert_eq!(128, cpu.screen().width());
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn new(config: &Config) -> Self {
        CPU {
            screen: Screen::new(config.width, config.height),
            flags: Flags {
                quirks: config.quirks,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Copies `rom` into memory at `addr`, leaving everything else alone
    ///
    /// Registers, pc, stack, timers and screen keep their values, so this can
    /// patch a running program. To start a program from scratch, use
    /// [CPU::load_program] or [Chip8::load](crate::Chip8::load), which reset first.
    ///
    /// Returns [Error::ProgramTooLarge] if `rom` runs off the end of memory.
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let mut cpu = CPU::default();
    /// cpu.load(&[0x60, 0x05], 0x300).unwrap();
    /// assert_eq!(0x6005, cpu.mem().read_word(0x300u16));
    /// assert!(cpu.load(&[0; 0x1000], 0x200).is_err());
    /// ```
    pub fn load(&mut self, rom: &[u8], addr: Adr) -> Result<&mut Self> {
        self.mem.load(addr, rom)?;
        Ok(self)
    }

    /// Resets the CPU, clears program memory, and loads `rom` at 0x200
    pub fn load_program(&mut self, rom: &[u8]) -> Result<&mut Self> {
        self.load_program_at(rom, PROGRAM_ADDR)
    }

    /// Resets the CPU, clears everything past the font, and loads `rom` at `addr`
    ///
    /// Execution begins at `addr`.
    pub fn load_program_at(&mut self, rom: &[u8], addr: Adr) -> Result<&mut Self> {
        let mut mem = Mem::new();
        mem.load(addr, rom)?;
        self.reset();
        self.mem = mem;
        self.pc = addr;
        Ok(self)
    }

    /// Sets a general purpose register in the CPU.
    /// If the register doesn't exist, returns [Error::InvalidRegister]
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// // Create a new CPU, and set v4 to 0x41
    /// let mut cpu = CPU::default();
    /// cpu.set_v(0x4, 0x41).unwrap();
    /// assert_eq!(0x41, cpu.v()[4]);
    /// assert!(cpu.set_v(0x10, 0).is_err());
    /// ```
    pub fn set_v(&mut self, reg: Reg, value: u8) -> Result<()> {
        if let Some(gpr) = self.v.get_mut(reg) {
            *gpr = value;
            Ok(())
        } else {
            Err(Error::InvalidRegister { reg })
        }
    }

    /// Gets a slice of the entire general purpose registers
    pub fn v(&self) -> &[u8] {
        self.v.as_slice()
    }

    /// Gets the program counter
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn pc(&self) -> Adr {
        self.pc
    }

    /// Gets the I register
    pub fn i(&self) -> Adr {
        self.i
    }

    /// Gets the value in the Sound Timer register
    pub fn sound(&self) -> u8 {
        self.timers.sound()
    }

    /// Gets the value in the Delay Timer register
    pub fn delay(&self) -> u8 {
        self.timers.delay()
    }

    /// True while the sound timer is nonzero, and a tone should play
    pub fn sound_timer_active(&self) -> bool {
        self.timers.sound_active()
    }

    /// Decrements the delay and sound timers. The host calls this at 60Hz.
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let mut cpu = CPU::default();
    /// cpu.tick_timers(); // does not go below zero
    /// assert_eq!((0, 0), (cpu.delay(), cpu.sound()));
    /// ```
    pub fn tick_timers(&mut self) -> &mut Self {
        self.timers.tick();
        self
    }

    /// Gets the memory
    pub fn mem(&self) -> &Mem {
        &self.mem
    }

    /// Gets the display buffer, for a renderer to draw
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Gets the call stack
    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Gets the state of the blocking key read
    pub fn keywait(&self) -> KeyWait {
        self.keywait
    }

    /// Gets the number of cycles the CPU has executed
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0x0, cpu.cycle_count());
    /// ```
    pub fn cycle_count(&self) -> usize {
        self.cycle
    }

    /// True once a fatal error has stopped the CPU
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Resets the emulator.
    ///
    /// Touches the stack, pc, registers, timers, screen, key-wait state,
    /// cycle count, and the draw and halt flags.
    ///
    /// Does not touch [Quirks], memory, or the debug and pause flags.
    pub fn reset(&mut self) {
        self.flags.draw = false;
        self.stack.clear();
        self.pc = PROGRAM_ADDR;
        self.i = 0;
        self.v = [0; 16];
        self.timers = Timers::default();
        self.screen.clear();
        self.keywait = KeyWait::Idle;
        self.key_cache = [false; KEY_COUNT];
        self.cycle = 0;
        self.halted = false;
    }

    /// Executes a single instruction
    ///
    /// Fetches the word at `pc`, advances `pc` past it, then executes it.
    /// Unrecognized words do nothing.
    ///
    /// Returns [Error::StackOverflow] or [Error::StackUnderflow] if the
    /// instruction misuses the stack. Either one halts the CPU, and every later
    /// call returns [Error::Halted] until the CPU is reset.
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let mut cpu = CPU::default();
    /// let keys = Keys::default();
    /// cpu.load(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ], 0x200).unwrap();
    /// cpu.cycle(&keys)
    ///     .expect("0x00e0 (cls) should be a valid opcode.");
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(1, cpu.cycle_count());
    /// ```
    /// A `ret` with nothing to return to halts the CPU.
    /// ```rust
    /// # use vip8::*;
    /// let mut cpu = CPU::default();
    /// cpu.load(&[0x00, 0xee], 0x200).unwrap();
    /// assert!(matches!(cpu.cycle(&Keys::default()), Err(Error::StackUnderflow { addr: 0x200 })));
    /// assert!(matches!(cpu.cycle(&Keys::default()), Err(Error::Halted)));
    /// ```
    pub fn cycle(&mut self, keys: &impl Keypad) -> Result<&mut Self> {
        if self.halted {
            return Err(Error::Halted);
        }
        // Do nothing if paused
        if self.flags.pause {
            return Ok(self);
        }
        self.cycle += 1;
        // fetch opcode
        let opcode = self.mem.read_word(self.pc);

        // Print opcode disassembly:
        if self.flags.debug {
            std::println!(
                "{:3} {:03x}: {:<36}",
                self.cycle.bright_black(),
                self.pc,
                self.disassembler.once(opcode)
            );
        }

        // the key cache holds still for as long as Fx0A is waiting
        if !self.keywait.is_waiting() {
            self.key_cache = keys.snapshot();
        }

        self.pc = self.pc.wrapping_add(2);
        if let Err(e) = self.execute(Insn::from(opcode), keys) {
            log::error!("{e}");
            self.halted = true;
            return Err(e);
        }
        Ok(self)
    }

    /// Runs `steps` cycles, stopping at the first error
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let mut cpu = CPU::default();
    /// cpu.load(&[
    ///     0x00, 0xe0, // cls
    ///     0x12, 0x02, // jump 0x202 (pc)
    /// ], 0x200).unwrap();
    /// cpu.multistep(&Keys::default(), 0x20)
    ///     .expect("The program should not touch the stack.");
    /// assert_eq!(0x202, cpu.pc());
    /// assert_eq!(0x20, cpu.cycle_count());
    /// ```
    pub fn multistep(&mut self, keys: &impl Keypad, steps: usize) -> Result<&mut Self> {
        for _ in 0..steps {
            self.cycle(keys)?;
        }
        Ok(self)
    }

    /// Dumps the current state of all CPU registers, and the cycle count
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let mut cpu = CPU::default();
    /// cpu.dump();
    /// ```
    /// outputs
    /// ```text
    /// PC: 0200, SP: 0000, I: 0000
    /// v0: 00 v1: 00 v2: 00 v3: 00
    /// v4: 00 v5: 00 v6: 00 v7: 00
    /// v8: 00 v9: 00 vA: 00 vB: 00
    /// vC: 00 vD: 00 vE: 00 vF: 00
    /// DLY: 0, SND: 0, CYC:      0
    /// ```
    pub fn dump(&self) {
        std::println!(
            "PC: {:04x}, SP: {:04x}, I: {:04x}\n{}DLY: {}, SND: {}, CYC: {:6}",
            self.pc,
            self.stack.len(),
            self.i,
            self.v
                .into_iter()
                .enumerate()
                .map(|(i, gpr)| {
                    format!(
                        "v{i:X}: {gpr:02x} {}",
                        match i % 4 {
                            3 => "\n",
                            _ => "",
                        }
                    )
                })
                .collect::<String>(),
            self.timers.delay(),
            self.timers.sound(),
            self.cycle,
        );
    }
}

impl Debug for CPU {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CPU")
            .field("flags", &self.flags)
            .field("stack", &self.stack)
            .field("pc", &self.pc)
            .field("i", &self.i)
            .field("v", &self.v)
            .field("timers", &self.timers)
            .field("keywait", &self.keywait)
            .field("cycle", &self.cycle)
            .field("halted", &self.halted)
            .field("program", &self.mem.get_region(Region::Program).len())
            .finish_non_exhaustive()
    }
}

impl Default for CPU {
    /// Constructs a new CPU with sane defaults
    ///
    /// | value  | default | description
    /// |--------|---------|------------
    /// | font   |`0x0000` | Location of font memory.
    /// | pc     |`0x0200` | Start location.
    /// | screen | `64x32` | Size of the display buffer.
    ///
    /// # Examples
    /// ```rust
    /// use vip8::*;
    /// let mut cpu = CPU::default();
    /// ```
    fn default() -> Self {
        CPU {
            flags: Flags::default(),
            mem: Mem::new(),
            screen: Screen::default(),
            stack: Stack::default(),
            pc: PROGRAM_ADDR,
            i: 0,
            v: [0; 16],
            timers: Timers::default(),
            keywait: KeyWait::Idle,
            key_cache: [false; KEY_COUNT],
            cycle: 0,
            halted: false,
            disassembler: Dis::default(),
        }
    }
}

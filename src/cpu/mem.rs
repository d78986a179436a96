// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The Mem represents the CPU's memory
//!
//! Every access wraps around the 4 KiB address space, so `I` pointing near
//! the top of memory reads and writes through to the bottom.

use super::Adr;
use crate::error::{Error, Result};
use std::{
    fmt::{Display, Formatter},
    ops::Range,
};

/// Size of the address space, in bytes
pub const MEM_SIZE: usize = 0x1000;
/// Where the built-in font is placed
pub const FONT_ADDR: Adr = 0x000;
/// Where programs are loaded by default
pub const PROGRAM_ADDR: Adr = 0x200;
/// Bytes per font glyph
pub const GLYPH_LEN: Adr = 5;

/// The sixteen hexadecimal digit glyphs, 4x5 pixels each
#[rustfmt::skip]
pub const FONT: [u8; 80] = [
    0xf0, 0x90, 0x90, 0x90, 0xf0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xf0, 0x10, 0xf0, 0x80, 0xf0, // 2
    0xf0, 0x10, 0xf0, 0x10, 0xf0, // 3
    0x90, 0x90, 0xf0, 0x10, 0x10, // 4
    0xf0, 0x80, 0xf0, 0x10, 0xf0, // 5
    0xf0, 0x80, 0xf0, 0x90, 0xf0, // 6
    0xf0, 0x10, 0x20, 0x40, 0x40, // 7
    0xf0, 0x90, 0xf0, 0x90, 0xf0, // 8
    0xf0, 0x90, 0xf0, 0x10, 0xf0, // 9
    0xf0, 0x90, 0xf0, 0x90, 0x90, // A
    0xe0, 0x90, 0xe0, 0x90, 0xe0, // B
    0xf0, 0x80, 0x80, 0x80, 0xf0, // C
    0xe0, 0x90, 0x90, 0x90, 0xe0, // D
    0xf0, 0x80, 0xf0, 0x80, 0xf0, // E
    0xf0, 0x80, 0xf0, 0x80, 0x80, // F
];

/// Represents a named region in memory
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Region {
    /// Character ROM (but writable!)
    Charset,
    /// Unused interpreter space between the font and the program
    Reserved,
    /// Program memory
    Program,
}

impl Region {
    /// The address range covered by this region
    pub fn range(self) -> Range<usize> {
        match self {
            Region::Charset => FONT_ADDR as usize..FONT_ADDR as usize + FONT.len(),
            Region::Reserved => FONT_ADDR as usize + FONT.len()..PROGRAM_ADDR as usize,
            Region::Program => PROGRAM_ADDR as usize..MEM_SIZE,
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Region::Charset => "Charset",
                Region::Reserved => "Reserved",
                Region::Program => "Program",
            }
        )
    }
}

/// 4 KiB of byte-addressed memory, with the font preloaded
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mem {
    memory: Vec<u8>,
}

impl Mem {
    /// Constructs a new mem, with the font loaded into [Region::Charset]
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let mem = Mem::new();
    /// assert_eq!(0x1000, mem.len());
    /// assert_eq!(&FONT[..], mem.get_region(Charset));
    /// ```
    pub fn new() -> Self {
        let mut memory = vec![0; MEM_SIZE];
        memory[Region::Charset.range()].copy_from_slice(&FONT);
        Mem { memory }
    }

    /// Gets the length of the backing memory
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    /// Returns true if the backing memory contains no elements
    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Reads the byte at `addr`, wrapping around the address space
    #[inline(always)]
    pub fn read(&self, addr: impl Into<usize>) -> u8 {
        self.memory[addr.into() % MEM_SIZE]
    }

    /// Writes a byte to `addr`, wrapping around the address space
    #[inline(always)]
    pub fn write(&mut self, addr: impl Into<usize>, data: u8) {
        self.memory[addr.into() % MEM_SIZE] = data;
    }

    /// Reads a big-endian word at `addr`. Each byte wraps independently.
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let mut mem = Mem::new();
    /// mem.write(0xfffu16, 0x12);
    /// mem.write(0x000u16, 0x34);
    /// assert_eq!(0x1234, mem.read_word(0xfffu16));
    /// ```
    #[inline(always)]
    pub fn read_word(&self, addr: impl Into<usize>) -> u16 {
        let addr = addr.into();
        u16::from_be_bytes([self.read(addr), self.read(addr + 1)])
    }

    /// Copies `data` into memory starting at `addr`
    ///
    /// Returns [Error::ProgramTooLarge] without touching memory if `data`
    /// runs past the end of the address space.
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// # fn main() -> Result<()> {
    /// let mut mem = Mem::new();
    /// mem.load(0x200, b"Hello, world!")?;
    /// assert_eq!(b"Hello", &mem.get_region(Program)[..5]);
    /// assert!(mem.load(0xfff, b"no").is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(&mut self, addr: Adr, data: &[u8]) -> Result<&mut Self> {
        let start = addr as usize;
        let capacity = MEM_SIZE.saturating_sub(start);
        if start > MEM_SIZE || data.len() > capacity {
            return Err(Error::ProgramTooLarge {
                len: data.len(),
                addr,
                capacity,
            });
        }
        self.memory[start..start + data.len()].copy_from_slice(data);
        Ok(self)
    }

    /// Fills a [Region] with zeroes
    pub fn clear_region(&mut self, name: Region) -> &mut Self {
        self.memory[name.range()].fill(0);
        self
    }

    /// Gets a slice of a named [Region] of memory
    pub fn get_region(&self, name: Region) -> &[u8] {
        &self.memory[name.range()]
    }

    /// Gets the whole address space as a slice
    pub fn as_slice(&self) -> &[u8] {
        &self.memory
    }
}

impl Default for Mem {
    fn default() -> Self {
        Self::new()
    }
}

// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! A disassembler for Chip-8 opcodes
use super::Insn;
use owo_colors::{OwoColorize, Style};

/// Disassembles Chip-8 instructions
pub trait Disassembler {
    /// Disassemble a single instruction
    fn once(&self, insn: u16) -> String;
}

/// Disassembles Chip-8 instructions, printing them in the provided [owo_colors::Style]s
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dis {
    /// Styles invalid instructions
    pub invalid: Style,
    /// Styles valid instruction
    pub normal: Style,
}

impl Dis {
    /// A disassembler that emits plain, unstyled text
    pub fn plain() -> Self {
        Self {
            invalid: Style::new(),
            normal: Style::new(),
        }
    }
}

impl Default for Dis {
    fn default() -> Self {
        Self {
            invalid: Style::new().bold().red(),
            normal: Style::new().green(),
        }
    }
}

impl Disassembler for Dis {
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let dis = Dis::plain();
    /// assert!(dis.once(0x12a4).contains("jmp    2a4"));
    /// assert!(dis.once(0xffff).contains("inval  ffff"));
    /// ```
    fn once(&self, insn: u16) -> String {
        let insn = Insn::from(insn);
        let style = if insn.is_valid() {
            self.normal
        } else {
            self.invalid
        };
        format!("{}", insn.style(style))
    }
}

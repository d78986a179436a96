// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Named presets for the [Quirks] of the [super::CPU]

use super::quirks::Quirks;
use crate::error::Error;
use std::str::FromStr;

/// Selects which historical interpreter to imitate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Reference behavior
    #[default]
    Chip8,
    /// Original Cosmac VIP: shifts read vY
    Vip,
    /// Chip-48/Super-Chip: no vF reset, no I increment, vX-indexed jumps
    SChip,
}

impl From<Mode> for Quirks {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Chip8 => Quirks::default(),
            Mode::Vip => Quirks {
                shift_vy: true,
                ..Default::default()
            },
            Mode::SChip => Quirks {
                bin_ops: true,
                shift_vy: false,
                dma_inc: true,
                jump_vx: true,
            },
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chip8" | "chip-8" => Ok(Mode::Chip8),
            "vip" | "cosmac" => Ok(Mode::Vip),
            "schip" | "superchip" | "chip48" | "chip-48" => Ok(Mode::SChip),
            _ => Err(Error::InvalidMode {
                mode: s.to_string(),
            }),
        }
    }
}

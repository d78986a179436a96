// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Controls the [Quirks] behavior of the CPU on a granular level.

/// Controls the quirk behavior of the CPU on a granular level.
///
/// `false` everywhere is the reference behavior: bitwise ops clear vF, shifts
/// operate on vX, `Fx55`/`Fx65` advance I, and `Bnnn` indexes by v0.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quirks {
    /// Super Chip: Binary ops in `8xy`(`1`, `2`, `3`) shouldn't set vF to 0
    pub bin_ops: bool,
    /// Cosmac VIP: Shift ops in `8xy`(`6`, `E`) take their input from vY
    pub shift_vy: bool,
    /// Super Chip: DMA instructions `Fx55`/`Fx65` shouldn't change I to I + x + 1
    pub dma_inc: bool,
    /// Super Chip: Indexed jump instructions go to `adr` + v`a`, where `a` is the high nibble of `adr`.
    pub jump_vx: bool,
}

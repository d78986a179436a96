// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Stores the Chip-8's display buffer
//!
//! The buffer is a row-major grid of single-bit pixels. Sprites are
//! XOR-composited onto it with toroidal wraparound.

use std::fmt::{Display, Formatter};

/// A `height` x `width` grid of pixels
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Screen {
    pixels: Vec<bool>,
    width: usize,
    height: usize,
}

impl Screen {
    /// Creates a blank screen. Zero dimensions are bumped to 1.
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let screen = Screen::new(64, 32);
    /// assert_eq!((64, 32), (screen.width(), screen.height()));
    /// assert!(screen.as_slice().iter().all(|&px| !px));
    /// ```
    pub fn new(width: usize, height: usize) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Screen {
            pixels: vec![false; width * height],
            width,
            height,
        }
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Turns every pixel off
    pub fn clear(&mut self) {
        self.pixels.fill(false);
    }

    /// Gets the pixel at (`x`, `y`), or None if out of bounds
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Iterates over the rows of the screen, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.pixels.chunks_exact(self.width)
    }

    /// The whole buffer, row-major
    pub fn as_slice(&self) -> &[bool] {
        &self.pixels
    }

    /// XORs `sprite` onto the screen with its top-left corner at (`x`, `y`)
    ///
    /// Each byte is one 8-pixel row, most significant bit leftmost. Both axes
    /// wrap independently. Returns true if any pixel was turned off.
    /// # Examples
    /// ```rust
    /// # use vip8::*;
    /// let mut screen = Screen::new(64, 32);
    /// assert!(!screen.draw_sprite(60, 0, &[0xff]));
    /// assert_eq!(Some(true), screen.get(63, 0));
    /// assert_eq!(Some(true), screen.get(3, 0));
    /// assert_eq!(Some(false), screen.get(4, 0));
    /// // drawing it again erases it, and reports the collision
    /// assert!(screen.draw_sprite(60, 0, &[0xff]));
    /// assert!(screen.as_slice().iter().all(|&px| !px));
    /// ```
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (line, &byte) in sprite.iter().enumerate() {
            let row = (y + line) % self.height;
            for bit in 0..8 {
                if byte & (0x80 >> bit) == 0 {
                    continue;
                }
                let col = (x + bit) % self.width;
                let pixel = &mut self.pixels[row * self.width + col];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }
        collision
    }
}

impl Default for Screen {
    /// A 64x32 screen
    fn default() -> Self {
        Self::new(64, 32)
    }
}

impl Display for Screen {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().map(|&px| if px { '█' } else { ' ' }).collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

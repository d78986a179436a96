// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Contains implementations for each Chip-8 [Insn]

use super::{mem::GLYPH_LEN, *};
use rand::random;

impl CPU {
    /// Executes a single [Insn]
    ///
    /// `pc` has already been advanced past the instruction.
    #[rustfmt::skip]
    #[inline(always)]
    pub(super) fn execute(&mut self, instruction: Insn, keys: &impl Keypad) -> Result<()> {
        match instruction {
            Insn::sys   {       a } => self.sys(a),
            Insn::cls               => self.clear_screen(),
            Insn::ret               => self.ret()?,
            Insn::jmp   {       a } => self.jump(a),
            Insn::call  {       a } => self.call(a)?,
            Insn::seb   { x,    b } => self.skip_equals_immediate(x, b),
            Insn::sneb  { x,    b } => self.skip_not_equals_immediate(x, b),
            Insn::se    { x, y    } => self.skip_equals(x, y),
            Insn::movb  { x,    b } => self.load_immediate(x, b),
            Insn::addb  { x,    b } => self.add_immediate(x, b),
            Insn::mov   { x, y    } => self.load_register(x, y),
            Insn::or    { x, y    } => self.or(x, y),
            Insn::and   { x, y    } => self.and(x, y),
            Insn::xor   { x, y    } => self.xor(x, y),
            Insn::add   { x, y    } => self.add(x, y),
            Insn::sub   { x, y    } => self.sub(x, y),
            Insn::shr   { x, y    } => self.shift_right(x, y),
            Insn::bsub  { x, y    } => self.backwards_sub(x, y),
            Insn::shl   { x, y    } => self.shift_left(x, y),
            Insn::sne   { x, y    } => self.skip_not_equals(x, y),
            Insn::movI  {       a } => self.load_i_immediate(a),
            Insn::jmpr  {       a } => self.jump_indexed(a),
            Insn::rand  { x,    b } => self.rand(x, b),
            Insn::draw  { x, y, n } => self.draw(x, y, n),
            Insn::sek   { x       } => self.skip_key_equals(x, keys),
            Insn::snek  { x       } => self.skip_key_not_equals(x, keys),
            Insn::getdt { x       } => self.load_delay_timer(x),
            Insn::waitk { x       } => self.wait_for_key(x, keys),
            Insn::setdt { x       } => self.store_delay_timer(x),
            Insn::movst { x       } => self.store_sound_timer(x),
            Insn::addI  { x       } => self.add_i(x),
            Insn::font  { x       } => self.load_sprite(x),
            Insn::bcd   { x       } => self.bcd_convert(x),
            Insn::dmao  { x       } => self.store_dma(x),
            Insn::dmai  { x       } => self.load_dma(x),
            Insn::inval { word    } => self.unimplemented(word),
        }
        Ok(())
    }

    /// Address of the instruction currently executing
    #[inline(always)]
    fn insn_addr(&self) -> Adr {
        self.pc.wrapping_sub(2)
    }
}

/// |`0aaa`| Issues a "System call" (ML routine)
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`00e0`| Clear screen memory to all 0       |
/// |`00ee`| Return from subroutine             |
impl CPU {
    /// |`0aaa`| Machine-language routines can't run here, so this does nothing
    #[inline(always)]
    pub(super) fn sys(&mut self, a: Adr) {
        log::debug!("{:03x}: ignoring sys {a:03x}", self.insn_addr());
    }
    /// |`00e0`| Clears the screen memory to 0
    #[inline(always)]
    pub(super) fn clear_screen(&mut self) {
        self.screen.clear();
        self.flags.draw = true;
    }
    /// |`00ee`| Returns from subroutine
    #[inline(always)]
    pub(super) fn ret(&mut self) -> Result<()> {
        self.pc = self.stack.pop().ok_or(Error::StackUnderflow {
            addr: self.insn_addr(),
        })?;
        Ok(())
    }
}

/// |`1aaa`| Sets pc to an absolute address
impl CPU {
    /// |`1aaa`| Sets the program counter to an absolute address
    #[inline(always)]
    pub(super) fn jump(&mut self, a: Adr) {
        self.pc = a;
    }
}

/// |`2aaa`| Pushes pc onto the stack, then jumps to a
impl CPU {
    /// |`2aaa`| Pushes pc onto the stack, then jumps to a
    #[inline(always)]
    pub(super) fn call(&mut self, a: Adr) -> Result<()> {
        if !self.stack.push(self.pc) {
            return Err(Error::StackOverflow {
                addr: self.insn_addr(),
            });
        }
        self.pc = a;
        Ok(())
    }
}

/// |`3xbb`| Skips next instruction if register X == b
impl CPU {
    /// |`3xbb`| Skips the next instruction if register X == b
    #[inline(always)]
    pub(super) fn skip_equals_immediate(&mut self, x: Reg, b: u8) {
        if self.v[x] == b {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`4xbb`| Skips next instruction if register X != b
impl CPU {
    /// |`4xbb`| Skips the next instruction if register X != b
    #[inline(always)]
    pub(super) fn skip_not_equals_immediate(&mut self, x: Reg, b: u8) {
        if self.v[x] != b {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`5xyn`| Performs a register-register comparison
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`5XY0`| Skip next instruction if vX == vY  |
impl CPU {
    /// |`5xy0`| Skips the next instruction if register X == register Y
    #[inline(always)]
    pub(super) fn skip_equals(&mut self, x: Reg, y: Reg) {
        if self.v[x] == self.v[y] {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`6xbb`| Loads immediate byte b into register vX
impl CPU {
    /// |`6xbb`| Loads immediate byte b into register vX
    #[inline(always)]
    pub(super) fn load_immediate(&mut self, x: Reg, b: u8) {
        self.v[x] = b;
    }
}

/// |`7xbb`| Adds immediate byte b to register vX
impl CPU {
    /// |`7xbb`| Adds immediate byte b to register vX. vF is untouched.
    #[inline(always)]
    pub(super) fn add_immediate(&mut self, x: Reg, b: u8) {
        self.v[x] = self.v[x].wrapping_add(b);
    }
}

/// |`8xyn`| Performs ALU operation
///
/// Every flag-setting operation computes its result first, then writes vX,
/// then writes vF. When X is F, the flag wins.
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`8xy0`| X = Y                              |
/// |`8xy1`| X = X | Y                          |
/// |`8xy2`| X = X & Y                          |
/// |`8xy3`| X = X ^ Y                          |
/// |`8xy4`| X = X + Y; Set vF=carry            |
/// |`8xy5`| X = X - Y; Set vF=!borrow          |
/// |`8xy6`| X = X >> 1; Set vF=shifted-out bit |
/// |`8xy7`| X = Y - X; Set vF=!borrow          |
/// |`8xyE`| X = X << 1; Set vF=shifted-out bit |
impl CPU {
    /// |`8xy0`| Loads the value of y into x
    #[inline(always)]
    pub(super) fn load_register(&mut self, x: Reg, y: Reg) {
        self.v[x] = self.v[y];
    }
    /// |`8xy1`| Performs bitwise or of vX and vY, and stores the result in vX
    ///
    /// # Quirk
    /// The original chip-8 interpreter will clobber vF for any 8-series instruction
    #[inline(always)]
    pub(super) fn or(&mut self, x: Reg, y: Reg) {
        self.v[x] |= self.v[y];
        if !self.flags.quirks.bin_ops {
            self.v[0xf] = 0;
        }
    }
    /// |`8xy2`| Performs bitwise and of vX and vY, and stores the result in vX
    ///
    /// # Quirk
    /// The original chip-8 interpreter will clobber vF for any 8-series instruction
    #[inline(always)]
    pub(super) fn and(&mut self, x: Reg, y: Reg) {
        self.v[x] &= self.v[y];
        if !self.flags.quirks.bin_ops {
            self.v[0xf] = 0;
        }
    }
    /// |`8xy3`| Performs bitwise xor of vX and vY, and stores the result in vX
    ///
    /// # Quirk
    /// The original chip-8 interpreter will clobber vF for any 8-series instruction
    #[inline(always)]
    pub(super) fn xor(&mut self, x: Reg, y: Reg) {
        self.v[x] ^= self.v[y];
        if !self.flags.quirks.bin_ops {
            self.v[0xf] = 0;
        }
    }
    /// |`8xy4`| Performs addition of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn add(&mut self, x: Reg, y: Reg) {
        let carry;
        (self.v[x], carry) = self.v[x].overflowing_add(self.v[y]);
        self.v[0xf] = carry.into();
    }
    /// |`8xy5`| Performs subtraction of vX and vY, and stores the result in vX
    #[inline(always)]
    pub(super) fn sub(&mut self, x: Reg, y: Reg) {
        let carry;
        (self.v[x], carry) = self.v[x].overflowing_sub(self.v[y]);
        self.v[0xf] = (!carry).into();
    }
    /// |`8xy6`| Performs bitwise right shift of vX
    ///
    /// # Quirk
    /// On the Cosmac VIP, this shifts vY and stores the result in vX
    #[inline(always)]
    pub(super) fn shift_right(&mut self, x: Reg, y: Reg) {
        let src: Reg = if self.flags.quirks.shift_vy { y } else { x };
        let shift_out = self.v[src] & 1;
        self.v[x] = self.v[src] >> 1;
        self.v[0xf] = shift_out;
    }
    /// |`8xy7`| Performs subtraction of vY and vX, and stores the result in vX
    #[inline(always)]
    pub(super) fn backwards_sub(&mut self, x: Reg, y: Reg) {
        let carry;
        (self.v[x], carry) = self.v[y].overflowing_sub(self.v[x]);
        self.v[0xf] = (!carry).into();
    }
    /// |`8xyE`| Performs bitwise left shift of vX
    ///
    /// # Quirk
    /// On the Cosmac VIP, this shifts vY and stores the result in vX
    #[inline(always)]
    pub(super) fn shift_left(&mut self, x: Reg, y: Reg) {
        let src: Reg = if self.flags.quirks.shift_vy { y } else { x };
        let shift_out: u8 = self.v[src] >> 7;
        self.v[x] = self.v[src] << 1;
        self.v[0xf] = shift_out;
    }
}

/// |`9xyn`| Performs a register-register comparison
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`9XY0`| Skip next instruction if vX != vY  |
impl CPU {
    /// |`9xy0`| Skip next instruction if X != y
    #[inline(always)]
    pub(super) fn skip_not_equals(&mut self, x: Reg, y: Reg) {
        if self.v[x] != self.v[y] {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`Aaaa`| Load address #a into register I
impl CPU {
    /// |`Aadr`| Load address #adr into register I
    #[inline(always)]
    pub(super) fn load_i_immediate(&mut self, a: Adr) {
        self.i = a;
    }
}

/// |`Baaa`| Jump to &adr + v0
impl CPU {
    /// |`Badr`| Jump to &adr + v0
    ///
    /// # Quirk
    /// On the Super-Chip, the offset register is picked by the high nibble of adr
    #[inline(always)]
    pub(super) fn jump_indexed(&mut self, a: Adr) {
        let reg = if self.flags.quirks.jump_vx {
            a as usize >> 8
        } else {
            0
        };
        self.pc = a.wrapping_add(self.v[reg] as Adr);
    }
}

/// |`Cxbb`| Stores a random number & the provided byte into vX
impl CPU {
    /// |`Cxbb`| Stores a random number & the provided byte into vX
    #[inline(always)]
    pub(super) fn rand(&mut self, x: Reg, b: u8) {
        self.v[x] = random::<u8>() & b;
    }
}

/// |`Dxyn`| Draws n-byte sprite to the screen at coordinates (vX, vY)
impl CPU {
    /// |`Dxyn`| Draws n-byte sprite to the screen at coordinates (vX, vY)
    ///
    /// The sprite is read from memory at I, wrapping at the end of memory.
    /// vF is cleared, then set if any lit pixel was erased.
    #[inline(always)]
    pub(super) fn draw(&mut self, x: Reg, y: Reg, n: Nib) {
        let (x, y) = (self.v[x] as usize, self.v[y] as usize);
        let sprite: Vec<u8> = (0..n as usize)
            .map(|row| self.mem.read(self.i as usize + row))
            .collect();
        self.v[0xf] = 0;
        if self.screen.draw_sprite(x, y, &sprite) {
            self.v[0xf] = 1;
        }
        self.flags.draw = true;
    }
}

/// |`Exbb`| Skips instruction on value of keypress
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`eX9e`| Skip next instruction if key == vX |
/// |`eXa1`| Skip next instruction if key != vX |
impl CPU {
    /// |`Ex9E`| Skip next instruction if key == vX
    #[inline(always)]
    pub(super) fn skip_key_equals(&mut self, x: Reg, keys: &impl Keypad) {
        if keys.is_pressed(self.v[x] as usize & 0xf) {
            self.pc = self.pc.wrapping_add(2);
        }
    }
    /// |`ExA1`| Skip next instruction if key != vX
    #[inline(always)]
    pub(super) fn skip_key_not_equals(&mut self, x: Reg, keys: &impl Keypad) {
        if !keys.is_pressed(self.v[x] as usize & 0xf) {
            self.pc = self.pc.wrapping_add(2);
        }
    }
}

/// |`Fxbb`| Performs IO
///
/// |opcode| effect                             |
/// |------|------------------------------------|
/// |`fX07`| Set vX to value in delay timer     |
/// |`fX0a`| Wait for input, store key in vX    |
/// |`fX15`| Set delay timer to the value in vX |
/// |`fX18`| Set sound timer to the value in vX |
/// |`fX1e`| Add vX to I                        |
/// |`fX29`| Load sprite for character x into I |
/// |`fX33`| BCD convert X into I[0..3]         |
/// |`fX55`| DMA Stor from registers 0..=X to I |
/// |`fX65`| DMA Load from I to registers 0..=X |
impl CPU {
    /// |`Fx07`| Get the current DT, and put it in vX
    /// ```py
    /// vX = DT
    /// ```
    #[inline(always)]
    pub(super) fn load_delay_timer(&mut self, x: Reg) {
        self.v[x] = self.timers.delay();
    }
    /// |`Fx0A`| Wait for key, then vX = K
    ///
    /// Holds the program counter on this instruction until some key changes
    /// from its state when the wait began, then until that key is up.
    #[inline(always)]
    pub(super) fn wait_for_key(&mut self, x: Reg, keys: &impl Keypad) {
        match self.keywait {
            KeyWait::Idle | KeyWait::AwaitingPress => {
                let changed = (0..KEY_COUNT).find(|&key| keys.is_pressed(key) != self.key_cache[key]);
                self.keywait = match changed {
                    Some(key) => KeyWait::AwaitingRelease { key },
                    None => KeyWait::AwaitingPress,
                };
                log::trace!("{:03x}: {:?}", self.insn_addr(), self.keywait);
                self.pc = self.insn_addr();
            }
            KeyWait::AwaitingRelease { key } => {
                if keys.is_pressed(key) {
                    self.pc = self.insn_addr();
                } else {
                    log::trace!("{:03x}: got key {key:X}", self.insn_addr());
                    self.v[x] = key as u8;
                    self.keywait = KeyWait::Idle;
                }
            }
        }
    }
    /// |`Fx15`| Load vX into DT
    /// ```py
    /// DT = vX
    /// ```
    #[inline(always)]
    pub(super) fn store_delay_timer(&mut self, x: Reg) {
        self.timers.set_delay(self.v[x]);
    }
    /// |`Fx18`| Load vX into ST
    /// ```py
    /// ST = vX;
    /// ```
    #[inline(always)]
    pub(super) fn store_sound_timer(&mut self, x: Reg) {
        self.timers.set_sound(self.v[x]);
    }
    /// |`Fx1e`| Add vX to I,
    /// ```py
    /// I += vX;
    /// ```
    #[inline(always)]
    pub(super) fn add_i(&mut self, x: Reg) {
        self.i = self.i.wrapping_add(self.v[x] as Adr);
    }
    /// |`Fx29`| Load sprite for character x into I
    /// ```py
    /// I = sprite(X);
    /// ```
    #[inline(always)]
    pub(super) fn load_sprite(&mut self, x: Reg) {
        self.i = mem::FONT_ADDR + GLYPH_LEN * (self.v[x] as Adr & 0xf);
    }
    /// |`Fx33`| BCD convert X into I`[0..3]`
    #[inline(always)]
    pub(super) fn bcd_convert(&mut self, x: Reg) {
        let (x, i) = (self.v[x], self.i as usize);
        self.mem.write(i, x / 100 % 10);
        self.mem.write(i + 1, x / 10 % 10);
        self.mem.write(i + 2, x % 10);
    }
    /// |`Fx55`| DMA Stor from registers 0..=X to I
    ///
    /// # Quirk
    /// The original chip-8 interpreter uses I to directly index memory,
    /// with the side effect of leaving I as I+X+1 after the transfer is done.
    #[inline(always)]
    pub(super) fn store_dma(&mut self, x: Reg) {
        let i = self.i as usize;
        for reg in 0..=x {
            self.mem.write(i + reg, self.v[reg]);
        }
        if !self.flags.quirks.dma_inc {
            self.i = self.i.wrapping_add(x as Adr + 1);
        }
    }
    /// |`Fx65`| DMA Load from I to registers 0..=X
    ///
    /// # Quirk
    /// The original chip-8 interpreter uses I to directly index memory,
    /// with the side effect of leaving I as I+X+1 after the transfer is done.
    #[inline(always)]
    pub(super) fn load_dma(&mut self, x: Reg) {
        let i = self.i as usize;
        for reg in 0..=x {
            self.v[reg] = self.mem.read(i + reg);
        }
        if !self.flags.quirks.dma_inc {
            self.i = self.i.wrapping_add(x as Adr + 1);
        }
    }
}

/// Words that aren't instructions
impl CPU {
    /// Does nothing. Historical interpreters skip these silently.
    #[inline(always)]
    pub(super) fn unimplemented(&mut self, word: u16) {
        log::debug!("{:03x}: ignoring unknown opcode {word:04x}", self.insn_addr());
    }
}

// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Unit tests for [super::CPU]
//!
//! These run instructions, and ensure their output is consistent with previous builds
//!
//! General test format:
//! 1. Prepare to do the thing
//! 2. Do the thing
//! 3. Compare the result to the expected result

use super::*;
use crate::cpu::{keys::Keys, stack::STACK_DEPTH};
use rand::random;


fn setup_environment() -> (CPU, Keys) {
    let mut cpu = CPU::default();
    cpu.load_program(&[0x12, 0x00]) // jmp 200
        .expect("Two bytes should fit in program memory.");
    (cpu, Keys::default())
}

/// Register pairs worth checking: disjoint, aliased, and involving vF
const PAIRS: [(Reg, Reg); 6] = [(0x0, 0x1), (0x3, 0xa), (0x5, 0x5), (0xe, 0xf), (0xf, 0x2), (0xf, 0xf)];

/// Words which aren't instructions do nothing at all
mod unimplemented {
    use super::*;

    fn assert_noop(word: u16) {
        let (mut cpu, keys) = setup_environment();
        cpu.mem.write(0x200u16, (word >> 8) as u8);
        cpu.mem.write(0x201u16, word as u8);
        cpu.v = [0xc5; 16];
        let before = cpu.clone();

        cpu.cycle(&keys)
            .unwrap_or_else(|e| panic!("{word:04x} should be a no-op, got {e}"));

        assert_eq!(cpu.pc, 0x202);
        assert_eq!(cpu.v, before.v);
        assert_eq!(cpu.i, before.i);
        assert_eq!(cpu.screen, before.screen);
        assert_eq!(cpu.stack, before.stack);
        assert!(!cpu.halted);
    }

    #[test]
    fn ins_8xyn() {
        for n in [0x8, 0x9, 0xa, 0xb, 0xc, 0xd, 0xf] {
            assert_noop(0x8120 | n);
        }
    }
    #[test]
    fn ins_exbb() {
        assert_noop(0xe00f);
        assert_noop(0xe19f);
    }
    #[test]
    fn ins_fxbb() {
        assert_noop(0xf00f);
        assert_noop(0xf1ff);
    }
    #[test]
    fn sys() {
        assert_noop(0x0420);
        assert_noop(0x0000);
    }
}

mod sys {
    use super::*;
    /// 00e0: Clears the screen memory to 0
    #[test]
    fn clear_screen() {
        let (mut cpu, _) = setup_environment();
        cpu.screen.draw_sprite(10, 10, &[0xff; 15]);
        cpu.clear_screen();
        assert!(cpu.screen.as_slice().iter().all(|px| !px));
        assert!(cpu.flags.draw);
    }

    /// 00ee: Returns from subroutine
    #[test]
    fn ret() {
        let test_addr = random::<u16>() & 0x7ff;
        let (mut cpu, _) = setup_environment();
        // Place the address on the stack
        assert!(cpu.stack.push(test_addr));

        cpu.ret().expect("The stack has an address on it");

        // Verify the current address is the address from the stack
        assert_eq!(test_addr, cpu.pc);
        assert!(cpu.stack.is_empty());
    }

    /// 00ee: Returning with nothing on the stack is fatal
    #[test]
    fn ret_underflow() {
        let (mut cpu, keys) = setup_environment();
        cpu.mem.load(0x200, &[0x00, 0xee]).unwrap();

        let err = cpu.cycle(&keys).expect_err("ret with an empty stack");
        assert!(matches!(err, Error::StackUnderflow { addr: 0x200 }));
        assert!(err.is_fatal());
        assert!(cpu.halted);
        // and it stays dead
        assert!(matches!(cpu.cycle(&keys), Err(Error::Halted)));
        assert_eq!(1, cpu.cycle);
    }
}

/// Tests control-flow instructions
///
/// Basically anything that touches the program counter
mod cf {
    use super::*;
    /// 1aaa: Sets the program counter to an absolute address
    #[test]
    fn jump() {
        let (mut cpu, _) = setup_environment();
        // Test all valid addresses
        for addr in 0x000..0x1000 {
            // Jump to an address
            cpu.jump(addr);
            // Verify the current address is the jump target address
            assert_eq!(addr, cpu.pc);
        }
    }

    /// 2aaa: Pushes pc onto the stack, then jumps to a
    #[test]
    fn call() {
        let test_addr = random::<u16>() & 0xfff;
        let (mut cpu, _) = setup_environment();
        // Save the current address
        let curr_addr = cpu.pc;
        // Call an address
        cpu.call(test_addr).expect("The stack is empty");
        // Verify the current address is the called address
        assert_eq!(test_addr, cpu.pc);
        // Verify the previous address was stored on the stack
        let stack_addr: u16 = cpu.stack.pop().expect("This should return test_addr");
        assert_eq!(stack_addr, curr_addr);
    }

    /// 2aaa, 00ee: A call followed by a return resumes after the call
    #[test]
    fn call_then_ret() {
        let (mut cpu, keys) = setup_environment();
        cpu.mem
            .load(
                0x200,
                &[
                    0x22, 0x06, // call 206
                    0x60, 0x01, // mov #01, v0
                    0x12, 0x04, // jmp 204
                    0x00, 0xee, // ret
                ],
            )
            .unwrap();
        cpu.cycle(&keys).unwrap();
        assert_eq!(0x206, cpu.pc);
        assert_eq!(&[0x202], cpu.stack.as_slice());
        cpu.cycle(&keys).unwrap();
        assert_eq!(0x202, cpu.pc);
        assert!(cpu.stack.is_empty());
        cpu.cycle(&keys).unwrap();
        assert_eq!(1, cpu.v[0]);
    }

    /// 2aaa: The seventeenth nested call is fatal
    #[test]
    fn call_overflow() {
        let (mut cpu, keys) = setup_environment();
        // call 200, forever
        cpu.mem.load(0x200, &[0x22, 0x00]).unwrap();
        cpu.multistep(&keys, STACK_DEPTH)
            .expect("Sixteen calls fit on the stack");
        assert_eq!(STACK_DEPTH, cpu.stack.len());

        let err = cpu.cycle(&keys).expect_err("The seventeenth call overflows");
        assert!(matches!(err, Error::StackOverflow { addr: 0x200 }));
        assert!(cpu.halted);
        assert_eq!(STACK_DEPTH, cpu.stack.len());
    }

    /// 3xbb: Skips the next instruction if register X == b
    #[test]
    fn skip_equals_immediate() {
        let (mut cpu, _) = setup_environment();
        for word in 0..=0xffff_u16 {
            let (a, b, addr) = (word as u8, (word >> 8) as u8, random::<u16>() & 0x7fe);
            let x = (word % 16) as usize;
            cpu.pc = addr;
            cpu.v[x] = a;

            cpu.skip_equals_immediate(x, b);

            assert_eq!(cpu.pc, addr.wrapping_add(if a == b { 2 } else { 0 }));
        }
    }

    /// 4xbb: Skips the next instruction if register X != b
    #[test]
    fn skip_not_equals_immediate() {
        let (mut cpu, _) = setup_environment();
        for word in 0..=0xffff_u16 {
            let (a, b, addr) = (word as u8, (word >> 8) as u8, random::<u16>() & 0x7fe);
            let x = (word % 16) as usize;
            cpu.pc = addr;
            cpu.v[x] = a;

            cpu.skip_not_equals_immediate(x, b);

            assert_eq!(cpu.pc, addr.wrapping_add(if a != b { 2 } else { 0 }));
        }
    }

    /// 5xy0: Skips the next instruction if register X == register Y
    #[test]
    fn skip_equals() {
        let (mut cpu, _) = setup_environment();
        for word in 0..=0xffff_u16 {
            let (a, b, addr) = (word as u8, (word >> 8) as u8, random::<u16>() & 0x7fe);
            let (x, y) = (word as usize % 7, 8 + word as usize % 5);
            cpu.pc = addr;
            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.skip_equals(x, y);

            assert_eq!(cpu.pc, addr.wrapping_add(if a == b { 2 } else { 0 }));
        }
    }

    /// 9xy0: Skip next instruction if X != y
    #[test]
    fn skip_not_equals() {
        let (mut cpu, _) = setup_environment();
        for word in 0..=0xffff_u16 {
            let (a, b, addr) = (word as u8, (word >> 8) as u8, random::<u16>() & 0x7fe);
            let (x, y) = (word as usize % 7, 8 + word as usize % 5);
            cpu.pc = addr;
            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.skip_not_equals(x, y);

            assert_eq!(cpu.pc, addr.wrapping_add(if a != b { 2 } else { 0 }));
        }
    }

    /// Badr: Jump to &adr + v0
    #[test]
    fn jump_indexed() {
        let (mut cpu, _) = setup_environment();
        // For every valid address
        for addr in 0..0x1000 {
            // For every valid offset
            for v0 in 0..=0xff {
                cpu.v[0] = v0;

                cpu.jump_indexed(addr);

                assert_eq!(cpu.pc, addr.wrapping_add(v0.into()));
            }
        }
    }
    /// Tests `jump_vx` Quirk behavior
    #[test]
    fn jump_vx() {
        let (mut cpu, _) = setup_environment();
        cpu.flags.quirks.jump_vx = true;

        //set v[0..F] to 0123456789abcdef
        for i in 0..0x10 {
            cpu.v[i] = i as u8;
        }
        for reg in 0..0x10 {
            // attempts to jump to 0x`reg`00 + 0
            cpu.jump_indexed(reg * 0x100);
            // jumps to 0x`reg`00 + v`reg` instead
            assert_eq!(cpu.pc, reg * 0x101);
        }
    }
}

mod math {
    use super::*;
    /// 6xbb: Loads immediate byte b into register vX
    #[test]
    fn load_immediate() {
        let (mut cpu, _) = setup_environment();
        for test_register in 0x0..=0xf {
            for test_byte in 0x0..=0xff {
                cpu.load_immediate(test_register, test_byte);
                assert_eq!(cpu.v[test_register], test_byte)
            }
        }
    }

    /// 7xbb: Adds immediate byte b to register vX
    #[test]
    fn add_immediate() {
        let (mut cpu, _) = setup_environment();
        for test_register in 0x0..=0xe {
            let mut sum = 0u8;
            for test_byte in 0x0..=0xff {
                // Note: Chip-8 allows unsigned overflow
                sum = sum.wrapping_add(test_byte);
                cpu.v[0xf] = 0xc5; // sentinel

                cpu.add_immediate(test_register, test_byte);

                assert_eq!(cpu.v[test_register], sum);
                // vF is never a carry flag for 7xbb
                assert_eq!(cpu.v[0xf], 0xc5);
            }
        }
    }

    /// 8xy0: Loads the value of y into x
    #[test]
    fn load_register() {
        let (mut cpu, _) = setup_environment();
        // We use zero as a sentinel value for this test, so loop from 1 to 255
        for test_value in 1..=0xff {
            for reg in 0..=0xff {
                let (x, y) = (reg & 0xf, reg >> 4);
                if x == y {
                    continue;
                }
                cpu.v[y] = test_value;
                cpu.v[x] = 0;

                cpu.load_register(x, y);

                assert_eq!(cpu.v[x], test_value);
                assert_eq!(cpu.v[y], test_value);
            }
        }
    }

    /// 8xy0 through dispatch, next to a byte load that patches memory in place
    #[test]
    fn load_register_beside_byte_load() {
        let (mut cpu, keys) = setup_environment();
        cpu.load(&[0x62, 0x2a, 0x81, 0x20], 0x200).unwrap();
        cpu.multistep(&keys, 2).unwrap();
        assert_eq!(0x2a, cpu.v[1]);
        // patching the next instruction keeps registers and pc
        cpu.load(&[0x83, 0x10], 0x204).unwrap();
        assert_eq!((0x204, 0x2a), (cpu.pc, cpu.v[1]));
        cpu.cycle(&keys).unwrap();
        assert_eq!(0x2a, cpu.v[3]);
    }

    /// Checks a bitwise op against `op`, with and without [Quirks::bin_ops]
    fn test_bitwise(f: fn(&mut CPU, Reg, Reg), op: fn(u8, u8) -> u8) {
        for bin_ops in [false, true] {
            let (mut cpu, _) = setup_environment();
            cpu.flags.quirks.bin_ops = bin_ops;
            for a in 0..=0xff {
                for b in 0..=0xff {
                    for (x, y) in PAIRS {
                        cpu.v[0xf] = 0xc5; // sentinel
                        (cpu.v[x], cpu.v[y]) = (a, b);
                        // if x == y, both registers hold b
                        let expected = if x == y { op(b, b) } else { op(a, b) };

                        f(&mut cpu, x, y);

                        if x != 0xf {
                            assert_eq!(cpu.v[x], expected);
                        }
                        match (bin_ops, x, y) {
                            (false, ..) => assert_eq!(cpu.v[0xf], 0),
                            (true, 0xf, _) => assert_eq!(cpu.v[0xf], expected),
                            (true, _, 0xf) => assert_eq!(cpu.v[0xf], b),
                            (true, ..) => assert_eq!(cpu.v[0xf], 0xc5),
                        }
                    }
                }
            }
        }
    }

    /// 8xy1: Performs bitwise or of vX and vY, and stores the result in vX
    #[test]
    fn or() {
        test_bitwise(CPU::or, |a, b| a | b);
    }

    /// 8xy2: Performs bitwise and of vX and vY, and stores the result in vX
    #[test]
    fn and() {
        test_bitwise(CPU::and, |a, b| a & b);
    }

    /// 8xy3: Performs bitwise xor of vX and vY, and stores the result in vX
    #[test]
    fn xor() {
        test_bitwise(CPU::xor, |a, b| a ^ b);
    }

    /// 8xy4: Performs addition of vX and vY, and stores the result in vX, carry in vF
    ///       If X is F, *only* stores the carry
    #[test]
    fn add() {
        let (mut cpu, _) = setup_environment();
        for a in 0..=0xff {
            for b in 0..=0xff {
                for (x, y) in PAIRS {
                    // If x == y, a is discarded
                    let a = if x == y { b } else { a };
                    (cpu.v[x], cpu.v[y]) = (a, b);

                    cpu.add(x, y);

                    if x != 0xf {
                        assert_eq!(cpu.v[x] as u16, (a as u16 + b as u16) % 256);
                    }
                    assert_eq!(cpu.v[0xf], (a as u16 + b as u16 > 0xff).into());
                }
            }
        }
    }

    /// 8xy5: Performs subtraction of vX and vY, and stores the result in vX, !borrow in vF
    #[test]
    fn sub() {
        let (mut cpu, _) = setup_environment();
        for a in 0..=0xff {
            for b in 0..=0xff {
                for (x, y) in PAIRS {
                    let a = if x == y { b } else { a };
                    (cpu.v[x], cpu.v[y]) = (a, b);

                    cpu.sub(x, y);

                    if x != 0xf {
                        assert_eq!(cpu.v[x] as i16, (a as i16 - b as i16).rem_euclid(256));
                    }
                    assert_eq!(cpu.v[0xf], (a >= b).into());
                }
            }
        }
    }

    /// 8xy7: Performs subtraction of vY and vX, and stores the result in vX and !borrow in vF
    #[test]
    fn backwards_sub() {
        let (mut cpu, _) = setup_environment();
        for a in 0..=0xff {
            for b in 0..=0xff {
                for (x, y) in PAIRS {
                    let a = if x == y { b } else { a };
                    (cpu.v[x], cpu.v[y]) = (a, b);

                    cpu.backwards_sub(x, y);

                    if x != 0xf {
                        assert_eq!(cpu.v[x] as i16, (b as i16 - a as i16).rem_euclid(256));
                    }
                    assert_eq!(cpu.v[0xf], (b >= a).into());
                }
            }
        }
    }

    mod shift_right {
        use super::*;
        /// 8xy6: Performs bitwise right shift of vX, stores carry-out in vF
        #[test]
        fn shift_right() {
            let (mut cpu, _) = setup_environment();
            for word in 0..=0xff {
                for (x, y) in PAIRS {
                    // vY is ignored unless it's also vX
                    (cpu.v[y], cpu.v[x]) = (0xa5, word);

                    cpu.shift_right(x, y);

                    if x != 0xf {
                        assert_eq!(cpu.v[x], word / 2);
                    }
                    assert_eq!(cpu.v[0xf], word & 1);
                }
            }
        }
        /// The same test, with [Quirks::shift_vy] quirk flag set
        #[test]
        fn shift_right_quirk() {
            let (mut cpu, _) = setup_environment();
            cpu.flags.quirks.shift_vy = true;
            for word in 0..=0xff {
                for (x, y) in PAIRS {
                    (cpu.v[x], cpu.v[y]) = (0xa5, word);

                    cpu.shift_right(x, y);

                    if x != 0xf {
                        assert_eq!(cpu.v[x], word >> 1);
                    }
                    assert_eq!(cpu.v[0xf], word & 1);
                }
            }
        }
    }

    mod shift_left {
        use super::*;
        /// 8xyE: Performs bitwise left shift of vX, stores carry-out in vF
        #[test]
        fn shift_left() {
            let (mut cpu, _) = setup_environment();
            for word in 0..=0xff {
                for (x, y) in PAIRS {
                    (cpu.v[y], cpu.v[x]) = (0xa5, word);

                    cpu.shift_left(x, y);

                    if x != 0xf {
                        assert_eq!(cpu.v[x] as u16, (word as u16 * 2) % 256);
                    }
                    assert_eq!(cpu.v[0xf], word >> 7);
                }
            }
        }
        /// The same test, with [Quirks::shift_vy] quirk flag set
        #[test]
        fn shift_left_quirk() {
            let (mut cpu, _) = setup_environment();
            cpu.flags.quirks.shift_vy = true;
            for word in 0..=0xff {
                for (x, y) in PAIRS {
                    (cpu.v[x], cpu.v[y]) = (0xa5, word);

                    cpu.shift_left(x, y);

                    if x != 0xf {
                        assert_eq!(cpu.v[x], word << 1);
                    }
                    assert_eq!(cpu.v[0xf], word >> 7);
                }
            }
        }
    }

    /// Runs through the fetch path: 250 + 10 with carry
    #[test]
    fn add_overflow_scenario() {
        let (mut cpu, keys) = setup_environment();
        cpu.mem.load(0x200, &[0x80, 0x14]).unwrap(); // add v1, v0
        (cpu.v[0], cpu.v[1]) = (250, 10);

        cpu.cycle(&keys).unwrap();

        assert_eq!(cpu.v[0], 4);
        assert_eq!(cpu.v[1], 10);
        assert_eq!(cpu.v[0xf], 1);
    }
}

mod i {
    use super::*;
    /// Aadr: Load address #adr into register I
    #[test]
    fn load_i_immediate() {
        let (mut cpu, _) = setup_environment();
        for addr in 0..0x1000 {
            cpu.load_i_immediate(addr);
            assert_eq!(cpu.i, addr);
        }
    }

    /// Fx1e: Add vX to I
    #[test]
    fn add_i() {
        let (mut cpu, _) = setup_environment();
        for x in 0..=0xf {
            for byte in 0..=0xff {
                let i = random::<u16>() & 0xfff;
                cpu.v[0xf] = 0xc5;
                cpu.v[x] = byte;
                cpu.i = i;

                cpu.add_i(x);

                assert_eq!(cpu.i, i + byte as u16);
                // no overflow flag is defined
                if x != 0xf {
                    assert_eq!(cpu.v[0xf], 0xc5);
                }
            }
        }
    }

    /// Fx1e: I wraps around at 16 bits rather than panicking
    #[test]
    fn add_i_wraps() {
        let (mut cpu, _) = setup_environment();
        cpu.i = 0xffff;
        cpu.v[3] = 2;
        cpu.add_i(3);
        assert_eq!(cpu.i, 1);
    }
}

mod io {
    use super::*;

    /// Cxbb: Stores a random number & the provided byte into vX
    #[test]
    fn rand() {
        let (mut cpu, _) = setup_environment();
        for xb in 0..=0x0fff_u16 {
            let (x, b) = ((xb >> 8) as Reg, xb as u8);
            cpu.rand(x, b);
            // Only bits set in b can be set in vX
            assert_eq!(cpu.v[x] & !b, 0);
        }
    }

    mod display {
        use super::*;

        /// Loads a sprite at I = 0x300 and points vX/vY at a position
        fn prepare(cpu: &mut CPU, sprite: &[u8], x: u8, y: u8) {
            cpu.mem.load(0x300, sprite).unwrap();
            cpu.i = 0x300;
            (cpu.v[0], cpu.v[1]) = (x, y);
        }

        /// Dxyn: Draws n-byte sprite to the screen at coordinates (vX, vY)
        #[test]
        fn draw() {
            let (mut cpu, _) = setup_environment();
            prepare(&mut cpu, &[0b1000_0001, 0b0111_1110], 4, 6);
            cpu.v[0xf] = 0xc5;

            cpu.draw(0, 1, 2);

            assert_eq!(cpu.v[0xf], 0);
            assert!(cpu.flags.draw);
            for (col, lit) in (4..12).zip([true, false, false, false, false, false, false, true]) {
                assert_eq!(cpu.screen.get(col, 6), Some(lit));
                assert_eq!(cpu.screen.get(col, 7), Some(!lit));
            }
            // nothing else was touched
            assert_eq!(cpu.screen.as_slice().iter().filter(|&&px| px).count(), 8);
        }

        /// Dxyn: Drawing the same sprite twice restores the screen, and collides
        #[test]
        fn draw_twice() {
            let (mut cpu, _) = setup_environment();
            prepare(&mut cpu, &mem::FONT[0..5], 30, 20);

            cpu.draw(0, 1, 5);
            assert_eq!(cpu.v[0xf], 0);
            cpu.draw(0, 1, 5);
            assert_eq!(cpu.v[0xf], 1);
            assert!(cpu.screen.as_slice().iter().all(|&px| !px));
        }

        /// Dxyn: Redrawing a sprite elsewhere doesn't collide
        #[test]
        fn draw_no_collision() {
            let (mut cpu, _) = setup_environment();
            prepare(&mut cpu, &[0xf0], 0, 0);
            cpu.draw(0, 1, 1);
            cpu.v[0] = 4;
            cpu.draw(0, 1, 1);
            assert_eq!(cpu.v[0xf], 0);
            assert_eq!(cpu.screen.as_slice().iter().filter(|&&px| px).count(), 8);
        }

        /// Dxyn: vF stays set once any pixel collides, even if later rows don't
        #[test]
        fn draw_collision_sticks() {
            let (mut cpu, _) = setup_environment();
            prepare(&mut cpu, &[0x80], 0, 0);
            cpu.draw(0, 1, 1);
            // first row collides, the rest land on blank pixels
            prepare(&mut cpu, &[0x80, 0xff, 0xff], 0, 0);
            cpu.draw(0, 1, 3);
            assert_eq!(cpu.v[0xf], 1);
        }

        /// Dxyn: Sprites wrap around both edges of the screen
        #[test]
        fn draw_wraps() {
            let (mut cpu, _) = setup_environment();
            prepare(&mut cpu, &[0xff, 0xff], 60, 31);

            cpu.draw(0, 1, 2);

            for col in [60, 61, 62, 63, 0, 1, 2, 3] {
                assert_eq!(cpu.screen.get(col, 31), Some(true), "column {col}");
                assert_eq!(cpu.screen.get(col, 0), Some(true), "column {col}");
            }
            assert_eq!(cpu.screen.get(4, 31), Some(false));
            assert_eq!(cpu.screen.get(59, 0), Some(false));
        }

        /// Dxyn: Coordinates wrap too, so (64, 32) is (0, 0)
        #[test]
        fn draw_coordinates_wrap() {
            let (mut cpu, _) = setup_environment();
            prepare(&mut cpu, &[0x80], 64 + 5, 32 + 3);
            cpu.draw(0, 1, 1);
            assert_eq!(cpu.screen.get(5, 3), Some(true));
        }

        /// Dxyn: Sprite data past the end of memory wraps to the start
        #[test]
        fn draw_reads_wrap() {
            let (mut cpu, _) = setup_environment();
            cpu.mem.write(0xfffu16, 0x80);
            cpu.i = 0xfff;
            (cpu.v[0], cpu.v[1]) = (0, 0);
            // the second row comes from address 0: the top of the '0' glyph
            cpu.draw(0, 1, 2);
            assert_eq!(cpu.screen.get(0, 0), Some(true));
            assert_eq!(cpu.screen.get(1, 0), Some(false));
            assert_eq!(cpu.screen.get(3, 1), Some(true));
        }

        /// Dxyn: Coordinates are read before vF is cleared
        #[test]
        fn draw_from_vf() {
            let (mut cpu, _) = setup_environment();
            cpu.mem.load(0x300, &[0x80]).unwrap();
            cpu.i = 0x300;
            (cpu.v[0xf], cpu.v[0]) = (9, 2);
            cpu.draw(0xf, 0, 1);
            assert_eq!(cpu.screen.get(9, 2), Some(true));
        }
    }

    mod cf {
        use super::*;
        /// Ex9E: Skip next instruction if key == vX
        #[test]
        fn skip_key_equals() {
            let (mut cpu, mut keys) = setup_environment();
            for ka in 0..=0x7f {
                cpu.v[0] = ka;
                for kb in 0..=0xf {
                    keys.release_all();
                    keys.press(kb).unwrap();
                    cpu.pc = 0x200;

                    cpu.skip_key_equals(0x0, &keys);

                    let expected = if ka as usize & 0xf == kb { 0x202 } else { 0x200 };
                    assert_eq!(cpu.pc, expected);
                }
            }
        }

        /// ExA1: Skip next instruction if key != vX
        #[test]
        fn skip_key_not_equals() {
            let (mut cpu, mut keys) = setup_environment();
            for ka in 0..=0x7f {
                cpu.v[0] = ka;
                for kb in 0..=0xf {
                    keys.release_all();
                    keys.press(kb).unwrap();
                    cpu.pc = 0x200;

                    cpu.skip_key_not_equals(0x0, &keys);

                    let expected = if ka as usize & 0xf != kb { 0x202 } else { 0x200 };
                    assert_eq!(cpu.pc, expected);
                }
            }
        }

        /// Fx0A: Wait for key, then vX = K
        ///
        /// The program counter holds still until a key goes down and back up.
        #[test]
        fn wait_for_key() {
            let (mut cpu, mut keys) = setup_environment();
            cpu.mem.load(0x200, &[0xf3, 0x0a, 0x12, 0x02]).unwrap();

            // nothing happens while no key changes
            for _ in 0..10 {
                cpu.cycle(&keys).unwrap();
                assert_eq!(cpu.pc, 0x200);
                assert_eq!(cpu.keywait, KeyWait::AwaitingPress);
            }
            // press
            keys.press(0xb).unwrap();
            for _ in 0..10 {
                cpu.cycle(&keys).unwrap();
                assert_eq!(cpu.pc, 0x200);
                assert_eq!(cpu.keywait, KeyWait::AwaitingRelease { key: 0xb });
            }
            assert_eq!(cpu.v[3], 0);
            // release
            keys.release(0xb).unwrap();
            cpu.cycle(&keys).unwrap();
            assert_eq!(cpu.pc, 0x202);
            assert_eq!(cpu.v[3], 0xb);
            assert_eq!(cpu.keywait, KeyWait::Idle);
            // and execution carries on
            cpu.cycle(&keys).unwrap();
            assert_eq!(cpu.pc, 0x202);
        }

        /// Fx0A: A key already held when the wait starts doesn't count until it changes
        #[test]
        fn wait_for_key_held() {
            let (mut cpu, mut keys) = setup_environment();
            cpu.mem.load(0x200, &[0xf0, 0x0a]).unwrap();
            keys.press(0x4).unwrap();

            cpu.multistep(&keys, 5).unwrap();
            assert_eq!(cpu.keywait, KeyWait::AwaitingPress);

            keys.press(0x9).unwrap();
            cpu.cycle(&keys).unwrap();
            assert_eq!(cpu.keywait, KeyWait::AwaitingRelease { key: 0x9 });
            keys.release(0x9).unwrap();
            cpu.cycle(&keys).unwrap();
            assert_eq!(cpu.v[0], 0x9);
            assert_eq!(cpu.pc, 0x202);
        }

        /// Fx0A: Reset abandons a wait in progress
        #[test]
        fn wait_for_key_reset() {
            let (mut cpu, keys) = setup_environment();
            cpu.mem.load(0x200, &[0xf0, 0x0a]).unwrap();
            cpu.cycle(&keys).unwrap();
            assert!(cpu.keywait.is_waiting());
            cpu.reset();
            assert_eq!(cpu.keywait, KeyWait::Idle);
        }
    }

    /// Fx07: Get the current DT, and put it in vX
    #[test]
    fn load_delay_timer() {
        let (mut cpu, _) = setup_environment();
        for x in 0..=0xf {
            for word in 0..=0xff {
                cpu.timers.set_delay(word);
                cpu.load_delay_timer(x);
                assert_eq!(cpu.v[x], word);
            }
        }
    }

    /// Fx15: Load vX into DT
    #[test]
    fn store_delay_timer() {
        let (mut cpu, _) = setup_environment();
        for x in 0..=0xf {
            for word in 0..=0xff {
                cpu.v[x] = word;
                cpu.store_delay_timer(x);
                assert_eq!(cpu.timers.delay(), word);
            }
        }
    }

    /// Fx18: Load vX into ST
    #[test]
    fn store_sound_timer() {
        let (mut cpu, _) = setup_environment();
        for x in 0..=0xf {
            for word in 0..=0xff {
                cpu.v[x] = word;
                cpu.store_sound_timer(x);
                assert_eq!(cpu.timers.sound(), word);
                assert_eq!(cpu.sound_timer_active(), word > 0);
            }
        }
    }

    /// Fx29: Load sprite for character vX into I
    #[test]
    fn load_sprite() {
        let (mut cpu, _) = setup_environment();
        for x in 0..=0xf {
            for digit in 0..=0xff {
                cpu.v[x] = digit;
                cpu.load_sprite(x);
                assert_eq!(cpu.i, 5 * (digit as u16 & 0xf));
                // the glyph is actually there
                let glyph = &mem::FONT[cpu.i as usize..cpu.i as usize + 5];
                assert_eq!(glyph, &cpu.mem.as_slice()[cpu.i as usize..cpu.i as usize + 5]);
            }
        }
    }

    /// Fx33: BCD convert X into I`[0..3]`
    #[test]
    fn bcd_convert() {
        let (mut cpu, _) = setup_environment();
        cpu.i = 0x400;
        for x in 0..=0xf {
            for word in 0..=0xff {
                cpu.v[x] = word;
                cpu.bcd_convert(x);
                let digits = [cpu.mem.read(0x400u16), cpu.mem.read(0x401u16), cpu.mem.read(0x402u16)];
                assert_eq!(digits, [word / 100, word / 10 % 10, word % 10]);
                // I is untouched
                assert_eq!(cpu.i, 0x400);
            }
        }
    }

    /// Fx33: The ones digit of a BCD at the top of memory lands at 0x001
    #[test]
    fn bcd_wraps() {
        let (mut cpu, _) = setup_environment();
        cpu.i = 0xfff;
        cpu.v[0] = 123;
        cpu.bcd_convert(0);
        assert_eq!(cpu.mem.read(0xfffu16), 1);
        assert_eq!(cpu.mem.read(0x000u16), 2);
        assert_eq!(cpu.mem.read(0x001u16), 3);
    }

    /// Fx55: DMA Stor from registers 0..=X to I
    #[test]
    fn dma_store() {
        const DATA: &[u8] = b"ABCDEFGHIJKLMNOP";
        for len in 0..16 {
            let (mut cpu, _) = setup_environment();
            cpu.v.copy_from_slice(DATA);
            cpu.i = 0x400;

            cpu.store_dma(len);

            assert_eq!(&cpu.mem.as_slice()[0x400..=0x400 + len], &DATA[..=len]);
            assert_eq!(cpu.mem.read(0x401 + len), 0);
            assert_eq!(cpu.i as usize, 0x400 + len + 1);
        }
    }

    /// Fx65: DMA Load from I to registers 0..=X
    #[test]
    fn dma_load() {
        const DATA: &[u8] = b"ABCDEFGHIJKLMNOP";
        for len in 0..16 {
            let (mut cpu, _) = setup_environment();
            cpu.mem.load(0x400, DATA).unwrap();
            cpu.i = 0x400;

            cpu.load_dma(len);

            assert_eq!(&cpu.v[..=len], &DATA[..=len]);
            assert!(cpu.v[len + 1..].iter().all(|&v| v == 0));
            assert_eq!(cpu.i as usize, 0x400 + len + 1);
        }
    }

    /// Fx55, Fx65: With [Quirks::dma_inc] set, I doesn't move
    #[test]
    fn dma_quirk() {
        let (mut cpu, _) = setup_environment();
        cpu.flags.quirks.dma_inc = true;
        cpu.i = 0x400;
        cpu.store_dma(0xf);
        assert_eq!(cpu.i, 0x400);
        cpu.load_dma(0xf);
        assert_eq!(cpu.i, 0x400);
    }
}

mod behavior {
    use super::*;

    /// Timers count down on tick, never on cycle
    #[test]
    fn timers() {
        let (mut cpu, keys) = setup_environment();
        cpu.timers.set_delay(3);
        cpu.timers.set_sound(1);
        cpu.multistep(&keys, 100).unwrap();
        assert_eq!((cpu.delay(), cpu.sound()), (3, 1));
        cpu.tick_timers();
        assert_eq!((cpu.delay(), cpu.sound()), (2, 0));
        assert!(!cpu.sound_timer_active());
        cpu.tick_timers().tick_timers().tick_timers();
        assert_eq!((cpu.delay(), cpu.sound()), (0, 0));
    }

    /// A paused CPU doesn't fetch, and doesn't count cycles
    #[test]
    fn pause() {
        let (mut cpu, keys) = setup_environment();
        cpu.mem.load(0x200, &[0x60, 0x01]).unwrap();
        cpu.flags.pause();
        cpu.multistep(&keys, 10).unwrap();
        assert_eq!((cpu.pc, cpu.cycle, cpu.v[0]), (0x200, 0, 0));
    }

    /// The fetch of pc+1 wraps to address 0
    #[test]
    fn fetch_wraps() {
        let (mut cpu, keys) = setup_environment();
        cpu.mem.write(0xfffu16, 0x00);
        // address 0 holds 0xf0, the top of the '0' glyph: 00f0 is a sys call
        cpu.pc = 0xfff;
        cpu.cycle(&keys).expect("0x00f0 is a no-op");
        assert_eq!(cpu.pc, 0x1001);
    }

    /// Reset zeroes the machine state but keeps memory and quirks
    #[test]
    fn reset() {
        let (mut cpu, keys) = setup_environment();
        cpu.mem.load(0x200, &[0x6a, 0x42, 0x22, 0x00]).unwrap();
        cpu.flags.quirks.bin_ops = true;
        cpu.multistep(&keys, 3).unwrap();
        cpu.reset();
        assert_eq!(cpu.pc, 0x200);
        assert_eq!(cpu.v, [0; 16]);
        assert!(cpu.stack.is_empty());
        assert_eq!(cpu.cycle, 0);
        assert!(cpu.flags.quirks.bin_ops);
        assert_eq!(cpu.mem.read_word(0x200u16), 0x6a42);
    }

    /// Loading a program that doesn't fit changes nothing
    #[test]
    fn load_too_large() {
        let (mut cpu, _) = setup_environment();
        cpu.v[0] = 0x55;
        let before = cpu.clone();
        let err = cpu
            .load_program(&[0xff; 0xe01])
            .expect_err("0xe01 bytes don't fit in 0xe00");
        assert!(matches!(
            err,
            Error::ProgramTooLarge { len: 0xe01, addr: 0x200, capacity: 0xe00 }
        ));
        assert_eq!(cpu, before);
        // but exactly 0xe00 does
        cpu.load_program(&[0xff; 0xe00]).unwrap();
        assert_eq!(cpu.mem.read(0xfffu16), 0xff);
    }

    /// Loading a new program clears the old one, and revives a halted CPU
    #[test]
    fn load_program_resets() {
        let (mut cpu, keys) = setup_environment();
        cpu.mem.load(0x200, &[0x00, 0xee, 0x12, 0x34]).unwrap();
        cpu.cycle(&keys).unwrap_err();
        assert!(cpu.halted);

        cpu.load_program(&[0x60, 0x07]).unwrap();
        assert!(!cpu.halted);
        assert_eq!(cpu.mem.read_word(0x202u16), 0);
        assert_eq!(cpu.mem.get_region(Region::Charset), &mem::FONT[..]);
        cpu.cycle(&keys).unwrap();
        assert_eq!(cpu.v[0], 7);
    }
}

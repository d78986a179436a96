// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! vip8: runs a Chip-8 program headless, then prints the screen

use gumdrop::*;
use owo_colors::OwoColorize;
use std::{
    path::PathBuf,
    thread::sleep,
    time::{Duration, Instant},
};
use vip8::*;

/// Parses a hexadecimal string into a u16
fn parse_hex(value: &str) -> std::result::Result<u16, std::num::ParseIntError> {
    u16::from_str_radix(value, 16)
}

#[derive(Clone, Debug, PartialEq, Eq, Options)]
struct Arguments {
    #[options(help = "Load a ROM to run on vip8.", required, free)]
    pub file: PathBuf,
    #[options(help = "Print this help message.")]
    help: bool,
    #[options(help = "Print each instruction as it executes.")]
    pub debug: bool,

    #[options(help = "Set the instructions-per-second rate.", default = "660", meta = "IPS")]
    pub speed: usize,
    #[options(help = "Run for this many 60Hz frames.", default = "60", meta = "N")]
    pub frames: usize,
    #[options(help = "Pace frames at 60Hz instead of running flat out.")]
    pub realtime: bool,

    #[options(help = "Run in (Chip8, Vip, SChip) mode.")]
    pub mode: Option<Mode>,

    #[options(no_short, help = "Width of the display buffer.", default = "64")]
    pub width: usize,
    #[options(no_short, help = "Height of the display buffer.", default = "32")]
    pub height: usize,
    #[options(
        help = "Load address, in hex (usually 200)",
        parse(try_from_str = "parse_hex"),
        meta = "ADR"
    )]
    pub load_addr: Option<u16>,

    #[options(
        short = "z",
        help = "Disable setting vF to 0 after a bitwise operation."
    )]
    pub bin_ops: bool,
    #[options(
        short = "v",
        help = "Use Cosmac VIP style bit-shifts, which read vY."
    )]
    pub shift_vy: bool,
    #[options(
        short = "c",
        help = "Use CHIP-48 style DMA instructions, which don't touch I."
    )]
    pub dma_inc: bool,
    #[options(
        short = "b",
        help = "Use SUPER-CHIP style indexed jump, which is indexed relative to v[adr]."
    )]
    pub jump_vx: bool,
}

impl Arguments {
    /// Builds a [Config] from the chosen mode, then applies individual quirk switches
    fn config(&self) -> Config {
        let mut quirks: Quirks = self.mode.unwrap_or_default().into();
        quirks.bin_ops |= self.bin_ops;
        quirks.shift_vy |= self.shift_vy;
        quirks.dma_inc |= self.dma_inc;
        quirks.jump_vx |= self.jump_vx;
        Config {
            instructions_per_second: self.speed,
            width: self.width,
            height: self.height,
            quirks,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let options = Arguments::parse_args_default_or_exit();
    let config = options.config();
    log::info!("{config:?}");

    let rom = std::fs::read(&options.file)?;
    let mut ch8 = Chip8::new(config);
    ch8.cpu.flags.debug = options.debug;
    ch8.load_at(&rom, options.load_addr.unwrap_or(PROGRAM_ADDR))?;
    log::info!("loaded {} bytes from {}", rom.len(), options.file.display());

    let frame_time = Duration::from_secs(1) / config.timer_hz.max(1) as u32;
    let started = Instant::now();
    for frame in 0..options.frames {
        let ft = Instant::now();
        if let Err(e) = ch8.frame() {
            eprintln!("{}", e.bold().red());
            break;
        }
        if ch8.sound_timer_active() {
            log::debug!("frame {frame}: beep");
        }
        if options.realtime {
            sleep(frame_time.saturating_sub(ft.elapsed()));
        }
    }
    log::info!(
        "ran {} cycles in {:?}",
        ch8.cpu.cycle_count(),
        started.elapsed()
    );

    print!("{}", ch8.screen());
    ch8.cpu.dump();
    Ok(())
}

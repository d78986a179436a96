// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! vip8-disasm: prints a linear disassembly of a Chip-8 ROM

use gumdrop::*;
use owo_colors::OwoColorize;
use std::{fs::read, path::PathBuf};
use vip8::*;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Options, Hash)]
struct Arguments {
    #[options(help = "Show help text")]
    help: bool,
    #[options(help = "Load a ROM to disassemble", free, required)]
    pub file: PathBuf,
    #[options(help = "Load address (usually 200)", parse(try_from_str = "parse_hex"))]
    pub loadaddr: Option<u16>,
    #[options(help = "Start disassembling at offset...")]
    pub offset: usize,
    #[options(help = "Print without color")]
    pub plain: bool,
}

fn parse_hex(value: &str) -> std::result::Result<u16, std::num::ParseIntError> {
    u16::from_str_radix(value, 16)
}

fn main() -> Result<()> {
    env_logger::init();
    let options = Arguments::parse_args_default_or_exit();
    let contents = &read(&options.file)?;
    let disassembler = if options.plain {
        Dis::plain()
    } else {
        Dis::default()
    };
    let base = options.loadaddr.unwrap_or(PROGRAM_ADDR) as usize + options.offset;
    let body = contents.get(options.offset..).unwrap_or_default();
    for (addr, insn) in body.chunks(2).enumerate() {
        // an odd trailing byte is padded out with zero
        let insn = u16::from_be_bytes([insn[0], insn.get(1).copied().unwrap_or_default()]);
        println!(
            "{}",
            format_args!(
                "{:03x}: {} {:04x}",
                2 * addr + base,
                disassembler.once(insn),
                insn.bright_black(),
            )
        );
    }
    Ok(())
}

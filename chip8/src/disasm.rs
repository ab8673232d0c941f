//! Disassembler.
use std::fmt::{self, Display, Formatter, Write as FmtWrite};

use crate::{bytecode::*, constants::MEM_START};

/// Human readable rendering of a single instruction word.
///
/// Words outside the instruction set are rendered as data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mnemonic(pub u16);

impl Display for Mnemonic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let instr = self.0;
        let (vx, vy, n) = op_xyn(instr);
        let nn = op_nn(instr);
        let nnn = op_nnn(instr);

        match op_code(instr) {
            0x0 => match nn {
                0xE0 => write!(f, "CLS"),
                0xEE => write!(f, "RET"),
                _ => self.data(f),
            },
            0x1 => write!(f, "JP 0x{nnn:03X}"),
            0x2 => write!(f, "CALL 0x{nnn:03X}"),
            0x3 => write!(f, "SE V{vx:X}, 0x{nn:02X}"),
            0x4 => write!(f, "SNE V{vx:X}, 0x{nn:02X}"),
            0x5 => write!(f, "SE V{vx:X}, V{vy:X}"),
            0x6 => write!(f, "LD V{vx:X}, 0x{nn:02X}"),
            0x7 => write!(f, "ADD V{vx:X}, 0x{nn:02X}"),
            0x8 => match n {
                0x0 => write!(f, "LD V{vx:X}, V{vy:X}"),
                0x1 => write!(f, "OR V{vx:X}, V{vy:X}"),
                0x2 => write!(f, "AND V{vx:X}, V{vy:X}"),
                0x3 => write!(f, "XOR V{vx:X}, V{vy:X}"),
                0x4 => write!(f, "ADD V{vx:X}, V{vy:X}"),
                0x5 => write!(f, "SUB V{vx:X}, V{vy:X}"),
                0x6 => write!(f, "SHR V{vx:X}"),
                0x7 => write!(f, "SUBN V{vx:X}, V{vy:X}"),
                0xE => write!(f, "SHL V{vx:X}"),
                _ => self.data(f),
            },
            0x9 => write!(f, "SNE V{vx:X}, V{vy:X}"),
            0xA => write!(f, "LD I, 0x{nnn:03X}"),
            0xB => write!(f, "JP V0, 0x{nnn:03X}"),
            0xC => write!(f, "RND V{vx:X}, 0x{nn:02X}"),
            0xD => write!(f, "DRW V{vx:X}, V{vy:X}, {n}"),
            0xE => match nn {
                0x9E => write!(f, "SKP V{vx:X}"),
                0xA1 => write!(f, "SKNP V{vx:X}"),
                _ => self.data(f),
            },
            0xF => match nn {
                0x07 => write!(f, "LD V{vx:X}, DT"),
                0x0A => write!(f, "LD V{vx:X}, K"),
                0x15 => write!(f, "LD DT, V{vx:X}"),
                0x18 => write!(f, "LD ST, V{vx:X}"),
                0x1E => write!(f, "ADD I, V{vx:X}"),
                0x29 => write!(f, "LD F, V{vx:X}"),
                0x33 => write!(f, "LD B, V{vx:X}"),
                0x55 => write!(f, "LD [I], V{vx:X}"),
                0x65 => write!(f, "LD V{vx:X}, [I]"),
                _ => self.data(f),
            },
            _ => self.data(f),
        }
    }
}

impl Mnemonic {
    fn data(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DATA 0x{:04X}", self.0)
    }
}

/// Lists a program image as it would be laid out in memory.
pub struct Disassembler<'a> {
    bytecode: &'a [u8],
}

impl<'a> Disassembler<'a> {
    pub fn new(bytecode: &'a [u8]) -> Self {
        Self { bytecode }
    }

    /// Write every instruction, one per line, prefixed with its load address.
    ///
    /// A trailing odd byte is padded with zero.
    pub fn disassemble<W: FmtWrite>(&self, w: &mut W) -> fmt::Result {
        for (i, chunk) in self.bytecode.chunks(2).enumerate() {
            let a = chunk[0];
            let b = chunk.get(1).copied().unwrap_or(0);
            let instr = instr_word(a, b);
            let address = MEM_START + i * 2;
            writeln!(w, "{address:04X}: {instr:04X}  {}", Mnemonic(instr))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mnemonics() {
        let cases = [
            (0x00E0, "CLS"),
            (0x00EE, "RET"),
            (0x1200, "JP 0x200"),
            (0x2ABC, "CALL 0xABC"),
            (0x3A2A, "SE VA, 0x2A"),
            (0x5120, "SE V1, V2"),
            (0x8AB4, "ADD VA, VB"),
            (0x8A0E, "SHL VA"),
            (0xB123, "JP V0, 0x123"),
            (0xD015, "DRW V0, V1, 5"),
            (0xE29E, "SKP V2"),
            (0xF30A, "LD V3, K"),
            (0xFF65, "LD VF, [I]"),
            (0x0123, "DATA 0x0123"),
            (0x5121, "SE V1, V2"),
            (0x91A3, "SNE V1, VA"),
            (0x03EE, "RET"),
            (0x0A00, "DATA 0x0A00"),
            (0x800F, "DATA 0x800F"),
            (0xF1FF, "DATA 0xF1FF"),
        ];

        for (instr, expected) in cases {
            assert_eq!(Mnemonic(instr).to_string(), expected);
        }
    }

    #[test]
    fn test_disassemble_listing() {
        let mut buf = String::new();
        Disassembler::new(&[0x00, 0xE0, 0x12, 0x00, 0xAB])
            .disassemble(&mut buf)
            .unwrap();

        assert_eq!(
            buf,
            "0200: 00E0  CLS\n0202: 1200  JP 0x200\n0204: AB00  LD I, 0xB00\n"
        );
    }
}

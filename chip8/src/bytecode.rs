//! Helpers for extracting data from instruction words.
//!
//! Each instruction is two bytes, stored big-endian. The opcode identity
//! is in the first 4-bit nibble, and the operands are packed in the rest.

/// Combine two bytes into an instruction word.
#[inline(always)]
pub fn instr_word(a: u8, b: u8) -> u16 {
    (a as u16) << 8 | b as u16
}

/// Extract the opcode family from the highest nibble.
#[inline(always)]
pub fn op_code(instr: u16) -> u8 {
    ((instr & 0xF000) >> 12) as u8
}

/// Extract operand NNN, the lowest 12 bits.
#[inline(always)]
pub fn op_nnn(instr: u16) -> u16 {
    instr & 0x0FFF
}

/// Extract operand NN (also known as KK), the lowest byte.
#[inline(always)]
pub fn op_nn(instr: u16) -> u8 {
    (instr & 0x00FF) as u8
}

/// Extract operand VX, the register index in the second nibble.
#[inline(always)]
pub fn op_x(instr: u16) -> u8 {
    ((instr & 0x0F00) >> 8) as u8
}

/// Extract operand VY, the register index in the third nibble.
#[inline(always)]
pub fn op_y(instr: u16) -> u8 {
    ((instr & 0x00F0) >> 4) as u8
}

/// Extract operand N, the lowest nibble.
#[inline(always)]
pub fn op_n(instr: u16) -> u8 {
    (instr & 0x000F) as u8
}

/// Extract operands VX and NN.
#[inline(always)]
pub fn op_xnn(instr: u16) -> (u8, u8) {
    (op_x(instr), op_nn(instr))
}

/// Extract operands VX and VY. The lowest nibble is ignored.
#[inline(always)]
pub fn op_xy(instr: u16) -> (u8, u8) {
    (op_x(instr), op_y(instr))
}

/// Extract operands VX, VY and N.
#[inline(always)]
pub fn op_xyn(instr: u16) -> (u8, u8, u8) {
    (op_x(instr), op_y(instr), op_n(instr))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_operands() {
        let instr = instr_word(0xD1, 0x2F);
        assert_eq!(instr, 0xD12F);
        assert_eq!(op_code(instr), 0xD);
        assert_eq!(op_xyn(instr), (0x1, 0x2, 0xF));
        assert_eq!(op_nnn(instr), 0x12F);
        assert_eq!(op_xnn(instr), (0x1, 0x2F));
        assert_eq!(op_xy(0x8AB4), (0xA, 0xB));
    }
}

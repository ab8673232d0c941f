//! Bytecode interpreter.
//!
//! Executes one instruction at a time against a [`Chip8Cpu`]. Each
//! instruction is applied in full, or not at all when it can't be decoded.
use log::warn;
use rand::Rng;

use crate::{
    bytecode::*,
    constants::*,
    cpu::Chip8Cpu,
    error::{Chip8Error, Chip8Result},
    font::glyph_address,
};

/// Hint returned to the caller describing what the last instruction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Ok,
    /// Program counter has jumped to a new address.
    ///
    /// This is useful for the caller to avoid being
    /// blocked on infinite or long running loops.
    ///
    /// This is returned when the interpreter encounters:
    ///
    /// - 00EE (`RET`)
    /// - 1nnn (`JP addr`)
    /// - 2nnn (`CALL addr`)
    /// - Bnnn (`JP V0, addr`)
    Jump,
    /// The display buffer was changed by `CLS` or `DRW`.
    Draw,
    /// The sound timer was set.
    Sound,
    /// Wait for a keypress.
    ///
    /// This is triggered by the opcode `Fx0A` (`LD Vx, K`), which stops
    /// execution until a key is pressed, and loads the key value into `Vx`.
    KeyWait,
}

/// Fetch, decode and execute the instruction at the program counter.
pub fn step<R: Rng>(cpu: &mut Chip8Cpu, rng: &mut R) -> Chip8Result<Flow> {
    let instr = cpu.instr();
    op_trace(cpu.pc, instr);

    let result = exec(cpu, rng, instr);
    if let Err(ref err) = result {
        warn!("{err}");
    }
    result
}

fn exec<R: Rng>(cpu: &mut Chip8Cpu, rng: &mut R, instr: u16) -> Chip8Result<Flow> {
    let mut control_flow = Flow::Ok;

    match op_code(instr) {
        // 00E0 (CLS) and 00EE (RET)
        0x0 => control_flow = exec_sys(cpu, instr)?,
        // 1NNN (JP addr)
        //
        // Jump to address.
        0x1 => {
            cpu.pc = op_nnn(instr);
            control_flow = Flow::Jump;
        }
        // 2NNN (CALL addr)
        //
        // Call subroutine at NNN.
        // The current address is saved, and `RET` skips past it.
        0x2 => {
            cpu.push_return(cpu.pc)?;
            cpu.pc = op_nnn(instr);
            control_flow = Flow::Jump;
        }
        // 3XNN (SE Vx, byte)
        //
        // Skip the next instruction if register VX equals value NN.
        0x3 => {
            let (vx, nn) = op_xnn(instr);
            let cond = cpu.registers[vx as usize] == nn;
            skip_if(cpu, cond);
        }
        // 4XNN (SNE Vx, byte)
        //
        // Skip the next instruction if register VX does not equal value NN.
        0x4 => {
            let (vx, nn) = op_xnn(instr);
            let cond = cpu.registers[vx as usize] != nn;
            skip_if(cpu, cond);
        }
        // 5XY0 (SE Vx, Vy)
        //
        // Skip the next instruction if register VX equals value VY.
        // The lowest nibble is not decoded.
        0x5 => {
            let (vx, vy) = op_xy(instr);
            let cond = cpu.registers[vx as usize] == cpu.registers[vy as usize];
            skip_if(cpu, cond);
        }
        // 6XNN (LD Vx, byte)
        //
        // Set register VX to value NN.
        0x6 => {
            let (vx, nn) = op_xnn(instr);
            cpu.registers[vx as usize] = nn;
            advance(cpu);
        }
        // 7XNN (ADD Vx, byte)
        //
        // Add value NN to register VX. Carry flag is not set.
        0x7 => {
            let (vx, nn) = op_xnn(instr);
            cpu.registers[vx as usize] = cpu.registers[vx as usize].wrapping_add(nn);
            advance(cpu);
        }
        // Arithmetic instructions indentified by n
        0x8 => exec_math(cpu, instr)?,
        // 9XY0 (SNE Vx, Vy)
        //
        // Skip next instruction if Vx != Vy.
        // The lowest nibble is not decoded.
        0x9 => {
            let (vx, vy) = op_xy(instr);
            let cond = cpu.registers[vx as usize] != cpu.registers[vy as usize];
            skip_if(cpu, cond);
        }
        // ANNN (LD I, addr)
        //
        // Set address register I to value NNN.
        0xA => {
            cpu.address = op_nnn(instr);
            advance(cpu);
        }
        // BNNN (JP V0, addr)
        //
        // Jump to address NNN offset by register V0.
        0xB => {
            cpu.pc = op_nnn(instr) + cpu.registers[0] as u16;
            control_flow = Flow::Jump;
        }
        // CXNN (RND Vx, byte)
        //
        // Set register VX to the result of bitwise AND between a random number and NN.
        0xC => {
            let (vx, nn) = op_xnn(instr);
            cpu.registers[vx as usize] = rng.gen::<u8>() & nn;
            advance(cpu);
        }
        // DXYN (DRW Vx, Vy, nibble)
        0xD => {
            draw(cpu, instr);
            advance(cpu);
            control_flow = Flow::Draw;
        }
        // Keyboard instructions identified by nn
        0xE => exec_keys(cpu, instr)?,
        // Miscellaneous instructions identified by nn
        0xF => control_flow = exec_misc(cpu, instr)?,
        // Unsupported operation.
        _ => return Err(unsupported(cpu, instr)),
    }

    Ok(control_flow)
}

/// Execute a system instruction
///
/// Only the lowest byte selects the instruction, so `0x0XE0` is still `CLS`.
#[inline]
fn exec_sys(cpu: &mut Chip8Cpu, instr: u16) -> Chip8Result<Flow> {
    match op_nn(instr) {
        // 00E0 (CLS)
        //
        // Clear display
        0xE0 => {
            cpu.clear_display();
            advance(cpu);
            Ok(Flow::Draw)
        }
        // 00EE (RET)
        //
        // Return from a subroutine.
        // Pop the address of the calling instruction, and continue after it.
        0xEE => {
            cpu.pc = cpu.pop_return()?;
            advance(cpu);
            Ok(Flow::Jump)
        }
        // 0NNN (SYS addr) would call machine code on the original hardware.
        _ => Err(unsupported(cpu, instr)),
    }
}

/// Execute an arithmetic instruction
#[inline]
fn exec_math(cpu: &mut Chip8Cpu, instr: u16) -> Chip8Result<()> {
    let (vx, vy, n) = op_xyn(instr);
    let (x, y) = (cpu.registers[vx as usize], cpu.registers[vy as usize]);

    match n {
        // 8XY0 (LD Vx, Vy)
        //
        // Store the value of register VY in register VX.
        0x0 => cpu.registers[vx as usize] = y,
        // 8XY1 (OR Vx, Vy)
        0x1 => cpu.registers[vx as usize] = x | y,
        // 8XY2 (AND Vx, Vy)
        0x2 => cpu.registers[vx as usize] = x & y,
        // 8XY3 (XOR Vx, Vy)
        0x3 => cpu.registers[vx as usize] = x ^ y,
        // 8XY4 (ADD Vx, Vy)
        //
        // ADDs VY to VX, and stores the result in VX.
        // Overflow is wrapped.
        // If overflow, set VF to 1, else 0.
        0x4 => {
            let (result, carry) = x.overflowing_add(y);
            cpu.registers[vx as usize] = result;
            cpu.registers[FLAG_REGISTER] = carry as u8;
        }
        // 8XY5 (SUB Vx, Vy)
        //
        // Subtracts VY from VX, and stores the result in VX.
        // VF is set to 0 when there is a borrow, set to 1 when there isn't.
        0x5 => {
            cpu.registers[vx as usize] = x.wrapping_sub(y);
            cpu.registers[FLAG_REGISTER] = (x >= y) as u8;
        }
        // 8XY6 (SHR Vx)
        //
        // VF is set to the least-significant bit of Vx, then VX is shifted right by 1.
        // VY is unused.
        0x6 => {
            cpu.registers[vx as usize] = x >> 1;
            cpu.registers[FLAG_REGISTER] = x & 1;
        }
        // 8XY7 (SUBN Vx, Vy)
        //
        // Subtracts VX from VY, and stores the result in VX.
        // VF is set to 0 when there is a borrow, set to 1 when there isn't.
        0x7 => {
            cpu.registers[vx as usize] = y.wrapping_sub(x);
            cpu.registers[FLAG_REGISTER] = (y >= x) as u8;
        }
        // 8XYE (SHL Vx)
        //
        // VF is set to the most-significant bit of Vx, then VX is shifted left by 1.
        // VY is unused.
        0xE => {
            cpu.registers[vx as usize] = x << 1;
            cpu.registers[FLAG_REGISTER] = x >> 7;
        }
        // Unsupported operation.
        _ => return Err(unsupported(cpu, instr)),
    }

    advance(cpu);
    Ok(())
}

/// Execute a keyboard instruction
#[inline]
fn exec_keys(cpu: &mut Chip8Cpu, instr: u16) -> Chip8Result<()> {
    let (vx, nn) = op_xnn(instr);
    let pressed = cpu.key_state(cpu.registers[vx as usize]);

    match nn {
        // Ex9E (SKP Vx)
        //
        // Skip next instruction if the key with the value of Vx is pressed.
        0x9E => skip_if(cpu, pressed),
        // ExA1 (SKNP Vx)
        //
        // Skip next instruction if the key with the value of Vx is not pressed.
        0xA1 => skip_if(cpu, !pressed),
        _ => return Err(unsupported(cpu, instr)),
    }

    Ok(())
}

/// Execute a miscellaneous instruction
#[inline]
fn exec_misc(cpu: &mut Chip8Cpu, instr: u16) -> Chip8Result<Flow> {
    let (vx, nn) = op_xnn(instr);
    let mut control_flow = Flow::Ok;

    match nn {
        // Fx07 (LD Vx, DT)
        //
        // Set Vx = delay timer value.
        0x07 => cpu.registers[vx as usize] = cpu.delay_timer,
        // Fx0A (LD Vx, K)
        //
        // Wait for a key press, store the value of the key in Vx.
        // The program counter stays put until a key is held down,
        // so the instruction is fetched again on the next step.
        0x0A => match cpu.first_key() {
            Some(k) => cpu.registers[vx as usize] = k,
            None => return Ok(Flow::KeyWait),
        },
        // Fx15 (LD DT, Vx)
        //
        // Set delay timer = Vx.
        0x15 => cpu.delay_timer = cpu.registers[vx as usize],
        // Fx18 (LD ST, Vx)
        //
        // Set sound timer = Vx.
        0x18 => {
            cpu.sound_timer = cpu.registers[vx as usize];
            control_flow = Flow::Sound;
        }
        // Fx1E (ADD I, Vx)
        //
        // Add Vx to I. VF is not affected.
        0x1E => {
            let x = cpu.registers[vx as usize] as u16;
            cpu.address = cpu.address.wrapping_add(x);
        }
        // Fx29 (LD F, Vx)
        //
        // Set I = location of sprite for digit Vx.
        0x29 => cpu.address = glyph_address(cpu.registers[vx as usize]),
        // Fx33 (LD B, Vx)
        //
        // Store the binary-coded decimal representation of Vx
        // in the memory locations I, I+1, and I+2.
        #[rustfmt::skip]
        0x33 => {
            let x = cpu.registers[vx as usize];
            cpu.write_indexed(0, x / 100);
            cpu.write_indexed(1, x / 10  % 10);
            cpu.write_indexed(2, x       % 10);
        }
        // Fx55 (LD [I], Vx)
        //
        // Store registers V0 through Vx in memory starting at location I.
        // I itself is left unchanged.
        0x55 => {
            for v in 0..=vx as usize {
                cpu.write_indexed(v, cpu.registers[v]);
            }
        }
        // Fx65 (LD Vx, [I])
        //
        // Read registers V0 through Vx from memory starting at location I.
        // I itself is left unchanged.
        0x65 => {
            for v in 0..=vx as usize {
                cpu.registers[v] = cpu.read_indexed(v);
            }
        }
        // Unsupported operation.
        _ => return Err(unsupported(cpu, instr)),
    }

    advance(cpu);
    Ok(control_flow)
}

/// Draw sprite to the display buffer, at coordinate as per registers Vx and Vy.
///
/// Sprite is encoded as 8 pixels wide, N pixels high, stored in bits located in
/// memory pointed to by address register I.
///
/// Pixels that fall past the right or bottom edge are clipped, not wrapped.
///
/// If the drawing operation erases existing pixels in the display buffer, register VF is set to
/// 1, and set to 0 if no display bits are unset. This is used for collision detection.
fn draw(cpu: &mut Chip8Cpu, instr: u16) {
    let (vx, vy, n) = op_xyn(instr);
    let (x, y) = (
        cpu.registers[vx as usize] as usize,
        cpu.registers[vy as usize] as usize,
    );
    let mut is_erased = false;

    for r in 0..n as usize {
        if y + r >= DISPLAY_HEIGHT {
            break;
        }
        let row = cpu.read_indexed(r);

        // Each row is 8 bits representing the 8 pixels of the sprite.
        for c in 0..SPRITE_WIDTH {
            if x + c >= DISPLAY_WIDTH {
                break;
            }
            if (row >> (7 - c)) & 1 == 0 {
                continue;
            }

            let d = (x + c) + (y + r) * DISPLAY_WIDTH;

            // XOR erases a pixel when both the old and new values are both 1.
            is_erased |= cpu.display[d] == PIXEL_ON;
            cpu.display[d] ^= PIXEL_ON;
        }
    }

    // If a pixel was erased, then a collision occurred.
    cpu.registers[FLAG_REGISTER] = is_erased as u8;
}

/// Move to the next instruction.
#[inline(always)]
fn advance(cpu: &mut Chip8Cpu) {
    cpu.pc = cpu.pc.wrapping_add(2);
}

/// Move to the next instruction, skipping over it when the condition holds.
#[inline(always)]
fn skip_if(cpu: &mut Chip8Cpu, cond: bool) {
    cpu.pc = cpu.pc.wrapping_add(if cond { 4 } else { 2 });
}

#[cold]
fn unsupported(cpu: &Chip8Cpu, instr: u16) -> Chip8Error {
    Chip8Error::UnsupportedOpcode {
        opcode: instr,
        pc: cpu.pc,
    }
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace(pc: Address, instr: u16) {
    log::trace!("{:04X}: {}", pc, crate::disasm::Mnemonic(instr));
}

#[cfg(not(feature = "op_trace"))]
#[inline]
fn op_trace(_: Address, _: u16) {}

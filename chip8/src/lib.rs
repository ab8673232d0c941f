//! Interpreter for the Chip-8 virtual machine.
//!
//! The [`Chip8Vm`](prelude::Chip8Vm) owns the machine state and exposes the
//! three operations a host needs: load a program, execute one instruction,
//! and count the timers down by one frame. Hosts read the display buffer and
//! sound timer, and write the keypad state.
mod bytecode;
mod clock;
pub mod constants;
mod cpu;
pub mod disasm;
mod devices;
mod error;
pub mod font;
mod interp;
mod vm;

pub use self::{
    clock::Clock,
    devices::{Devices, InvalidKeyCode, KeyCode},
    error::{Chip8Error, Chip8Result},
    interp::{step, Flow},
    vm::Hz,
};

/// Version of this implementation.
pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod prelude {
    pub use super::{
        cpu::Chip8Cpu,
        devices::{Devices, KeyCode},
        disasm::{Disassembler, Mnemonic},
        error::{Chip8Error, Chip8Result},
        interp::Flow,
        vm::{Chip8Conf, Chip8Vm, Hz},
    };
}

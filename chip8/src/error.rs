//! Result and errors.
use std::{
    fmt::{self, Display, Formatter},
    io,
    path::PathBuf,
};

use crate::constants::*;

pub type Chip8Result<T> = std::result::Result<T, Chip8Error>;

#[derive(Debug)]
pub enum Chip8Error {
    /// Reading the program image failed.
    Io(io::Error),
    /// The program file at the given path could not be read.
    Load { path: PathBuf, source: io::Error },
    /// Attempt to load a bytecode program that can't fit in memory.
    ///
    /// Programs read from a stream stop at the first byte over the limit,
    /// so `size` is a lower bound for them.
    LargeProgram { size: usize },
    /// The fetched instruction is not part of the instruction set.
    UnsupportedOpcode { opcode: u16, pc: Address },
    /// `CALL` was executed with every stack slot occupied.
    StackOverflow { pc: Address },
    /// `RET` was executed with an empty call stack.
    StackUnderflow { pc: Address },
    Fmt(fmt::Error),
}

impl Chip8Error {
    /// True for errors raised while loading a program, before any execution.
    pub fn is_load_fault(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Load { .. } | Self::LargeProgram { .. }
        )
    }

    /// True for errors raised by the interpreter while decoding an instruction.
    pub fn is_decode_fault(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedOpcode { .. } | Self::StackOverflow { .. } | Self::StackUnderflow { .. }
        )
    }

    /// The raw instruction word that caused a decode fault, if known.
    pub fn opcode(&self) -> Option<u16> {
        match self {
            Self::UnsupportedOpcode { opcode, .. } => Some(*opcode),
            _ => None,
        }
    }
}

impl Display for Chip8Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read program: {err}"),
            Self::Load { path, source } => {
                write!(f, "could not open program file {}: {source}", path.display())
            }
            Self::LargeProgram { size } => write!(
                f,
                "program too large for VM memory: {size} bytes, maximum is {MAX_PROGRAM_SIZE}"
            ),
            Self::UnsupportedOpcode { opcode, pc } => {
                write!(f, "unsupported opcode: 0x{opcode:04X} at 0x{pc:03X}")
            }
            Self::StackOverflow { pc } => write!(
                f,
                "call stack overflow at 0x{pc:03X}: more than {STACK_SIZE} levels of nesting"
            ),
            Self::StackUnderflow { pc } => {
                write!(f, "call stack underflow at 0x{pc:03X}: return without call")
            }
            Self::Fmt(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Chip8Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Load { source, .. } => Some(source),
            Self::Fmt(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Chip8Error {
    fn from(err: io::Error) -> Self {
        Chip8Error::Io(err)
    }
}

impl From<fmt::Error> for Chip8Error {
    fn from(err: fmt::Error) -> Self {
        Chip8Error::Fmt(err)
    }
}

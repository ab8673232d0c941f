//! Virtual machine.
use std::{
    fmt::{self, Write},
    fs,
    io::Read,
    path::Path,
    time::Duration,
};

use log::debug;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    constants::*,
    cpu::Chip8Cpu,
    devices::{Devices, KeyCode},
    error::{Chip8Error, Chip8Result},
    interp::{self, Flow},
};

pub struct Chip8Vm {
    cpu: Chip8Cpu,
    rng: StdRng,
    conf: Chip8Conf,
}

/// VM Configuration Parameters.
#[derive(Debug, Clone)]
pub struct Chip8Conf {
    /// Number of instructions executed per second.
    pub clock_frequency: Hz,
    /// Number of frames per second. Timers count down once per frame.
    pub refresh_rate: Hz,
    /// Fixed seed for the `RND` instruction. Seeded from the OS when `None`.
    pub rng_seed: Option<u64>,
}

impl Default for Chip8Conf {
    fn default() -> Self {
        Self {
            clock_frequency: Hz(CLOCK_FREQUENCY),
            refresh_rate: Hz(REFRESH_RATE),
            rng_seed: None,
        }
    }
}

impl Chip8Conf {
    /// Number of instructions executed in each frame.
    ///
    /// At least one instruction runs per frame, so a misconfigured
    /// clock can't stall the machine.
    pub fn cycles_per_frame(&self) -> usize {
        match self.refresh_rate.0 {
            0 => 1,
            refresh => (self.clock_frequency.0 / refresh).max(1) as usize,
        }
    }

    /// Duration of a single frame.
    pub fn frame_interval(&self) -> Duration {
        self.refresh_rate.into()
    }
}

/// Frequency in hertz (per second)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Hz(pub u64);

impl From<Hz> for Duration {
    fn from(freq: Hz) -> Self {
        if freq.0 == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(NANOS_IN_SECOND / freq.0)
        }
    }
}

impl Chip8Vm {
    pub fn new(conf: Chip8Conf) -> Self {
        Chip8Vm {
            cpu: Chip8Cpu::new(),
            rng: Self::seed_rng(&conf),
            conf,
        }
    }

    fn seed_rng(conf: &Chip8Conf) -> StdRng {
        match conf.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Configuration that was used to instantiate the VM.
    pub fn config(&self) -> &Chip8Conf {
        &self.conf
    }

    /// Logical size of the display, as width and height in pixels.
    pub fn dimensions() -> (usize, usize) {
        (DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }

    /// Replace the machine state with a fresh one running the given program.
    pub fn load_bytecode(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        self.cpu.load_program(bytecode)?;
        self.rng = Self::seed_rng(&self.conf);

        debug!("loaded program: {} bytes", bytecode.len());

        Ok(())
    }

    /// Read a program image to its end, and load it.
    ///
    /// Reading stops one byte past the largest program, so an oversized
    /// source is reported with a size of `MAX_PROGRAM_SIZE + 1`.
    pub fn load_reader(&mut self, reader: impl Read) -> Chip8Result<()> {
        let mut bytecode = Vec::with_capacity(MAX_PROGRAM_SIZE + 1);
        reader
            .take(MAX_PROGRAM_SIZE as u64 + 1)
            .read_to_end(&mut bytecode)?;

        if bytecode.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::LargeProgram {
                size: bytecode.len(),
            });
        }

        self.load_bytecode(&bytecode)
    }

    /// Load the program image stored in the file at the given path.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Chip8Result<()> {
        let path = path.as_ref();
        let bytecode = fs::read(path).map_err(|source| Chip8Error::Load {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("read program file {}", path.display());

        self.load_bytecode(&bytecode)
    }

    pub fn cpu(&self) -> &Chip8Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Chip8Cpu {
        &mut self.cpu
    }

    pub fn display_buffer(&self) -> &DisplayBuffer {
        self.cpu.display()
    }

    pub fn sound_timer(&self) -> u8 {
        self.cpu.sound_timer()
    }

    pub fn delay_timer(&self) -> u8 {
        self.cpu.delay_timer()
    }

    /// Whether the host should be playing a tone.
    pub fn is_buzzing(&self) -> bool {
        self.cpu.sound_timer() > 0
    }
}

/// Interpreter
impl Chip8Vm {
    /// Writable keypad state, indexed by key value.
    pub fn keypad_mut(&mut self) -> &mut Keypad {
        self.cpu.keypad_mut()
    }

    /// Sets the keyboard key input state.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        self.cpu.set_key_state(key.as_u8(), pressed);
    }

    /// Clear the keyboard input state, setting all keys to up.
    pub fn clear_keys(&mut self) {
        self.cpu.clear_keys()
    }

    /// Execute a single instruction.
    ///
    /// On error the machine is left as it was before the instruction was fetched.
    pub fn step(&mut self) -> Chip8Result<Flow> {
        interp::step(&mut self.cpu, &mut self.rng)
    }

    /// Count down the delay and sound timers by one frame.
    pub fn tick_timers(&mut self) {
        self.cpu.tick_timers();
    }

    /// Execute up to `step_count` instructions, stopping at the first error.
    ///
    /// Returns the control flow of the last executed instruction.
    pub fn run_steps(&mut self, step_count: usize) -> Chip8Result<Flow> {
        let mut control_flow = Flow::Ok;

        for _ in 0..step_count {
            control_flow = self.step()?;
        }

        Ok(control_flow)
    }

    /// Run one frame of the host loop.
    ///
    /// Input is polled, a frame's worth of instructions is executed, the
    /// display is handed to the renderer, and finally the timers count down
    /// and the buzzer is updated.
    pub fn run_frame(&mut self, devices: &mut impl Devices) -> Chip8Result<()> {
        devices.poll_input(self.cpu.keypad_mut());

        self.run_steps(self.conf.cycles_per_frame())?;

        devices.render(self.cpu.display());

        self.tick_timers();
        devices.buzz(self.is_buzzing());

        Ok(())
    }
}

/// Troubleshooting
impl Chip8Vm {
    /// Returns the contents of the program memory as a human readable string.
    pub fn dump_ram(&self, count: usize) -> Result<String, fmt::Error> {
        let ram = self.cpu.ram();
        let iter = ram
            .iter()
            .enumerate()
            .skip(MEM_START)
            .take(count)
            .step_by(2);
        let mut buf = String::new();

        for (i, op) in iter {
            let next = ram[(i + 1) & ADDRESS_MASK];
            writeln!(buf, "{:04X}: {:02X}{:02X}", i, op, next)?;
        }

        Ok(buf)
    }

    pub fn dump_display(&self) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        for y in 0..DISPLAY_HEIGHT {
            for x in 0..DISPLAY_WIDTH {
                if self.cpu.pixel(x, y) {
                    write!(buf, "#")?;
                } else {
                    write!(buf, ".")?;
                }
            }
            writeln!(buf)?;
        }

        Ok(buf)
    }

    pub fn dump_keys(&self) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        if self.cpu.any_key() {
            write!(buf, "keys:")?;
            for i in 0..KEY_COUNT {
                if self.cpu.key_state(i) {
                    write!(buf, " k{i:x}")?;
                }
            }
        }

        Ok(buf)
    }
}

//! CPU and memory state.
use crate::{
    bytecode::instr_word,
    constants::*,
    error::{Chip8Error, Chip8Result},
    font::{FONTSET, FONTSET_DATA_LENGTH, FONTSET_START},
};

/// Core state for a chip8 interpreter.
///
/// Everything the interpreter mutates lives here, so a single instruction
/// can be tested by building a state, stepping it once and inspecting it.
#[derive(Clone)]
pub struct Chip8Cpu {
    // ------------------------------------------------------------------------
    // Registers
    /// Program counter pointing to the current position in the bytecode.
    pub(crate) pc: Address,
    /// Stack pointer, the number of occupied slots in `stack`.
    pub(crate) sp: usize,
    /// General purpose registers for temporary values.
    ///
    /// Register 16 (VF) is used for either the carry flag or borrow switch depending on opcode.
    pub(crate) registers: [u8; REGISTER_COUNT],
    /// Pointer register used for temporarily storing an address.
    pub(crate) address: Address,
    /// (DT) Delay timer that counts down to 0.
    pub(crate) delay_timer: u8,
    /// (ST) Sound timer that counts down to 0. When it has a non-zero value, a beep is played.
    pub(crate) sound_timer: u8,
    /// Keyboard input state, written by the host.
    pub(crate) keypad: Keypad,

    // ------------------------------------------------------------------------
    // Memory
    /// Main memory storage space.
    pub(crate) ram: Box<[u8; MEM_SIZE]>,
    /// Stack of return pointers used for jumping when a routine call finishes.
    pub(crate) stack: [Address; STACK_SIZE],
    /// Screen buffer that is drawn too.
    pub(crate) display: Box<DisplayBuffer>,
}

impl Default for Chip8Cpu {
    fn default() -> Self {
        Self {
            pc: MEM_START as Address,
            sp: 0,
            registers: [0; REGISTER_COUNT],
            address: 0,
            delay_timer: 0,
            sound_timer: 0,
            keypad: [false; KEY_COUNT as usize],

            ram: Box::new([0; MEM_SIZE]),
            stack: [0; STACK_SIZE],
            display: Box::new([PIXEL_OFF; DISPLAY_BUFFER_SIZE]),
        }
    }
}

impl Chip8Cpu {
    /// Creates a machine with the font installed and no program.
    pub fn new() -> Self {
        let mut cpu = Self::default();
        cpu.install_font();
        cpu
    }

    /// Creates a machine ready to execute the given program image.
    pub fn with_program(bytecode: &[u8]) -> Chip8Result<Self> {
        let mut cpu = Self::default();
        cpu.load_program(bytecode)?;
        Ok(cpu)
    }

    /// Reset all state and install the program at [`MEM_START`].
    ///
    /// The size is checked before anything is touched, so a rejected
    /// program leaves the current state intact.
    pub fn load_program(&mut self, bytecode: &[u8]) -> Chip8Result<()> {
        if bytecode.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::LargeProgram {
                size: bytecode.len(),
            });
        }

        // Start with clean memory to avoid leaking previous program.
        *self = Self::default();
        self.install_font();
        self.ram[MEM_START..MEM_START + bytecode.len()].copy_from_slice(bytecode);

        Ok(())
    }

    fn install_font(&mut self) {
        let start = FONTSET_START as usize;
        self.ram[start..start + FONTSET_DATA_LENGTH].copy_from_slice(&FONTSET);
    }

    pub fn pc(&self) -> Address {
        self.pc
    }

    /// Value of the address register I.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }

    pub fn ram(&self) -> &[u8; MEM_SIZE] {
        &self.ram
    }

    /// Occupied part of the call stack, oldest return address first.
    pub fn stack(&self) -> &[Address] {
        &self.stack[..self.sp]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn display(&self) -> &DisplayBuffer {
        &self.display
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    pub fn clear_display(&mut self) {
        self.display.fill(PIXEL_OFF);
    }

    /// Whether the pixel at the given coordinate is lit.
    ///
    /// Coordinates outside the display are never lit.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < DISPLAY_WIDTH && y < DISPLAY_HEIGHT && self.display[x + y * DISPLAY_WIDTH] == PIXEL_ON
    }

    pub fn set_key_state(&mut self, key_id: u8, state: bool) {
        if key_id < KEY_COUNT {
            self.keypad[key_id as usize] = state;
        }
    }

    /// Keys outside the keypad range are reported as released.
    pub fn key_state(&self, key_id: u8) -> bool {
        if key_id < KEY_COUNT {
            self.keypad[key_id as usize]
        } else {
            false
        }
    }

    /// Check whether any key is pressed down.
    #[inline(always)]
    pub fn any_key(&self) -> bool {
        self.keypad.iter().any(|pressed| *pressed)
    }

    /// Retrieve the value of the first key that is pressed down.
    #[inline]
    pub fn first_key(&self) -> Option<u8> {
        self.keypad
            .iter()
            .position(|pressed| *pressed)
            .map(|key_id| key_id as u8)
    }

    /// Clear the keyboard input state, setting all keys to up.
    #[inline(always)]
    pub fn clear_keys(&mut self) {
        self.keypad.fill(false);
    }

    /// Count down the delay timer.
    #[inline]
    pub fn tick_delay(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
    }

    /// Count down the sound timer.
    #[inline]
    pub fn tick_sound(&mut self) {
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Count down both timers by one frame.
    #[inline]
    pub fn tick_timers(&mut self) {
        self.tick_delay();
        self.tick_sound();
    }

    /// Extract the instruction word at the current program counter.
    #[inline(always)]
    pub fn instr(&self) -> u16 {
        let pc = self.pc as usize;
        instr_word(self.ram[pc & ADDRESS_MASK], self.ram[(pc + 1) & ADDRESS_MASK])
    }

    /// Read memory relative to the address register, wrapping at the end of memory.
    #[inline(always)]
    pub(crate) fn read_indexed(&self, offset: usize) -> u8 {
        self.ram[(self.address as usize + offset) & ADDRESS_MASK]
    }

    /// Write memory relative to the address register, wrapping at the end of memory.
    #[inline(always)]
    pub(crate) fn write_indexed(&mut self, offset: usize, value: u8) {
        self.ram[(self.address as usize + offset) & ADDRESS_MASK] = value;
    }

    /// Push a return address, failing when every slot is taken.
    pub(crate) fn push_return(&mut self, return_address: Address) -> Chip8Result<()> {
        if self.sp >= STACK_SIZE {
            return Err(Chip8Error::StackOverflow { pc: self.pc });
        }
        self.stack[self.sp] = return_address;
        self.sp += 1;
        Ok(())
    }

    /// Pop the most recent return address, failing when the stack is empty.
    pub(crate) fn pop_return(&mut self) -> Chip8Result<Address> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow { pc: self.pc });
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_state() {
        let mut cpu = Chip8Cpu::default();

        cpu.set_key_state(0, true);
        assert!(cpu.key_state(0));
        assert!(!cpu.key_state(1));
        assert!(!cpu.key_state(7));
        assert_eq!(cpu.first_key(), Some(0));

        cpu.set_key_state(7, true);
        cpu.set_key_state(0, false);
        assert!(!cpu.key_state(0));
        assert!(cpu.key_state(7));
        assert_eq!(cpu.first_key(), Some(7));

        cpu.set_key_state(15, true);
        assert!(cpu.key_state(15));
        assert_eq!(cpu.first_key(), Some(7));

        // Out of range keys are ignored.
        cpu.set_key_state(16, true);
        assert!(!cpu.key_state(16));
        assert!(!cpu.key_state(0xFF));

        cpu.clear_keys();
        assert!(!cpu.any_key());
        assert_eq!(cpu.first_key(), None);
    }

    #[test]
    fn test_load_program() {
        let cpu = Chip8Cpu::with_program(&[0x00, 0xE0, 0x12, 0x00]).unwrap();

        assert_eq!(cpu.pc(), 0x200);
        assert_eq!(cpu.address(), 0);
        assert_eq!(&cpu.ram()[..FONTSET_DATA_LENGTH], &FONTSET[..]);
        assert_eq!(&cpu.ram()[0x200..0x204], &[0x00, 0xE0, 0x12, 0x00]);
        assert!(cpu.ram()[0x204..].iter().all(|b| *b == 0));
        assert!(cpu.ram()[FONTSET_DATA_LENGTH..0x200].iter().all(|b| *b == 0));
        assert!(cpu.display().iter().all(|px| *px == PIXEL_OFF));
        assert!(cpu.stack().is_empty());
    }

    #[test]
    fn test_load_largest_program() {
        let program = vec![0xAB; MAX_PROGRAM_SIZE];
        let cpu = Chip8Cpu::with_program(&program).unwrap();
        assert_eq!(cpu.ram()[MEM_SIZE - 1], 0xAB);
    }

    #[test]
    fn test_load_too_large_keeps_state() {
        let mut cpu = Chip8Cpu::with_program(&[0x60, 0x01]).unwrap();
        cpu.registers[3] = 0x33;

        let program = vec![0; MAX_PROGRAM_SIZE + 1];
        match cpu.load_program(&program) {
            Err(Chip8Error::LargeProgram { size }) => assert_eq!(size, MAX_PROGRAM_SIZE + 1),
            other => panic!("expected large program error, got {other:?}"),
        }

        assert_eq!(cpu.registers[3], 0x33);
        assert_eq!(&cpu.ram()[0x200..0x202], &[0x60, 0x01]);
    }

    #[test]
    fn test_timers_floor_at_zero() {
        let mut cpu = Chip8Cpu::default();
        cpu.delay_timer = 2;
        cpu.sound_timer = 1;

        cpu.tick_timers();
        assert_eq!((cpu.delay_timer(), cpu.sound_timer()), (1, 0));
        cpu.tick_timers();
        assert_eq!((cpu.delay_timer(), cpu.sound_timer()), (0, 0));
        for _ in 0..10 {
            cpu.tick_timers();
        }
        assert_eq!((cpu.delay_timer(), cpu.sound_timer()), (0, 0));
    }

    #[test]
    fn test_stack_bounds() {
        let mut cpu = Chip8Cpu::default();
        assert!(matches!(
            cpu.pop_return(),
            Err(Chip8Error::StackUnderflow { .. })
        ));

        for i in 0..STACK_SIZE {
            cpu.push_return(0x200 + i as u16 * 2).unwrap();
        }
        assert!(matches!(
            cpu.push_return(0x300),
            Err(Chip8Error::StackOverflow { .. })
        ));
        assert_eq!(cpu.stack().len(), STACK_SIZE);
        assert_eq!(cpu.pop_return().unwrap(), 0x21E);
    }

    #[test]
    fn test_instr_wraps_at_end_of_memory() {
        let mut cpu = Chip8Cpu::default();
        cpu.ram[0xFFF] = 0x12;
        cpu.ram[0x000] = 0x34;
        cpu.pc = 0xFFF;
        assert_eq!(cpu.instr(), 0x1234);
    }
}

use chip8::{constants::*, prelude::*};
use proptest::prelude::*;

fn vm_with(program: &[u8]) -> Chip8Vm {
    let mut vm = Chip8Vm::new(Chip8Conf {
        rng_seed: Some(0x5EED),
        ..Default::default()
    });
    vm.load_bytecode(program).unwrap();
    vm
}

fn pc(vm: &Chip8Vm) -> u16 {
    vm.cpu().pc()
}

fn reg(vm: &Chip8Vm, index: usize) -> u8 {
    vm.cpu().registers()[index]
}

proptest! {
    #[test]
    fn test_load_then_add_immediate(x in 0u8..0xF, kk in any::<u8>(), flag in any::<u8>()) {
        let mut vm = vm_with(&[
            0x6F, flag,     // LD vF, flag
            0x60 | x, kk,   // LD vX, kk
            0x70 | x, kk,   // ADD vX, kk
        ]);
        vm.run_steps(3).unwrap();

        prop_assert_eq!(reg(&vm, x as usize), kk.wrapping_add(kk));
        prop_assert_eq!(reg(&vm, 0xF), flag);
        prop_assert_eq!(pc(&vm), 0x206);
    }

    #[test]
    fn test_call_return_round_trip(target in 0x204u16..0xFFE) {
        // Aligned so the subroutine doesn't overlap the call site.
        let target = target & !1;

        let mut program = vec![0u8; MAX_PROGRAM_SIZE];
        program[0] = 0x20 | (target >> 8) as u8; // CALL target
        program[1] = target as u8;
        let offset = target as usize - MEM_START;
        program[offset] = 0x00; // RET
        program[offset + 1] = 0xEE;

        let mut vm = vm_with(&program);
        prop_assert_eq!(vm.step().unwrap(), Flow::Jump);
        prop_assert_eq!(pc(&vm), target);
        prop_assert_eq!(vm.cpu().stack(), &[0x200]);

        prop_assert_eq!(vm.step().unwrap(), Flow::Jump);
        prop_assert_eq!(pc(&vm), 0x202);
        prop_assert!(vm.cpu().stack().is_empty());
    }
}

#[test]
#[rustfmt::skip]
fn test_add_registers_carry() {
    let mut vm = vm_with(&[
        0x61, 250,  // LD v1, 250
        0x62, 10,   // LD v2, 10
        0x81, 0x24, // ADD v1, v2
    ]);
    vm.run_steps(3).unwrap();
    assert_eq!(reg(&vm, 1), 4);
    assert_eq!(reg(&vm, 0xF), 1);

    let mut vm = vm_with(&[
        0x61, 10,   // LD v1, 10
        0x62, 10,   // LD v2, 10
        0x81, 0x24, // ADD v1, v2
    ]);
    vm.run_steps(3).unwrap();
    assert_eq!(reg(&vm, 1), 20);
    assert_eq!(reg(&vm, 0xF), 0);
}

#[test]
#[rustfmt::skip]
fn test_sub_registers_borrow() {
    let mut vm = vm_with(&[
        0x61, 5,    // LD v1, 5
        0x62, 10,   // LD v2, 10
        0x81, 0x25, // SUB v1, v2
    ]);
    vm.run_steps(3).unwrap();
    assert_eq!(reg(&vm, 1), 251);
    assert_eq!(reg(&vm, 0xF), 0);

    let mut vm = vm_with(&[
        0x61, 10,   // LD v1, 10
        0x62, 5,    // LD v2, 5
        0x81, 0x25, // SUB v1, v2
    ]);
    vm.run_steps(3).unwrap();
    assert_eq!(reg(&vm, 1), 5);
    assert_eq!(reg(&vm, 0xF), 1);
}

#[test]
#[rustfmt::skip]
fn test_draw_twice_collides() {
    let mut vm = vm_with(&[
        0xA2, 0x0A, // LD I, .sprite
        0x60, 0x08, // LD v0, 8
        0x61, 0x03, // LD v1, 3
        0xD0, 0x11, // DRW v0, v1, 1
        0xD0, 0x11, // DRW v0, v1, 1
        0xFF, 0x00, // .sprite
    ]);

    vm.run_steps(3).unwrap();
    assert_eq!(vm.step().unwrap(), Flow::Draw);
    assert_eq!(reg(&vm, 0xF), 0);
    for x in 8..16 {
        assert!(vm.cpu().pixel(x, 3));
    }
    assert_eq!(vm.display_buffer().iter().filter(|px| **px == PIXEL_ON).count(), 8);

    vm.step().unwrap();
    assert_eq!(reg(&vm, 0xF), 1);
    assert!(vm.display_buffer().iter().all(|px| *px == PIXEL_OFF));
}

#[test]
#[rustfmt::skip]
fn test_draw_clips_right_edge() {
    let mut vm = vm_with(&[
        0xA2, 0x08, // LD I, .sprite
        0x60, 60,   // LD v0, 60
        0x61, 0,    // LD v1, 0
        0xD0, 0x11, // DRW v0, v1, 1
        0xFF, 0x00, // .sprite
    ]);
    vm.run_steps(4).unwrap();

    let lit: Vec<usize> = (0..DISPLAY_BUFFER_SIZE)
        .filter(|i| vm.display_buffer()[*i] == PIXEL_ON)
        .collect();
    assert_eq!(lit, vec![60, 61, 62, 63]);
    assert_eq!(reg(&vm, 0xF), 0);
}

#[test]
#[rustfmt::skip]
fn test_draw_clips_bottom_edge() {
    let mut vm = vm_with(&[
        0xA2, 0x08, // LD I, .sprite
        0x60, 0,    // LD v0, 0
        0x61, 30,   // LD v1, 30
        0xD0, 0x14, // DRW v0, v1, 4
        0x80, 0xC0, // .sprite
        0xE0, 0xF0,
    ]);
    vm.run_steps(4).unwrap();

    // Rows 30 and 31 are drawn, rows 32 and 33 are dropped.
    assert!(vm.cpu().pixel(0, 30));
    assert!(vm.cpu().pixel(1, 31));
    for y in 0..30 {
        for x in 0..DISPLAY_WIDTH {
            assert!(!vm.cpu().pixel(x, y), "pixel ({x}, {y}) wrapped around");
        }
    }
    assert_eq!(vm.display_buffer().iter().filter(|px| **px == PIXEL_ON).count(), 3);
}

#[test]
fn test_delay_timer_floor() {
    let mut vm = vm_with(&[]);
    assert_eq!(vm.delay_timer(), 0);
    for _ in 0..100 {
        vm.tick_timers();
    }
    assert_eq!(vm.delay_timer(), 0);
    assert_eq!(vm.sound_timer(), 0);
}

#[test]
#[rustfmt::skip]
fn test_bcd_of_255() {
    let mut vm = vm_with(&[
        0xA4, 0x00, // LD I, 0x400
        0x65, 0xFF, // LD v5, 255
        0xF5, 0x33, // LD B, v5
    ]);
    vm.run_steps(3).unwrap();
    assert_eq!(&vm.cpu().ram()[0x400..0x403], &[2, 5, 5]);
}

#[test]
fn test_skip_instructions() {
    // (instruction, v1, v2, skipped)
    let cases: [(u16, u8, u8, bool); 8] = [
        (0x3142, 0x42, 0, true),
        (0x3142, 0x41, 0, false),
        (0x4142, 0x41, 0, true),
        (0x4142, 0x42, 0, false),
        (0x5120, 7, 7, true),
        (0x5120, 7, 8, false),
        (0x9120, 7, 8, true),
        (0x9120, 7, 7, false),
    ];

    for (instr, v1, v2, skipped) in cases {
        let [a, b] = instr.to_be_bytes();
        let mut vm = vm_with(&[0x61, v1, 0x62, v2, a, b]);
        vm.run_steps(2).unwrap();
        assert_eq!(pc(&vm), 0x204);

        vm.step().unwrap();
        let expected = if skipped { 0x208 } else { 0x206 };
        assert_eq!(pc(&vm), expected, "{instr:04X} with v1={v1} v2={v2}");
    }
}

#[test]
fn test_clear_then_loop() {
    let mut vm = vm_with(&[0x00, 0xE0, 0x12, 0x00]);

    assert_eq!(vm.step().unwrap(), Flow::Draw);
    assert!(vm.display_buffer().iter().all(|px| *px == PIXEL_OFF));
    assert_eq!(pc(&vm), 0x202);

    assert_eq!(vm.step().unwrap(), Flow::Jump);
    assert_eq!(pc(&vm), 512);

    // The loop jumps back to the clear instruction, and around again.
    vm.run_steps(2).unwrap();
    assert_eq!(pc(&vm), 512);
}

#[test]
fn test_decode_fault_preserves_state() {
    let mut vm = vm_with(&[0x6A, 0x99, 0xE0, 0x00]);
    vm.step().unwrap();

    let err = vm.step().unwrap_err();
    assert!(err.is_decode_fault());
    assert_eq!(err.opcode(), Some(0xE000));
    assert!(err.to_string().contains("0xE000"));

    assert_eq!(pc(&vm), 0x202);
    assert_eq!(reg(&vm, 0xA), 0x99);

    // Still faulting on the next attempt; the host decides what to do.
    assert!(vm.step().is_err());
}

#[test]
fn test_dimensions() {
    assert_eq!(Chip8Vm::dimensions(), (64, 32));
}

#[test]
fn test_host_keypad_handle() {
    let mut vm = vm_with(&[0x60, 0x07, 0xE0, 0x9E]);
    vm.keypad_mut()[7] = true;
    vm.run_steps(2).unwrap();
    assert_eq!(pc(&vm), 0x206);
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use chip8::{constants::*, prelude::*};

/// Draws a random maze of diagonal lines, forever.
#[rustfmt::skip]
const MAZE: &[u8] = &[
    0x60, 0x00, // LD v0, 0
    0x61, 0x00, // LD v1, 0
    0xA2, 0x22, // LD I, .left
    0xC2, 0x01, // RND v2, 1
    0x32, 0x01, // SE v2, 1
    0xA2, 0x1E, // LD I, .right
    0xD0, 0x14, // DRW v0, v1, 4
    0x70, 0x04, // ADD v0, 4
    0x30, 0x40, // SE v0, 64
    0x12, 0x04, // JP 0x204
    0x60, 0x00, // LD v0, 0
    0x71, 0x04, // ADD v1, 4
    0x31, 0x20, // SE v1, 32
    0x12, 0x04, // JP 0x204
    0x12, 0x00, // JP 0x200
    // .right
    0x80, 0x40, 0x20, 0x10,
    // .left
    0x20, 0x40, 0x80, 0x10,
];

struct NullDevices;

impl Devices for NullDevices {
    fn poll_input(&mut self, _keypad: &mut [bool; KEY_COUNT as usize]) {}
    fn render(&mut self, _display: &[u8; DISPLAY_BUFFER_SIZE]) {}
    fn buzz(&mut self, _state: bool) {}
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut vm = Chip8Vm::new(Chip8Conf {
        rng_seed: Some(0),
        ..Default::default()
    });
    vm.load_bytecode(MAZE).unwrap();

    c.bench_function("maze frames", |b| {
        let mut devices = NullDevices;
        b.iter(|| {
            for _ in 0..black_box(60_usize) {
                vm.run_frame(&mut devices).unwrap();
            }
        })
    });

    c.bench_function("maze steps", |b| {
        b.iter(|| black_box(vm.run_steps(black_box(1000_usize))))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

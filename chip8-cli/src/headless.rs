//! Host devices that run without a window or audio output.
use chip8::{constants::*, Devices, KeyCode};
use log::{info, trace};

/// Feeds a fixed set of held keys to the machine, and records what it outputs.
#[derive(Debug, Default)]
pub struct Headless {
    held: Vec<KeyCode>,
    frames: usize,
    buzzing: bool,
    /// Number of frames the buzzer was on.
    buzz_frames: usize,
}

impl Headless {
    /// Keys that stay pressed down for the whole run.
    pub fn with_held_keys(held: Vec<KeyCode>) -> Self {
        Self {
            held,
            ..Default::default()
        }
    }

    /// Number of frames rendered.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn buzz_frames(&self) -> usize {
        self.buzz_frames
    }
}

impl Devices for Headless {
    fn poll_input(&mut self, keypad: &mut Keypad) {
        keypad.fill(false);
        for key in &self.held {
            keypad[key.as_u8() as usize] = true;
        }
    }

    fn render(&mut self, display: &DisplayBuffer) {
        self.frames += 1;
        if log::max_level() >= log::Level::Trace {
            let lit = display.iter().filter(|px| **px == PIXEL_ON).count();
            trace!("frame {}: {lit} pixels lit", self.frames);
        }
    }

    fn buzz(&mut self, state: bool) {
        if state != self.buzzing {
            info!("buzzer {} at frame {}", if state { "on" } else { "off" }, self.frames);
            self.buzzing = state;
        }
        if state {
            self.buzz_frames += 1;
        }
    }
}

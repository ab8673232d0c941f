//! Run configuration, loaded from YAML.
use std::{fs, path::Path};

use chip8::{constants::*, prelude::*};
use serde::Deserialize;

use crate::{
    error::CliError,
    keymap::{KeyDef, KeyMap},
};

/// Number of frames to run when neither the command line nor the file says otherwise.
pub const DEFAULT_FRAMES: usize = 600;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Instructions executed per second.
    pub clock_frequency: u64,
    /// Frames per second.
    pub refresh_rate: u64,
    /// Number of frames to run before stopping.
    pub frames: usize,
    /// Seed for the random number generator.
    pub seed: Option<u64>,
    /// Run frames back to back instead of at the refresh rate.
    pub unthrottled: bool,
    /// Custom key bindings. The QWERTY layout is used when absent.
    pub keymap: Option<Vec<KeyDef>>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            clock_frequency: CLOCK_FREQUENCY,
            refresh_rate: REFRESH_RATE,
            frames: DEFAULT_FRAMES,
            seed: None,
            unthrottled: false,
            keymap: None,
        }
    }
}

impl RunConfig {
    pub fn from_file(filepath: impl AsRef<Path>) -> Result<Self, CliError> {
        let contents = fs::read_to_string(filepath.as_ref())?;
        let config = Self::from_yaml(&contents)?;
        log::debug!("loaded run configuration: {config:#?}");
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, CliError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn chip8_conf(&self) -> Chip8Conf {
        Chip8Conf {
            clock_frequency: Hz(self.clock_frequency),
            refresh_rate: Hz(self.refresh_rate),
            rng_seed: self.seed,
        }
    }

    pub fn key_map(&self) -> KeyMap {
        match self.keymap {
            Some(ref defs) => KeyMap::from_defs(defs),
            None => KeyMap::qwerty(),
        }
    }
}

//! Mapping of host keyboard keys to the hexadecimal keypad.
use chip8::KeyCode;
use serde::Deserialize;

/// Keypad layout of the COSMAC VIP, mapped onto the left side of a QWERTY keyboard.
///
/// ```text
/// 1 2 3 4        1 2 3 C
/// q w e r   ->   4 5 6 D
/// a s d f        7 8 9 E
/// z x c v        A 0 B F
/// ```
#[rustfmt::skip]
const QWERTY: [(char, KeyCode); 16] = [
    ('1', KeyCode::Key1), ('2', KeyCode::Key2), ('3', KeyCode::Key3), ('4', KeyCode::KeyC),
    ('q', KeyCode::Key4), ('w', KeyCode::Key5), ('e', KeyCode::Key6), ('r', KeyCode::KeyD),
    ('a', KeyCode::Key7), ('s', KeyCode::Key8), ('d', KeyCode::Key9), ('f', KeyCode::KeyE),
    ('z', KeyCode::KeyA), ('x', KeyCode::Key0), ('c', KeyCode::KeyB), ('v', KeyCode::KeyF),
];

/// Key mapper
///
/// Maps host keyboard characters to Chip8 keycodes, suitable to be
/// written into the keypad of the virtual machine.
#[derive(Debug, Clone)]
pub struct KeyMap {
    keys: Box<[(char, KeyCode)]>,
}

/// One keypad key and the host keys bound to it, as written in configuration files.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyDef {
    pub chip8: KeyCode,
    #[serde(default)]
    pub keyboard_keys: Vec<char>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::qwerty()
    }
}

impl KeyMap {
    pub fn qwerty() -> Self {
        Self {
            keys: QWERTY.into_iter().collect(),
        }
    }

    /// Build a mapping from configured definitions.
    ///
    /// When the same host key is bound twice, the first definition wins.
    pub fn from_defs(defs: &[KeyDef]) -> Self {
        let keys = defs
            .iter()
            // flatten borrowed keys into one iterator of (host key, keycode) pairs
            .flat_map(|def| {
                def.keyboard_keys
                    .iter()
                    .map(move |key| (key.to_ascii_lowercase(), def.chip8))
            })
            .collect::<Vec<(char, KeyCode)>>()
            .into_boxed_slice();

        Self { keys }
    }

    /// Given a host key, map it to a Chip8 key. Letters match regardless of case.
    pub fn map_key(&self, key: char) -> Option<KeyCode> {
        let key = key.to_ascii_lowercase();
        self.keys
            .iter()
            .find(|(host_key, _)| *host_key == key)
            .map(|(_, keycode)| *keycode)
    }

    /// Map every character of the string, failing on the first unmapped one.
    pub fn map_keys(&self, keys: &str) -> Result<Vec<KeyCode>, char> {
        keys.chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| self.map_key(c).ok_or(c))
            .collect()
    }
}

//! Keyboard command interpretation.
//!
//! Raw key input is normalised into a closed set of `Command`s against the
//! configured `Keymap`, then applied to the velocity/cadence state. Keys that
//! map to nothing are ignored.

use std::fmt;

use tracing::debug;

use super::motion::{Cadence, Velocity};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Enter,
    Esc,
    Tab,
    Backspace,
    Home,
    End,
    F(u8),
}

impl Key {
    /// Parse a binding string such as `"Up"`, `"Space"`, `"F1"` or `"h"`.
    pub fn parse(binding: &str) -> Option<Key> {
        let key = match binding {
            "Up" => Key::Up,
            "Down" => Key::Down,
            "Left" => Key::Left,
            "Right" => Key::Right,
            "Enter" => Key::Enter,
            "Esc" => Key::Esc,
            "Tab" => Key::Tab,
            "Backspace" => Key::Backspace,
            "Home" => Key::Home,
            "End" => Key::End,
            "Space" => Key::Char(' '),
            s => {
                if let Some(n) = s.strip_prefix('F').and_then(|rest| rest.parse::<u8>().ok()) {
                    return Some(Key::F(n));
                }
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        };
        Some(key)
    }

    /// Whether a pressed key triggers this binding. Character bindings ignore
    /// case, since Shift turns `h` into `H` before the key reaches us.
    pub fn matches(self, pressed: Key) -> bool {
        match (self, pressed) {
            (Key::Char(bound), Key::Char(c)) => bound.to_lowercase().eq(c.to_lowercase()),
            _ => self == pressed,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(' ') => f.write_str("Space"),
            Key::Char(c) => write!(f, "{c}"),
            Key::Up => f.write_str("↑"),
            Key::Down => f.write_str("↓"),
            Key::Left => f.write_str("←"),
            Key::Right => f.write_str("→"),
            Key::Enter => f.write_str("Enter"),
            Key::Esc => f.write_str("Esc"),
            Key::Tab => f.write_str("Tab"),
            Key::Backspace => f.write_str("Backspace"),
            Key::Home => f.write_str("Home"),
            Key::End => f.write_str("End"),
            Key::F(n) => write!(f, "F{n}"),
        }
    }
}

/// One key press as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
}

impl KeyInput {
    pub fn plain(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    pub toggle: Key,
    pub up: Key,
    pub down: Key,
    pub left: Key,
    pub right: Key,
    pub help: Key,
}

impl Default for Keymap {
    fn default() -> Self {
        Keymap {
            toggle: Key::Char(' '),
            up: Key::Up,
            down: Key::Down,
            left: Key::Left,
            right: Key::Right,
            help: Key::Char('h'),
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Toggle,
    DriftDown,
    DriftUp,
    DriftLeft,
    DriftRight,
    LengthenDelay,
    ShortenDelay,
    Help,
}

impl Command {
    /// Map a key press to a command. Shift only matters on the up/down keys.
    pub fn from_key(input: KeyInput, keymap: &Keymap) -> Option<Command> {
        let key = input.key;
        // Checked in table order so overlapping bindings resolve predictably.
        if keymap.toggle.matches(key) {
            Some(Command::Toggle)
        } else if keymap.down.matches(key) {
            Some(if input.shift {
                Command::LengthenDelay
            } else {
                Command::DriftDown
            })
        } else if keymap.up.matches(key) {
            Some(if input.shift {
                Command::ShortenDelay
            } else {
                Command::DriftUp
            })
        } else if keymap.left.matches(key) {
            Some(Command::DriftLeft)
        } else if keymap.right.matches(key) {
            Some(Command::DriftRight)
        } else if keymap.help.matches(key) {
            Some(Command::Help)
        } else {
            None
        }
    }
}

/// What the controller must do after a command has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    ToggleRunning,
    Notify(String),
}

pub struct CommandInterpreter {
    keymap: Keymap,
}

impl CommandInterpreter {
    pub fn new(keymap: Keymap) -> Self {
        Self { keymap }
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn normalize(&self, input: KeyInput) -> Option<Command> {
        Command::from_key(input, &self.keymap)
    }

    pub fn apply(
        &self,
        command: Command,
        velocity: &mut Velocity,
        cadence: &mut Cadence,
    ) -> Effect {
        match command {
            Command::Toggle => return Effect::ToggleRunning,
            Command::DriftDown => velocity.dy += 1,
            Command::DriftUp => velocity.dy -= 1,
            Command::DriftLeft => velocity.dx -= 1,
            Command::DriftRight => velocity.dx += 1,
            Command::LengthenDelay => {
                cadence.increase();
                debug!(delay = cadence.delay_seconds(), "spawn delay lengthened");
            }
            Command::ShortenDelay => {
                if cadence.decrease() {
                    debug!(delay = cadence.delay_seconds(), "spawn delay shortened");
                } else {
                    debug!(floor = cadence.floor_seconds(), "spawn delay already at floor");
                }
            }
            Command::Help => return Effect::Notify(self.help_text()),
        }
        Effect::None
    }

    pub fn help_text(&self) -> String {
        let k = &self.keymap;
        format!(
            "Keys\n\
             \x20 {toggle:<12} pause / resume\n\
             \x20 {down:<12} drift down\n\
             \x20 {up:<12} drift up\n\
             \x20 {left:<12} drift left\n\
             \x20 {right:<12} drift right\n\
             \x20 Shift+{down:<6} spawn less often\n\
             \x20 Shift+{up:<6} spawn more often\n\
             \x20 {help:<12} this help",
            toggle = k.toggle.to_string(),
            down = k.down.to_string(),
            up = k.up.to_string(),
            left = k.left.to_string(),
            right = k.right.to_string(),
            help = k.help.to_string(),
        )
    }
}

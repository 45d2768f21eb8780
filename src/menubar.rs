use std::io::Write;

use crossterm::{queue, style};

use crate::engine::Keymap;

/// One `[key] label` entry of the menu bar.
pub struct Hint {
    pub keys: String,
    pub label: &'static str,
}

/// Hints for the animation's key bindings plus the host's quit key.
pub fn hints(keymap: &Keymap, quit: &str) -> Vec<Hint> {
    let hint = |keys: String, label| Hint { keys, label };
    vec![
        hint(keymap.toggle.to_string(), "pause"),
        hint(
            format!("{}{}{}{}", keymap.left, keymap.up, keymap.down, keymap.right),
            "drift",
        ),
        hint(format!("Shift+{}{}", keymap.up, keymap.down), "spawn rate"),
        hint(keymap.help.to_string(), "help"),
        hint(quit.to_string(), "quit"),
    ]
}

/// Print hints on the current line: bracketed keys in bold, labels dim.
pub fn print_hints(out: &mut impl Write, hints: &[Hint]) -> anyhow::Result<()> {
    queue!(out, style::Print(" "))?;
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            queue!(out, style::Print("  "))?;
        }
        queue!(
            out,
            style::SetAttribute(style::Attribute::Bold),
            style::Print(format!("[{}]", hint.keys)),
            style::SetAttribute(style::Attribute::Reset),
            style::SetAttribute(style::Attribute::Dim),
            style::Print(format!(" {}", hint.label)),
            style::SetAttribute(style::Attribute::Reset),
        )?;
    }
    Ok(())
}

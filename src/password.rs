use std::io::{self, IsTerminal};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// What a keystroke does to a hidden input line.
#[derive(Debug, PartialEq)]
pub enum KeyOutcome {
    Continue,
    Submit,
    Cancel,
}

pub fn apply_key(buf: &mut String, key: KeyEvent) -> KeyOutcome {
    if key.kind != KeyEventKind::Press {
        return KeyOutcome::Continue;
    }
    match (key.code, key.modifiers) {
        (KeyCode::Enter, _) => KeyOutcome::Submit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
            KeyOutcome::Cancel
        }
        (KeyCode::Esc, _) => KeyOutcome::Cancel,
        (KeyCode::Backspace, _) => {
            buf.pop();
            KeyOutcome::Continue
        }
        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            buf.push(c);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

pub fn stdin_is_terminal() -> bool {
    io::stdin().is_terminal()
}

/// Read one line from the terminal without echoing it. `None` on Ctrl-C/Ctrl-D/Esc.
pub fn read_hidden_line() -> io::Result<Option<String>> {
    enable_raw_mode()?;
    let result = collect_hidden();
    disable_raw_mode()?;
    println!();
    result
}

fn collect_hidden() -> io::Result<Option<String>> {
    let mut buf = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            match apply_key(&mut buf, key) {
                KeyOutcome::Continue => {}
                KeyOutcome::Submit => return Ok(Some(buf)),
                KeyOutcome::Cancel => return Ok(None),
            }
        }
    }
}

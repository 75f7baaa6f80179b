//! Single-line text input

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Maximum characters accepted by an input
pub const CHAR_LIMIT: usize = 156;

/// A single-line text field with a placeholder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    placeholder: &'static str,
}

impl TextInput {
    pub fn new(placeholder: &'static str) -> Self {
        Self {
            value: String::new(),
            placeholder,
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.chars().take(CHAR_LIMIT).collect();
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn placeholder(&self) -> &str {
        self.placeholder
    }

    /// Apply an editing key; anything that is not an edit is ignored
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.value.chars().count() < CHAR_LIMIT {
                    self.value.push(c);
                }
            }
            KeyCode::Backspace => {
                self.value.pop();
            }
            _ => {}
        }
    }
}

use crossterm::event::{KeyCode, KeyEvent};

/// Single-line text input with cursor editing, shared by every form in the
/// TUI. The cursor is a character index; editing stays UTF-8 safe.
#[derive(Debug, Clone, Default)]
pub(crate) struct TextField {
    pub value: String,
    pub cursor: usize,
    pub masked: bool,
    pub max_len: Option<usize>,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn masked() -> Self {
        Self { masked: true, ..Self::default() }
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor, ..Self::default() }
    }

    pub fn limited(max_len: usize) -> Self {
        Self { max_len: Some(max_len), ..Self::default() }
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(idx, _)| idx)
            .unwrap_or(self.value.len())
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char(c);
        }
    }

    fn insert_char(&mut self, c: char) {
        if c == '\n' || c == '\r' {
            return;
        }
        if let Some(max) = self.max_len
            && self.char_count() >= max
        {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    /// Apply a key to the field. Returns false for keys the field does not
    /// handle so the caller can route them elsewhere.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) => {
                self.insert_char(c);
                true
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.char_count() {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                if self.cursor < self.char_count() {
                    self.cursor += 1;
                }
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.char_count();
                true
            }
            _ => false,
        }
    }

    /// Rendered contents; masked fields show bullets instead of the value.
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.char_count())
        } else {
            self.value.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(field: &mut TextField, code: KeyCode) {
        field.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn typing_and_cursor_editing() {
        let mut field = TextField::new();
        field.insert_str("hello");
        press(&mut field, KeyCode::Left);
        press(&mut field, KeyCode::Left);
        press(&mut field, KeyCode::Char('X'));
        assert_eq!(field.value, "helXlo");
        press(&mut field, KeyCode::Backspace);
        assert_eq!(field.value, "hello");
    }

    #[test]
    fn multibyte_input_stays_consistent() {
        let mut field = TextField::new();
        field.insert_str("héllo");
        press(&mut field, KeyCode::Home);
        press(&mut field, KeyCode::Delete);
        assert_eq!(field.value, "éllo");
        press(&mut field, KeyCode::End);
        press(&mut field, KeyCode::Backspace);
        assert_eq!(field.value, "éll");
    }

    #[test]
    fn with_value_puts_cursor_at_the_end() {
        let mut field = TextField::with_value("draft");
        press(&mut field, KeyCode::Char('!'));
        assert_eq!(field.value, "draft!");
    }

    #[test]
    fn masked_field_never_displays_its_value() {
        let mut field = TextField::masked();
        field.insert_str("hunter2");
        assert_eq!(field.display(), "•••••••");
        assert_eq!(field.value, "hunter2");
    }

    #[test]
    fn length_limit_blocks_further_input() {
        let mut field = TextField::limited(3);
        field.insert_str("abcdef");
        assert_eq!(field.value, "abc");
    }

    #[test]
    fn newlines_are_rejected() {
        let mut field = TextField::new();
        field.insert_str("a\nb");
        assert_eq!(field.value, "ab");
    }
}

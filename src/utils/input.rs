use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Single text field with a cursor counted in chars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field holding `value` with the cursor at the end.
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn set(&mut self, value: impl Into<String>) {
        *self = Self::with_value(value);
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_index(self.cursor);
        self.value.insert(idx, c);
        self.cursor += 1;
    }

    /// Replace the whole value and put the cursor at `cursor` (clamped).
    pub fn replace(&mut self, value: String, cursor: usize) {
        self.cursor = cursor.min(value.chars().count());
        self.value = value;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let idx = self.byte_index(self.cursor - 1);
        self.value.remove(idx);
        self.cursor -= 1;
    }

    pub fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let idx = self.byte_index(self.cursor);
            self.value.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    /// Apply a plain editing key. Returns false for keys that are not text
    /// editing so the caller can handle them.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.chars().count(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = TextInput::new();
        for c in "x^2".chars() {
            assert!(input.handle_key(&key(KeyCode::Char(c))));
        }
        assert_eq!(input.value(), "x^2");
        input.handle_key(&key(KeyCode::Backspace));
        assert_eq!(input.value(), "x^");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_multibyte_cursor() {
        let mut input = TextInput::with_value("가나다");
        input.move_left();
        input.insert_char('x');
        assert_eq!(input.value(), "가나x다");
        input.handle_key(&key(KeyCode::Home));
        input.delete();
        assert_eq!(input.value(), "나x다");
        input.backspace();
        assert_eq!(input.value(), "나x다");
    }

    #[test]
    fn test_control_keys_are_not_consumed() {
        let mut input = TextInput::new();
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(!input.handle_key(&ctrl_s));
        assert!(!input.handle_key(&key(KeyCode::Enter)));
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_replace_clamps_cursor() {
        let mut input = TextInput::new();
        input.replace("ab".to_string(), 10);
        assert_eq!(input.cursor(), 2);
    }
}

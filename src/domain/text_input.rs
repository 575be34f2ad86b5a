//! Editable single-line text used by the compose box and the search box.

/// Maximum number of characters a field accepts.
const MAX_INPUT_CHARS: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextInput {
    chars: Vec<char>,
    /// Cursor position as a character index into `chars`.
    cursor: usize,
}

impl TextInput {
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.chars.iter().all(|ch| ch.is_whitespace())
    }

    /// Inserts at the cursor. Returns `false` when the field is full.
    pub fn insert_char(&mut self, ch: char) -> bool {
        if self.chars.len() >= MAX_INPUT_CHARS {
            return false;
        }
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
        true
    }

    /// Backspace.
    pub fn delete_char_before(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
    }

    /// Delete key.
    pub fn delete_char_at(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.chars.len());
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.chars.len();
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Takes the text out of the field, leaving it empty.
    pub fn take(&mut self) -> String {
        let text = self.text();
        self.clear();
        text
    }

    /// Replaces the content (truncated to the limit) and puts the cursor at the end.
    pub fn restore(&mut self, text: &str) {
        self.chars = text.chars().take(MAX_INPUT_CHARS).collect();
        self.cursor = self.chars.len();
    }

    /// Applies an editing key. Returns `true` when the key was consumed.
    pub fn apply_key(&mut self, key: &str) -> bool {
        match key {
            "backspace" => self.delete_char_before(),
            "delete" => self.delete_char_at(),
            "left" => self.move_cursor_left(),
            "right" => self.move_cursor_right(),
            "home" => self.move_cursor_home(),
            "end" => self.move_cursor_end(),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => {
                        self.insert_char(ch);
                    }
                    _ => return false,
                }
            }
        }
        true
    }
}

use ropey::Rope;

/// Who caused a content change. Programmatic replacements (tab switch,
/// file load) must not be mistaken for user edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    User,
    Programmatic,
}

/// Change notification emitted once per edit of the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentChange {
    pub origin: EditOrigin,
    pub revision: u64,
}

impl ContentChange {
    pub fn is_user(&self) -> bool {
        self.origin == EditOrigin::User
    }
}

/// Zero-based cursor position, column counted in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
}

/// The single shared text-editing surface. Only the active document's text
/// is ever loaded into it.
#[derive(Debug, Clone)]
pub struct EditingSurface {
    rope: Rope,
    cursor_line: usize,
    cursor_col: usize,
    revision: u64,
    ready: bool,
}

impl EditingSurface {
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            cursor_line: 0,
            cursor_col: 0,
            revision: 0,
            ready: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    /// Replace the whole buffer on behalf of the application.
    pub fn set_content(&mut self, content: &str) -> ContentChange {
        self.rope = Rope::from_str(content);
        self.cursor_line = 0;
        self.cursor_col = 0;
        self.changed(EditOrigin::Programmatic)
    }

    pub fn content(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_blank(&self) -> bool {
        self.rope.chars().all(char::is_whitespace)
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn word_count(&self) -> usize {
        self.content().split_whitespace().count()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn cursor_position(&self) -> CursorPosition {
        CursorPosition {
            line: self.cursor_line,
            column: self.cursor_col,
        }
    }

    pub fn set_cursor_position(&mut self, line: usize, column: usize) -> CursorPosition {
        let max_line = self.rope.len_lines().saturating_sub(1);
        self.cursor_line = line.min(max_line);
        self.cursor_col = column.min(self.line_len(self.cursor_line));
        self.cursor_position()
    }

    /// Type `text` at the cursor, leaving the cursor after it.
    pub fn insert_str(&mut self, text: &str) -> Option<ContentChange> {
        if text.is_empty() {
            return None;
        }

        if self.rope.len_chars() > 1_000_000 {
            log::warn!("Document size approaching limit, insert may be slow");
        }

        let char_idx = self.cursor_char_idx();
        self.rope.insert(char_idx, text);
        self.move_cursor_to_char(char_idx + text.chars().count());
        Some(self.changed(EditOrigin::User))
    }

    /// Backspace `count` chars before the cursor.
    pub fn delete_backward(&mut self, count: usize) -> Option<ContentChange> {
        let char_idx = self.cursor_char_idx();
        let start = char_idx.saturating_sub(count);
        if start == char_idx {
            return None;
        }
        self.rope.remove(start..char_idx);
        self.move_cursor_to_char(start);
        Some(self.changed(EditOrigin::User))
    }

    /// Replace the whole buffer as a user edit (select-all + type, paste).
    pub fn replace_all(&mut self, text: &str) -> Option<ContentChange> {
        if self.rope == text {
            return None;
        }
        self.rope = Rope::from_str(text);
        self.move_cursor_to_char(self.rope.len_chars());
        Some(self.changed(EditOrigin::User))
    }

    fn changed(&mut self, origin: EditOrigin) -> ContentChange {
        self.revision += 1;
        ContentChange {
            origin,
            revision: self.revision,
        }
    }

    fn line_len(&self, line: usize) -> usize {
        match self.rope.get_line(line) {
            Some(slice) => {
                let mut len = slice.len_chars();
                if len > 0 && slice.char(len - 1) == '\n' {
                    len -= 1;
                    if len > 0 && slice.char(len - 1) == '\r' {
                        len -= 1;
                    }
                }
                len
            }
            None => 0,
        }
    }

    fn cursor_char_idx(&self) -> usize {
        let line = self.cursor_line.min(self.rope.len_lines().saturating_sub(1));
        self.rope.line_to_char(line) + self.cursor_col.min(self.line_len(line))
    }

    fn move_cursor_to_char(&mut self, char_idx: usize) {
        let char_idx = char_idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(char_idx);
        self.cursor_line = line;
        self.cursor_col = char_idx - self.rope.line_to_char(line);
    }
}

impl Default for EditingSurface {
    fn default() -> Self {
        Self::new()
    }
}

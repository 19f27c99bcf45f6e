use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;
use std::cmp;

/// Text buffer behind the form fields. Columns are counted in chars.
#[derive(Debug, Clone)]
pub struct Editor {
    pub lines: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    pub scroll_offset: usize, // first visible line
    pub scroll_col: usize,    // first visible column
    multiline: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
            scroll_offset: 0,
            scroll_col: 0,
            multiline: false,
        }
    }

    /// Editor that accepts Enter as a newline
    pub fn multiline() -> Self {
        Self {
            multiline: true,
            ..Self::new()
        }
    }

    /// Load `content` with the cursor at its end
    pub fn with_content(mut self, content: &str) -> Self {
        self.lines = if content.is_empty() {
            vec![String::new()]
        } else if self.multiline {
            content.lines().map(str::to_string).collect()
        } else {
            vec![content.replace(['\n', '\r'], " ")]
        };
        self.cursor_line = self.lines.len().saturating_sub(1);
        self.cursor_col = self.current_len();
        self
    }

    pub fn is_multiline(&self) -> bool {
        self.multiline
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    fn current_len(&self) -> usize {
        self.lines.get(self.cursor_line).map(|l| l.chars().count()).unwrap_or(0)
    }

    /// Byte offset of char column `col` in `line`
    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len())
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch == '\n' {
            self.insert_newline();
            return;
        }
        let col = cmp::min(self.cursor_col, self.current_len());
        if let Some(line) = self.lines.get_mut(self.cursor_line) {
            let at = Self::byte_index(line, col);
            line.insert(at, ch);
            self.cursor_col = col + 1;
        }
    }

    /// Backspace
    pub fn delete_char(&mut self) {
        let col = cmp::min(self.cursor_col, self.current_len());
        if col > 0 {
            if let Some(line) = self.lines.get_mut(self.cursor_line) {
                let at = Self::byte_index(line, col - 1);
                line.remove(at);
                self.cursor_col = col - 1;
            }
        } else if self.cursor_line > 0 && self.cursor_line < self.lines.len() {
            let current = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = self.current_len();
            if let Some(prev) = self.lines.get_mut(self.cursor_line) {
                prev.push_str(&current);
            }
        }
    }

    /// Delete key
    pub fn delete_forward(&mut self) {
        let len = self.current_len();
        if self.cursor_col < len {
            self.cursor_col += 1;
            self.delete_char();
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
            self.delete_char();
        }
    }

    pub fn insert_newline(&mut self) {
        if !self.multiline {
            return;
        }
        let col = cmp::min(self.cursor_col, self.current_len());
        let Some(line) = self.lines.get_mut(self.cursor_line) else {
            return;
        };
        let at = Self::byte_index(line, col);
        let remainder = line.split_off(at);
        self.lines.insert(self.cursor_line + 1, remainder);
        self.cursor_line += 1;
        self.cursor_col = 0;
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = cmp::min(self.cursor_col, self.current_len());
        }
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = cmp::min(self.cursor_col, self.current_len());
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_len();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.current_len() {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.current_len();
    }

    /// Apply an editing key. Returns false if the key is not an editing key.
    pub fn handle_key(&mut self, key_event: &KeyEvent) -> bool {
        if key_event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        match key_event.code {
            KeyCode::Char(c) => self.insert_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Enter if self.multiline => self.insert_newline(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Up if self.multiline => self.move_cursor_up(),
            KeyCode::Down if self.multiline => self.move_cursor_down(),
            KeyCode::Home => self.move_cursor_home(),
            KeyCode::End => self.move_cursor_end(),
            _ => return false,
        }
        true
    }

    pub fn get_visible_lines(&self, viewport_height: usize, viewport_width: usize) -> (usize, Vec<String>) {
        let start = cmp::min(self.scroll_offset, self.lines.len());
        let end = cmp::min(start + viewport_height, self.lines.len());

        let visible = self.lines[start..end]
            .iter()
            .map(|line| line.chars().skip(self.scroll_col).take(viewport_width).collect())
            .collect();

        (start, visible)
    }

    /// Keep the cursor inside a `height` x `width` viewport
    pub fn update_scroll(&mut self, viewport_height: usize, viewport_width: usize) {
        let height = viewport_height.max(1);
        let width = viewport_width.max(1);

        if self.cursor_line < self.scroll_offset {
            self.scroll_offset = self.cursor_line;
        } else if self.cursor_line >= self.scroll_offset + height {
            self.scroll_offset = self.cursor_line + 1 - height;
        }

        if self.cursor_col < self.scroll_col {
            self.scroll_col = self.cursor_col;
        } else if self.cursor_col >= self.scroll_col + width {
            self.scroll_col = self.cursor_col + 1 - width;
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Screen position of the cursor inside `inner` (an area without borders)
    pub fn get_cursor_screen_pos(&self, inner: Rect) -> Option<(u16, u16)> {
        let row = self.cursor_line.checked_sub(self.scroll_offset)?;
        let col = cmp::min(self.cursor_col, self.current_len()).checked_sub(self.scroll_col)?;
        if row >= inner.height as usize || col >= inner.width as usize {
            return None;
        }
        Some((inner.x + col as u16, inner.y + row as u16))
    }
}

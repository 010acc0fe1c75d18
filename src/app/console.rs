//! The interactive terminal pane: scrollback plus one editable prompt line.

use std::collections::VecDeque;

use crate::session::output::OutputBlock;

const DEFAULT_MAX_LINES: usize = 5000;

#[derive(Debug)]
pub struct Console {
    lines: VecDeque<String>,
    prompt: Option<String>,
    input: String,
    /// Position in `input`, in chars.
    cursor: usize,
    max_lines: usize,
}

impl Default for Console {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl Console {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            prompt: None,
            input: String::new(),
            cursor: 0,
            max_lines: max_lines.max(1),
        }
    }

    /// Write a flushed block: end the current line, append the text, then
    /// start a fresh prompt line. A draft typed on the old prompt moves to
    /// the new one.
    pub fn apply(&mut self, block: &OutputBlock) {
        let draft = std::mem::take(&mut self.input);

        match &block.text {
            Some(text) => {
                if let Some(prompt) = self.prompt.take() {
                    self.push_line(prompt);
                }
                for line in text.lines() {
                    self.push_line(line.to_string());
                }
            }
            // Prompt re-display only; the old prompt line is replaced
            None => self.prompt = None,
        }

        self.prompt = block.prompt.clone();
        if self.prompt.is_some() {
            self.input = draft;
        }
        self.cursor = self.input.chars().count();
    }

    pub fn accepts_input(&self) -> bool {
        self.prompt.is_some()
    }

    /// Submit the prompt line. The line stays in the scrollback and no
    /// prompt is shown until the next block arrives.
    pub fn take_input(&mut self) -> Option<String> {
        let prompt = self.prompt.take()?;
        let input = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.push_line(format!("{}{}", prompt, input));
        Some(input)
    }

    /// Replace the draft, e.g. with a history entry.
    pub fn set_input(&mut self, input: &str) {
        self.input = input.to_string();
        self.cursor = self.input.chars().count();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.accepts_input() {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.input.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.input.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let at = self.byte_index(self.cursor);
            self.input.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    /// Scrollback followed by the prompt line when one is shown.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.lines
            .iter()
            .cloned()
            .chain(self.prompt.as_ref().map(|p| format!("{}{}", p, self.input)))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len() + usize::from(self.prompt.is_some())
    }

    /// Column of the cursor on the prompt line.
    pub fn cursor_column(&self) -> Option<usize> {
        self.prompt
            .as_ref()
            .map(|p| p.chars().count() + self.cursor)
    }

    fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_index)
            .map_or(self.input.len(), |(i, _)| i)
    }
}

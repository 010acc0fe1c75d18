/// Submitted commands with a navigation cursor.
///
/// The cursor lives in `[0, len]`; `len` is the fresh, empty entry.
#[derive(Debug, Default, Clone)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: impl Into<String>) {
        self.entries.push(command.into());
        self.cursor = self.entries.len();
    }

    /// Step back and return the entry under the cursor.
    pub fn previous(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        self.cursor = self.cursor.saturating_sub(1);
        self.current()
    }

    /// Step forward. Returns `Some("")` once past the newest entry.
    pub fn next(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        self.cursor = (self.cursor + 1).min(self.entries.len());
        self.current()
    }

    fn current(&self) -> Option<&str> {
        Some(self.entries.get(self.cursor).map_or("", String::as_str))
    }

    #[allow(dead_code)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> History {
        let mut history = History::new();
        for cmd in ["a", "b", "c"] {
            history.push(cmd);
        }
        history
    }

    #[test]
    fn test_up_then_down_returns_to_fresh_entry() {
        let mut history = filled();
        assert_eq!(history.previous(), Some("c"));
        assert_eq!(history.previous(), Some("b"));
        assert_eq!(history.previous(), Some("a"));
        assert_eq!(history.next(), Some("b"));
        assert_eq!(history.next(), Some("c"));
        assert_eq!(history.next(), Some(""));
        assert_eq!(history.cursor(), history.len());
    }

    #[test]
    fn test_cursor_clamps_at_both_ends() {
        let mut history = filled();
        for _ in 0..10 {
            history.previous();
            assert!(history.cursor() <= 2);
        }
        assert_eq!(history.previous(), Some("a"));
        assert_eq!(history.cursor(), 0);

        for _ in 0..10 {
            history.next();
            assert!(history.cursor() <= history.len());
        }
        assert_eq!(history.next(), Some(""));
    }

    #[test]
    fn test_submission_resets_cursor() {
        let mut history = filled();
        history.previous();
        history.previous();
        history.push("d");
        assert_eq!(history.cursor(), 4);
        assert_eq!(history.previous(), Some("d"));
    }

    #[test]
    fn test_empty_history_does_nothing() {
        let mut history = History::new();
        assert_eq!(history.previous(), None);
        assert_eq!(history.next(), None);
        assert_eq!(history.cursor(), 0);
        assert!(history.is_empty());
    }
}

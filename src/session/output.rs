//! Batching of asynchronous terminal output.
//!
//! Fragments are collected with [`OutputSequencer::submit`] while the current
//! event is handled. The owning loop calls [`OutputSequencer::flush`] once the
//! step is done, so output is never written while an input edit is in
//! progress and a burst of fragments produces a single prompt.

/// One flushed batch of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputBlock {
    /// Coalesced fragments, trailing newlines removed. `None` for a
    /// prompt-only re-display.
    pub text: Option<String>,
    /// Prompt to start the next input line with. `None` while the session
    /// does not accept input.
    pub prompt: Option<String>,
}

#[derive(Debug, Default)]
pub struct OutputSequencer {
    pending: String,
    scheduled: bool,
}

impl OutputSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a fragment for the next flush.
    pub fn submit(&mut self, fragment: &str) {
        if !fragment.is_empty() {
            if !self.pending.is_empty() && !self.pending.ends_with('\n') {
                self.pending.push('\n');
            }
            self.pending.push_str(fragment);
        }
        self.scheduled = true;
    }

    /// Request a prompt re-display without any text.
    pub fn schedule_prompt(&mut self) {
        self.scheduled = true;
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Drain everything submitted since the last flush into one block.
    pub fn flush(&mut self, prompt: Option<String>) -> Option<OutputBlock> {
        if !self.scheduled {
            return None;
        }
        self.scheduled = false;

        let pending = std::mem::take(&mut self.pending);
        let trimmed = pending.trim_end_matches(['\n', '\r']);
        let text = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };

        Some(OutputBlock { text, prompt })
    }
}

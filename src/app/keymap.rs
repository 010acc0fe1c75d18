use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::tab::PendingDelete;
use crate::app::types::{App, Focus};
use crate::error::SessionError;

impl App {
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
            self.should_quit = true;
            return Ok(());
        }

        if self.new_session.is_some() {
            self.handle_new_session_key(key.code);
            return Ok(());
        }

        if self.active().pending_delete.is_some() {
            self.handle_delete_confirmation(key.code);
            return Ok(());
        }

        if ctrl {
            match key.code {
                KeyCode::Char('t') => {
                    self.new_session = Some(String::new());
                    return Ok(());
                }
                KeyCode::Char('w') => {
                    self.close_active_tab();
                    return Ok(());
                }
                KeyCode::Char('n') => {
                    self.next_tab();
                    return Ok(());
                }
                KeyCode::Char('p') => {
                    self.previous_tab();
                    return Ok(());
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Tab => self.focus_next(),
            KeyCode::BackTab => self.focus_previous(),
            _ => match self.focus {
                Focus::Terminal => self.handle_terminal_key(key),
                Focus::Local => self.handle_local_key(key.code),
                Focus::Remote => self.handle_remote_key(key.code),
            },
        }
        Ok(())
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::Terminal => Focus::Local,
            Focus::Local => Focus::Remote,
            Focus::Remote => Focus::Terminal,
        };
        tracing::debug!("Focus on {:?}", self.focus);
    }

    pub fn focus_previous(&mut self) {
        self.focus = match self.focus {
            Focus::Terminal => Focus::Remote,
            Focus::Local => Focus::Terminal,
            Focus::Remote => Focus::Local,
        };
        tracing::debug!("Focus on {:?}", self.focus);
    }

    fn handle_new_session_key(&mut self, code: KeyCode) {
        let Some(input) = self.new_session.as_mut() else {
            return;
        };
        match code {
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Esc => self.new_session = None,
            KeyCode::Enter => {
                let destination = std::mem::take(input);
                self.new_session = None;
                if let Err(e) = self.open_session(&destination) {
                    tracing::warn!("Cannot open session '{}': {:#}", destination, e);
                    self.set_status_message(format!("Error: {}", e));
                }
            }
            _ => {}
        }
    }

    fn handle_terminal_key(&mut self, key: KeyEvent) {
        let tab = self.active_mut();
        match key.code {
            KeyCode::Enter => self.submit_console_line(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                tab.console.insert_char(c)
            }
            KeyCode::Backspace => tab.console.backspace(),
            KeyCode::Delete => tab.console.delete(),
            KeyCode::Left => tab.console.move_left(),
            KeyCode::Right => tab.console.move_right(),
            KeyCode::Home => tab.console.home(),
            KeyCode::End => tab.console.end(),
            KeyCode::Up if tab.console.accepts_input() => {
                if let Some(entry) = tab.history.previous() {
                    let entry = entry.to_string();
                    tab.console.set_input(&entry);
                }
            }
            KeyCode::Down if tab.console.accepts_input() => {
                if let Some(entry) = tab.history.next() {
                    let entry = entry.to_string();
                    tab.console.set_input(&entry);
                }
            }
            _ => {}
        }
    }

    fn submit_console_line(&mut self) {
        let tab = self.active_mut();
        let Some(line) = tab.console.take_input() else {
            return;
        };
        if !line.trim().is_empty() {
            tab.history.push(line.clone());
        }
        if let Err(e) = tab.controller.submit_line(&line) {
            tracing::warn!("Input '{}' not handled: {}", line, e);
        }
    }

    fn handle_local_key(&mut self, code: KeyCode) {
        let sftp_state = &mut self.active_mut().sftp_state;
        let result = match code {
            KeyCode::Up | KeyCode::Char('k') => {
                sftp_state.navigate_local_up();
                Ok(())
            }
            KeyCode::Down | KeyCode::Char('j') => {
                sftp_state.navigate_local_down();
                Ok(())
            }
            KeyCode::Enter => sftp_state.open_local_selected(),
            KeyCode::Backspace => sftp_state.go_local_back(),
            KeyCode::Char('r') => sftp_state.refresh_local(),
            KeyCode::Char('u') => {
                self.upload_selected();
                Ok(())
            }
            KeyCode::Esc => {
                self.focus = Focus::Terminal;
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            tracing::error!("Local panel: {:#}", e);
            self.set_status_message(format!("Error: {}", e));
        }
    }

    fn handle_remote_key(&mut self, code: KeyCode) {
        let tab = self.active_mut();
        let result = match code {
            KeyCode::Up | KeyCode::Char('k') => {
                tab.sftp_state.navigate_remote_up();
                Ok(())
            }
            KeyCode::Down | KeyCode::Char('j') => {
                tab.sftp_state.navigate_remote_down();
                Ok(())
            }
            KeyCode::Enter => match tab.sftp_state.selected_remote() {
                Some(row) if row.is_dir => {
                    let name = row.name.clone();
                    tab.controller.open_directory(&name)
                }
                _ => Ok(()),
            },
            KeyCode::Backspace => tab.controller.open_directory(".."),
            KeyCode::Char('r') => tab.controller.refresh(),
            KeyCode::Char('d') => self.download_selected(),
            KeyCode::Delete | KeyCode::Char('D') => {
                self.ask_delete_selected();
                Ok(())
            }
            KeyCode::Esc => {
                self.focus = Focus::Terminal;
                Ok(())
            }
            _ => Ok(()),
        };

        self.report_session_error(result);
    }

    fn download_selected(&mut self) -> Result<(), SessionError> {
        let tab = self.active_mut();
        match tab.sftp_state.selected_remote() {
            Some(row) if !row.is_dir => {
                let name = row.name.clone();
                let local_dir = tab.sftp_state.local_current_path.clone();
                tab.controller.download(&name, &local_dir)
            }
            _ => {
                self.set_status_message("Select a remote file to download");
                Ok(())
            }
        }
    }

    fn upload_selected(&mut self) {
        let tab = self.active_mut();
        let Some(local) = tab.sftp_state.selected_local_file() else {
            self.set_status_message("Select a local file to upload");
            return;
        };
        let result = tab.controller.upload(&local);
        self.report_session_error(result);
    }

    fn ask_delete_selected(&mut self) {
        let tab = self.active_mut();
        let pending = match tab.sftp_state.selected_remote() {
            Some(row) if !row.is_parent_link() => PendingDelete {
                name: row.name.clone(),
                is_dir: row.is_dir,
            },
            _ => return,
        };
        let question = format!("Delete {}? (y/n)", pending.name);
        tab.pending_delete = Some(pending);
        self.set_status_message(question);
    }

    fn handle_delete_confirmation(&mut self, code: KeyCode) {
        let tab = self.active_mut();
        let Some(pending) = tab.pending_delete.take() else {
            return;
        };
        if matches!(code, KeyCode::Char('y') | KeyCode::Char('Y')) {
            let result = tab.controller.delete(&pending.name, pending.is_dir);
            self.clear_status_message();
            self.report_session_error(result);
        } else {
            self.set_status_message("Delete cancelled");
        }
    }

    fn report_session_error(&mut self, result: Result<(), SessionError>) {
        match result {
            Ok(()) => {}
            Err(SessionError::NotReady) => self.set_status_message("Not connected"),
            Err(e) => self.set_status_message(format!("Error: {}", e)),
        }
    }
}

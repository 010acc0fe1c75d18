use std::path::PathBuf;

use ratatui::widgets::{ListState, TableState};

use crate::session::listing::Listing;

/// Represents a file or directory item in the local panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileItem {
    Directory { name: String },
    File { name: String, size: u64 },
}

impl FileItem {
    pub fn name(&self) -> &str {
        match self {
            FileItem::Directory { name } => name,
            FileItem::File { name, .. } => name,
        }
    }
}

/// State of the two file panels
#[derive(Debug, Clone)]
pub struct AppSftpState {
    // Local panel state
    pub local_current_path: PathBuf,
    pub local_files: Vec<FileItem>,
    pub local_selected: usize,
    pub local_list_state: ListState,

    // Remote panel state, `None` until the first listing arrives
    pub remote_listing: Option<Listing>,
    pub remote_selected: usize,
    pub remote_table_state: TableState,
}

/// Next selection index, wrapping at both ends.
pub(super) fn step(selected: usize, len: usize, forward: bool) -> usize {
    if len == 0 {
        0
    } else if forward {
        if selected + 1 < len {
            selected + 1
        } else {
            0
        }
    } else if selected > 0 {
        selected - 1
    } else {
        len - 1
    }
}

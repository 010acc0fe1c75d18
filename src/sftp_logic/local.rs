use anyhow::{Context, Result};
use ratatui::widgets::{ListState, TableState};
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{step, AppSftpState, FileItem};

impl AppSftpState {
    pub fn new(local_path: PathBuf) -> Result<Self> {
        let mut state = Self {
            local_files: Self::read_local_directory(&local_path)?,
            local_current_path: local_path,
            local_selected: 0,
            local_list_state: ListState::default(),
            remote_listing: None,
            remote_selected: 0,
            remote_table_state: TableState::default(),
        };
        state.local_list_state.select(Some(0));
        Ok(state)
    }

    /// Refresh the local file list
    pub fn refresh_local(&mut self) -> Result<()> {
        self.local_files = Self::read_local_directory(&self.local_current_path)?;
        if self.local_selected >= self.local_files.len() {
            self.local_selected = self.local_files.len().saturating_sub(1);
        }
        self.local_list_state.select(Some(self.local_selected));
        Ok(())
    }

    pub fn navigate_local_up(&mut self) {
        self.local_selected = step(self.local_selected, self.local_files.len(), false);
        self.local_list_state.select(Some(self.local_selected));
    }

    pub fn navigate_local_down(&mut self) {
        self.local_selected = step(self.local_selected, self.local_files.len(), true);
        self.local_list_state.select(Some(self.local_selected));
    }

    pub fn selected_local(&self) -> Option<&FileItem> {
        self.local_files.get(self.local_selected)
    }

    /// Full path of the selected local file. Directories yield `None`.
    pub fn selected_local_file(&self) -> Option<PathBuf> {
        match self.selected_local()? {
            FileItem::File { name, .. } => Some(self.local_current_path.join(name)),
            FileItem::Directory { .. } => None,
        }
    }

    /// Enter the selected local directory
    pub fn open_local_selected(&mut self) -> Result<()> {
        let Some(FileItem::Directory { name }) = self.selected_local().cloned() else {
            return Ok(());
        };

        let target = if name == ".." {
            match self.local_current_path.parent() {
                Some(parent) => parent.to_path_buf(),
                None => return Ok(()),
            }
        } else {
            self.local_current_path.join(&name)
        };
        self.change_local_dir(target)
    }

    /// Go up one directory in the local file system
    pub fn go_local_back(&mut self) -> Result<()> {
        match self.local_current_path.parent() {
            Some(parent) => self.change_local_dir(parent.to_path_buf()),
            None => Ok(()),
        }
    }

    fn change_local_dir(&mut self, target: PathBuf) -> Result<()> {
        // Read first so an unreadable directory leaves the panel untouched
        let files = Self::read_local_directory(&target)?;
        tracing::debug!("Local panel: {}", target.display());
        self.local_current_path = target;
        self.local_files = files;
        self.local_selected = 0;
        self.local_list_state.select(Some(0));
        Ok(())
    }

    /// Read the contents of a local directory
    fn read_local_directory(path: &Path) -> Result<Vec<FileItem>> {
        let mut items = Vec::new();

        // Add parent directory entry if not at root
        if path.parent().is_some() {
            items.push(FileItem::Directory {
                name: "..".to_string(),
            });
        }

        let entries = fs::read_dir(path)
            .with_context(|| format!("Failed to read local directory {}", path.display()))?;

        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let file_name = entry.file_name().to_string_lossy().to_string();
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    // Dangling links and races with deletion
                    tracing::debug!("Skipping {}: {}", file_name, e);
                    continue;
                }
            };

            if metadata.is_dir() {
                items.push(FileItem::Directory { name: file_name });
            } else {
                items.push(FileItem::File {
                    name: file_name,
                    size: metadata.len(),
                });
            }
        }

        // Sort: directories first, then files, both alphabetically
        items.sort_by(|a, b| {
            use std::cmp::Ordering;
            match (a, b) {
                (FileItem::Directory { name: name_a }, FileItem::Directory { name: name_b }) => {
                    if name_a == ".." {
                        Ordering::Less
                    } else if name_b == ".." {
                        Ordering::Greater
                    } else {
                        name_a.cmp(name_b)
                    }
                }
                (FileItem::Directory { .. }, FileItem::File { .. }) => Ordering::Less,
                (FileItem::File { .. }, FileItem::Directory { .. }) => Ordering::Greater,
                (FileItem::File { name: name_a, .. }, FileItem::File { name: name_b, .. }) => {
                    name_a.cmp(name_b)
                }
            }
        });

        Ok(items)
    }
}

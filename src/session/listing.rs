//! Keeps the remote listing and the session's current path in agreement
//! with `files` responses.

use crate::models::FileEntry;
use crate::session::path;
use crate::session::state::SessionState;

/// A display row of the remote listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub name: String,
    pub is_dir: bool,
    pub size: String,
    pub kind: &'static str,
    pub modified: String,
}

impl ListingRow {
    fn parent() -> Self {
        Self {
            name: "..".to_string(),
            is_dir: true,
            size: String::new(),
            kind: "Directory",
            modified: String::new(),
        }
    }

    fn from_entry(entry: &FileEntry) -> Self {
        Self {
            name: entry.name.clone(),
            is_dir: entry.is_dir,
            size: if entry.is_dir {
                String::new()
            } else {
                format_file_size(entry.size.unwrap_or(0))
            },
            kind: if entry.is_dir { "Directory" } else { "File" },
            modified: entry.modified.clone().unwrap_or_default(),
        }
    }

    pub fn is_parent_link(&self) -> bool {
        self.name == ".."
    }
}

/// Snapshot of the remote directory view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub path: String,
    pub rows: Vec<ListingRow>,
}

impl Listing {
    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.name.as_str()).collect()
    }
}

/// Result of applying a `files` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub listing: Listing,
    /// Flattened names for the terminal. Empty when the directory is.
    pub summary: String,
}

/// Apply a `files` response to `state`.
///
/// `reported` is the path the response claims to describe; `requested` the
/// path of the `SftpList` it answers, used when the backend leaves the path
/// out.
pub fn apply(
    state: &mut SessionState,
    files: &[FileEntry],
    reported: Option<&str>,
    requested: Option<&str>,
) -> Applied {
    let described = describe_path(reported, requested, state.home_dir.as_deref());

    let current = if described == "." {
        state
            .home_dir
            .clone()
            .or_else(|| state.current_path.clone())
            .unwrap_or_else(|| "/".to_string())
    } else {
        described
    };

    if state.requested_path.as_deref() == requested {
        state.requested_path = None;
    }
    state.current_path = Some(current.clone());

    let mut rows = Vec::with_capacity(files.len() + 1);
    if current != "/" {
        rows.push(ListingRow::parent());
    }
    rows.extend(files.iter().map(ListingRow::from_entry));

    tracing::debug!("Listing for {}: {} entries", current, files.len());

    Applied {
        listing: Listing {
            path: current,
            rows,
        },
        summary: summarize(files),
    }
}

fn describe_path(reported: Option<&str>, requested: Option<&str>, home: Option<&str>) -> String {
    if let Some(path) = reported.filter(|p| !p.is_empty()) {
        return path.to_string();
    }
    match (requested, home) {
        (Some(path), _) if path.starts_with('/') || path == "." => path.to_string(),
        // The backend resolves relative paths from the login directory
        (Some(path), Some(home)) => path::join(home, path),
        _ => ".".to_string(),
    }
}

/// Names separated by two spaces, directories with a trailing `/`.
pub fn summarize(files: &[FileEntry]) -> String {
    files
        .iter()
        .map(|f| {
            if f.is_dir {
                format!("{}/", f.name)
            } else {
                f.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn format_file_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

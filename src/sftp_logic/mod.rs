//! File browser panels: the local filesystem and the remote listing.

mod local;
mod remote;
pub mod types;

pub use types::{AppSftpState, FileItem};

mod console;
pub mod keymap;
mod state;
mod tab;
mod types;

pub use tab::TabId;
pub use types::{App, Focus};

pub mod command;
pub mod controller;
pub mod history;
pub mod listing;
pub mod output;
pub mod path;
pub mod protocol;
pub mod queue;
pub mod state;
pub mod transport;

pub use controller::{SessionController, TransportCommand};
pub use state::SessionPhase;

use crate::session::listing::Listing;
use crate::session::output::OutputBlock;
use crate::session::state::SessionPhase;

/// Raw activity of the backend process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Line(String),
    Stderr(String),
    /// Process exited; `None` when killed by a signal.
    Exited(Option<i32>),
}

/// What the session controller publishes to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Output(OutputBlock),
    Listing(Listing),
    /// A download finished; the local directory changed.
    LocalChanged,
    Phase(SessionPhase),
}

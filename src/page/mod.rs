//! The page the widget draws into and the host it runs inside.
pub mod dispatch;
pub mod document;
pub mod host;

pub use dispatch::{Action, DispatchTable, EventKind};
pub use document::{Document, NodeId};
pub use host::{Host, Navigator, SessionStorage, UserInteraction};
#[cfg(test)]
pub use host::RecordingHost;

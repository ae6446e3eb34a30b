//! Editing session lifecycle.
//!
//! `EditorSession::open` wires one record to one editor frame and returns a
//! [`SessionHandle`]; the session itself runs as a driver task that owns the
//! state machine, the channel adapter and the bus subscription.

mod driver;
mod editor_session;

pub use editor_session::{EditorSession, LaunchContext, SessionDeps, SessionHandle};

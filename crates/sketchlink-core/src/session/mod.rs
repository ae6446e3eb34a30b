//! Editing session domain module.
//!
//! One session covers a single open-edit-save (or abandon) interaction with
//! the embedded editor for one record.
//!
//! # Module Structure
//!
//! - `state`: Named lifecycle states (`SessionState`)
//! - `machine`: Sans-I/O state machine and the directives it emits

mod machine;
mod state;

// Re-export public API
pub use machine::{
    Directive, MISSING_RECORD_MESSAGE, SAVED_MESSAGE, SessionMachine,
};
pub use state::SessionState;

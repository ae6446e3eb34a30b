pub mod config;
pub mod csp;
pub mod error;
pub mod export;
pub mod host;
pub mod protocol;
pub mod record;
pub mod session;

// Re-export common error type
pub use error::{BridgeError, Result};

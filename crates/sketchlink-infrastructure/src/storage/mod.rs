//! File storage primitives shared by the file-backed repositories.

pub mod atomic_toml;

pub use atomic_toml::{AtomicTomlFile, write_bytes_atomic};

//! Configuration management for Argos.
//!
//! Persisted defaults for the scan options, stored in the XDG config directory.

mod settings;

pub use settings::{AppSettings, Paths};

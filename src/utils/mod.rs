//! Utility modules for DOM access and display formatting.
//!
//! Provides:
//! - [`dom`] - Window, document and localStorage access
//! - [`format`] - File sizes and playback times

pub mod dom;
pub mod format;

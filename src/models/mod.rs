//! Data models and types for the application.
//!
//! Contains domain types for:
//! - [`Entry`], [`EntryKind`] - File browser entries and their ordering
//! - [`BrowseState`], [`LayoutMode`], [`NavTarget`] - File browser state
//! - [`Screen`], [`Control`], [`ScreenContext`] - Screens and focus regions
//! - [`PlaybackSession`], [`Progress`], [`EngineKind`] - Playback state

mod browse;
mod entry;
mod playback;
mod screen;

pub use browse::{BrowseState, LayoutMode, NavTarget, PendingNavigation};
pub use entry::{file_uri, sort_entries, Entry, EntryKind};
pub use playback::{EngineKind, PlaybackSession, Progress};
pub use screen::{Control, Screen, ScreenContext};

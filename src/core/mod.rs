//! Core business logic for the media player.
//!
//! This module provides:
//! - [`FormatClassifier`] file-name classification
//! - [`Navigator`] and the pure [`transition`] function for remote input
//! - [`ListRenderer`] batched file-list rendering
//! - [`ThumbnailPipeline`] video preview acquisition
//! - [`PlaybackController`] over the [`MediaEngine`] adapters
//! - [`AppController`] tying them together

pub mod classifier;
pub mod controller;
pub mod engine;
pub mod error;
pub mod input;
pub mod navigation;
pub mod playback;
pub mod renderer;
pub mod resume;
pub mod storage;
pub mod store;
pub mod task;
pub mod thumbnail;

pub use classifier::FormatClassifier;
pub use controller::{AppController, HeaderView, Presenter, Services};
pub use engine::{AdvancedEngine, MediaEngine, SimpleEngine};
pub use input::Input;
pub use navigation::{transition, Navigator};
pub use playback::PlaybackController;
pub use renderer::{ListRenderer, RenderItem, RenderSurface};
pub use thumbnail::{ThumbnailOutcome, ThumbnailPipeline};

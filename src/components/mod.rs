//! UI components built with Leptos.
//!
//! Every screen is mounted once and shown or hidden by the active
//! [`Screen`](crate::models::Screen); the controller only flips signals.
//!
//! - [`browser`] - Device list and file browser (list and grid layouts)
//! - [`player`] - Video surface, buffering indicator and control strip
//! - [`viewer`] - Full-screen image viewer
//! - [`icons`] - Centralized icon definitions (change theme here)

pub mod browser;
pub mod icons;
pub mod player;
pub mod viewer;

pub use browser::{Browser, FILE_LIST_ID};
pub use player::Player;
pub use viewer::{ImageViewer, IMAGE_VIEWER_ID};

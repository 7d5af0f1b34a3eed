//! Application configuration.
//!
//! Centralizes all configuration constants used throughout the application.
//! Heuristics that a deployment may want to tune are gathered in
//! [`PlayerConfig`], which can be overridden by a JSON document stored in
//! localStorage under [`storage_keys::PLAYER_CONFIG`].

use serde::{Deserialize, Serialize};

use crate::core::store::KeyValueStore;

// =============================================================================
// Application Metadata
// =============================================================================

/// Application name displayed in the header at the device list.
pub const APP_NAME: &str = "Tyson Player";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Icon theme options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(dead_code)]
pub enum IconTheme {
    Lucide,
    Bootstrap,
}

/// Icon theme used by the player controls and header.
pub const ICON_THEME: IconTheme = IconTheme::Lucide;

// =============================================================================
// Browser Configuration
// =============================================================================

/// File browser defaults.
pub mod browser {
    /// Number of entries rendered per batch.
    pub const BATCH_SIZE: usize = 20;
    /// Number of columns in grid layout.
    pub const GRID_COLUMNS: usize = 5;
    /// Focus within this many positions of the rendered end loads another batch.
    pub const PROXIMITY_WINDOW: usize = 10;
    /// Scrolling within this many pixels of the rendered end loads another batch.
    pub const SCROLL_PROXIMITY_PX: f64 = 300.0;
    /// Delay between successive thumbnail requests within one batch.
    pub const THUMBNAIL_STAGGER_MS: u32 = 100;
    /// Path shown while the device list is on screen.
    pub const ROOT_PATH: &str = "/";
}

// =============================================================================
// Thumbnail Configuration
// =============================================================================

/// Frame-capture heuristics for video thumbnails.
pub mod thumbnails {
    pub const WIDTH: u32 = 320;
    pub const HEIGHT: u32 = 180;
    pub const JPEG_QUALITY: f64 = 0.7;
    /// Upper bound on one decode attempt, metadata through encode.
    pub const PROBE_TIMEOUT_MS: u32 = 5000;
    pub const MAX_ATTEMPTS: u32 = 3;
    /// A sample is near-black when every channel is below this value.
    pub const BLACK_THRESHOLD: u8 = 10;
    pub const INITIAL_SEEK_SECS: f64 = 3.0;
    pub const INITIAL_SEEK_FRACTION: f64 = 0.05;
    pub const END_GUARD_SECS: f64 = 0.1;
    pub const RETRY_STEP_SECS: f64 = 2.0;
    pub const RETRY_CEILING_FRACTION: f64 = 0.15;
    /// Maximum number of previews kept in memory.
    pub const CACHE_CAPACITY: usize = 256;
}

// =============================================================================
// Playback Configuration
// =============================================================================

/// Playback session defaults.
pub mod playback {
    /// Seconds skipped by a single seek command.
    pub const SEEK_STEP_SECS: f64 = 10.0;
    /// Controls overlay hides after this delay unless a control is focused.
    pub const CONTROLS_HIDE_MS: u32 = 5000;
    /// Display rectangle for the advanced engine (x, y, width, height).
    pub const DISPLAY_RECT: (i32, i32, i32, i32) = (0, 0, 1920, 1080);
    /// Display method for the advanced engine.
    pub const DISPLAY_METHOD: &str = "PLAYER_DISPLAY_MODE_AUTO_ASPECT_RATIO";
    /// Positions below this are not worth resuming.
    pub const RESUME_MIN_SECS: f64 = 1.0;
    /// Positions this close to the end count as finished.
    pub const RESUME_END_GUARD_SECS: f64 = 5.0;
}

// =============================================================================
// Persistence Keys
// =============================================================================

/// localStorage keys.
pub mod storage_keys {
    /// JSON map of video path to resume position in seconds.
    pub const RESUME_INDEX: &str = "resume_positions";
    /// Optional JSON override of [`super::PlayerConfig`].
    pub const PLAYER_CONFIG: &str = "player_config";
}

// =============================================================================
// Media Formats
// =============================================================================

/// Extensions played by the video engine.
pub const DEFAULT_VIDEO_FORMATS: &[&str] = &[
    ".mp4", ".mkv", ".mov", ".wmv", ".webm", ".m4v", ".3gp", ".mpeg", ".mpg", ".avi", ".flv",
    ".ts", ".m2ts", ".dat", ".divx",
];

/// Extensions shown in the image viewer.
pub const DEFAULT_IMAGE_FORMATS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".heic", ".heif",
];

/// Image extensions that are listed but cannot be decoded by the runtime.
pub const UNSUPPORTED_IMAGE_FORMATS: &[&str] = &[".heic", ".heif"];

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Thumbnail heuristics, overridable at runtime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailSettings {
    pub width: u32,
    pub height: u32,
    pub quality: f64,
    pub timeout_ms: u32,
    pub max_attempts: u32,
    pub black_threshold: u8,
    pub initial_seek_secs: f64,
    pub initial_seek_fraction: f64,
    pub end_guard_secs: f64,
    pub retry_step_secs: f64,
    pub retry_ceiling_fraction: f64,
    pub cache_capacity: usize,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            width: thumbnails::WIDTH,
            height: thumbnails::HEIGHT,
            quality: thumbnails::JPEG_QUALITY,
            timeout_ms: thumbnails::PROBE_TIMEOUT_MS,
            max_attempts: thumbnails::MAX_ATTEMPTS,
            black_threshold: thumbnails::BLACK_THRESHOLD,
            initial_seek_secs: thumbnails::INITIAL_SEEK_SECS,
            initial_seek_fraction: thumbnails::INITIAL_SEEK_FRACTION,
            end_guard_secs: thumbnails::END_GUARD_SECS,
            retry_step_secs: thumbnails::RETRY_STEP_SECS,
            retry_ceiling_fraction: thumbnails::RETRY_CEILING_FRACTION,
            cache_capacity: thumbnails::CACHE_CAPACITY,
        }
    }
}

/// Player configuration.
///
/// Every field has a compiled-in default; a stored override only needs to
/// name the fields it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub video_formats: Vec<String>,
    pub image_formats: Vec<String>,
    pub unsupported_image_formats: Vec<String>,
    pub grid_columns: usize,
    pub batch_size: usize,
    /// Order media files ahead of other files within the non-folder tier.
    pub media_first: bool,
    pub seek_step_secs: f64,
    pub thumbnail_stagger_ms: u32,
    pub thumbnails: ThumbnailSettings,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            video_formats: to_owned_list(DEFAULT_VIDEO_FORMATS),
            image_formats: to_owned_list(DEFAULT_IMAGE_FORMATS),
            unsupported_image_formats: to_owned_list(UNSUPPORTED_IMAGE_FORMATS),
            grid_columns: browser::GRID_COLUMNS,
            batch_size: browser::BATCH_SIZE,
            media_first: false,
            seek_step_secs: playback::SEEK_STEP_SECS,
            thumbnail_stagger_ms: browser::THUMBNAIL_STAGGER_MS,
            thumbnails: ThumbnailSettings::default(),
        }
    }
}

impl PlayerConfig {
    /// Parse a configuration override from JSON.
    ///
    /// Zero column or batch counts fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        if config.grid_columns == 0 {
            config.grid_columns = browser::GRID_COLUMNS;
        }
        if config.batch_size == 0 {
            config.batch_size = browser::BATCH_SIZE;
        }
        Ok(config)
    }

    /// Load the configuration, applying a stored override when present.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(json) = store.get(storage_keys::PLAYER_CONFIG) else {
            return Self::default();
        };

        match Self::from_json(&json) {
            Ok(config) => {
                log::info!("Loaded player configuration override");
                config
            }
            Err(e) => {
                log::warn!("Ignoring malformed player configuration: {}", e);
                Self::default()
            }
        }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

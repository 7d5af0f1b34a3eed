//! Centralized icon definitions.
//!
//! Icon theme is configured in `config.rs` via `ICON_THEME`.
//! This module maps semantic icon names to the selected theme's icons.

use icondata::Icon;

use crate::config::IconTheme;
use crate::models::EntryKind;

// =============================================================================
// Theme Imports
// =============================================================================

mod lucide {
    pub use icondata::{
        LuArrowLeft as Back, LuFastForward as SeekForward, LuFile as File, LuFilm as Video,
        LuFolder as Folder, LuHardDrive as Drive, LuImage as Image, LuLayoutGrid as Grid,
        LuList as List, LuPause as Pause, LuPlay as Play, LuRewind as SeekBack,
    };
}

mod bootstrap {
    pub use icondata::{
        BsArrowLeft as Back, BsFastForwardFill as SeekForward, BsFileEarmark as File,
        BsFilm as Video, BsFolderFill as Folder, BsGrid as Grid, BsHddFill as Drive,
        BsImage as Image, BsListUl as List, BsPauseFill as Pause, BsPlayFill as Play,
        BsRewindFill as SeekBack,
    };
}

// =============================================================================
// Icon Constants (selected based on theme)
// =============================================================================

macro_rules! themed_icon {
    ($name:ident, $theme_name:ident) => {
        pub const $name: Icon = match crate::config::ICON_THEME {
            IconTheme::Lucide => lucide::$theme_name,
            IconTheme::Bootstrap => bootstrap::$theme_name,
        };
    };
}

themed_icon!(PLAY, Play);
themed_icon!(PAUSE, Pause);
themed_icon!(SEEK_BACK, SeekBack);
themed_icon!(SEEK_FORWARD, SeekForward);
themed_icon!(BACK, Back);
themed_icon!(LIST, List);
themed_icon!(GRID, Grid);
themed_icon!(DRIVE, Drive);
themed_icon!(FOLDER, Folder);
themed_icon!(VIDEO, Video);
themed_icon!(IMAGE, Image);
themed_icon!(FILE, File);

/// Icon for a browser entry.
pub fn entry_icon(kind: EntryKind) -> Icon {
    match kind {
        EntryKind::UsbRoot => DRIVE,
        EntryKind::Folder => FOLDER,
        EntryKind::Video => VIDEO,
        EntryKind::Image => IMAGE,
        EntryKind::Other => FILE,
    }
}

//! Remote-control input mapping.

/// Logical remote input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    Left,
    Right,
    Ok,
    Back,
    /// Media play/pause keys
    TogglePlay,
    /// Red colour key
    ToggleLayout,
}

/// Raw key codes delivered by the TV runtime.
pub mod key_codes {
    pub const BACK: u32 = 10009;
    pub const ESCAPE: u32 = 27;
    pub const ENTER: u32 = 13;
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
    pub const MEDIA_PLAY: u32 = 415;
    pub const MEDIA_PAUSE: u32 = 19;
    pub const MEDIA_PLAY_PAUSE: u32 = 10252;
    pub const COLOR_RED: u32 = 403;
}

/// Keys that must be registered with the runtime before they are delivered.
pub const REGISTERED_KEYS: &[&str] = &["MediaPlay", "MediaPause", "MediaPlayPause", "ColorF0Red"];

impl Input {
    /// Map a raw key code. Unknown codes are ignored.
    pub fn from_key_code(code: u32) -> Option<Self> {
        use key_codes::*;

        match code {
            BACK | ESCAPE => Some(Self::Back),
            ENTER => Some(Self::Ok),
            UP => Some(Self::Up),
            DOWN => Some(Self::Down),
            LEFT => Some(Self::Left),
            RIGHT => Some(Self::Right),
            MEDIA_PLAY | MEDIA_PAUSE | MEDIA_PLAY_PAUSE => Some(Self::TogglePlay),
            COLOR_RED => Some(Self::ToggleLayout),
            _ => None,
        }
    }
}

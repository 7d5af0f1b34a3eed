//! Playback session types.

/// Which engine backs the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineKind {
    /// HTML media element, seconds, implicit state
    Simple,
    /// Platform open/prepare/play engine, milliseconds, explicit state
    Advanced,
}

/// Position report, always in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Progress {
    pub position: f64,
    pub duration: f64,
}

impl Progress {
    /// Played fraction in `[0, 1]`, 0 while the duration is unknown.
    pub fn fraction(&self) -> f64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// The video currently owned by the player.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackSession {
    pub engine: EngineKind,
    pub current_path: String,
    pub title: String,
    pub is_playing: bool,
    pub position_seconds: f64,
    pub duration_seconds: f64,
}

impl PlaybackSession {
    pub fn new(engine: EngineKind, path: &str, title: &str) -> Self {
        Self {
            engine,
            current_path: path.to_string(),
            title: title.to_string(),
            is_playing: false,
            position_seconds: 0.0,
            duration_seconds: 0.0,
        }
    }

    pub fn progress(&self) -> Progress {
        Progress {
            position: self.position_seconds,
            duration: self.duration_seconds,
        }
    }
}

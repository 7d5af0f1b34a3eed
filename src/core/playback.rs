//! Playback session controller.
//!
//! Wraps the active [`MediaEngine`] behind one play/pause/seek contract and
//! owns resume save/restore. Engine callbacks are fed back through
//! [`PlaybackController::handle_engine_event`].

use std::rc::Rc;

use crate::core::engine::{
    codec_hint, diagnostic, EngineEvent, EngineSignal, MediaEngine, SignalSink,
};
use crate::core::error::{PlaybackError, StoreError};
use crate::core::resume::ResumeIndex;
use crate::core::store::KeyValueStore;
use crate::models::{EngineKind, Entry, PlaybackSession, Progress};

/// Session change worth showing on the player screen.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionUpdate {
    /// Media loaded and playback requested.
    Ready(Progress),
    Progress(Progress),
    Playing(bool),
    Buffering(bool),
    /// Stream finished; the session is gone.
    Ended,
    /// Playback failed; the session is gone. Carries the user-facing diagnostic.
    Failed(String),
}

type ProgressListener = Box<dyn FnMut(Progress)>;

pub struct PlaybackController {
    engine: Box<dyn MediaEngine>,
    store: Rc<dyn KeyValueStore>,
    resume: ResumeIndex,
    session: Option<PlaybackSession>,
    /// Absolute target applied once the engine reports ready.
    queued_seek: Option<f64>,
    listeners: Vec<ProgressListener>,
}

impl PlaybackController {
    pub fn new(engine: Box<dyn MediaEngine>, store: Rc<dyn KeyValueStore>) -> Self {
        let resume = ResumeIndex::load(store.as_ref());
        log::info!(
            "Playback engine: {:?}, {} resume positions",
            engine.kind(),
            resume.len()
        );
        Self {
            engine,
            store,
            resume,
            session: None,
            queued_seek: None,
            listeners: Vec::new(),
        }
    }

    pub fn attach(&mut self, sink: SignalSink) {
        self.engine.attach(sink);
    }

    pub fn engine_kind(&self) -> EngineKind {
        self.engine.kind()
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Current position in seconds, 0 without a session.
    pub fn position(&self) -> f64 {
        match &self.session {
            Some(_) if self.engine.is_ready() => self.engine.position(),
            Some(session) => session.position_seconds,
            None => 0.0,
        }
    }

    /// Register a callback for every position report.
    pub fn on_progress(&mut self, listener: impl FnMut(Progress) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// User-facing message for a failure while playing `name`.
    pub fn describe(&self, name: &str, error: &PlaybackError) -> String {
        diagnostic(error, codec_hint(name, self.engine.kind()))
    }

    /// Start playing `entry`, ending any current session first.
    ///
    /// A stored resume position is applied once the engine is ready.
    pub fn play(&mut self, entry: &Entry) -> Result<(), PlaybackError> {
        if self.session.is_some() {
            self.stop();
        }

        let session = PlaybackSession::new(self.engine.kind(), &entry.path, &entry.name);
        self.queued_seek = self.resume.get(&entry.path);
        if let Some(at) = self.queued_seek {
            log::info!("Resuming {} at {:.1}s", entry.path, at);
        }

        if let Err(e) = self.engine.open(&entry.uri()) {
            log::warn!("Failed to open {}: {}", entry.path, e);
            self.queued_seek = None;
            return Err(e);
        }
        self.session = Some(session);
        Ok(())
    }

    /// Toggle between playing and paused. Returns whether playback is now running.
    pub fn toggle_play_pause(&mut self) -> Result<bool, PlaybackError> {
        if self.session.is_none() {
            return Err(PlaybackError::NotReady);
        }

        let playing = if self.engine.is_playing() {
            self.engine.pause()?;
            false
        } else {
            self.engine.play()?;
            true
        };
        if let Some(session) = &mut self.session {
            session.is_playing = playing;
        }
        Ok(playing)
    }

    /// Seek relative to the current position, clamped to the stream.
    ///
    /// Before the engine is ready the target is queued.
    pub fn seek(&mut self, delta_seconds: f64) -> Result<(), PlaybackError> {
        let Some(session) = &self.session else {
            return Err(PlaybackError::NotReady);
        };

        if !self.engine.is_ready() {
            let base = self.queued_seek.unwrap_or(session.position_seconds);
            self.queued_seek = Some((base + delta_seconds).max(0.0));
            return Ok(());
        }

        let duration = self.engine.duration();
        let mut target = (self.engine.position() + delta_seconds).max(0.0);
        if duration.is_finite() && duration > 0.0 {
            target = target.min(duration);
        }
        self.engine.seek_to(target)
    }

    /// End the session, remembering where it stopped.
    pub fn stop(&mut self) {
        self.record_position();
        if let Some(session) = self.session.take() {
            log::info!("Stopped {}", session.current_path);
        }
        self.queued_seek = None;
        self.engine.close();
    }

    /// Store the current position in the resume index (not yet persisted).
    pub fn record_position(&mut self) {
        let Some(session) = &self.session else {
            return;
        };
        if self.engine.is_ready() {
            self.resume.record(
                &session.current_path,
                self.engine.position(),
                self.engine.duration(),
            );
        }
    }

    /// Write the resume index to the store.
    pub fn persist_resume(&self) -> Result<(), StoreError> {
        self.resume.save(self.store.as_ref())
    }

    /// Feed a raw engine notification through the active engine.
    pub fn handle_engine_event(&mut self, signal: EngineSignal) -> Option<SessionUpdate> {
        let event = self.engine.on_signal(signal)?;
        if self.session.is_none() {
            return None;
        }

        let update = match event {
            EngineEvent::Ready { duration } => self.on_ready(duration),
            EngineEvent::Progress(progress) => {
                if let Some(session) = &mut self.session {
                    session.position_seconds = progress.position;
                    session.duration_seconds = progress.duration;
                }
                for listener in &mut self.listeners {
                    listener(progress);
                }
                SessionUpdate::Progress(progress)
            }
            EngineEvent::Playing(playing) => {
                if let Some(session) = &mut self.session {
                    session.is_playing = playing;
                }
                SessionUpdate::Playing(playing)
            }
            EngineEvent::Buffering(buffering) => SessionUpdate::Buffering(buffering),
            EngineEvent::Completed => {
                if let Some(session) = self.session.take() {
                    log::info!("Finished {}", session.current_path);
                    self.resume.clear(&session.current_path);
                }
                self.queued_seek = None;
                if let Err(e) = self.persist_resume() {
                    log::warn!("Failed to save resume positions: {}", e);
                }
                SessionUpdate::Ended
            }
            EngineEvent::Failed(error) => self.fail(error),
        };
        Some(update)
    }

    fn on_ready(&mut self, duration: f64) -> SessionUpdate {
        if let Some(target) = self.queued_seek.take() {
            if let Err(e) = self.engine.seek_to(target) {
                log::warn!("Resume seek to {:.1}s failed: {}", target, e);
            }
        }
        if let Err(e) = self.engine.play() {
            return self.fail(e);
        }

        let position = self.engine.position();
        let Some(session) = &mut self.session else {
            return SessionUpdate::Ended;
        };
        session.duration_seconds = duration;
        session.position_seconds = position;
        session.is_playing = true;
        SessionUpdate::Ready(session.progress())
    }

    fn fail(&mut self, error: PlaybackError) -> SessionUpdate {
        let name = self
            .session
            .take()
            .map(|s| s.title)
            .unwrap_or_default();
        log::warn!("Playback of {} failed: {}", name, error);
        self.queued_seek = None;
        self.engine.close();
        SessionUpdate::Failed(self.describe(&name, &error))
    }
}

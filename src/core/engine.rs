//! Media engine adapters.
//!
//! Two platform engines are supported behind [`MediaEngine`]:
//!
//! - [`SimpleEngine`] drives an HTML media element. Times are in seconds and
//!   state is implicit in the element's play/pause/ended events.
//! - [`AdvancedEngine`] drives the platform open/prepare/play engine. Times
//!   are in milliseconds, state is explicit, and errors carry structured codes.
//!
//! Platform callbacks arrive as [`EngineSignal`]s through a [`SignalSink`] and
//! are translated by the active engine into uniform [`EngineEvent`]s.

use std::rc::Rc;

use crate::config::playback::{DISPLAY_METHOD, DISPLAY_RECT};
use crate::core::error::{EngineErrorKind, PlaybackError};
use crate::models::{EngineKind, Progress};

// =============================================================================
// Signals and events
// =============================================================================

/// Event reported by the HTML media element binding.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementSignal {
    LoadedMetadata,
    Playing,
    Paused,
    TimeUpdate,
    Waiting,
    CanPlay,
    Ended,
    /// Media error or rejected play request, with its error name.
    Error(String),
}

/// Callback reported by the advanced engine binding.
#[derive(Clone, Debug, PartialEq)]
pub enum AvPlaySignal {
    Prepared,
    PrepareFailed(String),
    BufferingStart,
    BufferingComplete,
    /// Current position in milliseconds.
    CurrentTime(u64),
    StreamCompleted,
    /// Structured error code, e.g. `PLAYER_ERROR_NOT_SUPPORTED_FILE`.
    Error(String),
}

/// Raw notification from whichever engine binding is active.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineSignal {
    Element(ElementSignal),
    AvPlay(AvPlaySignal),
}

/// Receives raw engine notifications.
pub type SignalSink = Rc<dyn Fn(EngineSignal)>;

/// Engine-independent event, times in seconds.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// Media loaded; seeking is now allowed.
    Ready { duration: f64 },
    Progress(Progress),
    Playing(bool),
    Buffering(bool),
    /// Stream played to the end; resources are already released.
    Completed,
    /// Unrecoverable error; resources are already released.
    Failed(PlaybackError),
}

/// Uniform playback contract over both engines.
pub trait MediaEngine {
    fn kind(&self) -> EngineKind;
    /// Route platform notifications to `sink`.
    fn attach(&mut self, sink: SignalSink);
    /// Release any previous media and start loading `uri`.
    ///
    /// Readiness is reported later as [`EngineEvent::Ready`].
    fn open(&mut self, uri: &str) -> Result<(), PlaybackError>;
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self) -> Result<(), PlaybackError>;
    /// Seek to an absolute position in seconds, clamped to the stream.
    fn seek_to(&mut self, secs: f64) -> Result<(), PlaybackError>;
    fn position(&self) -> f64;
    fn duration(&self) -> f64;
    fn is_playing(&self) -> bool;
    /// Whether the media is loaded far enough to seek and play.
    fn is_ready(&self) -> bool;
    /// Stop playback and release decoder resources.
    fn close(&mut self);
    /// Translate a raw notification. Signals for another engine are ignored.
    fn on_signal(&mut self, signal: EngineSignal) -> Option<EngineEvent>;
}

fn clamp_to_stream(secs: f64, duration: f64) -> f64 {
    let upper = if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        f64::MAX
    };
    secs.clamp(0.0, upper)
}

// =============================================================================
// Codec hints
// =============================================================================

/// Likely cause of a playback failure, guessed from the file name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodecHint {
    Avi,
    Hevc,
    Mkv,
    Flv,
    TenBit,
    Hdr,
}

impl CodecHint {
    pub fn advice(self) -> &'static str {
        match self {
            Self::Avi => {
                "This AVI file may use an unsupported codec such as old DivX or XviD. \
                 Try converting it to MP4 (H.264)."
            }
            Self::Hevc => {
                "HEVC/H.265 video may use a profile, bit depth or bitrate this TV cannot \
                 decode. Try converting it to H.264."
            }
            Self::Mkv => {
                "The audio or video codec inside this MKV may not be supported \
                 (Vorbis audio, VP9 video, Hi10P). Try MP4 with H.264 and AAC."
            }
            Self::Flv => "FLV is an old Flash video format. Convert it to MP4.",
            Self::TenBit => "10-bit video is not supported. Use an 8-bit version.",
            Self::Hdr => "HDR video may not be supported. Try an SDR version.",
        }
    }
}

/// Guess a codec problem from the file name.
pub fn codec_hint(name: &str, engine: EngineKind) -> Option<CodecHint> {
    let name = name.to_lowercase();
    match engine {
        EngineKind::Advanced => {
            if name.ends_with(".avi") {
                Some(CodecHint::Avi)
            } else if name.contains("hevc") || name.contains("x265") {
                Some(CodecHint::Hevc)
            } else if name.ends_with(".mkv") {
                Some(CodecHint::Mkv)
            } else if name.ends_with(".flv") {
                Some(CodecHint::Flv)
            } else {
                None
            }
        }
        EngineKind::Simple => {
            if name.contains("hevc") || name.contains("x265") || name.contains("h265") {
                Some(CodecHint::Hevc)
            } else if name.contains("10bit") {
                Some(CodecHint::TenBit)
            } else if name.contains("hdr") {
                Some(CodecHint::Hdr)
            } else if name.ends_with(".mkv") {
                Some(CodecHint::Mkv)
            } else {
                None
            }
        }
    }
}

/// User-facing message for a playback failure.
pub fn diagnostic(error: &PlaybackError, hint: Option<CodecHint>) -> String {
    match hint {
        Some(hint) => format!("{}\n\n{}", error, hint.advice()),
        None => error.to_string(),
    }
}

// =============================================================================
// Simple engine
// =============================================================================

/// HTML media element surface.
pub trait MediaElement {
    /// Install event listeners that forward to `sink`.
    fn attach(&self, sink: SignalSink);
    fn load(&self, uri: &str);
    /// Request playback; a rejection is reported as [`ElementSignal::Error`].
    fn play(&self);
    fn pause(&self);
    fn current_time(&self) -> f64;
    fn set_current_time(&self, secs: f64);
    fn duration(&self) -> f64;
    fn is_paused(&self) -> bool;
    /// Drop the source so the decoder is released.
    fn unload(&self);
    fn set_visible(&self, visible: bool);
}

/// Map an element error name onto an error kind.
fn element_error_kind(name: &str) -> EngineErrorKind {
    match name {
        "MEDIA_ERR_SRC_NOT_SUPPORTED" | "MEDIA_ERR_DECODE" | "NotSupportedError" => {
            EngineErrorKind::UnsupportedFormat
        }
        "MEDIA_ERR_NETWORK" => EngineErrorKind::ConnectionFailed,
        _ => EngineErrorKind::Generic,
    }
}

/// [`MediaEngine`] over an HTML media element.
pub struct SimpleEngine<E> {
    element: E,
    loaded: bool,
    opened: bool,
}

impl<E: MediaElement> SimpleEngine<E> {
    pub fn new(element: E) -> Self {
        Self {
            element,
            loaded: false,
            opened: false,
        }
    }
}

impl<E: MediaElement> MediaEngine for SimpleEngine<E> {
    fn kind(&self) -> EngineKind {
        EngineKind::Simple
    }

    fn attach(&mut self, sink: SignalSink) {
        self.element.attach(sink);
    }

    fn open(&mut self, uri: &str) -> Result<(), PlaybackError> {
        self.element.unload();
        self.element.set_visible(true);
        self.element.load(uri);
        self.loaded = false;
        self.opened = true;
        Ok(())
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if !self.loaded {
            return Err(PlaybackError::NotReady);
        }
        self.element.play();
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        if !self.loaded {
            return Err(PlaybackError::NotReady);
        }
        self.element.pause();
        Ok(())
    }

    fn seek_to(&mut self, secs: f64) -> Result<(), PlaybackError> {
        if !self.loaded {
            return Err(PlaybackError::NotReady);
        }
        self.element
            .set_current_time(clamp_to_stream(secs, self.element.duration()));
        Ok(())
    }

    fn position(&self) -> f64 {
        self.element.current_time()
    }

    fn duration(&self) -> f64 {
        self.element.duration()
    }

    fn is_playing(&self) -> bool {
        self.loaded && !self.element.is_paused()
    }

    fn is_ready(&self) -> bool {
        self.loaded
    }

    fn close(&mut self) {
        if self.opened {
            self.element.pause();
            self.element.unload();
            self.element.set_visible(false);
        }
        self.loaded = false;
        self.opened = false;
    }

    fn on_signal(&mut self, signal: EngineSignal) -> Option<EngineEvent> {
        let EngineSignal::Element(signal) = signal else {
            return None;
        };
        if !self.opened {
            return None;
        }

        let event = match signal {
            ElementSignal::LoadedMetadata => {
                self.loaded = true;
                EngineEvent::Ready {
                    duration: self.element.duration(),
                }
            }
            ElementSignal::Playing => EngineEvent::Playing(true),
            ElementSignal::Paused => EngineEvent::Playing(false),
            ElementSignal::TimeUpdate => EngineEvent::Progress(Progress {
                position: self.element.current_time(),
                duration: self.element.duration(),
            }),
            ElementSignal::Waiting => EngineEvent::Buffering(true),
            ElementSignal::CanPlay => EngineEvent::Buffering(false),
            ElementSignal::Ended => {
                self.close();
                EngineEvent::Completed
            }
            ElementSignal::Error(name) => {
                self.close();
                EngineEvent::Failed(PlaybackError::Engine {
                    kind: element_error_kind(&name),
                    code: name,
                })
            }
        };
        Some(event)
    }
}

// =============================================================================
// Advanced engine
// =============================================================================

/// Platform open/prepare/play engine. Times are in milliseconds.
///
/// Errors are the platform's exception messages.
pub trait AvPlayApi {
    fn open(&self, uri: &str) -> Result<(), String>;
    /// Route listener callbacks and prepare completion to `sink`.
    fn set_listener(&self, sink: SignalSink) -> Result<(), String>;
    fn set_display_rect(&self, x: i32, y: i32, width: i32, height: i32) -> Result<(), String>;
    fn set_display_method(&self, method: &str) -> Result<(), String>;
    /// Completion is reported as [`AvPlaySignal::Prepared`] or [`AvPlaySignal::PrepareFailed`].
    fn prepare_async(&self) -> Result<(), String>;
    fn play(&self) -> Result<(), String>;
    fn pause(&self) -> Result<(), String>;
    fn seek_to(&self, ms: u64) -> Result<(), String>;
    fn stop(&self) -> Result<(), String>;
    fn close(&self) -> Result<(), String>;
    fn current_time_ms(&self) -> u64;
    fn duration_ms(&self) -> u64;
}

/// Explicit lifecycle of the advanced engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AvPlayState {
    Idle,
    Opening,
    Preparing,
    Ready,
    Playing,
    Paused,
    Completed,
    Error,
}

/// [`MediaEngine`] over the platform open/prepare/play engine.
pub struct AdvancedEngine<A> {
    api: A,
    state: AvPlayState,
    sink: Option<SignalSink>,
}

impl<A: AvPlayApi> AdvancedEngine<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: AvPlayState::Idle,
            sink: None,
        }
    }

    pub fn state(&self) -> AvPlayState {
        self.state
    }

    /// Stop and close, ignoring failures from an engine that holds nothing.
    fn release(&mut self) {
        if let Err(e) = self.api.stop() {
            log::debug!("avplay stop: {}", e);
        }
        if let Err(e) = self.api.close() {
            log::debug!("avplay close: {}", e);
        }
        self.state = AvPlayState::Idle;
    }

    fn prepare(&mut self, uri: &str) -> Result<(), String> {
        self.state = AvPlayState::Opening;
        self.api.open(uri)?;
        if let Some(sink) = &self.sink {
            self.api.set_listener(sink.clone())?;
        }
        let (x, y, w, h) = DISPLAY_RECT;
        self.api.set_display_rect(x, y, w, h)?;
        self.api.set_display_method(DISPLAY_METHOD)?;
        self.api.prepare_async()?;
        self.state = AvPlayState::Preparing;
        Ok(())
    }

    fn fail(&mut self, error: PlaybackError) -> EngineEvent {
        self.release();
        self.state = AvPlayState::Error;
        EngineEvent::Failed(error)
    }
}

impl<A: AvPlayApi> MediaEngine for AdvancedEngine<A> {
    fn kind(&self) -> EngineKind {
        EngineKind::Advanced
    }

    fn attach(&mut self, sink: SignalSink) {
        self.sink = Some(sink);
    }

    fn open(&mut self, uri: &str) -> Result<(), PlaybackError> {
        self.release();
        self.prepare(uri).map_err(|e| {
            self.release();
            self.state = AvPlayState::Error;
            PlaybackError::PrepareFailed(e)
        })
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        match self.state {
            AvPlayState::Playing => Ok(()),
            AvPlayState::Ready | AvPlayState::Paused => {
                self.api.play().map_err(|e| PlaybackError::Engine {
                    kind: EngineErrorKind::Generic,
                    code: e,
                })?;
                self.state = AvPlayState::Playing;
                Ok(())
            }
            _ => Err(PlaybackError::NotReady),
        }
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        match self.state {
            AvPlayState::Paused => Ok(()),
            AvPlayState::Playing => {
                self.api.pause().map_err(|e| PlaybackError::Engine {
                    kind: EngineErrorKind::Generic,
                    code: e,
                })?;
                self.state = AvPlayState::Paused;
                Ok(())
            }
            _ => Err(PlaybackError::NotReady),
        }
    }

    fn seek_to(&mut self, secs: f64) -> Result<(), PlaybackError> {
        if !self.is_ready() {
            return Err(PlaybackError::NotReady);
        }
        let target = clamp_to_stream(secs, self.duration());
        self.api
            .seek_to((target * 1000.0).round() as u64)
            .map_err(|e| PlaybackError::Engine {
                kind: EngineErrorKind::SeekFailed,
                code: e,
            })
    }

    fn position(&self) -> f64 {
        self.api.current_time_ms() as f64 / 1000.0
    }

    fn duration(&self) -> f64 {
        self.api.duration_ms() as f64 / 1000.0
    }

    fn is_playing(&self) -> bool {
        self.state == AvPlayState::Playing
    }

    fn is_ready(&self) -> bool {
        matches!(
            self.state,
            AvPlayState::Ready | AvPlayState::Playing | AvPlayState::Paused
        )
    }

    fn close(&mut self) {
        self.release();
    }

    fn on_signal(&mut self, signal: EngineSignal) -> Option<EngineEvent> {
        let EngineSignal::AvPlay(signal) = signal else {
            return None;
        };

        let event = match (self.state, signal) {
            (AvPlayState::Preparing, AvPlaySignal::Prepared) => {
                self.state = AvPlayState::Ready;
                EngineEvent::Ready {
                    duration: self.duration(),
                }
            }
            (AvPlayState::Preparing, AvPlaySignal::PrepareFailed(e)) => {
                self.fail(PlaybackError::PrepareFailed(e))
            }
            (AvPlayState::Idle | AvPlayState::Completed | AvPlayState::Error, _) => return None,
            (_, AvPlaySignal::BufferingStart) => EngineEvent::Buffering(true),
            (_, AvPlaySignal::BufferingComplete) => EngineEvent::Buffering(false),
            (_, AvPlaySignal::CurrentTime(ms)) => EngineEvent::Progress(Progress {
                position: ms as f64 / 1000.0,
                duration: self.duration(),
            }),
            (_, AvPlaySignal::StreamCompleted) => {
                self.release();
                self.state = AvPlayState::Completed;
                EngineEvent::Completed
            }
            (_, AvPlaySignal::Error(code)) => self.fail(PlaybackError::Engine {
                kind: EngineErrorKind::from_code(&code),
                code,
            }),
            (_, AvPlaySignal::Prepared | AvPlaySignal::PrepareFailed(_)) => return None,
        };
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    // =========================================================================
    // Codec hints
    // =========================================================================

    #[test]
    fn test_codec_hints_advanced() {
        let k = EngineKind::Advanced;
        assert_eq!(codec_hint("Movie.AVI", k), Some(CodecHint::Avi));
        assert_eq!(codec_hint("show.x265.mp4", k), Some(CodecHint::Hevc));
        assert_eq!(codec_hint("anime.mkv", k), Some(CodecHint::Mkv));
        assert_eq!(codec_hint("old.flv", k), Some(CodecHint::Flv));
        assert_eq!(codec_hint("movie.h265.mp4", k), None);
    }

    #[test]
    fn test_codec_hints_simple() {
        let k = EngineKind::Simple;
        assert_eq!(codec_hint("movie.h265.mp4", k), Some(CodecHint::Hevc));
        assert_eq!(codec_hint("movie.10bit.mp4", k), Some(CodecHint::TenBit));
        assert_eq!(codec_hint("movie.HDR.mp4", k), Some(CodecHint::Hdr));
        assert_eq!(codec_hint("movie.mkv", k), Some(CodecHint::Mkv));
        assert_eq!(codec_hint("movie.avi", k), None);
    }

    #[test]
    fn test_diagnostic_appends_advice() {
        let err = PlaybackError::Engine {
            kind: EngineErrorKind::UnsupportedFormat,
            code: "PLAYER_ERROR_NOT_SUPPORTED_FILE".into(),
        };
        let text = diagnostic(&err, Some(CodecHint::Flv));
        assert!(text.starts_with("Video format not supported"));
        assert!(text.ends_with(CodecHint::Flv.advice()));
        assert_eq!(diagnostic(&err, None), err.to_string());
    }

    // =========================================================================
    // Simple engine
    // =========================================================================

    #[derive(Default)]
    struct FakeElement {
        calls: RefCell<Vec<String>>,
        time: Cell<f64>,
        duration: Cell<f64>,
        paused: Cell<bool>,
    }

    impl MediaElement for &FakeElement {
        fn attach(&self, _sink: SignalSink) {}
        fn load(&self, uri: &str) {
            self.calls.borrow_mut().push(format!("load:{}", uri));
        }
        fn play(&self) {
            self.paused.set(false);
            self.calls.borrow_mut().push("play".into());
        }
        fn pause(&self) {
            self.paused.set(true);
            self.calls.borrow_mut().push("pause".into());
        }
        fn current_time(&self) -> f64 {
            self.time.get()
        }
        fn set_current_time(&self, secs: f64) {
            self.time.set(secs);
            self.calls.borrow_mut().push(format!("time:{}", secs));
        }
        fn duration(&self) -> f64 {
            self.duration.get()
        }
        fn is_paused(&self) -> bool {
            self.paused.get()
        }
        fn unload(&self) {
            self.calls.borrow_mut().push("unload".into());
        }
        fn set_visible(&self, visible: bool) {
            self.calls.borrow_mut().push(format!("visible:{}", visible));
        }
    }

    #[test]
    fn test_simple_engine_requires_metadata() {
        let element = FakeElement::default();
        element.duration.set(120.0);
        let mut engine = SimpleEngine::new(&element);

        engine.open("file:///usb/a.mp4").unwrap();
        assert_eq!(engine.seek_to(10.0), Err(PlaybackError::NotReady));
        assert_eq!(engine.play(), Err(PlaybackError::NotReady));

        let event = engine.on_signal(EngineSignal::Element(ElementSignal::LoadedMetadata));
        assert_eq!(event, Some(EngineEvent::Ready { duration: 120.0 }));
        engine.seek_to(500.0).unwrap();
        assert_eq!(element.time.get(), 120.0);
        engine.play().unwrap();
        assert!(engine.is_playing());
    }

    #[test]
    fn test_simple_engine_ended_releases() {
        let element = FakeElement::default();
        let mut engine = SimpleEngine::new(&element);
        engine.open("file:///usb/a.mp4").unwrap();
        engine.on_signal(EngineSignal::Element(ElementSignal::LoadedMetadata));

        let event = engine.on_signal(EngineSignal::Element(ElementSignal::Ended));
        assert_eq!(event, Some(EngineEvent::Completed));
        assert!(!engine.is_ready());
        let calls = element.calls.borrow();
        assert_eq!(calls[calls.len() - 3..], ["pause", "unload", "visible:false"]);
        drop(calls);

        assert_eq!(
            engine.on_signal(EngineSignal::Element(ElementSignal::TimeUpdate)),
            None
        );
    }

    #[test]
    fn test_simple_engine_maps_errors() {
        let element = FakeElement::default();
        let mut engine = SimpleEngine::new(&element);
        engine.open("file:///usb/a.mkv").unwrap();

        let event = engine.on_signal(EngineSignal::Element(ElementSignal::Error(
            "MEDIA_ERR_SRC_NOT_SUPPORTED".into(),
        )));
        assert!(matches!(
            event,
            Some(EngineEvent::Failed(PlaybackError::Engine {
                kind: EngineErrorKind::UnsupportedFormat,
                ..
            }))
        ));
    }

    #[test]
    fn test_simple_engine_ignores_advanced_signals() {
        let element = FakeElement::default();
        let mut engine = SimpleEngine::new(&element);
        engine.open("file:///usb/a.mp4").unwrap();
        assert_eq!(
            engine.on_signal(EngineSignal::AvPlay(AvPlaySignal::Prepared)),
            None
        );
    }

    // =========================================================================
    // Advanced engine
    // =========================================================================

    #[derive(Default)]
    struct FakeAvPlay {
        calls: RefCell<Vec<String>>,
        time_ms: Cell<u64>,
        duration_ms: Cell<u64>,
        fail_open: bool,
    }

    impl AvPlayApi for &FakeAvPlay {
        fn open(&self, uri: &str) -> Result<(), String> {
            self.calls.borrow_mut().push(format!("open:{}", uri));
            if self.fail_open {
                Err("InvalidValuesError".into())
            } else {
                Ok(())
            }
        }
        fn set_listener(&self, _sink: SignalSink) -> Result<(), String> {
            self.calls.borrow_mut().push("listener".into());
            Ok(())
        }
        fn set_display_rect(&self, x: i32, y: i32, w: i32, h: i32) -> Result<(), String> {
            self.calls
                .borrow_mut()
                .push(format!("rect:{},{},{},{}", x, y, w, h));
            Ok(())
        }
        fn set_display_method(&self, method: &str) -> Result<(), String> {
            self.calls.borrow_mut().push(format!("method:{}", method));
            Ok(())
        }
        fn prepare_async(&self) -> Result<(), String> {
            self.calls.borrow_mut().push("prepare".into());
            Ok(())
        }
        fn play(&self) -> Result<(), String> {
            self.calls.borrow_mut().push("play".into());
            Ok(())
        }
        fn pause(&self) -> Result<(), String> {
            self.calls.borrow_mut().push("pause".into());
            Ok(())
        }
        fn seek_to(&self, ms: u64) -> Result<(), String> {
            self.calls.borrow_mut().push(format!("seek:{}", ms));
            Ok(())
        }
        fn stop(&self) -> Result<(), String> {
            self.calls.borrow_mut().push("stop".into());
            Ok(())
        }
        fn close(&self) -> Result<(), String> {
            self.calls.borrow_mut().push("close".into());
            Ok(())
        }
        fn current_time_ms(&self) -> u64 {
            self.time_ms.get()
        }
        fn duration_ms(&self) -> u64 {
            self.duration_ms.get()
        }
    }

    fn prepared(api: &FakeAvPlay) -> AdvancedEngine<&FakeAvPlay> {
        let mut engine = AdvancedEngine::new(api);
        engine.attach(Rc::new(|_: EngineSignal| {}));
        engine.open("file:///usb/a.mp4").unwrap();
        engine.on_signal(EngineSignal::AvPlay(AvPlaySignal::Prepared));
        engine
    }

    #[test]
    fn test_advanced_open_sequence() {
        let api = FakeAvPlay::default();
        let mut engine = AdvancedEngine::new(&api);
        engine.attach(Rc::new(|_: EngineSignal| {}));

        engine.open("file:///usb/a.mp4").unwrap();
        assert_eq!(engine.state(), AvPlayState::Preparing);
        assert_eq!(
            *api.calls.borrow(),
            vec![
                "stop",
                "close",
                "open:file:///usb/a.mp4",
                "listener",
                "rect:0,0,1920,1080",
                "method:PLAYER_DISPLAY_MODE_AUTO_ASPECT_RATIO",
                "prepare",
            ]
        );
    }

    #[test]
    fn test_advanced_open_failure() {
        let api = FakeAvPlay {
            fail_open: true,
            ..Default::default()
        };
        let mut engine = AdvancedEngine::new(&api);
        let err = engine.open("file:///usb/a.mp4").unwrap_err();
        assert_eq!(err, PlaybackError::PrepareFailed("InvalidValuesError".into()));
        assert_eq!(engine.state(), AvPlayState::Error);
    }

    #[test]
    fn test_advanced_seek_rejected_before_ready() {
        let api = FakeAvPlay::default();
        let mut engine = AdvancedEngine::new(&api);
        engine.open("file:///usb/a.mp4").unwrap();
        assert_eq!(engine.seek_to(5.0), Err(PlaybackError::NotReady));
        assert_eq!(engine.play(), Err(PlaybackError::NotReady));
    }

    #[test]
    fn test_advanced_units_and_state() {
        let api = FakeAvPlay::default();
        api.duration_ms.set(90_000);
        let mut engine = prepared(&api);
        assert_eq!(engine.state(), AvPlayState::Ready);

        engine.seek_to(42.5).unwrap();
        engine.seek_to(1000.0).unwrap();
        assert!(api.calls.borrow().contains(&"seek:42500".to_string()));
        assert!(api.calls.borrow().contains(&"seek:90000".to_string()));

        engine.play().unwrap();
        assert_eq!(engine.state(), AvPlayState::Playing);
        engine.pause().unwrap();
        assert_eq!(engine.state(), AvPlayState::Paused);

        let event = engine.on_signal(EngineSignal::AvPlay(AvPlaySignal::CurrentTime(4_500)));
        assert_eq!(
            event,
            Some(EngineEvent::Progress(Progress {
                position: 4.5,
                duration: 90.0
            }))
        );
    }

    #[test]
    fn test_advanced_completion_releases() {
        let api = FakeAvPlay::default();
        let mut engine = prepared(&api);
        engine.play().unwrap();
        api.calls.borrow_mut().clear();

        let event = engine.on_signal(EngineSignal::AvPlay(AvPlaySignal::StreamCompleted));
        assert_eq!(event, Some(EngineEvent::Completed));
        assert_eq!(engine.state(), AvPlayState::Completed);
        assert_eq!(*api.calls.borrow(), vec!["stop", "close"]);

        assert_eq!(
            engine.on_signal(EngineSignal::AvPlay(AvPlaySignal::CurrentTime(1))),
            None
        );
    }

    #[test]
    fn test_advanced_error_codes() {
        let api = FakeAvPlay::default();
        let mut engine = prepared(&api);

        let event = engine.on_signal(EngineSignal::AvPlay(AvPlaySignal::Error(
            "PLAYER_ERROR_NO_SUCH_FILE".into(),
        )));
        assert_eq!(
            event,
            Some(EngineEvent::Failed(PlaybackError::Engine {
                kind: EngineErrorKind::FileNotFound,
                code: "PLAYER_ERROR_NO_SUCH_FILE".into(),
            }))
        );
        assert_eq!(engine.state(), AvPlayState::Error);
    }

    #[test]
    fn test_advanced_prepare_failure() {
        let api = FakeAvPlay::default();
        let mut engine = AdvancedEngine::new(&api);
        engine.open("file:///usb/a.mp4").unwrap();

        let event = engine.on_signal(EngineSignal::AvPlay(AvPlaySignal::PrepareFailed(
            "PLAYER_ERROR_NOT_SUPPORTED_FILE".into(),
        )));
        assert!(matches!(
            event,
            Some(EngineEvent::Failed(PlaybackError::PrepareFailed(_)))
        ));
    }

    #[test]
    fn test_buffering_events() {
        let api = FakeAvPlay::default();
        let mut engine = prepared(&api);
        assert_eq!(
            engine.on_signal(EngineSignal::AvPlay(AvPlaySignal::BufferingStart)),
            Some(EngineEvent::Buffering(true))
        );
        assert_eq!(
            engine.on_signal(EngineSignal::AvPlay(AvPlaySignal::BufferingComplete)),
            Some(EngineEvent::Buffering(false))
        );
    }
}

//! Video thumbnail acquisition.
//!
//! A preview is obtained through an ordered chain:
//!
//! 1. the in-memory LRU cache,
//! 2. decoding a frame with an off-surface [`FrameProbe`], bounded by a timeout,
//! 3. the platform [`ContentIndex`],
//! 4. a generic fallback glyph (never cached).
//!
//! Failures are logged and never reach the user.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use futures::future::LocalBoxFuture;

use crate::config::ThumbnailSettings;
use crate::core::error::ThumbnailError;
use crate::core::task::{race_with_timeout, RaceResult, Timer};
use crate::models::file_uri;

// =============================================================================
// Collaborators
// =============================================================================

/// Off-surface video decoder used to grab preview frames.
pub trait FrameProbe {
    /// Load `path` and resolve once its metadata (duration) is known.
    fn open<'a>(
        &'a self,
        path: &'a str,
    ) -> LocalBoxFuture<'a, Result<Box<dyn ProbeSession>, ThumbnailError>>;
}

/// One loaded probe.
pub trait ProbeSession {
    /// Stream duration in seconds.
    fn duration(&self) -> f64;
    /// Seek and resolve with the position actually reached, in seconds.
    fn seek(&mut self, secs: f64) -> LocalBoxFuture<'_, Result<f64, ThumbnailError>>;
    /// Draw the current frame at `width`×`height` and sample its centre pixel (RGB).
    fn capture(&mut self, width: u32, height: u32) -> Result<[u8; 3], ThumbnailError>;
    /// Encode the last captured frame as a JPEG data URL.
    fn encode(&mut self, quality: f64) -> Result<String, ThumbnailError>;
    /// Detach the media source and free the decoder.
    fn release(&mut self);
}

/// Platform index of precomputed previews.
pub trait ContentIndex {
    /// Preview URI for the item whose content URI is exactly `uri`.
    fn lookup<'a>(&'a self, uri: &'a str) -> LocalBoxFuture<'a, Result<String, ThumbnailError>>;
}

/// Releases its probe session when dropped, including on timeout.
struct ProbeGuard(Box<dyn ProbeSession>);

impl Deref for ProbeGuard {
    type Target = dyn ProbeSession;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl DerefMut for ProbeGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

impl Drop for ProbeGuard {
    fn drop(&mut self) {
        self.0.release();
    }
}

// =============================================================================
// Cache
// =============================================================================

/// Size-bounded LRU map from video path to preview handle.
///
/// Recency is tracked with stamped queue nodes; a node whose stamp no longer
/// matches its entry is stale and skipped on eviction.
#[derive(Debug)]
pub struct ThumbnailCache {
    capacity: usize,
    next_stamp: u64,
    entries: HashMap<String, (String, u64)>,
    lru: VecDeque<(String, u64)>,
}

impl ThumbnailCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            next_stamp: 1,
            entries: HashMap::new(),
            lru: VecDeque::new(),
        }
    }

    /// Look up a preview, marking it most recently used.
    pub fn get(&mut self, path: &str) -> Option<String> {
        let stamp = self.alloc_stamp();
        let (handle, entry_stamp) = self.entries.get_mut(path)?;
        *entry_stamp = stamp;
        let handle = handle.clone();
        self.lru.push_back((path.to_string(), stamp));
        self.compact();
        Some(handle)
    }

    /// Store a preview. Writing the same path again replaces the handle.
    pub fn insert(&mut self, path: &str, handle: String) {
        let stamp = self.alloc_stamp();
        self.entries.insert(path.to_string(), (handle, stamp));
        self.lru.push_back((path.to_string(), stamp));
        self.evict_to_fit();
        self.compact();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    fn alloc_stamp(&mut self) -> u64 {
        let s = self.next_stamp;
        self.next_stamp = self.next_stamp.wrapping_add(1);
        s
    }

    fn is_live(&self, key: &str, stamp: u64) -> bool {
        self.entries.get(key).is_some_and(|(_, s)| *s == stamp)
    }

    fn evict_to_fit(&mut self) {
        while self.entries.len() > self.capacity {
            let Some((key, stamp)) = self.lru.pop_front() else {
                break;
            };
            if self.is_live(&key, stamp) {
                self.entries.remove(&key);
            }
        }
    }

    /// Drop stale nodes once the queue grows well past the entry count.
    fn compact(&mut self) {
        if self.lru.len() <= self.capacity.saturating_mul(4).max(32) {
            return;
        }
        let lru = std::mem::take(&mut self.lru);
        self.lru = lru
            .into_iter()
            .filter(|(key, stamp)| self.is_live(key, *stamp))
            .collect();
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Result of a thumbnail request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ThumbnailOutcome {
    /// Displayable preview (data URL or platform URI).
    Ready(String),
    /// Show the generic video glyph.
    Fallback,
}

/// First seek target: a little into the stream, never past its end.
pub fn initial_seek(duration: f64, settings: &ThumbnailSettings) -> f64 {
    settings
        .initial_seek_secs
        .min(duration * settings.initial_seek_fraction)
        .min(duration - settings.end_guard_secs)
        .max(0.0)
}

/// Seek target after a near-black frame at `current`.
pub fn retry_seek(current: f64, duration: f64, settings: &ThumbnailSettings) -> f64 {
    (current + settings.retry_step_secs)
        .min(duration * settings.retry_ceiling_fraction)
        .max(0.0)
}

/// Whether every channel of a sample is below `threshold`.
pub fn is_near_black(pixel: [u8; 3], threshold: u8) -> bool {
    pixel.iter().all(|&c| c < threshold)
}

/// Acquires and caches video previews.
pub struct ThumbnailPipeline {
    settings: ThumbnailSettings,
    cache: RefCell<ThumbnailCache>,
    probe: Option<Rc<dyn FrameProbe>>,
    index: Option<Rc<dyn ContentIndex>>,
    timer: Rc<dyn Timer>,
}

impl ThumbnailPipeline {
    pub fn new(
        settings: ThumbnailSettings,
        probe: Option<Rc<dyn FrameProbe>>,
        index: Option<Rc<dyn ContentIndex>>,
        timer: Rc<dyn Timer>,
    ) -> Self {
        let cache = RefCell::new(ThumbnailCache::new(settings.cache_capacity));
        Self {
            settings,
            cache,
            probe,
            index,
            timer,
        }
    }

    /// Preview for the video at `path`.
    pub async fn get_thumbnail(&self, path: &str) -> ThumbnailOutcome {
        if let Some(handle) = self.cache.borrow_mut().get(path) {
            return ThumbnailOutcome::Ready(handle);
        }

        match self.decode_with_timeout(path).await {
            Ok(handle) => return self.store(path, handle),
            Err(e) => log::debug!("Frame capture failed for {}: {}", path, e),
        }

        match self.lookup_index(path).await {
            Ok(handle) => return self.store(path, handle),
            Err(e) => log::debug!("Content index miss for {}: {}", path, e),
        }

        ThumbnailOutcome::Fallback
    }

    /// Number of cached previews.
    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }

    fn store(&self, path: &str, handle: String) -> ThumbnailOutcome {
        self.cache.borrow_mut().insert(path, handle.clone());
        ThumbnailOutcome::Ready(handle)
    }

    async fn decode_with_timeout(&self, path: &str) -> Result<String, ThumbnailError> {
        let Some(probe) = self.probe.as_ref() else {
            return Err(ThumbnailError::DecodeFailed("no frame probe".to_string()));
        };

        let decode = self.decode_frame(probe.as_ref(), path);
        match race_with_timeout(decode, self.timer.as_ref(), self.settings.timeout_ms).await {
            RaceResult::Completed(result) => result,
            RaceResult::TimedOut => Err(ThumbnailError::TimedOut),
        }
    }

    async fn decode_frame(&self, probe: &dyn FrameProbe, path: &str) -> Result<String, ThumbnailError> {
        let s = &self.settings;
        let mut session = ProbeGuard(probe.open(path).await?);

        let duration = session.duration();
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ThumbnailError::DecodeFailed(format!(
                "unusable duration {}",
                duration
            )));
        }

        let mut target = initial_seek(duration, s);
        let mut attempts = 0;
        loop {
            let reached = session.seek(target).await?;
            attempts += 1;

            let pixel = session.capture(s.width, s.height)?;
            if is_near_black(pixel, s.black_threshold) && attempts < s.max_attempts {
                target = retry_seek(reached, duration, s);
                continue;
            }

            return session.encode(s.quality);
        }
    }

    async fn lookup_index(&self, path: &str) -> Result<String, ThumbnailError> {
        let Some(index) = self.index.as_ref() else {
            return Err(ThumbnailError::IndexUnavailable("not supported".to_string()));
        };
        index.lookup(&file_uri(path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::testing::{InstantTimer, NeverTimer};
    use futures::future;

    const BLACK: [u8; 3] = [2, 3, 1];
    const BRIGHT: [u8; 3] = [120, 80, 60];

    #[derive(Default)]
    struct Log(RefCell<Vec<String>>);

    impl Log {
        fn push(&self, s: impl Into<String>) {
            self.0.borrow_mut().push(s.into());
        }
        fn count(&self, prefix: &str) -> usize {
            self.0.borrow().iter().filter(|s| s.starts_with(prefix)).count()
        }
        fn entries(&self) -> Vec<String> {
            self.0.borrow().clone()
        }
    }

    struct FakeProbe {
        log: Rc<Log>,
        duration: f64,
        frames: Vec<[u8; 3]>,
        fail_open: bool,
        hang_on_seek: bool,
    }

    impl FakeProbe {
        fn new(log: &Rc<Log>, frames: Vec<[u8; 3]>) -> Self {
            Self {
                log: log.clone(),
                duration: 100.0,
                frames,
                fail_open: false,
                hang_on_seek: false,
            }
        }
    }

    struct FakeSession {
        log: Rc<Log>,
        duration: f64,
        frames: Vec<[u8; 3]>,
        captured: usize,
        hang_on_seek: bool,
    }

    impl FrameProbe for FakeProbe {
        fn open<'a>(
            &'a self,
            path: &'a str,
        ) -> LocalBoxFuture<'a, Result<Box<dyn ProbeSession>, ThumbnailError>> {
            self.log.push(format!("open:{}", path));
            let result: Result<Box<dyn ProbeSession>, ThumbnailError> = if self.fail_open {
                Err(ThumbnailError::DecodeFailed("unsupported".into()))
            } else {
                Ok(Box::new(FakeSession {
                    log: self.log.clone(),
                    duration: self.duration,
                    frames: self.frames.clone(),
                    captured: 0,
                    hang_on_seek: self.hang_on_seek,
                }))
            };
            Box::pin(future::ready(result))
        }
    }

    impl ProbeSession for FakeSession {
        fn duration(&self) -> f64 {
            self.duration
        }

        fn seek(&mut self, secs: f64) -> LocalBoxFuture<'_, Result<f64, ThumbnailError>> {
            self.log.push(format!("seek:{}", secs));
            if self.hang_on_seek {
                Box::pin(future::pending())
            } else {
                Box::pin(future::ready(Ok(secs)))
            }
        }

        fn capture(&mut self, width: u32, height: u32) -> Result<[u8; 3], ThumbnailError> {
            self.log.push(format!("capture:{}x{}", width, height));
            let frame = self.frames.get(self.captured).copied().unwrap_or(BLACK);
            self.captured += 1;
            Ok(frame)
        }

        fn encode(&mut self, quality: f64) -> Result<String, ThumbnailError> {
            self.log.push(format!("encode:{}", quality));
            Ok(format!("data:image/jpeg;frame{}", self.captured))
        }

        fn release(&mut self) {
            self.log.push("release");
        }
    }

    struct FakeIndex {
        log: Rc<Log>,
        hit: Option<String>,
    }

    impl ContentIndex for FakeIndex {
        fn lookup<'a>(
            &'a self,
            uri: &'a str,
        ) -> LocalBoxFuture<'a, Result<String, ThumbnailError>> {
            self.log.push(format!("index:{}", uri));
            Box::pin(future::ready(self.hit.clone().ok_or(ThumbnailError::NotIndexed)))
        }
    }

    fn pipeline(probe: Option<FakeProbe>, index: Option<FakeIndex>) -> ThumbnailPipeline {
        ThumbnailPipeline::new(
            ThumbnailSettings::default(),
            probe.map(|p| Rc::new(p) as Rc<dyn FrameProbe>),
            index.map(|i| Rc::new(i) as Rc<dyn ContentIndex>),
            Rc::new(NeverTimer),
        )
    }

    #[test]
    fn test_seek_targets() {
        let s = ThumbnailSettings::default();
        assert_eq!(initial_seek(100.0, &s), 3.0);
        assert_eq!(initial_seek(20.0, &s), 1.0);
        assert!((initial_seek(0.05, &s) - 0.0).abs() < f64::EPSILON);
        assert_eq!(retry_seek(3.0, 100.0, &s), 5.0);
        assert_eq!(retry_seek(14.0, 100.0, &s), 15.0);
    }

    #[test]
    fn test_near_black() {
        assert!(is_near_black(BLACK, 10));
        assert!(!is_near_black([9, 9, 10], 10));
        assert!(!is_near_black(BRIGHT, 10));
    }

    #[tokio::test]
    async fn test_second_request_served_from_cache() {
        let log = Rc::new(Log::default());
        let p = pipeline(Some(FakeProbe::new(&log, vec![BRIGHT])), None);

        let first = p.get_thumbnail("usb1/a.mp4").await;
        let second = p.get_thumbnail("usb1/a.mp4").await;

        assert_eq!(first, second);
        assert!(matches!(first, ThumbnailOutcome::Ready(_)));
        assert_eq!(log.count("open"), 1);
        assert_eq!(log.count("release"), 1);
    }

    #[tokio::test]
    async fn test_black_frames_retry_then_encode() {
        let log = Rc::new(Log::default());
        let p = pipeline(Some(FakeProbe::new(&log, vec![BLACK, BRIGHT])), None);

        let outcome = p.get_thumbnail("usb1/a.mp4").await;

        assert_eq!(outcome, ThumbnailOutcome::Ready("data:image/jpeg;frame2".into()));
        assert_eq!(
            log.entries(),
            vec![
                "open:usb1/a.mp4",
                "seek:3",
                "capture:320x180",
                "seek:5",
                "capture:320x180",
                "encode:0.7",
                "release",
            ]
        );
    }

    #[tokio::test]
    async fn test_black_frame_retries_are_bounded() {
        let log = Rc::new(Log::default());
        let p = pipeline(Some(FakeProbe::new(&log, vec![BLACK; 10])), None);

        let outcome = p.get_thumbnail("usb1/dark.mp4").await;

        assert!(matches!(outcome, ThumbnailOutcome::Ready(_)));
        assert_eq!(log.count("seek"), 3);
        assert_eq!(log.count("encode"), 1);
        assert_eq!(log.count("release"), 1);
    }

    #[tokio::test]
    async fn test_content_index_after_decode_failure() {
        let log = Rc::new(Log::default());
        let mut probe = FakeProbe::new(&log, vec![]);
        probe.fail_open = true;
        let index = FakeIndex {
            log: log.clone(),
            hit: Some("file:///thumbs/a.jpg".into()),
        };
        let p = pipeline(Some(probe), Some(index));

        let outcome = p.get_thumbnail("/opt/usb/a.mp4").await;
        assert_eq!(outcome, ThumbnailOutcome::Ready("file:///thumbs/a.jpg".into()));
        assert_eq!(log.count("index:file:///opt/usb/a.mp4"), 1);

        p.get_thumbnail("/opt/usb/a.mp4").await;
        assert_eq!(log.count("index"), 1);
        assert_eq!(log.count("open"), 1);
    }

    #[tokio::test]
    async fn test_fallback_is_not_cached() {
        let log = Rc::new(Log::default());
        let mut probe = FakeProbe::new(&log, vec![]);
        probe.fail_open = true;
        let index = FakeIndex {
            log: log.clone(),
            hit: None,
        };
        let p = pipeline(Some(probe), Some(index));

        assert_eq!(p.get_thumbnail("usb1/a.mp4").await, ThumbnailOutcome::Fallback);
        assert_eq!(p.get_thumbnail("usb1/a.mp4").await, ThumbnailOutcome::Fallback);
        assert_eq!(log.count("open"), 2);
        assert_eq!(p.cached_len(), 0);
    }

    #[tokio::test]
    async fn test_timeout_releases_probe() {
        let log = Rc::new(Log::default());
        let mut probe = FakeProbe::new(&log, vec![BRIGHT]);
        probe.hang_on_seek = true;
        let p = ThumbnailPipeline::new(
            ThumbnailSettings::default(),
            Some(Rc::new(probe)),
            None,
            Rc::new(InstantTimer::default()),
        );

        assert_eq!(p.get_thumbnail("usb1/a.mp4").await, ThumbnailOutcome::Fallback);
        assert_eq!(log.count("release"), 1);
        assert_eq!(log.count("encode"), 0);
    }

    #[tokio::test]
    async fn test_zero_duration_fails_and_releases() {
        let log = Rc::new(Log::default());
        let mut probe = FakeProbe::new(&log, vec![BRIGHT]);
        probe.duration = 0.0;
        let p = pipeline(Some(probe), None);

        assert_eq!(p.get_thumbnail("usb1/a.mp4").await, ThumbnailOutcome::Fallback);
        assert_eq!(log.count("seek"), 0);
        assert_eq!(log.count("release"), 1);
    }

    #[tokio::test]
    async fn test_no_collaborators_falls_back() {
        let p = pipeline(None, None);
        assert_eq!(p.get_thumbnail("usb1/a.mp4").await, ThumbnailOutcome::Fallback);
    }

    #[test]
    fn test_cache_evicts_least_recently_used() {
        let mut cache = ThumbnailCache::new(2);
        cache.insert("a", "A".into());
        cache.insert("b", "B".into());
        assert_eq!(cache.get("a").as_deref(), Some("A"));

        cache.insert("c", "C".into());
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_overwrite_is_last_writer_wins() {
        let mut cache = ThumbnailCache::new(2);
        cache.insert("a", "old".into());
        cache.insert("a", "new".into());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").as_deref(), Some("new"));
    }

    #[test]
    fn test_cache_queue_stays_bounded() {
        let mut cache = ThumbnailCache::new(1);
        cache.insert("a", "A".into());
        for _ in 0..1000 {
            cache.get("a");
        }
        assert!(cache.lru.len() <= 33);
    }
}

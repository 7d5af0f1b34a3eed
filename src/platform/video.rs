//! HTML video bindings: the simple playback engine surface and the hidden
//! probe used to capture thumbnail frames.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    AddEventListenerOptions, CanvasRenderingContext2d, Document, Event, EventTarget,
    HtmlCanvasElement, HtmlVideoElement,
};

use super::js::{error_message, error_name};
use crate::config::thumbnails;
use crate::core::engine::{ElementSignal, EngineSignal, MediaElement, SignalSink};
use crate::core::error::ThumbnailError;
use crate::core::thumbnail::{FrameProbe, ProbeSession};
use crate::models::file_uri;
use crate::utils::dom;

// =============================================================================
// Playback element
// =============================================================================

type SharedSink = Rc<RefCell<Option<SignalSink>>>;

fn emit(sink: &SharedSink, signal: ElementSignal) {
    let target = sink.borrow().clone();
    if let Some(target) = target {
        target(EngineSignal::Element(signal));
    }
}

/// Name of the element's current media error.
fn media_error_name(video: &HtmlVideoElement) -> String {
    let code = video.error().map(|e| e.code()).unwrap_or(0);
    match code {
        1 => "MEDIA_ERR_ABORTED",
        2 => "MEDIA_ERR_NETWORK",
        3 => "MEDIA_ERR_DECODE",
        4 => "MEDIA_ERR_SRC_NOT_SUPPORTED",
        _ => "MEDIA_ERR_UNKNOWN",
    }
    .to_string()
}

/// [`MediaElement`] over the on-screen `<video>`.
pub struct VideoElement {
    video: HtmlVideoElement,
    sink: SharedSink,
    bound: Cell<bool>,
}

impl VideoElement {
    pub fn new(video: HtmlVideoElement) -> Self {
        Self {
            video,
            sink: Rc::new(RefCell::new(None)),
            bound: Cell::new(false),
        }
    }

    /// Install the forwarding listeners once.
    fn bind(&self) {
        if self.bound.replace(true) {
            return;
        }
        let events: [(&str, fn(&HtmlVideoElement) -> ElementSignal); 8] = [
            ("loadedmetadata", |_| ElementSignal::LoadedMetadata),
            ("playing", |_| ElementSignal::Playing),
            ("pause", |_| ElementSignal::Paused),
            ("timeupdate", |_| ElementSignal::TimeUpdate),
            ("waiting", |_| ElementSignal::Waiting),
            ("canplay", |_| ElementSignal::CanPlay),
            ("ended", |_| ElementSignal::Ended),
            ("error", |video| ElementSignal::Error(media_error_name(video))),
        ];
        for (name, to_signal) in events {
            let sink = Rc::clone(&self.sink);
            let video = self.video.clone();
            let closure = Closure::wrap(Box::new(move |_: Event| {
                emit(&sink, to_signal(&video));
            }) as Box<dyn Fn(Event)>);
            let _ = self
                .video
                .add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

impl MediaElement for VideoElement {
    fn attach(&self, sink: SignalSink) {
        *self.sink.borrow_mut() = Some(sink);
        self.bind();
    }

    fn load(&self, uri: &str) {
        self.video.set_src(uri);
        self.video.load();
    }

    fn play(&self) {
        let promise = match self.video.play() {
            Ok(promise) => promise,
            Err(e) => {
                emit(&self.sink, ElementSignal::Error(error_name(&e)));
                return;
            }
        };
        let sink = Rc::clone(&self.sink);
        spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                let name = error_name(&e);
                // Interrupted by a pause or a new source.
                if name == "AbortError" {
                    return;
                }
                log::warn!("play() rejected: {}", error_message(&e));
                emit(&sink, ElementSignal::Error(name));
            }
        });
    }

    fn pause(&self) {
        let _ = self.video.pause();
    }

    fn current_time(&self) -> f64 {
        self.video.current_time()
    }

    fn set_current_time(&self, secs: f64) {
        self.video.set_current_time(secs);
    }

    fn duration(&self) -> f64 {
        self.video.duration()
    }

    fn is_paused(&self) -> bool {
        self.video.paused()
    }

    fn unload(&self) {
        let _ = self.video.remove_attribute("src");
        self.video.load();
    }

    fn set_visible(&self, visible: bool) {
        self.video.set_hidden(!visible);
    }
}

// =============================================================================
// Frame probe
// =============================================================================

const PROBE_STYLE: &str = "position:absolute;left:-9999px;width:320px;height:180px;";

/// Resolve on the first `success` event, reject on the first `failure` event.
///
/// Whichever event fires first detaches both listeners.
fn next_event(target: &EventTarget, success: &str, failure: &str) -> JsFuture {
    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        let listeners: Rc<RefCell<Option<(Function, Function)>>> = Rc::new(RefCell::new(None));

        let detach = {
            let target = target.clone();
            let success = success.to_string();
            let failure = failure.to_string();
            let listeners = listeners.clone();
            move || {
                if let Some((on_success, on_failure)) = listeners.borrow_mut().take() {
                    let _ = target.remove_event_listener_with_callback(&success, &on_success);
                    let _ = target.remove_event_listener_with_callback(&failure, &on_failure);
                }
            }
        };
        let detach_on_failure = detach.clone();

        let on_success = Closure::once_into_js(move |_: JsValue| {
            detach();
            let _ = resolve.call0(&JsValue::UNDEFINED);
        });
        let on_failure = Closure::once_into_js(move |event: JsValue| {
            detach_on_failure();
            let _ = reject.call1(&JsValue::UNDEFINED, &event);
        });
        let on_success: Function = on_success.unchecked_into();
        let on_failure: Function = on_failure.unchecked_into();

        let options = AddEventListenerOptions::new();
        options.set_once(true);
        let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
            success,
            &on_success,
            &options,
        );
        let _ = target.add_event_listener_with_callback_and_add_event_listener_options(
            failure,
            &on_failure,
            &options,
        );
        *listeners.borrow_mut() = Some((on_success, on_failure));
    });
    JsFuture::from(promise)
}

fn create<T: JsCast>(document: &Document, tag: &str) -> Result<T, ThumbnailError> {
    document
        .create_element(tag)
        .map_err(|e| ThumbnailError::DecodeFailed(error_message(&e)))?
        .dyn_into::<T>()
        .map_err(|_| ThumbnailError::DecodeFailed(format!("<{}> unavailable", tag)))
}

/// [`FrameProbe`] backed by an off-screen `<video>` and a canvas.
pub struct VideoFrameProbe {
    document: Document,
}

impl VideoFrameProbe {
    pub fn new() -> Option<Self> {
        dom::document().map(|document| Self { document })
    }
}

impl FrameProbe for VideoFrameProbe {
    fn open<'a>(
        &'a self,
        path: &'a str,
    ) -> LocalBoxFuture<'a, Result<Box<dyn ProbeSession>, ThumbnailError>> {
        Box::pin(async move {
            let video: HtmlVideoElement = create(&self.document, "video")?;
            let _ = video.set_attribute("style", PROBE_STYLE);
            video.set_muted(true);
            video.set_preload("metadata");
            video.set_cross_origin(Some("anonymous"));

            let canvas: HtmlCanvasElement = create(&self.document, "canvas")?;
            canvas.set_width(thumbnails::WIDTH);
            canvas.set_height(thumbnails::HEIGHT);
            let context = canvas
                .get_context("2d")
                .ok()
                .flatten()
                .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
                .ok_or_else(|| ThumbnailError::DecodeFailed("no 2d context".to_string()))?;

            if let Some(body) = self.document.body() {
                let _ = body.append_child(&video);
            }

            // The session owns the element from here and removes it when dropped.
            let session = VideoProbeSession {
                video,
                canvas,
                context,
                released: false,
            };
            let loaded = next_event(&session.video, "loadedmetadata", "error");
            session.video.set_src(&file_uri(path));
            loaded
                .await
                .map_err(|e| ThumbnailError::DecodeFailed(error_message(&e)))?;
            Ok(Box::new(session) as Box<dyn ProbeSession>)
        })
    }
}

struct VideoProbeSession {
    video: HtmlVideoElement,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    released: bool,
}

impl ProbeSession for VideoProbeSession {
    fn duration(&self) -> f64 {
        self.video.duration()
    }

    fn seek(&mut self, secs: f64) -> LocalBoxFuture<'_, Result<f64, ThumbnailError>> {
        Box::pin(async move {
            let seeked = next_event(&self.video, "seeked", "error");
            self.video.set_current_time(secs);
            seeked
                .await
                .map_err(|e| ThumbnailError::DecodeFailed(error_message(&e)))?;
            Ok(self.video.current_time())
        })
    }

    fn capture(&mut self, width: u32, height: u32) -> Result<[u8; 3], ThumbnailError> {
        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }
        self.context
            .draw_image_with_html_video_element_and_dw_and_dh(
                &self.video,
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            )
            .map_err(|e| ThumbnailError::DecodeFailed(error_message(&e)))?;

        let pixel = self
            .context
            .get_image_data(f64::from(width / 2), f64::from(height / 2), 1.0, 1.0)
            .map_err(|e| ThumbnailError::DecodeFailed(error_message(&e)))?
            .data();
        match pixel.0.as_slice() {
            [r, g, b, ..] => Ok([*r, *g, *b]),
            _ => Err(ThumbnailError::DecodeFailed("empty frame sample".to_string())),
        }
    }

    fn encode(&mut self, quality: f64) -> Result<String, ThumbnailError> {
        self.canvas
            .to_data_url_with_type_and_encoder_options("image/jpeg", &JsValue::from_f64(quality))
            .map_err(|e| ThumbnailError::DecodeFailed(error_message(&e)))
    }

    fn release(&mut self) {
        if std::mem::replace(&mut self.released, true) {
            return;
        }
        let _ = self.video.pause();
        let _ = self.video.remove_attribute("src");
        self.video.load();
        self.video.remove();
    }
}

impl Drop for VideoProbeSession {
    fn drop(&mut self) {
        self.release();
    }
}

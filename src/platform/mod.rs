//! Bindings to the TV web runtime.
//!
//! Everything that touches `tizen.*`, `webapis.*` or the DOM media elements
//! lives here, behind the traits defined in [`crate::core`]. Capabilities are
//! detected at startup; a missing one degrades the feature instead of failing.

mod avplay;
mod js;
mod runtime;
mod storage;
mod video;

use js_sys::Reflect;
use web_sys::HtmlVideoElement;

pub use avplay::TizenAvPlay;
pub use runtime::{persistent_store, GlooTimer, WasmSpawner};
pub use storage::{TizenContentIndex, TizenStorage, UnavailableStorage};
pub use video::{VideoElement, VideoFrameProbe};

use crate::core::engine::{AdvancedEngine, MediaEngine, SimpleEngine};
use crate::core::error::PlaybackError;
use js::{call, error_message, global};

/// Id of the on-screen `<video>` used by the simple engine.
pub const VIDEO_ELEMENT_ID: &str = "video-player";

/// Pick the playback engine: the advanced engine when present, else the
/// `<video>` element.
pub fn select_engine() -> Result<Box<dyn MediaEngine>, PlaybackError> {
    if let Some(avplay) = TizenAvPlay::detect() {
        log::info!("Using AVPlay engine");
        return Ok(Box::new(AdvancedEngine::new(avplay)));
    }

    let video = crate::utils::dom::element_by_id::<HtmlVideoElement>(VIDEO_ELEMENT_ID)
        .ok_or_else(|| PlaybackError::Unavailable(format!("#{} not found", VIDEO_ELEMENT_ID)))?;
    log::info!("AVPlay unavailable, using HTML5 video");
    Ok(Box::new(SimpleEngine::new(VideoElement::new(video))))
}

/// Ask the runtime to deliver media keys that it would otherwise consume.
pub fn register_keys(keys: &[&str]) {
    let Some(input) = global(&["tizen", "tvinputdevice"]) else {
        log::debug!("tvinputdevice unavailable, media keys not registered");
        return;
    };
    for key in keys {
        if let Err(e) = call(&input, "registerKey", &[(*key).into()]) {
            log::warn!("Failed to register key {}: {}", key, e);
        }
    }
}

/// Terminate the application, falling back to closing the window.
pub fn exit_app() {
    let current = global(&["tizen", "application"])
        .and_then(|application| call(&application, "getCurrentApplication", &[]).ok());
    match current {
        Some(app) => {
            if let Err(e) = call(&app, "exit", &[]) {
                log::error!("Exit failed: {}", e);
            }
        }
        None => {
            if let Some(window) = crate::utils::dom::window()
                && let Err(e) = window.close()
            {
                log::error!("Exit failed: {}", error_message(&e));
            }
        }
    }
}

/// Whether `tizen.*` is present at all; false in a desktop browser.
pub fn is_tv_runtime() -> bool {
    crate::utils::dom::window()
        .and_then(|w| Reflect::get(&w, &"tizen".into()).ok())
        .is_some_and(|t| !t.is_undefined())
}

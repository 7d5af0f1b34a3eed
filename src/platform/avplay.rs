//! Binding for the platform `webapis.avplay` engine.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsValue;

use super::js::{call, error_message, global};
use crate::core::engine::{AvPlayApi, AvPlaySignal, EngineSignal, SignalSink};

type SharedSink = Rc<RefCell<Option<SignalSink>>>;

/// Deliver a signal without holding the sink borrow across the callback.
fn emit(sink: &SharedSink, signal: AvPlaySignal) {
    let target = sink.borrow().clone();
    if let Some(target) = target {
        target(EngineSignal::AvPlay(signal));
    }
}

/// [`AvPlayApi`] over `webapis.avplay`.
///
/// The listener object is built once and forwards to whichever sink was set
/// last, so callbacks from a closed stream never reach a dropped closure.
pub struct TizenAvPlay {
    avplay: Object,
    sink: SharedSink,
    listener: RefCell<Option<Object>>,
}

impl TizenAvPlay {
    pub fn detect() -> Option<Self> {
        global(&["webapis", "avplay"]).map(|avplay| Self {
            avplay,
            sink: Rc::new(RefCell::new(None)),
            listener: RefCell::new(None),
        })
    }

    fn call(&self, name: &str, args: &[JsValue]) -> Result<JsValue, String> {
        call(&self.avplay, name, args)
    }

    fn listener(&self) -> Object {
        if let Some(listener) = self.listener.borrow().as_ref() {
            return listener.clone();
        }

        let listener = Object::new();
        let handlers: [(&str, fn(JsValue) -> AvPlaySignal); 5] = [
            ("onbufferingstart", |_| AvPlaySignal::BufferingStart),
            ("onbufferingcomplete", |_| AvPlaySignal::BufferingComplete),
            ("oncurrentplaytime", |ms| {
                AvPlaySignal::CurrentTime(ms.as_f64().unwrap_or(0.0).max(0.0) as u64)
            }),
            ("onstreamcompleted", |_| AvPlaySignal::StreamCompleted),
            ("onerror", |event| AvPlaySignal::Error(error_message(&event))),
        ];
        for (name, to_signal) in handlers {
            let sink = Rc::clone(&self.sink);
            let closure = Closure::wrap(Box::new(move |value: JsValue| {
                emit(&sink, to_signal(value));
            }) as Box<dyn Fn(JsValue)>);
            let _ = Reflect::set(&listener, &name.into(), closure.as_ref());
            closure.forget();
        }

        *self.listener.borrow_mut() = Some(listener.clone());
        listener
    }
}

impl AvPlayApi for TizenAvPlay {
    fn open(&self, uri: &str) -> Result<(), String> {
        self.call("open", &[uri.into()]).map(|_| ())
    }

    fn set_listener(&self, sink: SignalSink) -> Result<(), String> {
        *self.sink.borrow_mut() = Some(sink);
        let listener = self.listener();
        self.call("setListener", &[listener.into()]).map(|_| ())
    }

    fn set_display_rect(&self, x: i32, y: i32, width: i32, height: i32) -> Result<(), String> {
        self.call(
            "setDisplayRect",
            &[x.into(), y.into(), width.into(), height.into()],
        )
        .map(|_| ())
    }

    fn set_display_method(&self, method: &str) -> Result<(), String> {
        self.call("setDisplayMethod", &[method.into()]).map(|_| ())
    }

    fn prepare_async(&self) -> Result<(), String> {
        let ok_sink = Rc::clone(&self.sink);
        let on_success = Closure::once_into_js(move || emit(&ok_sink, AvPlaySignal::Prepared));
        let err_sink = Rc::clone(&self.sink);
        let on_error = Closure::once_into_js(move |e: JsValue| {
            emit(&err_sink, AvPlaySignal::PrepareFailed(error_message(&e)));
        });
        self.call("prepareAsync", &[on_success, on_error]).map(|_| ())
    }

    fn play(&self) -> Result<(), String> {
        self.call("play", &[]).map(|_| ())
    }

    fn pause(&self) -> Result<(), String> {
        self.call("pause", &[]).map(|_| ())
    }

    fn seek_to(&self, ms: u64) -> Result<(), String> {
        self.call("seekTo", &[JsValue::from_f64(ms as f64)]).map(|_| ())
    }

    fn stop(&self) -> Result<(), String> {
        self.call("stop", &[]).map(|_| ())
    }

    fn close(&self) -> Result<(), String> {
        self.call("close", &[]).map(|_| ())
    }

    fn current_time_ms(&self) -> u64 {
        millis(self.call("getCurrentTime", &[]))
    }

    fn duration_ms(&self) -> u64 {
        millis(self.call("getDuration", &[]))
    }
}

fn millis(value: Result<JsValue, String>) -> u64 {
    value
        .ok()
        .and_then(|v| v.as_f64())
        .filter(|ms| ms.is_finite() && *ms > 0.0)
        .map(|ms| ms as u64)
        .unwrap_or(0)
}

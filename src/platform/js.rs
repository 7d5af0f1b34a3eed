//! Reflect-based helpers for calling platform objects that have no typed
//! bindings.

use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::utils::dom;

/// Walk `window.a.b.c`, returning `None` if any step is missing.
pub fn global(path: &[&str]) -> Option<Object> {
    let mut current: JsValue = dom::window()?.into();
    for key in path {
        current = Reflect::get(&current, &(*key).into()).ok()?;
        if current.is_undefined() || current.is_null() {
            return None;
        }
    }
    current.dyn_into::<Object>().ok()
}

/// Look up a method on `target`.
pub fn method(target: &JsValue, name: &str) -> Result<Function, String> {
    Reflect::get(target, &name.into())
        .map_err(|e| error_message(&e))?
        .dyn_into::<Function>()
        .map_err(|_| format!("{} is not a function", name))
}

/// Call `target.name(...args)`. Exceptions become their message.
pub fn call(target: &JsValue, name: &str, args: &[JsValue]) -> Result<JsValue, String> {
    let function = method(target, name)?;
    let args: Array = args.iter().collect();
    function.apply(target, &args).map_err(|e| error_message(&e))
}

/// Read a string property, empty when absent.
pub fn string_field(target: &JsValue, key: &str) -> String {
    Reflect::get(target, &key.into())
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

/// Elements of a JS array; anything else yields nothing.
pub fn array_items(value: &JsValue) -> Vec<JsValue> {
    value
        .dyn_ref::<Array>()
        .map(|array| array.iter().collect())
        .unwrap_or_default()
}

/// Error name, e.g. `AbortError` or `NotSupportedError`.
pub fn error_name(value: &JsValue) -> String {
    string_field(value, "name")
}

/// Human-readable text of a thrown value or error callback argument.
pub fn error_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    let message = string_field(value, "message");
    if !message.is_empty() {
        return message;
    }
    let name = error_name(value);
    if !name.is_empty() {
        return name;
    }
    format!("{:?}", value)
}

/// Await a callback-style platform API.
///
/// `start` receives the success and error callbacks to pass along; whichever
/// fires first settles the future. A synchronous failure rejects it.
pub async fn callback_promise<F>(start: F) -> Result<JsValue, JsValue>
where
    F: FnOnce(JsValue, JsValue) -> Result<JsValue, String>,
{
    let mut start = Some(start);
    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        let Some(start) = start.take() else {
            return;
        };
        if let Err(message) = start(resolve.into(), reject.clone().into()) {
            let _ = reject.call1(&JsValue::UNDEFINED, &JsValue::from_str(&message));
        }
    });
    JsFuture::from(promise).await
}

//! DOM and Web API utility functions.
//!
//! Provides safe, consistent access to browser APIs with proper error handling.

use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Storage,
    Window,
};

/// Get the browser window object.
#[inline]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Get the document of the current window.
#[inline]
pub fn document() -> Option<Document> {
    window()?.document()
}

/// Get localStorage.
#[inline]
pub fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok()?
}

/// Look up an element by id and cast it.
pub fn element_by_id<T: JsCast>(id: &str) -> Option<T> {
    document()?.get_element_by_id(id)?.dyn_into::<T>().ok()
}

/// Smoothly scroll the element matching `selector` into view.
///
/// Uses `block: nearest` so rows already visible do not move.
/// Returns `true` if the element was found.
pub fn scroll_into_view(selector: &str) -> bool {
    let Some(element) = document()
        .and_then(|d| d.query_selector(selector).ok().flatten())
    else {
        return false;
    };
    scroll_element(&element);
    true
}

fn scroll_element(element: &Element) {
    let options = ScrollIntoViewOptions::new();
    options.set_behavior(ScrollBehavior::Smooth);
    options.set_block(ScrollLogicalPosition::Nearest);
    element.scroll_into_view_with_scroll_into_view_options(&options);
}

/// Whether the page is currently hidden (app sent to background).
pub fn is_hidden() -> bool {
    document().is_some_and(|d| d.hidden())
}

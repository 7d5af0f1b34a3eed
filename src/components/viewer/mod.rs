//! Full-screen image viewer.

use leptos::prelude::*;

use crate::app::AppContext;
use crate::models::Screen;

stylance::import_crate_style!(css, "src/components/viewer/viewer.module.css");

/// Id of the `<img>` whose decode errors the controller listens for.
pub const IMAGE_VIEWER_ID: &str = "image-viewer";

#[component]
pub fn ImageViewer() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let image = ctx.image;

    let screen_class = move || {
        if ctx.screen.get() == Screen::Image {
            format!("{} {}", css::screen, css::active)
        } else {
            css::screen.to_string()
        }
    };

    view! {
        <section class=screen_class>
            <img
                id=IMAGE_VIEWER_ID
                class=css::image
                src=move || image.get().map(|i| i.uri)
                alt=move || image.get().map(|i| i.name).unwrap_or_default()
            />
            <div class=css::caption>
                {move || image.get().map(|i| i.name).unwrap_or_default()}
            </div>
        </section>
    }
}

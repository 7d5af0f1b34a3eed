//! File browser screen.

mod file_list;
mod header;

pub use file_list::{FileList, FILE_LIST_ID};
pub use header::BrowserHeader;

use leptos::prelude::*;

use crate::app::AppContext;
use crate::models::Screen;

stylance::import_crate_style!(css, "src/components/browser/browser.module.css");

/// Header, file list and loading overlay.
#[component]
pub fn Browser() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let loading = ctx.browser.loading;

    let screen_class = move || {
        if ctx.screen.get() == Screen::Browser {
            format!("{} {}", css::screen, css::active)
        } else {
            css::screen.to_string()
        }
    };

    view! {
        <section class=screen_class>
            <BrowserHeader />
            <FileList />
            <Show when=move || loading.with(|l| l.is_some())>
                <div class=css::loading>
                    <div class=css::spinner></div>
                    <div class=css::loadingText>
                        {move || loading.get().unwrap_or_default()}
                    </div>
                </div>
            </Show>
        </section>
    }
}

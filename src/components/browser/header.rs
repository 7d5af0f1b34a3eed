//! Browser header: location title, current path and the layout toggle.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::models::LayoutMode;

stylance::import_crate_style!(css, "src/components/browser/browser.module.css");

#[component]
pub fn BrowserHeader() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let header = ctx.browser.header;

    let toggle_class = move || {
        if header.with(|h| h.focused) {
            format!("{} {}", css::toggle, css::focused)
        } else {
            css::toggle.to_string()
        }
    };

    // The toggle offers the layout it would switch to.
    let toggle_target = move || match header.with(|h| h.layout) {
        LayoutMode::List => (ic::GRID, "Grid"),
        LayoutMode::Grid => (ic::LIST, "List"),
    };

    view! {
        <header class=css::header>
            <div class=css::title>
                <span class=css::titleIcon>
                    <Icon icon=ic::DRIVE />
                </span>
                <span class=css::titleLabel>{move || header.with(|h| h.title.clone())}</span>
            </div>
            <div class=css::path>{move || header.with(|h| h.path.clone())}</div>
            <div class=toggle_class role="button" aria-label="Toggle layout">
                {move || {
                    let (icon, label) = toggle_target();
                    view! {
                        <Icon icon=icon />
                        <span class=css::toggleLabel>{label}</span>
                    }
                }}
            </div>
        </header>
    }
}

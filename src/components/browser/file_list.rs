//! File list component.
//!
//! Renders the batches handed to the presenter, in rows or in a grid of
//! tiles. Video tiles show their preview once the thumbnail pipeline
//! delivers one; image tiles load the file itself.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::core::{RenderItem, ThumbnailOutcome};
use crate::models::{EntryKind, LayoutMode};

stylance::import_crate_style!(css, "src/components/browser/file_list.module.css");

/// Id of the scrollable list container.
pub const FILE_LIST_ID: &str = "file-list";

#[component]
pub fn FileList() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let browser = ctx.browser;

    let is_grid = move || browser.header.with(|h| h.layout == LayoutMode::Grid);
    let list_class = move || {
        if is_grid() {
            format!("{} {}", css::list, css::grid)
        } else {
            css::list.to_string()
        }
    };
    let list_style = move || {
        if is_grid() {
            format!("grid-template-columns: repeat({}, 1fr);", browser.grid_columns.get())
        } else {
            String::new()
        }
    };

    view! {
        <div id=FILE_LIST_ID class=list_class style=list_style role="listbox">
            {move || {
                browser
                    .message
                    .get()
                    .map(|message| view! { <div class=css::message>{message}</div> })
            }}
            <For
                each=move || browser.items.get()
                key=|item| (item.index, item.entry.path.clone(), item.layout == LayoutMode::Grid)
                children=move |item| {
                    view! { <FileItem item=item /> }
                }
            />
        </div>
    }
}

#[component]
fn FileItem(item: RenderItem) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let focused = ctx.browser.focused;

    let index = item.index;
    let is_focused = move || focused.get() == Some(index);

    match item.layout {
        LayoutMode::List => {
            let class = move || {
                if is_focused() {
                    format!("{} {}", css::row, css::focused)
                } else {
                    css::row.to_string()
                }
            };
            let name_class = if item.entry.kind.is_container() {
                format!("{} {}", css::rowName, css::nameDir)
            } else {
                css::rowName.to_string()
            };

            view! {
                <div
                    class=class
                    data-index=index.to_string()
                    role="option"
                    aria-selected=move || is_focused().to_string()
                >
                    <span class=css::rowIcon>
                        <Icon icon=ic::entry_icon(item.entry.kind) />
                    </span>
                    <span class=name_class>{item.entry.name.clone()}</span>
                    <span class=css::rowSize>{item.entry.size_label.clone()}</span>
                </div>
            }
            .into_any()
        }
        LayoutMode::Grid => {
            let class = move || {
                if is_focused() {
                    format!("{} {}", css::tile, css::focused)
                } else {
                    css::tile.to_string()
                }
            };

            view! {
                <div
                    class=class
                    data-index=index.to_string()
                    role="option"
                    aria-selected=move || is_focused().to_string()
                >
                    <div class=css::thumb>
                        <TilePreview item=item.clone() />
                    </div>
                    <div class=css::tileName>{item.entry.name.clone()}</div>
                    <div class=css::tileSize>{item.entry.size_label.clone()}</div>
                </div>
            }
            .into_any()
        }
    }
}

/// Preview area of a grid tile.
#[component]
fn TilePreview(item: RenderItem) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let thumbnails = ctx.browser.thumbnails;
    let index = item.index;
    let glyph = item.entry.glyph();

    match item.entry.kind {
        EntryKind::Video => {
            let preview = move || match thumbnails.with(|t| t.get(&index).cloned()) {
                Some(ThumbnailOutcome::Ready(uri)) => {
                    view! { <img class=css::thumbImg src=uri alt="" /> }.into_any()
                }
                Some(ThumbnailOutcome::Fallback) => {
                    view! { <div class=css::thumbGlyph>{glyph}</div> }.into_any()
                }
                None => view! { <div class=css::thumbLoading>"Loading..."</div> }.into_any(),
            };
            view! {
                {preview}
                <div class=css::playBadge>
                    <Icon icon=ic::PLAY />
                </div>
            }
            .into_any()
        }
        EntryKind::Image => {
            // Images the runtime cannot decode fall back to the glyph.
            let broken = RwSignal::new(false);
            let uri = item.entry.uri();
            view! {
                <Show
                    when=move || !broken.get()
                    fallback=move || view! { <div class=css::thumbGlyph>{glyph}</div> }
                >
                    <img
                        class=css::thumbImg
                        src=uri.clone()
                        alt=""
                        on:error=move |_| broken.set(true)
                    />
                </Show>
            }
            .into_any()
        }
        _ => view! { <div class=css::thumbGlyph>{glyph}</div> }.into_any(),
    }
}

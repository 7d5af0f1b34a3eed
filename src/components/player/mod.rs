//! Video player screen.
//!
//! Hosts both engine surfaces: the `<object>` the advanced engine renders
//! into and the `<video>` used by the simple engine. The control strip is
//! shown and hidden by the controller.

use leptos::prelude::*;
use leptos_icons::Icon;

use crate::app::AppContext;
use crate::components::icons as ic;
use crate::models::{Control, Screen};
use crate::platform::VIDEO_ELEMENT_ID;
use crate::utils::format::format_time;

stylance::import_crate_style!(css, "src/components/player/player.module.css");

const AVPLAYER_ID: &str = "av-player";

#[component]
pub fn Player() -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let player = ctx.player;

    let screen_class = move || {
        if ctx.screen.get() == Screen::Player {
            format!("{} {}", css::screen, css::active)
        } else {
            css::screen.to_string()
        }
    };
    let controls_class = move || {
        if player.controls_visible.get() {
            format!("{} {}", css::controls, css::visible)
        } else {
            css::controls.to_string()
        }
    };
    let progress_style = move || {
        format!("width: {:.2}%;", player.progress.get().fraction() * 100.0)
    };
    let time_label = move || {
        let progress = player.progress.get();
        format!(
            "{} / {}",
            format_time(progress.position),
            format_time(progress.duration)
        )
    };

    view! {
        <section class=screen_class>
            <object id=AVPLAYER_ID class=css::surface type="application/avplayer"></object>
            <video id=VIDEO_ELEMENT_ID class=css::surface hidden=true></video>

            <Show when=move || player.buffering.get()>
                <div class=css::buffering>
                    <div class=css::spinner></div>
                </div>
            </Show>

            <div class=controls_class>
                <div class=css::title>{move || player.title.get()}</div>
                <div class=css::progressTrack>
                    <div class=css::progressFill style=progress_style></div>
                </div>
                <div class=css::time>{time_label}</div>
                <div class=css::buttons>
                    {Control::ALL
                        .into_iter()
                        .map(|control| view! { <ControlButton control=control /> })
                        .collect_view()}
                </div>
            </div>
        </section>
    }
}

#[component]
fn ControlButton(control: Control) -> impl IntoView {
    let ctx = use_context::<AppContext>().expect("AppContext must be provided");
    let player = ctx.player;

    let class = move || {
        if player.control_focused.get() == Some(control) {
            format!("{} {}", css::button, css::focused)
        } else {
            css::button.to_string()
        }
    };
    let icon = move || match control {
        Control::PlayPause if player.playing.get() => ic::PAUSE,
        Control::PlayPause => ic::PLAY,
        Control::SeekBack => ic::SEEK_BACK,
        Control::SeekForward => ic::SEEK_FORWARD,
        Control::Back => ic::BACK,
    };
    let label = match control {
        Control::PlayPause => "Play/Pause",
        Control::SeekBack => "Rewind",
        Control::SeekForward => "Fast forward",
        Control::Back => "Back",
    };

    view! {
        <div class=class role="button" aria-label=label>
            {move || view! { <Icon icon=icon() /> }}
        </div>
    }
}

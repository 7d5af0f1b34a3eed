//! Root application module.
//!
//! Contains the main App component, the signal-backed [`AppContext`], the
//! [`SignalPresenter`] that lets the [`AppController`] drive those signals,
//! and the startup wiring of platform services and DOM events.

use std::collections::HashMap;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlElement, HtmlImageElement, KeyboardEvent};

use crate::components::{Browser, ImageViewer, Player, FILE_LIST_ID, IMAGE_VIEWER_ID};
use crate::config::{browser::ROOT_PATH, PlayerConfig, APP_NAME};
use crate::core::error::PlaybackError;
use crate::core::input::REGISTERED_KEYS;
use crate::core::storage::StorageService;
use crate::core::task::Timer;
use crate::core::thumbnail::{ContentIndex, FrameProbe};
use crate::core::{
    AppController, HeaderView, Presenter, RenderItem, RenderSurface, Services, ThumbnailOutcome,
    ThumbnailPipeline,
};
use crate::models::{Control, LayoutMode, Progress, Screen};
use crate::platform::{
    self, GlooTimer, TizenContentIndex, TizenStorage, UnavailableStorage, VideoFrameProbe,
    WasmSpawner,
};
use crate::utils::dom;

// ============================================================================
// Signals
// ============================================================================

/// File browser signals.
#[derive(Clone, Copy)]
pub struct BrowserState {
    pub header: RwSignal<HeaderView>,
    /// Loading overlay text, `None` when hidden.
    pub loading: RwSignal<Option<String>>,
    /// Rendered prefix of the listing.
    pub items: RwSignal<Vec<RenderItem>>,
    pub focused: RwSignal<Option<usize>>,
    /// Status message shown in place of the list.
    pub message: RwSignal<Option<String>>,
    /// Video previews by item index.
    pub thumbnails: RwSignal<HashMap<usize, ThumbnailOutcome>>,
    pub grid_columns: RwSignal<usize>,
}

impl BrowserState {
    fn new() -> Self {
        Self {
            header: RwSignal::new(HeaderView {
                title: APP_NAME.to_string(),
                path: ROOT_PATH.to_string(),
                layout: LayoutMode::default(),
                focused: false,
            }),
            loading: RwSignal::new(None),
            items: RwSignal::new(Vec::new()),
            focused: RwSignal::new(None),
            message: RwSignal::new(None),
            thumbnails: RwSignal::new(HashMap::new()),
            grid_columns: RwSignal::new(PlayerConfig::default().grid_columns),
        }
    }
}

/// Video player signals.
#[derive(Clone, Copy)]
pub struct PlayerState {
    pub title: RwSignal<String>,
    pub progress: RwSignal<Progress>,
    pub playing: RwSignal<bool>,
    pub buffering: RwSignal<bool>,
    pub controls_visible: RwSignal<bool>,
    pub control_focused: RwSignal<Option<Control>>,
}

impl PlayerState {
    fn new() -> Self {
        Self {
            title: RwSignal::new(String::new()),
            progress: RwSignal::new(Progress::default()),
            playing: RwSignal::new(false),
            buffering: RwSignal::new(false),
            controls_visible: RwSignal::new(false),
            control_focused: RwSignal::new(None),
        }
    }
}

/// Image shown by the viewer.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageView {
    pub uri: String,
    pub name: String,
}

/// Application-wide reactive context.
///
/// All fields are signals, so the struct is `Copy`. Components only read it;
/// every write goes through [`SignalPresenter`].
#[derive(Clone, Copy)]
pub struct AppContext {
    pub screen: RwSignal<Screen>,
    pub browser: BrowserState,
    pub player: PlayerState,
    pub image: RwSignal<Option<ImageView>>,
    /// Startup failure surfaced through the error boundary.
    pub fatal: RwSignal<Option<PlaybackError>>,
}

impl AppContext {
    pub fn new() -> Self {
        Self {
            screen: RwSignal::new(Screen::default()),
            browser: BrowserState::new(),
            player: PlayerState::new(),
            image: RwSignal::new(None),
            fatal: RwSignal::new(None),
        }
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Presenter
// ============================================================================

/// [`Presenter`] that writes into the [`AppContext`] signals.
pub struct SignalPresenter {
    ctx: AppContext,
}

impl SignalPresenter {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

impl RenderSurface for SignalPresenter {
    fn clear(&mut self) {
        let browser = self.ctx.browser;
        browser.items.set(Vec::new());
        browser.thumbnails.set(HashMap::new());
        browser.focused.set(None);
        browser.message.set(None);
    }

    fn append(&mut self, items: Vec<RenderItem>) {
        self.ctx.browser.items.update(|rendered| rendered.extend(items));
    }

    fn set_focused(&mut self, index: Option<usize>) {
        self.ctx.browser.focused.set(index);
    }

    fn scroll_into_view(&mut self, index: usize) {
        // Wait for the appended rows to reach the DOM.
        request_animation_frame(move || {
            dom::scroll_into_view(&format!("#{} [data-index=\"{}\"]", FILE_LIST_ID, index));
        });
    }

    fn show_message(&mut self, message: &str) {
        let browser = &self.ctx.browser;
        browser.items.set(Vec::new());
        browser.thumbnails.set(HashMap::new());
        browser.focused.set(None);
        browser.message.set(Some(message.to_string()));
    }
}

impl Presenter for SignalPresenter {
    fn show_screen(&mut self, screen: Screen) {
        self.ctx.screen.set(screen);
    }

    fn set_header(&mut self, header: HeaderView) {
        self.ctx.browser.header.set(header);
    }

    fn set_loading(&mut self, message: Option<&str>) {
        self.ctx.browser.loading.set(message.map(str::to_string));
    }

    fn set_controls(&mut self, visible: bool, focused: Option<Control>) {
        self.ctx.player.controls_visible.set(visible);
        self.ctx.player.control_focused.set(focused);
    }

    fn set_now_playing(&mut self, title: &str) {
        self.ctx.player.title.set(title.to_string());
    }

    fn set_progress(&mut self, progress: Progress) {
        self.ctx.player.progress.set(progress);
    }

    fn set_playing(&mut self, playing: bool) {
        self.ctx.player.playing.set(playing);
    }

    fn set_buffering(&mut self, buffering: bool) {
        self.ctx.player.buffering.set(buffering);
    }

    fn show_image(&mut self, uri: &str, name: &str) {
        self.ctx.image.set(Some(ImageView {
            uri: uri.to_string(),
            name: name.to_string(),
        }));
    }

    fn set_thumbnail(&mut self, index: usize, path: &str, outcome: ThumbnailOutcome) {
        let browser = self.ctx.browser;
        let still_rendered = browser
            .items
            .with_untracked(|items| {
                items
                    .iter()
                    .any(|item| item.index == index && item.entry.path == path)
            });
        if still_rendered {
            browser.thumbnails.update(|thumbs| {
                thumbs.insert(index, outcome);
            });
        }
    }

    fn alert(&mut self, message: &str) {
        if let Some(window) = dom::window() {
            let _ = window.alert_with_message(message);
        }
    }

    fn exit(&mut self) {
        platform::exit_app();
    }
}

// ============================================================================
// Startup
// ============================================================================

type Controller = AppController<SignalPresenter>;

/// Wire platform services into the controller and start browsing.
fn boot(ctx: AppContext) -> Result<(), PlaybackError> {
    log::info!(
        "Booting {} v{} (TV runtime: {})",
        APP_NAME,
        crate::config::APP_VERSION,
        platform::is_tv_runtime()
    );

    let store = platform::persistent_store();
    let config = PlayerConfig::load(&*store);
    ctx.browser.grid_columns.set(config.grid_columns);

    let timer: Rc<dyn Timer> = Rc::new(GlooTimer);
    let storage: Rc<dyn StorageService> = match TizenStorage::detect() {
        Some(storage) => Rc::new(storage),
        None => {
            log::warn!("Filesystem API unavailable");
            Rc::new(UnavailableStorage)
        }
    };
    let probe = VideoFrameProbe::new().map(|probe| Rc::new(probe) as Rc<dyn FrameProbe>);
    let index = TizenContentIndex::detect().map(|index| Rc::new(index) as Rc<dyn ContentIndex>);
    let thumbnails = Rc::new(ThumbnailPipeline::new(
        config.thumbnails.clone(),
        probe,
        index,
        Rc::clone(&timer),
    ));

    let services = Services {
        storage,
        thumbnails,
        timer,
        spawner: Rc::new(WasmSpawner),
    };
    let engine = platform::select_engine()?;
    platform::register_keys(REGISTERED_KEYS);

    let app = AppController::new(config, services, engine, store, SignalPresenter::new(ctx));
    bind_events(&app);
    app.start();
    Ok(())
}

/// Route DOM events to the controller. The listeners live for the whole run.
fn bind_events(app: &Rc<Controller>) {
    let Some(window) = dom::window() else {
        return;
    };

    let handler = Rc::clone(app);
    let on_key = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if handler.handle_key(event.key_code()) {
            event.prevent_default();
        }
    }) as Box<dyn Fn(KeyboardEvent)>);
    let _ = window.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref());
    on_key.forget();

    if let Some(list) = dom::element_by_id::<HtmlElement>(FILE_LIST_ID) {
        let handler = Rc::clone(app);
        let target = list.clone();
        let on_scroll = Closure::wrap(Box::new(move |_: Event| {
            let visible_end = f64::from(target.scroll_top()) + f64::from(target.client_height());
            handler.handle_scroll(visible_end, f64::from(target.scroll_height()));
        }) as Box<dyn Fn(Event)>);
        let _ = list.add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref());
        on_scroll.forget();
    }

    if let Some(image) = dom::element_by_id::<HtmlImageElement>(IMAGE_VIEWER_ID) {
        let handler = Rc::clone(app);
        let on_error = Closure::wrap(Box::new(move |_: Event| {
            handler.handle_image_error();
        }) as Box<dyn Fn(Event)>);
        let _ = image.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref());
        on_error.forget();
    }

    if let Some(document) = dom::document() {
        let handler = Rc::clone(app);
        let on_visibility = Closure::wrap(Box::new(move |_: Event| {
            if dom::is_hidden() {
                handler.handle_background();
            }
        }) as Box<dyn Fn(Event)>);
        let _ = document.add_event_listener_with_callback(
            "visibilitychange",
            on_visibility.as_ref().unchecked_ref(),
        );
        on_visibility.forget();
    }
}

/// Root application component with error boundary.
///
/// This component:
/// - Creates and provides the global AppContext
/// - Renders all three screens; only the active one is visible
/// - Boots the controller once the screens are in the DOM
/// - Wraps the app in an ErrorBoundary for startup failures
#[component]
pub fn App() -> impl IntoView {
    let ctx = AppContext::new();
    provide_context(ctx);

    Effect::new(move |_| {
        if let Err(e) = untrack(|| boot(ctx)) {
            log::error!("Startup failed: {}", e);
            ctx.fatal.set(Some(e));
        }
    });

    let startup = move || match ctx.fatal.get() {
        Some(e) => Err(e),
        None => Ok(()),
    };

    view! {
        <ErrorBoundary
            fallback=|errors| view! {
                <div style="
                    display: flex;
                    flex-direction: column;
                    align-items: center;
                    justify-content: center;
                    height: 100vh;
                    padding: 2rem;
                    background: #000;
                    color: #e0e0e0;
                    font-family: sans-serif;
                ">
                    <div style="
                        max-width: 900px;
                        text-align: center;
                    ">
                        <h1 style="color: #ff6b6b; margin-bottom: 1rem; font-size: 2.5rem;">
                            "Cannot start the player"
                        </h1>
                        <ul style="
                            list-style: none;
                            margin: 0 0 2rem 0;
                            padding: 0;
                            color: #a0a0a0;
                            font-size: 1.5rem;
                        ">
                            {move || errors.get()
                                .into_iter()
                                .map(|(_, e)| view! { <li>{e.to_string()}</li> })
                                .collect::<Vec<_>>()
                            }
                        </ul>
                        <button
                            on:click=move |_| {
                                if let Some(window) = web_sys::window() {
                                    let _ = window.location().reload();
                                }
                            }
                            style="
                                background: #4a90e2;
                                color: white;
                                border: none;
                                padding: 1rem 3rem;
                                border-radius: 8px;
                                font-size: 1.5rem;
                            "
                        >
                            "Reload"
                        </button>
                    </div>
                </div>
            }
        >
            {startup}
            <Browser />
            <Player />
            <ImageViewer />
        </ErrorBoundary>
    }
}

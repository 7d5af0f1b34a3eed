//! Application shell.
//!
//! [`AppController`] wires remote input, the [`Navigator`], the
//! [`ListRenderer`], the [`ThumbnailPipeline`] and the [`PlaybackController`]
//! together. It dispatches the effects produced by each transition, runs the
//! asynchronous ones on the [`Spawner`], and pushes results to a [`Presenter`].
//!
//! Engine notifications are queued and drained from a spawned task, so no
//! state borrow is ever held while a platform callback re-enters.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::config::{playback::CONTROLS_HIDE_MS, APP_NAME, PlayerConfig};
use crate::core::classifier::FormatClassifier;
use crate::core::engine::{EngineSignal, MediaEngine};
use crate::core::error::{StorageError, ViewError};
use crate::core::input::Input;
use crate::core::navigation::{Applied, Effect, NavSettings, Navigator, RenderHint};
use crate::core::playback::{PlaybackController, SessionUpdate};
use crate::core::renderer::{ListRenderer, Proximity, RenderSurface, ThumbnailJob};
use crate::core::storage::{device_entries, listing_entries, StorageService};
use crate::core::store::KeyValueStore;
use crate::core::task::{Spawner, Timer};
use crate::core::thumbnail::{ThumbnailOutcome, ThumbnailPipeline};
use crate::models::{Control, Entry, LayoutMode, Progress, Screen};

/// Status shown while removable devices are enumerated.
pub const SCANNING_MESSAGE: &str = "Scanning USB devices...";
/// Status shown while a directory is listed.
pub const LOADING_MESSAGE: &str = "Loading...";

const CONVERT_ADVICE: &str = "Please convert to JPG or PNG format.";
const SUPPORTED_IMAGES: &str = "Supported: JPG, PNG, GIF, BMP, WebP";

/// Browser header content.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderView {
    /// Device name inside a device, application name at the device list.
    pub title: String,
    pub path: String,
    pub layout: LayoutMode,
    /// Layout toggle holds focus.
    pub focused: bool,
}

/// Visual target of the whole application.
pub trait Presenter: RenderSurface {
    fn show_screen(&mut self, screen: Screen);
    fn set_header(&mut self, header: HeaderView);
    /// Loading indicator over the file list, `None` to hide it.
    fn set_loading(&mut self, message: Option<&str>);
    fn set_controls(&mut self, visible: bool, focused: Option<Control>);
    fn set_now_playing(&mut self, title: &str);
    fn set_progress(&mut self, progress: Progress);
    fn set_playing(&mut self, playing: bool);
    fn set_buffering(&mut self, buffering: bool);
    fn show_image(&mut self, uri: &str, name: &str);
    fn set_thumbnail(&mut self, index: usize, path: &str, outcome: ThumbnailOutcome);
    /// Modal message for errors the user must acknowledge.
    fn alert(&mut self, message: &str);
    /// Leave the application.
    fn exit(&mut self);
}

/// Collaborators shared with spawned tasks.
#[derive(Clone)]
pub struct Services {
    pub storage: Rc<dyn StorageService>,
    pub thumbnails: Rc<ThumbnailPipeline>,
    pub timer: Rc<dyn Timer>,
    pub spawner: Rc<dyn Spawner>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListingKind {
    Devices,
    Directory,
}

/// Single owner of application state.
pub struct AppController<P> {
    config: PlayerConfig,
    classifier: FormatClassifier,
    renderer: ListRenderer,
    services: Services,
    navigator: RefCell<Navigator>,
    playback: RefCell<PlaybackController>,
    presenter: RefCell<P>,
    signals: RefCell<VecDeque<EngineSignal>>,
    draining: Cell<bool>,
    controls_visible: Cell<bool>,
    controls_generation: Cell<u64>,
    this: Weak<Self>,
}

impl<P: Presenter + 'static> AppController<P> {
    pub fn new(
        config: PlayerConfig,
        services: Services,
        engine: Box<dyn MediaEngine>,
        store: Rc<dyn KeyValueStore>,
        presenter: P,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<Self>| {
            let mut playback = PlaybackController::new(engine, store);

            let sink = this.clone();
            playback.attach(Rc::new(move |signal: EngineSignal| {
                if let Some(app) = sink.upgrade() {
                    app.handle_engine_signal(signal);
                }
            }));

            let view = this.clone();
            playback.on_progress(move |progress| {
                if let Some(app) = view.upgrade() {
                    app.presenter.borrow_mut().set_progress(progress);
                }
            });

            Self {
                classifier: FormatClassifier::new(&config),
                renderer: ListRenderer::new(&config),
                navigator: RefCell::new(Navigator::new(NavSettings::from_config(&config))),
                playback: RefCell::new(playback),
                presenter: RefCell::new(presenter),
                signals: RefCell::new(VecDeque::new()),
                draining: Cell::new(false),
                controls_visible: Cell::new(false),
                controls_generation: Cell::new(0),
                this: this.clone(),
                services,
                config,
            }
        })
    }

    /// Enumerate devices and show the initial screen.
    pub fn start(&self) {
        log::info!("Starting {}", APP_NAME);
        let effect = self.navigator.borrow_mut().start();
        self.render(RenderHint::Header);
        self.dispatch(vec![effect]);
    }

    /// Handle a raw key code. Returns whether the key was consumed.
    pub fn handle_key(&self, code: u32) -> bool {
        match Input::from_key_code(code) {
            Some(input) => {
                self.handle_input(input);
                true
            }
            None => false,
        }
    }

    pub fn handle_input(&self, input: Input) {
        let effects = self.navigator.borrow_mut().handle(input);
        self.dispatch(effects);
    }

    /// File list scrolled; positions in pixels.
    pub fn handle_scroll(&self, visible_end: f64, rendered_end: f64) {
        if self.navigator.borrow().context().screen != Screen::Browser {
            return;
        }
        let trigger = Proximity::Scroll {
            visible_end,
            rendered_end,
        };
        let jobs = {
            let mut navigator = self.navigator.borrow_mut();
            let mut presenter = self.presenter.borrow_mut();
            self.renderer
                .on_proximity(trigger, navigator.browse_mut(), &mut *presenter)
        };
        self.schedule_thumbnails(jobs);
    }

    /// Queue a raw engine notification for processing.
    pub fn handle_engine_signal(&self, signal: EngineSignal) {
        self.signals.borrow_mut().push_back(signal);
        if self.draining.replace(true) {
            return;
        }
        let Some(app) = self.this.upgrade() else {
            return;
        };
        self.services.spawner.spawn(Box::pin(async move {
            app.drain_signals();
        }));
    }

    /// Page hidden: remember where playback stands.
    pub fn handle_background(&self) {
        let mut playback = self.playback.borrow_mut();
        if playback.session().is_none() {
            return;
        }
        playback.record_position();
        if let Err(e) = playback.persist_resume() {
            log::warn!("Failed to save resume positions: {}", e);
        }
    }

    /// The image viewer could not decode the current image.
    pub fn handle_image_error(&self) {
        if self.navigator.borrow().context().screen != Screen::Image {
            return;
        }
        log::warn!("Image decode failed");
        self.presenter
            .borrow_mut()
            .alert(&format!("{}\n\n{}", ViewError::DecodeFailed, SUPPORTED_IMAGES));
        self.leave_to_browser();
    }

    // =========================================================================
    // Effects
    // =========================================================================

    fn dispatch(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RequestDeviceScan { ticket } => {
                    self.presenter.borrow_mut().set_loading(Some(SCANNING_MESSAGE));
                    self.request_devices(ticket);
                }
                Effect::RequestListing { path, ticket } => {
                    self.presenter.borrow_mut().set_loading(Some(LOADING_MESSAGE));
                    self.request_listing(path, ticket);
                }
                Effect::RequestPlayback(entry) => self.start_playback(&entry),
                Effect::RequestImageView { index, entry } => self.open_image(index, &entry),
                Effect::RequestExit => {
                    log::info!("Exiting");
                    self.presenter.borrow_mut().exit();
                }
                Effect::StopPlayback => {
                    self.playback.borrow_mut().stop();
                    self.reset_player_view();
                }
                Effect::PersistResume => {
                    if let Err(e) = self.playback.borrow().persist_resume() {
                        log::warn!("Failed to save resume positions: {}", e);
                    }
                }
                Effect::TogglePlayback => {
                    let result = self.playback.borrow_mut().toggle_play_pause();
                    match result {
                        Ok(playing) => self.presenter.borrow_mut().set_playing(playing),
                        Err(e) => log::debug!("Toggle ignored: {}", e),
                    }
                }
                Effect::Seek(delta) => {
                    if let Err(e) = self.playback.borrow_mut().seek(delta) {
                        log::warn!("Seek failed: {}", e);
                    }
                }
                Effect::ShowControls => self.show_controls(),
                Effect::Render(hint) => self.render(hint),
            }
        }
    }

    fn render(&self, hint: RenderHint) {
        match hint {
            RenderHint::Reset => {
                let jobs = {
                    let mut navigator = self.navigator.borrow_mut();
                    let header_focused = navigator.context().header_focused;
                    let mut presenter = self.presenter.borrow_mut();
                    let jobs = self
                        .renderer
                        .set_entries(navigator.browse_mut(), &mut *presenter);
                    if header_focused {
                        presenter.set_focused(None);
                    }
                    jobs
                };
                self.schedule_thumbnails(jobs);
            }
            RenderHint::Focus => {
                let jobs = {
                    let mut navigator = self.navigator.borrow_mut();
                    let mut presenter = self.presenter.borrow_mut();
                    self.renderer.focus(navigator.browse_mut(), &mut *presenter)
                };
                self.schedule_thumbnails(jobs);
            }
            RenderHint::Header => {
                let navigator = self.navigator.borrow();
                let browse = navigator.browse();
                let focused = navigator.context().header_focused;
                let mut presenter = self.presenter.borrow_mut();
                presenter.set_header(HeaderView {
                    title: browse
                        .device_label
                        .clone()
                        .unwrap_or_else(|| APP_NAME.to_string()),
                    path: browse.current_path.clone(),
                    layout: browse.layout,
                    focused,
                });
                if focused {
                    presenter.set_focused(None);
                } else if !browse.entries.is_empty() {
                    presenter.set_focused(Some(browse.focused_index));
                }
            }
            RenderHint::Controls => {
                let focused = self.navigator.borrow().context().control_focused;
                self.presenter
                    .borrow_mut()
                    .set_controls(self.controls_visible.get(), focused);
            }
            RenderHint::Screen => {
                let screen = self.navigator.borrow().context().screen;
                self.presenter.borrow_mut().show_screen(screen);
            }
        }
    }

    // =========================================================================
    // Listings
    // =========================================================================

    fn request_devices(&self, ticket: u64) {
        let Some(app) = self.this.upgrade() else {
            return;
        };
        let storage = self.services.storage.clone();
        self.services.spawner.spawn(Box::pin(async move {
            let result = match storage.list_devices().await {
                Ok(devices) => device_entries(&devices),
                Err(e) => Err(e),
            };
            app.finish_listing(ListingKind::Devices, ticket, result);
        }));
    }

    fn request_listing(&self, path: String, ticket: u64) {
        let Some(app) = self.this.upgrade() else {
            return;
        };
        let storage = self.services.storage.clone();
        self.services.spawner.spawn(Box::pin(async move {
            let result = storage.list_children(&path).await.map(|items| {
                listing_entries(items, &app.classifier, app.config.media_first)
            });
            app.finish_listing(ListingKind::Directory, ticket, result);
        }));
    }

    fn finish_listing(
        &self,
        kind: ListingKind,
        ticket: u64,
        result: Result<Vec<Entry>, StorageError>,
    ) {
        if let Err(e) = &result {
            log::warn!("Listing failed: {:?}", e);
        }

        let applied = {
            let mut navigator = self.navigator.borrow_mut();
            match kind {
                ListingKind::Devices => navigator.apply_devices(ticket, result),
                ListingKind::Directory => navigator.apply_listing(ticket, result),
            }
        };

        match applied {
            Applied::Installed => {
                self.presenter.borrow_mut().set_loading(None);
                self.render(RenderHint::Header);
                self.render(RenderHint::Reset);
            }
            Applied::Failed(message) => {
                let mut presenter = self.presenter.borrow_mut();
                presenter.set_loading(None);
                presenter.show_message(&message);
            }
            Applied::Stale => log::debug!("Discarding stale listing {}", ticket),
        }
    }

    // =========================================================================
    // Thumbnails
    // =========================================================================

    fn schedule_thumbnails(&self, jobs: Vec<ThumbnailJob>) {
        if jobs.is_empty() {
            return;
        }
        let Some(app) = self.this.upgrade() else {
            return;
        };

        for job in jobs {
            let app = app.clone();
            self.services.spawner.spawn(Box::pin(async move {
                if job.delay_ms > 0 {
                    app.services.timer.sleep(job.delay_ms).await;
                }
                let thumbnails = app.services.thumbnails.clone();
                let outcome = thumbnails.get_thumbnail(&job.path).await;
                app.apply_thumbnail(&job, outcome);
            }));
        }
    }

    /// Install a preview if its slot still shows the same file.
    fn apply_thumbnail(&self, job: &ThumbnailJob, outcome: ThumbnailOutcome) {
        let current = self
            .navigator
            .borrow()
            .browse()
            .entries
            .get(job.index)
            .is_some_and(|e| e.path == job.path);
        if !current {
            log::debug!("Dropping thumbnail for replaced slot {}", job.index);
            return;
        }
        self.presenter
            .borrow_mut()
            .set_thumbnail(job.index, &job.path, outcome);
    }

    // =========================================================================
    // Player
    // =========================================================================

    fn start_playback(&self, entry: &Entry) {
        let result = self.playback.borrow_mut().play(entry);
        if let Err(e) = result {
            let message = self.playback.borrow().describe(&entry.name, &e);
            self.presenter.borrow_mut().alert(&message);
            return;
        }

        self.navigator.borrow_mut().enter_player();
        {
            let mut presenter = self.presenter.borrow_mut();
            presenter.set_now_playing(&entry.name);
            presenter.set_progress(Progress::default());
            presenter.set_playing(false);
            presenter.set_buffering(true);
            presenter.show_screen(Screen::Player);
        }
        self.show_controls();
    }

    fn show_controls(&self) {
        self.controls_visible.set(true);
        self.render(RenderHint::Controls);

        let generation = self.controls_generation.get() + 1;
        self.controls_generation.set(generation);
        let Some(app) = self.this.upgrade() else {
            return;
        };
        let timer = self.services.timer.clone();
        self.services.spawner.spawn(Box::pin(async move {
            timer.sleep(CONTROLS_HIDE_MS).await;
            app.hide_controls(generation);
        }));
    }

    fn hide_controls(&self, generation: u64) {
        if generation != self.controls_generation.get() {
            return;
        }
        let ctx = *self.navigator.borrow().context();
        if ctx.screen != Screen::Player || ctx.control_focused.is_some() {
            return;
        }
        self.controls_visible.set(false);
        self.render(RenderHint::Controls);
    }

    fn reset_player_view(&self) {
        self.controls_visible.set(false);
        let mut presenter = self.presenter.borrow_mut();
        presenter.set_controls(false, None);
        presenter.set_playing(false);
        presenter.set_buffering(false);
    }

    fn drain_signals(&self) {
        loop {
            let Some(signal) = self.signals.borrow_mut().pop_front() else {
                break;
            };
            let update = self.playback.borrow_mut().handle_engine_event(signal);
            if let Some(update) = update {
                self.apply_session_update(update);
            }
        }
        self.draining.set(false);
    }

    fn apply_session_update(&self, update: SessionUpdate) {
        match update {
            SessionUpdate::Ready(progress) => {
                let mut presenter = self.presenter.borrow_mut();
                presenter.set_progress(progress);
                presenter.set_buffering(false);
                presenter.set_playing(true);
            }
            SessionUpdate::Progress(_) => {}
            SessionUpdate::Playing(playing) => self.presenter.borrow_mut().set_playing(playing),
            SessionUpdate::Buffering(buffering) => {
                self.presenter.borrow_mut().set_buffering(buffering)
            }
            SessionUpdate::Ended => {
                self.reset_player_view();
                self.leave_to_browser();
            }
            SessionUpdate::Failed(message) => {
                self.reset_player_view();
                self.presenter.borrow_mut().alert(&message);
                self.leave_to_browser();
            }
        }
    }

    // =========================================================================
    // Image viewer
    // =========================================================================

    fn open_image(&self, index: usize, entry: &Entry) {
        if let Some(ext) = self.classifier.unsupported_image(&entry.name) {
            let format = ext.trim_start_matches('.').to_uppercase();
            let error = ViewError::FormatUnsupported(format);
            log::info!("Rejected {}: {}", entry.path, error);
            self.presenter
                .borrow_mut()
                .alert(&format!("{}\n\n{}", error, CONVERT_ADVICE));
            // Focus still moves so the next step goes past this file.
            self.navigator.borrow_mut().focus_entry(index);
            return;
        }

        self.navigator.borrow_mut().enter_image(index);
        let mut presenter = self.presenter.borrow_mut();
        presenter.show_image(&entry.uri(), &entry.name);
        presenter.show_screen(Screen::Image);
    }

    fn leave_to_browser(&self) {
        self.navigator.borrow_mut().return_to_browser();
        self.render(RenderHint::Screen);
        self.render(RenderHint::Focus);
    }
}

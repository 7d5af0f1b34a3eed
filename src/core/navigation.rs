//! Cross-screen navigation state machine.
//!
//! [`transition`] is a pure function from the current [`ScreenContext`] and
//! [`BrowseState`] plus one [`Input`] to the next state and a list of
//! [`Effect`]s. [`Navigator`] owns the state, threads it through
//! `transition`, and applies the results of asynchronous requests.

use crate::config::{browser::ROOT_PATH, PlayerConfig};
use crate::core::error::StorageError;
use crate::core::input::Input;
use crate::core::storage::parent_target;
use crate::models::{
    BrowseState, Control, Entry, EntryKind, LayoutMode, NavTarget, Screen, ScreenContext,
};

/// Part of the view that needs refreshing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderHint {
    /// Re-render the file list from scratch.
    Reset,
    /// Move the focus marker to `focused_index`.
    Focus,
    /// Header focus or layout changed.
    Header,
    /// Player control focus changed.
    Controls,
    /// Active screen changed.
    Screen,
}

/// Side effect requested by a transition.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    RequestDeviceScan { ticket: u64 },
    RequestListing { path: String, ticket: u64 },
    RequestPlayback(Entry),
    RequestImageView { index: usize, entry: Entry },
    RequestExit,
    StopPlayback,
    PersistResume,
    TogglePlayback,
    /// Relative seek in seconds.
    Seek(f64),
    ShowControls,
    Render(RenderHint),
}

/// Layout parameters the transition function depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavSettings {
    pub grid_columns: usize,
    pub seek_step_secs: f64,
}

impl NavSettings {
    pub fn from_config(config: &PlayerConfig) -> Self {
        Self {
            grid_columns: config.grid_columns.max(1),
            seek_step_secs: config.seek_step_secs,
        }
    }
}

/// Output of [`transition`].
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub ctx: ScreenContext,
    pub browse: BrowseState,
    pub effects: Vec<Effect>,
}

/// Compute the next state for one input.
pub fn transition(
    ctx: ScreenContext,
    browse: BrowseState,
    input: Input,
    settings: &NavSettings,
) -> Transition {
    let mut t = Transition {
        ctx,
        browse,
        effects: Vec::new(),
    };

    match t.ctx.screen {
        Screen::Browser => browser_input(&mut t, input, settings),
        Screen::Player => player_input(&mut t, input, settings),
        Screen::Image => image_input(&mut t, input),
    }
    t
}

// =============================================================================
// Browser
// =============================================================================

fn browser_input(t: &mut Transition, input: Input, settings: &NavSettings) {
    match input {
        Input::Back => {
            if t.ctx.header_focused {
                t.ctx.header_focused = false;
                t.effects.push(Effect::Render(RenderHint::Header));
            } else if !t.browse.is_root() {
                let target = parent_target(&t.browse.current_path);
                let effect = navigate(&mut t.browse, target);
                t.effects.push(effect);
            } else {
                t.effects.push(Effect::RequestExit);
            }
        }
        Input::Ok => {
            if t.ctx.header_focused {
                toggle_layout(t);
            } else if let Some(entry) = t.browse.focused_entry().cloned() {
                open_entry(t, entry);
            }
        }
        Input::Up => {
            if t.ctx.header_focused {
                return;
            }
            if t.browse.focused_index == 0 {
                t.ctx.header_focused = true;
                t.effects.push(Effect::Render(RenderHint::Header));
            } else {
                let step = row_step(t.browse.layout, settings);
                move_focus(t, -(step as isize));
            }
        }
        Input::Down => {
            if t.ctx.header_focused {
                t.ctx.header_focused = false;
                t.effects.push(Effect::Render(RenderHint::Header));
                if !t.browse.entries.is_empty() {
                    t.browse.focused_index = 0;
                    t.effects.push(Effect::Render(RenderHint::Focus));
                }
            } else {
                let step = row_step(t.browse.layout, settings);
                move_focus(t, step as isize);
            }
        }
        Input::Left | Input::Right => {
            if t.browse.layout == LayoutMode::Grid && !t.ctx.header_focused {
                move_focus(t, if input == Input::Left { -1 } else { 1 });
            }
        }
        Input::ToggleLayout => {
            if !t.ctx.header_focused {
                toggle_layout(t);
            }
        }
        Input::TogglePlay => {}
    }
}

fn row_step(layout: LayoutMode, settings: &NavSettings) -> usize {
    match layout {
        LayoutMode::List => 1,
        LayoutMode::Grid => settings.grid_columns,
    }
}

fn move_focus(t: &mut Transition, delta: isize) {
    let len = t.browse.entries.len();
    if len == 0 {
        return;
    }
    let next = (t.browse.focused_index as isize + delta).clamp(0, len as isize - 1);
    t.browse.focused_index = next as usize;
    t.effects.push(Effect::Render(RenderHint::Focus));
}

fn toggle_layout(t: &mut Transition) {
    t.browse.layout = t.browse.layout.toggled();
    t.browse.loaded_count = 0;
    t.effects.push(Effect::Render(RenderHint::Header));
    t.effects.push(Effect::Render(RenderHint::Reset));
}

fn open_entry(t: &mut Transition, entry: Entry) {
    match entry.kind {
        EntryKind::UsbRoot => {
            let target = NavTarget::Path {
                path: entry.path,
                device: Some(entry.name),
            };
            let effect = navigate(&mut t.browse, target);
            t.effects.push(effect);
        }
        EntryKind::Folder => {
            let target = NavTarget::Path {
                path: entry.path,
                device: None,
            };
            let effect = navigate(&mut t.browse, target);
            t.effects.push(effect);
        }
        EntryKind::Video => t.effects.push(Effect::RequestPlayback(entry)),
        EntryKind::Image => t.effects.push(Effect::RequestImageView {
            index: t.browse.focused_index,
            entry,
        }),
        EntryKind::Other => {}
    }
}

/// Register a navigation request and build the matching effect.
fn navigate(browse: &mut BrowseState, target: NavTarget) -> Effect {
    let ticket = browse.begin_navigation(target.clone());
    match target {
        NavTarget::Devices => Effect::RequestDeviceScan { ticket },
        NavTarget::Path { path, .. } => Effect::RequestListing { path, ticket },
    }
}

// =============================================================================
// Player
// =============================================================================

fn player_input(t: &mut Transition, input: Input, settings: &NavSettings) {
    let step = settings.seek_step_secs;

    match input {
        Input::Back => match t.ctx.control_focused {
            Some(_) => {
                t.ctx.control_focused = None;
                t.effects.push(Effect::Render(RenderHint::Controls));
            }
            None => leave_player(t),
        },
        Input::Ok => match t.ctx.control_focused {
            None => {
                t.ctx.control_focused = Some(Control::PlayPause);
                t.effects.push(Effect::Render(RenderHint::Controls));
                t.effects.push(Effect::ShowControls);
            }
            Some(Control::PlayPause) => {
                t.effects.push(Effect::TogglePlayback);
                t.effects.push(Effect::ShowControls);
            }
            Some(Control::SeekBack) => {
                t.effects.push(Effect::Seek(-step));
                t.effects.push(Effect::ShowControls);
            }
            Some(Control::SeekForward) => {
                t.effects.push(Effect::Seek(step));
                t.effects.push(Effect::ShowControls);
            }
            Some(Control::Back) => leave_player(t),
        },
        Input::Left | Input::Right => {
            let left = input == Input::Left;
            match t.ctx.control_focused {
                Some(control) => {
                    t.ctx.control_focused = Some(if left { control.prev() } else { control.next() });
                    t.effects.push(Effect::Render(RenderHint::Controls));
                    t.effects.push(Effect::ShowControls);
                }
                None => {
                    t.effects.push(Effect::Seek(if left { -step } else { step }));
                    t.effects.push(Effect::ShowControls);
                }
            }
        }
        Input::TogglePlay => {
            if t.ctx.control_focused == Some(Control::PlayPause) {
                t.effects.push(Effect::TogglePlayback);
                t.effects.push(Effect::ShowControls);
            }
        }
        Input::Up | Input::Down | Input::ToggleLayout => {}
    }
}

fn leave_player(t: &mut Transition) {
    t.ctx.screen = Screen::Browser;
    t.ctx.control_focused = None;
    t.effects.push(Effect::StopPlayback);
    t.effects.push(Effect::PersistResume);
    t.effects.push(Effect::Render(RenderHint::Screen));
    t.effects.push(Effect::Render(RenderHint::Focus));
}

// =============================================================================
// Image viewer
// =============================================================================

fn image_input(t: &mut Transition, input: Input) {
    match input {
        Input::Back | Input::Ok => {
            t.ctx.screen = Screen::Browser;
            t.effects.push(Effect::Render(RenderHint::Screen));
            t.effects.push(Effect::Render(RenderHint::Focus));
        }
        Input::Left | Input::Right => {
            let found = if input == Input::Left {
                prev_image(&t.browse)
            } else {
                next_image(&t.browse)
            };
            if let Some(index) = found {
                let entry = t.browse.entries[index].clone();
                t.effects.push(Effect::RequestImageView { index, entry });
            }
        }
        Input::Up | Input::Down | Input::TogglePlay | Input::ToggleLayout => {}
    }
}

fn next_image(browse: &BrowseState) -> Option<usize> {
    browse
        .entries
        .iter()
        .enumerate()
        .skip(browse.focused_index + 1)
        .find(|(_, e)| e.kind == EntryKind::Image)
        .map(|(i, _)| i)
}

fn prev_image(browse: &BrowseState) -> Option<usize> {
    browse.entries[..browse.focused_index.min(browse.entries.len())]
        .iter()
        .rposition(|e| e.kind == EntryKind::Image)
}

// =============================================================================
// Navigator
// =============================================================================

/// Outcome of applying an asynchronous listing result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    /// New entries installed; the list must be re-rendered.
    Installed,
    /// Request failed; the entries were emptied and this status message
    /// takes the list's place.
    Failed(String),
    /// A newer request superseded this one.
    Stale,
}

/// Owner of the navigation state.
#[derive(Clone, Debug)]
pub struct Navigator {
    ctx: ScreenContext,
    browse: BrowseState,
    settings: NavSettings,
}

impl Navigator {
    pub fn new(settings: NavSettings) -> Self {
        Self {
            ctx: ScreenContext::default(),
            browse: BrowseState::default(),
            settings,
        }
    }

    pub fn context(&self) -> &ScreenContext {
        &self.ctx
    }

    pub fn browse(&self) -> &BrowseState {
        &self.browse
    }

    pub fn browse_mut(&mut self) -> &mut BrowseState {
        &mut self.browse
    }

    /// Feed one input through [`transition`].
    pub fn handle(&mut self, input: Input) -> Vec<Effect> {
        let t = transition(
            self.ctx,
            std::mem::take(&mut self.browse),
            input,
            &self.settings,
        );
        self.ctx = t.ctx;
        self.browse = t.browse;
        t.effects
    }

    /// Initial device enumeration.
    pub fn start(&mut self) -> Effect {
        navigate(&mut self.browse, NavTarget::Devices)
    }

    /// Apply the result of a device scan.
    pub fn apply_devices(
        &mut self,
        ticket: u64,
        result: Result<Vec<Entry>, StorageError>,
    ) -> Applied {
        self.apply(ticket, result)
    }

    /// Apply the result of a directory listing.
    pub fn apply_listing(
        &mut self,
        ticket: u64,
        result: Result<Vec<Entry>, StorageError>,
    ) -> Applied {
        self.apply(ticket, result)
    }

    fn apply(&mut self, ticket: u64, result: Result<Vec<Entry>, StorageError>) -> Applied {
        let Some(target) = self.browse.take_pending(ticket) else {
            return Applied::Stale;
        };

        let entries = match result {
            Ok(entries) => entries,
            Err(e) => {
                // The status message replaces the rows, so nothing stays focusable.
                let path = std::mem::take(&mut self.browse.current_path);
                self.browse.replace_entries(path, Vec::new());
                return Applied::Failed(e.to_string());
            }
        };

        match target {
            NavTarget::Devices => {
                self.browse.replace_entries(ROOT_PATH.to_string(), entries);
                self.browse.device_label = None;
            }
            NavTarget::Path { path, device } => {
                self.browse.replace_entries(path, entries);
                if device.is_some() {
                    self.browse.device_label = device;
                }
            }
        }
        Applied::Installed
    }

    /// Switch to the player screen.
    pub fn enter_player(&mut self) {
        self.ctx.screen = Screen::Player;
        self.ctx.control_focused = None;
        self.ctx.header_focused = false;
    }

    /// Move browse focus without changing the screen.
    pub fn focus_entry(&mut self, index: usize) {
        if index < self.browse.entries.len() {
            self.browse.focused_index = index;
        }
    }

    /// Show the image at `index` in the viewer.
    pub fn enter_image(&mut self, index: usize) {
        self.focus_entry(index);
        self.ctx.screen = Screen::Image;
        self.ctx.header_focused = false;
    }

    /// Return to the file browser, clearing control focus.
    pub fn return_to_browser(&mut self) {
        self.ctx.screen = Screen::Browser;
        self.ctx.control_focused = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> NavSettings {
        NavSettings::from_config(&PlayerConfig::default())
    }

    fn entry(name: &str, kind: EntryKind) -> Entry {
        Entry::new(name, format!("usb1/{}", name), kind)
    }

    fn browsing(path: &str, entries: Vec<Entry>) -> Navigator {
        let mut nav = Navigator::new(settings());
        nav.browse.replace_entries(path.to_string(), entries);
        nav
    }

    fn videos(count: usize) -> Vec<Entry> {
        (0..count)
            .map(|i| entry(&format!("v{:02}.mp4", i), EntryKind::Video))
            .collect()
    }

    // =========================================================================
    // Browser
    // =========================================================================

    #[test]
    fn test_back_navigates_to_parent() {
        let mut nav = browsing("/usb1/Movies", videos(3));
        let effects = nav.handle(Input::Back);
        assert!(matches!(
            effects.as_slice(),
            [Effect::RequestListing { path, .. }] if path == "/usb1"
        ));
    }

    #[test]
    fn test_back_at_device_root_rescans() {
        let mut nav = browsing("/usb1", videos(3));
        let effects = nav.handle(Input::Back);
        assert!(matches!(effects.as_slice(), [Effect::RequestDeviceScan { .. }]));
    }

    #[test]
    fn test_back_at_device_list_exits() {
        let mut nav = browsing(ROOT_PATH, vec![entry("usb1", EntryKind::UsbRoot)]);
        assert_eq!(nav.handle(Input::Back), vec![Effect::RequestExit]);
    }

    #[test]
    fn test_back_clears_header_focus_first() {
        let mut nav = browsing("/usb1/Movies", videos(3));
        nav.handle(Input::Up);
        assert!(nav.context().header_focused);

        let effects = nav.handle(Input::Back);
        assert!(!nav.context().header_focused);
        assert_eq!(effects, vec![Effect::Render(RenderHint::Header)]);
    }

    #[test]
    fn test_up_from_first_entry_focuses_header() {
        let mut nav = browsing("usb1", videos(3));
        nav.handle(Input::Up);
        assert!(nav.context().header_focused);

        assert!(nav.handle(Input::Up).is_empty());
        assert!(nav.context().header_focused);
    }

    #[test]
    fn test_down_from_header_focuses_first_entry() {
        let mut nav = browsing("usb1", videos(10));
        nav.browse.focused_index = 0;
        nav.handle(Input::Up);
        nav.browse.focused_index = 4;

        nav.handle(Input::Down);
        assert!(!nav.context().header_focused);
        assert_eq!(nav.browse().focused_index, 0);
    }

    #[test]
    fn test_list_moves_by_one_and_clamps() {
        let mut nav = browsing("usb1", videos(3));
        nav.handle(Input::Down);
        nav.handle(Input::Down);
        nav.handle(Input::Down);
        assert_eq!(nav.browse().focused_index, 2);
        nav.handle(Input::Up);
        assert_eq!(nav.browse().focused_index, 1);
    }

    #[test]
    fn test_left_right_ignored_in_list() {
        let mut nav = browsing("usb1", videos(3));
        assert!(nav.handle(Input::Right).is_empty());
        assert_eq!(nav.browse().focused_index, 0);
    }

    #[test]
    fn test_grid_moves_by_columns() {
        let mut nav = browsing("usb1", videos(12));
        nav.browse.layout = LayoutMode::Grid;

        nav.handle(Input::Down);
        assert_eq!(nav.browse().focused_index, 5);
        nav.handle(Input::Right);
        assert_eq!(nav.browse().focused_index, 6);
        nav.handle(Input::Down);
        assert_eq!(nav.browse().focused_index, 11);
        nav.handle(Input::Up);
        assert_eq!(nav.browse().focused_index, 6);
        nav.handle(Input::Up);
        nav.handle(Input::Left);
        assert_eq!(nav.browse().focused_index, 0);
    }

    #[test]
    fn test_grid_up_clamps_to_zero() {
        let mut nav = browsing("usb1", videos(12));
        nav.browse.layout = LayoutMode::Grid;
        nav.browse.focused_index = 3;
        nav.handle(Input::Up);
        assert_eq!(nav.browse().focused_index, 0);
    }

    #[test]
    fn test_empty_listing_focus_moves_are_noops() {
        let mut nav = browsing("usb1", vec![]);
        nav.browse.layout = LayoutMode::Grid;
        for input in [Input::Down, Input::Right, Input::Left] {
            assert!(nav.handle(input).is_empty());
            assert_eq!(nav.browse().focused_index, 0);
        }
        assert!(nav.handle(Input::Ok).is_empty());
    }

    #[test]
    fn test_ok_opens_by_kind() {
        let mut nav = browsing(
            "usb1",
            vec![
                entry("Movies", EntryKind::Folder),
                entry("a.mp4", EntryKind::Video),
                entry("b.jpg", EntryKind::Image),
                entry("c.txt", EntryKind::Other),
            ],
        );

        assert!(matches!(
            nav.handle(Input::Ok).as_slice(),
            [Effect::RequestListing { path, .. }] if path == "usb1/Movies"
        ));

        nav.browse.focused_index = 1;
        assert!(matches!(
            nav.handle(Input::Ok).as_slice(),
            [Effect::RequestPlayback(e)] if e.name == "a.mp4"
        ));

        nav.browse.focused_index = 2;
        assert!(matches!(
            nav.handle(Input::Ok).as_slice(),
            [Effect::RequestImageView { index: 2, .. }]
        ));

        nav.browse.focused_index = 3;
        assert!(nav.handle(Input::Ok).is_empty());
    }

    #[test]
    fn test_toggle_layout_resets_render() {
        let mut nav = browsing("usb1", videos(30));
        nav.browse.loaded_count = 20;

        let effects = nav.handle(Input::ToggleLayout);
        assert_eq!(nav.browse().layout, LayoutMode::Grid);
        assert_eq!(nav.browse().loaded_count, 0);
        assert!(effects.contains(&Effect::Render(RenderHint::Reset)));
    }

    #[test]
    fn test_toggle_layout_ignored_with_header_focus() {
        let mut nav = browsing("usb1", videos(3));
        nav.handle(Input::Up);
        assert!(nav.handle(Input::ToggleLayout).is_empty());
        assert_eq!(nav.browse().layout, LayoutMode::List);

        nav.handle(Input::Ok);
        assert_eq!(nav.browse().layout, LayoutMode::Grid);
    }

    #[test]
    fn test_focus_invariant_holds() {
        let inputs = [
            Input::Down,
            Input::Right,
            Input::Down,
            Input::ToggleLayout,
            Input::Down,
            Input::Down,
            Input::Right,
            Input::Up,
            Input::Left,
            Input::Up,
            Input::Up,
            Input::Down,
            Input::Right,
        ];
        for len in [0, 1, 4, 7, 23] {
            let mut nav = browsing("usb1", videos(len));
            for input in inputs {
                nav.handle(input);
                let b = nav.browse();
                if b.entries.is_empty() {
                    assert_eq!(b.focused_index, 0);
                } else {
                    assert!(b.focused_index < b.entries.len());
                }
            }
        }
    }

    // =========================================================================
    // Async results
    // =========================================================================

    #[test]
    fn test_listing_applies_and_tracks_device() {
        let mut nav = browsing(ROOT_PATH, vec![entry("usb1", EntryKind::UsbRoot)]);
        nav.browse.entries[0].path = "usb1".into();
        let ticket = match nav.handle(Input::Ok).as_slice() {
            [Effect::RequestListing { ticket, .. }] => *ticket,
            other => panic!("unexpected effects: {:?}", other),
        };

        let applied = nav.apply_listing(ticket, Ok(videos(2)));
        assert_eq!(applied, Applied::Installed);
        assert_eq!(nav.browse().current_path, "usb1");
        assert_eq!(nav.browse().device_label.as_deref(), Some("usb1"));
        assert_eq!(nav.browse().focused_index, 0);
    }

    #[test]
    fn test_stale_listing_is_discarded() {
        let mut nav = browsing("usb1", vec![entry("A", EntryKind::Folder), entry("B", EntryKind::Folder)]);
        let first = match nav.handle(Input::Ok).as_slice() {
            [Effect::RequestListing { ticket, .. }] => *ticket,
            _ => unreachable!(),
        };
        nav.browse.focused_index = 1;
        let second = match nav.handle(Input::Ok).as_slice() {
            [Effect::RequestListing { ticket, .. }] => *ticket,
            _ => unreachable!(),
        };

        assert_eq!(nav.apply_listing(first, Ok(videos(5))), Applied::Stale);
        assert_eq!(nav.browse().current_path, "usb1");

        assert_eq!(nav.apply_listing(second, Ok(videos(1))), Applied::Installed);
        assert_eq!(nav.browse().current_path, "usb1/B");
    }

    #[test]
    fn test_failed_listing_empties_entries() {
        let mut nav = browsing("usb1", vec![entry("A", EntryKind::Folder), entry("b.mp4", EntryKind::Video)]);
        let ticket = match nav.handle(Input::Ok).as_slice() {
            [Effect::RequestListing { ticket, .. }] => *ticket,
            _ => unreachable!(),
        };
        nav.handle(Input::Down);

        let applied = nav.apply_listing(ticket, Err(StorageError::CannotRead("usb1/A".into())));
        assert_eq!(applied, Applied::Failed("Cannot read folder".into()));
        assert!(nav.browse().entries.is_empty());
        assert_eq!(nav.browse().current_path, "usb1");
        assert_eq!(nav.browse().focused_index, 0);
        assert_eq!(nav.browse().loaded_count, 0);

        assert!(nav.handle(Input::Down).is_empty());
        assert!(matches!(
            nav.handle(Input::Back).as_slice(),
            [Effect::RequestDeviceScan { .. }]
        ));
    }

    #[test]
    fn test_device_scan_resets_label() {
        let mut nav = browsing("usb1", videos(2));
        nav.browse.device_label = Some("usb1".into());
        let ticket = match nav.handle(Input::Back).as_slice() {
            [Effect::RequestDeviceScan { ticket }] => *ticket,
            _ => unreachable!(),
        };
        nav.apply_devices(ticket, Ok(vec![entry("usb1", EntryKind::UsbRoot)]));
        assert!(nav.browse().is_root());
        assert!(nav.browse().device_label.is_none());
    }

    // =========================================================================
    // Player
    // =========================================================================

    fn playing() -> Navigator {
        let mut nav = browsing("usb1", videos(3));
        nav.enter_player();
        nav
    }

    #[test]
    fn test_first_ok_focuses_control_without_toggling() {
        let mut nav = playing();
        let effects = nav.handle(Input::Ok);
        assert_eq!(nav.context().control_focused, Some(Control::PlayPause));
        assert!(!effects.contains(&Effect::TogglePlayback));

        let effects = nav.handle(Input::Ok);
        assert!(effects.contains(&Effect::TogglePlayback));
    }

    #[test]
    fn test_arrows_seek_without_control_focus() {
        let mut nav = playing();
        assert!(nav.handle(Input::Left).contains(&Effect::Seek(-10.0)));
        assert!(nav.handle(Input::Right).contains(&Effect::Seek(10.0)));
        assert!(nav.context().control_focused.is_none());
    }

    #[test]
    fn test_arrows_move_control_focus() {
        let mut nav = playing();
        nav.handle(Input::Ok);
        nav.handle(Input::Left);
        assert_eq!(nav.context().control_focused, Some(Control::PlayPause));
        for _ in 0..5 {
            nav.handle(Input::Right);
        }
        assert_eq!(nav.context().control_focused, Some(Control::Back));
    }

    #[test]
    fn test_seek_controls() {
        let mut nav = playing();
        nav.handle(Input::Ok);
        nav.handle(Input::Right);
        assert!(nav.handle(Input::Ok).contains(&Effect::Seek(-10.0)));
        nav.handle(Input::Right);
        assert!(nav.handle(Input::Ok).contains(&Effect::Seek(10.0)));
    }

    #[test]
    fn test_toggle_play_requires_play_control() {
        let mut nav = playing();
        assert!(nav.handle(Input::TogglePlay).is_empty());
        nav.handle(Input::Ok);
        assert!(nav.handle(Input::TogglePlay).contains(&Effect::TogglePlayback));
        nav.handle(Input::Right);
        assert!(nav.handle(Input::TogglePlay).is_empty());
    }

    #[test]
    fn test_player_back_unfocuses_then_leaves() {
        let mut nav = playing();
        nav.handle(Input::Ok);

        let effects = nav.handle(Input::Back);
        assert_eq!(effects, vec![Effect::Render(RenderHint::Controls)]);
        assert_eq!(nav.context().screen, Screen::Player);

        let effects = nav.handle(Input::Back);
        assert_eq!(nav.context().screen, Screen::Browser);
        assert_eq!(&effects[..2], &[Effect::StopPlayback, Effect::PersistResume]);
    }

    #[test]
    fn test_back_control_leaves_player() {
        let mut nav = playing();
        nav.handle(Input::Ok);
        for _ in 0..3 {
            nav.handle(Input::Right);
        }
        let effects = nav.handle(Input::Ok);
        assert_eq!(nav.context().screen, Screen::Browser);
        assert!(nav.context().control_focused.is_none());
        assert!(effects.contains(&Effect::StopPlayback));
    }

    // =========================================================================
    // Image viewer
    // =========================================================================

    fn viewing(index: usize) -> Navigator {
        let mut nav = browsing(
            "usb1",
            vec![
                entry("Folder", EntryKind::Folder),
                entry("a.jpg", EntryKind::Image),
                entry("b.mp4", EntryKind::Video),
                entry("c.txt", EntryKind::Other),
                entry("d.png", EntryKind::Image),
            ],
        );
        nav.enter_image(index);
        nav
    }

    #[test]
    fn test_image_right_skips_non_images() {
        let mut nav = viewing(1);
        let effects = nav.handle(Input::Right);
        assert!(matches!(
            effects.as_slice(),
            [Effect::RequestImageView { index: 4, entry }] if entry.name == "d.png"
        ));
    }

    #[test]
    fn test_image_right_at_last_image_is_noop() {
        let mut nav = viewing(4);
        assert!(nav.handle(Input::Right).is_empty());
        assert_eq!(nav.browse().focused_index, 4);
    }

    #[test]
    fn test_image_left() {
        let mut nav = viewing(4);
        assert!(matches!(
            nav.handle(Input::Left).as_slice(),
            [Effect::RequestImageView { index: 1, .. }]
        ));

        let mut nav = viewing(1);
        assert!(nav.handle(Input::Left).is_empty());
    }

    #[test]
    fn test_image_back_returns_to_browser() {
        let mut nav = viewing(4);
        nav.handle(Input::Back);
        assert_eq!(nav.context().screen, Screen::Browser);
        assert_eq!(nav.browse().focused_index, 4);

        let mut nav = viewing(1);
        nav.handle(Input::Ok);
        assert_eq!(nav.context().screen, Screen::Browser);
    }
}

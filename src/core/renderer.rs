//! Incremental, batched file-list rendering.
//!
//! Only a prefix of the entry list is handed to the [`RenderSurface`]; more
//! batches are appended when focus or scrolling approaches the rendered end.
//! Batches are rendered synchronously through `&mut self`, so a trigger that
//! arrives while one batch is being built cannot start a second one.

use crate::config::{browser, PlayerConfig};
use crate::models::{BrowseState, Entry, EntryKind, LayoutMode};

/// Message shown for an empty directory.
pub const EMPTY_MESSAGE: &str = "No files";

/// One rendered row or tile.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderItem {
    pub index: usize,
    pub entry: Entry,
    pub layout: LayoutMode,
    pub focused: bool,
}

/// Visual target of the file list.
pub trait RenderSurface {
    /// Remove all items and any status message.
    fn clear(&mut self);
    /// Append items after those already rendered.
    fn append(&mut self, items: Vec<RenderItem>);
    /// Mark exactly one item as focused, or none.
    fn set_focused(&mut self, index: Option<usize>);
    /// Smoothly scroll the item at `index` into view.
    fn scroll_into_view(&mut self, index: usize);
    /// Show a status message in place of the list.
    fn show_message(&mut self, message: &str);
}

/// A thumbnail request scheduled by a grid batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThumbnailJob {
    pub index: usize,
    pub path: String,
    pub delay_ms: u32,
}

/// Event that may require another batch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Proximity {
    /// Focus moved to this index.
    Focus(usize),
    /// The list scrolled; positions in pixels.
    Scroll { visible_end: f64, rendered_end: f64 },
}

/// Batched renderer for [`BrowseState`].
#[derive(Clone, Debug)]
pub struct ListRenderer {
    batch_size: usize,
    proximity_window: usize,
    scroll_threshold_px: f64,
    stagger_ms: u32,
}

impl ListRenderer {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            proximity_window: browser::PROXIMITY_WINDOW,
            scroll_threshold_px: browser::SCROLL_PROXIMITY_PX,
            stagger_ms: config.thumbnail_stagger_ms,
        }
    }

    /// Render a fresh listing or layout from scratch.
    ///
    /// Batches are rendered until the focused entry is on the surface.
    pub fn set_entries(
        &self,
        state: &mut BrowseState,
        surface: &mut dyn RenderSurface,
    ) -> Vec<ThumbnailJob> {
        state.loaded_count = 0;
        surface.clear();

        if state.entries.is_empty() {
            surface.show_message(EMPTY_MESSAGE);
            return Vec::new();
        }

        let mut jobs = self.load_more(state, surface);
        jobs.extend(self.load_through(state.focused_index, state, surface));
        surface.set_focused(Some(state.focused_index));
        if state.focused_index > 0 {
            surface.scroll_into_view(state.focused_index);
        }
        jobs
    }

    /// Render the next batch. No-op once every entry is rendered.
    pub fn load_more(
        &self,
        state: &mut BrowseState,
        surface: &mut dyn RenderSurface,
    ) -> Vec<ThumbnailJob> {
        let total = state.entries.len();
        let start = state.loaded_count;
        if start >= total {
            return Vec::new();
        }
        let end = (start + self.batch_size).min(total);

        let mut jobs = Vec::new();
        let items = (start..end)
            .map(|index| {
                let entry = state.entries[index].clone();
                if state.layout == LayoutMode::Grid && entry.kind == EntryKind::Video {
                    jobs.push(ThumbnailJob {
                        index,
                        path: entry.path.clone(),
                        delay_ms: self.stagger_ms * (index - start) as u32,
                    });
                }
                RenderItem {
                    index,
                    entry,
                    layout: state.layout,
                    focused: index == state.focused_index,
                }
            })
            .collect();

        surface.append(items);
        state.loaded_count = end;
        jobs
    }

    /// Load another batch if the trigger is close to the rendered end.
    pub fn on_proximity(
        &self,
        trigger: Proximity,
        state: &mut BrowseState,
        surface: &mut dyn RenderSurface,
    ) -> Vec<ThumbnailJob> {
        let near_end = match trigger {
            Proximity::Focus(index) => index + self.proximity_window > state.loaded_count,
            Proximity::Scroll {
                visible_end,
                rendered_end,
            } => visible_end >= rendered_end - self.scroll_threshold_px,
        };

        if near_end {
            self.load_more(state, surface)
        } else {
            Vec::new()
        }
    }

    /// Reflect a focus change on the surface.
    pub fn focus(
        &self,
        state: &mut BrowseState,
        surface: &mut dyn RenderSurface,
    ) -> Vec<ThumbnailJob> {
        if state.entries.is_empty() {
            return Vec::new();
        }

        let index = state.focused_index;
        let mut jobs = self.on_proximity(Proximity::Focus(index), state, surface);
        jobs.extend(self.load_through(index, state, surface));
        surface.set_focused(Some(index));
        surface.scroll_into_view(index);
        jobs
    }

    fn load_through(
        &self,
        index: usize,
        state: &mut BrowseState,
        surface: &mut dyn RenderSurface,
    ) -> Vec<ThumbnailJob> {
        let mut jobs = Vec::new();
        while index >= state.loaded_count && state.loaded_count < state.entries.len() {
            jobs.extend(self.load_more(state, surface));
        }
        jobs
    }
}

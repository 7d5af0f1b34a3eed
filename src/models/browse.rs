//! File browser state.

use crate::config::browser::ROOT_PATH;
use crate::models::Entry;

/// Layout of the file list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutMode {
    /// One entry per row (default)
    #[default]
    List,
    /// Tiles in a fixed number of columns
    Grid,
}

impl LayoutMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::List => Self::Grid,
            Self::Grid => Self::List,
        }
    }
}

/// Where a navigation request leads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavTarget {
    /// Re-enumerate removable devices
    Devices,
    /// List a directory. `device` carries the device name when entering a device root.
    Path {
        path: String,
        device: Option<String>,
    },
}

/// An outstanding listing request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingNavigation {
    pub ticket: u64,
    pub target: NavTarget,
}

/// State of the file browser screen.
///
/// `focused_index` is always a valid index into `entries` (0 when empty) and
/// `loaded_count` never exceeds `entries.len()`.
#[derive(Clone, Debug, PartialEq)]
pub struct BrowseState {
    pub current_path: String,
    pub entries: Vec<Entry>,
    pub focused_index: usize,
    /// Number of entries handed to the render surface for this listing.
    pub loaded_count: usize,
    pub layout: LayoutMode,
    /// Name of the device being browsed, `None` at the device list.
    pub device_label: Option<String>,
    /// Last issued listing ticket.
    pub request_seq: u64,
    pub pending: Option<PendingNavigation>,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self {
            current_path: ROOT_PATH.to_string(),
            entries: Vec::new(),
            focused_index: 0,
            loaded_count: 0,
            layout: LayoutMode::default(),
            device_label: None,
            request_seq: 0,
            pending: None,
        }
    }
}

impl BrowseState {
    /// Whether the device list is on screen.
    pub fn is_root(&self) -> bool {
        self.current_path == ROOT_PATH
    }

    pub fn focused_entry(&self) -> Option<&Entry> {
        self.entries.get(self.focused_index)
    }

    /// Install a new listing, resetting focus and render progress.
    pub fn replace_entries(&mut self, path: String, entries: Vec<Entry>) {
        self.current_path = path;
        self.entries = entries;
        self.focused_index = 0;
        self.loaded_count = 0;
    }

    /// Issue a ticket for a new navigation request.
    ///
    /// Any earlier outstanding request becomes stale.
    pub fn begin_navigation(&mut self, target: NavTarget) -> u64 {
        self.request_seq += 1;
        self.pending = Some(PendingNavigation {
            ticket: self.request_seq,
            target,
        });
        self.request_seq
    }

    /// Take the pending request if `ticket` is the latest one issued.
    pub fn take_pending(&mut self, ticket: u64) -> Option<NavTarget> {
        match &self.pending {
            Some(pending) if pending.ticket == ticket => self.pending.take().map(|p| p.target),
            _ => None,
        }
    }
}

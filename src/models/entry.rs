//! Browser entry types.

/// Kind of a browser entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Removable storage device at the device list
    UsbRoot,
    Folder,
    Video,
    Image,
    /// Anything the player cannot open
    Other,
}

impl EntryKind {
    /// Glyph shown next to the entry name.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::UsbRoot => "💾",
            Self::Folder => "📁",
            Self::Video => "🎬",
            Self::Image => "🖼️",
            Self::Other => "📄",
        }
    }

    /// Whether OK on this entry navigates into it.
    pub fn is_container(self) -> bool {
        matches!(self, Self::UsbRoot | Self::Folder)
    }

    fn is_media(self) -> bool {
        matches!(self, Self::Video | Self::Image)
    }
}

/// One row or tile of the file browser.
///
/// Entries are immutable; a listing replaces the whole list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    /// Human-readable size, empty for containers.
    pub size_label: String,
}

impl Entry {
    pub fn new(name: impl Into<String>, path: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            size_label: String::new(),
        }
    }

    /// Attach a size label.
    pub fn with_size(mut self, label: impl Into<String>) -> Self {
        self.size_label = label.into();
        self
    }

    #[inline]
    pub fn glyph(&self) -> &'static str {
        self.kind.glyph()
    }

    /// `file://` URI of this entry, as the media engines and image viewer expect.
    pub fn uri(&self) -> String {
        file_uri(&self.path)
    }
}

/// Build a `file://` URI for a platform path.
pub fn file_uri(path: &str) -> String {
    if path.starts_with("file://") {
        path.to_string()
    } else {
        format!("file://{}", path)
    }
}

/// Sort entries for display.
///
/// Containers come first. Names compare case-insensitively with a byte-wise
/// tie-break so the order is total. With `media_first`, videos and images
/// precede other files within the non-container tier.
pub fn sort_entries(entries: &mut [Entry], media_first: bool) {
    entries.sort_by_cached_key(|e| sort_key(e, media_first));
}

fn sort_key(entry: &Entry, media_first: bool) -> (u8, String, String) {
    let tier = if entry.kind.is_container() {
        0
    } else if media_first && entry.kind.is_media() {
        1
    } else {
        2
    };
    (tier, entry.name.to_lowercase(), entry.name.clone())
}

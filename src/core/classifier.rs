//! File format classification.

use crate::config::PlayerConfig;
use crate::models::EntryKind;

/// Maps file names to entry kinds using configurable extension lists.
#[derive(Clone, Debug)]
pub struct FormatClassifier {
    video: Vec<String>,
    image: Vec<String>,
    unsupported_image: Vec<String>,
}

impl FormatClassifier {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            video: normalize(&config.video_formats),
            image: normalize(&config.image_formats),
            unsupported_image: normalize(&config.unsupported_image_formats),
        }
    }

    /// Classify a listing item.
    ///
    /// Directories are always folders. Files match on their lowercased
    /// extension; a name without a dot is `Other`.
    pub fn classify(&self, name: &str, is_directory: bool) -> EntryKind {
        if is_directory {
            return EntryKind::Folder;
        }

        match extension(name) {
            Some(ext) if contains(&self.video, &ext) => EntryKind::Video,
            Some(ext) if contains(&self.image, &ext) => EntryKind::Image,
            _ => EntryKind::Other,
        }
    }

    /// Extension of an image the runtime cannot decode, if `name` is one.
    pub fn unsupported_image(&self, name: &str) -> Option<String> {
        extension(name).filter(|ext| contains(&self.unsupported_image, ext))
    }
}

impl Default for FormatClassifier {
    fn default() -> Self {
        Self::new(&PlayerConfig::default())
    }
}

/// Lowercased extension including the leading dot.
fn extension(name: &str) -> Option<String> {
    let dot = name.rfind('.')?;
    Some(name[dot..].to_lowercase())
}

fn contains(list: &[String], ext: &str) -> bool {
    list.iter().any(|candidate| candidate == ext)
}

/// Lowercase and ensure a leading dot, so `"MP4"` and `".mp4"` are equivalent.
fn normalize(formats: &[String]) -> Vec<String> {
    formats
        .iter()
        .map(|f| {
            let f = f.trim().to_lowercase();
            if f.starts_with('.') { f } else { format!(".{}", f) }
        })
        .collect()
}

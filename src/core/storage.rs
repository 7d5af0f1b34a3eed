//! Storage device enumeration and directory listing.
//!
//! [`StorageService`] is implemented by the platform bindings; this module
//! turns raw device and listing records into sorted browser [`Entry`] lists.

use futures::future::LocalBoxFuture;

use crate::config::browser::ROOT_PATH;
use crate::core::classifier::FormatClassifier;
use crate::core::error::StorageError;
use crate::models::{sort_entries, Entry, EntryKind, NavTarget};
use crate::utils::format::format_size;

/// Storage class reported by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    Internal,
    External,
    Usb,
}

impl DeviceKind {
    /// Parse the platform's storage type string.
    pub fn from_platform(kind: &str) -> Self {
        match kind {
            "EXTERNAL" => Self::External,
            "USB" => Self::Usb,
            _ => Self::Internal,
        }
    }

    pub fn is_removable(self) -> bool {
        matches!(self, Self::External | Self::Usb)
    }
}

/// A storage device as enumerated by the platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Platform label, also the virtual root path of the device.
    pub label: String,
    pub kind: DeviceKind,
}

/// One child of a listed directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingItem {
    pub name: String,
    pub full_path: String,
    pub is_directory: bool,
    pub file_size: Option<u64>,
}

/// Device enumeration and directory listing.
pub trait StorageService {
    fn list_devices(&self) -> LocalBoxFuture<'_, Result<Vec<DeviceInfo>, StorageError>>;
    fn list_children<'a>(
        &'a self,
        path: &'a str,
    ) -> LocalBoxFuture<'a, Result<Vec<ListingItem>, StorageError>>;
}

/// Build the device list shown at the root.
///
/// Only removable devices are listed; an unlabeled device is shown as
/// `USB Device N` (1-based position among removable devices).
pub fn device_entries(devices: &[DeviceInfo]) -> Result<Vec<Entry>, StorageError> {
    let entries: Vec<Entry> = devices
        .iter()
        .filter(|d| d.kind.is_removable())
        .enumerate()
        .map(|(i, device)| {
            let name = if device.label.is_empty() {
                format!("USB Device {}", i + 1)
            } else {
                device.label.clone()
            };
            Entry::new(name, device.label.clone(), EntryKind::UsbRoot)
        })
        .collect();

    if entries.is_empty() {
        return Err(StorageError::NoDevices);
    }
    Ok(entries)
}

/// Classify and sort the children of a directory.
pub fn listing_entries(
    items: Vec<ListingItem>,
    classifier: &FormatClassifier,
    media_first: bool,
) -> Vec<Entry> {
    let mut entries: Vec<Entry> = items
        .into_iter()
        .map(|item| {
            let kind = classifier.classify(&item.name, item.is_directory);
            let size = if item.is_directory {
                String::new()
            } else {
                format_size(item.file_size)
            };
            Entry::new(item.name, item.full_path, kind).with_size(size)
        })
        .collect();

    sort_entries(&mut entries, media_first);
    entries
}

/// Where Back leads from `path`.
///
/// The last segment is stripped; an empty result, or the root itself, means
/// the device list has to be enumerated again.
pub fn parent_target(path: &str) -> NavTarget {
    let parent = match path.rsplit_once('/') {
        Some((parent, _)) => parent,
        None => "",
    };

    if parent.is_empty() || parent == ROOT_PATH {
        NavTarget::Devices
    } else {
        NavTarget::Path {
            path: parent.to_string(),
            device: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, is_directory: bool, size: Option<u64>) -> ListingItem {
        ListingItem {
            name: name.to_string(),
            full_path: format!("usb1/{}", name),
            is_directory,
            file_size: size,
        }
    }

    #[test]
    fn test_parent_target() {
        assert_eq!(
            parent_target("/usb1/Movies"),
            NavTarget::Path {
                path: "/usb1".into(),
                device: None
            }
        );
        assert_eq!(parent_target("/usb1"), NavTarget::Devices);
        assert_eq!(
            parent_target("removable_sda1/Movies"),
            NavTarget::Path {
                path: "removable_sda1".into(),
                device: None
            }
        );
        assert_eq!(parent_target("removable_sda1"), NavTarget::Devices);
        assert_eq!(parent_target("/"), NavTarget::Devices);
    }

    #[test]
    fn test_device_entries_filter_removable() {
        let devices = vec![
            DeviceInfo {
                label: "internal0".into(),
                kind: DeviceKind::Internal,
            },
            DeviceInfo {
                label: "removable_sda1".into(),
                kind: DeviceKind::Usb,
            },
            DeviceInfo {
                label: String::new(),
                kind: DeviceKind::External,
            },
        ];
        let entries = device_entries(&devices).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "removable_sda1");
        assert_eq!(entries[0].kind, EntryKind::UsbRoot);
        assert_eq!(entries[1].name, "USB Device 2");
    }

    #[test]
    fn test_no_removable_devices() {
        let devices = vec![DeviceInfo {
            label: "internal0".into(),
            kind: DeviceKind::Internal,
        }];
        assert_eq!(device_entries(&devices), Err(StorageError::NoDevices));
        assert_eq!(device_entries(&[]), Err(StorageError::NoDevices));
    }

    #[test]
    fn test_listing_entries_sorted_and_labelled() {
        let items = vec![
            item("b.mp4", false, Some(1536)),
            item("A", true, None),
            item("z.txt", false, Some(0)),
        ];
        let entries = listing_entries(items, &FormatClassifier::default(), false);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "b.mp4", "z.txt"]);
        assert_eq!(entries[0].kind, EntryKind::Folder);
        assert_eq!(entries[0].size_label, "");
        assert_eq!(entries[1].kind, EntryKind::Video);
        assert_eq!(entries[1].size_label, "1.5 KB");
        assert_eq!(entries[2].size_label, "0 B");
    }

    #[test]
    fn test_device_kind_parsing() {
        assert_eq!(DeviceKind::from_platform("USB"), DeviceKind::Usb);
        assert_eq!(DeviceKind::from_platform("EXTERNAL"), DeviceKind::External);
        assert_eq!(DeviceKind::from_platform("INTERNAL"), DeviceKind::Internal);
    }
}

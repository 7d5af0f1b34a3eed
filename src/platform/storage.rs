//! Filesystem and content index bindings for the TV web runtime.

use futures::future::LocalBoxFuture;
use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use super::js::{array_items, call, callback_promise, error_message, global, string_field};
use crate::core::error::{StorageError, ThumbnailError};
use crate::core::storage::{DeviceInfo, DeviceKind, ListingItem, StorageService};
use crate::core::thumbnail::ContentIndex;

/// [`StorageService`] over `tizen.filesystem`.
pub struct TizenStorage {
    filesystem: Object,
}

impl TizenStorage {
    /// Bind to the platform filesystem, if the runtime exposes one.
    pub fn detect() -> Option<Self> {
        global(&["tizen", "filesystem"]).map(|filesystem| Self { filesystem })
    }
}

impl StorageService for TizenStorage {
    fn list_devices(&self) -> LocalBoxFuture<'_, Result<Vec<DeviceInfo>, StorageError>> {
        Box::pin(async move {
            let storages = callback_promise(|ok, err| {
                call(&self.filesystem, "listStorages", &[ok, err])
            })
            .await
            .map_err(|e| {
                log::error!("listStorages failed: {}", error_message(&e));
                StorageError::Unavailable
            })?;

            let devices = array_items(&storages)
                .iter()
                .map(|storage| DeviceInfo {
                    label: string_field(storage, "label"),
                    kind: DeviceKind::from_platform(&string_field(storage, "type")),
                })
                .collect::<Vec<_>>();
            log::debug!("Found {} storage devices", devices.len());
            Ok(devices)
        })
    }

    fn list_children<'a>(
        &'a self,
        path: &'a str,
    ) -> LocalBoxFuture<'a, Result<Vec<ListingItem>, StorageError>> {
        Box::pin(async move {
            let dir = callback_promise(|ok, err| {
                call(&self.filesystem, "resolve", &[path.into(), ok, err, "r".into()])
            })
            .await
            .map_err(|e| StorageError::CannotOpen(error_message(&e)))?;

            let files = callback_promise(|ok, err| call(&dir, "listFiles", &[ok, err]))
                .await
                .map_err(|e| StorageError::CannotRead(error_message(&e)))?;

            Ok(array_items(&files).iter().map(listing_item).collect())
        })
    }
}

fn listing_item(file: &JsValue) -> ListingItem {
    let is_directory = Reflect::get(file, &"isDirectory".into())
        .ok()
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let file_size = Reflect::get(file, &"fileSize".into())
        .ok()
        .and_then(|v| v.as_f64())
        .filter(|size| size.is_finite() && *size >= 0.0)
        .map(|size| size as u64);

    ListingItem {
        name: string_field(file, "name"),
        full_path: string_field(file, "fullPath"),
        is_directory,
        file_size,
    }
}

/// [`ContentIndex`] over `tizen.content`.
pub struct TizenContentIndex {
    content: Object,
    attribute_filter: Function,
}

impl TizenContentIndex {
    pub fn detect() -> Option<Self> {
        let content = global(&["tizen", "content"])?;
        let attribute_filter = global(&["tizen"])
            .and_then(|tizen| Reflect::get(&tizen, &"AttributeFilter".into()).ok())
            .and_then(|ctor| ctor.dyn_into::<Function>().ok())?;
        Some(Self {
            content,
            attribute_filter,
        })
    }

    fn exact_uri_filter(&self, uri: &str) -> Result<JsValue, ThumbnailError> {
        let args = Array::of3(&"contentURI".into(), &"EXACTLY".into(), &uri.into());
        Reflect::construct(&self.attribute_filter, &args)
            .map_err(|e| ThumbnailError::IndexUnavailable(error_message(&e)))
    }
}

impl ContentIndex for TizenContentIndex {
    fn lookup<'a>(&'a self, uri: &'a str) -> LocalBoxFuture<'a, Result<String, ThumbnailError>> {
        Box::pin(async move {
            let filter = self.exact_uri_filter(uri)?;
            let contents = callback_promise(|ok, err| {
                call(&self.content, "find", &[ok, err, JsValue::NULL, filter])
            })
            .await
            .map_err(|e| ThumbnailError::IndexUnavailable(error_message(&e)))?;

            array_items(&contents)
                .first()
                .and_then(|item| Reflect::get(item, &"thumbnailURIs".into()).ok())
                .and_then(|uris| array_items(&uris).into_iter().next())
                .and_then(|uri| uri.as_string())
                .filter(|uri| !uri.is_empty())
                .ok_or(ThumbnailError::NotIndexed)
        })
    }
}

/// Stand-in when the runtime has no filesystem API, e.g. a desktop browser.
pub struct UnavailableStorage;

impl StorageService for UnavailableStorage {
    fn list_devices(&self) -> LocalBoxFuture<'_, Result<Vec<DeviceInfo>, StorageError>> {
        Box::pin(async { Err(StorageError::Unavailable) })
    }

    fn list_children<'a>(
        &'a self,
        _path: &'a str,
    ) -> LocalBoxFuture<'a, Result<Vec<ListingItem>, StorageError>> {
        Box::pin(async { Err(StorageError::Unavailable) })
    }
}

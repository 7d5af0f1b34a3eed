//! Event loop, timers and persistence for the web build.

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use gloo_timers::future::TimeoutFuture;
use web_sys::Storage;

use crate::core::error::StoreError;
use crate::core::store::{KeyValueStore, MemoryStore};
use crate::core::task::{Spawner, Timer};
use crate::utils::dom;

/// Spawns onto the browser microtask queue.
pub struct WasmSpawner;

impl Spawner for WasmSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

/// `setTimeout`-backed sleeps.
pub struct GlooTimer;

impl Timer for GlooTimer {
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
        Box::pin(TimeoutFuture::new(ms))
    }
}

/// [`KeyValueStore`] over localStorage.
pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    pub fn open() -> Option<Self> {
        dom::local_storage().map(|storage| Self { storage })
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|_| StoreError::SaveFailed)
    }
}

/// localStorage when available, otherwise an in-memory store for this run.
pub fn persistent_store() -> Rc<dyn KeyValueStore> {
    match LocalStore::open() {
        Some(store) => Rc::new(store),
        None => {
            log::warn!("{}; resume positions will not survive a restart", StoreError::Unavailable);
            Rc::new(MemoryStore::default())
        }
    }
}

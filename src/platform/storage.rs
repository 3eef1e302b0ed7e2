//! Preference storage
//!
//! LocalStorage on the web, an in-memory map natively and in tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// String key/value store for small user preferences
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// 32-bit string hash used to namespace keys per game name
///
/// `h = h * 31 + unit` over UTF-16 code units with wrapping arithmetic, so
/// keys written by earlier web builds stay readable.
pub fn hash_code(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Key of the muted flag for the game called `name`
pub fn muted_key(name: &str) -> String {
    format!("{}muted", hash_code(name))
}

/// Read the muted flag; anything but `"true"` is unmuted
pub fn load_muted(store: &dyn PreferenceStore, name: &str) -> bool {
    store.get(&muted_key(name)).as_deref() == Some("true")
}

pub fn save_muted(store: &mut dyn PreferenceStore, name: &str, muted: bool) {
    store.set(&muted_key(name), if muted { "true" } else { "false" });
}

/// In-memory store; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl PreferenceStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage().and_then(|s| s.get_item(key).ok().flatten())
    }

    fn set(&mut self, key: &str, value: &str) {
        match Self::storage() {
            Some(storage) => {
                if storage.set_item(key, value).is_err() {
                    log::warn!("Failed to write preference {}", key);
                }
            }
            None => log::warn!("LocalStorage unavailable"),
        }
    }
}

//! `localStorage`-backed token persistence.

use imagehost_core::TokenStore;
use web_sys::Storage;

use crate::console;

/// Keeps the auth token under one `localStorage` key. When storage is
/// unavailable (private mode, sandboxed iframe) the session simply does not
/// survive a reload.
pub struct LocalStorageTokenStore {
    key: String,
}

impl LocalStorageTokenStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Option<Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl TokenStore for LocalStorageTokenStore {
    fn load(&self) -> Option<String> {
        Self::storage()?.get_item(&self.key).ok().flatten()
    }

    fn save(&self, token: &str) {
        let saved = Self::storage().map(|s| s.set_item(&self.key, token).is_ok());
        if saved != Some(true) {
            console::warn("Could not persist auth token; session will not survive a reload");
        }
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(&self.key);
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_round_trip_through_local_storage() {
        let store = LocalStorageTokenStore::new("imagehost-test-token");
        store.clear();
        assert_eq!(store.load(), None);

        store.save("abc");
        assert_eq!(store.load().as_deref(), Some("abc"));

        store.clear();
        assert_eq!(store.load(), None);
    }
}

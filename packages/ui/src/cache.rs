//! Platform cache constructor.
//!
//! Returns a [`store::LocalCache`] backed by the appropriate [`store::KeyValueStore`]:
//! - **Web** (WASM + `web` feature): IndexedDB via [`store::IdbStore`]
//! - **Native**: filesystem via [`store::FileStore`]

/// Create a cache scoped to an optional user id.
///
/// When `user_id` is `Some("uuid")`:
/// - **Web**: opens IndexedDB database `"liftbook-uuid"`
/// - **Native**: uses filesystem path `<data_dir>/liftbook/uuid/`
///
/// When `user_id` is `None`, falls back to the default unscoped store.
pub fn make_cache_for_user(user_id: Option<&str>) -> store::LocalCache<impl store::KeyValueStore> {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        store::LocalCache::new(store::IdbStore::with_namespace(user_id))
    }
    #[cfg(not(all(target_arch = "wasm32", feature = "web")))]
    {
        let base = native_base();
        let scoped = match user_id {
            Some(id) => base.join(id),
            None => base,
        };
        store::LocalCache::new(store::FileStore::new(scoped))
    }
}

/// Drop everything cached for `user_id`, e.g. after logging out on a shared device.
pub async fn forget_user(user_id: &str) {
    #[cfg(all(target_arch = "wasm32", feature = "web"))]
    {
        store::IdbStore::with_namespace(Some(user_id)).clear().await;
    }
    #[cfg(not(all(target_arch = "wasm32", feature = "web")))]
    {
        store::FileStore::delete_scoped(&native_base(), user_id);
    }
}

#[cfg(not(all(target_arch = "wasm32", feature = "web")))]
fn native_base() -> std::path::PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("liftbook")
}

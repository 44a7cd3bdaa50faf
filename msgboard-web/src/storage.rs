use anyhow::anyhow;
use gloo_storage::{LocalStorage, Storage};
use msgboard_client::KvStore;

/// The browser's `localStorage`
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStore;

impl KvStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        LocalStorage::raw()
            .set_item(key, &value)
            .map_err(|err| anyhow!("writing {key:?} to localStorage: {err:?}"))
    }
}

use std::{
    cell::RefCell,
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use msgboard_client::KvStore;

/// Key-value store persisted as a single JSON object on disk. The whole file
/// is rewritten on every write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: RefCell<HashMap<String, String>>,
}

impl FileStore {
    /// A missing file is an empty store. So is an unreadable one, which gets
    /// overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<FileStore> {
        let path = path.into();
        let data = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                tracing::warn!(?path, %err, "ignoring malformed cache file");
                HashMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(err) => {
                return Err(err).with_context(|| format!("reading cache file {path:?}"));
            }
        };
        Ok(FileStore {
            path,
            data: RefCell::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        let mut data = self.data.borrow_mut();
        data.insert(String::from(key), value);
        let bytes = serde_json::to_vec(&*data).context("serializing cache")?;
        std::fs::write(&self.path, bytes)
            .with_context(|| format!("writing cache file {:?}", self.path))
    }
}

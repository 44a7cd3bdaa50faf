use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Synchronous string key-value store, shared process-wide with
/// last-writer-wins semantics (browser `localStorage` or an equivalent)
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> anyhow::Result<()>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        (**self).set(key, value)
    }
}

impl<S: KvStore + ?Sized> KvStore for Rc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        (**self).set(key, value)
    }
}

/// In-memory store; clones share the same underlying map
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Rc<RefCell<HashMap<String, String>>>);

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> anyhow::Result<()> {
        self.0.borrow_mut().insert(String::from(key), value);
        Ok(())
    }
}

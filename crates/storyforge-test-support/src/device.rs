//! In-memory `DeviceStore` for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use storyforge_core::device::DeviceStore;

/// A device store backed by a hash map.
#[derive(Debug, Default)]
pub struct MemoryDeviceStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryDeviceStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceStore for MemoryDeviceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

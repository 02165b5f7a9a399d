// ABOUTME: Observable store core with durable JSON persistence
// ABOUTME: Update-then-persist-then-notify value container plus storage backends
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Durable key-value storage for serialized store state, one JSON blob per key
pub trait StorageBackend: Send + Sync {
    /// Read the blob stored under `key`, if any
    fn load(&self, key: &str) -> Option<String>;

    /// Write the blob under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; stores treat this as best-effort
    fn save(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Delete the blob under `key`; missing keys are not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the delete itself fails
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// File-per-key backend rooted in a directory, typically the platform data dir
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    /// Backend rooted at an explicit directory
    #[must_use]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Backend rooted at the platform data directory, falling back to the
    /// current directory when the platform reports none
    #[must_use]
    pub fn default_location() -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("carb-compass");
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for JsonFileBackend {
    fn load(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path_for(key)).ok()
    }

    fn save(&self, key: &str, value: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory backend for tests and ephemeral sessions
#[derive(Default)]
pub struct MemoryBackend {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Empty in-memory backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> anyhow::Result<()> {
        if let Ok(mut map) = self.map.lock() {
            map.insert(key.to_owned(), value.to_owned());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        if let Ok(mut map) = self.map.lock() {
            map.remove(key);
        }
        Ok(())
    }
}

/// Handle returned by [`ObservableStore::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Box<dyn Fn(&T) + Send>;

struct Inner<T> {
    value: T,
    subscribers: Vec<(u64, Subscriber<T>)>,
    next_id: u64,
}

/// One canonical value with persistence and synchronous fan-out notification.
///
/// Mutation order is fixed: compute next value, persist it (best-effort,
/// logged on failure), replace the canonical value, then notify every
/// subscriber. Subscribers therefore never observe a value whose persistence
/// has not already been attempted. A mutation that produces a value equal to
/// the current one is dropped entirely, so rejected store operations neither
/// rewrite storage nor wake subscribers.
pub struct ObservableStore<T> {
    key: String,
    backend: Arc<dyn StorageBackend>,
    inner: Mutex<Inner<T>>,
}

impl<T> ObservableStore<T>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned,
{
    /// Hydrate from storage under `key`, substituting `default` on absence
    /// or parse failure
    pub fn new(key: impl Into<String>, backend: Arc<dyn StorageBackend>, default: T) -> Self {
        let key = key.into();
        let value = match backend.load(&key) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    debug!(key, error = %err, "discarding corrupt persisted state");
                    default
                }
            },
            None => default,
        };
        Self {
            key,
            backend,
            inner: Mutex::new(Inner {
                value,
                subscribers: Vec::new(),
                next_id: 0,
            }),
        }
    }

    /// Clone of the current value
    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Register a callback invoked after every mutation with the new value
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + 'static) -> SubscriptionId {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, Box::new(callback)));
        SubscriptionId(id)
    }

    /// Remove a previously registered callback; unknown ids are ignored
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().subscribers.retain(|(sub_id, _)| *sub_id != id.0);
    }

    /// Apply a mutation: compute the next value, persist, replace, notify.
    /// An unchanged value skips all three steps.
    pub fn update(&self, mutate: impl FnOnce(&T) -> T) {
        let mut inner = self.lock();
        let next = mutate(&inner.value);
        if next == inner.value {
            return;
        }

        match serde_json::to_string(&next) {
            Ok(serialized) => {
                if let Err(err) = self.backend.save(&self.key, &serialized) {
                    warn!(key = %self.key, error = %err, "failed to persist store state");
                }
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to serialize store state");
            }
        }

        inner.value = next;
        for (_, subscriber) in &inner.subscribers {
            subscriber(&inner.value);
        }
    }

    /// Replace the value wholesale
    pub fn set(&self, value: T) {
        self.update(|_| value);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        // A poisoned lock would mean a subscriber panicked; recover the data.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store_over(backend: Arc<dyn StorageBackend>) -> ObservableStore<Vec<u32>> {
        ObservableStore::new("test_numbers", backend, Vec::new())
    }

    #[test]
    fn test_hydrates_default_when_absent() {
        let store = store_over(Arc::new(MemoryBackend::new()));
        assert!(store.get().is_empty());
    }

    #[test]
    fn test_hydrates_default_on_corrupt_state() {
        let backend = Arc::new(MemoryBackend::new());
        backend.save("test_numbers", "{not json!").unwrap();
        let store = store_over(backend);
        assert!(store.get().is_empty());
    }

    #[test]
    fn test_update_persists_before_notifying() {
        let backend = Arc::new(MemoryBackend::new());
        let store = Arc::new(store_over(backend.clone()));

        let observed = Arc::new(Mutex::new(Vec::new()));
        let observed_clone = observed.clone();
        let backend_probe = backend.clone();
        store.subscribe(move |value: &Vec<u32>| {
            // The persisted copy must already match what subscribers see.
            let persisted = backend_probe.load("test_numbers").unwrap();
            let persisted: Vec<u32> = serde_json::from_str(&persisted).unwrap();
            assert_eq!(&persisted, value);
            observed_clone.lock().unwrap().push(value.clone());
        });

        store.update(|v| {
            let mut next = v.clone();
            next.push(42);
            next
        });

        assert_eq!(observed.lock().unwrap().as_slice(), &[vec![42]]);
    }

    #[test]
    fn test_unchanged_update_skips_persist_and_notify() {
        let backend = Arc::new(MemoryBackend::new());
        let store = store_over(backend.clone());
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.update(Clone::clone);

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(backend.load("test_numbers").is_none());
    }

    #[test]
    fn test_all_subscribers_notified() {
        let store = store_over(Arc::new(MemoryBackend::new()));
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let count = count.clone();
            store.subscribe(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        store.set(vec![1]);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = store_over(Arc::new(MemoryBackend::new()));
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let id = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        store.set(vec![1]);
        store.unsubscribe(id);
        store.set(vec![2]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_persisted_value_visible_to_new_store_instance() {
        let backend = Arc::new(MemoryBackend::new());
        let first = store_over(backend.clone());
        first.set(vec![9, 8, 7]);
        drop(first);
        let second = store_over(backend);
        assert_eq!(second.get(), vec![9, 8, 7]);
    }
}

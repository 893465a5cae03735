#![cfg(feature = "web")]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::sequence::SequencedDataset;

struct CachedUpload {
    dataset: Arc<SequencedDataset>,
    stored_at: Instant,
}

/// Recently processed uploads, kept so the dashboard can offer downloads
///
/// Each upload gets a random id. Entries expire after `ttl` and the cache
/// never holds more than `capacity` uploads; the oldest goes first.
pub struct ExportCache {
    entries: Mutex<HashMap<Uuid, CachedUpload>>,
    ttl: Duration,
    capacity: usize,
}

impl ExportCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        ExportCache {
            entries: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Store a sequenced upload and return the id to fetch it with
    pub fn insert(&self, dataset: Arc<SequencedDataset>) -> Uuid {
        let now = Instant::now();
        let mut entries = self.lock();

        let ttl = self.ttl;
        entries.retain(|_, entry| now.duration_since(entry.stored_at) < ttl);
        while entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => entries.remove(&id),
                None => break,
            };
        }

        let id = Uuid::new_v4();
        entries.insert(
            id,
            CachedUpload {
                dataset,
                stored_at: now,
            },
        );
        id
    }

    /// The upload stored under `id`, unless it has expired or been evicted
    pub fn get(&self, id: &Uuid) -> Option<Arc<SequencedDataset>> {
        let entries = self.lock();
        entries
            .get(id)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.dataset))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, CachedUpload>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

//! In-memory item graph adapters

use ahash::AHashMap;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::domain::{Item, SourceGraphReader, TargetGraphSink};
use crate::error::{Result, StorageError};

/// In-memory source graph
///
/// Identifiers keep their first-insertion order so `item_ids` is stable for a
/// given load sequence.
#[derive(Debug, Default, Clone)]
pub struct MemoryItemStore {
    items: AHashMap<String, Arc<Item>>,
    order: Vec<String>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from items; a repeated identifier replaces the earlier item
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let mut store = Self::new();
        for item in items {
            store.insert(item);
        }
        store
    }

    /// Insert an item, returning the item it replaced
    pub fn insert(&mut self, item: Item) -> Option<Arc<Item>> {
        let id = item.identifier.clone();
        let previous = self.items.insert(id.clone(), Arc::new(item));
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Item>> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Item>> {
        self.order.iter().filter_map(|id| self.items.get(id))
    }
}

impl SourceGraphReader for MemoryItemStore {
    fn get_item_by_id(&self, id: &str) -> Result<Option<Arc<Item>>> {
        Ok(self.items.get(id).cloned())
    }

    fn item_ids(&self) -> Result<Vec<String>> {
        Ok(self.order.clone())
    }

    fn item_count(&self) -> Result<usize> {
        Ok(self.items.len())
    }
}

#[derive(Debug, Default)]
struct SinkState {
    items: Vec<Item>,
    batches: Vec<usize>,
    closed: bool,
}

/// Collecting sink
///
/// Cloning yields another handle to the same buffer, so a test can keep one
/// handle while a writer owns the other.
#[derive(Debug, Default, Clone)]
pub struct MemoryItemSink {
    state: Arc<Mutex<SinkState>>,
}

impl MemoryItemSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored item, in store order
    pub fn items(&self) -> Vec<Item> {
        self.state.lock().items.clone()
    }

    /// Stored items sorted by identifier
    pub fn sorted_items(&self) -> Vec<Item> {
        let mut items = self.items();
        items.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        items
    }

    /// Size of each `store_all` batch received (a single `store` counts as 1)
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.state.lock().batches.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Turn the collected items into a readable store
    pub fn to_store(&self) -> MemoryItemStore {
        MemoryItemStore::from_items(self.items())
    }
}

impl TargetGraphSink for MemoryItemSink {
    fn store(&mut self, item: Item) -> Result<()> {
        self.store_all(vec![item])
    }

    fn store_all(&mut self, items: Vec<Item>) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(StorageError::writer_closed("store on a closed memory sink"));
        }
        state.batches.push(items.len());
        state.items.extend(items);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.state.lock().closed = true;
        Ok(())
    }
}

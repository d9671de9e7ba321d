//! ItemGraph Store - item model and storage ports for graph translation
//!
//! > "Source items are read many times by identifier; target items are written once."
//!
//! ## Core Principles
//!
//! 1. **Immutable sources**: source items are shared as `Arc<Item>` and never mutated
//! 2. **Identity**: an item identifier is unique within its graph
//! 3. **Sticky failures**: a sink that failed keeps failing until the caller gives up
//!
//! ## Layout
//!
//! - `domain`: `Item` plus the `SourceGraphReader` / `TargetGraphSink` ports
//! - `error`: `StorageError` with an `ErrorKind`
//! - `infrastructure`: in-memory store, buffered background writer,
//!   JSON-lines files and the SQLite adapter
//!
//! ## Usage
//!
//! ```rust,ignore
//! use itemgraph_store::{BufferedItemWriter, Item, MemoryItemSink, TargetGraphSink};
//!
//! let sink = MemoryItemSink::new();
//! let mut writer = BufferedItemWriter::new(sink.clone());
//!
//! writer.store(Item::new("1_1", "http://example.org/model#Gene"))?;
//! writer.close()?;
//!
//! assert_eq!(sink.items().len(), 1);
//! ```

pub mod domain;
pub mod error;
pub mod infrastructure;

pub use error::{ErrorKind, Result, StorageError};

pub use domain::{Item, SourceGraphReader, TargetGraphSink};
pub use infrastructure::{
    read_items_jsonl, BatchConfig, BufferedItemWriter, JsonlItemWriter, MemoryItemSink,
    MemoryItemStore,
};

#[cfg(feature = "sqlite")]
pub use infrastructure::SqliteItemStore;

//! Infrastructure layer - storage adapters
//!
//! - `memory`: in-memory reader and sink, used by tests and small runs
//! - `buffered`: background batching writer wrapping any sink
//! - `jsonl`: one JSON item per line
//! - `sqlite`: SQLite reader + sink (feature `sqlite`)

pub mod buffered;
pub mod jsonl;
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use buffered::{BatchConfig, BufferedItemWriter};
pub use jsonl::{read_items_jsonl, JsonlItemWriter};
pub use memory::{MemoryItemSink, MemoryItemStore};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteItemStore;

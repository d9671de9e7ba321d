//! JSON-lines item files
//!
//! One serialized [`Item`] per line. Blank lines are skipped on read.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::{Item, TargetGraphSink};
use crate::error::{Result, StorageError};
use crate::infrastructure::memory::MemoryItemStore;

/// Load a JSON-lines file into an in-memory source graph
pub fn read_items_jsonl(path: impl AsRef<Path>) -> Result<MemoryItemStore> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut store = MemoryItemStore::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let item: Item = serde_json::from_str(&line).map_err(|e| {
            StorageError::serialization(format!(
                "{}:{}: invalid item: {}",
                path.display(),
                line_no + 1,
                e
            ))
            .with_source(e)
        })?;
        if store.insert(item).is_some() {
            tracing::warn!(line = line_no + 1, "Duplicate item identifier, later line wins");
        }
    }

    tracing::debug!(path = %path.display(), items = store.len(), "Loaded items");
    Ok(store)
}

/// Sink writing one item per line
pub struct JsonlItemWriter {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    written: usize,
}

impl JsonlItemWriter {
    /// Create (or truncate) the output file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Items written so far
    pub fn written(&self) -> usize {
        self.written
    }
}

impl TargetGraphSink for JsonlItemWriter {
    fn store(&mut self, item: Item) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| StorageError::writer_closed("store on a closed JSON-lines writer"))?;
        serde_json::to_writer(&mut *writer, &item)?;
        writeln!(writer)?;
        self.written += 1;
        Ok(())
    }

    fn store_all(&mut self, items: Vec<Item>) -> Result<()> {
        for item in items {
            self.store(item)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

//! SQLite item store
//!
//! Serves as both a source graph (random access by identifier) and a target
//! sink. Every `store_all` call is one transaction.
//!
//! Schema:
//! - `items`: identifier, class name, implementations
//! - `attributes`: one row per attribute
//! - `item_references`: one row per single-valued reference
//! - `collections`: one row per reference-list entry, with its position

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use std::sync::Arc;

use crate::domain::{Item, SourceGraphReader, TargetGraphSink};
use crate::error::{Result, StorageError};

pub struct SqliteItemStore {
    conn: Mutex<Connection>,
    closed: bool,
}

impl SqliteItemStore {
    /// Open (or create) a database file
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(db_path)?)
    }

    /// Create an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
            closed: false,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS items (
                identifier TEXT PRIMARY KEY,
                class_name TEXT NOT NULL,
                implementations TEXT
            );
            CREATE TABLE IF NOT EXISTS attributes (
                item_id TEXT NOT NULL,
                name TEXT NOT NULL,
                value TEXT NOT NULL,
                PRIMARY KEY (item_id, name)
            );
            CREATE TABLE IF NOT EXISTS item_references (
                item_id TEXT NOT NULL,
                name TEXT NOT NULL,
                ref_id TEXT NOT NULL,
                PRIMARY KEY (item_id, name)
            );
            CREATE TABLE IF NOT EXISTS collections (
                item_id TEXT NOT NULL,
                name TEXT NOT NULL,
                position INTEGER NOT NULL,
                ref_id TEXT NOT NULL,
                PRIMARY KEY (item_id, name, position)
            );
            CREATE INDEX IF NOT EXISTS idx_items_class ON items(class_name);",
        )?;
        Ok(())
    }

    /// Number of stored items of a class
    pub fn count_class(&self, class_name: &str) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM items WHERE class_name = ?1",
            params![class_name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn write_item(tx: &Transaction<'_>, item: &Item) -> Result<()> {
        for table in ["attributes", "item_references", "collections"] {
            tx.execute(
                &format!("DELETE FROM {} WHERE item_id = ?1", table),
                params![&item.identifier],
            )?;
        }

        tx.execute(
            "INSERT OR REPLACE INTO items (identifier, class_name, implementations)
             VALUES (?1, ?2, ?3)",
            params![&item.identifier, &item.class_name, &item.implementations],
        )?;

        for (name, value) in &item.attributes {
            tx.execute(
                "INSERT INTO attributes (item_id, name, value) VALUES (?1, ?2, ?3)",
                params![&item.identifier, name, value],
            )?;
        }
        for (name, ref_id) in &item.references {
            tx.execute(
                "INSERT INTO item_references (item_id, name, ref_id) VALUES (?1, ?2, ?3)",
                params![&item.identifier, name, ref_id],
            )?;
        }
        for (name, ref_ids) in &item.collections {
            for (position, ref_id) in ref_ids.iter().enumerate() {
                tx.execute(
                    "INSERT INTO collections (item_id, name, position, ref_id)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![&item.identifier, name, position as i64, ref_id],
                )?;
            }
        }
        Ok(())
    }

    fn read_item(conn: &Connection, id: &str) -> Result<Option<Item>> {
        let head = conn
            .query_row(
                "SELECT class_name, implementations FROM items WHERE identifier = ?1",
                params![id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?)),
            )
            .optional()?;

        let Some((class_name, implementations)) = head else {
            return Ok(None);
        };

        let mut item = Item::new(id, class_name);
        item.implementations = implementations;

        let mut stmt = conn.prepare("SELECT name, value FROM attributes WHERE item_id = ?1")?;
        let attributes = stmt
            .query_map(params![id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
        item.attributes.extend(attributes);

        let mut stmt =
            conn.prepare("SELECT name, ref_id FROM item_references WHERE item_id = ?1")?;
        let references = stmt
            .query_map(params![id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
        item.references.extend(references);

        let mut stmt = conn.prepare(
            "SELECT name, ref_id FROM collections WHERE item_id = ?1 ORDER BY name, position",
        )?;
        let entries = stmt
            .query_map(params![id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
        for (name, ref_id) in entries {
            item.collections.entry(name).or_default().push(ref_id);
        }

        Ok(Some(item))
    }
}

impl SourceGraphReader for SqliteItemStore {
    fn get_item_by_id(&self, id: &str) -> Result<Option<Arc<Item>>> {
        let conn = self.conn.lock();
        Ok(Self::read_item(&conn, id)?.map(Arc::new))
    }

    fn item_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT identifier FROM items ORDER BY rowid")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }

    fn item_count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl TargetGraphSink for SqliteItemStore {
    fn store(&mut self, item: Item) -> Result<()> {
        self.store_all(vec![item])
    }

    fn store_all(&mut self, items: Vec<Item>) -> Result<()> {
        if self.closed {
            return Err(StorageError::writer_closed("store on a closed SQLite store"));
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        for item in &items {
            Self::write_item(&tx, item)?;
        }
        tx.commit()?;

        tracing::debug!(count = items.len(), "Stored items in SQLite");
        Ok(())
    }

    /// Further stores are rejected; the store stays readable
    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

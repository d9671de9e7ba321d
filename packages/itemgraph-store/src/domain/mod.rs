//! Domain layer for item graphs
//!
//! # Domain Models
//!
//! - `Item`: a typed node with attributes, references and reference lists
//!
//! # Port Traits
//!
//! - `SourceGraphReader`: random-access, read-only lookup of source items
//! - `TargetGraphSink`: destination for finished target items
//!
//! # Examples
//!
//! ```rust
//! use itemgraph_store::domain::Item;
//!
//! let mut item = Item::new("0_1", "http://www.flymine.org/model/mage#Reporter");
//! item.add_attribute("name", "R1");
//! item.add_collection("featureReporterMaps", vec!["0_2".to_string()]);
//!
//! assert_eq!(item.fragment(), "Reporter");
//! assert_eq!(item.attribute("name"), Some("R1"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::Result;

// ═══════════════════════════════════════════════════════════════════════════
// Domain Models
// ═══════════════════════════════════════════════════════════════════════════

/// Typed, attributed node of a source or target graph
///
/// Class names are qualified URIs of the form `namespace#Fragment`. All maps are
/// ordered so equality and serialized output do not depend on insertion order.
/// Reference lists keep their order and duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Globally unique identifier
    pub identifier: String,
    /// Qualified class name
    pub class_name: String,
    /// Optional implemented interfaces (space separated class names)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementations: Option<String>,
    /// Attribute name → value
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Reference name → referenced identifier
    #[serde(default)]
    pub references: BTreeMap<String, String>,
    /// Reference-list name → referenced identifiers
    #[serde(default)]
    pub collections: BTreeMap<String, Vec<String>>,
}

impl Item {
    /// Create an item without fields
    pub fn new(identifier: impl Into<String>, class_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            class_name: class_name.into(),
            implementations: None,
            attributes: BTreeMap::new(),
            references: BTreeMap::new(),
            collections: BTreeMap::new(),
        }
    }

    /// Namespace part of the class name, including the trailing `#`
    ///
    /// Returns an empty string for unqualified class names.
    pub fn namespace(&self) -> &str {
        match self.class_name.rfind('#') {
            Some(pos) => &self.class_name[..=pos],
            None => "",
        }
    }

    /// Unqualified class name
    pub fn fragment(&self) -> &str {
        match self.class_name.rfind('#') {
            Some(pos) => &self.class_name[pos + 1..],
            None => &self.class_name,
        }
    }

    pub fn set_class_name(&mut self, class_name: impl Into<String>) {
        self.class_name = class_name.into();
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Attributes
    // ═══════════════════════════════════════════════════════════════════════

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Set an attribute, replacing any previous value
    pub fn add_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // References
    // ═══════════════════════════════════════════════════════════════════════

    pub fn reference(&self, name: &str) -> Option<&str> {
        self.references.get(name).map(String::as_str)
    }

    pub fn has_reference(&self, name: &str) -> bool {
        self.references.contains_key(name)
    }

    pub fn add_reference(&mut self, name: impl Into<String>, ref_id: impl Into<String>) {
        self.references.insert(name.into(), ref_id.into());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Reference lists
    // ═══════════════════════════════════════════════════════════════════════

    pub fn collection(&self, name: &str) -> Option<&[String]> {
        self.collections.get(name).map(Vec::as_slice)
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Set a reference list, replacing any previous list of the same name
    pub fn add_collection(&mut self, name: impl Into<String>, ref_ids: Vec<String>) {
        self.collections.insert(name.into(), ref_ids);
    }

    pub fn remove_collection(&mut self, name: &str) -> Option<Vec<String>> {
        self.collections.remove(name)
    }

    /// Rough payload size used for batch accounting
    ///
    /// 100 per item, value length + 50 per attribute, joined id length + 50 per
    /// reference list and 50 per reference.
    pub fn estimated_size(&self) -> usize {
        let attributes: usize = self.attributes.values().map(|v| v.len() + 50).sum();
        let collections: usize = self
            .collections
            .values()
            .map(|ids| {
                let joined = ids.iter().map(String::len).sum::<usize>()
                    + ids.len().saturating_sub(1);
                joined + 50
            })
            .sum();
        100 + attributes + collections + self.references.len() * 50
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Port Traits
// ═══════════════════════════════════════════════════════════════════════════

/// Read-only, random-access view of the source graph
///
/// Lookups may be served concurrently from many worker threads.
pub trait SourceGraphReader: Send + Sync {
    /// Get an item by identifier
    ///
    /// Returns `Ok(None)` for a dangling identifier.
    fn get_item_by_id(&self, id: &str) -> Result<Option<Arc<Item>>>;

    /// Identifiers of every item in the graph
    ///
    /// Iteration order is unspecified; callers must not rely on it.
    fn item_ids(&self) -> Result<Vec<String>>;

    /// Number of items in the graph
    fn item_count(&self) -> Result<usize> {
        Ok(self.item_ids()?.len())
    }
}

/// Destination for finished target items
///
/// Implementations may defer the actual write. A failure that happened
/// asynchronously is reported by the next call, and `close` must fail if any
/// earlier store failed without being reported.
pub trait TargetGraphSink: Send {
    /// Store a single item
    fn store(&mut self, item: Item) -> Result<()>;

    /// Store a batch of items
    fn store_all(&mut self, items: Vec<Item>) -> Result<()>;

    /// Flush and commit everything stored so far
    fn close(&mut self) -> Result<()>;
}

impl<S: TargetGraphSink + ?Sized> TargetGraphSink for Box<S> {
    fn store(&mut self, item: Item) -> Result<()> {
        (**self).store(item)
    }

    fn store_all(&mut self, items: Vec<Item>) -> Result<()> {
        (**self).store_all(items)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════

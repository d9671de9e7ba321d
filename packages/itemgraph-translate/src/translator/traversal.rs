//! Source graph navigation for rules
//!
//! Absent or dangling optional links are recorded as diagnostics and skipped.
//! Singleton fields are checked against the number of entries that actually
//! resolve.

use itemgraph_store::Item;
use std::sync::Arc;

use super::context::RuleContext;
use crate::errors::{Result, TranslateError};

impl<'a> RuleContext<'a> {
    /// Look up a source item by identifier
    pub fn lookup(&self, id: &str) -> Result<Option<Arc<Item>>> {
        Ok(self.reader.get_item_by_id(id)?)
    }

    /// Follow a single-valued reference of `from`
    pub fn follow(&mut self, from: &Item, reference: &str) -> Result<Option<Arc<Item>>> {
        let Some(ref_id) = from.reference(reference) else {
            self.note_missing(&from.identifier, reference);
            return Ok(None);
        };
        let found = self.lookup(ref_id)?;
        if found.is_none() {
            self.note_missing(&from.identifier, reference);
        }
        Ok(found)
    }

    /// Follow a reference that must resolve when present
    ///
    /// An absent reference is `Ok(None)`; a dangling one is fatal.
    pub fn follow_required(&self, from: &Item, reference: &str) -> Result<Option<Arc<Item>>> {
        let Some(ref_id) = from.reference(reference) else {
            return Ok(None);
        };
        self.lookup(ref_id)?
            .map(Some)
            .ok_or_else(|| TranslateError::missing_item(&from.identifier, reference, ref_id))
    }

    /// Resolve every entry of a reference list, skipping dangling ones
    ///
    /// An absent list yields nothing and is not recorded.
    pub fn follow_all(&mut self, from: &Item, collection: &str) -> Result<Vec<Arc<Item>>> {
        let Some(ref_ids) = from.collection(collection) else {
            return Ok(Vec::new());
        };
        let mut found = Vec::with_capacity(ref_ids.len());
        for ref_id in ref_ids {
            match self.lookup(ref_id)? {
                Some(item) => found.push(item),
                None => self.note_missing(&from.identifier, collection),
            }
        }
        Ok(found)
    }

    /// The single item a reference list must resolve to
    pub fn singleton(&self, from: &Item, collection: &str) -> Result<Arc<Item>> {
        let ref_ids = from.collection(collection).unwrap_or_default();
        let mut resolved = Vec::with_capacity(1);
        for ref_id in ref_ids {
            if let Some(item) = self.lookup(ref_id)? {
                resolved.push(item);
            }
        }
        if resolved.len() != 1 {
            return Err(TranslateError::singleton(
                &from.identifier,
                collection,
                resolved.len(),
            ));
        }
        Ok(resolved.remove(0))
    }

    /// Like [`singleton`](Self::singleton), but an absent list is allowed
    pub fn optional_singleton(&self, from: &Item, collection: &str) -> Result<Option<Arc<Item>>> {
        if !from.has_collection(collection) {
            return Ok(None);
        }
        self.singleton(from, collection).map(Some)
    }

    /// Attribute of `from`, recorded when absent
    pub fn attribute_of(&mut self, from: &Item, name: &str) -> Option<String> {
        let value = from.attribute(name).map(str::to_string);
        if value.is_none() {
            self.note_missing(&from.identifier, name);
        }
        value
    }

    /// `value` attribute of a controlled-vocabulary item behind `reference`
    pub fn vocabulary_value(&mut self, from: &Item, reference: &str) -> Result<Option<String>> {
        let Some(term) = self.follow(from, reference)? else {
            return Ok(None);
        };
        Ok(self.attribute_of(&term, "value"))
    }
}

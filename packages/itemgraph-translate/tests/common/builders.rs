//! Test data builders

use itemgraph_store::{Item, MemoryItemStore};

use super::MAGE_NS;

/// Builder for source items in the MAGE namespace
#[derive(Debug)]
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    pub fn mage(id: &str, fragment: &str) -> Self {
        Self {
            item: Item::new(id, format!("{}{}", MAGE_NS, fragment)),
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.item.add_attribute(name, value);
        self
    }

    pub fn reference(mut self, name: &str, ref_id: &str) -> Self {
        self.item.add_reference(name, ref_id);
        self
    }

    pub fn collection(mut self, name: &str, ref_ids: &[&str]) -> Self {
        self.item
            .add_collection(name, ref_ids.iter().map(|id| id.to_string()).collect());
        self
    }

    pub fn build(self) -> Item {
        self.item
    }
}

/// Builder for a source graph
#[derive(Debug, Default)]
pub struct GraphBuilder {
    items: Vec<Item>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, item: ItemBuilder) -> Self {
        self.items.push(item.build());
        self
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.items.extend(items);
        self
    }

    /// Replace the item with the same identifier, or add it
    pub fn replace(mut self, item: ItemBuilder) -> Self {
        let item = item.build();
        self.items.retain(|i| i.identifier != item.identifier);
        self.items.push(item);
        self
    }

    /// Drop the item with the given identifier
    pub fn without(mut self, id: &str) -> Self {
        self.items.retain(|i| i.identifier != id);
        self
    }

    /// Ontology term carrying a controlled-vocabulary `value`
    pub fn term(self, id: &str, value: &str) -> Self {
        self.with(ItemBuilder::mage(id, "OntologyEntry").attr("value", value))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn build(self) -> MemoryItemStore {
        MemoryItemStore::from_items(self.items)
    }
}

//! Working state of one rule application

use itemgraph_store::{Item, SourceGraphReader};

use super::{DeferredKind, Translation};
use crate::errors::Diagnostic;
use crate::index::CrossReferenceIndex;

/// Everything a rule may read or produce while translating one item
pub struct RuleContext<'a> {
    /// Source item being translated
    pub src: &'a Item,
    pub source_ns: &'a str,
    pub target_ns: &'a str,
    pub index: &'a CrossReferenceIndex,
    pub(super) reader: &'a dyn SourceGraphReader,
    companions: Vec<Item>,
    deferred_companions: Vec<(DeferredKind, Item)>,
    defer_target: Option<DeferredKind>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        src: &'a Item,
        source_ns: &'a str,
        target_ns: &'a str,
        reader: &'a dyn SourceGraphReader,
        index: &'a CrossReferenceIndex,
    ) -> Self {
        Self {
            src,
            source_ns,
            target_ns,
            index,
            reader,
            companions: Vec::new(),
            deferred_companions: Vec::new(),
            defer_target: None,
            diagnostics: Vec::new(),
        }
    }

    /// New target-model item of class `fragment`
    pub fn create_item(&self, identifier: impl Into<String>, fragment: &str) -> Item {
        Item::new(identifier, format!("{}{}", self.target_ns, fragment))
    }

    /// Full target class name for `fragment`
    pub fn target_class(&self, fragment: &str) -> String {
        format!("{}{}", self.target_ns, fragment)
    }

    /// Emit a finished companion item
    pub fn emit(&mut self, item: Item) {
        self.companions.push(item);
    }

    /// Hold a companion item for phase 2
    pub fn defer(&mut self, kind: DeferredKind, item: Item) {
        self.deferred_companions.push((kind, item));
    }

    /// Hold the main target item for phase 2
    pub fn defer_target(&mut self, kind: DeferredKind) {
        self.defer_target = Some(kind);
    }

    /// Record an absent optional field
    pub fn note_missing(&mut self, item_id: &str, field: &str) {
        self.diagnostics.push(Diagnostic::missing(item_id, field));
    }

    pub(super) fn finish(self, tgt: Item) -> Translation {
        let mut items = Vec::with_capacity(self.companions.len() + 1);
        let mut deferred = Vec::with_capacity(self.deferred_companions.len() + 1);

        match self.defer_target {
            Some(kind) => deferred.push((kind, tgt)),
            None => items.push(tgt),
        }
        items.extend(self.companions);
        deferred.extend(self.deferred_companions);

        Translation {
            items,
            deferred,
            diagnostics: self.diagnostics,
        }
    }
}

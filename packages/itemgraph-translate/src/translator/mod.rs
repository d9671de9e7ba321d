//! Per-item translation
//!
//! Every source item goes through the generic [`ClassMapping`] first. The
//! class-specific rule selected by [`SourceClass`] then augments the mapped
//! target item: it follows references into the source graph, flattens what it
//! finds onto the target, creates companion items and registers facts that
//! only phase 2 can join.

mod context;
mod traversal;

pub mod rules;

use itemgraph_store::{Item, SourceGraphReader};
use serde::Serialize;

use crate::errors::{Diagnostic, Result};
use crate::index::CrossReferenceIndex;
use crate::mapping::ClassMapping;

pub use context::RuleContext;

/// Source classes with a dedicated rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceClass {
    BibliographicReference,
    FeatureReporterMap,
    PhysicalArrayDesign,
    Experiment,
    DerivedBioAssay,
    BioAssayDatum,
    DatabaseEntry,
    Reporter,
    BioSequence,
    LabeledExtract,
    BioSource,
    Treatment,
    /// Generic mapping only
    Other,
}

impl SourceClass {
    pub fn from_fragment(fragment: &str) -> Self {
        match fragment {
            "BibliographicReference" => SourceClass::BibliographicReference,
            "FeatureReporterMap" => SourceClass::FeatureReporterMap,
            "PhysicalArrayDesign" => SourceClass::PhysicalArrayDesign,
            "Experiment" => SourceClass::Experiment,
            "DerivedBioAssay" => SourceClass::DerivedBioAssay,
            "BioAssayDatum" => SourceClass::BioAssayDatum,
            "DatabaseEntry" => SourceClass::DatabaseEntry,
            "Reporter" => SourceClass::Reporter,
            "BioSequence" => SourceClass::BioSequence,
            "LabeledExtract" => SourceClass::LabeledExtract,
            "BioSource" => SourceClass::BioSource,
            "Treatment" => SourceClass::Treatment,
            _ => SourceClass::Other,
        }
    }

    /// Classify an item; classes outside `source_ns` are always `Other`
    pub fn of(item: &Item, source_ns: &str) -> Self {
        if item.namespace() != source_ns {
            return SourceClass::Other;
        }
        Self::from_fragment(item.fragment())
    }
}

/// Target items held back until phase 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferredKind {
    /// Waits for the design of its feature
    ReporterLocation,
    /// Waits for the results measured on its features
    BioEntity,
    /// Waits for the results of its originating bio entity
    Gene,
    /// Waits for the treatments registered by labeled extracts
    Sample,
}

/// Output of one source item
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    /// Finished items, ready for the sink
    pub items: Vec<Item>,
    /// Items completed in phase 2
    pub deferred: Vec<(DeferredKind, Item)>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Translation {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.deferred.is_empty()
    }

    /// Every produced item, finished or deferred
    pub fn all_items(&self) -> impl Iterator<Item = &Item> {
        self.items
            .iter()
            .chain(self.deferred.iter().map(|(_, item)| item))
    }
}

/// Translates single source items
pub struct ItemTranslator<'a> {
    reader: &'a dyn SourceGraphReader,
    mapping: &'a dyn ClassMapping,
    target_ns: String,
}

impl<'a> ItemTranslator<'a> {
    pub fn new(
        reader: &'a dyn SourceGraphReader,
        mapping: &'a dyn ClassMapping,
        target_ns: impl Into<String>,
    ) -> Self {
        Self {
            reader,
            mapping,
            target_ns: target_ns.into(),
        }
    }

    pub fn target_namespace(&self) -> &str {
        &self.target_ns
    }

    /// Translate `item`, registering deferred facts into `index`
    pub fn translate(&self, item: &Item, index: &CrossReferenceIndex) -> Result<Translation> {
        let source_ns = self.mapping.source_namespace();
        let class = SourceClass::of(item, source_ns);

        // `normalised` is not a model field; the datum rule re-adds it
        let mapped = if class == SourceClass::BioAssayDatum && item.has_attribute("normalised") {
            let mut stripped = item.clone();
            stripped.remove_attribute("normalised");
            self.mapping.translate(&stripped, &self.target_ns)
        } else {
            self.mapping.translate(item, &self.target_ns)
        };

        let Some(mut tgt) = mapped else {
            return Ok(Translation::default());
        };

        let mut ctx = RuleContext::new(item, source_ns, &self.target_ns, self.reader, index);

        match class {
            SourceClass::BibliographicReference => rules::publication::authors(&mut ctx, &mut tgt)?,
            SourceClass::FeatureReporterMap => {
                rules::array_design::reporter_location(&mut ctx, &mut tgt)?
            }
            SourceClass::PhysicalArrayDesign => {
                rules::array_design::slide_design(&mut ctx, &mut tgt)?
            }
            SourceClass::Experiment => rules::experiment::experiment(&mut ctx, &mut tgt)?,
            SourceClass::DerivedBioAssay => rules::experiment::assay(&mut ctx, &mut tgt)?,
            SourceClass::BioAssayDatum => {
                rules::experiment::experimental_result(&mut ctx, &mut tgt)?
            }
            SourceClass::DatabaseEntry => rules::bio_sequence::database_entry(&mut ctx, &mut tgt),
            SourceClass::Reporter => rules::array_design::reporter(&mut ctx, &mut tgt)?,
            SourceClass::BioSequence => rules::bio_sequence::bio_entity(&mut ctx, &mut tgt)?,
            SourceClass::LabeledExtract => {
                rules::bio_material::labeled_extract(&mut ctx, &mut tgt)?
            }
            SourceClass::BioSource => rules::bio_material::sample(&mut ctx, &mut tgt)?,
            SourceClass::Treatment => rules::bio_material::treatment(&mut ctx, &mut tgt)?,
            SourceClass::Other => {}
        }

        Ok(ctx.finish(tgt))
    }
}

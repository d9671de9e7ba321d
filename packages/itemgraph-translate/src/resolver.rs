//! Phase 2: deferred joins
//!
//! Items held back in phase 1 are completed from the [`FrozenIndex`]. The four
//! sub-resolutions read disjoint queues and never write to the index, so they
//! run concurrently and can be repeated with identical output.

use ahash::AHashMap;
use itemgraph_store::Item;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::index::FrozenIndex;
use crate::translator::DeferredKind;

/// Collection linking bio entities and genes to their measurements
pub const RESULTS_COLLECTION: &str = "microArrayExperimentalResults";

/// Target items waiting for phase 2, one queue per [`DeferredKind`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeferredQueues {
    pub reporter_locations: Vec<Item>,
    pub bio_entities: Vec<Item>,
    pub genes: Vec<Item>,
    pub samples: Vec<Item>,
}

impl DeferredQueues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DeferredKind, item: Item) {
        self.queue_mut(kind).push(item);
    }

    pub fn extend(&mut self, deferred: impl IntoIterator<Item = (DeferredKind, Item)>) {
        for (kind, item) in deferred {
            self.push(kind, item);
        }
    }

    fn queue_mut(&mut self, kind: DeferredKind) -> &mut Vec<Item> {
        match kind {
            DeferredKind::ReporterLocation => &mut self.reporter_locations,
            DeferredKind::BioEntity => &mut self.bio_entities,
            DeferredKind::Gene => &mut self.genes,
            DeferredKind::Sample => &mut self.samples,
        }
    }

    pub fn len(&self) -> usize {
        self.reporter_locations.len() + self.bio_entities.len() + self.genes.len() + self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn counts(&self) -> DeferredCounts {
        DeferredCounts {
            reporter_locations: self.reporter_locations.len(),
            bio_entities: self.bio_entities.len(),
            genes: self.genes.len(),
            samples: self.samples.len(),
        }
    }
}

/// Queue sizes at the phase barrier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeferredCounts {
    pub reporter_locations: usize,
    pub bio_entities: usize,
    pub genes: usize,
    pub samples: usize,
}

type ResultsByFeature<'i> = AHashMap<&'i str, BTreeSet<&'i str>>;

/// Completes deferred items from a frozen index
pub struct DeferredJoinResolver<'a> {
    index: &'a FrozenIndex,
}

impl<'a> DeferredJoinResolver<'a> {
    pub fn new(index: &'a FrozenIndex) -> Self {
        Self { index }
    }

    /// Resolve every queue (PARALLEL)
    ///
    /// Queued items are cloned, never consumed. Output is sorted by identifier.
    pub fn resolve(&self, queues: &DeferredQueues) -> Vec<Item> {
        let results = self.index.results_by_feature();

        let ((locations, bio_entities), (genes, samples)) = rayon::join(
            || {
                rayon::join(
                    || self.resolve_locations(&queues.reporter_locations),
                    || self.resolve_bio_entities(&queues.bio_entities, &results),
                )
            },
            || {
                rayon::join(
                    || self.resolve_genes(&queues.genes, &results),
                    || self.resolve_samples(&queues.samples),
                )
            },
        );

        debug!(
            locations = locations.len(),
            bio_entities = bio_entities.len(),
            genes = genes.len(),
            samples = samples.len(),
            "Resolved deferred items"
        );

        let mut out = Vec::with_capacity(queues.len());
        out.extend(locations);
        out.extend(bio_entities);
        out.extend(genes);
        out.extend(samples);
        out.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        out
    }

    /// location → feature → design
    fn resolve_locations(&self, queue: &[Item]) -> Vec<Item> {
        queue
            .par_iter()
            .map(|location| {
                let mut item = location.clone();
                if let Some(design) = self.index.design_of_location(&location.identifier) {
                    item.add_reference("design", design);
                }
                item
            })
            .collect()
    }

    /// bio entity → features → results
    fn resolve_bio_entities(&self, queue: &[Item], results: &ResultsByFeature<'_>) -> Vec<Item> {
        queue
            .par_iter()
            .map(|entity| {
                let mut item = entity.clone();
                if let Some(features) = self.index.features_of_bio_entity(&entity.identifier) {
                    item.add_collection(RESULTS_COLLECTION, results_of(features, results));
                }
                item
            })
            .collect()
    }

    /// gene → bio entity → features → results
    fn resolve_genes(&self, queue: &[Item], results: &ResultsByFeature<'_>) -> Vec<Item> {
        queue
            .par_iter()
            .map(|gene| {
                let mut item = gene.clone();
                let features = self
                    .index
                    .bio_entity_of_gene(&gene.identifier)
                    .and_then(|entity| self.index.features_of_bio_entity(entity));
                if let Some(features) = features {
                    item.add_collection(RESULTS_COLLECTION, results_of(features, results));
                }
                item
            })
            .collect()
    }

    /// sample → treatments
    fn resolve_samples(&self, queue: &[Item]) -> Vec<Item> {
        queue
            .par_iter()
            .map(|sample| {
                let mut item = sample.clone();
                let treatments = self
                    .index
                    .treatments_of_sample(&sample.identifier)
                    .map(|t| t.iter().cloned().collect())
                    .unwrap_or_default();
                item.add_collection("treatments", treatments);
                item
            })
            .collect()
    }
}

/// Sorted union of the results measured on `features`
fn results_of(features: &BTreeSet<String>, results: &ResultsByFeature<'_>) -> Vec<String> {
    let union: BTreeSet<&str> = features
        .iter()
        .filter_map(|feature| results.get(feature.as_str()))
        .flat_map(|ids| ids.iter().copied())
        .collect();
    union.into_iter().map(str::to_string).collect()
}

//! Cross-reference index
//!
//! Partial relationship knowledge gathered while phase 1 streams the source
//! graph. Every map is additive: registering an existing key unions the new
//! value into the stored set, so the final content does not depend on the
//! order in which items were translated.
//!
//! Writers share a [`CrossReferenceIndex`] (`dashmap` shards, lock per key).
//! At the phase barrier it is consumed by [`CrossReferenceIndex::freeze`],
//! which checks the single-valued maps and yields the read-only
//! [`FrozenIndex`]. Queries exist only on the frozen form.

use ahash::AHashMap;
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::debug;

use crate::errors::{Result, TranslateError};

/// Multiplicity of an index map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    /// One value per key (1:1 or many:1); distinct values are a conflict
    Single,
    /// Union of every registered value (1:many)
    Union,
}

/// Named index maps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexMap {
    FeatureToDesign,
    LocationToFeature,
    ResultToFeature,
    BioEntityFeatures,
    GeneToBioEntity,
    SampleTreatments,
}

impl IndexMap {
    pub fn name(&self) -> &'static str {
        match self {
            IndexMap::FeatureToDesign => "feature_to_design",
            IndexMap::LocationToFeature => "location_to_feature",
            IndexMap::ResultToFeature => "result_to_feature",
            IndexMap::BioEntityFeatures => "bio_entity_features",
            IndexMap::GeneToBioEntity => "gene_to_bio_entity",
            IndexMap::SampleTreatments => "sample_treatments",
        }
    }

    pub fn multiplicity(&self) -> Multiplicity {
        match self {
            IndexMap::BioEntityFeatures | IndexMap::SampleTreatments => Multiplicity::Union,
            _ => Multiplicity::Single,
        }
    }
}

type SetMap = DashMap<String, BTreeSet<String>>;

/// Phase-1 index, shared by every translation worker
#[derive(Debug, Default)]
pub struct CrossReferenceIndex {
    feature_to_design: SetMap,
    location_to_feature: SetMap,
    result_to_feature: SetMap,
    bio_entity_features: SetMap,
    gene_to_bio_entity: SetMap,
    sample_treatments: SetMap,
}

impl CrossReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, which: IndexMap) -> &SetMap {
        match which {
            IndexMap::FeatureToDesign => &self.feature_to_design,
            IndexMap::LocationToFeature => &self.location_to_feature,
            IndexMap::ResultToFeature => &self.result_to_feature,
            IndexMap::BioEntityFeatures => &self.bio_entity_features,
            IndexMap::GeneToBioEntity => &self.gene_to_bio_entity,
            IndexMap::SampleTreatments => &self.sample_treatments,
        }
    }

    /// Union `values` into `key` of `which`; the key exists afterwards even
    /// when `values` is empty
    pub fn register<I, S>(&self, which: IndexMap, key: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let map = self.map(which);
        let mut entry = map.entry(key.to_string()).or_default();
        entry.extend(values.into_iter().map(Into::into));
    }

    /// Feature belongs to design (many:1)
    pub fn register_feature_design(&self, feature: &str, design: &str) {
        self.register(IndexMap::FeatureToDesign, feature, [design]);
    }

    /// Location item waits for the design of its feature (1:1)
    pub fn register_location(&self, location: &str, feature: &str) {
        self.register(IndexMap::LocationToFeature, location, [feature]);
    }

    /// Measurement result was taken on feature (1:1)
    pub fn register_result(&self, result: &str, feature: &str) {
        self.register(IndexMap::ResultToFeature, result, [feature]);
    }

    /// Bio entity is immobilized on features (union)
    pub fn register_bio_entity_features<I, S>(&self, bio_entity: &str, features: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(IndexMap::BioEntityFeatures, bio_entity, features);
    }

    /// Companion gene originates from bio entity (1:1)
    pub fn register_gene(&self, gene: &str, bio_entity: &str) {
        self.register(IndexMap::GeneToBioEntity, gene, [bio_entity]);
    }

    /// Sample received treatments (union)
    pub fn register_sample_treatments<I, S>(&self, sample: &str, treatments: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(IndexMap::SampleTreatments, sample, treatments);
    }

    /// Number of keys in a map
    pub fn len(&self, which: IndexMap) -> usize {
        self.map(which).len()
    }

    pub fn is_empty(&self) -> bool {
        ALL_MAPS.iter().all(|m| self.map(*m).is_empty())
    }

    /// Close the index at the phase barrier
    ///
    /// Fails with `InconsistentDerivation` when a single-valued map holds two
    /// distinct values for one key. The reported pair is the two smallest
    /// values, so the error is the same for every arrival order.
    pub fn freeze(self) -> Result<FrozenIndex> {
        let (feature_to_design, location_to_feature, result_to_feature, gene_to_bio_entity) = {
            let ((a, b), (c, d)) = rayon::join(
                || {
                    rayon::join(
                        || single_valued(self.feature_to_design, IndexMap::FeatureToDesign),
                        || single_valued(self.location_to_feature, IndexMap::LocationToFeature),
                    )
                },
                || {
                    rayon::join(
                        || single_valued(self.result_to_feature, IndexMap::ResultToFeature),
                        || single_valued(self.gene_to_bio_entity, IndexMap::GeneToBioEntity),
                    )
                },
            );
            (a?, b?, c?, d?)
        };

        let frozen = FrozenIndex {
            feature_to_design,
            location_to_feature,
            result_to_feature,
            bio_entity_features: self.bio_entity_features.into_iter().collect(),
            gene_to_bio_entity,
            sample_treatments: self.sample_treatments.into_iter().collect(),
        };

        debug!(
            features = frozen.feature_to_design.len(),
            locations = frozen.location_to_feature.len(),
            results = frozen.result_to_feature.len(),
            bio_entities = frozen.bio_entity_features.len(),
            genes = frozen.gene_to_bio_entity.len(),
            samples = frozen.sample_treatments.len(),
            "Froze cross-reference index"
        );

        Ok(frozen)
    }
}

const ALL_MAPS: [IndexMap; 6] = [
    IndexMap::FeatureToDesign,
    IndexMap::LocationToFeature,
    IndexMap::ResultToFeature,
    IndexMap::BioEntityFeatures,
    IndexMap::GeneToBioEntity,
    IndexMap::SampleTreatments,
];

fn single_valued(map: SetMap, which: IndexMap) -> Result<AHashMap<String, String>> {
    debug_assert_eq!(which.multiplicity(), Multiplicity::Single);

    // Smallest conflicting key wins so the error does not depend on shard order
    let mut conflict: Option<(String, String, String)> = None;
    let mut out = AHashMap::with_capacity(map.len());

    for (key, values) in map {
        let mut iter = values.into_iter();
        let Some(first) = iter.next() else { continue };
        if let Some(second) = iter.next() {
            let replace = match &conflict {
                Some((k, _, _)) => key < *k,
                None => true,
            };
            if replace {
                conflict = Some((key, first, second));
            }
            continue;
        }
        out.insert(key, first);
    }

    match conflict {
        Some((key, first, second)) => Err(TranslateError::inconsistent(
            &key,
            which.name(),
            first,
            second,
        )),
        None => Ok(out),
    }
}

/// Read-only index available in phase 2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrozenIndex {
    feature_to_design: AHashMap<String, String>,
    location_to_feature: AHashMap<String, String>,
    result_to_feature: AHashMap<String, String>,
    bio_entity_features: AHashMap<String, BTreeSet<String>>,
    gene_to_bio_entity: AHashMap<String, String>,
    sample_treatments: AHashMap<String, BTreeSet<String>>,
}

impl FrozenIndex {
    pub fn design_of_feature(&self, feature: &str) -> Option<&str> {
        self.feature_to_design.get(feature).map(String::as_str)
    }

    pub fn feature_of_location(&self, location: &str) -> Option<&str> {
        self.location_to_feature.get(location).map(String::as_str)
    }

    /// Design reached via location → feature → design
    pub fn design_of_location(&self, location: &str) -> Option<&str> {
        self.feature_of_location(location)
            .and_then(|feature| self.design_of_feature(feature))
    }

    pub fn feature_of_result(&self, result: &str) -> Option<&str> {
        self.result_to_feature.get(result).map(String::as_str)
    }

    /// Features registered for a bio entity; `None` when never registered
    pub fn features_of_bio_entity(&self, bio_entity: &str) -> Option<&BTreeSet<String>> {
        self.bio_entity_features.get(bio_entity)
    }

    pub fn bio_entity_of_gene(&self, gene: &str) -> Option<&str> {
        self.gene_to_bio_entity.get(gene).map(String::as_str)
    }

    pub fn treatments_of_sample(&self, sample: &str) -> Option<&BTreeSet<String>> {
        self.sample_treatments.get(sample)
    }

    /// Reduce result → feature into feature → {result} (PARALLEL)
    pub fn results_by_feature(&self) -> AHashMap<&str, BTreeSet<&str>> {
        self.result_to_feature
            .par_iter()
            .fold(AHashMap::new, |mut map, (result, feature)| {
                map.entry(feature.as_str())
                    .or_insert_with(BTreeSet::new)
                    .insert(result.as_str());
                map
            })
            .reduce(AHashMap::new, |mut a, b| {
                for (feature, results) in b {
                    a.entry(feature).or_insert_with(BTreeSet::new).extend(results);
                }
                a
            })
    }

    /// Number of keys in a map
    pub fn len(&self, which: IndexMap) -> usize {
        match which {
            IndexMap::FeatureToDesign => self.feature_to_design.len(),
            IndexMap::LocationToFeature => self.location_to_feature.len(),
            IndexMap::ResultToFeature => self.result_to_feature.len(),
            IndexMap::BioEntityFeatures => self.bio_entity_features.len(),
            IndexMap::GeneToBioEntity => self.gene_to_bio_entity.len(),
            IndexMap::SampleTreatments => self.sample_treatments.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        ALL_MAPS.iter().all(|m| self.len(*m) == 0)
    }
}

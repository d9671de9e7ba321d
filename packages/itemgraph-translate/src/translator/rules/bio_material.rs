//! Bio materials: labeled extracts, samples and treatments

use itemgraph_store::Item;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::{companion_id, copy_attribute};
use crate::errors::{Result, TranslateError};
use crate::translator::{DeferredKind, RuleContext};

const ORGANISM_CATEGORY: &str = "organism";

/// LabeledExtract → LabeledExtract
///
/// The sample is three treatment steps upstream of the extract:
///
/// ```text
/// extract.treatments → measurement.bioMaterial (bio sample)
///   .treatments → measurement.bioMaterial (bio sample)
///   .treatments → measurement.bioMaterial (sample)
/// ```
///
/// `treatments` on the target lists the extract's own treatments followed by
/// those of the first bio sample. Treatments of the last bio sample are
/// registered against the sample. Every route must end at the same sample.
/// When no treatment leads to a bio material the extract keeps its
/// treatments and gets no sample.
pub fn labeled_extract(ctx: &mut RuleContext<'_>, tgt: &mut Item) -> Result<()> {
    let src = ctx.src;

    tgt.references.remove("materialType");
    if let Some(material_type) = ctx.vocabulary_value(src, "materialType")? {
        tgt.add_attribute("materialType", material_type);
    }

    let label = ctx.singleton(src, "labels")?;
    tgt.remove_collection("labels");
    if let Some(name) = ctx.attribute_of(&label, "name") {
        tgt.add_attribute("label", name);
    }

    tgt.remove_collection("treatments");
    let own = src.collection("treatments").unwrap_or_default();
    if own.is_empty() {
        return Ok(());
    }

    let mut walk = TreatmentWalk::default();
    for treatment_id in own {
        walk.treatments.push(treatment_id.clone());
        let Some(treatment) = ctx.lookup(treatment_id)? else {
            ctx.note_missing(&src.identifier, "treatments");
            continue;
        };
        for bio_sample in upstream_materials(ctx, &treatment)? {
            walk.reached_material = true;
            walk.visit_bio_sample(ctx, &bio_sample)?;
        }
    }

    if !walk.reached_material {
        tgt.add_collection("treatments", walk.treatments);
        return Ok(());
    }

    let sample = walk.single_sample(&src.identifier)?;
    tgt.add_reference("sample", sample.clone());
    tgt.add_collection("treatments", walk.treatments);
    ctx.index
        .register_sample_treatments(&sample, walk.sample_treatments);
    Ok(())
}

/// Bio materials a treatment was applied to
fn upstream_materials(ctx: &mut RuleContext<'_>, treatment: &Item) -> Result<Vec<Arc<Item>>> {
    let mut materials = Vec::new();
    for measurement in ctx.follow_all(treatment, "sourceBioMaterialMeasurements")? {
        if let Some(material) = ctx.follow(&measurement, "bioMaterial")? {
            materials.push(material);
        }
    }
    Ok(materials)
}

#[derive(Default)]
struct TreatmentWalk {
    treatments: Vec<String>,
    samples: Vec<String>,
    sample_treatments: BTreeSet<String>,
    reached_material: bool,
}

impl TreatmentWalk {
    /// First bio sample upstream of the extract
    fn visit_bio_sample(&mut self, ctx: &mut RuleContext<'_>, bio_sample: &Item) -> Result<()> {
        let Some(treatment_ids) = bio_sample.collection("treatments") else {
            return Ok(());
        };
        for treatment_id in treatment_ids {
            self.treatments.push(treatment_id.clone());
            let Some(treatment) = ctx.lookup(treatment_id)? else {
                ctx.note_missing(&bio_sample.identifier, "treatments");
                continue;
            };
            for source_sample in upstream_materials(ctx, &treatment)? {
                self.visit_source_sample(ctx, &source_sample)?;
            }
        }
        Ok(())
    }

    /// Second bio sample; its treatments lead to the sample itself
    fn visit_source_sample(&mut self, ctx: &mut RuleContext<'_>, bio_sample: &Item) -> Result<()> {
        let Some(treatment_ids) = bio_sample.collection("treatments") else {
            return Ok(());
        };
        for treatment_id in treatment_ids {
            self.sample_treatments.insert(treatment_id.clone());
            let Some(treatment) = ctx.lookup(treatment_id)? else {
                ctx.note_missing(&bio_sample.identifier, "treatments");
                continue;
            };
            for sample in upstream_materials(ctx, &treatment)? {
                self.samples.push(sample.identifier.clone());
            }
        }
        Ok(())
    }

    fn single_sample(&self, item_id: &str) -> Result<String> {
        let Some(first) = self.samples.first() else {
            return Err(TranslateError::singleton(item_id, "sample", 0));
        };
        if let Some(other) = self.samples.iter().find(|s| *s != first) {
            return Err(TranslateError::inconsistent(
                item_id,
                "sample",
                first.clone(),
                other.clone(),
            ));
        }
        Ok(first.clone())
    }
}

/// BioSource → Sample
///
/// The characteristic whose category is `organism` becomes a companion
/// `Organism`; the others stay in `characteristics`. The sample waits for
/// phase 2 to receive its treatments.
pub fn sample(ctx: &mut RuleContext<'_>, tgt: &mut Item) -> Result<()> {
    let src = ctx.src;

    tgt.remove_collection("characteristics");
    if let Some(characteristic_ids) = src.collection("characteristics") {
        let mut kept = Vec::new();
        let mut organisms: Vec<Arc<Item>> = Vec::new();

        for id in characteristic_ids {
            let Some(characteristic) = ctx.lookup(id)? else {
                ctx.note_missing(&src.identifier, "characteristics");
                continue;
            };
            let category = ctx.attribute_of(&characteristic, "category");
            match category {
                Some(c) if c.eq_ignore_ascii_case(ORGANISM_CATEGORY) => organisms.push(characteristic),
                _ => kept.push(id.clone()),
            }
        }

        if organisms.len() > 1 {
            let describe = |c: &Arc<Item>| {
                c.attribute("value")
                    .unwrap_or(c.identifier.as_str())
                    .to_string()
            };
            return Err(TranslateError::inconsistent(
                &src.identifier,
                "organism",
                describe(&organisms[0]),
                describe(&organisms[1]),
            ));
        }

        if let Some(characteristic) = organisms.first() {
            if let Some(name) = ctx.attribute_of(characteristic, "value") {
                let organism_id = companion_id(&src.identifier, "organism");
                let mut organism = ctx.create_item(organism_id.clone(), "Organism");
                organism.add_attribute("name", name);
                ctx.emit(organism);
                tgt.add_reference("organism", organism_id);
            }
        }

        tgt.add_collection("characteristics", kept);
    }

    tgt.references.remove("materialType");
    if let Some(material_type) = ctx.vocabulary_value(src, "materialType")? {
        tgt.add_attribute("materialType", material_type);
    }
    copy_attribute(src, tgt, "name");

    ctx.defer_target(DeferredKind::Sample);
    Ok(())
}

/// Treatment → Treatment
pub fn treatment(ctx: &mut RuleContext<'_>, tgt: &mut Item) -> Result<()> {
    let src = ctx.src;
    tgt.references.remove("action");
    if let Some(action) = ctx.vocabulary_value(src, "action")? {
        tgt.add_attribute("action", action);
    }
    Ok(())
}

//! Experiments, assays and measured results

use itemgraph_store::Item;
use tracing::warn;

use super::copy_attribute;
use crate::errors::Result;
use crate::translator::RuleContext;

/// Experiment → MicroArrayExperiment
///
/// Only derived assays are kept (collection `assays`). Descriptions supply
/// the `description` text and the `publication` reference; later candidates
/// for either are ignored.
pub fn experiment(ctx: &mut RuleContext<'_>, tgt: &mut Item) -> Result<()> {
    let src = ctx.src;

    tgt.remove_collection("bioAssays");
    if src.has_collection("bioAssays") {
        let derived_class = format!("{}DerivedBioAssay", ctx.source_ns);
        let assays: Vec<String> = ctx
            .follow_all(src, "bioAssays")?
            .into_iter()
            .filter(|assay| assay.class_name == derived_class)
            .map(|assay| assay.identifier.clone())
            .collect();
        tgt.add_collection("assays", assays);
    }

    copy_attribute(src, tgt, "name");

    tgt.remove_collection("descriptions");
    let mut description_set = false;
    let mut publication_set = false;
    for description in ctx.follow_all(src, "descriptions")? {
        if let Some(text) = description.attribute("text") {
            if description_set {
                warn!(item = %src.identifier, description = %description.identifier, "Ignoring additional experiment description");
            } else {
                tgt.add_attribute("description", text);
                description_set = true;
            }
        }

        if let Some(publication) = ctx.optional_singleton(&description, "bibliographicReferences")? {
            if publication_set {
                warn!(item = %src.identifier, description = %description.identifier, "Ignoring additional experiment publication");
            } else {
                tgt.add_reference("publication", publication.identifier.clone());
                publication_set = true;
            }
        }
    }
    Ok(())
}

/// DerivedBioAssay → MicroArrayAssay
///
/// `results` holds the tuple data of every derived data set, in order.
pub fn assay(ctx: &mut RuleContext<'_>, tgt: &mut Item) -> Result<()> {
    let src = ctx.src;
    tgt.remove_collection("derivedBioAssayData");

    let mut results = Vec::new();
    let mut found = false;
    for data in ctx.follow_all(src, "derivedBioAssayData")? {
        let Some(values) = ctx.follow_required(&data, "bioDataValues")? else {
            continue;
        };
        if let Some(tuples) = values.collection("bioAssayTupleData") {
            results.extend(tuples.iter().cloned());
            found = true;
        }
    }

    if found {
        tgt.add_collection("results", results);
    }
    Ok(())
}

/// BioAssayDatum → MicroArrayExperimentalResult
///
/// Registers the result against its design element (a feature) and derives
/// `type`, `scale` and `isBackground` from the quantitation type. An error
/// quantitation type takes scale and background from the quantitation type
/// it qualifies.
pub fn experimental_result(ctx: &mut RuleContext<'_>, tgt: &mut Item) -> Result<()> {
    let src = ctx.src;

    if let Some(normalised) = ctx.attribute_of(src, "normalised") {
        tgt.add_attribute("normalised", normalised);
    }

    tgt.references.remove("designElement");
    match src.reference("designElement") {
        Some(feature) => ctx.index.register_result(&tgt.identifier, feature),
        None => ctx.note_missing(&src.identifier, "designElement"),
    }

    tgt.references.remove("quantitationType");
    let Some(quantitation) = ctx.follow_required(src, "quantitationType")? else {
        ctx.note_missing(&src.identifier, "quantitationType");
        return Ok(());
    };

    let kind = quantitation.fragment();
    let measured = if kind.ends_with("MeasuredSignal") || kind.ends_with("Ratio") {
        Some(quantitation.clone())
    } else if kind.ends_with("Error") {
        ctx.follow_required(&quantitation, "targetQuantitationType")?
    } else {
        return Ok(());
    };

    if let Some(name) = ctx.attribute_of(&quantitation, "name") {
        tgt.add_attribute("type", name);
    }

    let Some(measured) = measured else {
        ctx.note_missing(&quantitation.identifier, "targetQuantitationType");
        return Ok(());
    };

    if let Some(scale) = ctx.vocabulary_value(&measured, "scale")? {
        tgt.add_attribute("scale", scale);
    }
    if let Some(background) = ctx.attribute_of(&measured, "isBackground") {
        tgt.add_attribute("isBackground", background);
    }
    Ok(())
}

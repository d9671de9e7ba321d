//! Array designs, reporters and their locations on the array

use itemgraph_store::Item;
use std::collections::BTreeSet;
use tracing::debug;

use super::copy_attribute;
use crate::errors::Result;
use crate::translator::{DeferredKind, RuleContext};

/// FeatureReporterMap → ReporterLocation
///
/// Coordinates come from the feature behind the single feature information
/// source. The design is only known once every PhysicalArrayDesign has been
/// seen, so a location with a feature is registered and held for phase 2.
pub fn reporter_location(ctx: &mut RuleContext<'_>, tgt: &mut Item) -> Result<()> {
    let src = ctx.src;
    let info = ctx.singleton(src, "featureInformationSources")?;
    tgt.remove_collection("featureInformationSources");

    let Some(feature) = ctx.follow(&info, "feature")? else {
        return Ok(());
    };

    if let Some(location) = ctx.follow(&feature, "featureLocation")? {
        set_coordinates(ctx, &location, tgt, ("localX", "localY"));
    }
    if let Some(zone) = ctx.follow(&feature, "zone")? {
        set_coordinates(ctx, &zone, tgt, ("zoneX", "zoneY"));
    }

    ctx.index.register_location(&tgt.identifier, &feature.identifier);
    ctx.defer_target(DeferredKind::ReporterLocation);
    Ok(())
}

/// `column`/`row` of `from` onto the given target attributes
fn set_coordinates(ctx: &mut RuleContext<'_>, from: &Item, tgt: &mut Item, names: (&str, &str)) {
    if let Some(column) = ctx.attribute_of(from, "column") {
        tgt.add_attribute(names.0, column);
    }
    if let Some(row) = ctx.attribute_of(from, "row") {
        tgt.add_attribute(names.1, row);
    }
}

/// PhysicalArrayDesign → MicroArraySlideDesign
pub fn slide_design(ctx: &mut RuleContext<'_>, tgt: &mut Item) -> Result<()> {
    let src = ctx.src;

    let group = ctx.singleton(src, "featureGroups")?;
    tgt.remove_collection("featureGroups");
    match group.collection("features") {
        Some(features) => {
            for feature in features {
                ctx.index.register_feature_design(feature, &tgt.identifier);
            }
            debug!(design = %tgt.identifier, features = features.len(), "Registered design features");
        }
        None => ctx.note_missing(&group.identifier, "features"),
    }

    // Description annotations move up onto the design
    tgt.remove_collection("descriptions");
    if src.has_collection("descriptions") {
        let mut annotations = Vec::new();
        for description in ctx.follow_all(src, "descriptions")? {
            if let Some(ids) = description.collection("annotations") {
                annotations.extend(ids.iter().cloned());
            }
        }
        tgt.add_collection("descriptions", annotations);
    }

    tgt.references.remove("surfaceType");
    if let Some(surface) = ctx.vocabulary_value(src, "surfaceType")? {
        tgt.add_attribute("surfaceType", surface);
    }

    copy_attribute(src, tgt, "version");
    copy_attribute(src, tgt, "name");
    Ok(())
}

/// Reporter → Reporter
///
/// The immobilized bio entity becomes reference `material` and is registered
/// against every feature the reporter maps to.
pub fn reporter(ctx: &mut RuleContext<'_>, tgt: &mut Item) -> Result<()> {
    let src = ctx.src;
    tgt.remove_collection("immobilizedCharacteristics");
    tgt.remove_collection("featureReporterMaps");

    let Some(bio_entity) = ctx.optional_singleton(src, "immobilizedCharacteristics")? else {
        return Ok(());
    };

    let mut features = BTreeSet::new();
    for map in ctx.follow_all(src, "featureReporterMaps")? {
        for info in ctx.follow_all(&map, "featureInformationSources")? {
            if let Some(feature) = info.reference("feature") {
                features.insert(feature.to_string());
            }
        }
    }

    tgt.add_reference("material", bio_entity.identifier.clone());
    ctx.index
        .register_bio_entity_features(&bio_entity.identifier, features);
    Ok(())
}

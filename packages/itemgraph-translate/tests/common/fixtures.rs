//! Test fixtures
//!
//! A small MAGE graph touching every class rule:
//!
//! ```text
//! design1 ─ fg1 ─ {f1, f2}          frm1 ─ fi1 ─ f1 ─ fl1, z1
//!                                    frm2 ─ fi2 ─ f2
//! rep1 ─ {frm1, frm2}, bs1           bs1 ─ {de1, de2 (flybase), de3 (embl)}
//! bad1, bad2 → f1; bad3 → f2         dba1 ─ dbad1 ─ bdt1 ─ {bad1, bad2, bad3}
//! exp1 ─ {dba1, mba1}, edesc1 ─ br1
//! le1 ─ t1 ─ m1 ─ bsam1 ─ t2 ─ m2 ─ bsam2 ─ t3 ─ m3 ─ src1 ─ {ch1 (organism), ch2}
//! ```

use itemgraph_store::{Item, MemoryItemSink, MemoryItemStore};
use itemgraph_translate::{
    FieldMapping, TranslationConfig, TranslationDriver, TranslationReport,
    DEFAULT_TARGET_NAMESPACE,
};

use super::{GraphBuilder, ItemBuilder};

pub const MAGE_NS: &str = "http://www.flymine.org/model/mage#";
pub const GENOMIC_NS: &str = DEFAULT_TARGET_NAMESPACE;

pub fn mage_mapping() -> FieldMapping {
    FieldMapping::builtin_mage().expect("built-in mapping parses")
}

/// Physical array design, its features and reporter locations
pub fn array_design_graph() -> GraphBuilder {
    GraphBuilder::new()
        .with(
            ItemBuilder::mage("design1", "PhysicalArrayDesign")
                .attr("name", "Array 1")
                .attr("version", "2")
                .reference("surfaceType", "ot_surface")
                .collection("featureGroups", &["fg1"])
                .collection("descriptions", &["ddesc1"]),
        )
        .term("ot_surface", "glass")
        .with(ItemBuilder::mage("ddesc1", "Description").collection("annotations", &["ot_annot1"]))
        .with(ItemBuilder::mage("fg1", "FeatureGroup").collection("features", &["f1", "f2"]))
        .with(
            ItemBuilder::mage("f1", "Feature")
                .reference("featureLocation", "fl1")
                .reference("zone", "z1"),
        )
        .with(ItemBuilder::mage("f2", "Feature"))
        .with(
            ItemBuilder::mage("fl1", "FeatureLocation")
                .attr("column", "1")
                .attr("row", "2"),
        )
        .with(ItemBuilder::mage("z1", "Zone").attr("column", "3").attr("row", "4"))
        .with(ItemBuilder::mage("frm1", "FeatureReporterMap").collection("featureInformationSources", &["fi1"]))
        .with(ItemBuilder::mage("fi1", "FeatureInformation").reference("feature", "f1"))
        .with(ItemBuilder::mage("frm2", "FeatureReporterMap").collection("featureInformationSources", &["fi2"]))
        .with(ItemBuilder::mage("fi2", "FeatureInformation").reference("feature", "f2"))
}

/// Reporter linking the array features to `bs1`
pub fn reporter_graph() -> GraphBuilder {
    GraphBuilder::new().with(
        ItemBuilder::mage("rep1", "Reporter")
            .attr("name", "R1")
            .collection("featureReporterMaps", &["frm1", "frm2"])
            .collection("immobilizedCharacteristics", &["bs1"]),
    )
}

/// Bio sequence with FlyBase and EMBL cross-references
pub fn bio_sequence_graph() -> GraphBuilder {
    GraphBuilder::new()
        .with(
            ItemBuilder::mage("bs1", "BioSequence")
                .attr("name", "clone 1")
                .reference("type", "ot_seqtype")
                .collection("sequenceDatabases", &["de1", "de2", "de3"]),
        )
        .term("ot_seqtype", "genomic_DNA")
        .with(
            ItemBuilder::mage("de1", "DatabaseEntry")
                .attr("accession", "FBgn0000001")
                .reference("database", "db_flybase"),
        )
        .with(
            ItemBuilder::mage("de2", "DatabaseEntry")
                .attr("accession", "FBgn0000001")
                .reference("database", "db_flybase"),
        )
        .with(
            ItemBuilder::mage("de3", "DatabaseEntry")
                .attr("accession", "AB000001")
                .reference("database", "db_embl"),
        )
        .with(ItemBuilder::mage("db_flybase", "Database").attr("name", "flybase"))
        .with(ItemBuilder::mage("db_embl", "Database").attr("name", "embl"))
}

/// Experiment, assay, three measurements and a publication
pub fn experiment_graph() -> GraphBuilder {
    GraphBuilder::new()
        .with(
            ItemBuilder::mage("exp1", "Experiment")
                .attr("name", "Exp 1")
                .collection("bioAssays", &["dba1", "mba1"])
                .collection("descriptions", &["edesc1"]),
        )
        .with(
            ItemBuilder::mage("edesc1", "Description")
                .attr("text", "Time course")
                .collection("bibliographicReferences", &["br1"]),
        )
        .with(
            ItemBuilder::mage("br1", "BibliographicReference")
                .attr("title", "A paper")
                .attr("authors", "A. Smith; B. Jones"),
        )
        .with(ItemBuilder::mage("mba1", "MeasuredBioAssay"))
        .with(ItemBuilder::mage("dba1", "DerivedBioAssay").collection("derivedBioAssayData", &["dbad1"]))
        .with(ItemBuilder::mage("dbad1", "DerivedBioAssayData").reference("bioDataValues", "bdt1"))
        .with(ItemBuilder::mage("bdt1", "BioDataTuples").collection("bioAssayTupleData", &["bad1", "bad2", "bad3"]))
        .with(
            ItemBuilder::mage("bad1", "BioAssayDatum")
                .attr("value", "1.5")
                .attr("normalised", "true")
                .reference("designElement", "f1")
                .reference("quantitationType", "qt1"),
        )
        .with(
            ItemBuilder::mage("bad2", "BioAssayDatum")
                .attr("value", "2.5")
                .reference("designElement", "f1")
                .reference("quantitationType", "qt1"),
        )
        .with(
            ItemBuilder::mage("bad3", "BioAssayDatum")
                .attr("value", "0.1")
                .reference("designElement", "f2")
                .reference("quantitationType", "qt2"),
        )
        .with(
            ItemBuilder::mage("qt1", "MeasuredSignal")
                .attr("name", "signal")
                .attr("isBackground", "false")
                .reference("scale", "ot_scale"),
        )
        .with(
            ItemBuilder::mage("qt2", "Error")
                .attr("name", "signal error")
                .reference("targetQuantitationType", "qt1"),
        )
        .term("ot_scale", "linear_scale")
}

/// Labeled extract three treatment steps downstream of its sample
pub fn bio_material_graph() -> GraphBuilder {
    GraphBuilder::new()
        .with(
            ItemBuilder::mage("le1", "LabeledExtract")
                .attr("name", "LE 1")
                .reference("materialType", "ot_rna")
                .collection("labels", &["lab1"])
                .collection("treatments", &["t1"]),
        )
        .term("ot_rna", "total_RNA")
        .with(ItemBuilder::mage("lab1", "Compound").attr("name", "Cy3"))
        .with(
            ItemBuilder::mage("t1", "Treatment")
                .reference("action", "ot_labeling")
                .collection("sourceBioMaterialMeasurements", &["m1"]),
        )
        .term("ot_labeling", "labeling")
        .with(ItemBuilder::mage("m1", "BioMaterialMeasurement").reference("bioMaterial", "bsam1"))
        .with(ItemBuilder::mage("bsam1", "BioSample").collection("treatments", &["t2"]))
        .with(ItemBuilder::mage("t2", "Treatment").collection("sourceBioMaterialMeasurements", &["m2"]))
        .with(ItemBuilder::mage("m2", "BioMaterialMeasurement").reference("bioMaterial", "bsam2"))
        .with(ItemBuilder::mage("bsam2", "BioSample").collection("treatments", &["t3"]))
        .with(ItemBuilder::mage("t3", "Treatment").collection("sourceBioMaterialMeasurements", &["m3"]))
        .with(ItemBuilder::mage("m3", "BioMaterialMeasurement").reference("bioMaterial", "src1"))
        .with(
            ItemBuilder::mage("src1", "BioSource")
                .attr("name", "Fly")
                .reference("materialType", "ot_organism")
                .collection("characteristics", &["ch1", "ch2"]),
        )
        .term("ot_organism", "whole_organism")
        .with(
            ItemBuilder::mage("ch1", "OntologyEntry")
                .attr("category", "Organism")
                .attr("value", "Drosophila melanogaster"),
        )
        .with(
            ItemBuilder::mage("ch2", "OntologyEntry")
                .attr("category", "DevelopmentalStage")
                .attr("value", "adult"),
        )
}

/// Every fixture part in one graph
pub fn full_graph() -> GraphBuilder {
    GraphBuilder::new()
        .with_items(array_design_graph().into_items())
        .with_items(reporter_graph().into_items())
        .with_items(bio_sequence_graph().into_items())
        .with_items(experiment_graph().into_items())
        .with_items(bio_material_graph().into_items())
}

pub fn test_config() -> TranslationConfig {
    TranslationConfig::default().with_workers(4).with_window(7)
}

/// Run the driver over `store` into a fresh memory sink
pub fn run(store: &MemoryItemStore) -> (TranslationReport, MemoryItemSink) {
    let mapping = mage_mapping();
    let mut sink = MemoryItemSink::new();
    let report = TranslationDriver::new(store, &mapping, test_config())
        .expect("valid config")
        .run(&mut sink)
        .expect("translation succeeds");
    (report, sink)
}

/// Run the driver over `store`, returning stored items sorted by identifier
pub fn run_sorted(store: &MemoryItemStore) -> Vec<Item> {
    run(store).1.sorted_items()
}

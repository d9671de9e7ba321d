//! End-to-end translation of the fixture graph
//!
//! One driver run per test; assertions cover each class rule and the joins
//! completed in phase 2.

mod common;

use common::*;
use itemgraph_translate::{Diagnostic, RESULTS_COLLECTION};
use pretty_assertions::assert_eq;

#[test]
fn test_report_counts() {
    let store = full_graph().build();
    let (report, sink) = run(&store);

    assert_eq!(report.source_items, store.len());
    assert_eq!(report.deferred.reporter_locations, 2);
    assert_eq!(report.deferred.bio_entities, 1);
    assert_eq!(report.deferred.genes, 1);
    assert_eq!(report.deferred.samples, 1);
    assert_eq!(report.resolved_items, 5);
    assert_eq!(report.emitted_items, 28);
    assert_eq!(report.total_items(), sink.items().len());
    assert!(sink.is_closed());

    assert_unique_ids(&sink.items());
}

#[test]
fn test_unmapped_classes_are_dropped() {
    let items = run_sorted(&full_graph().build());

    for id in ["ddesc1", "fg1", "f1", "fl1", "z1", "fi1", "qt1", "bdt1", "m1", "bsam1", "lab1", "mba1"] {
        assert!(
            items.iter().all(|i| i.identifier != id),
            "'{id}' should not be translated"
        );
    }
    assert_eq!(count_class(&items, "OntologyTerm"), 8);
}

#[test]
fn test_publication_authors() {
    let items = run_sorted(&experiment_graph().build());

    let publication = item(&items, "br1");
    assert_class(publication, "Publication");
    assert_eq!(publication.attribute("title"), Some("A paper"));
    assert!(!publication.has_attribute("authors"));
    assert_collection(publication, "authors", &["br1_author_1", "br1_author_2"]);

    assert_eq!(count_class(&items, "Author"), 2);
    assert_eq!(item(&items, "br1_author_1").attribute("name"), Some("A. Smith"));
    assert_eq!(item(&items, "br1_author_2").attribute("name"), Some("B. Jones"));
}

#[test]
fn test_experiment_and_assay() {
    let items = run_sorted(&experiment_graph().build());

    let experiment = item(&items, "exp1");
    assert_class(experiment, "MicroArrayExperiment");
    assert_collection(experiment, "assays", &["dba1"]);
    assert!(!experiment.has_collection("bioAssays"));
    assert_eq!(experiment.attribute("name"), Some("Exp 1"));
    assert_eq!(experiment.attribute("description"), Some("Time course"));
    assert_eq!(experiment.reference("publication"), Some("br1"));

    let assay = item(&items, "dba1");
    assert_class(assay, "MicroArrayAssay");
    assert_collection(assay, "results", &["bad1", "bad2", "bad3"]);
}

#[test]
fn test_experimental_results() {
    let items = run_sorted(&experiment_graph().build());

    let measured = item(&items, "bad1");
    assert_class(measured, "MicroArrayExperimentalResult");
    assert_eq!(measured.attribute("normalised"), Some("true"));
    assert_eq!(measured.attribute("value"), Some("1.5"));
    assert_eq!(measured.attribute("type"), Some("signal"));
    assert_eq!(measured.attribute("scale"), Some("linear_scale"));
    assert_eq!(measured.attribute("isBackground"), Some("false"));
    assert!(measured.reference("designElement").is_none());
    assert!(!item(&items, "bad2").has_attribute("normalised"));

    // Error quantitation: own name, scale of the qualified signal
    let error = item(&items, "bad3");
    assert_eq!(error.attribute("type"), Some("signal error"));
    assert_eq!(error.attribute("scale"), Some("linear_scale"));
    assert_eq!(error.attribute("isBackground"), Some("false"));
}

#[test]
fn test_slide_design_and_reporter() {
    let graph = GraphBuilder::new()
        .with_items(array_design_graph().into_items())
        .with_items(reporter_graph().into_items())
        .with_items(bio_sequence_graph().into_items());
    let items = run_sorted(&graph.build());

    let design = item(&items, "design1");
    assert_class(design, "MicroArraySlideDesign");
    assert_eq!(design.attribute("surfaceType"), Some("glass"));
    assert_eq!(design.attribute("version"), Some("2"));
    assert_eq!(design.attribute("name"), Some("Array 1"));
    assert_collection(design, "descriptions", &["ot_annot1"]);
    assert!(!design.has_collection("featureGroups"));
    assert!(design.reference("surfaceType").is_none());

    let reporter = item(&items, "rep1");
    assert_class(reporter, "Reporter");
    assert_eq!(reporter.reference("material"), Some("bs1"));
    assert!(!reporter.has_collection("featureReporterMaps"));
}

#[test]
fn test_reporter_location_joins_design() {
    let items = run_sorted(&array_design_graph().build());

    let location = item(&items, "frm1");
    assert_class(location, "ReporterLocation");
    assert_eq!(location.reference("design"), Some("design1"));
    assert_eq!(location.attribute("localX"), Some("1"));
    assert_eq!(location.attribute("localY"), Some("2"));
    assert_eq!(location.attribute("zoneX"), Some("3"));
    assert_eq!(location.attribute("zoneY"), Some("4"));

    let bare = item(&items, "frm2");
    assert_eq!(bare.reference("design"), Some("design1"));
    assert!(!bare.has_attribute("localX"));
}

#[test]
fn test_reporter_location_without_design() {
    // Same features, but no design claims them
    let graph = GraphBuilder::new().with_items(
        array_design_graph()
            .into_items()
            .into_iter()
            .filter(|i| i.identifier != "design1"),
    );
    let items = run_sorted(&graph.build());

    let location = item(&items, "frm1");
    assert!(location.reference("design").is_none());
    assert_eq!(location.attribute("localX"), Some("1"));
}

#[test]
fn test_bio_entity_and_gene_results() {
    let graph = GraphBuilder::new()
        .with_items(array_design_graph().into_items())
        .with_items(reporter_graph().into_items())
        .with_items(bio_sequence_graph().into_items())
        .with_items(experiment_graph().into_items());
    let items = run_sorted(&graph.build());

    let entity = item(&items, "bs1");
    assert_class(entity, "NuclearDNA");
    assert_eq!(entity.attribute("identifier"), Some("AB000001"));
    assert_collection(entity, "synonyms", &["de3"]);
    assert!(entity.reference("type").is_none());
    assert_collection(entity, RESULTS_COLLECTION, &["bad1", "bad2", "bad3"]);

    let gene = item(&items, "bs1_gene");
    assert_class(gene, "Gene");
    assert_eq!(gene.attribute("organismDbId"), Some("FBgn0000001"));
    assert_collection(gene, "synonyms", &["de1", "de2"]);
    assert_collection(gene, RESULTS_COLLECTION, &["bad1", "bad2", "bad3"]);

    for entry in ["de1", "de2", "de3"] {
        let entry = item(&items, entry);
        assert_class(entry, "DatabaseEntry");
        assert_eq!(entry.attribute("type"), Some("accession"));
    }
}

#[test]
fn test_bio_entity_without_reporter() {
    let items = run_sorted(&bio_sequence_graph().build());

    // Never registered by a reporter: no results collection at all
    assert!(!item(&items, "bs1").has_collection(RESULTS_COLLECTION));
    assert!(!item(&items, "bs1_gene").has_collection(RESULTS_COLLECTION));
}

#[test]
fn test_labeled_extract_and_sample() {
    let items = run_sorted(&bio_material_graph().build());

    let extract = item(&items, "le1");
    assert_class(extract, "LabeledExtract");
    assert_eq!(extract.attribute("label"), Some("Cy3"));
    assert_eq!(extract.attribute("materialType"), Some("total_RNA"));
    assert_eq!(extract.reference("sample"), Some("src1"));
    assert_collection(extract, "treatments", &["t1", "t2"]);
    assert!(!extract.has_collection("labels"));

    let sample = item(&items, "src1");
    assert_class(sample, "Sample");
    assert_eq!(sample.attribute("name"), Some("Fly"));
    assert_eq!(sample.attribute("materialType"), Some("whole_organism"));
    assert_eq!(sample.reference("organism"), Some("src1_organism"));
    assert_collection(sample, "characteristics", &["ch2"]);
    assert_collection(sample, "treatments", &["t3"]);

    let organism = item(&items, "src1_organism");
    assert_class(organism, "Organism");
    assert_eq!(organism.attribute("name"), Some("Drosophila melanogaster"));

    let treatment = item(&items, "t1");
    assert_class(treatment, "Treatment");
    assert_eq!(treatment.attribute("action"), Some("labeling"));
    assert!(treatment.reference("action").is_none());
    assert!(!treatment.has_collection("sourceBioMaterialMeasurements"));
}

#[test]
fn test_sample_without_extract_has_empty_treatments() {
    let graph = GraphBuilder::new().with_items(
        bio_material_graph()
            .into_items()
            .into_iter()
            .filter(|i| i.identifier != "le1"),
    );
    let items = run_sorted(&graph.build());
    assert_collection(item(&items, "src1"), "treatments", &[]);
}

#[test]
fn test_missing_optional_fields_are_reported() {
    let (report, _) = run(&full_graph().build());

    assert!(report
        .diagnostics
        .contains(&Diagnostic::missing("f2", "featureLocation")));
    assert!(report.diagnostics.contains(&Diagnostic::missing("t2", "action")));

    let mut sorted = report.diagnostics.clone();
    sorted.sort();
    assert_eq!(sorted, report.diagnostics);
}

#[test]
fn test_repeated_runs_are_identical() {
    let store = full_graph().build();
    assert_eq!(run_sorted(&store), run_sorted(&store));
}

#[test]
fn test_three_results_on_one_feature() {
    let graph = GraphBuilder::new()
        .with_items(array_design_graph().into_items())
        .with_items(reporter_graph().into_items())
        .with_items(bio_sequence_graph().into_items())
        .with_items(experiment_graph().into_items())
        .replace(
            ItemBuilder::mage("bad3", "BioAssayDatum")
                .attr("value", "0.1")
                .reference("designElement", "f1")
                .reference("quantitationType", "qt2"),
        )
        .replace(
            ItemBuilder::mage("rep1", "Reporter")
                .collection("featureReporterMaps", &["frm1"])
                .collection("immobilizedCharacteristics", &["bs1"]),
        );
    let items = run_sorted(&graph.build());

    assert_collection(item(&items, "bs1"), RESULTS_COLLECTION, &["bad1", "bad2", "bad3"]);
    assert_collection(item(&items, "bs1_gene"), RESULTS_COLLECTION, &["bad1", "bad2", "bad3"]);
}

#[test]
fn test_extract_with_empty_treatments() {
    let store = bio_material_graph()
        .replace(
            ItemBuilder::mage("le1", "LabeledExtract")
                .collection("labels", &["lab1"])
                .collection("treatments", &[]),
        )
        .build();
    let items = run_sorted(&store);

    let extract = item(&items, "le1");
    assert!(extract.reference("sample").is_none());
    assert!(!extract.has_collection("treatments"));
    assert_collection(item(&items, "src1"), "treatments", &[]);
}

#[test]
fn test_extract_with_dangling_treatment() {
    let store = bio_material_graph()
        .replace(
            ItemBuilder::mage("le1", "LabeledExtract")
                .collection("labels", &["lab1"])
                .collection("treatments", &["t_missing"]),
        )
        .build();
    let (report, sink) = run(&store);
    let items = sink.sorted_items();

    let extract = item(&items, "le1");
    assert!(extract.reference("sample").is_none());
    assert_collection(extract, "treatments", &["t_missing"]);
    assert!(report
        .diagnostics
        .contains(&Diagnostic::missing("le1", "treatments")));
    assert!(sink.is_closed());
}

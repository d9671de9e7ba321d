//! Translation through the file and database adapters

mod common;

use common::*;
use itemgraph_store::{
    read_items_jsonl, BatchConfig, BufferedItemWriter, JsonlItemWriter, SourceGraphReader,
    TargetGraphSink,
};
use itemgraph_translate::{TranslationDriver, RESULTS_COLLECTION};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Write the fixture graph as a JSON-lines source file
fn write_source(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("mage.jsonl");
    let mut writer = JsonlItemWriter::create(&path).unwrap();
    writer.store_all(full_graph().into_items()).unwrap();
    writer.close().unwrap();
    path
}

#[test]
fn test_jsonl_to_jsonl() {
    let dir = TempDir::new().unwrap();
    let source = read_items_jsonl(write_source(&dir)).unwrap();
    let expected = run_sorted(&source);

    let out_path = dir.path().join("genomic.jsonl");
    let mapping = mage_mapping();
    let mut writer = BufferedItemWriter::with_config(
        JsonlItemWriter::create(&out_path).unwrap(),
        BatchConfig {
            batch_size: 4,
            ..Default::default()
        },
    )
    .unwrap();

    let report = TranslationDriver::new(&source, &mapping, test_config())
        .unwrap()
        .run(&mut writer)
        .unwrap();

    let output = read_items_jsonl(&out_path).unwrap();
    assert_eq!(output.len(), report.total_items());

    let mut items: Vec<_> = output.iter().map(|item| (**item).clone()).collect();
    items.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    assert_eq!(items, expected);
}

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use itemgraph_store::SqliteItemStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sqlite_source_and_target() {
        let dir = TempDir::new().unwrap();

        // Source graph loaded into SQLite first
        let mut source = SqliteItemStore::open(dir.path().join("mage.db")).unwrap();
        source.store_all(full_graph().into_items()).unwrap();
        source.close().unwrap();
        assert_eq!(source.item_count().unwrap(), full_graph().items().len());

        let mapping = mage_mapping();
        let mut target = SqliteItemStore::open(dir.path().join("genomic.db")).unwrap();
        let report = TranslationDriver::new(&source, &mapping, test_config())
            .unwrap()
            .run(&mut target)
            .unwrap();

        assert_eq!(target.item_count().unwrap(), report.total_items());
        assert_eq!(target.count_class(&format!("{}Author", GENOMIC_NS)).unwrap(), 2);

        let gene = target.get_item_by_id("bs1_gene").unwrap().unwrap();
        assert_eq!(gene.attribute("organismDbId"), Some("FBgn0000001"));
        assert_eq!(
            gene.collection(RESULTS_COLLECTION).unwrap(),
            &["bad1".to_string(), "bad2".to_string(), "bad3".to_string()]
        );

        let extract = target.get_item_by_id("le1").unwrap().unwrap();
        assert_eq!(
            extract.collection("treatments").unwrap(),
            &["t1".to_string(), "t2".to_string()]
        );

        // Same graph as the in-memory run
        let expected = run_sorted(&full_graph().build());
        let mut stored: Vec<_> = target
            .item_ids()
            .unwrap()
            .iter()
            .map(|id| (*target.get_item_by_id(id).unwrap().unwrap()).clone())
            .collect();
        stored.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        assert_eq!(stored, expected);

        // Closed by the driver
        assert!(target.store((*gene).clone()).is_err());
    }
}

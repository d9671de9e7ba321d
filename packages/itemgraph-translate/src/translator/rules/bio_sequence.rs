//! Biological sequences, their database cross-references and genes

use itemgraph_store::Item;

use super::companion_id;
use crate::errors::{Result, TranslateError};
use crate::translator::{DeferredKind, RuleContext};

const FLYBASE: &str = "flybase";
const EMBL: &str = "embl";

/// DatabaseEntry → DatabaseEntry
pub fn database_entry(_ctx: &mut RuleContext<'_>, tgt: &mut Item) {
    tgt.add_attribute("type", "accession");
}

/// Target subclass selected by the sequence type vocabulary
fn subclass_for(sequence_type: &str) -> Option<&'static str> {
    match sequence_type {
        "genomic_DNA" => Some("NuclearDNA"),
        "cDNA_clone" => Some("CDNAClone"),
        _ => None,
    }
}

/// BioSequence → BioEntity (or NuclearDNA / CDNAClone)
///
/// A FlyBase cross-reference yields a companion `Gene`; the first EMBL
/// accession becomes the entity's `identifier`. Both the entity and the gene
/// wait for phase 2, which attaches their experimental results.
pub fn bio_entity(ctx: &mut RuleContext<'_>, tgt: &mut Item) -> Result<()> {
    let src = ctx.src;

    tgt.references.remove("type");
    if let Some(sequence_type) = ctx.vocabulary_value(src, "type")? {
        if let Some(subclass) = subclass_for(&sequence_type) {
            tgt.set_class_name(ctx.target_class(subclass));
        }
    }

    tgt.remove_collection("sequenceDatabases");
    if src.has_collection("sequenceDatabases") {
        let mut flybase: Vec<(String, String)> = Vec::new();
        let mut embl_entries = Vec::new();

        for entry in ctx.follow_all(src, "sequenceDatabases")? {
            if !entry.has_reference("database") {
                continue;
            }
            let Some(accession) = ctx.attribute_of(&entry, "accession") else {
                continue;
            };
            let Some(database) = ctx.follow(&entry, "database")? else {
                continue;
            };
            match database.attribute("name") {
                Some(FLYBASE) => flybase.push((entry.identifier.clone(), accession)),
                Some(EMBL) => {
                    if embl_entries.is_empty() {
                        tgt.add_attribute("identifier", accession);
                    }
                    embl_entries.push(entry.identifier.clone());
                }
                Some(_) => {}
                None => ctx.note_missing(&database.identifier, "name"),
            }
        }

        tgt.add_collection("synonyms", embl_entries);

        if let Some((_, organism_db_id)) = flybase.first() {
            if let Some((_, other)) = flybase.iter().find(|(_, acc)| acc != organism_db_id) {
                return Err(TranslateError::inconsistent(
                    &src.identifier,
                    "sequenceDatabases",
                    organism_db_id.clone(),
                    other.clone(),
                ));
            }

            let gene_id = companion_id(&src.identifier, "gene");
            let mut gene = ctx.create_item(gene_id.clone(), "Gene");
            gene.add_attribute("organismDbId", organism_db_id.clone());
            gene.add_collection(
                "synonyms",
                flybase.iter().map(|(entry, _)| entry.clone()).collect(),
            );

            ctx.index.register_gene(&gene_id, &tgt.identifier);
            ctx.defer(DeferredKind::Gene, gene);
        }
    }

    ctx.defer_target(DeferredKind::BioEntity);
    Ok(())
}

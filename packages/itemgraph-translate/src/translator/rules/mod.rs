//! Class-specific translation rules
//!
//! Each rule receives the generically mapped target item and completes it.
//! Fields a rule re-expresses in a different shape are removed from the
//! target so a passthrough mapping never leaves the source shape behind.

pub mod array_design;
pub mod bio_material;
pub mod bio_sequence;
pub mod experiment;
pub mod publication;

use itemgraph_store::Item;

/// Copy an attribute of `from` onto `tgt`, when present
fn copy_attribute(from: &Item, tgt: &mut Item, name: &str) {
    if let Some(value) = from.attribute(name) {
        tgt.add_attribute(name, value);
    }
}

/// Companion identifiers derive from the source identifier only, so the
/// output does not depend on translation order
fn companion_id(source_id: &str, role: &str) -> String {
    format!("{}_{}", source_id, role)
}

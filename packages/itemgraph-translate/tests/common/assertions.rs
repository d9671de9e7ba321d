//! Custom assertions for translated graphs

use itemgraph_store::Item;

use super::GENOMIC_NS;

/// Find an item by identifier, failing with the available identifiers
pub fn item<'a>(items: &'a [Item], id: &str) -> &'a Item {
    items
        .iter()
        .find(|i| i.identifier == id)
        .unwrap_or_else(|| {
            panic!(
                "Expected item '{id}', available: {:?}",
                items.iter().map(|i| &i.identifier).collect::<Vec<_>>()
            )
        })
}

/// Assert the unqualified target class of an item
pub fn assert_class(item: &Item, fragment: &str) {
    assert_eq!(
        item.class_name,
        format!("{}{}", GENOMIC_NS, fragment),
        "Unexpected class for '{}'",
        item.identifier
    );
}

/// Assert a reference-list's content, in order
pub fn assert_collection(item: &Item, name: &str, expected: &[&str]) {
    let actual: Vec<&str> = item
        .collection(name)
        .unwrap_or_else(|| panic!("'{}' has no collection '{name}'", item.identifier))
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(actual, expected, "Collection '{name}' of '{}'", item.identifier);
}

/// Assert that identifiers are unique
pub fn assert_unique_ids(items: &[Item]) {
    let mut ids: Vec<&str> = items.iter().map(|i| i.identifier.as_str()).collect();
    ids.sort_unstable();
    let before = ids.len();
    ids.dedup();
    assert_eq!(before, ids.len(), "Duplicate identifiers in output");
}

/// Count items of a target class
pub fn count_class(items: &[Item], fragment: &str) -> usize {
    let class_name = format!("{}{}", GENOMIC_NS, fragment);
    items.iter().filter(|i| i.class_name == class_name).count()
}

//! Publications and their authors

use itemgraph_store::Item;

use super::companion_id;
use crate::errors::Result;
use crate::translator::RuleContext;

/// Separator of the composite `authors` attribute
const AUTHOR_SEPARATOR: char = ';';

/// BibliographicReference → Publication
///
/// Each non-empty `;`-separated name in `authors` becomes an `Author` item,
/// linked through the `authors` collection.
pub fn authors(ctx: &mut RuleContext<'_>, tgt: &mut Item) -> Result<()> {
    let src = ctx.src;
    tgt.remove_attribute("authors");

    let Some(authors) = ctx.attribute_of(src, "authors") else {
        return Ok(());
    };

    let names = parse_authors(&authors);
    let mut author_ids = Vec::with_capacity(names.len());
    for (n, name) in names.into_iter().enumerate() {
        let id = companion_id(&src.identifier, &format!("author_{}", n + 1));
        let mut author = ctx.create_item(id.clone(), "Author");
        author.add_attribute("name", name);
        ctx.emit(author);
        author_ids.push(id);
    }

    tgt.add_collection("authors", author_ids);
    Ok(())
}

/// Split a composite author string into trimmed, non-empty names
pub fn parse_authors(authors: &str) -> Vec<&str> {
    authors
        .split(AUTHOR_SEPARATOR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

//! ItemGraph Translate - two-phase item graph translation
//!
//! Converts a source item graph (MAGE microarray model) into a target graph
//! (genomic model). Most classes are translated by a declarative field mapping;
//! twelve classes carry a dedicated rule that flattens multi-hop traversals and
//! creates companion items.
//!
//! ## Phases
//!
//! 1. **Per-item translation** (parallel): every source item is mapped and its
//!    rule applied. Finished items go to the sink window by window; facts only
//!    the whole graph can answer are registered in the [`CrossReferenceIndex`]
//!    and the affected items are deferred.
//! 2. **Deferred joins** (parallel): after the index is frozen, the
//!    [`DeferredJoinResolver`] completes the deferred items.
//!
//! The sink is closed only when both phases succeed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use itemgraph_store::{read_items_jsonl, MemoryItemSink};
//! use itemgraph_translate::{translate, FieldMapping, DEFAULT_TARGET_NAMESPACE};
//!
//! let source = read_items_jsonl("mage.jsonl")?;
//! let mapping = FieldMapping::builtin_mage()?;
//! let mut sink = MemoryItemSink::new();
//!
//! let report = translate(&source, &mapping, DEFAULT_TARGET_NAMESPACE, &mut sink)?;
//! println!("{} items", report.total_items());
//! ```

pub mod config;
pub mod driver;
pub mod errors;
pub mod index;
pub mod mapping;
pub mod resolver;
pub mod translator;

pub use config::{
    ConfigError, ConfigResult, ParallelConfig, TranslationConfig, DEFAULT_TARGET_NAMESPACE,
};
pub use driver::{translate, TranslationDriver, TranslationReport};
pub use errors::{Diagnostic, Result, TranslateError};
pub use index::{CrossReferenceIndex, FrozenIndex, IndexMap, Multiplicity};
pub use mapping::{ClassMapping, ClassRule, FieldMapping};
pub use resolver::{DeferredCounts, DeferredJoinResolver, DeferredQueues, RESULTS_COLLECTION};
pub use translator::{DeferredKind, ItemTranslator, SourceClass, Translation};

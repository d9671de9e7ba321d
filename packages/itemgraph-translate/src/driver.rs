//! Two-phase translation run
//!
//! ```text
//! phase 1   source ids ─► windows ─► par_iter(ItemTranslator) ─► sink.store_all
//!                                        │
//!                                        ├─► CrossReferenceIndex
//!                                        └─► DeferredQueues
//! barrier   CrossReferenceIndex::freeze
//! phase 2   DeferredJoinResolver ─► sink.store_all ─► sink.close
//! ```
//!
//! The sink is closed only after both phases succeeded. A fatal error returns
//! immediately and leaves the sink open, so nothing is committed.

use chrono::{DateTime, Utc};
use itemgraph_store::{Item, SourceGraphReader, StorageError, TargetGraphSink};
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::TranslationConfig;
use crate::errors::{Diagnostic, Result, TranslateError};
use crate::index::{CrossReferenceIndex, FrozenIndex};
use crate::mapping::ClassMapping;
use crate::resolver::{DeferredCounts, DeferredJoinResolver, DeferredQueues};
use crate::translator::{ItemTranslator, Translation};

/// Summary of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct TranslationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: u64,
    /// Threads in the pool both phases ran on
    pub workers: usize,
    /// Source items read
    pub source_items: usize,
    /// Items stored during phase 1
    pub emitted_items: usize,
    /// Items stored during phase 2
    pub resolved_items: usize,
    pub deferred: DeferredCounts,
    /// Sorted recoverable findings
    pub diagnostics: Vec<Diagnostic>,
}

impl TranslationReport {
    /// Total items written to the sink
    pub fn total_items(&self) -> usize {
        self.emitted_items + self.resolved_items
    }
}

/// Runs both translation phases against one sink
pub struct TranslationDriver<'a> {
    reader: &'a dyn SourceGraphReader,
    mapping: &'a dyn ClassMapping,
    config: TranslationConfig,
}

impl<'a> TranslationDriver<'a> {
    pub fn new(
        reader: &'a dyn SourceGraphReader,
        mapping: &'a dyn ClassMapping,
        config: TranslationConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            reader,
            mapping,
            config,
        })
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    /// Translate the whole source graph into `sink`
    pub fn run<S>(&self, sink: &mut S) -> Result<TranslationReport>
    where
        S: TargetGraphSink + ?Sized,
    {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();

        let result = self.run_phases(run_id, sink);
        if let Err(e) = &result {
            error!(
                %run_id,
                item_id = e.item_id().unwrap_or(""),
                field = e.field().unwrap_or(""),
                "Translation aborted: {}",
                e
            );
        }
        let outcome = result?;

        let report = TranslationReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            duration_ms: start.elapsed().as_millis() as u64,
            workers: outcome.workers,
            source_items: outcome.source_items,
            emitted_items: outcome.emitted_items,
            resolved_items: outcome.resolved_items,
            deferred: outcome.deferred,
            diagnostics: outcome.diagnostics,
        };

        info!(
            %run_id,
            source_items = report.source_items,
            total_items = report.total_items(),
            diagnostics = report.diagnostics.len(),
            duration_ms = report.duration_ms,
            "Translation finished"
        );

        Ok(report)
    }

    fn run_phases<S>(&self, run_id: Uuid, sink: &mut S) -> Result<RunOutcome>
    where
        S: TargetGraphSink + ?Sized,
    {
        let workers = self.config.parallel.effective_workers();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| TranslateError::WorkerPool(e.to_string()))?;

        // Sorted so windows, and therefore sink batches, are reproducible
        let mut ids = self.reader.item_ids()?;
        ids.sort_unstable();

        info!(%run_id, source_items = ids.len(), workers, "Phase 1: translating items");

        let translator =
            ItemTranslator::new(self.reader, self.mapping, self.config.target_namespace.as_str());
        let index = CrossReferenceIndex::new();
        let mut queues = DeferredQueues::new();
        let mut diagnostics = Vec::new();
        let mut emitted_items = 0;

        for (window_no, window) in ids.chunks(self.config.parallel.batch_size).enumerate() {
            let translations: Vec<Translation> = pool.install(|| {
                window
                    .par_iter()
                    .map(|id| {
                        let item = self
                            .reader
                            .get_item_by_id(id)?
                            .ok_or_else(|| StorageError::item_not_found(id.as_str()))?;
                        translator.translate(&item, &index)
                    })
                    .collect::<Result<Vec<_>>>()
            })?;

            let mut finished: Vec<Item> = Vec::new();
            for translation in translations {
                finished.extend(translation.items);
                queues.extend(translation.deferred);
                diagnostics.extend(translation.diagnostics);
            }

            debug!(window = window_no, items = finished.len(), "Window translated");
            emitted_items += finished.len();
            if !finished.is_empty() {
                sink.store_all(finished)?;
            }
        }

        diagnostics.sort();
        for diagnostic in &diagnostics {
            debug!(%run_id, "{}", diagnostic);
        }

        let deferred = queues.counts();
        info!(
            %run_id,
            emitted_items,
            deferred_items = queues.len(),
            "Phase barrier: freezing cross-reference index"
        );
        let frozen = freeze_on(&pool, index)?;

        info!(%run_id, "Phase 2: resolving deferred items");
        let resolved = pool.install(|| DeferredJoinResolver::new(&frozen).resolve(&queues));
        let resolved_items = resolved.len();
        if !resolved.is_empty() {
            sink.store_all(resolved)?;
        }

        sink.close()?;

        Ok(RunOutcome {
            workers: pool.current_num_threads(),
            source_items: ids.len(),
            emitted_items,
            resolved_items,
            deferred,
            diagnostics,
        })
    }
}

/// Freeze on the run's pool so the barrier honours `num_workers`
fn freeze_on(pool: &rayon::ThreadPool, index: CrossReferenceIndex) -> Result<FrozenIndex> {
    pool.install(|| {
        debug!(threads = rayon::current_num_threads(), "Freezing index");
        index.freeze()
    })
}

struct RunOutcome {
    workers: usize,
    source_items: usize,
    emitted_items: usize,
    resolved_items: usize,
    deferred: DeferredCounts,
    diagnostics: Vec<Diagnostic>,
}

/// Translate with the default configuration and the given target namespace
pub fn translate<S>(
    reader: &dyn SourceGraphReader,
    mapping: &dyn ClassMapping,
    target_namespace: &str,
    sink: &mut S,
) -> Result<TranslationReport>
where
    S: TargetGraphSink + ?Sized,
{
    let config = TranslationConfig::default().with_target_namespace(target_namespace);
    TranslationDriver::new(reader, mapping, config)?.run(sink)
}

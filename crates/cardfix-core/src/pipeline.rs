//! Load, back up, rewrite
//!
//! Every run reads its inputs in full before touching the store, writes a
//! backup of the pre-run collection, transforms the cards in memory, and
//! saves them sorted by id. Nothing is written if any input fails to load.
//! Concurrent runs against the same store are not supported.

use crate::batch::BatchFile;
use crate::card::Card;
use crate::dedupe::{dedupe_names, DedupeReport};
use crate::error::{Error, Result};
use crate::loader::{CorrectionSet, SourceKind};
use crate::rarity::{assign_rarity, load_costs, RarityReport};
use crate::reconcile::{CardIndex, ReconcileReport};
use crate::store::CardStore;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::info;

/// A correction source loaded into memory
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub kind: SourceKind,
    pub path: PathBuf,
    pub set: CorrectionSet,
}

impl LoadedSource {
    /// Load a source, failing if its kind requires corrections and none parsed
    pub fn load(kind: SourceKind, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let set = kind.load(&path)?;
        info!(
            source = %path.display(),
            kind = %kind,
            corrections = set.len(),
            skipped = set.skipped.len(),
            "loaded corrections"
        );

        if set.is_empty() && kind.requires_corrections() {
            return Err(Error::NoCorrections(path));
        }

        Ok(Self { kind, path, set })
    }
}

/// Reconciliation result for one source
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub kind: SourceKind,
    pub path: PathBuf,
    pub report: ReconcileReport,
}

impl SourceReport {
    /// The count this source's kind reports (cards or fields)
    pub fn updates(&self) -> usize {
        self.kind.update_count(&self.report)
    }
}

/// Result of a store rewrite
#[derive(Debug, Clone)]
pub struct Rewrite<T> {
    pub outcome: T,
    /// Cards in the saved store
    pub cards: usize,
    pub backup: PathBuf,
    pub saved: PathBuf,
}

/// Load the store, back it up, transform it, and save it sorted by id
pub fn rewrite_store<T, F>(store: &CardStore, transform: F) -> Result<Rewrite<T>>
where
    F: FnOnce(&mut Vec<Card>) -> T,
{
    let original = store.load()?;
    let backup = store.write_backup(&original)?;

    let mut cards = original;
    let outcome = transform(&mut cards);
    let cards = CardIndex::new(cards).into_cards();

    store.save(&cards)?;

    Ok(Rewrite {
        outcome,
        cards: cards.len(),
        backup,
        saved: store.path().to_path_buf(),
    })
}

/// Reconcile loaded sources into the store, in order
pub fn reconcile_store(
    store: &CardStore,
    sources: &[LoadedSource],
) -> Result<Rewrite<Vec<SourceReport>>> {
    rewrite_store(store, |cards| {
        let mut index = CardIndex::new(std::mem::take(cards));
        let reports: Vec<SourceReport> = sources
            .iter()
            .map(|source| {
                let report = index.apply(&source.set.corrections, source.kind.merge_policy());
                info!(
                    source = %source.path.display(),
                    cards_changed = report.cards_changed(),
                    fields_changed = report.fields_changed,
                    unknown_ids = report.unknown_ids.len(),
                    "reconciled"
                );
                SourceReport {
                    kind: source.kind,
                    path: source.path.clone(),
                    report,
                }
            })
            .collect();
        *cards = index.into_cards();
        reports
    })
}

/// Load every source of a batch, then reconcile them into its store
pub fn run_batch(batch: &BatchFile) -> Result<Rewrite<Vec<SourceReport>>> {
    let sources = batch
        .sources
        .iter()
        .map(|s| LoadedSource::load(s.kind, &s.path))
        .collect::<Result<Vec<_>>>()?;

    reconcile_store(&CardStore::new(&batch.cards), &sources)
}

/// Assign rarities from the starchip costs in an authoritative source
pub fn run_rarity(store: &CardStore, source: &Path) -> Result<Rewrite<RarityReport>> {
    let costs = load_costs(source)?;
    info!(source = %source.display(), costs = costs.len(), "loaded starchip costs");
    rewrite_store(store, |cards| assign_rarity(cards, &costs))
}

/// Rename duplicate card names within the given id range
pub fn run_dedupe(
    store: &CardStore,
    renamable: &RangeInclusive<u32>,
) -> Result<Rewrite<DedupeReport>> {
    rewrite_store(store, |cards| dedupe_names(cards, renamable))
}

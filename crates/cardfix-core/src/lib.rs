//! cardfix-core: Core library for reconciling a card database against correction sources
//!
//! This library provides functionality to:
//! - Parse tab-separated authoritative and wiki exports into correction records
//! - Parse manually reviewed corrections from CSV
//! - Merge corrections into the canonical card collection with per-field change detection
//! - Back up and atomically rewrite the canonical JSON store
//! - Assign rarities from starchip costs and resolve duplicate card names

pub mod batch;
pub mod card;
pub mod dedupe;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod rarity;
pub mod reconcile;
pub mod source;
pub mod store;

pub use batch::{BatchFile, BatchSource};
pub use card::{Card, CardType, Correction, MonsterStats};
pub use dedupe::{dedupe_names, DedupeReport, Rename, DEFAULT_RENAMABLE_IDS};
pub use error::{Error, LineError, Result};
pub use loader::{load_manual_corrections, load_source, CorrectionSet, SkippedLine, SourceKind};
pub use pipeline::{
    reconcile_store, rewrite_store, run_batch, run_dedupe, run_rarity, LoadedSource, Rewrite,
    SourceReport,
};
pub use rarity::{assign_rarity, Rarity, RarityReport};
pub use reconcile::{
    reconcile, CardChange, CardIndex, MergePolicy, ReconcileReport, Reconciliation,
};
pub use source::{parse_line, parse_optional_int, SourceFormat};
pub use store::CardStore;

//! Reconciliation of correction records into the canonical card collection

use crate::card::{Card, Correction, MONSTER_FIELDS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// How a correction field is applied to a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Apply every field whose value differs, including empty and zero values
    Overwrite,
    /// Apply only fields whose value is truthy (non-empty, non-zero, non-null)
    OverwriteIfTruthy,
}

impl MergePolicy {
    /// Whether a correction value may be written under this policy
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            MergePolicy::Overwrite => true,
            MergePolicy::OverwriteIfTruthy => is_truthy(value),
        }
    }
}

/// JSON truthiness: null, false, 0, "", [] and {} are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// What changed on a single card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardChange {
    pub id: u32,
    /// Name after the merge
    pub name: String,
    /// Fields written with a new value
    pub updated: Vec<&'static str>,
    /// Monster fields removed from a spell or trap
    pub stripped: Vec<&'static str>,
}

impl CardChange {
    fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.stripped.is_empty()
    }
}

/// Counters for one reconciliation pass
///
/// `cards_changed` and `fields_changed` measure different things; each
/// source kind reports the one that matches its flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Cards that changed, in id order
    pub changes: Vec<CardChange>,
    /// Corrections whose id matched a card, changed or not
    pub corrections_applied: usize,
    /// Number of field writes across all cards
    pub fields_changed: usize,
    /// Number of monster fields stripped across all cards
    pub fields_stripped: usize,
    /// Correction ids with no card in the collection
    pub unknown_ids: Vec<u32>,
}

impl ReconcileReport {
    /// Number of distinct cards that changed
    pub fn cards_changed(&self) -> usize {
        self.changes.len()
    }

    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

/// The canonical collection indexed by id
#[derive(Debug, Clone, Default)]
pub struct CardIndex {
    cards: BTreeMap<u32, Card>,
    /// Cards without a usable id, kept in their original order
    unkeyed: Vec<Card>,
}

impl CardIndex {
    /// Index cards by id; a later duplicate id replaces the earlier card
    pub fn new(cards: Vec<Card>) -> Self {
        let mut index = Self::default();
        for card in cards {
            match card.id() {
                Some(id) => {
                    if index.cards.insert(id, card).is_some() {
                        warn!(id, "duplicate card id in collection, keeping the later card");
                    }
                }
                None => index.unkeyed.push(card),
            }
        }
        index
    }

    /// Merge corrections into the indexed cards
    pub fn apply(
        &mut self,
        corrections: &BTreeMap<u32, Correction>,
        policy: MergePolicy,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for (&id, correction) in corrections {
            let Some(card) = self.cards.get_mut(&id) else {
                report.unknown_ids.push(id);
                continue;
            };
            report.corrections_applied += 1;

            let change = merge_card(card, correction, policy);
            if change.is_empty() {
                continue;
            }

            debug!(
                id,
                name = %change.name,
                updated = ?change.updated,
                stripped = ?change.stripped,
                "card updated"
            );
            report.fields_changed += change.updated.len();
            report.fields_stripped += change.stripped.len();
            report.changes.push(change);
        }

        report
    }

    /// Cards sorted ascending by id, followed by any cards without an id
    pub fn into_cards(self) -> Vec<Card> {
        self.cards.into_values().chain(self.unkeyed).collect()
    }
}

/// Merge one correction into one card
fn merge_card(card: &mut Card, correction: &Correction, policy: MergePolicy) -> CardChange {
    let mut updated = Vec::new();
    for (name, value) in correction.fields() {
        if policy.accepts(&value) && card.set(name, value) {
            updated.push(name);
        }
    }

    let mut stripped = Vec::new();
    if correction.card_type.forbids_monster_fields() {
        for name in MONSTER_FIELDS {
            if card.remove(name) {
                stripped.push(name);
            }
        }
    }

    CardChange {
        id: correction.id,
        name: card.name().unwrap_or_default().to_string(),
        updated,
        stripped,
    }
}

/// Result of reconciling a collection
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Merged cards, sorted ascending by id
    pub cards: Vec<Card>,
    pub report: ReconcileReport,
}

/// Merge corrections into a card collection
///
/// Corrections for ids not in the collection are ignored; no card is ever
/// inserted.
pub fn reconcile(
    cards: Vec<Card>,
    corrections: &BTreeMap<u32, Correction>,
    policy: MergePolicy,
) -> Reconciliation {
    let mut index = CardIndex::new(cards);
    let report = index.apply(corrections, policy);
    Reconciliation {
        cards: index.into_cards(),
        report,
    }
}

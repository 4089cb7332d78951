//! Duplicate card-name resolution
//!
//! The first card with a given name keeps it. Later cards with the same name
//! are renamed to `"<name> (<id>)"` when their id falls inside the renamable
//! range; cards outside it are left alone.

use crate::card::{field, Card};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use tracing::debug;

/// Ids added after the original roster, which may be renamed
pub const DEFAULT_RENAMABLE_IDS: RangeInclusive<u32> = 301..=656;

/// A single rename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub id: u32,
    pub from: String,
    pub to: String,
}

/// Outcome of a dedupe pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupeReport {
    /// Names shared by more than one card before the pass
    pub duplicated_names: usize,
    pub renames: Vec<Rename>,
    /// Names still shared by more than one card after the pass
    pub remaining_duplicates: usize,
}

/// Rename later duplicates, walking cards in collection order
pub fn dedupe_names(cards: &mut [Card], renamable: &RangeInclusive<u32>) -> DedupeReport {
    let mut report = DedupeReport {
        duplicated_names: count_duplicated_names(cards),
        ..Default::default()
    };

    let mut seen: HashSet<String> = HashSet::new();
    for card in cards.iter_mut() {
        let (Some(id), Some(name)) = (card.id(), card.name().map(str::to_string)) else {
            continue;
        };

        if seen.insert(name.clone()) {
            continue;
        }

        if renamable.contains(&id) {
            let to = format!("{} ({})", name, id);
            debug!(id, from = %name, to = %to, "renaming duplicate card");
            card.set(field::NAME, Value::from(to.as_str()));
            report.renames.push(Rename { id, from: name, to });
        }
    }

    report.remaining_duplicates = count_duplicated_names(cards);
    report
}

fn count_duplicated_names(cards: &[Card]) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in cards.iter().filter_map(Card::name) {
        *counts.entry(name).or_default() += 1;
    }
    counts.values().filter(|&&n| n > 1).count()
}

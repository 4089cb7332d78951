//! Rarity assignment from starchip costs
//!
//! The authoritative export carries a starchip cost in its ninth column.
//! Cards with a known cost get a rarity tier from it; all others get a
//! default based on their type.

use crate::card::{field, Card, CardType};
use crate::error::{Error, Result};
use crate::source::{is_ignored_line, parse_digits, parse_optional_int};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Zero-based column holding the starchip cost
const COST_COLUMN: usize = 8;

/// Rarity tiers, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    #[serde(rename = "Super Rare")]
    SuperRare,
    #[serde(rename = "Ultra Rare")]
    UltraRare,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::SuperRare,
        Rarity::UltraRare,
    ];

    /// Tier for a starchip cost; event cards (999,999) land in Ultra Rare
    pub fn from_cost(cost: u32) -> Self {
        match cost {
            2000.. => Rarity::UltraRare,
            501.. => Rarity::SuperRare,
            101.. => Rarity::Rare,
            _ => Rarity::Common,
        }
    }

    /// Tier for a card with no cost data
    pub fn default_for(card_type: Option<&CardType>) -> Self {
        match card_type {
            Some(t) if t.forbids_monster_fields() => Rarity::Rare,
            _ => Rarity::Common,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::SuperRare => "Super Rare",
            Rarity::UltraRare => "Ultra Rare",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract `(id, cost)` from one authoritative line with a cost column
pub fn parse_cost_line(line: &str) -> Option<(u32, u32)> {
    if is_ignored_line(line) {
        return None;
    }
    let parts: Vec<&str> = line.split('\t').collect();
    let id = parse_digits(parts.first()?.trim())?;
    let cost = parse_optional_int(parts.get(COST_COLUMN)?.trim())?;
    Some((id, cost))
}

/// Parse starchip costs from a string (useful for testing)
pub fn parse_costs_str(content: &str) -> BTreeMap<u32, u32> {
    content.lines().filter_map(parse_cost_line).collect()
}

/// Load starchip costs from an authoritative source file
pub fn load_costs<P: AsRef<Path>>(path: P) -> Result<BTreeMap<u32, u32>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_costs_str(&content))
}

/// Outcome of a rarity pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RarityReport {
    /// Cards whose rarity came from a cost
    pub from_cost: usize,
    /// Cards that fell back to a type default
    pub defaulted: usize,
    /// Cards whose stored rarity actually changed
    pub changed: usize,
    /// Number of cards per tier after the pass
    pub distribution: BTreeMap<Rarity, usize>,
}

/// Set the `rarity` field on every card
pub fn assign_rarity(cards: &mut [Card], costs: &BTreeMap<u32, u32>) -> RarityReport {
    let mut report = RarityReport::default();
    for rarity in Rarity::ALL {
        report.distribution.insert(rarity, 0);
    }

    for card in cards.iter_mut() {
        let cost = card.id().and_then(|id| costs.get(&id));
        let rarity = match cost {
            Some(&cost) => {
                report.from_cost += 1;
                Rarity::from_cost(cost)
            }
            None => {
                report.defaulted += 1;
                Rarity::default_for(card.card_type().as_ref())
            }
        };

        if card.set(field::RARITY, Value::from(rarity.as_str())) {
            report.changed += 1;
        }
        *report.distribution.entry(rarity).or_default() += 1;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rarity_from_cost() {
        assert_eq!(Rarity::from_cost(10), Rarity::Common);
        assert_eq!(Rarity::from_cost(100), Rarity::Common);
        assert_eq!(Rarity::from_cost(101), Rarity::Rare);
        assert_eq!(Rarity::from_cost(500), Rarity::Rare);
        assert_eq!(Rarity::from_cost(501), Rarity::SuperRare);
        assert_eq!(Rarity::from_cost(1999), Rarity::SuperRare);
        assert_eq!(Rarity::from_cost(2000), Rarity::UltraRare);
        assert_eq!(Rarity::from_cost(999_999), Rarity::UltraRare);
    }

    #[test]
    fn test_parse_cost_line() {
        assert_eq!(
            parse_cost_line("001\tBlue-eyes White Dragon\tMonster\tDragon\t8\t3000\t2500\t89631139\t999,999"),
            Some((1, 999_999))
        );
        assert_eq!(parse_cost_line("2\tDark Hole\tSpell"), None);
        assert_eq!(parse_cost_line("3\tX\tMonster\t\t\t\t\t\t?"), None);
    }

    #[test]
    fn test_assign_rarity() {
        let mut cards: Vec<Card> = serde_json::from_value(json!([
            {"id": 1, "name": "Blue-eyes White Dragon", "type": "Monster"},
            {"id": 2, "name": "Dark Hole", "type": "Spell"},
            {"id": 3, "name": "Kuriboh", "type": "Monster"},
            {"id": 4, "name": "Mystical Elf", "type": "Monster", "rarity": "Rare"}
        ]))
        .unwrap();
        let costs = parse_costs_str("1\ta\tMonster\t\t\t\t\t0\t999,999\n4\tb\tMonster\t\t\t\t\t0\t150\n");

        let report = assign_rarity(&mut cards, &costs);

        assert_eq!(cards[0].get("rarity"), Some(&json!("Ultra Rare")));
        assert_eq!(cards[1].get("rarity"), Some(&json!("Rare")));
        assert_eq!(cards[2].get("rarity"), Some(&json!("Common")));
        assert_eq!(cards[3].get("rarity"), Some(&json!("Rare")));
        assert_eq!(report.from_cost, 2);
        assert_eq!(report.defaulted, 2);
        assert_eq!(report.changed, 3);
        assert_eq!(report.distribution[&Rarity::Rare], 2);
        assert_eq!(report.distribution[&Rarity::SuperRare], 0);

        let again = assign_rarity(&mut cards, &costs);
        assert_eq!(again.changed, 0);
    }
}

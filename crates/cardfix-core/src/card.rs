//! Card and correction types
//!
//! Canonical cards keep their full JSON object so that fields this crate does
//! not know about, and the order in which keys were authored, survive a
//! rewrite. Corrections are typed: a base record plus monster stats that a
//! spell or trap correction never carries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Field names used in the canonical store
pub mod field {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const RACE: &str = "race";
    pub const LEVEL: &str = "level";
    pub const ATK: &str = "atk";
    pub const DEF: &str = "def";
    pub const ATTRIBUTE: &str = "attr";
    pub const RARITY: &str = "rarity";
}

/// Fields that only monsters carry
pub const MONSTER_FIELDS: [&str; 4] = [field::ATK, field::DEF, field::RACE, field::LEVEL];

/// Card type after legacy synonyms are folded
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CardType {
    Monster,
    Spell,
    Trap,
    /// Anything else is passed through verbatim
    Other(String),
}

impl CardType {
    /// Parse a raw type column, mapping `Ritual` and `Magic` to `Spell`
    ///
    /// Surrounding whitespace is dropped and known types match in any case.
    pub fn normalize(raw: &str) -> Self {
        let raw = raw.trim();
        let is = |name: &str| raw.eq_ignore_ascii_case(name);

        if is("Monster") {
            CardType::Monster
        } else if is("Spell") || is("Ritual") || is("Magic") {
            CardType::Spell
        } else if is("Trap") {
            CardType::Trap
        } else {
            CardType::Other(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CardType::Monster => "Monster",
            CardType::Spell => "Spell",
            CardType::Trap => "Trap",
            CardType::Other(s) => s,
        }
    }

    pub fn is_monster(&self) -> bool {
        matches!(self, CardType::Monster)
    }

    /// Spells and traps must not carry monster fields
    pub fn forbids_monster_fields(&self) -> bool {
        matches!(self, CardType::Spell | CardType::Trap)
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combat stats carried by monster corrections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonsterStats {
    pub race: Option<String>,
    pub level: Option<u32>,
    pub atk: Option<u32>,
    pub def: Option<u32>,
}

/// A partial card description from an external source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    pub id: u32,
    pub name: String,
    pub card_type: CardType,
    /// Only the manual-correction format carries an attribute
    pub attribute: Option<String>,
    /// Never present for a spell or trap
    pub monster: Option<MonsterStats>,
}

impl Correction {
    /// Create a correction with no monster stats or attribute
    pub fn new(id: u32, name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            id,
            name: name.into(),
            card_type,
            attribute: None,
            monster: None,
        }
    }

    /// Attach monster stats; ignored for spells and traps
    pub fn with_monster(mut self, stats: MonsterStats) -> Self {
        if !self.card_type.forbids_monster_fields() {
            self.monster = Some(stats);
        }
        self
    }

    /// The fields this correction carries, excluding `id`, in the order they
    /// are appended to a card that lacks them
    pub fn fields(&self) -> Vec<(&'static str, Value)> {
        let mut fields = vec![
            (field::NAME, Value::from(self.name.as_str())),
            (field::TYPE, Value::from(self.card_type.as_str())),
        ];

        if let Some(stats) = &self.monster {
            if let Some(race) = &stats.race {
                fields.push((field::RACE, Value::from(race.as_str())));
            }
            if let Some(level) = stats.level {
                fields.push((field::LEVEL, Value::from(level)));
            }
            if let Some(atk) = stats.atk {
                fields.push((field::ATK, Value::from(atk)));
            }
            if let Some(def) = stats.def {
                fields.push((field::DEF, Value::from(def)));
            }
        }

        if let Some(attribute) = &self.attribute {
            fields.push((field::ATTRIBUTE, Value::from(attribute.as_str())));
        }

        fields
    }
}

/// One record of the canonical store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card(Map<String, Value>);

impl Card {
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The card's id, if it is a non-negative integer that fits in a u32
    pub fn id(&self) -> Option<u32> {
        self.0
            .get(field::ID)
            .and_then(Value::as_u64)
            .and_then(|id| u32::try_from(id).ok())
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get(field::NAME).and_then(Value::as_str)
    }

    pub fn card_type(&self) -> Option<CardType> {
        self.0
            .get(field::TYPE)
            .and_then(Value::as_str)
            .map(CardType::normalize)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Set a field, returning whether the stored value changed.
    /// An absent field always counts as different.
    pub fn set(&mut self, name: &str, value: Value) -> bool {
        if self.0.get(name) == Some(&value) {
            return false;
        }
        self.0.insert(name.to_string(), value);
        true
    }

    /// Remove a field, returning whether it was present
    pub fn remove(&mut self, name: &str) -> bool {
        // shift_remove keeps the remaining keys in authored order
        self.0.shift_remove(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card(value: Value) -> Card {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_card_type_normalize() {
        assert_eq!(CardType::normalize("Monster"), CardType::Monster);
        assert_eq!(CardType::normalize("Ritual"), CardType::Spell);
        assert_eq!(CardType::normalize("Magic"), CardType::Spell);
        assert_eq!(CardType::normalize("Trap"), CardType::Trap);
        assert_eq!(
            CardType::normalize("Equip"),
            CardType::Other("Equip".to_string())
        );
        assert_eq!(CardType::normalize("Equip").as_str(), "Equip");
    }

    #[test]
    fn test_card_type_normalize_trims_and_ignores_case() {
        assert_eq!(CardType::normalize(" Monster"), CardType::Monster);
        assert_eq!(CardType::normalize("monster\t"), CardType::Monster);
        assert_eq!(CardType::normalize("TRAP"), CardType::Trap);
        assert_eq!(CardType::normalize("ritual"), CardType::Spell);
        assert_eq!(CardType::normalize(" Equip "), CardType::Other("Equip".to_string()));
        assert_eq!(CardType::normalize(""), CardType::Other(String::new()));
    }

    #[test]
    fn test_with_monster_ignored_for_spells_and_traps() {
        let stats = MonsterStats {
            atk: Some(100),
            ..Default::default()
        };
        let spell = Correction::new(1, "Raigeki", CardType::Spell).with_monster(stats.clone());
        assert!(spell.monster.is_none());

        let trap = Correction::new(3, "Trap Hole", CardType::Trap).with_monster(stats.clone());
        assert!(trap.monster.is_none());

        let untyped = Correction::new(4, "", CardType::normalize("")).with_monster(stats.clone());
        assert_eq!(untyped.monster.unwrap().atk, Some(100));

        let monster = Correction::new(2, "Kuriboh", CardType::Monster).with_monster(stats);
        assert_eq!(monster.monster.unwrap().atk, Some(100));
    }

    #[test]
    fn test_correction_fields_order() {
        let correction = Correction::new(1, "Blue-eyes White Dragon", CardType::Monster)
            .with_monster(MonsterStats {
                race: Some("Dragon".to_string()),
                level: Some(8),
                atk: Some(3000),
                def: None,
            });

        let names: Vec<&str> = correction.fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec!["name", "type", "race", "level", "atk"]);
    }

    #[test]
    fn test_card_accessors() {
        let c = card(json!({"id": 7, "name": "Mystical Elf", "type": "Monster", "atk": 800}));
        assert_eq!(c.id(), Some(7));
        assert_eq!(c.name(), Some("Mystical Elf"));
        assert_eq!(c.card_type(), Some(CardType::Monster));

        let no_id = card(json!({"id": "seven"}));
        assert_eq!(no_id.id(), None);
        let negative = card(json!({"id": -1}));
        assert_eq!(negative.id(), None);
    }

    #[test]
    fn test_card_set_detects_change() {
        let mut c = card(json!({"id": 1, "atk": 100}));
        assert!(!c.set("atk", json!(100)));
        assert!(c.set("atk", json!(200)));
        assert!(c.set("def", json!(0)));
        assert_eq!(c.get("def"), Some(&json!(0)));
    }

    #[test]
    fn test_card_remove_keeps_key_order() {
        let mut c = card(json!({"id": 1, "name": "x", "atk": 1, "type": "Spell", "attr": "DARK"}));
        assert!(c.remove("atk"));
        assert!(!c.remove("atk"));

        let keys: Vec<&str> = c.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "type", "attr"]);
    }
}

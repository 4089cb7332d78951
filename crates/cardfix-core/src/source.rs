//! Line parsers for the tab-separated correction sources
//!
//! Two formats share one parser:
//! - authoritative: `id, name, type[, race, level, atk, def, password, cost]`
//! - wiki: `id, name, type, race, level, atk, def[, password, cost]`

use crate::card::{CardType, Correction, MonsterStats};
use crate::error::LineError;
use serde::{Deserialize, Serialize};

/// Marker left in truncated exports
const TRUNCATION_MARKER: &str = "...";

/// Columns needed before monster stats are read
const MONSTER_COLUMNS: usize = 7;

/// A tab-separated source format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// The "source of truth" export
    Authoritative,
    /// A generic wiki export
    Wiki,
}

impl SourceFormat {
    /// Minimum number of columns a line must have
    pub fn min_columns(self) -> usize {
        match self {
            SourceFormat::Authoritative => 3,
            SourceFormat::Wiki => 7,
        }
    }

    /// Split a line into columns the way this format expects
    pub fn split(self, line: &str) -> Vec<&str> {
        match self {
            // The whole line is trimmed, so trailing empty columns vanish
            SourceFormat::Authoritative => line.trim().split('\t').collect(),
            SourceFormat::Wiki => line.split('\t').map(str::trim).collect(),
        }
    }
}

/// Whether a line is skipped before parsing (blank, comment, or truncated)
pub fn is_ignored_line(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with('#') || line.contains(TRUNCATION_MARKER)
}

/// Parse an optional non-negative integer, tolerating thousands separators
///
/// `"2,500"` parses as 2500; empty strings, signs, and anything non-numeric
/// yield `None`.
pub fn parse_optional_int(s: &str) -> Option<u32> {
    let digits: String = s.chars().filter(|&c| c != ',').collect();
    parse_digits(&digits)
}

/// Parse a strictly numeric string (no separators)
pub fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parse one source line
///
/// Returns `Ok(None)` for lines that are skipped before parsing and
/// `Err` for lines that cannot be parsed.
pub fn parse_line(line: &str, format: SourceFormat) -> Result<Option<Correction>, LineError> {
    if is_ignored_line(line) {
        return Ok(None);
    }

    let parts = format.split(line);
    let required = format.min_columns();
    if parts.len() < required {
        return Err(LineError::TooFewColumns {
            required,
            found: parts.len(),
        });
    }

    let id = parse_id(parts[0])?;
    let card_type = CardType::normalize(parts[2]);
    let mut correction = Correction::new(id, parts[1], card_type);

    if correction.card_type.is_monster() && parts.len() >= MONSTER_COLUMNS {
        correction = correction.with_monster(parse_monster_stats(&parts[3..MONSTER_COLUMNS]));
    }

    Ok(Some(correction))
}

fn parse_id(raw: &str) -> Result<u32, LineError> {
    parse_digits(raw.trim()).ok_or_else(|| LineError::InvalidId(raw.to_string()))
}

/// Parse `race, level, atk, def`
fn parse_monster_stats(cols: &[&str]) -> MonsterStats {
    let race = cols[0];
    MonsterStats {
        race: (!race.is_empty()).then(|| race.to_string()),
        level: parse_digits(cols[1]),
        atk: parse_optional_int(cols[2]),
        def: parse_optional_int(cols[3]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str, format: SourceFormat) -> Correction {
        parse_line(line, format).unwrap().unwrap()
    }

    #[test]
    fn test_parse_optional_int() {
        assert_eq!(parse_optional_int("3000"), Some(3000));
        assert_eq!(parse_optional_int("999,999"), Some(999_999));
        assert_eq!(parse_optional_int("0"), Some(0));
        assert_eq!(parse_optional_int(""), None);
        assert_eq!(parse_optional_int("?"), None);
        assert_eq!(parse_optional_int("-100"), None);
        assert_eq!(parse_optional_int("1.5"), None);
    }

    #[test]
    fn test_parse_digits_rejects_separators() {
        assert_eq!(parse_digits("8"), Some(8));
        assert_eq!(parse_digits("1,0"), None);
        assert_eq!(parse_digits(" 8"), None);
    }

    #[test]
    fn test_parse_authoritative_monster() {
        let c = parse(
            "001\tBlue-eyes White Dragon\tMonster\tDragon\t8\t3,000\t2500\t89631139\t999,999",
            SourceFormat::Authoritative,
        );
        assert_eq!(c.id, 1);
        assert_eq!(c.name, "Blue-eyes White Dragon");
        assert_eq!(c.card_type, CardType::Monster);

        let stats = c.monster.unwrap();
        assert_eq!(stats.race.as_deref(), Some("Dragon"));
        assert_eq!(stats.level, Some(8));
        assert_eq!(stats.atk, Some(3000));
        assert_eq!(stats.def, Some(2500));
    }

    #[test]
    fn test_parse_authoritative_minimal_spell() {
        let c = parse("1\tNewName\tSpell", SourceFormat::Authoritative);
        assert_eq!(c.card_type, CardType::Spell);
        assert!(c.monster.is_none());
    }

    #[test]
    fn test_legacy_types_become_spell() {
        let ritual = parse("5\tBlack Luster Ritual\tRitual", SourceFormat::Authoritative);
        assert_eq!(ritual.card_type, CardType::Spell);

        let magic = parse(
            "6\tDark Hole\tMagic\t\t\t\t",
            SourceFormat::Wiki,
        );
        assert_eq!(magic.card_type, CardType::Spell);
    }

    #[test]
    fn test_non_monster_stats_not_parsed() {
        let c = parse(
            "300\tRaigeki\tSpell\tThunder\t4\t1000\t1000",
            SourceFormat::Authoritative,
        );
        assert!(c.monster.is_none());
    }

    #[test]
    fn test_monster_with_short_line_has_no_stats() {
        let c = parse("2\tMystical Elf\tMonster\tSpellcaster", SourceFormat::Authoritative);
        assert_eq!(c.card_type, CardType::Monster);
        assert!(c.monster.is_none());
    }

    #[test]
    fn test_malformed_stats_are_omitted() {
        let c = parse("3\tKuriboh\tMonster\t\t?\t3OO\t200", SourceFormat::Authoritative);
        let stats = c.monster.unwrap();
        assert_eq!(stats.race, None);
        assert_eq!(stats.level, None);
        assert_eq!(stats.atk, None);
        assert_eq!(stats.def, Some(200));
    }

    #[test]
    fn test_too_few_columns() {
        assert_eq!(
            parse_line("1\tOnlyName", SourceFormat::Authoritative),
            Err(LineError::TooFewColumns {
                required: 3,
                found: 2
            })
        );
        assert_eq!(
            parse_line("1\tName\tMonster\tDragon", SourceFormat::Wiki),
            Err(LineError::TooFewColumns {
                required: 7,
                found: 4
            })
        );
    }

    #[test]
    fn test_trailing_tabs_trimmed_for_authoritative() {
        assert!(matches!(
            parse_line("1\tName\t\t\t", SourceFormat::Authoritative),
            Err(LineError::TooFewColumns { found: 2, .. })
        ));
    }

    #[test]
    fn test_invalid_id() {
        assert_eq!(
            parse_line("abc\tName\tSpell", SourceFormat::Authoritative),
            Err(LineError::InvalidId("abc".to_string()))
        );
        assert_eq!(
            parse_line("-4\tName\tSpell", SourceFormat::Authoritative),
            Err(LineError::InvalidId("-4".to_string()))
        );
    }

    #[test]
    fn test_ignored_lines() {
        assert_eq!(parse_line("", SourceFormat::Wiki), Ok(None));
        assert_eq!(parse_line("   \t  ", SourceFormat::Wiki), Ok(None));
        assert_eq!(parse_line("# ID\tName\tType", SourceFormat::Wiki), Ok(None));
        assert_eq!(
            parse_line("12\tSome Card...\tMonster", SourceFormat::Authoritative),
            Ok(None)
        );
    }

    #[test]
    fn test_wiki_columns_are_trimmed() {
        let c = parse(
            " 10 \t Mystical Elf \tMonster\t Spellcaster \t4\t800\t2,000\t15025844\t50\n",
            SourceFormat::Wiki,
        );
        assert_eq!(c.id, 10);
        assert_eq!(c.name, "Mystical Elf");
        let stats = c.monster.unwrap();
        assert_eq!(stats.race.as_deref(), Some("Spellcaster"));
        assert_eq!(stats.def, Some(2000));
    }
}

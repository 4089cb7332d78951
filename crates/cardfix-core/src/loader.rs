//! Source loaders: whole files to `id -> correction` maps

use crate::card::{CardType, Correction, MonsterStats};
use crate::error::{Error, LineError, Result};
use crate::reconcile::{MergePolicy, ReconcileReport};
use crate::source::{parse_line, parse_optional_int, SourceFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::warn;

/// Status marking a manual-correction row as one to apply
pub const NEEDS_REPLACEMENT: &str = "NEEDS REPLACEMENT";

/// A line that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line (or CSV record) number
    pub line: usize,
    pub reason: LineError,
}

/// Corrections loaded from one source
#[derive(Debug, Clone, Default)]
pub struct CorrectionSet {
    /// Corrections keyed by card id; later lines win
    pub corrections: BTreeMap<u32, Correction>,
    /// Lines that were skipped with a warning
    pub skipped: Vec<SkippedLine>,
}

impl CorrectionSet {
    pub fn len(&self) -> usize {
        self.corrections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }

    fn insert(&mut self, correction: Correction) {
        self.corrections.insert(correction.id, correction);
    }

    fn skip(&mut self, source_name: &str, line: usize, reason: LineError) {
        warn!(source = source_name, line, %reason, "skipping unparseable line");
        self.skipped.push(SkippedLine { line, reason });
    }
}

/// Load a tab-separated source file
pub fn load_source<P: AsRef<Path>>(path: P, format: SourceFormat) -> Result<CorrectionSet> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(parse_source_str(&content, format, &path.display().to_string()))
}

/// Parse a tab-separated source from a string (useful for testing)
pub fn parse_source_str(content: &str, format: SourceFormat, source_name: &str) -> CorrectionSet {
    let mut set = CorrectionSet::default();

    for (idx, line) in content.lines().enumerate() {
        match parse_line(line, format) {
            Ok(Some(correction)) => set.insert(correction),
            Ok(None) => {}
            Err(reason) => set.skip(source_name, idx + 1, reason),
        }
    }

    set
}

/// Load a manual-correction CSV file
pub fn load_manual_corrections<P: AsRef<Path>>(path: P) -> Result<CorrectionSet> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    read_manual_corrections(reader, path)
}

/// Parse a manual-correction CSV from a string (useful for testing)
pub fn parse_manual_corrections_str(content: &str, source_name: &str) -> Result<CorrectionSet> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    read_manual_corrections(reader, Path::new(source_name))
}

/// Header positions of the manual-correction columns
struct ManualColumns {
    id: usize,
    name: Option<usize>,
    atk: Option<usize>,
    def: Option<usize>,
    card_type: Option<usize>,
    attribute: Option<usize>,
    race: Option<usize>,
    level: Option<usize>,
    status: Option<usize>,
}

impl ManualColumns {
    fn from_headers(headers: &csv::StringRecord, path: &Path) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let id = find("ID").ok_or_else(|| Error::CsvParse {
            path: path.to_path_buf(),
            message: "missing 'ID' column".to_string(),
        })?;

        Ok(Self {
            id,
            name: find("Name"),
            atk: find("ATK"),
            def: find("DEF"),
            card_type: find("Type"),
            attribute: find("Attribute"),
            race: find("Race"),
            level: find("Level"),
            status: find("Status"),
        })
    }
}

fn read_manual_corrections<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    path: &Path,
) -> Result<CorrectionSet> {
    let headers = reader.headers().map_err(|e| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;
    let columns = ManualColumns::from_headers(headers, path)?;
    let source_name = path.display().to_string();

    let mut set = CorrectionSet::default();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
        // Header is line 1
        let line = row_idx + 2;

        let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        if cell(columns.status) != NEEDS_REPLACEMENT {
            continue;
        }

        let raw_id = cell(Some(columns.id));
        let Some(id) = parse_optional_int(raw_id.trim()) else {
            set.skip(&source_name, line, LineError::InvalidId(raw_id.to_string()));
            continue;
        };

        let non_empty = |idx: Option<usize>| {
            let value = cell(idx);
            (!value.is_empty()).then(|| value.to_string())
        };

        let card_type = CardType::normalize(cell(columns.card_type));
        let mut correction = Correction::new(id, cell(columns.name), card_type);
        correction.attribute = non_empty(columns.attribute);
        correction = correction.with_monster(MonsterStats {
            race: non_empty(columns.race),
            level: parse_optional_int(cell(columns.level).trim()),
            atk: parse_optional_int(cell(columns.atk).trim()),
            def: parse_optional_int(cell(columns.def).trim()),
        });

        set.insert(correction);
    }

    Ok(set)
}

/// The kinds of correction source, each with its own merge rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Tab-separated source of truth
    Authoritative,
    /// Tab-separated wiki export
    Wiki,
    /// CSV of manually reviewed corrections
    Manual,
}

impl SourceKind {
    /// Load corrections from a file of this kind
    pub fn load<P: AsRef<Path>>(self, path: P) -> Result<CorrectionSet> {
        match self {
            SourceKind::Authoritative => load_source(path, SourceFormat::Authoritative),
            SourceKind::Wiki => load_source(path, SourceFormat::Wiki),
            SourceKind::Manual => load_manual_corrections(path),
        }
    }

    /// Manual corrections only apply truthy values
    pub fn merge_policy(self) -> MergePolicy {
        match self {
            SourceKind::Authoritative | SourceKind::Wiki => MergePolicy::Overwrite,
            SourceKind::Manual => MergePolicy::OverwriteIfTruthy,
        }
    }

    /// The update count this kind reports: changed cards for the
    /// authoritative source, changed fields otherwise
    pub fn update_count(self, report: &ReconcileReport) -> usize {
        match self {
            SourceKind::Authoritative => report.cards_changed(),
            SourceKind::Wiki | SourceKind::Manual => report.fields_changed,
        }
    }

    /// Noun for the unit `update_count` measures
    pub fn update_unit(self) -> &'static str {
        match self {
            SourceKind::Authoritative => "cards",
            SourceKind::Wiki | SourceKind::Manual => "card fields",
        }
    }

    /// Whether an empty source aborts the run
    pub fn requires_corrections(self) -> bool {
        matches!(self, SourceKind::Wiki)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Authoritative => "authoritative",
            SourceKind::Wiki => "wiki",
            SourceKind::Manual => "manual",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "authoritative" => Ok(SourceKind::Authoritative),
            "wiki" => Ok(SourceKind::Wiki),
            "manual" => Ok(SourceKind::Manual),
            other => Err(format!(
                "unknown source kind '{}', expected authoritative, wiki or manual",
                other
            )),
        }
    }
}

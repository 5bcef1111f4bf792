//! Version history records
//!
//! The `versions` attribute holds one record per line:
//!
//! ```text
//! v1 | 2023-01-01 10:00:00 | Initial Creation | 0 bytes
//! v2[PIN] | 2023-01-02 09:30:12 | fix | 12 bytes
//! ```
//!
//! Lines with fewer than four `|` separated fields are skipped.

use serde::Serialize;

/// Marker appended to the version id of a pinned record
pub const PIN_MARKER: &str = "[PIN]";

const FIELD_SEPARATOR: char = '|';
const MIN_FIELDS: usize = 4;

/// One past snapshot of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    /// Version id such as `v3`
    pub id: String,
    /// Exempt from automatic eviction
    pub pinned: bool,
    /// Creation time as formatted by the filesystem
    pub timestamp: String,
    /// User annotation
    pub message: String,
    /// Human-readable size, e.g. `10 bytes`
    pub size_display: String,
}

impl VersionRecord {
    /// Numeric part of a `v<N>` id, if the id has that shape
    pub fn sequence(&self) -> Option<u64> {
        self.id
            .strip_prefix('v')
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok())
    }

    fn decode(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
        if fields.len() < MIN_FIELDS {
            return None;
        }

        let pinned = fields[0].contains(PIN_MARKER);
        let id = fields[0].replace(PIN_MARKER, "").trim().to_string();

        Some(Self {
            id,
            pinned,
            timestamp: fields[1].to_string(),
            message: fields[2].to_string(),
            size_display: fields[3].to_string(),
        })
    }

    fn encode(&self) -> String {
        let marker = if self.pinned { PIN_MARKER } else { "" };
        format!(
            "{}{} | {} | {} | {}",
            self.id, marker, self.timestamp, self.message, self.size_display
        )
    }
}

/// A file's past snapshots in creation order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionHistory {
    records: Vec<VersionRecord>,
}

impl VersionHistory {
    pub fn new(records: Vec<VersionRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[VersionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&VersionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VersionRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<VersionRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a VersionHistory {
    type Item = &'a VersionRecord;
    type IntoIter = std::slice::Iter<'a, VersionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// What reading the `versions` attribute produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryLookup {
    /// The attribute does not exist on the file
    Absent,
    /// The attribute exists but carries no text
    Empty,
    /// The attribute carries history text
    Present(VersionHistory),
}

impl HistoryLookup {
    /// Classify a raw attribute value as returned by an attribute store
    pub fn from_raw(raw: Option<&[u8]>) -> Self {
        match raw {
            None => HistoryLookup::Absent,
            Some(bytes) => {
                let text = String::from_utf8_lossy(bytes);
                match decode_history(Some(text.as_ref())) {
                    Some(history) => HistoryLookup::Present(history),
                    None => HistoryLookup::Empty,
                }
            }
        }
    }

    pub fn history(&self) -> Option<&VersionHistory> {
        match self {
            HistoryLookup::Present(history) => Some(history),
            _ => None,
        }
    }
}

/// Decode the `versions` attribute.
///
/// Returns `None` when the input is absent or blank. A file that is not
/// managed by SmartFS and a managed file with no history both land here.
pub fn decode_history(raw: Option<&str>) -> Option<VersionHistory> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let records = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(VersionRecord::decode)
        .collect();

    Some(VersionHistory::new(records))
}

/// Render records in the `versions` attribute format
pub fn encode_history(records: &[VersionRecord]) -> String {
    records
        .iter()
        .map(VersionRecord::encode)
        .collect::<Vec<_>>()
        .join("\n")
}

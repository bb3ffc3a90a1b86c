//! Candidate index joined from the reference table.
//!
//! The scraped table is grouped by province; each row is a loose
//! column-label → cell map whose column set varies row to row. Rows that are
//! not candidate rows (sub-headers, footnotes, totals) are skipped. Seats are
//! grouped by canonical district and ordered by ordinal.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chunab_core::{
    ConstituencyKey, DistrictKey, PartyKey, ReferenceFile, ReferenceRow, cell_text,
    normalize_district, normalize_party, sort_ordinal, split_constituency,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::RosterError;
use crate::sanitize::sanitize_cell;
use crate::split::split_candidates;

/// Column holding the `"District N"` label.
pub const CONSTITUENCY_COLUMN: &str = "Constituency";
/// Optional per-row province override.
pub const PROVINCE_COLUMN: &str = "Province";

/// One first-past-the-post seat and its nominees per party.
#[derive(Debug, Clone, Serialize)]
pub struct Seat {
    /// Label as it appeared in the table, e.g. `"Jhapa 1"`.
    pub label: String,
    pub district: DistrictKey,
    pub ordinal: Option<u32>,
    pub province: String,
    pub parties: BTreeMap<PartyKey, Vec<String>>,
}

impl Seat {
    /// Constituency key, if the label carried a usable ordinal.
    pub fn key(&self) -> Option<ConstituencyKey> {
        self.ordinal
            .map(|ordinal| ConstituencyKey::new(self.district.clone(), ordinal))
    }
}

/// Nominees for one `(constituency, party)` pair. Alliance seats can list
/// more than one.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateRecord<'a> {
    pub constituency: ConstituencyKey,
    pub party: PartyKey,
    pub candidates: &'a [String],
    pub province: &'a str,
}

/// Diagnostic counts for an index. Lets the UI tell "no reference data" apart
/// from "reference data that failed to join".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RosterSummary {
    pub provinces: usize,
    pub districts: usize,
    pub seats: usize,
    pub records: usize,
    pub candidates: usize,
    pub skipped_rows: usize,
    /// Districts that did not resolve to one of the 77 canonical names.
    pub unknown_districts: Vec<String>,
}

/// Seats grouped by canonical district, built once from a reference file.
#[derive(Debug, Clone, Default)]
pub struct CandidateIndex {
    districts: BTreeMap<DistrictKey, Vec<Seat>>,
    provinces: BTreeSet<String>,
    skipped_rows: usize,
}

impl CandidateIndex {
    /// Build an index from reference data. Never fails; unusable rows are
    /// counted and skipped.
    pub fn from_reference(file: &ReferenceFile) -> Self {
        let mut index = Self::default();

        for (province, rows) in &file.provinces {
            index.provinces.insert(province.clone());
            for (row_no, row) in rows.iter().enumerate() {
                match parse_row(province, row) {
                    Some(seat) => index.insert(seat),
                    None => {
                        index.skipped_rows += 1;
                        debug!(province = %province, row = row_no, "skipping non-candidate row");
                    }
                }
            }
        }

        // Stable sort: seats with unparsed ordinals keep table order at the end.
        for seats in index.districts.values_mut() {
            seats.sort_by_key(|seat| sort_ordinal(seat.ordinal));
        }

        info!(
            source = %file.source,
            districts = index.districts.len(),
            skipped = index.skipped_rows,
            "built candidate index"
        );
        index
    }

    /// Load and join a reference JSON file.
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        if !path.exists() {
            return Err(RosterError::NotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let file: ReferenceFile = serde_json::from_str(&text)?;
        Ok(Self::from_reference(&file))
    }

    fn insert(&mut self, seat: Seat) {
        let seats = self.districts.entry(seat.district.clone()).or_default();
        if seat.ordinal.is_some()
            && let Some(existing) = seats.iter_mut().find(|s| s.ordinal == seat.ordinal)
        {
            for (party, names) in seat.parties {
                existing.parties.entry(party).or_default().extend(names);
            }
            return;
        }
        seats.push(seat);
    }

    // ── Lookups ──

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }

    /// All seats grouped by district, each group in ordinal order.
    pub fn districts(&self) -> &BTreeMap<DistrictKey, Vec<Seat>> {
        &self.districts
    }

    /// Seats of one district in ordinal order.
    pub fn seats(&self, district: &DistrictKey) -> &[Seat] {
        self.districts.get(district).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn seat(&self, key: &ConstituencyKey) -> Option<&Seat> {
        self.seats(&key.district)
            .iter()
            .find(|seat| seat.ordinal == Some(key.ordinal))
    }

    /// Nominees of `party` in constituency `key`.
    pub fn record(&self, key: &ConstituencyKey, party: PartyKey) -> Option<CandidateRecord<'_>> {
        let seat = self.seat(key)?;
        let candidates = seat.parties.get(&party)?;
        Some(CandidateRecord {
            constituency: key.clone(),
            party,
            candidates,
            province: &seat.province,
        })
    }

    /// Every addressable `(constituency, party)` record, in district then
    /// ordinal order.
    pub fn records(&self) -> impl Iterator<Item = CandidateRecord<'_>> {
        self.districts.values().flatten().flat_map(|seat| {
            let key = seat.key();
            seat.parties.iter().filter_map(move |(party, names)| {
                Some(CandidateRecord {
                    constituency: key.clone()?,
                    party: *party,
                    candidates: names,
                    province: &seat.province,
                })
            })
        })
    }

    pub fn summary(&self) -> RosterSummary {
        let seats = self.districts.values().flatten();
        RosterSummary {
            provinces: self.provinces.len(),
            districts: self.districts.len(),
            seats: self.districts.values().map(Vec::len).sum(),
            records: seats.clone().map(|s| s.parties.len()).sum(),
            candidates: seats.map(|s| s.parties.values().map(Vec::len).sum::<usize>()).sum(),
            skipped_rows: self.skipped_rows,
            unknown_districts: self
                .districts
                .keys()
                .filter(|d| !d.is_known())
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

// ── Row parsing ──

fn is_column(label: &str, reserved: &str) -> bool {
    label.trim().eq_ignore_ascii_case(reserved)
}

fn is_reserved(label: &str) -> bool {
    is_column(label, CONSTITUENCY_COLUMN) || is_column(label, PROVINCE_COLUMN)
}

fn column_text(row: &ReferenceRow, name: &str) -> Option<String> {
    row.iter()
        .find(|(label, _)| is_column(label, name))
        .and_then(|(_, value)| cell_text(value))
        .map(|text| sanitize_cell(&text))
        .filter(|text| !text.is_empty())
}

fn ends_in_numeral(label: &str) -> bool {
    label
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_digit() || ('\u{0966}'..='\u{096F}').contains(&c))
}

/// A candidate row has a non-empty constituency label that is not the header
/// text and ends in a numeral.
fn is_candidate_label(label: &str) -> bool {
    !label.is_empty() && !is_column(label, CONSTITUENCY_COLUMN) && ends_in_numeral(label)
}

/// Party columns of a row: exact short-key matches, or failing that every
/// non-reserved column with its label normalized as a party name.
fn party_columns(row: &ReferenceRow) -> Vec<(&str, PartyKey)> {
    let exact: Vec<(&str, PartyKey)> = row
        .keys()
        .filter_map(|label| {
            label
                .trim()
                .parse::<PartyKey>()
                .ok()
                .map(|party| (label.as_str(), party))
        })
        .collect();
    if !exact.is_empty() {
        return exact;
    }
    row.keys()
        .filter(|label| !is_reserved(label))
        .map(|label| (label.as_str(), normalize_party(label)))
        .collect()
}

fn parse_row(group: &str, row: &ReferenceRow) -> Option<Seat> {
    let label = column_text(row, CONSTITUENCY_COLUMN)?;
    if !is_candidate_label(&label) {
        return None;
    }

    let (district_text, ordinal) = split_constituency(&label);
    let province = column_text(row, PROVINCE_COLUMN).unwrap_or_else(|| group.to_string());

    let mut parties: BTreeMap<PartyKey, Vec<String>> = BTreeMap::new();
    for (column, party) in party_columns(row) {
        let Some(text) = row.get(column).and_then(cell_text) else {
            continue;
        };
        let names = split_candidates(&sanitize_cell(&text));
        if !names.is_empty() {
            parties.entry(party).or_default().extend(names);
        }
    }

    Some(Seat {
        label,
        district: normalize_district(&district_text),
        ordinal,
        province,
        parties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reference(value: serde_json::Value) -> ReferenceFile {
        serde_json::from_value(value).unwrap()
    }

    fn key(district: &str, ordinal: u32) -> ConstituencyKey {
        ConstituencyKey::new(normalize_district(district), ordinal)
    }

    #[test]
    fn jhapa_row_yields_two_records() {
        let index = CandidateIndex::from_reference(&reference(json!({
            "source": "wiki",
            "provinces": {
                "Koshi Province": [
                    {"Constituency": "Jhapa 1", "Congress": "A. Sharma", "UML": "B. Thapa"}
                ]
            }
        })));

        let seat = index.seat(&key("Jhapa", 1)).unwrap();
        assert_eq!(seat.parties.len(), 2);
        assert_eq!(seat.province, "Koshi Province");

        let record = index.record(&key("Jhapa", 1), PartyKey::Uml).unwrap();
        assert_eq!(record.candidates, ["B. Thapa"]);
        assert_eq!(record.province, "Koshi Province");
        assert_eq!(
            index.record(&key("Jhapa", 1), PartyKey::Congress).unwrap().candidates,
            ["A. Sharma"]
        );
        assert!(index.record(&key("Jhapa", 1), PartyKey::Rsp).is_none());
        assert_eq!(index.records().count(), 2);
    }

    #[test]
    fn header_and_footnote_rows_skipped() {
        let index = CandidateIndex::from_reference(&reference(json!({
            "provinces": {
                "Koshi Province": [
                    {"Constituency": "Constituency", "Congress": "Congress"},
                    {"Constituency": "Jhapa 2", "Congress": "C. Rai"},
                    {"Constituency": "Source: Election Commission", "Congress": ""},
                    {"Constituency": "", "Congress": "stray"},
                    {"Congress": "no label"}
                ]
            }
        })));
        let summary = index.summary();
        assert_eq!(summary.seats, 1);
        assert_eq!(summary.skipped_rows, 4);
    }

    #[test]
    fn fallback_columns_when_no_short_keys() {
        let index = CandidateIndex::from_reference(&reference(json!({
            "provinces": {
                "Bagmati Province": [
                    {
                        "Constituency": "Kathmandu 4",
                        "Province": "Bagmati",
                        "Nepali Congress": "Gagan Thapa",
                        "Rastriya Swatantra Party": "Someone Else",
                        "Independent": "Solo Runner"
                    }
                ]
            }
        })));
        let seat = index.seat(&key("Kathmandu", 4)).unwrap();
        assert_eq!(seat.province, "Bagmati");
        assert_eq!(seat.parties[&PartyKey::Congress], ["Gagan Thapa"]);
        assert_eq!(seat.parties[&PartyKey::Rsp], ["Someone Else"]);
        assert_eq!(seat.parties[&PartyKey::Others], ["Solo Runner"]);
        assert!(!seat.parties.contains_key(&PartyKey::Uml));
    }

    #[test]
    fn exact_columns_ignore_unlisted_ones() {
        let index = CandidateIndex::from_reference(&reference(json!({
            "provinces": {
                "Koshi Province": [
                    {"Constituency": "Ilam 1", "UML": "X", "Notes": "ignore me"}
                ]
            }
        })));
        let seat = index.seat(&key("Ilam", 1)).unwrap();
        assert_eq!(seat.parties.len(), 1);
    }

    #[test]
    fn seats_sorted_by_ordinal_unparsed_last() {
        let index = CandidateIndex::from_reference(&reference(json!({
            "provinces": {
                "Koshi Province": [
                    {"Constituency": "Jhapa 0", "UML": "zero"},
                    {"Constituency": "Jhapa 3", "UML": "three"},
                    {"Constituency": "Jhapa 1", "UML": "one"},
                    {"Constituency": "Jhapa-2", "UML": "two"}
                ]
            }
        })));
        let jhapa = normalize_district("Jhapa");
        let ordinals: Vec<Option<u32>> = index.seats(&jhapa).iter().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, vec![Some(1), Some(2), Some(3), None]);
    }

    #[test]
    fn alliance_cells_split_and_dashes_dropped() {
        let index = CandidateIndex::from_reference(&reference(json!({
            "provinces": {
                "Lumbini Province": [
                    {
                        "Constituency": "Eastern Rukum 1",
                        "Maoist": "Ram Thapa (Maoist)<br>Sita Sharma (Unified Socialist)",
                        "Congress": "—"
                    }
                ]
            }
        })));
        let seat = index.seat(&key("Eastern Rukum", 1)).unwrap();
        assert_eq!(
            seat.parties[&PartyKey::Maoist],
            ["Ram Thapa (Maoist)", "Sita Sharma (Unified Socialist)"]
        );
        assert!(!seat.parties.contains_key(&PartyKey::Congress));
    }

    #[test]
    fn duplicate_seat_rows_merge() {
        let index = CandidateIndex::from_reference(&reference(json!({
            "provinces": {
                "Koshi Province": [
                    {"Constituency": "Morang 1", "UML": "A"},
                    {"Constituency": "Morang 1", "Congress": "B"}
                ]
            }
        })));
        let morang = normalize_district("Morang");
        assert_eq!(index.seats(&morang).len(), 1);
        assert_eq!(index.seat(&key("Morang", 1)).unwrap().parties.len(), 2);
    }

    #[test]
    fn empty_reference_is_a_valid_empty_index() {
        let index = CandidateIndex::from_reference(&ReferenceFile::default());
        assert!(index.is_empty());
        assert_eq!(index.summary(), RosterSummary::default());
    }

    #[test]
    fn summary_reports_unknown_districts() {
        let index = CandidateIndex::from_reference(&reference(json!({
            "provinces": {
                "Koshi Province": [
                    {"Constituency": "Jhapa 1", "UML": "A, B"},
                    {"Constituency": "Atlantis 1", "UML": "Ram Thapa, Sita Sharma"}
                ]
            }
        })));
        let summary = index.summary();
        assert_eq!(summary.provinces, 1);
        assert_eq!(summary.districts, 2);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.candidates, 4);
        assert_eq!(summary.unknown_districts, vec!["Atlantis".to_string()]);
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reference.json");
        std::fs::write(
            &path,
            r#"{"source":"wiki","fetchedAt":"2026-03-01","provinces":{"Madhesh Province":[{"Constituency":"Parsa 2","RPP":"Z"}]}}"#,
        )
        .unwrap();
        let index = CandidateIndex::load(&path).unwrap();
        assert!(index.record(&key("Parsa", 2), PartyKey::Rpp).is_some());
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = CandidateIndex::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, RosterError::NotFound(_)));
    }

    #[test]
    fn load_malformed_file_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(CandidateIndex::load(&path), Err(RosterError::Json(_))));
    }
}

// src/report.rs

use std::fmt;

use serde::Serialize;

/// Marker written in place of a count or species list that could not be
/// parsed. Distinct from a true zero.
pub const NOT_AVAILABLE: &str = "NA";

/// The six identifiers naming one detail page, plus the `detail` flag carried
/// through to the query string. Immutable once parsed from the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRef {
    pub country: String,
    pub year: String,
    pub month: String,
    pub admin1: String,
    pub disease: String,
    /// The sdid; also the foreign key relating the two output tables.
    pub report: String,
    pub detail: String,
}

impl ReportRef {
    /// Build a reference from the six tokens of a `show_detail` call, in the
    /// order the site emits them: country, year, month, admin1, disease, sdid.
    pub fn from_tokens(tokens: [String; 6], detail: &str) -> Self {
        let [country, year, month, admin1, disease, report] = tokens;
        Self {
            country,
            year,
            month,
            admin1,
            disease,
            report,
            detail: detail.to_string(),
        }
    }

    /// Format the detail-page URL. Pure and deterministic: the same reference
    /// and base always yield the identical query string, in the parameter
    /// order the site expects. Identifiers are assumed URL-safe.
    pub fn detail_url(&self, base: &str) -> String {
        format!(
            "{}?diseaseid={}&country={}&y={}&m={}&admin1={}&detail={}&sdid={}",
            base,
            self.disease,
            self.country,
            self.year,
            self.month,
            self.admin1,
            self.detail,
            self.report,
        )
    }
}

/// A numeric field extracted from a report table, or the `NA` sentinel when
/// the source cell could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Value(i64),
    NotAvailable,
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Value(v) => write!(f, "{v}"),
            Count::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

/// One domestic-species line item, cells kept as the plain text the page
/// served them with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesRow {
    pub species: String,
    pub susceptible: String,
    pub cases: String,
    pub deaths: String,
    pub destroyed: String,
    pub slaughtered: String,
}

impl SpeciesRow {
    /// Build a row from raw table cells. Cells beyond the first five are
    /// optional; aggregation has already validated indices 2 through 4.
    pub fn from_cells(cells: Vec<String>) -> Self {
        let mut cells = cells.into_iter();
        let mut next = move || cells.next().unwrap_or_default();
        Self {
            species: next(),
            susceptible: next(),
            cases: next(),
            deaths: next(),
            destroyed: next(),
            slaughtered: next(),
        }
    }
}

/// Per-species detail for one report. A parse failure during aggregation
/// invalidates the whole list, not just the offending row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeciesDetail {
    Rows(Vec<SpeciesRow>),
    NotAvailable,
}

/// Everything extracted for one report reference; one main-table row.
/// Created by the extractor and not mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    pub reference: ReportRef,
    pub title: String,
    pub wild_cases: Count,
    pub wild_deaths: Count,
    pub wild_destroyed: Count,
    pub dom_cases: Count,
    pub dom_deaths: Count,
    pub dom_destroyed: Count,
    pub species: SpeciesDetail,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ref() -> ReportRef {
        ReportRef::from_tokens(
            [
                "USA".into(),
                "2012".into(),
                "3".into(),
                "981".into(),
                "15".into(),
                "11822".into(),
            ],
            "1",
        )
    }

    #[test]
    fn detail_url_has_fixed_parameter_order() {
        let url = sample_ref().detail_url("http://example.com/statusdetail/popup");
        assert_eq!(
            url,
            "http://example.com/statusdetail/popup?diseaseid=15&country=USA&y=2012&m=3&admin1=981&detail=1&sdid=11822"
        );
    }

    #[test]
    fn detail_url_is_deterministic() {
        let r = sample_ref();
        assert_eq!(r.detail_url("http://x"), r.detail_url("http://x"));
    }

    #[test]
    fn count_renders_value_or_sentinel() {
        assert_eq!(Count::Value(0).to_string(), "0");
        assert_eq!(Count::Value(42).to_string(), "42");
        assert_eq!(Count::NotAvailable.to_string(), "NA");
    }

    #[test]
    fn species_row_pads_missing_trailing_cells() {
        let row = SpeciesRow::from_cells(vec![
            "Cattle".into(),
            "120".into(),
            "5".into(),
            "1".into(),
            "0".into(),
        ]);
        assert_eq!(row.species, "Cattle");
        assert_eq!(row.destroyed, "0");
        assert_eq!(row.slaughtered, "");
    }
}

// src/extract/mod.rs

use scraper::{ElementRef, Html, Selector};

use crate::error::ScrapeError;
use crate::report::{Count, ReportRecord, ReportRef, SpeciesDetail, SpeciesRow};

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("selector should parse")
}

/// Extract one report record from a fetched detail page.
///
/// A missing title or missing tables fails the whole record; unparsable
/// wildlife or domestic numbers degrade to sentinels and keep the record.
pub fn extract_report(reference: &ReportRef, html: &str) -> Result<ReportRecord, ScrapeError> {
    let document = Html::parse_document(html);

    let title = extract_title(&document)?;
    let tables = locate_tables(&document)?;

    let (wild_cases, wild_deaths, wild_destroyed) = wildlife_counts(tables.wildlife);
    let (dom_cases, dom_deaths, dom_destroyed, species) = domestic_breakdown(tables.domestic);

    Ok(ReportRecord {
        reference: reference.clone(),
        title,
        wild_cases,
        wild_deaths,
        wild_destroyed,
        dom_cases,
        dom_deaths,
        dom_destroyed,
        species,
    })
}

/// The first bold element carries the region / disease heading.
fn extract_title(document: &Html) -> Result<String, ScrapeError> {
    document
        .select(&sel("b"))
        .next()
        .map(element_text)
        .filter(|title| !title.is_empty())
        .ok_or_else(|| ScrapeError::Parse("no title element on detail page".into()))
}

struct ReportTables<'a> {
    wildlife: ElementRef<'a>,
    domestic: ElementRef<'a>,
}

/// Locate the wildlife-summary and domestic-breakdown tables.
///
/// Header signature first: the domestic breakdown is the table whose header
/// names a slaughtered column, the wildlife summary the first other table
/// whose header names cases. Pages that keep the historical layout of three
/// unlabelled tables (overall summary, wildlife, domestic) fall back to
/// document positions 1 and 2; the overall-outbreak summary is ignored.
fn locate_tables(document: &Html) -> Result<ReportTables, ScrapeError> {
    let tables: Vec<ElementRef> = document.select(&sel("table")).collect();

    let mut wildlife = None;
    let mut domestic = None;
    for table in &tables {
        let header = header_text(*table);
        if header.contains("slaughtered") {
            if domestic.is_none() {
                domestic = Some(*table);
            }
        } else if header.contains("cases") && wildlife.is_none() {
            wildlife = Some(*table);
        }
    }

    if tables.len() >= 3 {
        wildlife = wildlife.or_else(|| tables.get(1).copied());
        domestic = domestic.or_else(|| tables.get(2).copied());
    }

    match (wildlife, domestic) {
        (Some(wildlife), Some(domestic)) => Ok(ReportTables { wildlife, domestic }),
        _ => Err(ScrapeError::Parse(format!(
            "expected wildlife and domestic tables, found {} table(s)",
            tables.len()
        ))),
    }
}

/// Text of a table's first row, lowercased, for signature matching.
fn header_text(table: ElementRef) -> String {
    table
        .select(&sel("tr"))
        .next()
        .map(|row| row_cells(row).join(" ").to_lowercase())
        .unwrap_or_default()
}

/// Cases, deaths, destroyed from the wildlife summary's data row (cells 2-4
/// of the row after the header). Any failure collapses all three to the
/// sentinel; the record is still kept.
fn wildlife_counts(table: ElementRef) -> (Count, Count, Count) {
    match wildlife_row_counts(table) {
        Some((cases, deaths, destroyed)) => (
            Count::Value(cases),
            Count::Value(deaths),
            Count::Value(destroyed),
        ),
        None => (Count::NotAvailable, Count::NotAvailable, Count::NotAvailable),
    }
}

fn wildlife_row_counts(table: ElementRef) -> Option<(i64, i64, i64)> {
    let row = table.select(&sel("tr")).nth(1)?;
    let cells = row_cells(row);
    Some((
        numeric_cell(cells.get(2)?)?,
        numeric_cell(cells.get(3)?)?,
        numeric_cell(cells.get(4)?)?,
    ))
}

/// All rows after the domestic table's header, plus the summed
/// cases/deaths/destroyed columns. A summation failure invalidates the
/// aggregates and the species list together; partial recovery would leave
/// the two outputs disagreeing.
fn domestic_breakdown(table: ElementRef) -> (Count, Count, Count, SpeciesDetail) {
    let rows: Vec<Vec<String>> = table.select(&sel("tr")).skip(1).map(row_cells).collect();

    match sum_columns(&rows) {
        Some((cases, deaths, destroyed)) => {
            let rows = rows.into_iter().map(SpeciesRow::from_cells).collect();
            (
                Count::Value(cases),
                Count::Value(deaths),
                Count::Value(destroyed),
                SpeciesDetail::Rows(rows),
            )
        }
        None => (
            Count::NotAvailable,
            Count::NotAvailable,
            Count::NotAvailable,
            SpeciesDetail::NotAvailable,
        ),
    }
}

fn sum_columns(rows: &[Vec<String>]) -> Option<(i64, i64, i64)> {
    let (mut cases, mut deaths, mut destroyed) = (0, 0, 0);
    for cells in rows {
        cases += numeric_cell(cells.get(2)?)?;
        deaths += numeric_cell(cells.get(3)?)?;
        destroyed += numeric_cell(cells.get(4)?)?;
    }
    Some((cases, deaths, destroyed))
}

/// Parse a count cell; an empty cell reads as zero.
fn numeric_cell(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0);
    }
    text.parse().ok()
}

/// Cell text for one row, in order, whitespace-trimmed.
fn row_cells(row: ElementRef) -> Vec<String> {
    row.select(&sel("td, th")).map(element_text).collect()
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportRef;

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

    fn detail_page(wild_data_row: &str, domestic_rows: &str) -> String {
        format!(
            r#"<html><body>
            <b>Alabama : Highly pathogenic avian influenza</b>
            <table>
                <tr><th>Outbreaks</th><th>Started</th><th>Resolved</th></tr>
                <tr><td>2</td><td>2012-03-02</td><td></td></tr>
            </table>
            <table>
                <tr><th>Species</th><th>Susceptible</th><th>Cases</th><th>Deaths</th><th>Destroyed</th></tr>
                {wild_data_row}
            </table>
            <table>
                <tr><th>Species</th><th>Susceptible</th><th>Cases</th><th>Deaths</th><th>Destroyed</th><th>Slaughtered</th></tr>
                {domestic_rows}
            </table>
            </body></html>"#
        )
    }

    const WILD_ROW: &str = "<tr><td>Wild boar</td><td></td><td>12</td><td>4</td><td>1</td></tr>";
    const DOMESTIC_ROWS: &str = "\
        <tr><td>Cattle</td><td>120</td><td>5</td><td>1</td><td>0</td><td>0</td></tr>\
        <tr><td>Sheep</td><td>80</td><td>3</td><td>0</td><td>2</td><td>1</td></tr>";

    #[test]
    fn extracts_title_and_counts() {
        let html = detail_page(WILD_ROW, DOMESTIC_ROWS);
        let record = extract_report(&sample_ref(), &html).unwrap();

        assert_eq!(record.title, "Alabama : Highly pathogenic avian influenza");
        assert_eq!(record.wild_cases, Count::Value(12));
        assert_eq!(record.wild_deaths, Count::Value(4));
        assert_eq!(record.wild_destroyed, Count::Value(1));
    }

    #[test]
    fn domestic_columns_sum_across_rows() {
        let html = detail_page(WILD_ROW, DOMESTIC_ROWS);
        let record = extract_report(&sample_ref(), &html).unwrap();

        assert_eq!(record.dom_cases, Count::Value(8));
        assert_eq!(record.dom_deaths, Count::Value(1));
        assert_eq!(record.dom_destroyed, Count::Value(2));

        let SpeciesDetail::Rows(rows) = &record.species else {
            panic!("expected species rows");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].species, "Cattle");
        assert_eq!(rows[0].susceptible, "120");
        assert_eq!(rows[1].slaughtered, "1");
    }

    #[test]
    fn empty_domestic_cells_count_as_zero() {
        let rows = "<tr><td>Goats</td><td>30</td><td></td><td></td><td>2</td><td></td></tr>";
        let html = detail_page(WILD_ROW, rows);
        let record = extract_report(&sample_ref(), &html).unwrap();

        assert_eq!(record.dom_cases, Count::Value(0));
        assert_eq!(record.dom_deaths, Count::Value(0));
        assert_eq!(record.dom_destroyed, Count::Value(2));
    }

    #[test]
    fn bad_domestic_cell_invalidates_aggregates_and_species_together() {
        let rows = "\
            <tr><td>Cattle</td><td>120</td><td>five</td><td>1</td><td>0</td><td>0</td></tr>\
            <tr><td>Sheep</td><td>80</td><td>3</td><td>0</td><td>2</td><td>1</td></tr>";
        let html = detail_page(WILD_ROW, rows);
        let record = extract_report(&sample_ref(), &html).unwrap();

        assert_eq!(record.dom_cases, Count::NotAvailable);
        assert_eq!(record.dom_deaths, Count::NotAvailable);
        assert_eq!(record.dom_destroyed, Count::NotAvailable);
        assert_eq!(record.species, SpeciesDetail::NotAvailable);
        // wildlife side is untouched
        assert_eq!(record.wild_cases, Count::Value(12));
    }

    #[test]
    fn unparsable_wildlife_row_degrades_to_sentinels() {
        let wild = "<tr><td>Wild boar</td><td></td><td>many</td><td>4</td><td>1</td></tr>";
        let html = detail_page(wild, DOMESTIC_ROWS);
        let record = extract_report(&sample_ref(), &html).unwrap();

        assert_eq!(record.wild_cases, Count::NotAvailable);
        assert_eq!(record.wild_deaths, Count::NotAvailable);
        assert_eq!(record.wild_destroyed, Count::NotAvailable);
        // the record itself survives
        assert_eq!(record.dom_cases, Count::Value(8));
    }

    #[test]
    fn missing_wildlife_data_row_degrades_to_sentinels() {
        let html = detail_page("", DOMESTIC_ROWS);
        let record = extract_report(&sample_ref(), &html).unwrap();
        assert_eq!(record.wild_cases, Count::NotAvailable);
    }

    #[test]
    fn tables_are_found_by_header_signature_when_reordered() {
        // Domestic first, wildlife second, no overall summary at all.
        let html = r#"<html><body><b>Quebec : Rabies</b>
            <table>
                <tr><th>Species</th><th>Susceptible</th><th>Cases</th><th>Deaths</th><th>Destroyed</th><th>Slaughtered</th></tr>
                <tr><td>Cattle</td><td>10</td><td>1</td><td>1</td><td>0</td><td>0</td></tr>
            </table>
            <table>
                <tr><th>Species</th><th>Susceptible</th><th>Cases</th><th>Deaths</th><th>Destroyed</th></tr>
                <tr><td>Foxes</td><td></td><td>3</td><td>3</td><td>0</td></tr>
            </table>
            </body></html>"#;
        let record = extract_report(&sample_ref(), html).unwrap();

        assert_eq!(record.wild_cases, Count::Value(3));
        assert_eq!(record.dom_cases, Count::Value(1));
    }

    #[test]
    fn missing_tables_fail_the_record() {
        let html = "<html><body><b>Title</b><table><tr><td>only one</td></tr></table></body></html>";
        let err = extract_report(&sample_ref(), html).unwrap_err();
        assert!(matches!(err, ScrapeError::Parse(_)));
    }

    #[test]
    fn missing_title_fails_the_record() {
        let html = detail_page(WILD_ROW, DOMESTIC_ROWS).replace("<b>", "<i>").replace("</b>", "</i>");
        let err = extract_report(&sample_ref(), &html).unwrap_err();
        assert!(matches!(err, ScrapeError::Parse(_)));
    }

    #[test]
    fn domestic_table_with_no_data_rows_yields_zero_aggregates() {
        let html = detail_page(WILD_ROW, "");
        let record = extract_report(&sample_ref(), &html).unwrap();

        assert_eq!(record.dom_cases, Count::Value(0));
        assert_eq!(record.species, SpeciesDetail::Rows(Vec::new()));
    }
}

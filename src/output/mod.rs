// src/output/mod.rs

use anyhow::{Context, Result};
use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
};

use crate::report::{ReportRecord, SpeciesDetail, NOT_AVAILABLE};

pub const MAIN_HEADERS: [&str; 15] = [
    "countryid",
    "y",
    "m",
    "admin1",
    "diseaseid",
    "sdid",
    "detail",
    "title",
    "wild_cases",
    "wild_deaths",
    "wild_destroyed",
    "dom_cases",
    "dom_deaths",
    "dom_destroyed",
    "animals",
];

pub const SPECIES_HEADERS: [&str; 7] = [
    "sdid",
    "species",
    "susceptible",
    "cases",
    "deaths",
    "destroyed",
    "slaughtered",
];

/// Incremental writer for the two related CSV outputs: `<base>.csv` (one row
/// per report) and `<base>-species.csv` (one row per species per report,
/// keyed by sdid). Every field is quoted; each record is flushed as soon as
/// it is appended so a failed run leaves complete files behind.
pub struct CsvSink {
    main: csv::Writer<File>,
    species: csv::Writer<File>,
}

impl CsvSink {
    /// Open both outputs in append mode. Header rows are written whenever a
    /// file is new or empty, so the headers exist even if no data row ever
    /// follows; appending to a non-empty file never repeats them.
    pub fn open(base: &str) -> Result<Self> {
        Ok(Self {
            main: open_writer(PathBuf::from(format!("{base}.csv")), &MAIN_HEADERS)?,
            species: open_writer(PathBuf::from(format!("{base}-species.csv")), &SPECIES_HEADERS)?,
        })
    }

    /// Append one record to the main table and its species rows (if any) to
    /// the species table, then flush both.
    pub fn append(&mut self, record: &ReportRecord) -> Result<()> {
        let r = &record.reference;

        let animals = match &record.species {
            SpeciesDetail::Rows(rows) => {
                serde_json::to_string(rows).context("serializing species rows")?
            }
            SpeciesDetail::NotAvailable => NOT_AVAILABLE.to_string(),
        };
        let wild_cases = record.wild_cases.to_string();
        let wild_deaths = record.wild_deaths.to_string();
        let wild_destroyed = record.wild_destroyed.to_string();
        let dom_cases = record.dom_cases.to_string();
        let dom_deaths = record.dom_deaths.to_string();
        let dom_destroyed = record.dom_destroyed.to_string();

        self.main
            .write_record([
                r.country.as_str(),
                r.year.as_str(),
                r.month.as_str(),
                r.admin1.as_str(),
                r.disease.as_str(),
                r.report.as_str(),
                r.detail.as_str(),
                record.title.as_str(),
                wild_cases.as_str(),
                wild_deaths.as_str(),
                wild_destroyed.as_str(),
                dom_cases.as_str(),
                dom_deaths.as_str(),
                dom_destroyed.as_str(),
                animals.as_str(),
            ])
            .context("writing main table row")?;

        if let SpeciesDetail::Rows(rows) = &record.species {
            for row in rows {
                self.species
                    .write_record([
                        r.report.as_str(),
                        row.species.as_str(),
                        row.susceptible.as_str(),
                        row.cases.as_str(),
                        row.deaths.as_str(),
                        row.destroyed.as_str(),
                        row.slaughtered.as_str(),
                    ])
                    .context("writing species table row")?;
            }
        }

        self.main.flush()?;
        self.species.flush()?;
        Ok(())
    }
}

fn open_writer(path: PathBuf, headers: &[&str]) -> Result<csv::Writer<File>> {
    let fresh = fs::metadata(&path).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening output file {}", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(file);
    if fresh {
        writer.write_record(headers)?;
        writer.flush()?;
    }
    Ok(writer)
}

/// Read back every value of one column from a CSV written by [`CsvSink`].
pub fn read_column(path: impl AsRef<Path>, index: usize) -> Result<Vec<String>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let mut values = Vec::new();
    for result in reader.records() {
        let record = result.with_context(|| format!("reading {}", path.display()))?;
        if let Some(value) = record.get(index) {
            values.push(value.to_string());
        }
    }
    Ok(values)
}

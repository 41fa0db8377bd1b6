use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord};

use crate::error::PipelineError;
use crate::models::TrafficRecord;

/// Timestamp layout of the `Generate Time` column: `dd/MM/yyyy HH:mm`,
/// 24-hour clock. Only the time of day survives loading.
pub const TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// The seven columns every export must carry. Matching is case-sensitive
/// and exact; extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "Generate Time",
    "Source address",
    "Destination address",
    "Application",
    "Source Port",
    "Destination Port",
    "IP Protocol",
];

// ---------------------------------------------------------------------------
// ColumnMap: header-name to field-index projection
// ---------------------------------------------------------------------------

struct ColumnMap {
    generate_time: usize,
    source_address: usize,
    destination_address: usize,
    application: usize,
    source_port: usize,
    destination_port: usize,
    ip_protocol: usize,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, PipelineError> {
        let positions = REQUIRED_COLUMNS.map(|name| headers.iter().position(|h| h == name));

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .zip(&positions)
            .filter(|(_, position)| position.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::MissingColumns { missing });
        }

        let [generate_time, source_address, destination_address, application, source_port, destination_port, ip_protocol] =
            positions.map(|position| position.unwrap_or_default());

        Ok(Self {
            generate_time,
            source_address,
            destination_address,
            application,
            source_port,
            destination_port,
            ip_protocol,
        })
    }

    fn project(&self, row: &StringRecord, line: u64) -> Result<TrafficRecord, PipelineError> {
        let cell = |idx: usize| row.get(idx).unwrap_or_default();

        Ok(TrafficRecord {
            generate_time: parse_generate_time(cell(self.generate_time), line)?,
            source_address: cell(self.source_address).to_string(),
            destination_address: cell(self.destination_address).to_string(),
            application: cell(self.application).to_string(),
            source_port: parse_port(cell(self.source_port), "Source Port", line)?,
            destination_port: parse_port(cell(self.destination_port), "Destination Port", line)?,
            ip_protocol: cell(self.ip_protocol).to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

pub fn load_path(path: &Path) -> Result<Vec<TrafficRecord>, PipelineError> {
    tracing::info!(file = %path.display(), "loading traffic log");
    let file = File::open(path)?;
    load_records(file)
}

/// Reads every row of a headered CSV source into `TrafficRecord`s, in source
/// order. Any schema or cell failure aborts the whole load; partial results
/// are never returned.
pub fn load_records<R: Read>(reader: R) -> Result<Vec<TrafficRecord>, PipelineError> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let columns = ColumnMap::from_headers(rdr.headers()?)?;

    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        records.push(columns.project(&row, line)?);
    }

    tracing::info!(records = records.len(), "load complete");
    Ok(records)
}

fn parse_generate_time(value: &str, line: u64) -> Result<NaiveTime, PipelineError> {
    NaiveDateTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map(|dt| dt.time())
        .map_err(|source| PipelineError::Timestamp {
            line,
            value: value.to_string(),
            source,
        })
}

fn parse_port(value: &str, column: &'static str, line: u64) -> Result<u16, PipelineError> {
    value.trim().parse().map_err(|_| PipelineError::Port {
        line,
        column,
        value: value.to_string(),
    })
}

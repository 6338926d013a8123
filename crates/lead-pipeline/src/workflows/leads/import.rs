use super::domain::{LeadField, RawLead};
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LeadImportError {
    #[error("failed to read lead file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse lead CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid column map: {0}")]
    ColumnMap(#[from] serde_json::Error),
}

/// Which CSV header feeds each [`LeadField`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    headers: BTreeMap<LeadField, String>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            headers: LeadField::ordered()
                .into_iter()
                .map(|field| (field, field.default_header().to_string()))
                .collect(),
        }
    }
}

impl ColumnMap {
    /// Parses `{"email": "E-mail Address", ...}`. Keys that do not name a
    /// lead field and blank header names are ignored.
    pub fn from_json(raw: &str) -> Result<Self, LeadImportError> {
        let overrides: HashMap<String, String> = serde_json::from_str(raw)?;
        let mut map = Self::default();
        for (key, header) in overrides {
            if let Some(field) = LeadField::from_key(&key) {
                map = map.with_override(field, header);
            }
        }
        Ok(map)
    }

    pub fn with_override(mut self, field: LeadField, header: impl Into<String>) -> Self {
        let header = header.into();
        if !header.trim().is_empty() {
            self.headers.insert(field, header.trim().to_string());
        }
        self
    }

    pub fn header_for(&self, field: LeadField) -> &str {
        self.headers
            .get(&field)
            .map(String::as_str)
            .unwrap_or_else(|| field.default_header())
    }

    fn resolve(&self, headers: &csv::StringRecord) -> Vec<(LeadField, usize)> {
        let headers: Vec<&str> = headers
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').trim())
            .collect();

        LeadField::ordered()
            .into_iter()
            .filter_map(|field| {
                let wanted = self.header_for(field);
                headers
                    .iter()
                    .position(|header| *header == wanted)
                    .or_else(|| {
                        let wanted = wanted.to_lowercase();
                        headers
                            .iter()
                            .position(|header| header.to_lowercase() == wanted)
                    })
                    .map(|index| (field, index))
            })
            .collect()
    }
}

/// Reads lead rows from CSV exports into [`RawLead`] values.
pub struct LeadCsvImporter;

impl LeadCsvImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        columns: &ColumnMap,
    ) -> Result<Vec<RawLead>, LeadImportError> {
        let file = File::open(path)?;
        Self::from_reader(file, columns)
    }

    /// Missing columns and empty cells leave the field absent.
    pub fn from_reader<R: Read>(
        reader: R,
        columns: &ColumnMap,
    ) -> Result<Vec<RawLead>, LeadImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let positions = columns.resolve(csv_reader.headers()?);
        let mut leads = Vec::new();

        for record in csv_reader.records() {
            let record = record?;
            let mut lead = RawLead::default();
            for (field, index) in &positions {
                *lead.field_mut(*field) = record
                    .get(*index)
                    .filter(|cell| !cell.is_empty())
                    .map(str::to_string);
            }
            leads.push(lead);
        }

        Ok(leads)
    }
}

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use super::batch::{BatchOutcome, BatchProcessor};
use super::domain::{RawLead, ScoredLead};
use super::export::SalesforceLead;
use super::import::{ColumnMap, LeadCsvImporter, LeadImportError};
use super::scoring::{Ruleset, RulesError, RulesStore};

pub const DEFAULT_MAX_BATCH_SIZE: usize = 10_000;

#[derive(Debug, Error)]
pub enum LeadServiceError {
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Import(#[from] LeadImportError),
    #[error("batch of {received} leads exceeds the limit of {limit}")]
    BatchTooLarge { received: usize, limit: usize },
}

/// Entry point shared by the HTTP router and the command line.
#[derive(Debug)]
pub struct LeadService {
    processor: BatchProcessor,
    rules_path: Option<PathBuf>,
    max_batch_size: usize,
}

impl LeadService {
    pub fn new(rules: Arc<RulesStore>) -> Self {
        Self {
            processor: BatchProcessor::new(rules),
            rules_path: None,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    /// Accepted ruleset replacements are written to `path`.
    pub fn with_rules_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rules_path = Some(path.into());
        self
    }

    pub fn with_max_batch_size(mut self, limit: usize) -> Self {
        self.max_batch_size = limit.max(1);
        self
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn rules_path(&self) -> Option<&Path> {
        self.rules_path.as_deref()
    }

    pub fn enrich(&self, lead: RawLead) -> ScoredLead {
        self.processor.process_one(lead)
    }

    pub fn bulk(&self, leads: Vec<RawLead>) -> Result<BatchOutcome, LeadServiceError> {
        if leads.len() > self.max_batch_size {
            return Err(LeadServiceError::BatchTooLarge {
                received: leads.len(),
                limit: self.max_batch_size,
            });
        }
        Ok(self.processor.process(leads))
    }

    /// Imports a CSV export and processes it as one batch.
    pub fn ingest_csv<R: Read>(
        &self,
        reader: R,
        columns: &ColumnMap,
        drop_invalid: bool,
    ) -> Result<BatchOutcome, LeadServiceError> {
        let leads = LeadCsvImporter::from_reader(reader, columns)?;
        let outcome = self.bulk(leads)?;
        Ok(if drop_invalid {
            outcome.retain_ok()
        } else {
            outcome
        })
    }

    pub fn salesforce_rows(
        &self,
        leads: Vec<RawLead>,
    ) -> Result<Vec<SalesforceLead>, LeadServiceError> {
        let outcome = self.bulk(leads)?;
        Ok(outcome.results.iter().map(SalesforceLead::from).collect())
    }

    pub fn rules(&self) -> Arc<Ruleset> {
        self.processor.rules().get()
    }

    /// Validates, persists (when a rules path is configured) and installs a
    /// ruleset. The active ruleset is untouched on any failure.
    pub fn replace_rules(&self, value: serde_json::Value) -> Result<Arc<Ruleset>, LeadServiceError> {
        let result = serde_json::from_value::<Ruleset>(value)
            .map_err(RulesError::from)
            .and_then(|candidate| {
                self.processor
                    .rules()
                    .replace_with(candidate, |ruleset| match self.rules_path.as_deref() {
                        Some(path) => ruleset.save(path),
                        None => Ok(()),
                    })
            });

        result.map_err(|error| {
            warn!(%error, "rejected scoring ruleset");
            LeadServiceError::from(error)
        })
    }
}

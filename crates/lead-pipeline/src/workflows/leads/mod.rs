//! Lead cleanup and qualification pipeline.
//!
//! Raw leads flow through [`normalizer`], [`enrichment`], [`dedupe`] and
//! [`scoring`], coordinated per batch by [`BatchProcessor`]. The only shared
//! mutable state is the active [`Ruleset`] inside [`RulesStore`].

pub mod batch;
pub mod dedupe;
pub mod domain;
pub mod enrichment;
pub mod export;
pub mod import;
pub(crate) mod mapping;
pub mod normalizer;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use batch::{BatchOutcome, BatchProcessor, BatchSummary};
pub use dedupe::{DedupeMark, IdentityKey};
pub use domain::{
    DropReason, EnrichedLead, LeadField, LeadStatus, LeadWarning, NormalizedLead, RawLead,
    ScoredLead,
};
pub use export::{write_leads_csv, write_salesforce_csv, SalesforceLead};
pub use import::{ColumnMap, LeadCsvImporter, LeadImportError};
pub use router::{error_response, lead_router, BulkRequest, BulkResponse};
pub use scoring::{
    Penalties, RuleEngine, Ruleset, RulesError, RulesStore, ScoreCard, ScoreComponent,
    ScoreFactor, SizeBand,
};
pub use service::{LeadService, LeadServiceError, DEFAULT_MAX_BATCH_SIZE};

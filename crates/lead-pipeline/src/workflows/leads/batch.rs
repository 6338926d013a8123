use super::dedupe::{dedupe, DedupeMark};
use super::domain::{
    DropReason, EnrichedLead, LeadStatus, LeadWarning, RawLead, ScoredLead,
};
use super::enrichment::enrich;
use super::normalizer::normalize;
use super::scoring::{RuleEngine, RulesStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Runs normalize, enrich, dedupe, drop and score over a batch.
///
/// Every record in a batch is scored against the same ruleset snapshot, so a
/// concurrent rules replacement never splits one batch across versions.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    rules: Arc<RulesStore>,
}

impl BatchProcessor {
    pub fn new(rules: Arc<RulesStore>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &Arc<RulesStore> {
        &self.rules
    }

    pub fn process(&self, leads: Vec<RawLead>) -> BatchOutcome {
        let engine = RuleEngine::new(self.rules.get());
        let rules_version = engine.ruleset().version;

        let enriched: Vec<EnrichedLead> = leads
            .into_iter()
            .map(|raw| enrich(normalize(raw)))
            .collect();
        let marks = dedupe(&enriched);

        let results: Vec<ScoredLead> = enriched
            .into_iter()
            .zip(marks)
            .map(|(lead, mark)| finalize(lead, mark, &engine))
            .collect();
        let summary = BatchSummary::from_results(&results);

        debug!(
            count_in = summary.count_in,
            count_out = summary.count_out,
            dropped = summary.dropped,
            rules_version,
            "processed lead batch"
        );

        BatchOutcome {
            results,
            summary,
            rules_version,
        }
    }

    /// Batch of one; a single lead can never be a duplicate.
    pub fn process_one(&self, lead: RawLead) -> ScoredLead {
        let engine = RuleEngine::new(self.rules.get());
        finalize(enrich(normalize(lead)), DedupeMark::Keep, &engine)
    }
}

fn finalize(mut lead: EnrichedLead, mark: DedupeMark, engine: &RuleEngine) -> ScoredLead {
    let (status, drop_reason, duplicate_of) = match mark {
        DedupeMark::Duplicate { of } => {
            lead.normalized.warnings.push(LeadWarning::DuplicateInBatch);
            (LeadStatus::Dropped, Some(DropReason::DuplicateInBatch), Some(of))
        }
        DedupeMark::Keep if !lead.normalized.has_contact() => {
            (LeadStatus::Dropped, Some(DropReason::NoValidContact), None)
        }
        DedupeMark::Keep => (LeadStatus::Ok, None, None),
    };

    let card = engine.evaluate(&lead);

    ScoredLead {
        enriched: lead,
        status,
        drop_reason,
        duplicate_of,
        score: card.total,
        score_components: card.components,
    }
}

/// Aggregate counters derived from a batch's results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub count_in: usize,
    pub count_out: usize,
    pub dropped: usize,
    pub fraction_enriched: f64,
    pub avg_score: f64,
}

impl BatchSummary {
    pub fn from_results(results: &[ScoredLead]) -> Self {
        let count_in = results.len();
        let ok_scores: Vec<u64> = results
            .iter()
            .filter(|lead| lead.is_ok())
            .map(|lead| lead.score)
            .collect();
        let count_out = ok_scores.len();

        let fraction_enriched = if count_in == 0 {
            0.0
        } else {
            count_out as f64 / count_in as f64
        };
        let avg_score = if count_out == 0 {
            0.0
        } else {
            let mean = ok_scores.iter().map(|score| *score as f64).sum::<f64>() / count_out as f64;
            (mean * 100.0).round() / 100.0
        };

        Self {
            count_in,
            count_out,
            dropped: count_in - count_out,
            fraction_enriched,
            avg_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub results: Vec<ScoredLead>,
    pub summary: BatchSummary,
    pub rules_version: u64,
}

impl BatchOutcome {
    /// Drops non-ok records from `results`. The summary still describes the
    /// full input.
    pub fn retain_ok(mut self) -> Self {
        self.results.retain(ScoredLead::is_ok);
        self
    }
}

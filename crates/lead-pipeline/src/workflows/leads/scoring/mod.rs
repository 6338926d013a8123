mod config;
mod rules;
mod store;

pub use config::{Penalties, Ruleset, RulesError, SizeBand, MAX_POINTS};
pub use store::RulesStore;

use super::domain::EnrichedLead;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const VALID_EMAIL_BONUS: i64 = 5;
pub const PHONE_BONUS: i64 = 3;

/// Applies one ruleset snapshot to enriched leads.
pub struct RuleEngine {
    ruleset: Arc<Ruleset>,
}

impl RuleEngine {
    pub fn new(ruleset: Arc<Ruleset>) -> Self {
        Self { ruleset }
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    pub fn evaluate(&self, lead: &EnrichedLead) -> ScoreCard {
        let (components, total) = rules::score_lead(lead, &self.ruleset);
        ScoreCard {
            total: clamp_total(total),
            components,
        }
    }

    pub fn score(&self, lead: &EnrichedLead) -> u64 {
        self.evaluate(lead).total
    }
}

pub fn score(lead: &EnrichedLead, ruleset: &Ruleset) -> u64 {
    let (_, total) = rules::score_lead(lead, ruleset);
    clamp_total(total)
}

fn clamp_total(total: i64) -> u64 {
    u64::try_from(total).unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    TitleKeyword,
    CompanySize,
    Country,
    Source,
    MissingCompany,
    MissingTitle,
    ValidEmail,
    Phone,
}

/// Single rule contribution, kept so a score can be audited later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub points: i64,
    pub notes: String,
}

/// Clamped total plus the contributions that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub total: u64,
    pub components: Vec<ScoreComponent>,
}

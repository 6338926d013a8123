use super::super::domain::EnrichedLead;
use super::config::Ruleset;
use super::{ScoreComponent, ScoreFactor, PHONE_BONUS, VALID_EMAIL_BONUS};

/// Builds the audit trail for `lead` and returns it with the unclamped sum.
pub(crate) fn score_lead(lead: &EnrichedLead, ruleset: &Ruleset) -> (Vec<ScoreComponent>, i64) {
    let normalized = &lead.normalized;
    let mut components = Vec::new();

    if let Some(title) = normalized.title.as_deref() {
        let title = title.to_lowercase();
        for (keyword, points) in &ruleset.title_includes {
            if title.contains(&keyword.to_lowercase()) {
                components.push(ScoreComponent {
                    factor: ScoreFactor::TitleKeyword,
                    points: *points,
                    notes: format!("title contains `{keyword}`"),
                });
            }
        }
    }

    if let Some(band) = ruleset
        .company_size_points
        .iter()
        .find(|band| band.contains(lead.company_size))
    {
        components.push(ScoreComponent {
            factor: ScoreFactor::CompanySize,
            points: band.points,
            notes: format!(
                "company size {} within {}-{}",
                lead.company_size, band.min, band.max
            ),
        });
    }

    if let Some((country, points)) = normalized
        .country_norm
        .as_deref()
        .and_then(|country| ruleset.country_boost.get_key_value(country))
    {
        components.push(ScoreComponent {
            factor: ScoreFactor::Country,
            points: *points,
            notes: format!("country boost for {country}"),
        });
    }

    if let Some((source, points)) = normalized
        .source_norm
        .as_deref()
        .and_then(|source| ruleset.source_boost.get_key_value(source))
    {
        components.push(ScoreComponent {
            factor: ScoreFactor::Source,
            points: *points,
            notes: format!("source boost for {source}"),
        });
    }

    // Penalties are configured as magnitudes; the sign is ignored.
    if normalized.company.is_none() && ruleset.penalties.missing_company != 0 {
        components.push(ScoreComponent {
            factor: ScoreFactor::MissingCompany,
            points: -ruleset.penalties.missing_company.abs(),
            notes: "company missing".to_string(),
        });
    }

    if normalized.title.is_none() && ruleset.penalties.missing_title != 0 {
        components.push(ScoreComponent {
            factor: ScoreFactor::MissingTitle,
            points: -ruleset.penalties.missing_title.abs(),
            notes: "title missing".to_string(),
        });
    }

    if normalized.email_valid {
        components.push(ScoreComponent {
            factor: ScoreFactor::ValidEmail,
            points: VALID_EMAIL_BONUS,
            notes: "valid email".to_string(),
        });
    }

    if !normalized.phone_norm.is_empty() {
        components.push(ScoreComponent {
            factor: ScoreFactor::Phone,
            points: PHONE_BONUS,
            notes: format!("phone {}", normalized.phone_norm),
        });
    }

    let total = components
        .iter()
        .fold(0i64, |acc, component| acc.saturating_add(component.points));

    (components, total)
}

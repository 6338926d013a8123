//! Invariants of the lead pipeline checked over generated inputs.
use lead_pipeline::workflows::leads::enrichment::{enrich, COMPANY_SIZES, INDUSTRIES};
use lead_pipeline::workflows::leads::normalizer::{
    normalize, normalize_country, normalize_phone, normalize_source, title_case,
};
use lead_pipeline::workflows::leads::{
    BatchProcessor, Penalties, RawLead, RuleEngine, Ruleset, RulesStore,
};
use proptest::prelude::*;
use std::sync::Arc;

fn raw_lead() -> impl Strategy<Value = RawLead> {
    (
        proptest::option::of("[a-z]{1,8}( [a-z]{1,8})?"),
        proptest::option::of(prop_oneof!["[a-c]@example\\.com", "[a-c]", Just(String::new())]),
        proptest::option::of("[0-9 ()+-]{0,16}"),
        proptest::option::of("(vp|head|engineer|chief) [a-z]{0,6}"),
        proptest::option::of("[A-Z][a-z]{0,6}"),
        proptest::option::of("(us|uk|germany|france| *)"),
    )
        .prop_map(|(name, email, phone, title, company, country)| RawLead {
            name,
            email,
            phone,
            title,
            company,
            country,
            ..RawLead::default()
        })
}

proptest! {
    #[test]
    fn phone_normalization_never_panics(phone in "\\PC*") {
        let _ = normalize_phone(&phone);
    }

    #[test]
    fn canonical_phones_are_plus_and_digits(phone in "[0-9 ()+.-]{0,24}") {
        let normalized = normalize_phone(&phone);
        if !normalized.is_empty() {
            prop_assert!(normalized.starts_with('+'));
            prop_assert!(normalized[1..].chars().all(|ch| ch.is_ascii_digit()));
            prop_assert!((12..=16).contains(&normalized.len()));
        }
        prop_assert_eq!(normalize_phone(&normalized), normalized.clone());
    }

    #[test]
    fn title_case_is_idempotent(value in "\\PC{0,24}") {
        let once = title_case(&value);
        prop_assert_eq!(title_case(&once), once);
    }

    #[test]
    fn country_and_source_normalization_are_idempotent(value in "[A-Za-z. ]{0,16}") {
        let country = normalize_country(Some(value.as_str()));
        prop_assert_eq!(normalize_country(country.as_deref()), country.clone());

        let source = normalize_source(Some(value.as_str()));
        prop_assert_eq!(normalize_source(source.as_deref()), source.clone());
    }

    #[test]
    fn enrichment_is_deterministic(lead in raw_lead()) {
        let first = enrich(normalize(lead.clone()));
        let second = enrich(normalize(lead));
        prop_assert!(COMPANY_SIZES.contains(&first.company_size));
        prop_assert!(INDUSTRIES.contains(&first.industry.as_str()));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn score_is_the_clamped_component_sum(
        lead in raw_lead(),
        missing_company in -1_000_000i64..=1_000_000,
        missing_title in -1_000_000i64..=1_000_000,
    ) {
        let ruleset = Ruleset {
            penalties: Penalties { missing_company, missing_title },
            ..Ruleset::default()
        };
        let card = RuleEngine::new(Arc::new(ruleset)).evaluate(&enrich(normalize(lead)));
        let sum: i64 = card.components.iter().map(|component| component.points).sum();

        prop_assert_eq!(card.total, u64::try_from(sum.max(0)).unwrap_or(0));
    }

    #[test]
    fn summary_arithmetic_holds(batch in proptest::collection::vec(raw_lead(), 0..24)) {
        let outcome = BatchProcessor::new(Arc::new(RulesStore::default())).process(batch.clone());
        let summary = &outcome.summary;

        prop_assert_eq!(outcome.results.len(), batch.len());
        prop_assert_eq!(summary.count_in, batch.len());
        prop_assert_eq!(summary.count_out + summary.dropped, summary.count_in);
        prop_assert!((0.0..=1.0).contains(&summary.fraction_enriched));
        prop_assert!(summary.avg_score >= 0.0);

        for (index, lead) in outcome.results.iter().enumerate() {
            if let Some(kept) = lead.duplicate_of {
                prop_assert!(kept < index);
                prop_assert!(outcome.results[kept].duplicate_of.is_none());
            }
            if lead.is_ok() {
                prop_assert!(lead.normalized().has_contact());
            }
        }
    }
}

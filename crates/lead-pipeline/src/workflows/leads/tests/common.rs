use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::leads::domain::{EnrichedLead, RawLead};
use crate::workflows::leads::enrichment::enrich;
use crate::workflows::leads::normalizer::normalize;
use crate::workflows::leads::{LeadService, RulesStore};

pub(super) fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

/// Senior marketing lead that passes every default rule.
pub(super) fn qualified_lead() -> RawLead {
    RawLead {
        name: text("alex doe"),
        email: text("Alex@SampleCo.com"),
        phone: text("1-555-123-4567"),
        title: text("VP Marketing"),
        company: text("SampleCo"),
        country: text("USA"),
        created_at: text("2025-08-15"),
        source: text("linkedin"),
    }
}

pub(super) fn contact(email: Option<&str>, phone: Option<&str>) -> RawLead {
    RawLead {
        name: text("Sam Lee"),
        email: email.map(str::to_string),
        phone: phone.map(str::to_string),
        company: text("Initech"),
        ..RawLead::default()
    }
}

/// Normalizes and enriches, then pins the company size so scores do not
/// depend on the enrichment digest.
pub(super) fn enriched_with_size(raw: RawLead, company_size: u32) -> EnrichedLead {
    let mut lead = enrich(normalize(raw));
    lead.company_size = company_size;
    lead
}

pub(super) fn default_store() -> Arc<RulesStore> {
    Arc::new(RulesStore::default())
}

pub(super) fn service() -> Arc<LeadService> {
    Arc::new(LeadService::new(default_store()))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

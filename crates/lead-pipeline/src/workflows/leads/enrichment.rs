//! Deterministic stand-in for a firmographic lookup.
//!
//! Outputs are a pure function of `company + email` through SHA-256; changing
//! the digest or the tables below changes every enrichment result.

use super::domain::{EnrichedLead, NormalizedLead};
use sha2::{Digest, Sha256};

pub const COMPANY_SIZES: [u32; 6] = [25, 120, 450, 2000, 5000, 60];

pub const INDUSTRIES: [&str; 6] = [
    "Software",
    "E-Commerce",
    "FinTech",
    "Media",
    "Manufacturing",
    "Healthcare",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyProfile {
    pub company_size: u32,
    pub industry: &'static str,
    pub website: Option<String>,
}

pub fn enrich(lead: NormalizedLead) -> EnrichedLead {
    let CompanyProfile {
        company_size,
        industry,
        website,
    } = mock_company_profile(lead.company.as_deref(), lead.email.as_deref());

    EnrichedLead {
        normalized: lead,
        company_size,
        industry: industry.to_string(),
        website,
    }
}

pub fn mock_company_profile(company: Option<&str>, email: Option<&str>) -> CompanyProfile {
    let seed = format!("{}{}", company.unwrap_or_default(), email.unwrap_or_default());
    let digest = Sha256::digest(seed.as_bytes());

    CompanyProfile {
        company_size: COMPANY_SIZES[bucket(&digest, COMPANY_SIZES.len())],
        industry: INDUSTRIES[bucket(&digest, INDUSTRIES.len())],
        website: email_domain(email).map(|domain| format!("https://{domain}")),
    }
}

/// Reduces the digest, read as one big-endian integer, modulo `buckets`.
fn bucket(digest: &[u8], buckets: usize) -> usize {
    digest
        .iter()
        .fold(0usize, |acc, byte| (acc * 256 + usize::from(*byte)) % buckets)
}

pub fn email_domain(email: Option<&str>) -> Option<String> {
    let (_, domain) = email?.split_once('@')?;
    let domain = domain.trim().to_lowercase();
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

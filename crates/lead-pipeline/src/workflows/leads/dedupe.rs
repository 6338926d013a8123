use super::domain::{EnrichedLead, NormalizedLead};
use sha2::{Digest, Sha256};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Identity used to detect repeated leads inside one batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Email(String),
    Phone(String),
    NameCompany(String),
}

impl IdentityKey {
    /// Email first, then canonical phone, then a digest of name and company
    /// (both required). A lead with none of these has no identity and is
    /// never a duplicate.
    pub fn for_lead(lead: &NormalizedLead) -> Option<Self> {
        if let Some(email) = lead.email.as_deref().filter(|email| !email.is_empty()) {
            return Some(Self::Email(email.to_string()));
        }

        if !lead.phone_norm.is_empty() {
            return Some(Self::Phone(lead.phone_norm.clone()));
        }

        let name = lead.name.as_deref().filter(|name| !name.trim().is_empty())?;
        let company = lead
            .company
            .as_deref()
            .filter(|company| !company.trim().is_empty())?;

        let token = format!("{name}|{company}");
        Some(Self::NameCompany(hex::encode(Sha256::digest(
            token.as_bytes(),
        ))))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupeMark {
    Keep,
    /// Repeats the identity of the record at index `of`.
    Duplicate { of: usize },
}

/// Returns one mark per lead, in input order. The first lead seen for an
/// identity is kept; later ones point back at it.
pub fn dedupe(leads: &[EnrichedLead]) -> Vec<DedupeMark> {
    let mut first_seen: HashMap<IdentityKey, usize> = HashMap::with_capacity(leads.len());

    leads
        .iter()
        .enumerate()
        .map(|(index, lead)| match IdentityKey::for_lead(&lead.normalized) {
            Some(key) => match first_seen.entry(key) {
                Entry::Occupied(kept) => DedupeMark::Duplicate { of: *kept.get() },
                Entry::Vacant(slot) => {
                    slot.insert(index);
                    DedupeMark::Keep
                }
            },
            None => DedupeMark::Keep,
        })
        .collect()
}

use super::domain::ScoredLead;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Flat view of a [`ScoredLead`] suitable for a CSV row.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct LeadCsvRow<'a> {
    name: Option<&'a str>,
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
    email: Option<&'a str>,
    email_valid: bool,
    phone: Option<&'a str>,
    phone_norm: &'a str,
    title: Option<&'a str>,
    company: Option<&'a str>,
    country: Option<&'a str>,
    country_norm: Option<&'a str>,
    created_at: Option<&'a str>,
    created_at_iso: Option<String>,
    source: Option<&'a str>,
    source_norm: Option<&'a str>,
    company_size: u32,
    industry: &'a str,
    website: Option<&'a str>,
    status: &'static str,
    drop_reason: Option<&'static str>,
    duplicate_of: Option<usize>,
    score: u64,
    warnings: String,
}

impl<'a> From<&'a ScoredLead> for LeadCsvRow<'a> {
    fn from(lead: &'a ScoredLead) -> Self {
        let enriched = &lead.enriched;
        let normalized = &enriched.normalized;

        Self {
            name: normalized.name.as_deref(),
            first_name: normalized.first_name.as_deref(),
            last_name: normalized.last_name.as_deref(),
            email: normalized.email.as_deref(),
            email_valid: normalized.email_valid,
            phone: normalized.phone.as_deref(),
            phone_norm: &normalized.phone_norm,
            title: normalized.title.as_deref(),
            company: normalized.company.as_deref(),
            country: normalized.country.as_deref(),
            country_norm: normalized.country_norm.as_deref(),
            created_at: normalized.created_at.as_deref(),
            created_at_iso: normalized.created_at_iso.map(|date| date.to_string()),
            source: normalized.source.as_deref(),
            source_norm: normalized.source_norm.as_deref(),
            company_size: enriched.company_size,
            industry: &enriched.industry,
            website: enriched.website.as_deref(),
            status: lead.status.label(),
            drop_reason: lead.drop_reason.map(|reason| reason.label()),
            duplicate_of: lead.duplicate_of,
            score: lead.score,
            warnings: normalized
                .warnings
                .iter()
                .map(|warning| warning.label())
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

pub fn write_leads_csv<W: Write>(writer: W, leads: &[ScoredLead]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for lead in leads {
        csv_writer.serialize(LeadCsvRow::from(lead))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Lead in the shape expected by a Salesforce lead import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesforceLead {
    #[serde(rename = "FirstName")]
    pub first_name: Option<String>,
    #[serde(rename = "LastName")]
    pub last_name: Option<String>,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Company")]
    pub company: Option<String>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
    #[serde(rename = "LeadSource")]
    pub lead_source: Option<String>,
    #[serde(rename = "CreatedDate__c")]
    pub created_date: Option<String>,
    #[serde(rename = "Website__c")]
    pub website: Option<String>,
    #[serde(rename = "Industry__c")]
    pub industry: String,
    #[serde(rename = "CompanySize__c")]
    pub company_size: u32,
    #[serde(rename = "Score__c")]
    pub score: u64,
}

impl From<&ScoredLead> for SalesforceLead {
    fn from(lead: &ScoredLead) -> Self {
        let enriched = &lead.enriched;
        let normalized = &enriched.normalized;

        Self {
            first_name: normalized.first_name.clone(),
            last_name: normalized.last_name.clone(),
            email: normalized.email.clone(),
            phone: normalized.phone_norm.clone(),
            title: normalized.title.clone(),
            company: normalized.company.clone(),
            country: normalized.country_norm.clone(),
            lead_source: normalized.source_norm.clone(),
            created_date: normalized.created_at_iso.map(|date| date.to_string()),
            website: enriched.website.clone(),
            industry: enriched.industry.clone(),
            company_size: enriched.company_size,
            score: lead.score,
        }
    }
}

pub fn write_salesforce_csv<W: Write>(
    writer: W,
    rows: &[SalesforceLead],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

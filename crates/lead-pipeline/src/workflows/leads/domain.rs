use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::scoring::ScoreComponent;

/// Loosely structured lead as received from a request body or a CSV row.
///
/// Every field is optional; `None` means the field was never supplied, which
/// the pipeline treats differently from an empty string in a few places.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLead {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub created_at: Option<String>,
    pub source: Option<String>,
}

impl RawLead {
    pub fn field_mut(&mut self, field: LeadField) -> &mut Option<String> {
        match field {
            LeadField::Name => &mut self.name,
            LeadField::Email => &mut self.email,
            LeadField::Phone => &mut self.phone,
            LeadField::Title => &mut self.title,
            LeadField::Company => &mut self.company,
            LeadField::Country => &mut self.country,
            LeadField::CreatedAt => &mut self.created_at,
            LeadField::Source => &mut self.source,
        }
    }
}

/// Input fields of a [`RawLead`], used to map external column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadField {
    Name,
    Email,
    Phone,
    Title,
    Company,
    Country,
    CreatedAt,
    Source,
}

impl LeadField {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Name,
            Self::Email,
            Self::Phone,
            Self::Title,
            Self::Company,
            Self::Country,
            Self::CreatedAt,
            Self::Source,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Title => "title",
            Self::Company => "company",
            Self::Country => "country",
            Self::CreatedAt => "created_at",
            Self::Source => "source",
        }
    }

    /// Column header expected in CSV exports when no override is supplied.
    pub const fn default_header(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Phone => "Phone",
            Self::Title => "Title",
            Self::Company => "Company",
            Self::Country => "Country",
            Self::CreatedAt => "Created At",
            Self::Source => "Source",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ordered()
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(key))
    }
}

/// Diagnostics attached to a lead while it moves through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadWarning {
    InvalidPhone,
    InvalidDate,
    DuplicateInBatch,
}

impl LeadWarning {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InvalidPhone => "invalid_phone",
            Self::InvalidDate => "invalid_date",
            Self::DuplicateInBatch => "duplicate_in_batch",
        }
    }
}

/// Raw fields plus their canonical forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedLead {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub created_at: Option<String>,
    pub source: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_valid: bool,
    pub phone_norm: String,
    pub country_norm: Option<String>,
    pub created_at_iso: Option<NaiveDate>,
    pub source_norm: Option<String>,
    pub warnings: Vec<LeadWarning>,
}

impl NormalizedLead {
    /// A lead is reachable when it has a valid email or a usable phone.
    pub fn has_contact(&self) -> bool {
        self.email_valid || !self.phone_norm.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedLead {
    #[serde(flatten)]
    pub normalized: NormalizedLead,
    pub company_size: u32,
    pub industry: String,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Ok,
    Dropped,
}

impl LeadStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Dropped => "dropped",
        }
    }
}

/// Why a lead ended up with [`LeadStatus::Dropped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    DuplicateInBatch,
    NoValidContact,
}

impl DropReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::DuplicateInBatch => "duplicate_in_batch",
            Self::NoValidContact => "no_valid_contact",
        }
    }
}

/// Output record produced once per input lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredLead {
    #[serde(flatten)]
    pub enriched: EnrichedLead,
    pub status: LeadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_reason: Option<DropReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<usize>,
    pub score: u64,
    #[serde(default)]
    pub score_components: Vec<ScoreComponent>,
}

impl ScoredLead {
    pub fn normalized(&self) -> &NormalizedLead {
        &self.enriched.normalized
    }

    pub fn warnings(&self) -> &[LeadWarning] {
        &self.enriched.normalized.warnings
    }

    pub fn is_ok(&self) -> bool {
        self.status == LeadStatus::Ok
    }
}

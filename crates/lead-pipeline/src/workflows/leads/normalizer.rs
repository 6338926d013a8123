//! Field-level cleanup for raw leads.
//!
//! Every function here is total: input that cannot be understood degrades to
//! an empty or absent value, and [`normalize`] records a warning for the
//! fields that matter to the drop decision downstream.

use super::domain::{LeadWarning, NormalizedLead, RawLead};
use super::mapping::{canonical_country, canonical_source};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Tried in order; the first format that parses wins, so `01/02/2020` is
/// read month-first.
const EXPLICIT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"];

const FALLBACK_DATE_FORMATS: &[&str] = &[
    "%Y%m%d",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

pub fn normalize(raw: RawLead) -> NormalizedLead {
    let mut warnings = Vec::new();

    let (first_name, last_name) = split_name(raw.name.as_deref());

    let email = canonical_email(raw.email.as_deref());
    let email_valid = email.as_deref().map(validate_email).unwrap_or(false);

    let phone_norm = raw.phone.as_deref().map(normalize_phone).unwrap_or_default();
    if phone_norm.is_empty() && clean(raw.phone.as_deref()).is_some() {
        warnings.push(LeadWarning::InvalidPhone);
    }

    let created_at_iso = clean(raw.created_at.as_deref()).and_then(parse_date);
    if created_at_iso.is_none() && clean(raw.created_at.as_deref()).is_some() {
        warnings.push(LeadWarning::InvalidDate);
    }

    let country_norm = normalize_country(raw.country.as_deref());
    let source_norm = normalize_source(raw.source.as_deref());

    NormalizedLead {
        title: clean(raw.title.as_deref()).map(str::to_string),
        company: clean(raw.company.as_deref()).map(str::to_string),
        name: raw.name,
        email,
        phone: raw.phone,
        country: raw.country,
        created_at: raw.created_at,
        source: raw.source,
        first_name,
        last_name,
        email_valid,
        phone_norm,
        country_norm,
        created_at_iso,
        source_norm,
        warnings,
    }
}

fn clean(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Upper-cases each letter that follows a non-letter and lower-cases the rest.
pub fn title_case(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut previous_is_letter = false;

    for ch in value.chars() {
        if !ch.is_alphabetic() {
            output.push(ch);
            previous_is_letter = false;
            continue;
        }

        let mapped: String = if previous_is_letter {
            ch.to_lowercase().collect()
        } else {
            // `ß` -> `Ss`, `ﬁ` -> `Fi`: only the first char of an expansion stays upper.
            let mut upper = ch.to_uppercase();
            upper
                .next()
                .into_iter()
                .chain(upper.flat_map(char::to_lowercase))
                .collect()
        };

        // Expansions carrying combining marks (`İ`, `ΐ`) would move word
        // boundaries on the next pass, so those letters are kept as written.
        if mapped.chars().all(char::is_alphabetic) {
            output.push_str(&mapped);
        } else {
            output.push(ch);
        }
        previous_is_letter = true;
    }

    output
}

pub fn split_name(name: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(name) = clean(name) else {
        return (None, None);
    };

    let mut tokens = name.split_whitespace();
    let first = tokens.next().map(title_case);
    let rest = tokens.collect::<Vec<_>>().join(" ");
    let last = if rest.is_empty() {
        None
    } else {
        Some(title_case(&rest))
    };

    (first, last)
}

pub fn canonical_email(email: Option<&str>) -> Option<String> {
    clean(email).map(str::to_lowercase)
}

pub fn validate_email(email: &str) -> bool {
    email_pattern().is_match(email)
}

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
            .expect("email pattern is a valid regex")
    })
}

/// Canonicalizes to `+<digits>`; returns an empty string when the digit count
/// does not look like a dialable number.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    match digits.len() {
        11 if digits.starts_with('1') => format!("+1{}", &digits[1..]),
        10 => format!("+1{digits}"),
        11..=15 => format!("+{digits}"),
        _ => String::new(),
    }
}

pub fn normalize_country(country: Option<&str>) -> Option<String> {
    let country = clean(country)?;
    Some(
        canonical_country(country)
            .map(str::to_string)
            .unwrap_or_else(|| title_case(country)),
    )
}

pub fn normalize_source(source: Option<&str>) -> Option<String> {
    let source = clean(source)?;
    let titled = title_case(source);
    Some(
        canonical_source(&titled)
            .map(str::to_string)
            .unwrap_or(titled),
    )
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    EXPLICIT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .or_else(|| parse_date_permissive(trimmed))
}

fn parse_date_permissive(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.date_naive());
    }

    FALLBACK_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            FALLBACK_DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        })
}

use std::collections::HashMap;
use std::sync::OnceLock;

static COUNTRY_ALIAS_MAP: OnceLock<HashMap<String, &'static str>> = OnceLock::new();
static SOURCE_ALIAS_MAP: OnceLock<HashMap<String, &'static str>> = OnceLock::new();

/// Lowercases, drops punctuation, and collapses whitespace so that
/// `"U.S."`, `"us"` and `" US "` share one key.
pub(crate) fn alias_key(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|ch| ch.is_alphanumeric() || ch.is_whitespace())
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

pub(crate) fn canonical_country(value: &str) -> Option<&'static str> {
    country_alias_map().get(&alias_key(value)).copied()
}

pub(crate) fn canonical_source(value: &str) -> Option<&'static str> {
    source_alias_map().get(&alias_key(value)).copied()
}

fn country_alias_map() -> &'static HashMap<String, &'static str> {
    COUNTRY_ALIAS_MAP.get_or_init(|| {
        const ALIASES: &[(&str, &str)] = &[
            ("US", "United States"),
            ("USA", "United States"),
            ("U.S.", "United States"),
            ("U.S.A.", "United States"),
            ("America", "United States"),
            ("United States", "United States"),
            ("United States of America", "United States"),
            ("UK", "United Kingdom"),
            ("U.K.", "United Kingdom"),
            ("GB", "United Kingdom"),
            ("Great Britain", "United Kingdom"),
            ("England", "United Kingdom"),
            ("United Kingdom", "United Kingdom"),
            ("DE", "Germany"),
            ("GER", "Germany"),
            ("Deutschland", "Germany"),
            ("Germany", "Germany"),
            ("UAE", "United Arab Emirates"),
            ("U.A.E", "United Arab Emirates"),
            ("United Arab Emirates", "United Arab Emirates"),
            ("Korea", "South Korea"),
            ("South Korea", "South Korea"),
            ("Republic of Korea", "South Korea"),
            ("Viet Nam", "Vietnam"),
            ("Vietnam", "Vietnam"),
            ("IND", "India"),
            ("India", "India"),
        ];

        build_map(ALIASES)
    })
}

fn source_alias_map() -> &'static HashMap<String, &'static str> {
    SOURCE_ALIAS_MAP.get_or_init(|| {
        const ALIASES: &[(&str, &str)] = &[
            ("LinkedIn", "LinkedIn"),
            ("Linked In", "LinkedIn"),
            ("Product Signup", "Product Signup"),
            ("Product Sign Up", "Product Signup"),
            ("Product Sign-Up", "Product Signup"),
            ("Signup", "Product Signup"),
            ("Website", "Website"),
            ("Web Site", "Website"),
            ("Web", "Website"),
            ("Event", "Event"),
            ("Events", "Event"),
        ];

        build_map(ALIASES)
    })
}

fn build_map(aliases: &[(&str, &'static str)]) -> HashMap<String, &'static str> {
    let mut map = HashMap::with_capacity(aliases.len());
    for (alias, canonical) in aliases {
        map.insert(alias_key(alias), *canonical);
    }
    map
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest magnitude a single rule may contribute.
pub const MAX_POINTS: i64 = 1_000_000;

/// Versioned scoring configuration.
///
/// `version` is owned by [`super::RulesStore`]; values supplied by callers are
/// overwritten when a ruleset is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Ruleset {
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub title_includes: BTreeMap<String, i64>,
    #[serde(default)]
    pub company_size_points: Vec<SizeBand>,
    #[serde(default)]
    pub country_boost: BTreeMap<String, i64>,
    #[serde(default)]
    pub source_boost: BTreeMap<String, i64>,
    #[serde(default)]
    pub penalties: Penalties,
}

/// Inclusive company size range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeBand {
    pub min: u32,
    pub max: u32,
    pub points: i64,
}

impl SizeBand {
    pub const fn contains(&self, size: u32) -> bool {
        self.min <= size && size <= self.max
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Penalties {
    #[serde(default)]
    pub missing_company: i64,
    #[serde(default)]
    pub missing_title: i64,
}

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("malformed ruleset: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("company size band {min}-{max} has min greater than max")]
    InvertedBand { min: u32, max: u32 },
    #[error("company size bands {first_min}-{first_max} and {second_min}-{second_max} overlap")]
    OverlappingBands {
        first_min: u32,
        first_max: u32,
        second_min: u32,
        second_max: u32,
    },
    #[error("{section} contains a blank key")]
    BlankKey { section: &'static str },
    #[error("{section} entry `{key}` has {points} points, outside ±{limit}", limit = MAX_POINTS)]
    PointsOutOfRange {
        section: &'static str,
        key: String,
        points: i64,
    },
    #[error("failed to encode ruleset: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to access rules file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Default for Ruleset {
    fn default() -> Self {
        let title_includes = [
            ("marketing", 10),
            ("growth", 10),
            ("demand", 10),
            ("vp", 15),
            ("chief", 20),
            ("head", 12),
            ("director", 12),
        ];

        Self {
            version: 1,
            title_includes: points_map(&title_includes),
            company_size_points: vec![
                SizeBand { min: 1, max: 49, points: 5 },
                SizeBand { min: 50, max: 199, points: 10 },
                SizeBand { min: 200, max: 999, points: 20 },
                SizeBand { min: 1000, max: 1_000_000, points: 25 },
            ],
            country_boost: points_map(&[("United States", 5)]),
            source_boost: points_map(&[("Product Signup", 15), ("Website", 10), ("LinkedIn", 8)]),
            penalties: Penalties {
                missing_company: 5,
                missing_title: 0,
            },
        }
    }
}

fn points_map(entries: &[(&str, i64)]) -> BTreeMap<String, i64> {
    entries
        .iter()
        .map(|(key, points)| ((*key).to_string(), *points))
        .collect()
}

impl Ruleset {
    /// Parses and validates a ruleset supplied as raw JSON.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, RulesError> {
        let ruleset: Self = serde_json::from_value(value)?;
        ruleset.validate()?;
        Ok(ruleset)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, RulesError> {
        let ruleset: Self = serde_json::from_str(raw)?;
        ruleset.validate()?;
        Ok(ruleset)
    }

    /// Structural checks that must pass before a ruleset can become active.
    pub fn validate(&self) -> Result<(), RulesError> {
        for band in &self.company_size_points {
            if band.min > band.max {
                return Err(RulesError::InvertedBand {
                    min: band.min,
                    max: band.max,
                });
            }
        }

        let mut bands: Vec<&SizeBand> = self.company_size_points.iter().collect();
        bands.sort_by_key(|band| (band.min, band.max));
        for pair in bands.windows(2) {
            let (first, second) = (pair[0], pair[1]);
            if second.min <= first.max {
                return Err(RulesError::OverlappingBands {
                    first_min: first.min,
                    first_max: first.max,
                    second_min: second.min,
                    second_max: second.max,
                });
            }
        }

        let sections = [
            ("title_includes", &self.title_includes),
            ("country_boost", &self.country_boost),
            ("source_boost", &self.source_boost),
        ];
        for (section, entries) in sections {
            for (key, points) in entries {
                if key.trim().is_empty() {
                    return Err(RulesError::BlankKey { section });
                }
                check_points(section, key, *points)?;
            }
        }

        for band in &self.company_size_points {
            check_points(
                "company_size_points",
                &format!("{}-{}", band.min, band.max),
                band.points,
            )?;
        }
        check_points("penalties", "missing_company", self.penalties.missing_company)?;
        check_points("penalties", "missing_title", self.penalties.missing_title)?;

        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, RulesError> {
        let raw = fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Reads the ruleset at `path`, writing the defaults there first when the
    /// file does not exist yet.
    pub fn load_or_init(path: &Path) -> Result<Self, RulesError> {
        if path.exists() {
            return Self::read(path);
        }

        let ruleset = Self::default();
        ruleset.save(path)?;
        Ok(ruleset)
    }

    /// Writes pretty JSON through a sibling temp file so readers never see a
    /// partial document.
    pub fn save(&self, path: &Path) -> Result<(), RulesError> {
        let io_error = |source: std::io::Error| RulesError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let body = serde_json::to_string_pretty(self).map_err(RulesError::Encode)?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, body).map_err(io_error)?;
        fs::rename(&staging, path).map_err(io_error)
    }
}

fn check_points(section: &'static str, key: &str, points: i64) -> Result<(), RulesError> {
    if points.unsigned_abs() > MAX_POINTS.unsigned_abs() {
        return Err(RulesError::PointsOutOfRange {
            section,
            key: key.to_string(),
            points,
        });
    }
    Ok(())
}

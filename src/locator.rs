//! Typed identifier values for the enumeration hierarchy
//!
//! Raw request parameters are loosely typed strings; everything past the
//! normalization boundary works with these types instead. Each type keeps the
//! canonical text form reachable through `Display` so store keys and
//! diagnostics agree on spelling.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Name budget for wide display contexts (status report rows).
pub const NAME_BUDGET_WIDE: usize = 48;

/// Name budget for narrow display contexts (select lists, breadcrumbs).
pub const NAME_BUDGET_NARROW: usize = 24;

/// Census identifier: 2-5 letter country/domain code plus a 4-digit year,
/// e.g. "CA1881" or "CW1851".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CensusId {
    country: String,
    year: u16,
}

impl CensusId {
    /// Build from an already-uppercased country code and year. The
    /// normalization layer is the only caller that starts from raw text.
    pub fn new(country: impl Into<String>, year: u16) -> Self {
        Self { country: country.into(), year }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    /// The same census re-qualified under a different country/province code.
    /// Used when a collective or pre-confederation id is rewritten to a
    /// concrete per-province id before storage lookups.
    pub fn with_country(&self, country: &str) -> CensusId {
        CensusId { country: country.to_string(), year: self.year }
    }
}

impl fmt::Display for CensusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", self.country, self.year)
    }
}

impl Serialize for CensusId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CensusId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::normalize::census_id(&raw)
            .map_err(|_| D::Error::custom(format!("invalid census id: {raw:?}")))
    }
}

/// Two-letter province/state code, uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvinceCode(String);

impl ProvinceCode {
    /// Caller must supply exactly two uppercase letters; the normalization
    /// layer enforces that for raw input.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProvinceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// District number within a census. Normally integral, but a handful of
/// districts are genuine half numbers ("17.5") sorted strictly between the
/// integers on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistrictNumber {
    Whole(u32),
    Half(u32),
}

impl DistrictNumber {
    /// Ordering key within a census: doubled so that half numbers land on the
    /// odd slots between their integer neighbors.
    pub fn sort_key(&self) -> u64 {
        match self {
            DistrictNumber::Whole(n) => u64::from(*n) * 2,
            DistrictNumber::Half(n) => u64::from(*n) * 2 + 1,
        }
    }
}

impl fmt::Display for DistrictNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistrictNumber::Whole(n) => write!(f, "{n}"),
            DistrictNumber::Half(n) => write!(f, "{n}.5"),
        }
    }
}

impl PartialOrd for DistrictNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DistrictNumber {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl Serialize for DistrictNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DistrictNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::normalize::district(&raw)
            .map_err(|_| D::Error::custom(format!("invalid district number: {raw:?}")))
    }
}

/// Division parameter state. Some subdistricts have no divisions at all, so a
/// blank value ("division=") and an absent parameter mean different things and
/// both must survive to the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "id")]
pub enum DivisionParam {
    #[default]
    Absent,
    Blank,
    Id(String),
}

impl DivisionParam {
    /// The storage-key spelling: both absent and blank look up the
    /// no-division row (empty string key).
    pub fn key_str(&self) -> &str {
        match self {
            DivisionParam::Id(id) => id,
            DivisionParam::Absent | DivisionParam::Blank => "",
        }
    }
}

/// Full storage key for a subdistrict row: census, district, subdistrict id,
/// division (empty string for none) and schedule (defaults to "1").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubDistrictKey {
    pub census: CensusId,
    pub district: DistrictNumber,
    pub id: String,
    #[serde(default)]
    pub division: String,
    #[serde(default = "default_schedule")]
    pub schedule: String,
}

fn default_schedule() -> String {
    "1".to_string()
}

impl fmt::Display for SubDistrictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dist {} subdist {}", self.census, self.district, self.id)?;
        if !self.division.is_empty() {
            write!(f, " div {}", self.division)?;
        }
        if self.schedule != "1" {
            write!(f, " sched {}", self.schedule)?;
        }
        Ok(())
    }
}

/// Truncate a display name to a character budget, appending "..." when
/// anything was cut. Presentation-only: stored names are never mutated.
pub fn truncate_name(name: &str, budget: usize) -> String {
    if name.chars().count() <= budget {
        return name.to_string();
    }
    let keep = budget.saturating_sub(3);
    let mut out: String = name.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn census_id_display_roundtrip() {
        let id = CensusId::new("CA", 1881);
        assert_eq!(id.to_string(), "CA1881");
        assert_eq!(id.country(), "CA");
        assert_eq!(id.year(), 1881);
    }

    #[test]
    fn census_id_with_country_rewrites_prefix() {
        let id = CensusId::new("CA", 1851);
        assert_eq!(id.with_country("CW").to_string(), "CW1851");
    }

    #[test]
    fn half_district_sorts_between_integers() {
        let d17 = DistrictNumber::Whole(17);
        let d17h = DistrictNumber::Half(17);
        let d18 = DistrictNumber::Whole(18);
        assert!(d17 < d17h);
        assert!(d17h < d18);
        assert_eq!(d17h.to_string(), "17.5");
    }

    #[test]
    fn division_key_str_collapses_absent_and_blank() {
        assert_eq!(DivisionParam::Absent.key_str(), "");
        assert_eq!(DivisionParam::Blank.key_str(), "");
        assert_eq!(DivisionParam::Id("2".into()).key_str(), "2");
    }

    #[test]
    fn truncate_name_respects_budget() {
        assert_eq!(truncate_name("Short", 24), "Short");
        let long = "A very long subdistrict name that overruns the column";
        let cut = truncate_name(long, 24);
        assert_eq!(cut.chars().count(), 24);
        assert!(cut.ends_with("..."));
    }
}

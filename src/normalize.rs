//! Identifier normalization: raw strings to typed, validated values
//!
//! One function per request field. None of these touch the entity store, none
//! of them panic, and an invalid value never blocks normalization of another
//! field: failures return [`InvalidSyntax`] carrying the offending raw text
//! for the caller's diagnostics. All functions are idempotent over their own
//! output's string form.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::locator::{CensusId, DistrictNumber, DivisionParam, ProvinceCode};

/// Default country code applied to bare-year census ids ("1881" -> "CA1881").
pub const DEFAULT_COUNTRY: &str = "CA";

/// Default schedule when the caller does not select one.
pub const DEFAULT_SCHEDULE: &str = "1";

/// Raw text that failed a field's syntax pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSyntax {
    pub raw: String,
}

impl InvalidSyntax {
    fn new(raw: &str) -> Self {
        Self { raw: raw.to_string() }
    }
}

pub type NormResult<T> = Result<T, InvalidSyntax>;

static CENSUS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]{2,5})(\d{4})$").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").unwrap());
static PROVINCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]{2}$").unwrap());
static DISTRICT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)(\.5|\.0)?$").unwrap());
static SUBDIST_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9.]+):(.+)$").unwrap());
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// Normalize a census id. Accepts `CCYYYY` (2-5 letter code, case-folded to
/// uppercase) or a bare 4-digit year, which implies [`DEFAULT_COUNTRY`].
pub fn census_id(raw: &str) -> NormResult<CensusId> {
    if YEAR_RE.is_match(raw) {
        // Bare year shorthand from legacy links.
        let year: u16 = raw.parse().map_err(|_| InvalidSyntax::new(raw))?;
        return Ok(CensusId::new(DEFAULT_COUNTRY, year));
    }
    let caps = CENSUS_RE.captures(raw).ok_or_else(|| InvalidSyntax::new(raw))?;
    let country = caps[1].to_ascii_uppercase();
    let year: u16 = caps[2].parse().map_err(|_| InvalidSyntax::new(raw))?;
    Ok(CensusId::new(country, year))
}

/// Normalize a province/state code: exactly two letters, uppercased.
pub fn province(raw: &str) -> NormResult<ProvinceCode> {
    if !PROVINCE_RE.is_match(raw) {
        return Err(InvalidSyntax::new(raw));
    }
    Ok(ProvinceCode::new(raw.to_ascii_uppercase()))
}

/// Normalize a district number. A trailing `.0` is stripped to the integer;
/// `.5` denotes a genuine half-numbered district and is preserved.
pub fn district(raw: &str) -> NormResult<DistrictNumber> {
    let caps = DISTRICT_RE.captures(raw).ok_or_else(|| InvalidSyntax::new(raw))?;
    let whole: u32 = caps[1].parse().map_err(|_| InvalidSyntax::new(raw))?;
    match caps.get(2).map(|m| m.as_str()) {
        Some(".5") => Ok(DistrictNumber::Half(whole)),
        _ => Ok(DistrictNumber::Whole(whole)),
    }
}

/// Result of splitting a possibly-compound subdistrict parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubDistrictToken {
    /// District number embedded as a `"<district>:"` prefix, if present.
    pub prefix: Option<DistrictNumber>,
    /// Bare subdistrict id with any recognized prefix removed.
    pub id: String,
}

/// Split a subdistrict parameter. `"12:B"` yields prefix 12 and id `"B"`;
/// anything without a syntactically valid district prefix is returned whole.
/// Total: never fails, so one bad field cannot mask another.
pub fn sub_district(raw: &str) -> SubDistrictToken {
    if let Some(caps) = SUBDIST_RE.captures(raw) {
        // The prefix pattern admits stray dots ("1.2"); only a valid district
        // number counts as a prefix, otherwise the raw id is kept whole.
        if let Ok(prefix) = district(&caps[1]) {
            return SubDistrictToken { prefix: Some(prefix), id: caps[2].to_string() };
        }
    }
    SubDistrictToken { prefix: None, id: raw.to_string() }
}

/// Normalize the division parameter. Any non-empty string is accepted
/// verbatim; blank and absent remain distinguishable.
pub fn division(raw: Option<&str>) -> DivisionParam {
    match raw {
        None => DivisionParam::Absent,
        Some("") => DivisionParam::Blank,
        Some(id) => DivisionParam::Id(id.to_string()),
    }
}

/// Normalize a page number: digits only. Geometry bounds are checked by the
/// resolver once the subdistrict is known.
pub fn page(raw: &str) -> NormResult<u32> {
    digits(raw)
}

/// Normalize a line number: digits only. The `1..=lines_per_page` bound is
/// checked by the resolver once the census is known.
pub fn line(raw: &str) -> NormResult<u32> {
    digits(raw)
}

fn digits(raw: &str) -> NormResult<u32> {
    if !DIGITS_RE.is_match(raw) {
        return Err(InvalidSyntax::new(raw));
    }
    raw.parse().map_err(|_| InvalidSyntax::new(raw))
}

//! Entity store boundary
//!
//! The resolution and traversal core never owns the census data; it consults
//! a store through this trait. Lookups are keyed and return an explicit
//! `None` for ordinary absence — only infrastructure failures (unreachable or
//! corrupt storage) surface as [`StoreError`] and abort the request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::locator::{CensusId, DistrictNumber, ProvinceCode, SubDistrictKey};

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{Fixture, LoadStats, SqliteStore};

/// Infrastructure failure at the storage layer. The only error category that
/// aborts a request rather than degrading to an issue-annotated result.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Corrupt record: {message}")]
    Corrupt { message: String },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Descriptor for one census dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusDescriptor {
    pub id: CensusId,
    /// Rows per page of the enumeration form.
    pub lines_per_page: u32,
    /// True for simulated multi-province aggregates ("CA1851"); never used
    /// directly as a storage selector — always rewritten to a per-province id
    /// first.
    #[serde(default)]
    pub collective: bool,
    /// Parent federation code for pre-confederation entries ("CW1851" rolls
    /// into "CA"); empty/None otherwise.
    #[serde(default)]
    pub part_of: Option<String>,
    /// Ordered province/state codes valid for this census. Empty for the
    /// concrete per-province rows a collective id expands to.
    #[serde(default)]
    pub provinces: Vec<ProvinceCode>,
}

impl CensusDescriptor {
    pub fn year(&self) -> u16 {
        self.id.year()
    }

    /// Country code for display: the federation for pre-confederation rows,
    /// otherwise the id's own prefix.
    pub fn effective_country(&self) -> &str {
        match &self.part_of {
            Some(code) if !code.is_empty() => code,
            _ => self.id.country(),
        }
    }

    pub fn is_pre_confederation(&self) -> bool {
        matches!(&self.part_of, Some(code) if !code.is_empty())
    }
}

/// One enumeration district within a census.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistrictRecord {
    pub census: CensusId,
    pub number: DistrictNumber,
    pub name: String,
    #[serde(default)]
    pub province: Option<ProvinceCode>,
}

/// Page-number validity within a division's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBound {
    Valid,
    /// Outside `page1 ..= page1 + bypage*(pages-1)`.
    OutOfRange,
    /// Inside the range but off the `bypage` stride.
    WrongStride,
}

/// One subdistrict (or division of a subdistrict) with its page geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubDistrictRecord {
    #[serde(flatten)]
    pub key: SubDistrictKey,
    pub name: String,
    /// First valid page number in this division.
    pub page1: u32,
    /// Page-number increment step, normally 1, occasionally 2 for
    /// double-sided layouts.
    pub bypage: u32,
    /// Count of pages in the division.
    pub pages: u32,
}

impl SubDistrictRecord {
    /// Last valid page number, or `None` when the division has no pages.
    pub fn last_page(&self) -> Option<u32> {
        if self.pages == 0 || self.bypage == 0 {
            return None;
        }
        Some(self.page1 + self.bypage * (self.pages - 1))
    }

    /// Classify a page number against this division's geometry.
    pub fn page_bound(&self, page: u32) -> PageBound {
        let Some(last) = self.last_page() else {
            return PageBound::OutOfRange;
        };
        if page < self.page1 || page > last {
            return PageBound::OutOfRange;
        }
        if (page - self.page1) % self.bypage != 0 {
            return PageBound::WrongStride;
        }
        PageBound::Valid
    }
}

/// One page row with its transcription-completion counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(flatten)]
    pub key: SubDistrictKey,
    pub page: u32,
    pub population: u32,
    /// Lines with the name field transcribed.
    #[serde(default)]
    pub name_count: u32,
    /// Lines with the age field transcribed.
    #[serde(default)]
    pub age_count: u32,
    /// Lines linked to the family-tree database.
    #[serde(default)]
    pub link_count: u32,
    #[serde(default)]
    pub transcriber: Option<String>,
}

/// Summed completion counters over a scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompletionCounts {
    pub population: u64,
    pub name_count: u64,
    pub age_count: u64,
    pub link_count: u64,
}

impl CompletionCounts {
    pub fn add_page(&mut self, page: &PageRecord) {
        self.population += u64::from(page.population);
        self.name_count += u64::from(page.name_count);
        self.age_count += u64::from(page.age_count);
        self.link_count += u64::from(page.link_count);
    }
}

/// Aggregation scope for completion counts, leaf to national.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    National,
    Census(CensusId),
    Province(CensusId, ProvinceCode),
    District(CensusId, DistrictNumber),
    /// Covers one subdistrict row, i.e. one division (or the whole
    /// subdistrict when it has no divisions).
    SubDistrict(SubDistrictKey),
    Page(SubDistrictKey, u32),
}

/// Read interface the core consumes. Ordered scans provide the adjacency
/// metadata the traversal engine needs; per-row lookups return `None` for
/// ordinary absence.
pub trait EntityStore {
    fn census(&self, id: &CensusId) -> StoreResult<Option<CensusDescriptor>>;

    /// All census descriptors ordered by (year, country code).
    fn censuses(&self) -> StoreResult<Vec<CensusDescriptor>>;

    fn district(
        &self,
        census: &CensusId,
        number: DistrictNumber,
    ) -> StoreResult<Option<DistrictRecord>>;

    /// Districts of a census ordered by district number (half numbers between
    /// their integer neighbors).
    fn districts(&self, census: &CensusId) -> StoreResult<Vec<DistrictRecord>>;

    fn sub_district(&self, key: &SubDistrictKey) -> StoreResult<Option<SubDistrictRecord>>;

    /// Subdistrict rows of a district ordered by (subdistrict id, division),
    /// the stored sequence the original navigation followed.
    fn sub_districts(
        &self,
        census: &CensusId,
        district: DistrictNumber,
    ) -> StoreResult<Vec<SubDistrictRecord>>;

    fn page(&self, key: &SubDistrictKey, page: u32) -> StoreResult<Option<PageRecord>>;

    /// Summed completion counters over a scope.
    fn completion_counts(&self, scope: &Scope) -> StoreResult<CompletionCounts>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sd(page1: u32, bypage: u32, pages: u32) -> SubDistrictRecord {
        SubDistrictRecord {
            key: SubDistrictKey {
                census: CensusId::new("CA", 1881),
                district: DistrictNumber::Whole(25),
                id: "A".into(),
                division: String::new(),
                schedule: "1".into(),
            },
            name: "Test".into(),
            page1,
            bypage,
            pages,
        }
    }

    #[test]
    fn page_bound_classifies_stride_and_range() {
        let rec = sd(1, 2, 5); // valid pages 1,3,5,7,9
        assert_eq!(rec.last_page(), Some(9));
        for p in [1, 3, 5, 7, 9] {
            assert_eq!(rec.page_bound(p), PageBound::Valid);
        }
        assert_eq!(rec.page_bound(4), PageBound::WrongStride);
        assert_eq!(rec.page_bound(0), PageBound::OutOfRange);
        assert_eq!(rec.page_bound(11), PageBound::OutOfRange);
    }

    #[test]
    fn empty_division_has_no_valid_pages() {
        let rec = sd(1, 1, 0);
        assert_eq!(rec.last_page(), None);
        assert_eq!(rec.page_bound(1), PageBound::OutOfRange);
    }

    #[test]
    fn effective_country_prefers_part_of() {
        let pre = CensusDescriptor {
            id: CensusId::new("CW", 1851),
            lines_per_page: 50,
            collective: false,
            part_of: Some("CA".into()),
            provinces: vec![],
        };
        assert_eq!(pre.effective_country(), "CA");
        assert!(pre.is_pre_confederation());

        let post = CensusDescriptor {
            id: CensusId::new("CA", 1881),
            lines_per_page: 25,
            collective: false,
            part_of: None,
            provinces: vec![ProvinceCode::new("ON")],
        };
        assert_eq!(post.effective_country(), "CA");
    }
}

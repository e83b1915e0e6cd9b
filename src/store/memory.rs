//! In-memory entity store
//!
//! Backs unit and integration tests without SQLite; also serves small fixture
//! datasets loaded wholesale. Rows are kept sorted on insert so the ordered
//! scans match the SQLite implementation exactly.

use std::collections::HashMap;

use crate::locator::{CensusId, DistrictNumber, SubDistrictKey};

use super::{
    CensusDescriptor, CompletionCounts, DistrictRecord, EntityStore, PageRecord, Scope,
    StoreResult, SubDistrictRecord,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    censuses: Vec<CensusDescriptor>,
    districts: Vec<DistrictRecord>,
    sub_districts: Vec<SubDistrictRecord>,
    pages: HashMap<(SubDistrictKey, u32), PageRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_census(&mut self, descriptor: CensusDescriptor) -> &mut Self {
        self.censuses.push(descriptor);
        self.censuses
            .sort_by(|a, b| (a.year(), a.id.country()).cmp(&(b.year(), b.id.country())));
        self
    }

    pub fn add_district(&mut self, district: DistrictRecord) -> &mut Self {
        self.districts.push(district);
        self.districts.sort_by_key(|d| (d.census.clone(), d.number.sort_key()));
        self
    }

    pub fn add_sub_district(&mut self, sub: SubDistrictRecord) -> &mut Self {
        self.sub_districts.push(sub);
        self.sub_districts.sort_by(|a, b| {
            (a.key.census.clone(), a.key.district.sort_key(), &a.key.id, &a.key.division)
                .cmp(&(b.key.census.clone(), b.key.district.sort_key(), &b.key.id, &b.key.division))
        });
        self
    }

    pub fn add_page(&mut self, page: PageRecord) -> &mut Self {
        self.pages.insert((page.key.clone(), page.page), page);
        self
    }

    fn page_in_scope(page: &PageRecord, scope: &Scope, districts: &[DistrictRecord]) -> bool {
        match scope {
            Scope::National => true,
            Scope::Census(id) => page.key.census == *id,
            Scope::Province(id, prov) => {
                page.key.census == *id
                    && districts.iter().any(|d| {
                        d.census == *id
                            && d.number == page.key.district
                            && d.province.as_ref() == Some(prov)
                    })
            }
            Scope::District(id, number) => {
                page.key.census == *id && page.key.district == *number
            }
            Scope::SubDistrict(key) => page.key == *key,
            Scope::Page(key, number) => page.key == *key && page.page == *number,
        }
    }
}

impl EntityStore for MemoryStore {
    fn census(&self, id: &CensusId) -> StoreResult<Option<CensusDescriptor>> {
        Ok(self.censuses.iter().find(|c| c.id == *id).cloned())
    }

    fn censuses(&self) -> StoreResult<Vec<CensusDescriptor>> {
        Ok(self.censuses.clone())
    }

    fn district(
        &self,
        census: &CensusId,
        number: DistrictNumber,
    ) -> StoreResult<Option<DistrictRecord>> {
        Ok(self
            .districts
            .iter()
            .find(|d| d.census == *census && d.number == number)
            .cloned())
    }

    fn districts(&self, census: &CensusId) -> StoreResult<Vec<DistrictRecord>> {
        Ok(self.districts.iter().filter(|d| d.census == *census).cloned().collect())
    }

    fn sub_district(&self, key: &SubDistrictKey) -> StoreResult<Option<SubDistrictRecord>> {
        Ok(self.sub_districts.iter().find(|s| s.key == *key).cloned())
    }

    fn sub_districts(
        &self,
        census: &CensusId,
        district: DistrictNumber,
    ) -> StoreResult<Vec<SubDistrictRecord>> {
        Ok(self
            .sub_districts
            .iter()
            .filter(|s| s.key.census == *census && s.key.district == district)
            .cloned()
            .collect())
    }

    fn page(&self, key: &SubDistrictKey, page: u32) -> StoreResult<Option<PageRecord>> {
        Ok(self.pages.get(&(key.clone(), page)).cloned())
    }

    fn completion_counts(&self, scope: &Scope) -> StoreResult<CompletionCounts> {
        let mut counts = CompletionCounts::default();
        for page in self.pages.values() {
            if Self::page_in_scope(page, scope, &self.districts) {
                counts.add_page(page);
            }
        }
        Ok(counts)
    }
}

//! Previous/next traversal across the enumeration hierarchy
//!
//! Neighbor links for every level, computed from the store's ordering
//! metadata instead of whatever page the UI happens to be on. An absent
//! neighbor is a normal terminal state, always distinct from a lookup
//! failure: every operation returns `Option` pairs and reserves `Err` for
//! store faults.

use serde::Serialize;

use crate::error::Result;
use crate::locator::{CensusId, DistrictNumber, ProvinceCode};
use crate::store::{CensusDescriptor, DistrictRecord, EntityStore, SubDistrictRecord};

/// Prev/next page numbers within one division. Never crosses the division
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageNeighbors {
    pub prev: Option<u32>,
    pub next: Option<u32>,
}

/// A province position within a concrete census, for province-level stepping
/// that crosses census boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvinceLink {
    pub census: CensusId,
    pub province: ProvinceCode,
}

/// Neighbor pages within a division: `page - bypage` and `page + bypage`,
/// clipped at `page1` and the last valid page.
pub fn prev_next_page(sub: &SubDistrictRecord, page: u32) -> PageNeighbors {
    let Some(last) = sub.last_page() else {
        return PageNeighbors { prev: None, next: None };
    };
    let prev = (page >= sub.page1 + sub.bypage).then(|| page - sub.bypage);
    let next = (page < last).then(|| page + sub.bypage);
    PageNeighbors { prev, next }
}

pub struct TraversalEngine<'a, S: EntityStore> {
    store: &'a S,
}

impl<'a, S: EntityStore> TraversalEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Adjacent districts by numeric order within the census; half numbers
    /// sit strictly between their integer neighbors. Absent at the ends.
    pub fn prev_next_district(
        &self,
        census: &CensusId,
        current: DistrictNumber,
    ) -> Result<(Option<DistrictRecord>, Option<DistrictRecord>)> {
        let districts = self.store.districts(census)?;
        let mut prev = None;
        let mut next = None;
        for district in districts {
            if district.number < current {
                prev = Some(district);
            } else if district.number > current {
                next = Some(district);
                break;
            }
        }
        Ok((prev, next))
    }

    /// Adjacent division rows in the stored sequence. When the current
    /// district's list is exhausted, falls through to the neighboring
    /// district's last/first row, so the link dead-ends only at the true
    /// first/last record of the census.
    pub fn prev_next_division(
        &self,
        current: &SubDistrictRecord,
    ) -> Result<(Option<SubDistrictRecord>, Option<SubDistrictRecord>)> {
        let census = &current.key.census;
        let siblings = self.store.sub_districts(census, current.key.district)?;
        let position = siblings.iter().position(|s| s.key == current.key);

        let (mut prev, mut next) = match position {
            Some(i) => (
                if i > 0 { siblings.get(i - 1).cloned() } else { None },
                siblings.get(i + 1).cloned(),
            ),
            // Row not in its own district scan: store changed underneath us,
            // treat both directions as boundary.
            None => return Ok((None, None)),
        };

        if prev.is_none() {
            prev = self.adjacent_district_row(census, current.key.district, Direction::Back)?;
        }
        if next.is_none() {
            next = self.adjacent_district_row(census, current.key.district, Direction::Forward)?;
        }
        Ok((prev, next))
    }

    /// Adjacent province in the census's ordered provinces list; at the ends,
    /// the last/first province of the adjacent census in (year, country)
    /// order, or absent when no adjacent census exists.
    pub fn prev_next_province(
        &self,
        census: &CensusDescriptor,
        current: &ProvinceCode,
    ) -> Result<(Option<ProvinceLink>, Option<ProvinceLink>)> {
        let Some(position) = census.provinces.iter().position(|p| p == current) else {
            return Ok((None, None));
        };

        let prev = if position > 0 {
            Some(ProvinceLink {
                census: census.id.clone(),
                province: census.provinces[position - 1].clone(),
            })
        } else {
            self.adjacent_census_province(&census.id, Direction::Back)?
        };

        let next = match census.provinces.get(position + 1) {
            Some(province) => Some(ProvinceLink {
                census: census.id.clone(),
                province: province.clone(),
            }),
            None => self.adjacent_census_province(&census.id, Direction::Forward)?,
        };

        Ok((prev, next))
    }

    /// Last row of the previous district with any rows, or first row of the
    /// next such district.
    fn adjacent_district_row(
        &self,
        census: &CensusId,
        current: DistrictNumber,
        direction: Direction,
    ) -> Result<Option<SubDistrictRecord>> {
        let districts = self.store.districts(census)?;
        let candidates: Vec<&DistrictRecord> = match direction {
            Direction::Back => districts
                .iter()
                .filter(|d| d.number < current)
                .rev()
                .collect(),
            Direction::Forward => districts.iter().filter(|d| d.number > current).collect(),
        };
        for district in candidates {
            let rows = self.store.sub_districts(census, district.number)?;
            let hit = match direction {
                Direction::Back => rows.into_iter().last(),
                Direction::Forward => rows.into_iter().next(),
            };
            if hit.is_some() {
                return Ok(hit);
            }
        }
        Ok(None)
    }

    /// Last/first province of the adjacent census in the public census
    /// ordering. Concrete per-province rows (empty provinces list) are not
    /// part of that ordering.
    fn adjacent_census_province(
        &self,
        current: &CensusId,
        direction: Direction,
    ) -> Result<Option<ProvinceLink>> {
        let ordering: Vec<CensusDescriptor> = self
            .store
            .censuses()?
            .into_iter()
            .filter(|c| !c.provinces.is_empty())
            .collect();
        let Some(position) = ordering.iter().position(|c| c.id == *current) else {
            return Ok(None);
        };
        let neighbor = match direction {
            Direction::Back => position.checked_sub(1).and_then(|i| ordering.get(i)),
            Direction::Forward => ordering.get(position + 1),
        };
        Ok(neighbor.and_then(|census| {
            let province = match direction {
                Direction::Back => census.provinces.last(),
                Direction::Forward => census.provinces.first(),
            };
            province.map(|p| ProvinceLink { census: census.id.clone(), province: p.clone() })
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Back,
    Forward,
}

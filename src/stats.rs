//! Transcription-completion statistics
//!
//! Percentages roll up from page counters: names and ages each count for half
//! of a page's transcription, family-tree links are tracked separately. A
//! zero population is trivially complete (an empty or nonexistent page has
//! nothing left to transcribe), which doubles as the divide-by-zero guard.

use serde::Serialize;

use crate::error::Result;
use crate::locator::truncate_name;
use crate::locator::NAME_BUDGET_WIDE;
use crate::store::{CompletionCounts, EntityStore, Scope};

/// Percent of lines transcribed: names and ages each weigh 50%.
pub fn page_completion(name_count: u64, age_count: u64, population: u64) -> u64 {
    if population == 0 {
        return 100;
    }
    (name_count + age_count) * 50 / population
}

/// Percent of lines linked to the family-tree database.
pub fn link_completion(link_count: u64, population: u64) -> u64 {
    if population == 0 {
        return 100;
    }
    link_count * 100 / population
}

/// Aggregate child (done, total) pairs into one percentage: numerators and
/// denominators sum before the zero guard applies, so partial pages are not
/// double-counted.
pub fn roll_up(children: &[(u64, u64)]) -> u64 {
    let done: u64 = children.iter().map(|(d, _)| d).sum();
    let total: u64 = children.iter().map(|(_, t)| t).sum();
    if total == 0 {
        return 100;
    }
    done * 100 / total
}

/// Completion figures for one scope.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionReport {
    pub population: u64,
    pub name_count: u64,
    pub age_count: u64,
    pub link_count: u64,
    /// Percent of lines transcribed.
    pub transcribed_pct: u64,
    /// Percent of lines linked to the family tree.
    pub linked_pct: u64,
}

impl From<CompletionCounts> for CompletionReport {
    fn from(counts: CompletionCounts) -> Self {
        CompletionReport {
            population: counts.population,
            name_count: counts.name_count,
            age_count: counts.age_count,
            link_count: counts.link_count,
            transcribed_pct: page_completion(
                counts.name_count,
                counts.age_count,
                counts.population,
            ),
            linked_pct: link_completion(counts.link_count, counts.population),
        }
    }
}

/// One child row of a breakdown (a district of a census, or a subdistrict of
/// a district).
#[derive(Debug, Clone, Serialize)]
pub struct BreakdownRow {
    pub key: String,
    pub name: String,
    #[serde(flatten)]
    pub completion: CompletionReport,
}

pub struct StatisticsAggregator<'a, S: EntityStore> {
    store: &'a S,
}

impl<'a, S: EntityStore> StatisticsAggregator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Completion figures for any scope, straight off the store's summed
    /// counters.
    pub fn completion(&self, scope: &Scope) -> Result<CompletionReport> {
        let counts = self.store.completion_counts(scope)?;
        Ok(counts.into())
    }

    /// Per-district rows for a census, for the progress-report table.
    pub fn census_breakdown(&self, scope: &Scope) -> Result<Vec<BreakdownRow>> {
        let Scope::Census(census) = scope else {
            return Ok(Vec::new());
        };
        let mut rows = Vec::new();
        for district in self.store.districts(census)? {
            let counts = self
                .store
                .completion_counts(&Scope::District(census.clone(), district.number))?;
            rows.push(BreakdownRow {
                key: district.number.to_string(),
                name: truncate_name(&district.name, NAME_BUDGET_WIDE),
                completion: counts.into(),
            });
        }
        Ok(rows)
    }

    /// Per-subdistrict rows for a district.
    pub fn district_breakdown(&self, scope: &Scope) -> Result<Vec<BreakdownRow>> {
        let Scope::District(census, number) = scope else {
            return Ok(Vec::new());
        };
        let mut rows = Vec::new();
        for sub in self.store.sub_districts(census, *number)? {
            let counts = self.store.completion_counts(&Scope::SubDistrict(sub.key.clone()))?;
            let key = if sub.key.division.is_empty() {
                sub.key.id.clone()
            } else {
                format!("{} div {}", sub.key.id, sub.key.division)
            };
            rows.push(BreakdownRow {
                key,
                name: truncate_name(&sub.name, NAME_BUDGET_WIDE),
                completion: counts.into(),
            });
        }
        Ok(rows)
    }
}

//! SQLite-backed entity store
//!
//! Persistent implementation of [`EntityStore`] plus the administrative
//! surface: schema creation and bulk fixture loading. All statements are
//! parameterized; district numbers are stored as text alongside an integer
//! sort key so half-numbered districts order correctly in SQL.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::locator::{CensusId, DistrictNumber, ProvinceCode, SubDistrictKey};
use crate::normalize;

use super::{
    CensusDescriptor, CompletionCounts, DistrictRecord, EntityStore, PageRecord, Scope,
    StoreError, StoreResult, SubDistrictRecord,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS censuses (
    id             TEXT PRIMARY KEY,
    year           INTEGER NOT NULL,
    country        TEXT NOT NULL,
    lines_per_page INTEGER NOT NULL,
    collective     INTEGER NOT NULL DEFAULT 0,
    part_of        TEXT,
    provinces      TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS districts (
    census   TEXT NOT NULL,
    number   TEXT NOT NULL,
    sort_key INTEGER NOT NULL,
    name     TEXT NOT NULL,
    province TEXT,
    PRIMARY KEY (census, number)
);

CREATE INDEX IF NOT EXISTS idx_districts_order ON districts (census, sort_key);

CREATE TABLE IF NOT EXISTS sub_districts (
    census   TEXT NOT NULL,
    district TEXT NOT NULL,
    id       TEXT NOT NULL,
    division TEXT NOT NULL DEFAULT '',
    schedule TEXT NOT NULL DEFAULT '1',
    name     TEXT NOT NULL,
    page1    INTEGER NOT NULL DEFAULT 1,
    bypage   INTEGER NOT NULL DEFAULT 1,
    pages    INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (census, district, id, division, schedule)
);

CREATE TABLE IF NOT EXISTS pages (
    census       TEXT NOT NULL,
    district     TEXT NOT NULL,
    sub_district TEXT NOT NULL,
    division     TEXT NOT NULL DEFAULT '',
    schedule     TEXT NOT NULL DEFAULT '1',
    page         INTEGER NOT NULL,
    population   INTEGER NOT NULL DEFAULT 0,
    name_count   INTEGER NOT NULL DEFAULT 0,
    age_count    INTEGER NOT NULL DEFAULT 0,
    link_count   INTEGER NOT NULL DEFAULT 0,
    transcriber  TEXT,
    PRIMARY KEY (census, district, sub_district, division, schedule, page)
);
";

/// Bulk-load document for `store load`: any subset of the four tables.
#[derive(Debug, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub censuses: Vec<CensusDescriptor>,
    #[serde(default)]
    pub districts: Vec<DistrictRecord>,
    #[serde(default)]
    pub sub_districts: Vec<SubDistrictRecord>,
    #[serde(default)]
    pub pages: Vec<PageRecord>,
}

/// Row counts from a fixture load.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LoadStats {
    pub censuses: usize,
    pub districts: usize,
    pub sub_districts: usize,
    pub pages: usize,
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create the schema (idempotent).
    pub fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Load a fixture document in one transaction, replacing rows that share
    /// a primary key.
    pub fn load_fixture(&mut self, fixture: &Fixture) -> StoreResult<LoadStats> {
        self.init_schema()?;
        let tx = self.conn.transaction()?;
        let mut stats = LoadStats::default();

        for census in &fixture.censuses {
            let provinces: Vec<&str> =
                census.provinces.iter().map(ProvinceCode::as_str).collect();
            tx.execute(
                "INSERT OR REPLACE INTO censuses
                 (id, year, country, lines_per_page, collective, part_of, provinces)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    census.id.to_string(),
                    census.year(),
                    census.id.country(),
                    census.lines_per_page,
                    census.collective as i64,
                    census.part_of,
                    provinces.join(","),
                ],
            )?;
            stats.censuses += 1;
        }

        for district in &fixture.districts {
            tx.execute(
                "INSERT OR REPLACE INTO districts (census, number, sort_key, name, province)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    district.census.to_string(),
                    district.number.to_string(),
                    district.number.sort_key() as i64,
                    district.name,
                    district.province.as_ref().map(ProvinceCode::as_str),
                ],
            )?;
            stats.districts += 1;
        }

        for sub in &fixture.sub_districts {
            tx.execute(
                "INSERT OR REPLACE INTO sub_districts
                 (census, district, id, division, schedule, name, page1, bypage, pages)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    sub.key.census.to_string(),
                    sub.key.district.to_string(),
                    sub.key.id,
                    sub.key.division,
                    sub.key.schedule,
                    sub.name,
                    sub.page1,
                    sub.bypage,
                    sub.pages,
                ],
            )?;
            stats.sub_districts += 1;
        }

        for page in &fixture.pages {
            tx.execute(
                "INSERT OR REPLACE INTO pages
                 (census, district, sub_district, division, schedule, page,
                  population, name_count, age_count, link_count, transcriber)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    page.key.census.to_string(),
                    page.key.district.to_string(),
                    page.key.id,
                    page.key.division,
                    page.key.schedule,
                    page.page,
                    page.population,
                    page.name_count,
                    page.age_count,
                    page.link_count,
                    page.transcriber,
                ],
            )?;
            stats.pages += 1;
        }

        tx.commit()?;
        debug!(?stats, "fixture loaded");
        Ok(stats)
    }
}

fn parse_census_id(text: &str) -> StoreResult<CensusId> {
    normalize::census_id(text).map_err(|_| StoreError::Corrupt {
        message: format!("bad census id in store: {text:?}"),
    })
}

fn parse_district_number(text: &str) -> StoreResult<DistrictNumber> {
    normalize::district(text).map_err(|_| StoreError::Corrupt {
        message: format!("bad district number in store: {text:?}"),
    })
}

fn parse_provinces(text: &str) -> Vec<ProvinceCode> {
    text.split(',')
        .filter(|s| !s.is_empty())
        .map(ProvinceCode::new)
        .collect()
}

/// Raw census row before id/province parsing.
type CensusRow = (String, u32, bool, Option<String>, String);

fn census_from_row(row: CensusRow) -> StoreResult<CensusDescriptor> {
    let (id, lines_per_page, collective, part_of, provinces) = row;
    Ok(CensusDescriptor {
        id: parse_census_id(&id)?,
        lines_per_page,
        collective,
        part_of: part_of.filter(|p| !p.is_empty()),
        provinces: parse_provinces(&provinces),
    })
}

type DistrictRow = (String, String, String, Option<String>);

fn district_from_row(row: DistrictRow) -> StoreResult<DistrictRecord> {
    let (census, number, name, province) = row;
    Ok(DistrictRecord {
        census: parse_census_id(&census)?,
        number: parse_district_number(&number)?,
        name,
        province: province.filter(|p| !p.is_empty()).map(ProvinceCode::new),
    })
}

impl EntityStore for SqliteStore {
    fn census(&self, id: &CensusId) -> StoreResult<Option<CensusDescriptor>> {
        let row: Option<CensusRow> = self
            .conn
            .query_row(
                "SELECT id, lines_per_page, collective, part_of, provinces
                 FROM censuses WHERE id = ?1",
                params![id.to_string()],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
            )
            .optional()?;
        row.map(census_from_row).transpose()
    }

    fn censuses(&self) -> StoreResult<Vec<CensusDescriptor>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, lines_per_page, collective, part_of, provinces
             FROM censuses ORDER BY year, country",
        )?;
        let rows = stmt.query_map([], |r| {
            Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?))
        })?;
        rows.map(|r| census_from_row(r?)).collect()
    }

    fn district(
        &self,
        census: &CensusId,
        number: DistrictNumber,
    ) -> StoreResult<Option<DistrictRecord>> {
        let row: Option<DistrictRow> = self
            .conn
            .query_row(
                "SELECT census, number, name, province
                 FROM districts WHERE census = ?1 AND number = ?2",
                params![census.to_string(), number.to_string()],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .optional()?;
        row.map(district_from_row).transpose()
    }

    fn districts(&self, census: &CensusId) -> StoreResult<Vec<DistrictRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT census, number, name, province
             FROM districts WHERE census = ?1 ORDER BY sort_key",
        )?;
        let rows = stmt.query_map(params![census.to_string()], |r| {
            Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
        })?;
        rows.map(|r| district_from_row(r?)).collect()
    }

    fn sub_district(&self, key: &SubDistrictKey) -> StoreResult<Option<SubDistrictRecord>> {
        let row: Option<(String, u32, u32, u32)> = self
            .conn
            .query_row(
                "SELECT name, page1, bypage, pages
                 FROM sub_districts
                 WHERE census = ?1 AND district = ?2 AND id = ?3
                   AND division = ?4 AND schedule = ?5",
                params![
                    key.census.to_string(),
                    key.district.to_string(),
                    key.id,
                    key.division,
                    key.schedule,
                ],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .optional()?;
        Ok(row.map(|(name, page1, bypage, pages)| SubDistrictRecord {
            key: key.clone(),
            name,
            page1,
            bypage,
            pages,
        }))
    }

    fn sub_districts(
        &self,
        census: &CensusId,
        district: DistrictNumber,
    ) -> StoreResult<Vec<SubDistrictRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, division, schedule, name, page1, bypage, pages
             FROM sub_districts
             WHERE census = ?1 AND district = ?2
             ORDER BY id, division",
        )?;
        let rows = stmt.query_map(params![census.to_string(), district.to_string()], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
                r.get::<_, String>(3)?,
                r.get::<_, u32>(4)?,
                r.get::<_, u32>(5)?,
                r.get::<_, u32>(6)?,
            ))
        })?;
        let mut out = Vec::new();
        for row in rows {
            let (id, division, schedule, name, page1, bypage, pages) = row?;
            out.push(SubDistrictRecord {
                key: SubDistrictKey {
                    census: census.clone(),
                    district,
                    id,
                    division,
                    schedule,
                },
                name,
                page1,
                bypage,
                pages,
            });
        }
        Ok(out)
    }

    fn page(&self, key: &SubDistrictKey, page: u32) -> StoreResult<Option<PageRecord>> {
        let row: Option<(u32, u32, u32, u32, Option<String>)> = self
            .conn
            .query_row(
                "SELECT population, name_count, age_count, link_count, transcriber
                 FROM pages
                 WHERE census = ?1 AND district = ?2 AND sub_district = ?3
                   AND division = ?4 AND schedule = ?5 AND page = ?6",
                params![
                    key.census.to_string(),
                    key.district.to_string(),
                    key.id,
                    key.division,
                    key.schedule,
                    page,
                ],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)),
            )
            .optional()?;
        Ok(row.map(
            |(population, name_count, age_count, link_count, transcriber)| PageRecord {
                key: key.clone(),
                page,
                population,
                name_count,
                age_count,
                link_count,
                transcriber,
            },
        ))
    }

    fn completion_counts(&self, scope: &Scope) -> StoreResult<CompletionCounts> {
        const SUMS: &str = "COALESCE(SUM(p.population), 0), COALESCE(SUM(p.name_count), 0),
                            COALESCE(SUM(p.age_count), 0), COALESCE(SUM(p.link_count), 0)";

        let (sql, binds): (String, Vec<String>) = match scope {
            Scope::National => (format!("SELECT {SUMS} FROM pages p"), vec![]),
            Scope::Census(id) => (
                format!("SELECT {SUMS} FROM pages p WHERE p.census = ?1"),
                vec![id.to_string()],
            ),
            Scope::Province(id, prov) => (
                format!(
                    "SELECT {SUMS} FROM pages p
                     JOIN districts d ON d.census = p.census AND d.number = p.district
                     WHERE p.census = ?1 AND d.province = ?2"
                ),
                vec![id.to_string(), prov.as_str().to_string()],
            ),
            Scope::District(id, number) => (
                format!("SELECT {SUMS} FROM pages p WHERE p.census = ?1 AND p.district = ?2"),
                vec![id.to_string(), number.to_string()],
            ),
            Scope::SubDistrict(key) => (
                format!(
                    "SELECT {SUMS} FROM pages p
                     WHERE p.census = ?1 AND p.district = ?2 AND p.sub_district = ?3
                       AND p.division = ?4 AND p.schedule = ?5"
                ),
                vec![
                    key.census.to_string(),
                    key.district.to_string(),
                    key.id.clone(),
                    key.division.clone(),
                    key.schedule.clone(),
                ],
            ),
            Scope::Page(key, page) => (
                format!(
                    "SELECT {SUMS} FROM pages p
                     WHERE p.census = ?1 AND p.district = ?2 AND p.sub_district = ?3
                       AND p.division = ?4 AND p.schedule = ?5 AND p.page = ?6"
                ),
                vec![
                    key.census.to_string(),
                    key.district.to_string(),
                    key.id.clone(),
                    key.division.clone(),
                    key.schedule.clone(),
                    page.to_string(),
                ],
            ),
        };

        let (population, name_count, age_count, link_count): (i64, i64, i64, i64) =
            self.conn.query_row(&sql, rusqlite::params_from_iter(binds.iter()), |r| {
                Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
            })?;

        Ok(CompletionCounts {
            population: population as u64,
            name_count: name_count as u64,
            age_count: age_count as u64,
            link_count: link_count as u64,
        })
    }
}

//! Shared test fixtures
//!
//! A canonical two-era dataset: the post-confederation 1881 census plus the
//! pre-confederation 1851 censuses (collective id and concrete per-province
//! rows). Loaded into a temp-dir SQLite store so tests exercise the same
//! implementation production uses.
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

use census_locator::store::Fixture;
use census_locator::{HierarchyResolver, RawParams, Resolution, SqliteStore};

pub const FIXTURE_JSON: &str = r#"{
    "censuses": [
        {"id": "CA1851", "lines_per_page": 50, "collective": true,
         "provinces": ["CW", "CE"]},
        {"id": "CW1851", "lines_per_page": 50, "part_of": "CA"},
        {"id": "CE1851", "lines_per_page": 50, "part_of": "CA"},
        {"id": "CA1881", "lines_per_page": 25,
         "provinces": ["ON", "QC", "NS"]}
    ],
    "districts": [
        {"census": "CA1881", "number": "17", "name": "Halton", "province": "ON"},
        {"census": "CA1881", "number": "17.5", "name": "Cardwell", "province": "ON"},
        {"census": "CA1881", "number": "25", "name": "Grey South", "province": "ON"},
        {"census": "CA1881", "number": "26", "name": "Quebec East", "province": "QC"},
        {"census": "CW1851", "number": "1", "name": "Glengarry", "province": "CW"}
    ],
    "sub_districts": [
        {"census": "CA1881", "district": "17", "id": "A", "name": "Esquesing",
         "page1": 1, "bypage": 1, "pages": 8},
        {"census": "CA1881", "district": "17.5", "id": "A", "name": "Albion",
         "page1": 1, "bypage": 1, "pages": 6},
        {"census": "CA1881", "district": "25", "id": "A", "name": "Bentinck",
         "page1": 1, "bypage": 1, "pages": 10},
        {"census": "CA1881", "district": "25", "id": "B", "name": "Glenelg",
         "page1": 1, "bypage": 2, "pages": 5},
        {"census": "CA1881", "district": "26", "id": "A", "name": "St Roch",
         "page1": 1, "bypage": 1, "pages": 12},
        {"census": "CW1851", "district": "1", "id": "A", "name": "Charlottenburgh",
         "page1": 1, "bypage": 1, "pages": 20}
    ],
    "pages": [
        {"census": "CA1881", "district": "25", "id": "A", "page": 1,
         "population": 50, "name_count": 50, "age_count": 50, "link_count": 25,
         "transcriber": "jdoe"},
        {"census": "CA1881", "district": "25", "id": "A", "page": 2,
         "population": 50, "name_count": 25, "age_count": 25, "link_count": 0},
        {"census": "CA1881", "district": "25", "id": "B", "page": 1,
         "population": 40, "name_count": 0, "age_count": 0, "link_count": 0},
        {"census": "CA1881", "district": "26", "id": "A", "page": 1,
         "population": 60, "name_count": 60, "age_count": 60, "link_count": 30}
    ]
}"#;

/// A seeded SQLite store in a temp directory.
pub struct TestStore {
    dir: TempDir,
    pub store: SqliteStore,
}

impl TestStore {
    pub fn seeded() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let db = dir.path().join("census.db");
        let mut store = SqliteStore::open(&db).expect("open store");
        let fixture: Fixture = serde_json::from_str(FIXTURE_JSON).expect("parse fixture");
        store.load_fixture(&fixture).expect("load fixture");
        Self { dir, store }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("census.db")
    }

    /// Write the fixture JSON next to the database for CLI `store load`.
    pub fn fixture_path(&self) -> PathBuf {
        let path = self.dir.path().join("fixture.json");
        fs::write(&path, FIXTURE_JSON).expect("write fixture");
        path
    }

    pub fn resolve(&self, pairs: &[(&str, &str)]) -> Resolution {
        let params = RawParams::from_pairs(pairs.iter().copied());
        HierarchyResolver::new(&self.store).resolve(&params).expect("resolve")
    }
}

/// Run the census-locator binary against a store, returning stdout.
/// Panics if the command exits nonzero.
pub fn run_cli(db: &PathBuf, args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_census-locator"))
        .arg("--db")
        .arg(db)
        .args(args)
        .output()
        .expect("run census-locator");
    assert!(
        output.status.success(),
        "census-locator {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf8 stdout")
}

/// Run the binary expecting failure, returning stderr.
pub fn run_cli_err(db: &PathBuf, args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_census-locator"))
        .arg("--db")
        .arg(db)
        .args(args)
        .output()
        .expect("run census-locator");
    assert!(!output.status.success(), "expected failure for {:?}", args);
    String::from_utf8(output.stderr).expect("utf8 stderr")
}

//! Integration tests for census-locator
//!
//! End-to-end behavior over the SQLite store: resolution scenarios,
//! traversal boundaries, and completion statistics. Unit-tier tests live in
//! `#[cfg(test)]` modules next to each source module; these cover the
//! library surface the way a request handler uses it.

mod common;

use census_locator::locator::DivisionParam;
use census_locator::store::{EntityStore, Scope};
use census_locator::{
    prev_next_page, CensusId, DistrictNumber, Field, IssueKind, ProvinceCode, Severity,
    StatisticsAggregator, TraversalEngine,
};

use common::TestStore;

// ============================================================================
// RESOLUTION SCENARIOS
// ============================================================================

#[test]
fn full_locator_resolves_without_issues() {
    let fixture = TestStore::seeded();
    let res = fixture.resolve(&[
        ("census", "CA1881"),
        ("district", "25.0"),
        ("subdistrict", "25:A"),
        ("division", ""),
        ("page", "3"),
    ]);

    assert!(res.issues.is_clean(), "issues: {:?}", res.issues);
    let loc = &res.locator;
    assert_eq!(loc.census.as_ref().unwrap().id.to_string(), "CA1881");
    assert_eq!(loc.district_number, Some(DistrictNumber::Whole(25)));
    assert_eq!(loc.district_name, "Grey South");
    assert_eq!(loc.sub_district_id.as_deref(), Some("A"));
    assert_eq!(loc.sub_district.as_ref().unwrap().name, "Bentinck");
    assert_eq!(loc.division, DivisionParam::Blank);
    assert_eq!(loc.page, Some(3));
    assert_eq!(loc.province.as_ref().unwrap().as_str(), "ON");
}

#[test]
fn mismatched_subdistrict_prefix_warns_but_resolves() {
    let fixture = TestStore::seeded();
    let res = fixture.resolve(&[
        ("census", "CA1881"),
        ("district", "25"),
        ("subdistrict", "26:A"),
    ]);

    assert!(!res.issues.has_errors(), "issues: {:?}", res.issues);
    let warning = res.issues.for_field(Field::SubDistrict).next().unwrap();
    assert_eq!(warning.severity, Severity::Warning);
    assert!(matches!(warning.kind, IssueKind::Inconsistent { .. }));
    // The embedded district wins; the bare id survives the prefix strip.
    assert_eq!(res.locator.sub_district_id.as_deref(), Some("A"));
    assert_eq!(
        res.locator.sub_district.as_ref().unwrap().key.district,
        DistrictNumber::Whole(26)
    );
}

#[test]
fn collective_census_defaults_province_and_warns() {
    let fixture = TestStore::seeded();
    let res = fixture.resolve(&[("census", "CA1851")]);

    assert!(!res.issues.has_errors(), "issues: {:?}", res.issues);
    assert!(res.issues.has_warnings());
    assert_eq!(res.locator.province.as_ref().unwrap().as_str(), "CW");
    assert_eq!(res.locator.census.as_ref().unwrap().id.to_string(), "CW1851");
    assert_eq!(res.locator.country.as_deref(), Some("CA"));
}

#[test]
fn bare_year_and_lowercase_census_both_resolve() {
    let fixture = TestStore::seeded();
    for raw in ["1881", "ca1881", "CA1881"] {
        let res = fixture.resolve(&[("census", raw)]);
        assert!(res.issues.is_clean(), "census {raw}: {:?}", res.issues);
        assert_eq!(res.locator.census.as_ref().unwrap().id.to_string(), "CA1881");
    }
}

#[test]
fn all_field_errors_surface_together() {
    let fixture = TestStore::seeded();
    let res = fixture.resolve(&[
        ("census", "ZZ1900"),
        ("district", "x"),
        ("page", "9q"),
        ("line", "0line"),
    ]);

    for field in [Field::Census, Field::District, Field::Page, Field::Line] {
        assert!(
            res.issues.for_field(field).next().is_some(),
            "expected issue for {field:?}: {:?}",
            res.issues
        );
    }
}

#[test]
fn schedule_selects_a_distinct_dataset() {
    let fixture = TestStore::seeded();
    // No schedule-2 rows are loaded, so the same key fails under schedule 2.
    let ok = fixture.resolve(&[
        ("census", "CA1881"),
        ("district", "25"),
        ("subdistrict", "A"),
    ]);
    assert!(ok.issues.is_clean(), "issues: {:?}", ok.issues);

    let missing = fixture.resolve(&[
        ("census", "CA1881"),
        ("district", "25"),
        ("subdistrict", "A"),
        ("schedule", "2"),
    ]);
    let issue = missing.issues.for_field(Field::SubDistrict).next().unwrap();
    assert!(matches!(issue.kind, IssueKind::NotFound { .. }));
}

// ============================================================================
// TRAVERSAL
// ============================================================================

#[test]
fn page_traversal_stays_inside_the_division() {
    let fixture = TestStore::seeded();
    let res = fixture.resolve(&[
        ("census", "CA1881"),
        ("district", "25"),
        ("subdistrict", "B"),
        ("page", "7"),
    ]);
    let sub = res.locator.sub_district.as_ref().unwrap();

    // Glenelg is double-sided: page1=1, bypage=2, pages=5.
    let mid = prev_next_page(sub, 7);
    assert_eq!((mid.prev, mid.next), (Some(5), Some(9)));
    let first = prev_next_page(sub, 1);
    assert_eq!((first.prev, first.next), (None, Some(3)));
    let last = prev_next_page(sub, 9);
    assert_eq!((last.prev, last.next), (Some(7), None));
}

#[test]
fn district_traversal_orders_half_numbers_between() {
    let fixture = TestStore::seeded();
    let engine = TraversalEngine::new(&fixture.store);
    let ca1881 = CensusId::new("CA", 1881);

    let (prev, next) =
        engine.prev_next_district(&ca1881, DistrictNumber::Half(17)).unwrap();
    assert_eq!(prev.unwrap().number, DistrictNumber::Whole(17));
    assert_eq!(next.unwrap().number, DistrictNumber::Whole(25));

    // Boundaries are absent, not errors.
    let (prev, _) = engine.prev_next_district(&ca1881, DistrictNumber::Whole(17)).unwrap();
    assert!(prev.is_none());
    let (_, next) = engine.prev_next_district(&ca1881, DistrictNumber::Whole(26)).unwrap();
    assert!(next.is_none());
}

#[test]
fn division_traversal_falls_through_to_adjacent_district() {
    let fixture = TestStore::seeded();
    let engine = TraversalEngine::new(&fixture.store);
    let res = fixture.resolve(&[
        ("census", "CA1881"),
        ("district", "25"),
        ("subdistrict", "B"),
    ]);
    let sub = res.locator.sub_district.as_ref().unwrap();

    let (prev, next) = engine.prev_next_division(sub).unwrap();
    assert_eq!(prev.unwrap().key.id, "A");
    let next = next.unwrap();
    assert_eq!(next.key.district, DistrictNumber::Whole(26));
    assert_eq!(next.key.id, "A");
}

#[test]
fn province_traversal_crosses_into_adjacent_census() {
    let fixture = TestStore::seeded();
    let engine = TraversalEngine::new(&fixture.store);
    let ca1851 = fixture.store.census(&CensusId::new("CA", 1851)).unwrap().unwrap();

    // Last province of 1851 steps into the first province of 1881.
    let (prev, next) =
        engine.prev_next_province(&ca1851, &ProvinceCode::new("CE")).unwrap();
    assert_eq!(prev.unwrap().province.as_str(), "CW");
    let next = next.unwrap();
    assert_eq!(next.census.to_string(), "CA1881");
    assert_eq!(next.province.as_str(), "ON");

    // First province of the earliest census is the true start.
    let (prev, _) = engine.prev_next_province(&ca1851, &ProvinceCode::new("CW")).unwrap();
    assert!(prev.is_none());
}

// ============================================================================
// STATISTICS
// ============================================================================

#[test]
fn completion_rolls_up_by_scope() {
    let fixture = TestStore::seeded();
    let aggregator = StatisticsAggregator::new(&fixture.store);
    let ca1881 = CensusId::new("CA", 1881);

    // District 25: pages A1 (50/50 of 50) + A2 (25/25 of 50) + B1 (0/0 of 40).
    let district = aggregator
        .completion(&Scope::District(ca1881.clone(), DistrictNumber::Whole(25)))
        .unwrap();
    assert_eq!(district.population, 140);
    assert_eq!(district.transcribed_pct, (50 + 50 + 25 + 25) * 50 / 140);

    // Province scopes split along the district records.
    let ontario = aggregator
        .completion(&Scope::Province(ca1881.clone(), ProvinceCode::new("ON")))
        .unwrap();
    assert_eq!(ontario.population, 140);
    let quebec = aggregator
        .completion(&Scope::Province(ca1881.clone(), ProvinceCode::new("QC")))
        .unwrap();
    assert_eq!(quebec.population, 60);
    assert_eq!(quebec.transcribed_pct, 100);

    // A scope with no pages at all is trivially complete.
    let empty = aggregator
        .completion(&Scope::District(ca1881, DistrictNumber::Whole(17)))
        .unwrap();
    assert_eq!(empty.population, 0);
    assert_eq!(empty.transcribed_pct, 100);
}

#[test]
fn census_breakdown_lists_every_district() {
    let fixture = TestStore::seeded();
    let aggregator = StatisticsAggregator::new(&fixture.store);
    let scope = Scope::Census(CensusId::new("CA", 1881));

    let rows = aggregator.census_breakdown(&scope).unwrap();
    let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["17", "17.5", "25", "26"]);
    let grey = rows.iter().find(|r| r.key == "25").unwrap();
    assert_eq!(grey.completion.population, 140);
}

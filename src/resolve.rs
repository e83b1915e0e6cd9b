//! Hierarchy resolution: normalized parameters to a fully cross-checked locator
//!
//! The single pipeline every handler calls instead of re-deriving the
//! census -> province -> district -> subdistrict -> page -> line cascade
//! inline. Each level resolves independently where possible, so one bad field
//! never hides another: the returned [`Resolution`] carries partial results
//! plus every accumulated issue.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::locator::{CensusId, DistrictNumber, DivisionParam, ProvinceCode, SubDistrictKey};
use crate::normalize;
use crate::params::{ParamField, RawParams};
use crate::report::{Field, IssueKind, Report};
use crate::store::{CensusDescriptor, DistrictRecord, EntityStore, PageBound, SubDistrictRecord};

/// District display name when the parameter was not supplied.
pub const DISTRICT_NAME_MISSING: &str = "Missing";

/// District display name when the parameter was supplied but no entity
/// matched.
pub const DISTRICT_NAME_UNKNOWN: &str = "Unknown";

/// Fully cross-checked locator. Every field is independently either populated
/// or left empty with a matching issue in the report; partial results are
/// always returned so the caller can render a form with defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedLocator {
    /// Census id as requested, after normalization but before any
    /// collective/pre-confederation rewrite.
    pub requested_census: Option<CensusId>,
    /// Working census descriptor after rewrite; the id used for all
    /// lower-level lookups.
    pub census: Option<CensusDescriptor>,
    /// Country/federation code for display ("CA" for "CW1851").
    pub country: Option<String>,
    pub province: Option<ProvinceCode>,
    /// Survives a failed district lookup so later levels can still resolve.
    pub district_number: Option<DistrictNumber>,
    pub district: Option<DistrictRecord>,
    /// Resolved name or a placeholder distinguishing "not supplied" from
    /// "not found".
    pub district_name: String,
    pub sub_district_id: Option<String>,
    pub sub_district: Option<SubDistrictRecord>,
    pub division: DivisionParam,
    pub schedule: String,
    pub page: Option<u32>,
    pub line: Option<u32>,
}

/// A resolution outcome: the locator plus every issue found on the way.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub locator: ResolvedLocator,
    pub issues: Report,
}

pub struct HierarchyResolver<'a, S: EntityStore> {
    store: &'a S,
}

impl<'a, S: EntityStore> HierarchyResolver<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Resolve a raw parameter map. Only store failures abort; every expected
    /// problem lands in the returned report.
    pub fn resolve(&self, params: &RawParams) -> Result<Resolution> {
        let mut report = Report::new();
        let mut locator = ResolvedLocator {
            schedule: params
                .get_nonblank(ParamField::Schedule)
                .unwrap_or(normalize::DEFAULT_SCHEDULE)
                .to_string(),
            ..Default::default()
        };

        for (name, value) in params.unrecognized() {
            report.warning(
                Field::Request,
                IssueKind::Unrecognized { name: name.clone(), value: value.clone() },
            );
        }

        self.resolve_province(params, &mut locator, &mut report);
        self.resolve_census(params, &mut locator, &mut report)?;

        // The subdistrict parameter may embed the district number, so it is
        // split before district resolution can finish.
        let sub_token = params.get_nonblank(ParamField::SubDistrict).map(normalize::sub_district);

        self.resolve_district(params, sub_token.as_ref(), &mut locator, &mut report)?;
        self.resolve_sub_district(params, sub_token, &mut locator, &mut report)?;
        self.resolve_page(params, &mut locator, &mut report);
        self.resolve_line(params, &mut locator, &mut report);

        Ok(Resolution { locator, issues: report })
    }

    fn resolve_province(
        &self,
        params: &RawParams,
        locator: &mut ResolvedLocator,
        report: &mut Report,
    ) {
        if let Some(raw) = params.get_nonblank(ParamField::Province) {
            match normalize::province(raw) {
                Ok(code) => locator.province = Some(code),
                Err(invalid) => {
                    report.error(Field::Province, IssueKind::Syntax { raw: invalid.raw })
                }
            }
        }
    }

    fn resolve_census(
        &self,
        params: &RawParams,
        locator: &mut ResolvedLocator,
        report: &mut Report,
    ) -> Result<()> {
        let Some(raw) = params.get_nonblank(ParamField::Census) else {
            report.error(Field::Census, IssueKind::Missing);
            return Ok(());
        };
        let requested = match normalize::census_id(raw) {
            Ok(id) => id,
            Err(invalid) => {
                report.error(Field::Census, IssueKind::Syntax { raw: invalid.raw });
                return Ok(());
            }
        };
        locator.requested_census = Some(requested.clone());

        let Some(public) = self.store.census(&requested)? else {
            report.error(Field::Census, IssueKind::NotFound { key: requested.to_string() });
            return Ok(());
        };

        // A supplied province should belong to the census it qualifies.
        if let (Some(province), false) = (&locator.province, public.provinces.is_empty()) {
            if !public.provinces.contains(province) {
                report.warning(
                    Field::Province,
                    IssueKind::Inconsistent {
                        detail: format!("{province} is not a province of {requested}"),
                    },
                );
            }
        }

        if public.collective {
            self.rewrite_collective(requested, public, locator, report)?;
        } else if public.is_pre_confederation() {
            self.rewrite_pre_confederation(requested, public, locator, report)?;
        } else {
            locator.country = Some(public.effective_country().to_string());
            locator.census = Some(public);
        }
        Ok(())
    }

    /// A collective id is never a storage selector: rewrite to a concrete
    /// per-province id, defaulting to the first listed province with a
    /// warning when none was supplied.
    fn rewrite_collective(
        &self,
        requested: CensusId,
        public: CensusDescriptor,
        locator: &mut ResolvedLocator,
        report: &mut Report,
    ) -> Result<()> {
        let province = match locator.province.clone() {
            Some(p) => p,
            None => match public.provinces.first() {
                Some(first) => {
                    warn!(census = %requested, province = %first, "collective census with no province, substituting");
                    report.warning(
                        Field::Province,
                        IssueKind::Substituted {
                            detail: format!(
                                "defaulted to {first} for collective census {requested}"
                            ),
                        },
                    );
                    locator.province = Some(first.clone());
                    first.clone()
                }
                None => {
                    // New collective year with no province data: flag it,
                    // never guess.
                    report.error(
                        Field::Census,
                        IssueKind::BadDescriptor {
                            detail: format!(
                                "collective census {requested} lists no provinces"
                            ),
                        },
                    );
                    return Ok(());
                }
            },
        };

        let rewritten = requested.with_country(province.as_str());
        debug!(from = %requested, to = %rewritten, "collective census rewrite");
        match self.store.census(&rewritten)? {
            Some(concrete) => {
                locator.country = Some(concrete.effective_country().to_string());
                locator.census = Some(concrete);
            }
            None => {
                report.error(Field::Census, IssueKind::NotFound { key: rewritten.to_string() });
            }
        }
        Ok(())
    }

    /// Pre-confederation entries roll into a parent federation; they require
    /// an explicit province and the working id is re-qualified under it.
    fn rewrite_pre_confederation(
        &self,
        requested: CensusId,
        public: CensusDescriptor,
        locator: &mut ResolvedLocator,
        report: &mut Report,
    ) -> Result<()> {
        let Some(province) = locator.province.clone() else {
            report.error(
                Field::Province,
                IssueKind::Missing,
            );
            // Keep the descriptor for lines-per-page so line validation and
            // form defaults still work.
            locator.country = Some(public.effective_country().to_string());
            locator.census = Some(public);
            return Ok(());
        };

        let rewritten = requested.with_country(province.as_str());
        if rewritten == requested {
            locator.country = Some(public.effective_country().to_string());
            locator.census = Some(public);
            return Ok(());
        }
        debug!(from = %requested, to = %rewritten, "pre-confederation census rewrite");
        match self.store.census(&rewritten)? {
            Some(concrete) => {
                locator.country = Some(concrete.effective_country().to_string());
                locator.census = Some(concrete);
            }
            None => {
                report.error(Field::Census, IssueKind::NotFound { key: rewritten.to_string() });
            }
        }
        Ok(())
    }

    fn resolve_district(
        &self,
        params: &RawParams,
        sub_token: Option<&normalize::SubDistrictToken>,
        locator: &mut ResolvedLocator,
        report: &mut Report,
    ) -> Result<()> {
        let embedded = sub_token.and_then(|t| t.prefix);
        match params.get_nonblank(ParamField::District) {
            Some(raw) => match normalize::district(raw) {
                Ok(number) => locator.district_number = Some(number),
                Err(invalid) => {
                    report.error(Field::District, IssueKind::Syntax { raw: invalid.raw });
                    locator.district_name = DISTRICT_NAME_UNKNOWN.to_string();
                }
            },
            None => {
                if let Some(prefix) = embedded {
                    // Legacy select lists embed the district in the
                    // subdistrict value; adopt it.
                    locator.district_number = Some(prefix);
                } else {
                    locator.district_name = DISTRICT_NAME_MISSING.to_string();
                    let deeper_supplied = sub_token.is_some()
                        || params.get_nonblank(ParamField::Page).is_some()
                        || params.get_nonblank(ParamField::Line).is_some();
                    if deeper_supplied {
                        report.error(Field::District, IssueKind::Missing);
                    }
                }
            }
        }

        let (Some(number), Some(census)) = (locator.district_number, &locator.census) else {
            return Ok(());
        };
        match self.store.district(&census.id, number)? {
            Some(record) => {
                locator.district_name = record.name.clone();
                if locator.province.is_none() {
                    locator.province = record.province.clone();
                }
                locator.district = Some(record);
            }
            None => {
                report.error(
                    Field::District,
                    IssueKind::NotFound { key: format!("{} district {}", census.id, number) },
                );
                locator.district_name = DISTRICT_NAME_UNKNOWN.to_string();
            }
        }
        Ok(())
    }

    fn resolve_sub_district(
        &self,
        params: &RawParams,
        sub_token: Option<normalize::SubDistrictToken>,
        locator: &mut ResolvedLocator,
        report: &mut Report,
    ) -> Result<()> {
        locator.division = normalize::division(params.get(ParamField::Division));

        let Some(token) = sub_token else {
            let deeper_supplied = params.get_nonblank(ParamField::Page).is_some()
                || params.get_nonblank(ParamField::Line).is_some();
            if deeper_supplied {
                report.error(Field::SubDistrict, IssueKind::Missing);
            }
            return Ok(());
        };
        locator.sub_district_id = Some(token.id.clone());

        // Reconcile an embedded district prefix against the supplied
        // district. Mismatches warn and the embedded value wins: legacy links
        // carry the authoritative pair.
        let mut lookup_district = locator.district_number;
        if let (Some(prefix), Some(supplied)) = (token.prefix, locator.district_number) {
            if prefix != supplied {
                warn!(%prefix, %supplied, "subdistrict prefix disagrees with district");
                report.warning(
                    Field::SubDistrict,
                    IssueKind::Inconsistent {
                        detail: format!(
                            "embedded district {prefix} does not match district {supplied}"
                        ),
                    },
                );
                lookup_district = Some(prefix);
            }
        }

        let (Some(district), Some(census)) = (lookup_district, &locator.census) else {
            return Ok(());
        };
        let key = SubDistrictKey {
            census: census.id.clone(),
            district,
            id: token.id,
            division: locator.division.key_str().to_string(),
            schedule: locator.schedule.clone(),
        };
        match self.store.sub_district(&key)? {
            Some(record) => locator.sub_district = Some(record),
            None => {
                report.error(Field::SubDistrict, IssueKind::NotFound { key: key.to_string() });
            }
        }
        Ok(())
    }

    fn resolve_page(
        &self,
        params: &RawParams,
        locator: &mut ResolvedLocator,
        report: &mut Report,
    ) {
        let Some(raw) = params.get_nonblank(ParamField::Page) else {
            if params.get_nonblank(ParamField::Line).is_some() {
                report.error(Field::Page, IssueKind::Missing);
            }
            return;
        };
        let number = match normalize::page(raw) {
            Ok(n) => n,
            Err(invalid) => {
                report.error(Field::Page, IssueKind::Syntax { raw: invalid.raw });
                return;
            }
        };

        // Geometry bounds can only be checked once the subdistrict resolved;
        // the syntactically valid number is kept either way so the form can
        // be refilled.
        if let Some(sub) = &locator.sub_district {
            match sub.page_bound(number) {
                PageBound::Valid => {}
                PageBound::OutOfRange => {
                    let detail = match sub.last_page() {
                        Some(last) => format!("valid pages are {}..={}", sub.page1, last),
                        None => "division has no pages".to_string(),
                    };
                    report.error(
                        Field::Page,
                        IssueKind::OutOfRange { value: number.to_string(), detail },
                    );
                    return;
                }
                PageBound::WrongStride => {
                    report.error(
                        Field::Page,
                        IssueKind::OutOfRange {
                            value: number.to_string(),
                            detail: format!(
                                "pages step by {} from {}",
                                sub.bypage, sub.page1
                            ),
                        },
                    );
                    return;
                }
            }
        }
        locator.page = Some(number);
    }

    fn resolve_line(&self, params: &RawParams, locator: &mut ResolvedLocator, report: &mut Report) {
        let Some(raw) = params.get_nonblank(ParamField::Line) else {
            return;
        };
        let number = match normalize::line(raw) {
            Ok(n) => n,
            Err(invalid) => {
                report.error(Field::Line, IssueKind::Syntax { raw: invalid.raw });
                return;
            }
        };
        if let Some(census) = &locator.census {
            if number < 1 || number > census.lines_per_page {
                report.error(
                    Field::Line,
                    IssueKind::OutOfRange {
                        value: number.to_string(),
                        detail: format!("lines run 1..={}", census.lines_per_page),
                    },
                );
                return;
            }
        }
        locator.line = Some(number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::DistrictNumber;
    use crate::report::Severity;
    use crate::store::{MemoryStore, PageRecord};

    fn seed() -> MemoryStore {
        let mut store = MemoryStore::new();
        let ca1881 = CensusId::new("CA", 1881);
        let ca1851 = CensusId::new("CA", 1851);
        let cw1851 = CensusId::new("CW", 1851);

        store.add_census(CensusDescriptor {
            id: ca1881.clone(),
            lines_per_page: 25,
            collective: false,
            part_of: None,
            provinces: ["ON", "QC", "NS"].iter().map(|p| ProvinceCode::new(*p)).collect(),
        });
        store.add_census(CensusDescriptor {
            id: ca1851.clone(),
            lines_per_page: 50,
            collective: true,
            part_of: None,
            provinces: ["CW", "CE"].iter().map(|p| ProvinceCode::new(*p)).collect(),
        });
        store.add_census(CensusDescriptor {
            id: cw1851.clone(),
            lines_per_page: 50,
            collective: false,
            part_of: Some("CA".into()),
            provinces: vec![],
        });

        store.add_district(DistrictRecord {
            census: ca1881.clone(),
            number: DistrictNumber::Whole(25),
            name: "Grey South".into(),
            province: Some(ProvinceCode::new("ON")),
        });
        store.add_district(DistrictRecord {
            census: ca1881.clone(),
            number: DistrictNumber::Whole(30),
            name: "Bruce North".into(),
            province: Some(ProvinceCode::new("ON")),
        });

        for district in [25, 30] {
            store.add_sub_district(SubDistrictRecord {
                key: SubDistrictKey {
                    census: ca1881.clone(),
                    district: DistrictNumber::Whole(district),
                    id: "A".into(),
                    division: String::new(),
                    schedule: "1".into(),
                },
                name: "Bentinck".into(),
                page1: 1,
                bypage: 1,
                pages: 10,
            });
        }
        store.add_page(PageRecord {
            key: SubDistrictKey {
                census: ca1881,
                district: DistrictNumber::Whole(25),
                id: "A".into(),
                division: String::new(),
                schedule: "1".into(),
            },
            page: 3,
            population: 50,
            name_count: 25,
            age_count: 25,
            link_count: 10,
            transcriber: None,
        });
        store
    }

    fn resolve(store: &MemoryStore, pairs: &[(&str, &str)]) -> Resolution {
        let params = RawParams::from_pairs(pairs.iter().copied());
        HierarchyResolver::new(store).resolve(&params).unwrap()
    }

    #[test]
    fn end_to_end_clean_resolution() {
        let store = seed();
        let res = resolve(
            &store,
            &[
                ("census", "CA1881"),
                ("district", "25.0"),
                ("subdistrict", "25:A"),
                ("division", ""),
                ("page", "3"),
            ],
        );
        assert!(res.issues.is_clean(), "issues: {:?}", res.issues);
        let loc = &res.locator;
        assert_eq!(loc.district_number, Some(DistrictNumber::Whole(25)));
        assert_eq!(loc.sub_district_id.as_deref(), Some("A"));
        assert_eq!(loc.division, DivisionParam::Blank);
        assert_eq!(loc.page, Some(3));
        assert_eq!(loc.district_name, "Grey South");
    }

    #[test]
    fn mismatched_prefix_warns_and_uses_embedded_district() {
        let store = seed();
        let res = resolve(
            &store,
            &[("census", "CA1881"), ("district", "25"), ("subdistrict", "30:A")],
        );
        assert!(res.issues.has_warnings());
        assert!(!res.issues.has_errors());
        assert_eq!(res.locator.sub_district_id.as_deref(), Some("A"));
        // Lookup followed the embedded district 30.
        assert_eq!(
            res.locator.sub_district.as_ref().unwrap().key.district,
            DistrictNumber::Whole(30)
        );
    }

    #[test]
    fn collective_census_defaults_first_province_with_warning() {
        let store = seed();
        let res = resolve(&store, &[("census", "CA1851")]);
        assert!(!res.issues.has_errors());
        let warning = res.issues.iter().next().unwrap();
        assert_eq!(warning.severity, Severity::Warning);
        assert!(matches!(warning.kind, IssueKind::Substituted { .. }));
        assert_eq!(res.locator.province.as_ref().unwrap().as_str(), "CW");
        assert_eq!(res.locator.census.as_ref().unwrap().id.to_string(), "CW1851");
        assert_eq!(res.locator.country.as_deref(), Some("CA"));
    }

    #[test]
    fn collective_census_with_province_rewrites_silently() {
        let store = seed();
        let res = resolve(&store, &[("census", "CA1851"), ("province", "cw")]);
        assert!(res.issues.is_clean(), "issues: {:?}", res.issues);
        assert_eq!(res.locator.census.as_ref().unwrap().id.to_string(), "CW1851");
    }

    #[test]
    fn pre_confederation_census_requires_province() {
        let store = seed();
        let res = resolve(&store, &[("census", "CW1851")]);
        assert!(res.issues.has_errors());
        let issue = res.issues.for_field(Field::Province).next().unwrap();
        assert!(matches!(issue.kind, IssueKind::Missing));
        // Partial result still carries the descriptor for form defaults.
        assert!(res.locator.census.is_some());

        let ok = resolve(&store, &[("census", "CW1851"), ("province", "CW")]);
        assert!(ok.issues.is_clean(), "issues: {:?}", ok.issues);
    }

    #[test]
    fn bare_year_census_shorthand_resolves() {
        let store = seed();
        let res = resolve(&store, &[("census", "1881"), ("district", "25")]);
        assert!(res.issues.is_clean(), "issues: {:?}", res.issues);
        assert_eq!(res.locator.census.as_ref().unwrap().id.to_string(), "CA1881");
    }

    #[test]
    fn district_failure_does_not_block_other_errors() {
        let store = seed();
        let res = resolve(
            &store,
            &[("census", "CA1881"), ("district", "99"), ("subdistrict", "99:Z"), ("page", "3x")],
        );
        assert!(res.issues.for_field(Field::District).next().is_some());
        assert!(res.issues.for_field(Field::SubDistrict).next().is_some());
        assert!(res.issues.for_field(Field::Page).next().is_some());
        assert_eq!(res.locator.district_name, DISTRICT_NAME_UNKNOWN);
        assert_eq!(res.locator.district_number, Some(DistrictNumber::Whole(99)));
    }

    #[test]
    fn missing_district_with_deeper_fields_reports_missing() {
        let store = seed();
        let res = resolve(&store, &[("census", "CA1881"), ("subdistrict", "A")]);
        let issue = res.issues.for_field(Field::District).next().unwrap();
        assert!(matches!(issue.kind, IssueKind::Missing));
        assert_eq!(res.locator.district_name, DISTRICT_NAME_MISSING);
    }

    #[test]
    fn embedded_prefix_supplies_missing_district() {
        let store = seed();
        let res = resolve(&store, &[("census", "CA1881"), ("subdistrict", "25:A")]);
        assert!(res.issues.is_clean(), "issues: {:?}", res.issues);
        assert_eq!(res.locator.district_number, Some(DistrictNumber::Whole(25)));
        assert_eq!(res.locator.district_name, "Grey South");
    }

    #[test]
    fn province_implied_by_district_record() {
        let store = seed();
        let res = resolve(&store, &[("census", "CA1881"), ("district", "25")]);
        assert_eq!(res.locator.province.as_ref().unwrap().as_str(), "ON");
    }

    #[test]
    fn page_stride_and_range_errors_are_distinct() {
        let mut store = seed();
        store.add_sub_district(SubDistrictRecord {
            key: SubDistrictKey {
                census: CensusId::new("CA", 1881),
                district: DistrictNumber::Whole(25),
                id: "B".into(),
                division: String::new(),
                schedule: "1".into(),
            },
            name: "Double-sided".into(),
            page1: 1,
            bypage: 2,
            pages: 5,
        });

        let stride = resolve(
            &store,
            &[("census", "CA1881"), ("district", "25"), ("subdistrict", "B"), ("page", "4")],
        );
        let issue = stride.issues.for_field(Field::Page).next().unwrap();
        assert!(matches!(&issue.kind, IssueKind::OutOfRange { detail, .. } if detail.contains("step")));

        let range = resolve(
            &store,
            &[("census", "CA1881"), ("district", "25"), ("subdistrict", "B"), ("page", "11")],
        );
        let issue = range.issues.for_field(Field::Page).next().unwrap();
        assert!(matches!(&issue.kind, IssueKind::OutOfRange { detail, .. } if detail.contains("1..=9")));
    }

    #[test]
    fn line_bounds_follow_census_lines_per_page() {
        let store = seed();
        let res = resolve(
            &store,
            &[
                ("census", "CA1881"),
                ("district", "25"),
                ("subdistrict", "A"),
                ("page", "3"),
                ("line", "26"),
            ],
        );
        let issue = res.issues.for_field(Field::Line).next().unwrap();
        assert!(matches!(issue.kind, IssueKind::OutOfRange { .. }));

        let ok = resolve(
            &store,
            &[
                ("census", "CA1881"),
                ("district", "25"),
                ("subdistrict", "A"),
                ("page", "3"),
                ("line", "25"),
            ],
        );
        assert!(ok.issues.is_clean());
        assert_eq!(ok.locator.line, Some(25));
    }

    #[test]
    fn unrecognized_parameters_surface_as_warnings() {
        let store = seed();
        let res = resolve(&store, &[("census", "CA1881"), ("lang", "fr")]);
        let issue = res.issues.for_field(Field::Request).next().unwrap();
        assert!(matches!(issue.kind, IssueKind::Unrecognized { .. }));
        assert_eq!(issue.severity, Severity::Warning);
    }

    #[test]
    fn multiple_field_errors_accumulate() {
        let store = seed();
        let res = resolve(
            &store,
            &[("census", "XX9999"), ("district", "abc"), ("page", "-1"), ("line", "zz")],
        );
        assert!(res.issues.len() >= 4);
        assert!(res.issues.for_field(Field::Census).next().is_some());
        assert!(res.issues.for_field(Field::District).next().is_some());
        assert!(res.issues.for_field(Field::Page).next().is_some());
        assert!(res.issues.for_field(Field::Line).next().is_some());
    }
}

//! census-locator: hierarchical identifier resolution for census transcription
//!
//! The business-logic core of a data-entry and query system for historical
//! Canadian census transcriptions. Loosely-typed request parameters (census
//! id, province, district number, subdistrict id possibly embedding a
//! district prefix, division, page, line) are normalized, cross-checked
//! against the entity store, and turned into a fully-qualified locator with
//! every validation issue accumulated rather than thrown. On top of that sit
//! previous/next traversal at each hierarchy level and completion-statistics
//! roll-ups.
//!
//! # Example
//!
//! ```ignore
//! use census_locator::{HierarchyResolver, RawParams, SqliteStore};
//!
//! let store = SqliteStore::open(std::path::Path::new("census.db"))?;
//! let params = RawParams::from_pairs([
//!     ("census", "CA1881"),
//!     ("district", "25.0"),
//!     ("subdistrict", "25:A"),
//!     ("page", "3"),
//! ]);
//! let resolution = HierarchyResolver::new(&store).resolve(&params)?;
//! for issue in resolution.issues.iter() {
//!     eprintln!("{issue}");
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod locator;
pub mod normalize;
pub mod params;
pub mod report;
pub mod resolve;
pub mod stats;
pub mod store;
pub mod traverse;

// Re-export commonly used types
pub use cli::{Cli, OutputFormat};
pub use error::{LocatorError, Result};
pub use locator::{CensusId, DistrictNumber, DivisionParam, ProvinceCode, SubDistrictKey};
pub use params::{ParamField, RawParams};
pub use report::{Field, Issue, IssueKind, Report, Severity};
pub use resolve::{HierarchyResolver, ResolvedLocator, Resolution};
pub use stats::{link_completion, page_completion, roll_up, StatisticsAggregator};
pub use store::{
    CensusDescriptor, DistrictRecord, EntityStore, MemoryStore, PageRecord, Scope,
    SqliteStore, StoreError, SubDistrictRecord,
};
pub use traverse::{prev_next_page, PageNeighbors, ProvinceLink, TraversalEngine};

//! Accumulating issue report for resolution requests
//!
//! The original handlers collected validation messages into shared mutable
//! variables scattered through a long procedural script. Here every expected
//! failure is a typed [`Issue`] pushed onto an explicit [`Report`] that
//! travels with the partial result, so a single request can surface several
//! independent field problems at once and the caller renders all of them.

use std::fmt;

use serde::Serialize;

/// Which request field an issue is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Census,
    Province,
    District,
    SubDistrict,
    Division,
    Page,
    Line,
    Schedule,
    /// The request as a whole, for issues not tied to one field
    /// (unrecognized parameter names).
    Request,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Census => "census",
            Field::Province => "province",
            Field::District => "district",
            Field::SubDistrict => "subdistrict",
            Field::Division => "division",
            Field::Page => "page",
            Field::Line => "line",
            Field::Schedule => "schedule",
            Field::Request => "request",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Issue severity. Warnings never block resolution; errors mark the affected
/// level unresolved while the rest of the request proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// The taxonomy of expected failures. Raw text is carried so the caller can
/// echo exactly what was supplied without re-deriving it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum IssueKind {
    /// Raw text does not match the field's expected pattern.
    Syntax { raw: String },
    /// The field was required (directly or by a deeper field) but absent.
    Missing,
    /// Syntactically valid identifier with no matching entity.
    NotFound { key: String },
    /// Cross-level disagreement, e.g. a subdistrict's embedded district
    /// prefix differing from the supplied district.
    Inconsistent { detail: String },
    /// Value outside the bounds implied by its parent (page geometry, line
    /// count). Distinct from not-found.
    OutOfRange { value: String, detail: String },
    /// A default was silently unavailable or substituted; `Substituted` is
    /// the warning emitted when a collective census falls back to its first
    /// province, `BadDescriptor` the error when no fallback exists.
    Substituted { detail: String },
    BadDescriptor { detail: String },
    /// Request parameter name not in the recognized set.
    Unrecognized { name: String, value: String },
}

/// One accumulated issue: field, severity, and what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub field: Field,
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl Issue {
    /// Human-readable one-line message, field name first so multiple issues
    /// sort sensibly in a rendered list.
    pub fn message(&self) -> String {
        match &self.kind {
            IssueKind::Syntax { raw } => format!("{} invalid: \"{}\"", self.field, raw),
            IssueKind::Missing => format!("{} missing", self.field),
            IssueKind::NotFound { key } => format!("{} not found: {}", self.field, key),
            IssueKind::Inconsistent { detail } => {
                format!("{} inconsistent: {}", self.field, detail)
            }
            IssueKind::OutOfRange { value, detail } => {
                format!("{} {} out of range: {}", self.field, value, detail)
            }
            IssueKind::Substituted { detail } => {
                format!("{} substituted: {}", self.field, detail)
            }
            IssueKind::BadDescriptor { detail } => {
                format!("{} descriptor invalid: {}", self.field, detail)
            }
            IssueKind::Unrecognized { name, value } => {
                format!("unrecognized parameter {name}=\"{value}\"")
            }
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Ordered accumulator of issues for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    issues: Vec<Issue>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, field: Field, kind: IssueKind) {
        self.issues.push(Issue { field, severity: Severity::Error, kind });
    }

    pub fn warning(&mut self, field: Field, kind: IssueKind) {
        self.issues.push(Issue { field, severity: Severity::Warning, kind });
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues touching one field, for per-field diagnostics next to a form
    /// input.
    pub fn for_field(&self, field: Field) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.field == field)
    }
}

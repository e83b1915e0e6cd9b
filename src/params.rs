//! Raw request-parameter map
//!
//! The sole entry point for untyped parameter values (query string, form
//! body, or CLI `key=value` pairs). Recognized names form a closed set;
//! anything else lands in an `unrecognized` bucket that is reported, never
//! silently dropped. Values are kept verbatim, including empty strings, so
//! the normalization layer can distinguish "supplied but blank" from absent.

use std::collections::HashMap;

use crate::error::{LocatorError, Result};

/// Closed set of recognized request fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamField {
    Census,
    Province,
    District,
    SubDistrict,
    Division,
    Page,
    Line,
    Schedule,
}

impl ParamField {
    /// Case-insensitive match over the spellings the original endpoints
    /// accepted ("subdist" appears in legacy links alongside "subdistrict").
    pub fn from_name(name: &str) -> Option<ParamField> {
        match name.to_ascii_lowercase().as_str() {
            "census" => Some(ParamField::Census),
            "province" | "prov" => Some(ParamField::Province),
            "district" | "dist" => Some(ParamField::District),
            "subdistrict" | "subdist" => Some(ParamField::SubDistrict),
            "division" | "div" => Some(ParamField::Division),
            "page" => Some(ParamField::Page),
            "line" => Some(ParamField::Line),
            "schedule" | "sched" => Some(ParamField::Schedule),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParamField::Census => "census",
            ParamField::Province => "province",
            ParamField::District => "district",
            ParamField::SubDistrict => "subdistrict",
            ParamField::Division => "division",
            ParamField::Page => "page",
            ParamField::Line => "line",
            ParamField::Schedule => "schedule",
        }
    }
}

/// Unordered map of raw parameter values plus the unrecognized leftovers.
#[derive(Debug, Clone, Default)]
pub struct RawParams {
    values: HashMap<ParamField, String>,
    unrecognized: Vec<(String, String)>,
}

impl RawParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from name/value pairs. Duplicate names follow last-wins, the
    /// same rule the original request layer applied.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (name, value) in pairs {
            params.insert(name.as_ref(), value.into());
        }
        params
    }

    /// Parse CLI-style `key=value` arguments. A missing `=` is a malformed
    /// invocation, not a field issue.
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut pairs = Vec::with_capacity(args.len());
        for arg in args {
            let (name, value) = arg
                .split_once('=')
                .ok_or_else(|| LocatorError::BadParameter { arg: arg.clone() })?;
            pairs.push((name.to_string(), value.to_string()));
        }
        Ok(Self::from_pairs(pairs))
    }

    pub fn insert(&mut self, name: &str, value: String) {
        match ParamField::from_name(name) {
            Some(field) => {
                self.values.insert(field, value);
            }
            None => self.unrecognized.push((name.to_string(), value)),
        }
    }

    /// Raw value for a field; `None` means the parameter was absent, while
    /// `Some("")` means it arrived blank.
    pub fn get(&self, field: ParamField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Like `get`, but treats a blank value as absent. Most fields have no
    /// meaningful blank state; division is the exception and uses `get`.
    pub fn get_nonblank(&self, field: ParamField) -> Option<&str> {
        self.get(field).filter(|v| !v.is_empty())
    }

    pub fn unrecognized(&self) -> &[(String, String)] {
        &self.unrecognized
    }
}

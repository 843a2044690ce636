//! Engine parameter strings.
//!
//! The engine takes its configuration as one string of whitespace-separated
//! `key=value` pairs. [`Parameters`] keeps them as an ordered map so configured
//! defaults can be layered under call-specific overrides before rendering.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, ParamValue>", into = "BTreeMap<String, String>")]
pub struct Parameters {
    entries: BTreeMap<String, String>,
}

/// TOML tables may spell values as strings, numbers or booleans.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl From<ParamValue> for String {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::Text(s) => s,
            ParamValue::Integer(i) => i.to_string(),
            ParamValue::Float(f) => f.to_string(),
            ParamValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<BTreeMap<String, ParamValue>> for Parameters {
    fn from(map: BTreeMap<String, ParamValue>) -> Self {
        Self {
            entries: map.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

impl From<Parameters> for BTreeMap<String, String> {
    fn from(params: Parameters) -> Self {
        params.entries
    }
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an engine-style parameter string (`"max_bin=15 objective=binary"`).
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let mut params = Self::new();
        for token in s.split_whitespace() {
            let (key, value) = split_assignment(token)?;
            params.set(key, value);
        }
        Ok(params)
    }

    /// Parse a single `key=value` assignment, as given on a command line.
    pub fn parse_assignment(s: &str) -> Result<(String, String), CoreError> {
        split_assignment(s.trim()).map(|(k, v)| (k.to_string(), v.to_string()))
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return a copy of `self` with every entry of `overrides` applied on top.
    pub fn merged(&self, overrides: &Parameters) -> Parameters {
        let mut out = self.clone();
        for (k, v) in &overrides.entries {
            out.entries.insert(k.clone(), v.clone());
        }
        out
    }

    /// Render in the engine's `key=value key=value` form. Keys are sorted.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

fn split_assignment(token: &str) -> Result<(&str, &str), CoreError> {
    match token.split_once('=') {
        Some((key, value)) if !key.is_empty() && !value.is_empty() => {
            if value.chars().any(char::is_whitespace) {
                return Err(CoreError::InvalidParameter(format!(
                    "value for '{}' contains whitespace",
                    key
                )));
            }
            Ok((key, value))
        }
        _ => Err(CoreError::InvalidParameter(format!(
            "expected key=value, got '{}'",
            token
        ))),
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in &self.entries {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", k, v)?;
            first = false;
        }
        Ok(())
    }
}

impl FromStr for Parameters {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

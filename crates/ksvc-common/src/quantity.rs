//! Kubernetes resource quantities
//!
//! Parses the quantity grammar used for CPU and memory (`"500m"`, `"2Gi"`,
//! `"1.5"`, `"1e3"`) once, at model-construction time, so compilation never
//! has to deal with malformed quantities. The input string is kept and
//! serialized back verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// Number of bytes in one mebibyte
pub const MEBIBYTE: f64 = 1024.0 * 1024.0;

const BINARY_SUFFIXES: [(&str, f64); 6] = [
    ("Ki", 1024.0),
    ("Mi", 1024.0 * 1024.0),
    ("Gi", 1024.0 * 1024.0 * 1024.0),
    ("Ti", 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("Pi", 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("Ei", 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
];

const DECIMAL_SUFFIXES: [(&str, f64); 9] = [
    ("n", 1e-9),
    ("u", 1e-6),
    ("m", 1e-3),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

/// A parsed Kubernetes resource quantity.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    raw: String,
    value: f64,
}

impl Quantity {
    /// Parse a quantity string
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::quantity(raw, "empty quantity"));
        }

        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '+' || c == '-'))
            .unwrap_or(trimmed.len());
        let (number, suffix) = trimmed.split_at(split);

        let base: f64 = number
            .parse()
            .map_err(|_| Error::quantity(raw, format!("invalid number '{}'", number)))?;
        let multiplier = suffix_multiplier(suffix)
            .ok_or_else(|| Error::quantity(raw, format!("unknown suffix '{}'", suffix)))?;

        let value = base * multiplier;
        if !value.is_finite() {
            return Err(Error::quantity(raw, "quantity is out of range"));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            value,
        })
    }

    /// The quantity as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The quantity in base units (cores, bytes)
    pub fn as_f64(&self) -> f64 {
        self.value
    }

    /// The quantity in base units, rounded up to a whole number
    pub fn value(&self) -> i64 {
        self.value.ceil() as i64
    }

    /// The quantity in thousandths of a base unit, rounded up
    pub fn milli_value(&self) -> i64 {
        (self.value * 1000.0).ceil() as i64
    }

    /// Whether the quantity is zero
    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }
}

fn suffix_multiplier(suffix: &str) -> Option<f64> {
    if suffix.is_empty() {
        return Some(1.0);
    }
    if let Some((_, m)) = BINARY_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        return Some(*m);
    }
    if let Some((_, m)) = DECIMAL_SUFFIXES.iter().find(|(s, _)| *s == suffix) {
        return Some(*m);
    }
    // Decimal exponent form: "1e3", "5E-2"
    let exponent = suffix
        .strip_prefix('e')
        .or_else(|| suffix.strip_prefix('E'))?;
    exponent.parse::<i32>().ok().map(|e| 10f64.powi(e))
}

impl Default for Quantity {
    fn default() -> Self {
        Self {
            raw: "0".to_string(),
            value: 0.0,
        }
    }
}

impl FromStr for Quantity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // YAML loaders turn bare `memory: 1024` into a number
        let raw = crate::yaml::string_or_number(deserializer)?;
        Quantity::parse(&raw).map_err(serde::de::Error::custom)
    }
}

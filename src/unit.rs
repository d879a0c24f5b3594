//! Unit strings in dot-exponent form.
//!
//! Units are stored as opaque strings in a single canonical spelling so that
//! textual equality is unit equality. The canonical form multiplies factors
//! with `.` and raises them with `^` (`m.s^-2`, `W.m^-2`), omits `^1`, and
//! orders factors lexicographically by symbol. Dimensionless quantities are
//! the empty string; the synonyms `1`, `none` and `dimensionless` are folded
//! into it on input. Anything else that deviates from canonical form is
//! rejected rather than silently rewritten, so authors see exactly what the
//! catalog will record.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::EntryError;

static RE_FACTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9]+)(?:\^([+-]?\d+))?$").unwrap());

/// A validated unit string in canonical dot-exponent form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Unit(String);

impl Unit {
    /// The dimensionless unit (empty string).
    pub fn dimensionless() -> Self {
        Unit(String::new())
    }

    /// Parses `raw` into a unit, accepting only canonical spellings and the
    /// dimensionless synonyms.
    pub fn parse(raw: &str) -> Result<Self, EntryError> {
        if is_dimensionless_synonym(raw) {
            return Ok(Unit::dimensionless());
        }
        let canonical = canonical_unit(raw)?;
        if canonical != raw {
            return Err(EntryError::NonCanonicalUnit {
                unit: raw.to_string(),
                canonical,
            });
        }
        Ok(Unit(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_dimensionless(&self) -> bool {
        self.0.is_empty()
    }

    /// Human-facing spelling: `1` for the dimensionless unit.
    pub fn display_or_one(&self) -> &str {
        if self.0.is_empty() { "1" } else { &self.0 }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_or_one())
    }
}

impl TryFrom<String> for Unit {
    type Error = EntryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Unit::parse(&value)
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.0
    }
}

fn is_dimensionless_synonym(raw: &str) -> bool {
    matches!(raw, "" | "1" | "none" | "dimensionless")
}

/// Computes the canonical spelling of `raw`, or explains why none exists.
pub fn canonical_unit(raw: &str) -> Result<String, EntryError> {
    if raw.chars().any(char::is_whitespace) {
        return Err(EntryError::InvalidUnit {
            unit: raw.to_string(),
            reason: "whitespace is not allowed".to_string(),
        });
    }
    if raw.contains('/') || raw.contains('*') {
        return Err(EntryError::InvalidUnit {
            unit: raw.to_string(),
            reason: "use dot-exponent style (e.g. m.s^-2)".to_string(),
        });
    }
    let mut factors: Vec<(String, i32)> = Vec::new();
    for factor in raw.split('.') {
        let caps = RE_FACTOR
            .captures(factor)
            .ok_or_else(|| EntryError::InvalidUnit {
                unit: raw.to_string(),
                reason: format!("malformed factor '{factor}'"),
            })?;
        let symbol = caps[1].to_string();
        let exponent: i32 = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| EntryError::InvalidUnit {
                unit: raw.to_string(),
                reason: format!("malformed exponent in '{factor}'"),
            })?,
            None => 1,
        };
        if exponent == 0 {
            return Err(EntryError::InvalidUnit {
                unit: raw.to_string(),
                reason: format!("zero exponent in '{factor}'"),
            });
        }
        factors.push((symbol, exponent));
    }
    factors.sort_by(|a, b| a.0.cmp(&b.0));
    let rendered: Vec<String> = factors
        .into_iter()
        .map(|(symbol, exponent)| {
            if exponent == 1 {
                symbol
            } else {
                format!("{symbol}^{exponent}")
            }
        })
        .collect();
    Ok(rendered.join("."))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

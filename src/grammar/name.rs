//! Structured (segment-wise) representation of a standard name.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A sparse mapping from segment id to token value.
///
/// Equality is plain map equality, so two structured names compare equal
/// regardless of the order segments were assigned in. The grammar engine
/// decides which assignments are actually valid; this type just carries them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredName(BTreeMap<String, String>);

impl StructuredName {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `token` to `segment`, replacing any previous value. Chainable.
    pub fn with(mut self, segment: impl Into<String>, token: impl Into<String>) -> Self {
        self.set(segment, token);
        self
    }

    pub fn set(&mut self, segment: impl Into<String>, token: impl Into<String>) {
        self.0.insert(segment.into(), token.into());
    }

    pub fn get(&self, segment: &str) -> Option<&str> {
        self.0.get(segment).map(String::as_str)
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.0.contains_key(segment)
    }

    pub fn remove(&mut self, segment: &str) -> Option<String> {
        self.0.remove(segment)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates assignments in segment-id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<S, T> FromIterator<(S, T)> for StructuredName
where
    S: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(s, t)| (s.into(), t.into()))
                .collect(),
        )
    }
}

impl fmt::Display for StructuredName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (segment, token)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{segment}: {token}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_insertion_order() {
        let a = StructuredName::new()
            .with("subject", "electron")
            .with("physical_base", "temperature");
        let b = StructuredName::new()
            .with("physical_base", "temperature")
            .with("subject", "electron");
        assert_eq!(a, b);
    }

    #[test]
    fn set_replaces_previous_token() {
        let mut parts = StructuredName::new();
        parts.set("subject", "electron");
        parts.set("subject", "ion");
        assert_eq!(parts.get("subject"), Some("ion"));
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn display_lists_assignments() {
        let parts = StructuredName::new()
            .with("physical_base", "heat_flux")
            .with("component", "radial");
        assert_eq!(
            parts.to_string(),
            "{component: radial, physical_base: heat_flux}"
        );
    }

    #[test]
    fn serializes_as_plain_map() {
        let parts = StructuredName::new().with("subject", "electron");
        let json = serde_json::to_string(&parts).unwrap();
        assert_eq!(json, r#"{"subject":"electron"}"#);
    }
}

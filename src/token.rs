//! Canonical token validation.
//!
//! Every name and vocabulary entry in the catalog is built from canonical
//! tokens: lowercase ASCII words of letters and digits joined by single
//! underscores. A token never starts with a digit or underscore, never ends
//! with an underscore, and never contains two underscores in a row. The whole
//! compose/parse machinery assumes this shape, so it is checked once here and
//! everywhere else can treat token boundaries as plain `'_'` splits.

use std::sync::LazyLock;

use regex::Regex;

static RE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9]*(?:_[a-z0-9]+)*$").unwrap());

/// Returns true if `token` is in canonical form.
pub fn is_canonical(token: &str) -> bool {
    RE_TOKEN.is_match(token)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_words() {
        assert!(is_canonical("electron"));
        assert!(is_canonical("heat_flux"));
        assert!(is_canonical("poloidal_field_coil_current"));
        assert!(is_canonical("b0"));
        assert!(is_canonical("q95_surface"));
    }

    #[test]
    fn rejects_empty_and_case() {
        assert!(!is_canonical(""));
        assert!(!is_canonical("Electron"));
        assert!(!is_canonical("heat_Flux"));
    }

    #[test]
    fn rejects_bad_underscores() {
        assert!(!is_canonical("_electron"));
        assert!(!is_canonical("electron_"));
        assert!(!is_canonical("heat__flux"));
    }

    #[test]
    fn rejects_foreign_characters() {
        assert!(!is_canonical("heat-flux"));
        assert!(!is_canonical("heat flux"));
        assert!(!is_canonical("flüx"));
        assert!(!is_canonical("2theta"));
    }
}

//! Reduction patterns and their enforcement.

use crate::error::ProvenanceError;

/// One recognized reduction prefix.
#[derive(Debug, Clone)]
pub struct ReductionPattern {
    /// Literal name prefix, e.g. `time_average_of_`.
    pub prefix: &'static str,
    /// Reduction identifier the provenance must declare.
    pub reduction: &'static str,
    /// Domain the reduction collapses; `none` leaves the domain unchecked.
    pub domain: &'static str,
    /// Whether the base entry must be a vector.
    pub requires_vector: bool,
}

/// Recognized reduction prefixes.
pub const REDUCTION_PATTERNS: &[ReductionPattern] = &[
    ReductionPattern {
        prefix: "time_average_of_",
        reduction: "mean",
        domain: "time",
        requires_vector: false,
    },
    ReductionPattern {
        prefix: "root_mean_square_of_",
        reduction: "rms",
        domain: "none",
        requires_vector: false,
    },
    ReductionPattern {
        prefix: "volume_integral_of_",
        reduction: "integral",
        domain: "volume",
        requires_vector: false,
    },
    ReductionPattern {
        prefix: "magnitude_of_",
        reduction: "magnitude",
        domain: "none",
        requires_vector: true,
    },
];

/// Matches `name` against the reduction table, returning the pattern and the
/// residual base name. A prefix only matches with a non-empty residual.
pub fn parse_reduction(name: &str) -> Option<(&'static ReductionPattern, &str)> {
    REDUCTION_PATTERNS.iter().find_map(|pattern| {
        name.strip_prefix(pattern.prefix)
            .filter(|residual| !residual.is_empty())
            .map(|residual| (pattern, residual))
    })
}

/// Checks a declared reduction provenance against the entry name. Names
/// without a recognized reduction prefix pass unchecked. `is_vector_base`
/// reports whether a named entry resolves to a vector; it is consulted only
/// for reductions that require one.
pub fn enforce_reduction_provenance(
    name: &str,
    declared_reduction: &str,
    declared_domain: &str,
    declared_base: &str,
    is_vector_base: impl Fn(&str) -> bool,
) -> Result<(), ProvenanceError> {
    let Some((pattern, implied_base)) = parse_reduction(name) else {
        return Ok(());
    };
    if implied_base != declared_base {
        return Err(ProvenanceError::BaseMismatch {
            name: name.to_owned(),
            declared: declared_base.to_owned(),
            implied: implied_base.to_owned(),
        });
    }
    if declared_reduction != pattern.reduction {
        return Err(ProvenanceError::ReductionMismatch {
            name: name.to_owned(),
            declared: declared_reduction.to_owned(),
            expected: pattern.reduction.to_owned(),
        });
    }
    if pattern.domain != "none" && declared_domain != pattern.domain {
        return Err(ProvenanceError::DomainMismatch {
            name: name.to_owned(),
            declared: declared_domain.to_owned(),
            expected: pattern.domain.to_owned(),
        });
    }
    if pattern.requires_vector && !is_vector_base(implied_base) {
        return Err(ProvenanceError::VectorBaseRequired {
            name: name.to_owned(),
            base: implied_base.to_owned(),
        });
    }
    Ok(())
}

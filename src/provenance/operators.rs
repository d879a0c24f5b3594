//! Operator chain patterns and their enforcement.
//!
//! A name like `divergence_of_gradient_of_electron_temperature` encodes a
//! chain of differential operators, outermost first. The pattern table maps
//! each recognized `<id>_of_` prefix to the primitive chain it expands to
//! and, where the operator fixes one, the kind of its result.

use crate::error::ProvenanceError;

/// Kind an operator forces on its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    Scalar,
    Vector,
}

impl ResultKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultKind::Scalar => "scalar",
            ResultKind::Vector => "vector",
        }
    }
}

/// One recognized operator prefix.
#[derive(Debug, Clone)]
pub struct OperatorPattern {
    /// Identifier as it appears in the name, without the `_of_` tail.
    pub id: &'static str,
    /// Literal name prefix, `<id>_of_`.
    pub prefix: &'static str,
    /// Primitive expansion, outermost first.
    pub chain: &'static [&'static str],
    /// Kind the operator forces on its result, when it does.
    pub result_kind: Option<ResultKind>,
}

/// Operators a provenance chain may contain directly.
pub const PRIMITIVE_OPERATORS: &[&str] = &[
    "curl",
    "divergence",
    "gradient",
    "laplacian",
    "time_derivative",
];

/// Recognized operator prefixes, longest first so that a composite id wins
/// over any shorter pattern sharing its head.
pub const OPERATOR_PATTERNS: &[OperatorPattern] = &[
    OperatorPattern {
        id: "second_time_derivative",
        prefix: "second_time_derivative_of_",
        chain: &["time_derivative", "time_derivative"],
        result_kind: None,
    },
    OperatorPattern {
        id: "time_derivative",
        prefix: "time_derivative_of_",
        chain: &["time_derivative"],
        result_kind: None,
    },
    OperatorPattern {
        id: "divergence",
        prefix: "divergence_of_",
        chain: &["divergence"],
        result_kind: Some(ResultKind::Scalar),
    },
    OperatorPattern {
        id: "laplacian",
        prefix: "laplacian_of_",
        chain: &["laplacian"],
        result_kind: Some(ResultKind::Scalar),
    },
    OperatorPattern {
        id: "gradient",
        prefix: "gradient_of_",
        chain: &["gradient"],
        result_kind: Some(ResultKind::Vector),
    },
    OperatorPattern {
        id: "curl",
        prefix: "curl_of_",
        chain: &["curl"],
        result_kind: Some(ResultKind::Vector),
    },
];

pub fn is_primitive_operator(operator: &str) -> bool {
    PRIMITIVE_OPERATORS.contains(&operator)
}

/// Peels operator prefixes off `name`, outermost first, until no pattern
/// matches. Returns the matched patterns and the residual base name. A
/// prefix only matches when it leaves a non-empty residual.
pub fn parse_operator_chain(name: &str) -> (Vec<&'static OperatorPattern>, &str) {
    let mut patterns = Vec::new();
    let mut rest = name;
    'peel: loop {
        for pattern in OPERATOR_PATTERNS {
            if let Some(residual) = rest.strip_prefix(pattern.prefix) {
                if !residual.is_empty() {
                    patterns.push(pattern);
                    rest = residual;
                    continue 'peel;
                }
            }
        }
        return (patterns, rest);
    }
}

/// Expands matched patterns into the flat primitive chain, outermost first.
pub fn normalize_operator_chain(patterns: &[&OperatorPattern]) -> Vec<String> {
    patterns
        .iter()
        .flat_map(|pattern| pattern.chain.iter().map(|op| (*op).to_owned()))
        .collect()
}

/// Checks a declared operator provenance against what the entry name itself
/// encodes. Names without a recognized operator prefix pass unchecked; for
/// all others the declared base, chain, result kind, and composite id must
/// agree with the name. When several operators in the chain fix a result
/// kind, the outermost one decides.
pub fn enforce_operator_provenance(
    name: &str,
    declared_operators: &[String],
    declared_base: &str,
    declared_operator_id: Option<&str>,
    actual: ResultKind,
) -> Result<(), ProvenanceError> {
    let (patterns, implied_base) = parse_operator_chain(name);
    let Some(outermost) = patterns.first() else {
        return Ok(());
    };
    if implied_base != declared_base {
        return Err(ProvenanceError::BaseMismatch {
            name: name.to_owned(),
            declared: declared_base.to_owned(),
            implied: implied_base.to_owned(),
        });
    }
    let implied_chain = normalize_operator_chain(&patterns);
    if declared_operators != implied_chain.as_slice() {
        return Err(ProvenanceError::ChainMismatch {
            name: name.to_owned(),
            declared: declared_operators.to_vec(),
            implied: implied_chain,
        });
    }
    if let Some(expected) = patterns.iter().find_map(|pattern| pattern.result_kind)
    {
        if expected != actual {
            return Err(ProvenanceError::KindMismatch {
                name: name.to_owned(),
                expected: expected.as_str().to_owned(),
                actual: actual.as_str().to_owned(),
            });
        }
    }
    if let Some(declared_id) = declared_operator_id {
        if declared_id != outermost.id {
            return Err(ProvenanceError::OperatorIdMismatch {
                name: name.to_owned(),
                declared: declared_id.to_owned(),
                expected: outermost.id.to_owned(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(chain: &[&str]) -> Vec<String> {
        chain.iter().map(|op| (*op).to_owned()).collect()
    }

    #[test]
    fn peels_stacked_operators_outermost_first() {
        let (patterns, base) =
            parse_operator_chain("divergence_of_gradient_of_electron_temperature");
        let ids: Vec<&str> = patterns.iter().map(|p| p.id).collect();
        assert_eq!(ids, ["divergence", "gradient"]);
        assert_eq!(base, "electron_temperature");
    }

    #[test]
    fn composite_id_expands_to_primitives() {
        let (patterns, base) =
            parse_operator_chain("second_time_derivative_of_plasma_current");
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].id, "second_time_derivative");
        assert_eq!(base, "plasma_current");
        assert_eq!(
            normalize_operator_chain(&patterns),
            owned(&["time_derivative", "time_derivative"])
        );
    }

    #[test]
    fn plain_names_have_no_chain() {
        let (patterns, base) = parse_operator_chain("electron_temperature");
        assert!(patterns.is_empty());
        assert_eq!(base, "electron_temperature");
    }

    #[test]
    fn empty_residual_never_matches() {
        let (patterns, base) = parse_operator_chain("gradient_of_");
        assert!(patterns.is_empty());
        assert_eq!(base, "gradient_of_");
    }

    #[test]
    fn matching_declaration_passes() {
        enforce_operator_provenance(
            "divergence_of_gradient_of_electron_temperature",
            &owned(&["divergence", "gradient"]),
            "electron_temperature",
            None,
            ResultKind::Scalar,
        )
        .unwrap();
    }

    #[test]
    fn base_must_match_the_residual() {
        let err = enforce_operator_provenance(
            "gradient_of_electron_temperature",
            &owned(&["gradient"]),
            "ion_temperature",
            None,
            ResultKind::Vector,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProvenanceError::BaseMismatch { implied, .. }
                if implied == "electron_temperature"
        ));
    }

    #[test]
    fn chain_comparison_is_order_sensitive() {
        let err = enforce_operator_provenance(
            "divergence_of_gradient_of_electron_temperature",
            &owned(&["gradient", "divergence"]),
            "electron_temperature",
            None,
            ResultKind::Scalar,
        )
        .unwrap_err();
        assert!(matches!(err, ProvenanceError::ChainMismatch { .. }));
    }

    #[test]
    fn outermost_operator_decides_the_kind() {
        // Innermost gradient would demand a vector; the outermost divergence
        // makes the result a scalar again.
        enforce_operator_provenance(
            "divergence_of_gradient_of_electron_temperature",
            &owned(&["divergence", "gradient"]),
            "electron_temperature",
            None,
            ResultKind::Scalar,
        )
        .unwrap();

        let err = enforce_operator_provenance(
            "gradient_of_electron_temperature",
            &owned(&["gradient"]),
            "electron_temperature",
            None,
            ResultKind::Scalar,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProvenanceError::KindMismatch { expected, .. } if expected == "vector"
        ));
    }

    #[test]
    fn time_derivatives_leave_the_kind_open() {
        // `time_derivative` carries no result kind, so both kinds pass.
        for kind in [ResultKind::Scalar, ResultKind::Vector] {
            enforce_operator_provenance(
                "time_derivative_of_magnetic_field",
                &owned(&["time_derivative"]),
                "magnetic_field",
                None,
                kind,
            )
            .unwrap();
        }
    }

    #[test]
    fn operator_id_names_the_outermost_pattern() {
        let err = enforce_operator_provenance(
            "second_time_derivative_of_plasma_current",
            &owned(&["time_derivative", "time_derivative"]),
            "plasma_current",
            Some("time_derivative"),
            ResultKind::Scalar,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ProvenanceError::OperatorIdMismatch { expected, .. }
                if expected == "second_time_derivative"
        ));

        enforce_operator_provenance(
            "second_time_derivative_of_plasma_current",
            &owned(&["time_derivative", "time_derivative"]),
            "plasma_current",
            Some("second_time_derivative"),
            ResultKind::Scalar,
        )
        .unwrap();
    }

    #[test]
    fn unprefixed_names_pass_unchecked() {
        enforce_operator_provenance(
            "electron_pressure",
            &owned(&["gradient"]),
            "whatever",
            Some("gradient"),
            ResultKind::Scalar,
        )
        .unwrap();
    }
}

//! Provenance records for derived entries.
//!
//! A derived entry carries one [`Provenance`] value describing how it is
//! obtained: an operator chain applied to a base entry, a reduction over a
//! base entry, or a free-form expression over named dependencies. The
//! submodules hold the pattern tables that tie recognized name prefixes
//! (`gradient_of_`, `time_average_of_`, ...) to the provenance a name with
//! that prefix must declare.

mod operators;
mod reductions;

pub use operators::{
    OPERATOR_PATTERNS, OperatorPattern, ResultKind, enforce_operator_provenance,
    is_primitive_operator, normalize_operator_chain, parse_operator_chain,
};
pub use reductions::{
    REDUCTION_PATTERNS, ReductionPattern, enforce_reduction_provenance,
    parse_reduction,
};

use serde::{Deserialize, Serialize};

use crate::error::EntryError;

/// How a derived entry is obtained from other entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Provenance {
    /// A chain of differential operators applied to one base entry.
    Operator {
        /// Primitive operators, outermost first.
        operators: Vec<String>,
        /// Entry the chain applies to.
        base: String,
        /// Composite identifier for the whole chain, when one exists
        /// (e.g. `second_time_derivative`).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        operator_id: Option<String>,
    },
    /// A reduction (average, integral, norm) over one base entry.
    Reduction {
        reduction: String,
        /// Axis the reduction collapses; `none` when it keeps the domain.
        #[serde(default = "default_domain")]
        domain: String,
        base: String,
    },
    /// A free-form expression over named dependency entries.
    Expression {
        expression: String,
        dependencies: Vec<String>,
    },
}

fn default_domain() -> String {
    "none".to_owned()
}

impl Provenance {
    pub fn operator<I, S>(operators: I, base: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Provenance::Operator {
            operators: operators.into_iter().map(Into::into).collect(),
            base: base.into(),
            operator_id: None,
        }
    }

    pub fn reduction(
        reduction: impl Into<String>,
        domain: impl Into<String>,
        base: impl Into<String>,
    ) -> Self {
        Provenance::Reduction {
            reduction: reduction.into(),
            domain: domain.into(),
            base: base.into(),
        }
    }

    pub fn expression<I, S>(expression: impl Into<String>, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Provenance::Expression {
            expression: expression.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        }
    }

    /// Sets the composite operator id on an operator record, chainable.
    /// Reduction and expression records are left unchanged.
    pub fn with_operator_id(mut self, id: impl Into<String>) -> Self {
        if let Provenance::Operator { operator_id, .. } = &mut self {
            *operator_id = Some(id.into());
        }
        self
    }

    /// The serialized mode discriminant.
    pub fn mode(&self) -> &'static str {
        match self {
            Provenance::Operator { .. } => "operator",
            Provenance::Reduction { .. } => "reduction",
            Provenance::Expression { .. } => "expression",
        }
    }

    /// Every entry name this record refers to.
    pub fn referenced_entries(&self) -> Vec<&str> {
        match self {
            Provenance::Operator { base, .. }
            | Provenance::Reduction { base, .. } => vec![base.as_str()],
            Provenance::Expression { dependencies, .. } => {
                dependencies.iter().map(String::as_str).collect()
            }
        }
    }

    /// Structural checks that need no catalog: non-empty chains and
    /// dependency lists, primitive operators only. Agreement with the entry
    /// name is a catalog-level concern handled by the pattern validators.
    pub fn validate(&self, name: &str) -> Result<(), EntryError> {
        match self {
            Provenance::Operator { operators, .. } => {
                if operators.is_empty() {
                    return Err(EntryError::EmptyOperatorChain {
                        name: name.to_owned(),
                    });
                }
                for operator in operators {
                    if !is_primitive_operator(operator) {
                        return Err(EntryError::NonPrimitiveOperator {
                            name: name.to_owned(),
                            operator: operator.clone(),
                        });
                    }
                }
            }
            Provenance::Reduction { .. } => {}
            Provenance::Expression { dependencies, .. } => {
                if dependencies.is_empty() {
                    return Err(EntryError::EmptyDependencies {
                        name: name.to_owned(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_discriminates_serialized_form() {
        let provenance = Provenance::operator(
            ["time_derivative"],
            "plasma_current",
        );
        let json = serde_json::to_string(&provenance).unwrap();
        assert!(json.contains("\"mode\":\"operator\""));
        let back: Provenance = serde_json::from_str(&json).unwrap();
        assert_eq!(back, provenance);
    }

    #[test]
    fn reduction_domain_defaults_to_none() {
        let json = r#"{"mode":"reduction","reduction":"rms","base":"loop_voltage"}"#;
        let provenance: Provenance = serde_json::from_str(json).unwrap();
        assert!(matches!(
            provenance,
            Provenance::Reduction { domain, .. } if domain == "none"
        ));
    }

    #[test]
    fn operator_chain_must_not_be_empty() {
        let provenance = Provenance::operator(Vec::<String>::new(), "x");
        assert!(matches!(
            provenance.validate("d_x_dt"),
            Err(EntryError::EmptyOperatorChain { .. })
        ));
    }

    #[test]
    fn composite_operators_are_rejected_in_chains() {
        let provenance =
            Provenance::operator(["second_time_derivative"], "plasma_current");
        let err = provenance
            .validate("second_time_derivative_of_plasma_current")
            .unwrap_err();
        assert!(matches!(
            err,
            EntryError::NonPrimitiveOperator { operator, .. }
                if operator == "second_time_derivative"
        ));
    }

    #[test]
    fn expression_needs_dependencies() {
        let provenance = Provenance::expression("p / (n * k)", Vec::<String>::new());
        assert!(matches!(
            provenance.validate("ion_temperature"),
            Err(EntryError::EmptyDependencies { .. })
        ));
    }

    #[test]
    fn referenced_entries_cover_all_modes() {
        assert_eq!(
            Provenance::operator(["gradient"], "pressure").referenced_entries(),
            vec!["pressure"]
        );
        assert_eq!(
            Provenance::reduction("mean", "time", "loop_voltage")
                .referenced_entries(),
            vec!["loop_voltage"]
        );
        assert_eq!(
            Provenance::expression("a + b", ["a", "b"]).referenced_entries(),
            vec!["a", "b"]
        );
    }
}

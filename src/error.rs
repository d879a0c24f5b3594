//! Rich diagnostic error types for the nomenclator engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so catalog authors know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for the nomenclator engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text) through to the caller.
#[derive(Debug, Error, Diagnostic)]
pub enum NomenError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Entry(#[from] EntryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Provenance(#[from] ProvenanceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ordering(#[from] OrderingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Grammar errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GrammarError {
    #[error("malformed token: {token:?}")]
    #[diagnostic(
        code(nomen::grammar::malformed_token),
        help(
            "Standard-name tokens are lowercase ASCII words joined by single \
             underscores: they start with a letter and never contain doubled, \
             leading, or trailing underscores."
        )
    )]
    MalformedToken { token: String },

    #[error("name has no base quantity")]
    #[diagnostic(
        code(nomen::grammar::missing_base),
        help(
            "Every standard name is built around exactly one base segment \
             (a geometric or physical quantity). Set one base token before \
             composing, and check for typos that swallow the base on parse."
        )
    )]
    MissingBase,

    #[error("generic base {base:?} needs a qualifying segment")]
    #[diagnostic(
        code(nomen::grammar::unqualified_generic),
        help(
            "Generic quantities like `current` or `temperature` are ambiguous \
             on their own. Add a qualifying segment (subject, device, object, \
             position, or geometry in the default grammar), e.g. \
             `electron_current` or `pressure_at_magnetic_axis`."
        )
    )]
    UnqualifiedGenericBase { base: String },

    #[error("segments {first:?} and {second:?} cannot appear in the same name")]
    #[diagnostic(
        code(nomen::grammar::exclusive_conflict),
        help(
            "The grammar declares these segments mutually exclusive. Drop one \
             of the two tokens; a name carries either, never both."
        )
    )]
    ExclusiveSegmentConflict { first: String, second: String },

    #[error("ambiguous segment order: {earlier:?} must precede {later:?}")]
    #[diagnostic(
        code(nomen::grammar::ambiguous_order),
        help(
            "A token for an earlier segment appears after a later one, so the \
             name does not follow the canonical segment order. Recompose the \
             name with segments in their declared order."
        )
    )]
    AmbiguousSegmentOrder { earlier: String, later: String },

    #[error("unknown segment: {segment:?}")]
    #[diagnostic(
        code(nomen::grammar::unknown_segment),
        help(
            "The grammar declares no segment with this id. Check the grammar \
             specification for the valid segment ids."
        )
    )]
    UnknownSegment { segment: String },

    #[error("token {token:?} is not in the vocabulary of segment {segment:?}")]
    #[diagnostic(
        code(nomen::grammar::unknown_token),
        help(
            "Closed segments only accept tokens from their controlled \
             vocabulary. Use a listed token, or extend the vocabulary in the \
             grammar specification."
        )
    )]
    UnknownToken { segment: String, token: String },
}

// ---------------------------------------------------------------------------
// Grammar-specification errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SpecError {
    #[error("I/O error reading grammar specification: {source}")]
    #[diagnostic(
        code(nomen::spec::io),
        help("Check that the specification file exists and is readable.")
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("invalid grammar specification: {message}")]
    #[diagnostic(
        code(nomen::spec::toml),
        help(
            "The specification must be a TOML document with [[segments]], \
             [vocabularies], and [generic] sections."
        )
    )]
    Toml { message: String },

    #[error("duplicate segment id {segment:?}")]
    #[diagnostic(
        code(nomen::spec::duplicate_segment),
        help("Each [[segments]] entry needs a unique id.")
    )]
    DuplicateSegment { segment: String },

    #[error("segment {segment:?} references undefined vocabulary {vocabulary:?}")]
    #[diagnostic(
        code(nomen::spec::undefined_vocabulary),
        help("Declare the vocabulary under [vocabularies], or point the segment at an existing one.")
    )]
    UndefinedVocabulary { segment: String, vocabulary: String },

    #[error("segment {segment:?} must declare exactly one vocabulary source")]
    #[diagnostic(
        code(nomen::spec::vocabulary_source),
        help("Give each segment exactly one of `vocabulary`, `same_as`, or `open = true`.")
    )]
    VocabularySource { segment: String },

    #[error("segment {segment:?} cross-references {target:?}, which has no named vocabulary")]
    #[diagnostic(
        code(nomen::spec::bad_cross_reference),
        help(
            "`same_as` must point at a declared segment that carries a named \
             vocabulary itself, not at an open or cross-referencing segment."
        )
    )]
    BadCrossReference { segment: String, target: String },

    #[error("segment {segment:?} declares exclusivity with unknown segment {partner:?}")]
    #[diagnostic(
        code(nomen::spec::unknown_exclusivity_partner),
        help("`exclusive_with` entries must name declared segments.")
    )]
    UnknownExclusivityPartner { segment: String, partner: String },

    #[error("exclusivity between {segment:?} and {partner:?} is not declared on both sides")]
    #[diagnostic(
        code(nomen::spec::asymmetric_exclusivity),
        help("Mutual exclusivity must be listed in the `exclusive_with` of both segments.")
    )]
    AsymmetricExclusivity { segment: String, partner: String },

    #[error("template for segment {segment:?} must contain exactly one {{token}} placeholder, got {template:?}")]
    #[diagnostic(
        code(nomen::spec::bad_template),
        help("Write templates like \"{{token}}_component_of\" or \"due_to_{{token}}\".")
    )]
    BadTemplate { segment: String, template: String },

    #[error("base segment {segment:?} must not declare a template")]
    #[diagnostic(
        code(nomen::spec::base_template),
        help("Base tokens are rendered verbatim; templates only apply to prefix and suffix segments.")
    )]
    BaseTemplate { segment: String },

    #[error("grammar must declare at least one base segment and at most one open base (found {closed} closed, {open} open)")]
    #[diagnostic(
        code(nomen::spec::base_segments),
        help(
            "Mark base segments with `base = true`. Closed bases carry a named \
             vocabulary; at most one base may use the open vocabulary."
        )
    )]
    BaseSegmentCount { closed: usize, open: usize },

    #[error("base segments must be adjacent in declaration order; {segment:?} interrupts them")]
    #[diagnostic(
        code(nomen::spec::split_base),
        help(
            "Prefix segments come before every base segment and suffix \
             segments after; a non-base segment cannot sit between two bases."
        )
    )]
    SplitBase { segment: String },

    #[error("segment {segment:?} has an open vocabulary but is not a base segment")]
    #[diagnostic(
        code(nomen::spec::open_non_base),
        help(
            "Only a base segment may draw on the open vocabulary; prefix and \
             suffix segments need closed token lists."
        )
    )]
    OpenNonBase { segment: String },

    #[error("vocabulary {vocabulary:?} contains non-canonical token {token:?}")]
    #[diagnostic(
        code(nomen::spec::invalid_token),
        help(
            "Vocabulary tokens follow the standard-name token form: lowercase, \
             starting with a letter, single underscores only."
        )
    )]
    InvalidToken { vocabulary: String, token: String },

    #[error("unknown segment {segment:?} referenced by {context}")]
    #[diagnostic(
        code(nomen::spec::unknown_segment_reference),
        help("Sections like `generic.qualified_by` may only name declared segment ids.")
    )]
    UnknownSegmentReference { context: String, segment: String },
}

// ---------------------------------------------------------------------------
// Entry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EntryError {
    #[error("invalid standard name: {name:?}")]
    #[diagnostic(
        code(nomen::entry::invalid_name),
        help(
            "Names are lowercase ASCII words joined by single underscores, \
             starting with a letter, without doubled, leading, or trailing \
             underscores."
        )
    )]
    InvalidName { name: String },

    #[error("invalid unit {unit:?}: {reason}")]
    #[diagnostic(
        code(nomen::entry::invalid_unit),
        help(
            "Units use fused dot-exponent style, e.g. `m.s^-2` or `W.m^-2`. \
             No '/', '*', or whitespace; the empty string means dimensionless."
        )
    )]
    InvalidUnit { unit: String, reason: String },

    #[error("unit {unit:?} is not canonical; expected {canonical:?}")]
    #[diagnostic(
        code(nomen::entry::noncanonical_unit),
        help(
            "Canonical units sort their factors lexicographically and omit \
             `^1` exponents. Rewrite the unit as shown."
        )
    )]
    NonCanonicalUnit { unit: String, canonical: String },

    #[error("vector {name:?} declares {count} component(s); at least 2 are required")]
    #[diagnostic(
        code(nomen::entry::too_few_components),
        help("A vector entry maps at least two axes to component entry names.")
    )]
    TooFewComponents { name: String, count: usize },

    #[error("axis {axis:?} of {name:?} is not a canonical token")]
    #[diagnostic(
        code(nomen::entry::invalid_axis),
        help("Axis keys are lowercase tokens such as `radial`, `toroidal`, or `vertical`.")
    )]
    InvalidAxis { name: String, axis: String },

    #[error("component {component:?} for axis {axis:?} must start with \"{axis}_component_of_\"")]
    #[diagnostic(
        code(nomen::entry::component_prefix),
        help("Component names repeat their axis, e.g. axis `radial` maps to `radial_component_of_<vector name>`.")
    )]
    ComponentPrefix { axis: String, component: String },

    #[error("magnitude of {name:?} must be {expected:?}, got {declared:?}")]
    #[diagnostic(
        code(nomen::entry::bad_magnitude),
        help("A vector's magnitude entry is always named `magnitude_of_<vector name>`.")
    )]
    BadMagnitude {
        name: String,
        declared: String,
        expected: String,
    },

    #[error("deprecated entry {name:?} must name a superseding entry")]
    #[diagnostic(
        code(nomen::entry::missing_superseded_by),
        help("Set `superseded_by` to the active name that replaces this one.")
    )]
    MissingSupersededBy { name: String },

    #[error("operator provenance of {name:?} lists no operators")]
    #[diagnostic(
        code(nomen::entry::empty_operator_chain),
        help("Declare the applied operators outermost-first, e.g. [\"divergence\", \"gradient\"].")
    )]
    EmptyOperatorChain { name: String },

    #[error("operator {operator:?} in {name:?} is not a primitive")]
    #[diagnostic(
        code(nomen::entry::non_primitive_operator),
        help(
            "Provenance chains store primitives only: gradient, \
             time_derivative, divergence, curl, laplacian. Composite names \
             like `second_time_derivative` expand to their primitive chain."
        )
    )]
    NonPrimitiveOperator { name: String, operator: String },

    #[error("expression provenance of {name:?} lists no dependencies")]
    #[diagnostic(
        code(nomen::entry::empty_dependencies),
        help("Expression-derived entries must name every input entry they are computed from.")
    )]
    EmptyDependencies { name: String },
}

// ---------------------------------------------------------------------------
// Ordering errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum OrderingError {
    #[error("circular dependency among entries: {}", members.join(", "))]
    #[diagnostic(
        code(nomen::order::cycle),
        help(
            "These entries reference each other (via components, provenance \
             bases, or expression dependencies) and cannot be inserted in any \
             order. Break the cycle by removing or restructuring one link."
        )
    )]
    Cycle { members: Vec<String> },

    #[error("duplicate entry name in batch: {name:?}")]
    #[diagnostic(
        code(nomen::order::duplicate_name),
        help("Each entry in an ordering batch must have a unique name.")
    )]
    DuplicateName { name: String },
}

// ---------------------------------------------------------------------------
// Provenance errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ProvenanceError {
    #[error("provenance base mismatch for {name:?}: declared {declared:?}, name implies {implied:?}")]
    #[diagnostic(
        code(nomen::provenance::base_mismatch),
        help(
            "The declared base must equal the residual after stripping the \
             operator or reduction prefix from the entry name."
        )
    )]
    BaseMismatch {
        name: String,
        declared: String,
        implied: String,
    },

    #[error("operator chain mismatch for {name:?}: declared [{}], name implies [{}]", declared.join(", "), implied.join(", "))]
    #[diagnostic(
        code(nomen::provenance::chain_mismatch),
        help(
            "Chains are compared outermost-first and order-sensitively; align \
             the declared list with the name's operator prefixes."
        )
    )]
    ChainMismatch {
        name: String,
        declared: Vec<String>,
        implied: Vec<String>,
    },

    #[error("result kind mismatch for {name:?}: operator chain yields a {expected} entry, found {actual}")]
    #[diagnostic(
        code(nomen::provenance::kind_mismatch),
        help(
            "Operators fix the result kind: divergence and laplacian yield \
             scalars, gradient and curl yield vectors."
        )
    )]
    KindMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("operator id mismatch for {name:?}: declared {declared:?}, name implies {expected:?}")]
    #[diagnostic(
        code(nomen::provenance::operator_id_mismatch),
        help(
            "When set, `operator_id` must match the outermost operator pattern \
             in the name (composite ids like `second_time_derivative` included)."
        )
    )]
    OperatorIdMismatch {
        name: String,
        declared: String,
        expected: String,
    },

    #[error("reduction mismatch for {name:?}: declared {declared:?}, name implies {expected:?}")]
    #[diagnostic(
        code(nomen::provenance::reduction_mismatch),
        help(
            "The declared reduction must match the name's reduction prefix, \
             e.g. `time_average_of_` implies `mean`."
        )
    )]
    ReductionMismatch {
        name: String,
        declared: String,
        expected: String,
    },

    #[error("reduction domain mismatch for {name:?}: declared {declared:?}, expected {expected:?}")]
    #[diagnostic(
        code(nomen::provenance::domain_mismatch),
        help(
            "Each reduction fixes its domain: time averages reduce over \
             `time`, volume integrals over `volume`."
        )
    )]
    DomainMismatch {
        name: String,
        declared: String,
        expected: String,
    },

    #[error("reduction on {name:?} requires a vector base, but {base:?} is not one")]
    #[diagnostic(
        code(nomen::provenance::vector_base_required),
        help(
            "`magnitude_of_` only applies to vector entries; point the base at \
             a vector or drop the reduction."
        )
    )]
    VectorBaseRequired { name: String, base: String },
}

// ---------------------------------------------------------------------------
// Catalog errors
// ---------------------------------------------------------------------------

/// How serious a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks commit.
    Error,
    /// Reported but never blocks.
    Advisory,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Advisory => write!(f, "advisory"),
        }
    }
}

/// A single finding from whole-catalog validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    /// Name of the entry the finding is about.
    pub entry: String,
    pub message: String,
}

impl Issue {
    /// A commit-blocking structural finding.
    pub fn error(entry: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            entry: entry.into(),
            message: message.into(),
        }
    }

    /// A non-blocking advisory finding.
    pub fn advisory(entry: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Advisory,
            entry: entry.into(),
            message: message.into(),
        }
    }

    /// Whether this finding blocks a commit.
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.entry, self.message)
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("entry already exists: {name:?}")]
    #[diagnostic(
        code(nomen::catalog::already_exists),
        help("Use `update` to change an existing entry, or pick a different name.")
    )]
    AlreadyExists { name: String },

    #[error("no entry named {name:?}")]
    #[diagnostic(
        code(nomen::catalog::not_found),
        help("Check the name for typos; `list_names` shows everything currently visible.")
    )]
    NotFound { name: String },

    #[error("unit of work is closed")]
    #[diagnostic(
        code(nomen::catalog::closed),
        help(
            "commit and rollback both close a unit of work. Begin a new one \
             from the catalog service."
        )
    )]
    Closed,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] EntryError),

    #[error("catalog validation failed with {} blocking issue(s)", issues.iter().filter(|i| i.is_blocking()).count())]
    #[diagnostic(
        code(nomen::catalog::validation_failed),
        help(
            "Inspect the attached issues; every structural problem must be \
             fixed before the commit can proceed."
        )
    )]
    ValidationFailed { issues: Vec<Issue> },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Ordering(#[from] OrderingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error: {source}")]
    #[diagnostic(
        code(nomen::store::io),
        help(
            "A filesystem operation failed. Check that the catalog root \
             exists, has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {message}")]
    #[diagnostic(
        code(nomen::store::serde),
        help(
            "Failed to serialize or deserialize an entry document. The stored \
             file may be hand-edited or from an incompatible version."
        )
    )]
    Serde { message: String },

    #[error("no stored entry named {name:?}")]
    #[diagnostic(
        code(nomen::store::missing),
        help("The backing store holds no document for this name. Verify the name and the store root.")
    )]
    Missing { name: String },
}

/// Convenience alias for functions returning nomenclator results.
pub type NomenResult<T> = std::result::Result<T, NomenError>;

//! Grammar specification: segments, vocabularies, and the generic-token rule.
//!
//! A grammar is declared as a TOML document and compiled into a validated,
//! read-only [`GrammarSpec`] at load time. The default fusion-plasma grammar
//! is bundled into the binary; alternative grammars can be loaded from disk.
//! All structural rules (segment order, exclusivity symmetry, template shape,
//! base-segment placement) are enforced here once, so the compose/parse
//! engine can assume a well-formed specification.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use serde::Deserialize;

use crate::error::SpecError;
use crate::token;

const DEFAULT_GRAMMAR_TOML: &str = include_str!("../../data/grammar/default.toml");

static BUNDLED: LazyLock<GrammarSpec> = LazyLock::new(|| {
    GrammarSpec::from_toml(DEFAULT_GRAMMAR_TOML).expect("bundled default grammar is valid")
});

// ---------------------------------------------------------------------------
// TOML deserialization helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SpecToml {
    #[serde(default)]
    segments: Vec<SegmentToml>,
    #[serde(default)]
    vocabularies: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    generic: GenericToml,
    #[serde(default)]
    tags: TagsToml,
}

#[derive(Debug, Deserialize)]
struct SegmentToml {
    id: String,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    vocabulary: Option<String>,
    #[serde(default)]
    same_as: Option<String>,
    #[serde(default)]
    open: bool,
    #[serde(default)]
    base: bool,
    #[serde(default)]
    exclusive_with: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenericToml {
    #[serde(default)]
    tokens: Vec<String>,
    #[serde(default)]
    qualified_by: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TagsToml {
    #[serde(default)]
    primary: Vec<String>,
    #[serde(default)]
    secondary: Vec<String>,
}

// ---------------------------------------------------------------------------
// Compiled model
// ---------------------------------------------------------------------------

/// A token template with a single `{token}` placeholder.
#[derive(Debug, Clone)]
pub struct Template {
    before: String,
    after: String,
}

impl Template {
    fn new(segment: &str, pattern: &str) -> Result<Self, SpecError> {
        let bad = || SpecError::BadTemplate {
            segment: segment.to_string(),
            template: pattern.to_string(),
        };
        let (before, after) = pattern.split_once("{token}").ok_or_else(bad)?;
        if before.contains(['{', '}']) || after.contains(['{', '}']) {
            return Err(bad());
        }
        Ok(Self {
            before: before.to_string(),
            after: after.to_string(),
        })
    }

    /// Wraps `token` in the template's fixed affixes.
    pub fn render(&self, token: &str) -> String {
        format!("{}{}{}", self.before, token, self.after)
    }
}

/// Where a segment's tokens come from.
#[derive(Debug, Clone)]
pub enum Vocabulary {
    /// Fixed token list, resolved from `[vocabularies]` or a `same_as` reference.
    Closed(Vec<String>),
    /// Any canonical token is accepted.
    Open,
}

/// One compiled segment of the grammar.
#[derive(Debug, Clone)]
pub struct Segment {
    pub id: String,
    pub base: bool,
    template: Option<Template>,
    vocabulary: Vocabulary,
    exclusive_with: Vec<usize>,
    /// `(rendered, token)` pairs, longest rendered form first.
    rendered: Vec<(String, String)>,
}

impl Segment {
    pub fn is_open(&self) -> bool {
        matches!(self.vocabulary, Vocabulary::Open)
    }

    /// Whether `token` may be assigned to this segment.
    pub fn accepts(&self, token: &str) -> bool {
        match &self.vocabulary {
            Vocabulary::Closed(tokens) => tokens.iter().any(|t| t == token),
            Vocabulary::Open => token::is_canonical(token),
        }
    }

    /// The closed token list, or `None` for an open vocabulary.
    pub fn tokens(&self) -> Option<&[String]> {
        match &self.vocabulary {
            Vocabulary::Closed(tokens) => Some(tokens),
            Vocabulary::Open => None,
        }
    }

    /// Applies the segment template, or returns the token verbatim.
    pub fn render(&self, token: &str) -> String {
        match &self.template {
            Some(template) => template.render(token),
            None => token.to_string(),
        }
    }

    pub(crate) fn rendered(&self) -> &[(String, String)] {
        &self.rendered
    }

    pub(crate) fn excludes(&self) -> &[usize] {
        &self.exclusive_with
    }
}

/// A validated grammar specification, compiled from TOML.
#[derive(Debug, Clone)]
pub struct GrammarSpec {
    segments: Vec<Segment>,
    by_id: HashMap<String, usize>,
    prefix: Vec<usize>,
    bases: Vec<usize>,
    suffix: Vec<usize>,
    open_base: Option<usize>,
    generic_tokens: BTreeSet<String>,
    qualifying: Vec<usize>,
    primary_tags: BTreeSet<String>,
    secondary_tags: BTreeSet<String>,
}

impl GrammarSpec {
    /// The default grammar bundled into the binary.
    pub fn bundled() -> Self {
        BUNDLED.clone()
    }

    /// Loads and validates a grammar specification from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, SpecError> {
        let text = std::fs::read_to_string(path).map_err(|source| SpecError::Io { source })?;
        let spec = Self::from_toml(&text)?;
        tracing::info!(
            path = %path.display(),
            segments = spec.segments().len(),
            "loaded grammar specification"
        );
        Ok(spec)
    }

    /// Parses and validates a grammar specification from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, SpecError> {
        let raw: SpecToml = toml::from_str(text).map_err(|e| SpecError::Toml {
            message: e.to_string(),
        })?;

        for (name, tokens) in &raw.vocabularies {
            for tok in tokens {
                if !token::is_canonical(tok) {
                    return Err(SpecError::InvalidToken {
                        vocabulary: name.clone(),
                        token: tok.clone(),
                    });
                }
            }
        }

        let mut by_id: HashMap<String, usize> = HashMap::new();
        for (idx, seg) in raw.segments.iter().enumerate() {
            if by_id.insert(seg.id.clone(), idx).is_some() {
                return Err(SpecError::DuplicateSegment {
                    segment: seg.id.clone(),
                });
            }
            let sources =
                usize::from(seg.vocabulary.is_some()) + usize::from(seg.same_as.is_some()) + usize::from(seg.open);
            if sources != 1 {
                return Err(SpecError::VocabularySource {
                    segment: seg.id.clone(),
                });
            }
            if seg.open && !seg.base {
                return Err(SpecError::OpenNonBase {
                    segment: seg.id.clone(),
                });
            }
            if seg.base && seg.template.is_some() {
                return Err(SpecError::BaseTemplate {
                    segment: seg.id.clone(),
                });
            }
        }

        // Resolve token lists. `same_as` must target a segment that names a
        // vocabulary directly, so references stay one level deep.
        let mut vocabularies: Vec<Vocabulary> = Vec::with_capacity(raw.segments.len());
        for seg in &raw.segments {
            let vocabulary = if seg.open {
                Vocabulary::Open
            } else if let Some(name) = &seg.vocabulary {
                let tokens =
                    raw.vocabularies
                        .get(name)
                        .ok_or_else(|| SpecError::UndefinedVocabulary {
                            segment: seg.id.clone(),
                            vocabulary: name.clone(),
                        })?;
                Vocabulary::Closed(tokens.clone())
            } else {
                let target = seg.same_as.as_deref().unwrap_or_default();
                let tokens = by_id
                    .get(target)
                    .and_then(|&t| raw.segments[t].vocabulary.as_ref())
                    .and_then(|name| raw.vocabularies.get(name))
                    .ok_or_else(|| SpecError::BadCrossReference {
                        segment: seg.id.clone(),
                        target: target.to_string(),
                    })?;
                Vocabulary::Closed(tokens.clone())
            };
            vocabularies.push(vocabulary);
        }

        // Resolve exclusivity partners and require symmetry.
        let mut exclusive: Vec<Vec<usize>> = Vec::with_capacity(raw.segments.len());
        for seg in &raw.segments {
            let mut partners = Vec::with_capacity(seg.exclusive_with.len());
            for partner in &seg.exclusive_with {
                let &idx =
                    by_id
                        .get(partner)
                        .ok_or_else(|| SpecError::UnknownExclusivityPartner {
                            segment: seg.id.clone(),
                            partner: partner.clone(),
                        })?;
                partners.push(idx);
            }
            exclusive.push(partners);
        }
        for (idx, seg) in raw.segments.iter().enumerate() {
            for &partner in &exclusive[idx] {
                if !exclusive[partner].contains(&idx) {
                    return Err(SpecError::AsymmetricExclusivity {
                        segment: seg.id.clone(),
                        partner: raw.segments[partner].id.clone(),
                    });
                }
            }
        }

        // Base segments form one contiguous block between prefix and suffix.
        let bases: Vec<usize> = raw
            .segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.base)
            .map(|(i, _)| i)
            .collect();
        if let (Some(&first), Some(&last)) = (bases.first(), bases.last()) {
            for idx in first..=last {
                if !raw.segments[idx].base {
                    return Err(SpecError::SplitBase {
                        segment: raw.segments[idx].id.clone(),
                    });
                }
            }
        }
        let open_count = bases
            .iter()
            .filter(|&&i| matches!(vocabularies[i], Vocabulary::Open))
            .count();
        if bases.is_empty() || open_count > 1 {
            return Err(SpecError::BaseSegmentCount {
                closed: bases.len() - open_count,
                open: open_count,
            });
        }
        let open_base = bases
            .iter()
            .copied()
            .find(|&i| matches!(vocabularies[i], Vocabulary::Open));
        let prefix: Vec<usize> = (0..bases[0]).collect();
        let suffix: Vec<usize> = (bases[bases.len() - 1] + 1..raw.segments.len()).collect();

        for tok in &raw.generic.tokens {
            if !token::is_canonical(tok) {
                return Err(SpecError::InvalidToken {
                    vocabulary: "generic".to_string(),
                    token: tok.clone(),
                });
            }
        }
        let mut qualifying = Vec::with_capacity(raw.generic.qualified_by.len());
        for id in &raw.generic.qualified_by {
            let &idx = by_id
                .get(id)
                .ok_or_else(|| SpecError::UnknownSegmentReference {
                    context: "generic.qualified_by".to_string(),
                    segment: id.clone(),
                })?;
            qualifying.push(idx);
        }

        let mut segments = Vec::with_capacity(raw.segments.len());
        for ((seg, vocabulary), exclusive_with) in
            raw.segments.into_iter().zip(vocabularies).zip(exclusive)
        {
            let template = seg
                .template
                .as_deref()
                .map(|pattern| Template::new(&seg.id, pattern))
                .transpose()?;
            let mut rendered: Vec<(String, String)> = match &vocabulary {
                Vocabulary::Closed(tokens) => tokens
                    .iter()
                    .map(|tok| {
                        let shaped = match &template {
                            Some(t) => t.render(tok),
                            None => tok.clone(),
                        };
                        (shaped, tok.clone())
                    })
                    .collect(),
                Vocabulary::Open => Vec::new(),
            };
            rendered.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
            segments.push(Segment {
                id: seg.id,
                base: seg.base,
                template,
                vocabulary,
                exclusive_with,
                rendered,
            });
        }

        Ok(Self {
            segments,
            by_id,
            prefix,
            bases,
            suffix,
            open_base,
            generic_tokens: raw.generic.tokens.into_iter().collect(),
            qualifying,
            primary_tags: raw.tags.primary.into_iter().collect(),
            secondary_tags: raw.tags.secondary.into_iter().collect(),
        })
    }

    /// All segments in declared (composition) order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Looks up a segment by id.
    pub fn segment(&self, id: &str) -> Option<&Segment> {
        self.by_id.get(id).map(|&idx| &self.segments[idx])
    }

    pub(crate) fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub(crate) fn prefix(&self) -> &[usize] {
        &self.prefix
    }

    pub(crate) fn bases(&self) -> &[usize] {
        &self.bases
    }

    pub(crate) fn suffix(&self) -> &[usize] {
        &self.suffix
    }

    pub(crate) fn open_base(&self) -> Option<usize> {
        self.open_base
    }

    pub(crate) fn qualifying(&self) -> &[usize] {
        &self.qualifying
    }

    /// Whether `token` is on the generic-base denylist.
    pub fn is_generic(&self, token: &str) -> bool {
        self.generic_tokens.contains(token)
    }

    /// Whether the grammar declares a tag vocabulary at all.
    pub fn has_tags(&self) -> bool {
        !self.primary_tags.is_empty() || !self.secondary_tags.is_empty()
    }

    pub fn is_primary_tag(&self, tag: &str) -> bool {
        self.primary_tags.contains(tag)
    }

    /// Secondary positions also accept primary tags.
    pub fn is_known_tag(&self, tag: &str) -> bool {
        self.primary_tags.contains(tag) || self.secondary_tags.contains(tag)
    }

    pub fn primary_tags(&self) -> impl Iterator<Item = &str> {
        self.primary_tags.iter().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_grammar_compiles() {
        let spec = GrammarSpec::bundled();
        assert_eq!(spec.segments().len(), 11);
        assert_eq!(spec.prefix().len(), 4);
        assert_eq!(spec.bases().len(), 2);
        assert_eq!(spec.suffix().len(), 5);
        assert!(spec.segment("physical_base").unwrap().is_open());
        assert!(spec.is_generic("current"));
        assert!(!spec.is_generic("heat_flux"));
        assert!(spec.is_primary_tag("magnetics"));
        assert!(spec.is_known_tag("time-dependent"));
    }

    #[test]
    fn cross_reference_shares_tokens() {
        let spec = GrammarSpec::bundled();
        let component = spec.segment("component").unwrap();
        let coordinate = spec.segment("coordinate").unwrap();
        assert_eq!(component.tokens(), coordinate.tokens());
        assert_eq!(component.render("radial"), "radial_component_of");
        assert_eq!(coordinate.render("radial"), "radial");
    }

    #[test]
    fn rendered_cache_prefers_longest() {
        let spec = GrammarSpec::bundled();
        let device = spec.segment("device").unwrap();
        let first = &device.rendered()[0].0;
        let last = &device.rendered()[device.rendered().len() - 1].0;
        assert!(first.len() >= last.len());
    }

    #[test]
    fn rejects_duplicate_segment() {
        let toml = r#"
            [[segments]]
            id = "subject"
            vocabulary = "subjects"
            [[segments]]
            id = "subject"
            vocabulary = "subjects"
            [[segments]]
            id = "physical_base"
            base = true
            open = true
            [vocabularies]
            subjects = ["electron"]
        "#;
        assert!(matches!(
            GrammarSpec::from_toml(toml),
            Err(SpecError::DuplicateSegment { .. })
        ));
    }

    #[test]
    fn rejects_undefined_vocabulary() {
        let toml = r#"
            [[segments]]
            id = "subject"
            vocabulary = "missing"
            [[segments]]
            id = "physical_base"
            base = true
            open = true
        "#;
        assert!(matches!(
            GrammarSpec::from_toml(toml),
            Err(SpecError::UndefinedVocabulary { .. })
        ));
    }

    #[test]
    fn rejects_chained_cross_reference() {
        let toml = r#"
            [[segments]]
            id = "a"
            vocabulary = "tokens"
            [[segments]]
            id = "b"
            same_as = "a"
            [[segments]]
            id = "c"
            same_as = "b"
            [[segments]]
            id = "physical_base"
            base = true
            open = true
            [vocabularies]
            tokens = ["alpha"]
        "#;
        assert!(matches!(
            GrammarSpec::from_toml(toml),
            Err(SpecError::BadCrossReference { segment, .. }) if segment == "c"
        ));
    }

    #[test]
    fn rejects_asymmetric_exclusivity() {
        let toml = r#"
            [[segments]]
            id = "a"
            vocabulary = "tokens"
            exclusive_with = ["b"]
            [[segments]]
            id = "b"
            vocabulary = "tokens"
            [[segments]]
            id = "physical_base"
            base = true
            open = true
            [vocabularies]
            tokens = ["alpha"]
        "#;
        assert!(matches!(
            GrammarSpec::from_toml(toml),
            Err(SpecError::AsymmetricExclusivity { .. })
        ));
    }

    #[test]
    fn rejects_bad_template() {
        let toml = r#"
            [[segments]]
            id = "a"
            template = "no_placeholder"
            vocabulary = "tokens"
            [[segments]]
            id = "physical_base"
            base = true
            open = true
            [vocabularies]
            tokens = ["alpha"]
        "#;
        assert!(matches!(
            GrammarSpec::from_toml(toml),
            Err(SpecError::BadTemplate { .. })
        ));
    }

    #[test]
    fn rejects_open_prefix_segment() {
        let toml = r#"
            [[segments]]
            id = "a"
            open = true
            [[segments]]
            id = "physical_base"
            base = true
            open = true
        "#;
        assert!(matches!(
            GrammarSpec::from_toml(toml),
            Err(SpecError::OpenNonBase { .. })
        ));
    }

    #[test]
    fn rejects_interrupted_base_block() {
        let toml = r#"
            [[segments]]
            id = "first_base"
            base = true
            vocabulary = "tokens"
            [[segments]]
            id = "interloper"
            vocabulary = "tokens"
            [[segments]]
            id = "second_base"
            base = true
            open = true
            [vocabularies]
            tokens = ["alpha"]
        "#;
        assert!(matches!(
            GrammarSpec::from_toml(toml),
            Err(SpecError::SplitBase { segment }) if segment == "interloper"
        ));
    }

    #[test]
    fn rejects_grammar_without_base() {
        let toml = r#"
            [[segments]]
            id = "a"
            vocabulary = "tokens"
            [vocabularies]
            tokens = ["alpha"]
        "#;
        assert!(matches!(
            GrammarSpec::from_toml(toml),
            Err(SpecError::BaseSegmentCount { closed: 0, open: 0 })
        ));
    }

    #[test]
    fn rejects_conflicting_vocabulary_sources() {
        let toml = r#"
            [[segments]]
            id = "a"
            vocabulary = "tokens"
            same_as = "b"
            [[segments]]
            id = "physical_base"
            base = true
            open = true
            [vocabularies]
            tokens = ["alpha"]
        "#;
        assert!(matches!(
            GrammarSpec::from_toml(toml),
            Err(SpecError::VocabularySource { .. })
        ));
    }

    #[test]
    fn rejects_non_canonical_vocabulary_token() {
        let toml = r#"
            [[segments]]
            id = "physical_base"
            base = true
            open = true
            [vocabularies]
            tokens = ["电子"]
        "#;
        assert!(matches!(
            GrammarSpec::from_toml(toml),
            Err(SpecError::InvalidToken { .. })
        ));
    }

    #[test]
    fn rejects_unknown_qualifier_reference() {
        let toml = r#"
            [[segments]]
            id = "physical_base"
            base = true
            open = true
            [generic]
            tokens = ["current"]
            qualified_by = ["nonexistent"]
        "#;
        assert!(matches!(
            GrammarSpec::from_toml(toml),
            Err(SpecError::UnknownSegmentReference { .. })
        ));
    }
}

//! Compose and parse standard names against a grammar specification.
//!
//! Both directions are pure functions over the compiled [`GrammarSpec`].
//! Parsing is a backtracking-free scan: suffixes strip from the end in
//! reverse declared order, prefixes consume left-to-right with a cursor that
//! never moves backwards, and whatever remains is the base token. Compose and
//! parse share one invariant checker, so a name is accepted by one exactly
//! when its structure is accepted by the other.

use crate::error::GrammarError;
use crate::grammar::name::StructuredName;
use crate::grammar::spec::{GrammarSpec, Segment};
use crate::token;

/// The grammar engine: composes structured names into canonical token
/// strings and parses them back.
pub struct Grammar {
    spec: GrammarSpec,
}

impl Default for Grammar {
    fn default() -> Self {
        Self::new(GrammarSpec::bundled())
    }
}

impl Grammar {
    pub fn new(spec: GrammarSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &GrammarSpec {
        &self.spec
    }

    /// Renders `parts` into a canonical name string.
    ///
    /// Segments are rendered in declared order through their templates and
    /// joined with single underscores. Fails if any token is malformed or
    /// outside its segment's vocabulary, if no (or more than one) base
    /// segment is set, if a generic base lacks qualification, or if an
    /// exclusivity pair is violated.
    pub fn compose(&self, parts: &StructuredName) -> Result<String, GrammarError> {
        for (segment_id, tok) in parts.iter() {
            let segment =
                self.spec
                    .segment(segment_id)
                    .ok_or_else(|| GrammarError::UnknownSegment {
                        segment: segment_id.to_string(),
                    })?;
            if !token::is_canonical(tok) {
                return Err(GrammarError::MalformedToken {
                    token: tok.to_string(),
                });
            }
            if !segment.accepts(tok) {
                return Err(GrammarError::UnknownToken {
                    segment: segment_id.to_string(),
                    token: tok.to_string(),
                });
            }
        }
        self.check_invariants(parts)?;
        let rendered: Vec<String> = self
            .spec
            .segments()
            .iter()
            .filter_map(|segment| parts.get(&segment.id).map(|tok| segment.render(tok)))
            .collect();
        Ok(rendered.join("_"))
    }

    /// Parses a canonical name string back into its segment assignments.
    pub fn parse(&self, name: &str) -> Result<StructuredName, GrammarError> {
        if !token::is_canonical(name) {
            return Err(GrammarError::MalformedToken {
                token: name.to_string(),
            });
        }
        let segments = self.spec.segments();
        let mut parts = StructuredName::new();
        let mut rest = name;

        // Suffix segments strip from the end, latest-declared first, which
        // inverts the order compose appended them in.
        for &idx in self.spec.suffix().iter().rev() {
            let segment = &segments[idx];
            for (rendered, tok) in segment.rendered() {
                if rest.len() > rendered.len() + 1
                    && rest.ends_with(rendered.as_str())
                    && rest.as_bytes()[rest.len() - rendered.len() - 1] == b'_'
                {
                    parts.set(&segment.id, tok);
                    rest = &rest[..rest.len() - rendered.len() - 1];
                    break;
                }
            }
        }

        // Prefix segments consume left-to-right. At each step the longest
        // rendered match among the segments still ahead of the cursor wins;
        // on a length tie the earliest declared segment does. The cursor
        // never moves backwards, which pins segments to their declared order.
        let prefix = self.spec.prefix();
        let mut cursor = 0;
        while cursor < prefix.len() {
            let mut best: Option<(usize, &str, &str)> = None;
            for (pos, &idx) in prefix.iter().enumerate().skip(cursor) {
                for (rendered, tok) in segments[idx].rendered() {
                    if rest.len() > rendered.len() + 1
                        && rest.starts_with(rendered.as_str())
                        && rest.as_bytes()[rendered.len()] == b'_'
                        && best.map_or(true, |(_, b, _)| rendered.len() > b.len())
                    {
                        best = Some((pos, rendered, tok));
                    }
                }
            }
            let Some((pos, rendered, tok)) = best else {
                break;
            };
            parts.set(&segments[prefix[pos]].id, tok);
            rest = &rest[rendered.len() + 1..];
            cursor = pos + 1;
        }

        // Whatever remains is the base: closed base vocabularies are checked
        // in declared order, the open base takes anything canonical.
        let base_segment = self
            .spec
            .bases()
            .iter()
            .map(|&idx| &segments[idx])
            .find(|segment| !segment.is_open() && segment.accepts(rest))
            .or_else(|| self.spec.open_base().map(|idx| &segments[idx]));
        let Some(base_segment) = base_segment else {
            return Err(GrammarError::MissingBase);
        };
        parts.set(&base_segment.id, rest);

        self.reject_misordered_prefixes(&parts, rest)?;
        self.check_invariants(&parts)?;
        Ok(parts)
    }

    /// Whether `name` parses under this grammar.
    pub fn is_valid(&self, name: &str) -> bool {
        self.parse(name).is_ok()
    }

    /// A token for an unconsumed prefix segment sitting at the start of the
    /// base, while a later-declared prefix segment did match, means the name
    /// put its segments in the wrong order. Report it instead of silently
    /// accepting a mis-segmented base.
    fn reject_misordered_prefixes(
        &self,
        parts: &StructuredName,
        base_token: &str,
    ) -> Result<(), GrammarError> {
        let segments = self.spec.segments();
        let prefix = self.spec.prefix();
        for (pos, &idx) in prefix.iter().enumerate() {
            let segment = &segments[idx];
            if parts.contains(&segment.id) {
                continue;
            }
            let later = prefix
                .iter()
                .skip(pos + 1)
                .map(|&j| &segments[j])
                .find(|s| parts.contains(&s.id));
            let Some(later) = later else {
                continue;
            };
            for (rendered, _) in segment.rendered() {
                let buried = base_token == rendered.as_str()
                    || (base_token.len() > rendered.len()
                        && base_token.starts_with(rendered.as_str())
                        && base_token.as_bytes()[rendered.len()] == b'_');
                if buried {
                    return Err(GrammarError::AmbiguousSegmentOrder {
                        earlier: segment.id.clone(),
                        later: later.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Structural rules shared by compose and parse: exactly one base,
    /// generic bases qualified, no exclusivity pair fully assigned.
    fn check_invariants(&self, parts: &StructuredName) -> Result<(), GrammarError> {
        let segments = self.spec.segments();
        let assigned_bases: Vec<(&Segment, &str)> = self
            .spec
            .bases()
            .iter()
            .map(|&idx| &segments[idx])
            .filter_map(|segment| parts.get(&segment.id).map(|tok| (segment, tok)))
            .collect();
        let base_token = match assigned_bases.as_slice() {
            [] => return Err(GrammarError::MissingBase),
            [(_, tok)] => *tok,
            [(first, _), (second, _), ..] => {
                return Err(GrammarError::ExclusiveSegmentConflict {
                    first: first.id.clone(),
                    second: second.id.clone(),
                });
            }
        };

        if self.spec.is_generic(base_token) {
            let qualified = self
                .spec
                .qualifying()
                .iter()
                .any(|&idx| parts.contains(&segments[idx].id));
            if !qualified {
                return Err(GrammarError::UnqualifiedGenericBase {
                    base: base_token.to_string(),
                });
            }
        }

        for (idx, segment) in segments.iter().enumerate() {
            if !parts.contains(&segment.id) {
                continue;
            }
            for &partner in segment.excludes() {
                if partner > idx && parts.contains(&segments[partner].id) {
                    return Err(GrammarError::ExclusiveSegmentConflict {
                        first: segment.id.clone(),
                        second: segments[partner].id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

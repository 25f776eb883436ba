//! Accept-control search over harvested scopes.
//!
//! A scope is the document or an open shadow root. Each scope exposes its
//! interactive candidates and the shadow roots nested inside it; the search
//! walks them with an explicit stack.

use crate::patterns::CompiledPatterns;
use serde::Deserialize;

/// An interactive element reported by the harvest script.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    /// Index into the page-side handle array
    pub handle: u32,
    /// Normalized (lowercase, whitespace-collapsed) label
    pub text: String,
}

/// Anything that can be searched for accept controls.
pub trait CandidateScope: Sized {
    /// Interactive elements directly in this scope, in document order.
    fn candidates(&self) -> &[Candidate];

    /// Shadow roots nested in this scope, in document order.
    fn nested(&self) -> &[Self];
}

/// Scope tree as returned by the harvest script.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestedScope {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub shadow_roots: Vec<HarvestedScope>,
}

impl CandidateScope for HarvestedScope {
    fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    fn nested(&self) -> &[Self] {
        &self.shadow_roots
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Fuzzy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptMatch {
    pub handle: u32,
    pub text: String,
    pub kind: MatchKind,
    /// 0 for the document, 1 for a top-level shadow root, and so on
    pub depth: usize,
}

/// First candidate in `scope` whose whole label is an accept phrase.
///
/// Only the scope itself is searched, never its nested roots.
pub fn find_accept_phrase<S: CandidateScope>(
    scope: &S,
    patterns: &CompiledPatterns,
) -> Option<Candidate> {
    scope
        .candidates()
        .iter()
        .find(|c| patterns.is_accept_phrase(&c.text))
        .cloned()
}

/// Search `root` depth-first for an accept control.
///
/// Within each scope an exact label wins over a fuzzy one; only when a scope
/// has neither does the search descend into its nested roots.
pub fn find_accept<S: CandidateScope>(root: &S, patterns: &CompiledPatterns) -> Option<AcceptMatch> {
    let mut stack = vec![(root, 0usize)];

    while let Some((scope, depth)) = stack.pop() {
        let candidates = scope.candidates();
        let found = candidates
            .iter()
            .find(|c| patterns.is_exact_accept(&c.text))
            .map(|c| (c, MatchKind::Exact))
            .or_else(|| {
                candidates
                    .iter()
                    .find(|c| patterns.is_fuzzy_accept(&c.text))
                    .map(|c| (c, MatchKind::Fuzzy))
            });

        if let Some((candidate, kind)) = found {
            return Some(AcceptMatch {
                handle: candidate.handle,
                text: candidate.text.clone(),
                kind,
                depth,
            });
        }

        // Reverse so the first nested root is searched first
        stack.extend(scope.nested().iter().rev().map(|s| (s, depth + 1)));
    }

    None
}

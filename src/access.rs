//! Permission evaluation.
//!
//! Permissions are opaque string tokens (`blog:write`, `users:manage`, ...).
//! A [`Requirement`] is either one token or a list of alternatives; a list is
//! satisfied when any one of its tokens is held. Every ambiguous input denies.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The set of permission tokens held by an actor.
///
/// Tokens are trimmed on the way in and blank tokens are dropped, so an empty
/// string can never be granted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct PermissionSet(BTreeSet<String>);

static EMPTY: PermissionSet = PermissionSet(BTreeSet::new());

impl PermissionSet {
    pub fn new() -> Self { Self::default() }

    /// Shared empty set for actors without a resolved session.
    pub fn empty() -> &'static PermissionSet { &EMPTY }

    pub fn insert<S: AsRef<str>>(&mut self, token: S) -> bool {
        let t = token.as_ref().trim();
        if t.is_empty() { return false; }
        self.0.insert(t.to_string())
    }

    pub fn contains(&self, token: &str) -> bool { self.0.contains(token) }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn iter(&self) -> impl Iterator<Item = &str> { self.0.iter().map(|s| s.as_str()) }

    /// Convenience wrapper over [`has_permission`].
    pub fn grants(&self, required: &Requirement) -> bool { has_permission(self, required) }
}

impl<S: AsRef<str>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = PermissionSet::new();
        for t in iter { set.insert(t); }
        set
    }
}

impl From<Vec<String>> for PermissionSet {
    fn from(v: Vec<String>) -> Self { v.into_iter().collect() }
}

impl From<PermissionSet> for Vec<String> {
    fn from(p: PermissionSet) -> Self { p.0.into_iter().collect() }
}

/// A permission requirement declared where something is protected.
///
/// Deserializes from either a bare string or a list of strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Requirement {
    One(String),
    AnyOf(Vec<String>),
}

impl Requirement {
    pub fn one<S: Into<String>>(token: S) -> Self { Requirement::One(token.into()) }

    pub fn any_of<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Requirement::AnyOf(tokens.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for Requirement {
    fn from(s: &str) -> Self { Requirement::One(s.to_string()) }
}

impl From<String> for Requirement {
    fn from(s: String) -> Self { Requirement::One(s) }
}

impl From<Vec<String>> for Requirement {
    fn from(v: Vec<String>) -> Self { Requirement::AnyOf(v) }
}

impl From<Vec<&str>> for Requirement {
    fn from(v: Vec<&str>) -> Self { Requirement::any_of(v) }
}

impl<const N: usize> From<[&str; N]> for Requirement {
    fn from(v: [&str; N]) -> Self { Requirement::any_of(v) }
}

/// Decide whether `held` satisfies `required`.
///
/// `One(p)` holds iff `p` is in `held`; `AnyOf(list)` holds iff at least one
/// entry is in `held`. Membership is exact: required tokens are not trimmed.
/// An empty list, a blank token or an empty `held` set always yields `false`.
/// Pure and allocation free.
pub fn has_permission(held: &PermissionSet, required: &Requirement) -> bool {
    if held.is_empty() { return false; }
    match required {
        Requirement::One(p) => held.contains(p),
        Requirement::AnyOf(list) => list.iter().any(|p| held.contains(p)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(tokens: &[&str]) -> PermissionSet { tokens.iter().collect() }

    #[test]
    fn single_token_matches_membership() {
        let h = held(&["blog:write"]);
        assert!(has_permission(&h, &"blog:write".into()));
        assert!(!has_permission(&h, &"blog:delete".into()));
    }

    #[test]
    fn list_is_any_of() {
        let h = held(&["blog:write", "blog:publish"]);
        assert!(has_permission(&h, &["blog:delete", "blog:publish"].into()));
        assert!(!has_permission(&h, &["blog:delete", "users:manage"].into()));
    }

    #[test]
    fn empty_list_denies() {
        let h = held(&["blog:write"]);
        assert!(!has_permission(&h, &Requirement::AnyOf(vec![])));
    }

    #[test]
    fn empty_held_denies_everything() {
        let h = PermissionSet::new();
        assert!(!has_permission(&h, &"blog:write".into()));
        assert!(!has_permission(&h, &["a", "b"].into()));
        assert!(!has_permission(PermissionSet::empty(), &"".into()));
    }

    #[test]
    fn blank_tokens_are_never_held() {
        let h = held(&["", "  ", "blog:write"]);
        assert_eq!(h.len(), 1);
        assert!(!has_permission(&h, &"".into()));
    }

    #[test]
    fn required_tokens_match_exactly() {
        let h = held(&["blog:write"]);
        assert!(!has_permission(&h, &" blog:write ".into()));
        assert!(!has_permission(&h, &["blog:write\t", "blog:delete"].into()));
        assert!(has_permission(&h, &[" blog:write", "blog:write"].into()));
    }

    #[test]
    fn write_only_actor_cannot_delete_or_publish() {
        let h = held(&["blog:write"]);
        assert!(has_permission(&h, &"blog:write".into()));
        assert!(!has_permission(&h, &["blog:delete", "blog:publish"].into()));
    }

    #[test]
    fn evaluation_does_not_mutate_held() {
        let h = held(&["a"]);
        let before = h.clone();
        let _ = has_permission(&h, &["a", "b"].into());
        assert_eq!(h, before);
    }

    #[test]
    fn requirement_deserializes_from_string_or_list() {
        let one: Requirement = serde_json::from_str("\"blog:write\"").unwrap();
        assert_eq!(one, Requirement::one("blog:write"));
        let many: Requirement = serde_json::from_str("[\"blog:delete\",\"blog:publish\"]").unwrap();
        assert_eq!(many, Requirement::any_of(["blog:delete", "blog:publish"]));
    }

    #[test]
    fn permission_set_serializes_as_list() {
        let h = held(&["b", "a"]);
        assert_eq!(serde_json::to_string(&h).unwrap(), "[\"a\",\"b\"]");
    }
}

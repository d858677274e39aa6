//! Path-based authorization policy.
//!
//! An ordered table of `(pattern, rule)` entries. The first pattern matching
//! the request path decides; paths no pattern matches require any
//! authenticated principal.
//!
//! # Pattern syntax
//!
//! Ant-style, evaluated per `/`-separated segment:
//!
//! | Pattern      | Matches                                            |
//! |--------------|----------------------------------------------------|
//! | `**`         | zero or more whole segments                        |
//! | `name**`     | a segment starting with `name`, then anything below |
//! | `*`, `?`     | any run of characters / one character in a segment |
//! | `{id}`       | exactly one non-empty segment                      |
//!
//! Leading, trailing and repeated slashes are ignored on both sides.

use crate::identity::Role;
use crate::principal::AuthenticatedPrincipal;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    AnyDepth,
    Variable,
    Glob(String),
}

/// Compiled Ant-style path pattern.
#[derive(Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern. Every string is a valid pattern.
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let mut segments = Vec::new();
        for raw in split_path(pattern) {
            if raw == "**" {
                segments.push(Segment::AnyDepth);
            } else if let Some(prefix) = raw.strip_suffix("**") {
                segments.push(Segment::Glob(format!("{prefix}*")));
                segments.push(Segment::AnyDepth);
            } else if raw.len() > 2 && raw.starts_with('{') && raw.ends_with('}') {
                segments.push(Segment::Variable);
            } else {
                segments.push(Segment::Glob(raw.to_string()));
            }
        }

        Self {
            source: pattern.to_string(),
            segments,
        }
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `path` matches this pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path: Vec<&str> = split_path(path).collect();
        match_segments(&self.segments, &path)
    }
}

impl fmt::Debug for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PathPattern").field(&self.source).finish()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    let Some((head, rest)) = pattern.split_first() else {
        return path.is_empty();
    };

    match head {
        Segment::AnyDepth => {
            match_segments(rest, path) || (!path.is_empty() && match_segments(pattern, &path[1..]))
        }
        Segment::Variable => !path.is_empty() && match_segments(rest, &path[1..]),
        Segment::Glob(glob) => {
            !path.is_empty() && glob_match(glob, path[0]) && match_segments(rest, &path[1..])
        }
    }
}

/// `*` / `?` wildcard match within a single segment.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}

/// What a matched path demands of the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRule {
    /// No principal required.
    Public,
    /// Any authenticated principal.
    Authenticated,
    /// An authenticated principal holding one of these roles.
    RoleIn(Vec<Role>),
}

impl AccessRule {
    /// Shorthand for [`AccessRule::RoleIn`].
    #[must_use]
    pub fn roles(roles: &[Role]) -> Self {
        Self::RoleIn(roles.to_vec())
    }

    /// Evaluate the rule against the request's principal, if any.
    ///
    /// # Errors
    ///
    /// - [`AuthorizationFailure::Unauthenticated`] when a principal is
    ///   required and absent
    /// - [`AuthorizationFailure::Forbidden`] when the principal's role is not
    ///   in the allowed set
    pub fn evaluate(
        &self,
        principal: Option<&AuthenticatedPrincipal>,
    ) -> Result<(), AuthorizationFailure> {
        match (self, principal) {
            (Self::Public, _) | (Self::Authenticated, Some(_)) => Ok(()),
            (Self::Authenticated | Self::RoleIn(_), None) => Err(AuthorizationFailure::Unauthenticated),
            (Self::RoleIn(roles), Some(principal)) => {
                if principal.has_any_role(roles) {
                    Ok(())
                } else {
                    Err(AuthorizationFailure::Forbidden {
                        required: roles.clone(),
                    })
                }
            }
        }
    }
}

/// Why the policy rejected a request.
///
/// Distinct from verification failures: the request reached the policy, and
/// the policy said no.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthorizationFailure {
    /// The path requires a principal and the request has none.
    #[error("Authentication required")]
    Unauthenticated,

    /// The principal's role is not allowed on this path.
    #[error("Access denied: requires one of {required:?}")]
    Forbidden {
        /// Roles the matched rule accepts.
        required: Vec<Role>,
    },
}

/// Ordered policy table. First matching pattern wins.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    entries: Vec<(PathPattern, AccessRule)>,
    fallback: AccessRule,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyTable {
    /// Empty table; every path falls back to [`AccessRule::Authenticated`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            fallback: AccessRule::Authenticated,
        }
    }

    /// Append an entry. Later entries only see paths earlier ones miss.
    #[must_use]
    pub fn rule(mut self, pattern: &str, rule: AccessRule) -> Self {
        self.entries.push((PathPattern::new(pattern), rule));
        self
    }

    /// Append one rule for several patterns.
    #[must_use]
    pub fn rules(mut self, patterns: &[&str], rule: &AccessRule) -> Self {
        for pattern in patterns {
            self.entries.push((PathPattern::new(pattern), rule.clone()));
        }
        self
    }

    /// The rule governing `path`.
    #[must_use]
    pub fn rule_for(&self, path: &str) -> &AccessRule {
        self.entries
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map_or(&self.fallback, |(_, rule)| rule)
    }

    /// Decide whether `principal` may access `path`.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthorizationFailure`] of the governing rule.
    pub fn decide(
        &self,
        path: &str,
        principal: Option<&AuthenticatedPrincipal>,
    ) -> Result<(), AuthorizationFailure> {
        self.rule_for(path).evaluate(principal)
    }
}

static DEFAULT_POLICY: LazyLock<PolicyTable> = LazyLock::new(|| {
    PolicyTable::new()
        .rules(
            &[
                "/api/auth/firebase/**",
                "/api/auth/login",
                "/api/auth/lookup",
                "/error",
                "/health",
                "/api/bookings/**",
                "/api/packages/**",
                "/uploads/**",
                "/ws-sightings/**",
                "/ws/**",
            ],
            &AccessRule::Public,
        )
        .rule("/api/admin/**", AccessRule::roles(&[Role::Admin]))
        .rule("/api/driver/**", AccessRule::roles(&[Role::Driver]))
        .rule("/api/customer/**", AccessRule::roles(&[Role::Customer]))
        .rule("/api/sightings**", AccessRule::roles(&[Role::Driver, Role::Admin]))
        .rule("/api/sos", AccessRule::roles(&[Role::Driver, Role::Admin]))
        .rule("/api/review", AccessRule::roles(&[Role::Customer, Role::Admin]))
});

/// The process-wide policy for the Wild Trails HTTP surface.
#[must_use]
pub fn default_policy() -> &'static PolicyTable {
    &DEFAULT_POLICY
}

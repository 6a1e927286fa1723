//! Rule evaluation.
//!
//! # Responsibilities
//! - Evaluate a deployment's rules against a request path, in document order
//! - Require both a pattern match and manifest membership before accepting
//!   a rewritten path
//! - Produce the resolved [`Action`] or an explicit [`NoRouteMatched`]
//!
//! # Design Decisions
//! - First rule that yields a manifest member wins; a pattern that matches
//!   but rewrites to an unknown path falls through to the next rule
//! - Rules are never re-sorted
//! - Pure and synchronous: no I/O, no cancellation points

use thiserror::Error;

use crate::routing::manifest::Manifest;
use crate::routing::rules::{HeaderDirective, PatternRule, RouteConfiguration, Rule};

/// Status used when a rule does not override it.
pub const DEFAULT_STATUS_CODE: u16 = 200;

/// The resolved outcome of matching one request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Object path (relative to the deployment) to serve.
    pub destination_key: String,
    pub status_code: u16,
    pub headers: Vec<HeaderDirective>,
}

/// No rule produced a target present in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no route matched the path requested")]
pub struct NoRouteMatched;

/// Trait for evaluating a single rule against a path.
pub trait Matcher {
    /// Returns the action for `path`, or `None` to continue with the next rule.
    fn evaluate(&self, manifest: &Manifest, path: &str) -> Option<Action>;
}

impl Matcher for PatternRule {
    fn evaluate(&self, manifest: &Manifest, path: &str) -> Option<Action> {
        if !self.source().is_match(path) {
            return None;
        }

        let candidate = self.source().replace_all(path, self.destination());
        if !manifest.contains(&candidate) {
            tracing::trace!(
                pattern = %self.source(),
                path = %path,
                candidate = %candidate,
                "Rewritten path not in manifest, trying next rule"
            );
            return None;
        }

        Some(Action {
            destination_key: candidate.into_owned(),
            status_code: self.status_code().unwrap_or(DEFAULT_STATUS_CODE),
            headers: self.headers().to_vec(),
        })
    }
}

impl Matcher for Rule {
    fn evaluate(&self, manifest: &Manifest, path: &str) -> Option<Action> {
        match self {
            Rule::Filesystem => manifest.contains(path).then(|| Action {
                destination_key: path.to_string(),
                status_code: DEFAULT_STATUS_CODE,
                headers: Vec::new(),
            }),
            Rule::Pattern(pattern) => pattern.evaluate(manifest, path),
        }
    }
}

/// Resolve `path` against `config.rules()` in order.
pub fn match_route(
    config: &RouteConfiguration,
    manifest: &Manifest,
    path: &str,
) -> Result<Action, NoRouteMatched> {
    config
        .rules()
        .iter()
        .find_map(|rule| rule.evaluate(manifest, path))
        .ok_or(NoRouteMatched)
}

//! Routing document grammar and validation.
//!
//! # Responsibilities
//! - Define the wire form of the per-deployment routing document
//! - Validate rules and header directives (pure, non-mutating)
//! - Convert validated wire rules into the compiled [`Rule`] form
//!
//! # Design Decisions
//! - Wire rules ([`RuleSpec`]) keep every field optional so malformed shapes
//!   can be reported; compiled rules ([`Rule`]) cannot represent them
//! - Source patterns are compiled once, when the document is parsed
//! - Unknown rule fields are rejected rather than ignored

use axum::http::{HeaderName, HeaderValue};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routing::manifest::Manifest;

/// Lowest status code a pattern rule may set.
pub const MIN_STATUS_CODE: u16 = 200;

/// Highest status code a pattern rule may set.
pub const MAX_STATUS_CODE: u16 = 499;

/// A response header supplied by a pattern rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HeaderDirective {
    pub key: String,
    pub value: String,
    /// Replace existing values for `key` instead of appending.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub overwrite: bool,
}

impl HeaderDirective {
    pub fn new(key: impl Into<String>, value: impl Into<String>, overwrite: bool) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            overwrite,
        }
    }

    /// A directive is valid iff both key and value are non-empty.
    pub fn validate(&self) -> bool {
        !self.key.is_empty() && !self.value.is_empty()
    }

    /// Whether the key and value form a legal HTTP header.
    ///
    /// Not part of validity: a directive failing this is accepted and skipped
    /// when responses are built.
    pub fn is_representable(&self) -> bool {
        HeaderName::from_bytes(self.key.as_bytes()).is_ok()
            && HeaderValue::from_str(&self.value).is_ok()
    }
}

/// Wire form of a single rule, exactly as it appears in the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_filesystem: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<HeaderDirective>>,
}

impl RuleSpec {
    /// The `{ "useFilesystem": true }` rule.
    pub fn filesystem() -> Self {
        Self {
            use_filesystem: Some(true),
            ..Self::default()
        }
    }

    /// Check the rule against the two permitted shapes.
    ///
    /// Filesystem: `useFilesystem` is true and nothing else is set.
    /// Pattern: `useFilesystem` is not true, `source` and `destination` are
    /// non-empty, `statusCode` (if any) is within 200..=499 and every header
    /// directive is valid.
    pub fn validate(&self) -> bool {
        if self.use_filesystem == Some(true) {
            return self.source.is_none()
                && self.destination.is_none()
                && self.status_code.is_none()
                && self.headers.is_none();
        }

        let non_empty = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.is_empty());
        let status_ok = self
            .status_code
            .map_or(true, |code| (MIN_STATUS_CODE..=MAX_STATUS_CODE).contains(&code));
        let headers_ok = self
            .headers
            .as_ref()
            .map_or(true, |headers| headers.iter().all(HeaderDirective::validate));

        non_empty(&self.source) && non_empty(&self.destination) && status_ok && headers_ok
    }
}

/// Wire form of the whole routing document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<Vec<String>>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl RouteDocument {
    /// A document is valid iff every rule is. No rules is vacuously valid.
    pub fn validate(&self) -> bool {
        self.rules.iter().all(RuleSpec::validate)
    }
}

/// Errors converting a single wire rule into a compiled rule.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule matches neither the filesystem nor the pattern shape")]
    Malformed,

    #[error("invalid source pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors parsing a routing document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed routing document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("rule {index}: {source}")]
    Rule {
        index: usize,
        #[source]
        source: RuleError,
    },
}

/// A compiled pattern rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    source: Regex,
    destination: String,
    status_code: Option<u16>,
    headers: Vec<HeaderDirective>,
}

impl PatternRule {
    /// Compile a pattern rule, enforcing the pattern-shape invariants.
    pub fn new(
        source: &str,
        destination: impl Into<String>,
        status_code: Option<u16>,
        headers: Vec<HeaderDirective>,
    ) -> Result<Self, RuleError> {
        let spec = RuleSpec {
            use_filesystem: None,
            source: Some(source.to_string()),
            destination: Some(destination.into()),
            status_code,
            headers: (!headers.is_empty()).then_some(headers),
        };
        Self::from_spec(spec)
    }

    fn from_spec(spec: RuleSpec) -> Result<Self, RuleError> {
        if spec.use_filesystem == Some(true) || !spec.validate() {
            return Err(RuleError::Malformed);
        }
        let (Some(source), Some(destination)) = (spec.source, spec.destination) else {
            return Err(RuleError::Malformed);
        };

        Ok(Self {
            source: Regex::new(&source)?,
            destination,
            status_code: spec.status_code,
            headers: spec.headers.unwrap_or_default(),
        })
    }

    pub fn source(&self) -> &Regex {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    pub fn headers(&self) -> &[HeaderDirective] {
        &self.headers
    }

    /// Directives that can never be written to a response.
    pub fn unrepresentable_headers(&self) -> impl Iterator<Item = &HeaderDirective> {
        self.headers.iter().filter(|directive| !directive.is_representable())
    }
}

/// A compiled routing rule.
#[derive(Debug, Clone)]
pub enum Rule {
    /// Serve the request path itself if the manifest contains it.
    Filesystem,
    /// Rewrite the path and serve the result if the manifest contains it.
    Pattern(PatternRule),
}

impl Rule {
    /// Wire form of this rule.
    pub fn to_spec(&self) -> RuleSpec {
        match self {
            Rule::Filesystem => RuleSpec::filesystem(),
            Rule::Pattern(pattern) => RuleSpec {
                use_filesystem: None,
                source: Some(pattern.source.as_str().to_string()),
                destination: Some(pattern.destination.clone()),
                status_code: pattern.status_code,
                headers: (!pattern.headers.is_empty()).then(|| pattern.headers.clone()),
            },
        }
    }
}

impl TryFrom<RuleSpec> for Rule {
    type Error = RuleError;

    fn try_from(spec: RuleSpec) -> Result<Self, Self::Error> {
        if !spec.validate() {
            return Err(RuleError::Malformed);
        }
        if spec.use_filesystem == Some(true) {
            return Ok(Rule::Filesystem);
        }
        PatternRule::from_spec(spec).map(Rule::Pattern)
    }
}

/// A parsed, validated routing configuration for one deployment.
#[derive(Debug, Clone)]
pub struct RouteConfiguration {
    manifest: Option<Manifest>,
    rules: Vec<Rule>,
}

impl RouteConfiguration {
    pub fn new(manifest: Option<Manifest>, rules: Vec<Rule>) -> Self {
        Self { manifest, rules }
    }

    /// Configuration used when a deployment has no routing document: a single
    /// filesystem rule and no document manifest.
    pub fn filesystem_default() -> Self {
        Self::new(None, vec![Rule::Filesystem])
    }

    /// Parse and validate a JSON routing document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
        let document: RouteDocument = serde_json::from_slice(bytes)?;
        Self::try_from(document)
    }

    /// Manifest carried by the document, if it declared one.
    pub fn manifest(&self) -> Option<&Manifest> {
        self.manifest.as_ref()
    }

    /// Rules in document order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Wire form of this configuration, with the manifest sorted.
    pub fn to_document(&self) -> RouteDocument {
        RouteDocument {
            manifest: self.manifest.as_ref().map(Manifest::sorted),
            rules: self.rules.iter().map(Rule::to_spec).collect(),
        }
    }
}

impl TryFrom<RouteDocument> for RouteConfiguration {
    type Error = ParseError;

    fn try_from(document: RouteDocument) -> Result<Self, Self::Error> {
        let rules = document
            .rules
            .into_iter()
            .enumerate()
            .map(|(index, spec)| -> Result<Rule, ParseError> {
                let rule =
                    Rule::try_from(spec).map_err(|source| ParseError::Rule { index, source })?;
                if let Rule::Pattern(pattern) = &rule {
                    for directive in pattern.unrepresentable_headers() {
                        tracing::warn!(
                            rule = index,
                            key = %directive.key,
                            "Header directive is not a legal HTTP header and will not be sent"
                        );
                    }
                }
                Ok(rule)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            manifest: document.manifest.map(|paths| paths.into_iter().collect()),
            rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_spec(source: &str, destination: &str) -> RuleSpec {
        RuleSpec {
            source: Some(source.into()),
            destination: Some(destination.into()),
            ..RuleSpec::default()
        }
    }

    #[test]
    fn test_filesystem_rule_is_valid() {
        assert!(RuleSpec::filesystem().validate());
    }

    #[test]
    fn test_filesystem_rule_with_source_is_invalid() {
        let spec = RuleSpec {
            source: Some("^/a$".into()),
            ..RuleSpec::filesystem()
        };
        assert!(!spec.validate());

        let spec = RuleSpec {
            status_code: Some(200),
            ..RuleSpec::filesystem()
        };
        assert!(!spec.validate());
    }

    #[test]
    fn test_pattern_rule_requires_destination() {
        assert!(pattern_spec("^/a/(.*)$", "/b/$1").validate());
        assert!(!pattern_spec("^/a/(.*)$", "").validate());

        let missing = RuleSpec {
            source: Some("^/a$".into()),
            ..RuleSpec::default()
        };
        assert!(!missing.validate());
    }

    #[test]
    fn test_pattern_rule_requires_source() {
        assert!(!pattern_spec("", "/b").validate());
        assert!(!RuleSpec::default().validate());
    }

    #[test]
    fn test_use_filesystem_false_allows_pattern() {
        let spec = RuleSpec {
            use_filesystem: Some(false),
            ..pattern_spec("^/a$", "/b")
        };
        assert!(spec.validate());
    }

    #[test]
    fn test_status_code_range() {
        for (code, valid) in [(199, false), (200, true), (301, true), (499, true), (500, false)] {
            let spec = RuleSpec {
                status_code: Some(code),
                ..pattern_spec("^/a$", "/b")
            };
            assert_eq!(spec.validate(), valid, "status {}", code);
        }
    }

    #[test]
    fn test_header_directive_validation() {
        assert!(HeaderDirective::new("Cache-Control", "no-cache", false).validate());
        assert!(!HeaderDirective::new("", "no-cache", false).validate());
        assert!(!HeaderDirective::new("Cache-Control", "", true).validate());

        let spec = RuleSpec {
            headers: Some(vec![HeaderDirective::new("X-Empty", "", false)]),
            ..pattern_spec("^/a$", "/b")
        };
        assert!(!spec.validate());
    }

    #[test]
    fn test_empty_document_is_valid() {
        let document: RouteDocument = serde_json::from_str("{}").unwrap();
        assert!(document.validate());
        assert!(document.rules.is_empty());
        assert!(document.manifest.is_none());
    }

    #[test]
    fn test_parse_full_document() {
        let json = r#"{
            "manifest": ["/index.html", "/blog/post.html"],
            "rules": [
                { "useFilesystem": true },
                {
                    "source": "^/blog/(.*)$",
                    "destination": "/blog/$1.html",
                    "statusCode": 203,
                    "headers": [
                        { "key": "Cache-Control", "value": "max-age=60", "overwrite": true },
                        { "key": "X-Route", "value": "blog" }
                    ]
                }
            ]
        }"#;

        let config = RouteConfiguration::from_slice(json.as_bytes()).unwrap();
        let manifest = config.manifest().unwrap();
        assert!(manifest.contains("/blog/post.html"));
        assert_eq!(config.rules().len(), 2);
        assert!(matches!(config.rules()[0], Rule::Filesystem));

        let Rule::Pattern(pattern) = &config.rules()[1] else {
            panic!("expected pattern rule");
        };
        assert_eq!(pattern.destination(), "/blog/$1.html");
        assert_eq!(pattern.status_code(), Some(203));
        assert_eq!(pattern.headers().len(), 2);
        assert!(pattern.headers()[0].overwrite);
        assert!(!pattern.headers()[1].overwrite);
    }

    #[test]
    fn test_parse_rejects_mixed_shape() {
        let json = r#"{ "rules": [ { "useFilesystem": true, "source": "^/a$", "destination": "/b" } ] }"#;
        let err = RouteConfiguration::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Rule { index: 0, source: RuleError::Malformed }
        ));
    }

    #[test]
    fn test_parse_rejects_invalid_pattern() {
        let json = r#"{ "rules": [ { "useFilesystem": true }, { "source": "^/(a$", "destination": "/b" } ] }"#;
        let err = RouteConfiguration::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Rule { index: 1, source: RuleError::Pattern(_) }
        ));
    }

    #[test]
    fn test_parse_rejects_unknown_rule_field() {
        let json = r#"{ "rules": [ { "sourcePattern": "^/a$", "destination": "/b" } ] }"#;
        let err = RouteConfiguration::from_slice(json.as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        let err = RouteConfiguration::from_slice(b"{ \"rules\": [").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_pattern_rule_constructor_enforces_shape() {
        assert!(PatternRule::new("^/a$", "/b", None, vec![]).is_ok());
        assert!(matches!(
            PatternRule::new("^/a$", "", None, vec![]),
            Err(RuleError::Malformed)
        ));
        assert!(matches!(
            PatternRule::new("^/a$", "/b", Some(503), vec![]),
            Err(RuleError::Malformed)
        ));
        assert!(matches!(
            PatternRule::new("(", "/b", None, vec![]),
            Err(RuleError::Pattern(_))
        ));
    }

    #[test]
    fn test_to_document_preserves_rule_order() {
        let config = RouteConfiguration::new(
            Some(["/b", "/a"].into_iter().collect()),
            vec![
                Rule::Pattern(PatternRule::new("^/x$", "/a", Some(301), vec![]).unwrap()),
                Rule::Filesystem,
            ],
        );

        let document = config.to_document();
        assert_eq!(document.manifest, Some(vec!["/a".to_string(), "/b".to_string()]));
        assert_eq!(document.rules[0].source.as_deref(), Some("^/x$"));
        assert_eq!(document.rules[1], RuleSpec::filesystem());

        let json = serde_json::to_value(&document).unwrap();
        assert_eq!(json["rules"][1], serde_json::json!({ "useFilesystem": true }));
        assert_eq!(json["rules"][0]["statusCode"], 301);
    }

    #[test]
    fn test_unrepresentable_header_is_accepted_and_reported() {
        let config = RouteConfiguration::from_slice(
            br#"{"rules": [{"source": "^/$", "destination": "/index.html", "headers": [
                {"key": "Bad Header", "value": "x"},
                {"key": "X-Multi", "value": "a\nb"},
                {"key": "X-Ok", "value": "fine"}
            ]}]}"#,
        )
        .unwrap();

        let Rule::Pattern(pattern) = &config.rules()[0] else {
            panic!("expected a pattern rule");
        };
        let keys: Vec<&str> = pattern
            .unrepresentable_headers()
            .map(|directive| directive.key.as_str())
            .collect();
        assert_eq!(keys, vec!["Bad Header", "X-Multi"]);
        assert_eq!(pattern.headers().len(), 3);
    }

    #[test]
    fn test_is_representable() {
        assert!(HeaderDirective::new("Cache-Control", "no-cache", false).is_representable());
        assert!(!HeaderDirective::new("Bad Header", "x", false).is_representable());
        assert!(!HeaderDirective::new("X-Multi", "a\nb", false).is_representable());
    }
}

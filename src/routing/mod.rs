//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Routing document (JSON, per deployment)
//!     → rules.rs (parse wire form, validate, compile patterns)
//!     → RouteConfiguration (immutable, request-scoped)
//!
//! Request path + Manifest
//!     → matcher.rs (evaluate rules in document order)
//!     → Return: Action or NoRouteMatched
//!
//! Action headers
//!     → headers.rs (merge onto object headers)
//! ```
//!
//! # Design Decisions
//! - Patterns compiled when the document is parsed, never per match
//! - Deterministic: same document, manifest and path always give the same Action
//! - First successful match wins (document order, no priority sort)

pub mod headers;
pub mod manifest;
pub mod matcher;
pub mod rules;

pub use manifest::Manifest;
pub use matcher::{match_route, Action, NoRouteMatched};
pub use rules::{HeaderDirective, ParseError, PatternRule, RouteConfiguration, RouteDocument, Rule, RuleSpec};

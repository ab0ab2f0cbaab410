//! Route matching logic.
//!
//! # Responsibilities
//! - Match host header (exact match, case-insensitive)
//! - Match HTTP method
//! - Match path patterns with `{param}` segments and capture their values
//!
//! # Design Decisions
//! - Host matching is case-insensitive
//! - Path matching is case-sensitive, segment by segment
//! - A placeholder spans one whole segment; no regex in the hot path
//! - Empty and trailing segments are ignored (`/admin/` matches `/admin`)

use axum::http::request::Parts;
use serde_json::{Map, Value};

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, parts: &Parts) -> bool;
}

/// Matches the Host header, ignoring any port.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    expected_host: String,
}

impl HostMatcher {
    /// Create a new host matcher.
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_lowercase(),
        }
    }
}

impl Matcher for HostMatcher {
    fn matches(&self, parts: &Parts) -> bool {
        let host = parts
            .headers
            .get("host")
            .and_then(|h| h.to_str().ok())
            .or_else(|| parts.uri.host());
        host.map(|h| h.split(':').next().unwrap_or(h).to_lowercase() == self.expected_host)
            .unwrap_or(false)
    }
}

/// Matches one of a set of methods; an empty set matches everything.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<String>,
}

impl MethodMatcher {
    pub fn new(methods: &[String]) -> Self {
        Self {
            methods: methods.iter().map(|m| m.to_ascii_uppercase()).collect(),
        }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, parts: &Parts) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m == parts.method.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
}

/// A compiled path such as `/admin/post/{entityId}/edit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ => Segment::Static(s.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Names of the placeholders, in path order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Captured placeholder values when `path` matches.
    pub fn captures(&self, path: &str) -> Option<Map<String, Value>> {
        let mut captured = Map::new();
        let mut actual = path.split('/').filter(|s| !s.is_empty());

        for segment in &self.segments {
            let value = actual.next()?;
            match segment {
                Segment::Static(expected) if expected == value => {}
                Segment::Static(_) => return None,
                Segment::Param(name) => {
                    captured.insert(name.clone(), Value::String(value.to_string()));
                }
            }
        }

        if actual.next().is_some() {
            return None;
        }
        Some(captured)
    }

    /// Builds a path, asking `value_of` for each placeholder. Returns the first missing name on failure.
    pub fn expand<F>(&self, mut value_of: F) -> Result<String, String>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Static(text) => path.push_str(text),
                Segment::Param(name) => match value_of(name) {
                    Some(value) if !value.is_empty() => path.push_str(&encode_segment(&value)),
                    _ => return Err(name.clone()),
                },
            }
        }
        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

fn encode_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

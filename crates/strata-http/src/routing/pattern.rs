//! Route pattern compilation and matching
//!
//! A template such as `/users/{id}/posts/{slug}` is split on `/` into literal
//! and variable segments. A compiled pattern matches a concrete path only when
//! both have the same number of segments, every literal is byte-for-byte equal
//! and every variable captures a non-empty segment. Trailing slashes count as
//! an extra (empty) segment, so `/foo` and `/foo/` are different routes.

use super::params::RouteVars;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur while compiling a route template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutePatternError {
    #[error("Route template must start with '/': {0:?}")]
    MissingLeadingSlash(String),
    #[error("Missing closing brace in segment: {0}")]
    UnclosedParameter(String),
    #[error("Parameter name cannot be empty")]
    EmptyParameterName,
    #[error("Invalid parameter name: {0}")]
    InvalidParameterName(String),
    #[error("Duplicate parameter name: {0}")]
    DuplicateParameter(String),
}

/// A single path segment in a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Literal text, compared exactly
    Static(String),
    /// `{name}` placeholder capturing one segment
    Parameter { name: String },
}

/// Compiled route template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    original: String,
    segments: Vec<PathSegment>,
    param_names: Vec<String>,
}

impl RoutePattern {
    /// Parse a route pattern from a template string
    pub fn parse(template: &str) -> Result<Self, RoutePatternError> {
        let rest = template
            .strip_prefix('/')
            .ok_or_else(|| RoutePatternError::MissingLeadingSlash(template.to_string()))?;

        let mut segments = Vec::new();
        let mut param_names = Vec::new();
        let mut seen = HashSet::new();

        for raw in rest.split('/') {
            let Some(inner) = raw.strip_prefix('{') else {
                segments.push(PathSegment::Static(raw.to_string()));
                continue;
            };

            let name = inner
                .strip_suffix('}')
                .ok_or_else(|| RoutePatternError::UnclosedParameter(raw.to_string()))?;

            if name.is_empty() {
                return Err(RoutePatternError::EmptyParameterName);
            }
            if name.contains(['{', '}']) {
                return Err(RoutePatternError::InvalidParameterName(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(RoutePatternError::DuplicateParameter(name.to_string()));
            }

            segments.push(PathSegment::Parameter {
                name: name.to_string(),
            });
            param_names.push(name.to_string());
        }

        Ok(Self {
            original: template.to_string(),
            segments,
            param_names,
        })
    }

    /// Match a concrete path, returning the captured variables on success
    pub fn match_path(&self, path: &str) -> Option<RouteVars> {
        let rest = path.strip_prefix('/')?;
        let mut parts = rest.split('/');
        let mut vars = RouteVars::with_capacity(self.param_names.len());

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                PathSegment::Static(expected) => {
                    if expected != part {
                        return None;
                    }
                }
                PathSegment::Parameter { name } => {
                    if part.is_empty() {
                        return None;
                    }
                    vars.insert(name.as_str(), part);
                }
            }
        }

        // Longer paths never match: no prefix matching
        if parts.next().is_some() {
            return None;
        }

        Some(vars)
    }

    pub fn matches(&self, path: &str) -> bool {
        self.match_path(path).is_some()
    }

    /// The template this pattern was compiled from
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Parameter names in declaration order
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Check if this is a static route (no parameters)
    pub fn is_static(&self) -> bool {
        self.param_names.is_empty()
    }
}

impl std::str::FromStr for RoutePattern {
    type Err = RoutePatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_static_route() {
        let pattern = RoutePattern::parse("/users").unwrap();
        assert_eq!(pattern.segments(), &[PathSegment::Static("users".to_string())]);
        assert!(pattern.param_names().is_empty());
        assert!(pattern.is_static());
    }

    #[test]
    fn test_parse_parameter_route() {
        let pattern = RoutePattern::parse("/users/{id}").unwrap();
        assert_eq!(pattern.segments().len(), 2);
        assert!(matches!(&pattern.segments()[1], PathSegment::Parameter { name } if name == "id"));
        assert_eq!(pattern.param_names(), &["id".to_string()]);
        assert!(!pattern.is_static());
    }

    #[test]
    fn test_root_template() {
        let pattern = RoutePattern::parse("/").unwrap();
        assert_eq!(pattern.segments(), &[PathSegment::Static(String::new())]);
        assert!(pattern.matches("/"));
        assert!(!pattern.matches("/foo"));
        assert!(!pattern.matches(""));
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(
            RoutePattern::parse("/users/{id}/{id}"),
            Err(RoutePatternError::DuplicateParameter("id".to_string()))
        );
        assert_eq!(
            RoutePattern::parse("/users/{}"),
            Err(RoutePatternError::EmptyParameterName)
        );
        assert_eq!(
            RoutePattern::parse("/users/{id"),
            Err(RoutePatternError::UnclosedParameter("{id".to_string()))
        );
        assert!(matches!(
            RoutePattern::parse("/users/{a{b}"),
            Err(RoutePatternError::InvalidParameterName(_))
        ));
        assert!(matches!(
            RoutePattern::parse("users"),
            Err(RoutePatternError::MissingLeadingSlash(_))
        ));
    }

    #[test]
    fn test_pattern_matching() {
        let pattern = RoutePattern::parse("/users/{id}/posts/{slug}").unwrap();

        assert!(pattern.matches("/users/123/posts/hello-world"));
        assert!(!pattern.matches("/users/123/posts")); // Missing slug
        assert!(!pattern.matches("/users/123/posts/hello/world")); // Too many segments
        assert!(!pattern.matches("/posts/123/posts/hello")); // Wrong static segment
        assert!(!pattern.matches("/users//posts/hello")); // Empty variable
    }

    #[test]
    fn test_literals_are_case_sensitive() {
        let pattern = RoutePattern::parse("/About").unwrap();
        assert!(pattern.matches("/About"));
        assert!(!pattern.matches("/about"));
    }

    #[test]
    fn test_trailing_slash_is_significant() {
        let bare = RoutePattern::parse("/foo").unwrap();
        let slashed = RoutePattern::parse("/foo/").unwrap();

        assert!(bare.matches("/foo"));
        assert!(!bare.matches("/foo/"));
        assert!(slashed.matches("/foo/"));
        assert!(!slashed.matches("/foo"));
    }

    #[test]
    fn test_parameter_extraction_in_declaration_order() {
        let pattern = RoutePattern::parse("/{b}/mid/{a}").unwrap();
        let vars = pattern.match_path("/two/mid/one").unwrap();

        let pairs: Vec<(&str, &str)> = vars.iter().collect();
        assert_eq!(pairs, vec![("b", "two"), ("a", "one")]);
    }

    #[test]
    fn test_values_are_raw_segments() {
        let pattern = RoutePattern::parse("/files/{name}").unwrap();
        let vars = pattern.match_path("/files/a%20b.txt").unwrap();
        assert_eq!(vars.get("name"), Some("a%20b.txt"));
    }

    #[test]
    fn test_star_segment_is_literal() {
        let pattern = RoutePattern::parse("/files/*path").unwrap();
        assert!(pattern.is_static());
        assert!(pattern.matches("/files/*path"));
        assert!(!pattern.matches("/files/docs/readme"));
    }
}

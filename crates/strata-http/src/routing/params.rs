//! Route variables extracted from a matched path

use crate::errors::{HttpError, HttpResult};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ordered mapping of route variable names to the raw path segments they captured.
///
/// Iteration order is the order in which the variables appear in the template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteVars {
    entries: Vec<(String, String)>,
}

impl RouteVars {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a variable, replacing the value of an existing one with the same name
    pub fn insert<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Encode as `application/x-www-form-urlencoded` pairs, e.g. `foo=1234&bar=x`
    pub fn to_query_string(&self) -> HttpResult<String> {
        serde_urlencoded::to_string(&self.entries)
            .map_err(|e| HttpError::internal(format!("Failed to encode route variables: {}", e)))
    }
}

impl<'a> IntoIterator for &'a RouteVars {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for RouteVars {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut vars = RouteVars::new();
        for (name, value) in iter {
            vars.insert(name, value);
        }
        vars
    }
}

impl Serialize for RouteVars {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

//! Rendering a compiled pattern into a concrete relative URL
//!
//! Rendering is a pure function of the pattern and a variable map: no
//! I/O, no mutation of the pattern. Path literals are copied verbatim
//! and path variables are substituted from the map; a missing path
//! variable is an error rather than leaving the `<name>` placeholder in
//! the produced URL. Query pairs are emitted in the pattern's declared
//! order, only for variables present in the map, so rendered URLs are
//! deterministic. No percent-encoding is applied: callers supply
//! already-safe values.

use crate::pattern::compiled::{PathSegment, PatternError, UrlPattern};
use std::collections::HashMap;

/// The merged variable map a request renders with (path values plus
/// translated query values)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariableMap(HashMap<String, String>);

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for VariableMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl UrlPattern {
    /// Render this pattern with the given variable values.
    ///
    /// Query keys in the output are the pattern's own declared keys, not
    /// whatever key the caller originally used; bindings whose variable
    /// is absent from the map are omitted entirely.
    pub fn render(&self, values: &VariableMap) -> Result<String, PatternError> {
        let mut rendered = String::new();
        for segment in self.segments() {
            rendered.push('/');
            match segment {
                PathSegment::Literal(text) => rendered.push_str(text),
                PathSegment::Variable(name) => {
                    let value = values
                        .get(name.as_ref())
                        .ok_or_else(|| PatternError::MissingVariable(name.to_string()))?;
                    rendered.push_str(value);
                }
            }
        }

        let mut query = String::new();
        for (key, name) in self.query_bindings() {
            if let Some(value) = values.get(name.as_ref()) {
                if !query.is_empty() {
                    query.push('&');
                }
                query.push_str(key.as_ref());
                query.push('=');
                query.push_str(value);
            }
        }

        if !query.is_empty() {
            rendered.push('?');
            rendered.push_str(&query);
        }
        Ok(rendered)
    }
}

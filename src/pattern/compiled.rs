//! Compiled URL pattern representation
//!
//! A route template like `/v1/patient/<uid>?version_at_time=<vat>` is
//! validated against the template grammar in a single structural check,
//! then split into an ordered sequence of path segments and an ordered
//! list of query bindings. Every variable name must be unique across
//! both locations.

use nutype::nutype;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;

/// The full template grammar, anchored at both ends.
///
/// Group 1 captures the path part (leading `/`, `/`-separated literal or
/// `<name>` tokens, optional trailing `/`); group 2 captures the optional
/// `key=<name>&...` query suffix. Literal text is one-or-more of any
/// character except `/ % ? # = < >`, or a `%XX` percent-triple.
static TEMPLATE_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^((?:/(?:(?:[^/%?#=<>]|%[a-zA-Z0-9]{2})+|<[a-zA-Z_][a-zA-Z0-9_]*>))+/?|/)(?:\?((?:[^/%?#=<>]|%[a-zA-Z0-9]{2})+=<[a-zA-Z_][a-zA-Z0-9_]*>(?:&(?:[^/%?#=<>]|%[a-zA-Z0-9]{2})+=<[a-zA-Z_][a-zA-Z0-9_]*>)*))?$",
    )
    .expect("template grammar regex is valid")
});

/// A variable identifier appearing in a pattern (`<name>` in the template)
#[nutype(
    validate(not_empty, regex = r"^[a-zA-Z_][a-zA-Z0-9_]*$"),
    derive(Clone, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize, TryFrom, AsRef)
)]
pub struct VariableName(String);

/// A query-string key declared by a pattern (`key` in `key=<name>`)
#[nutype(
    validate(not_empty, regex = r"^(?:[^/%?#=<>]|%[a-zA-Z0-9]{2})+$"),
    derive(Clone, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize, TryFrom, AsRef)
)]
pub struct QueryKey(String);

/// One `/`-separated token of a pattern's path
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// Copied verbatim when rendering
    Literal(String),
    /// Substituted from the variable map when rendering
    Variable(VariableName),
}

/// Errors from compiling or rendering a pattern
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("malformed pattern: {0:?}")]
    Malformed(String),

    #[error("variable {0} defined twice")]
    DuplicateVariable(String),

    #[error("no value supplied for path variable {0}")]
    MissingVariable(String),
}

/// An immutable compiled route template
///
/// Owns the ordered path segments and the ordered query bindings
/// (query key to variable name). Invariant: every variable name appears
/// exactly once across path segments and query bindings combined.
#[derive(Clone, Debug)]
pub struct UrlPattern {
    template: String,
    segments: Vec<PathSegment>,
    query_bindings: Vec<(QueryKey, VariableName)>,
}

impl UrlPattern {
    /// Compile a template string into a pattern.
    ///
    /// The whole string is validated against the grammar up front;
    /// anything that does not match fails with [`PatternError::Malformed`].
    /// A variable name recurring anywhere in the template fails with
    /// [`PatternError::DuplicateVariable`].
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        let captures = TEMPLATE_GRAMMAR
            .captures(template)
            .ok_or_else(|| PatternError::Malformed(template.to_string()))?;

        let path_part = captures
            .get(1)
            .ok_or_else(|| PatternError::Malformed(template.to_string()))?
            .as_str();

        let mut seen: HashSet<String> = HashSet::new();
        let mut segments = Vec::new();

        // The grammar guarantees a leading slash; split the remainder.
        // A trailing slash yields a final empty literal, which renders
        // back to the same trailing slash.
        for token in path_part[1..].split('/') {
            if let Some(name) = token.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
                if !seen.insert(name.to_string()) {
                    return Err(PatternError::DuplicateVariable(name.to_string()));
                }
                let name = VariableName::try_new(name.to_string())
                    .map_err(|_| PatternError::Malformed(template.to_string()))?;
                segments.push(PathSegment::Variable(name));
            } else {
                segments.push(PathSegment::Literal(token.to_string()));
            }
        }

        let mut query_bindings = Vec::new();
        if let Some(query_part) = captures.get(2) {
            for pair in query_part.as_str().split('&') {
                let (key, placeholder) = pair
                    .split_once('=')
                    .ok_or_else(|| PatternError::Malformed(template.to_string()))?;
                let name = placeholder
                    .strip_prefix('<')
                    .and_then(|p| p.strip_suffix('>'))
                    .ok_or_else(|| PatternError::Malformed(template.to_string()))?;
                if !seen.insert(name.to_string()) {
                    return Err(PatternError::DuplicateVariable(name.to_string()));
                }
                let key = QueryKey::try_new(key.to_string())
                    .map_err(|_| PatternError::Malformed(template.to_string()))?;
                let name = VariableName::try_new(name.to_string())
                    .map_err(|_| PatternError::Malformed(template.to_string()))?;
                query_bindings.push((key, name));
            }
        }

        Ok(Self {
            template: template.to_string(),
            segments,
            query_bindings,
        })
    }

    /// The original template string
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Ordered path segments
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Ordered query bindings (declared key to variable name)
    pub fn query_bindings(&self) -> &[(QueryKey, VariableName)] {
        &self.query_bindings
    }

    /// Names of all path variables, in path order
    pub fn path_variable_names(&self) -> impl Iterator<Item = &VariableName> {
        self.segments.iter().filter_map(|segment| match segment {
            PathSegment::Variable(name) => Some(name),
            PathSegment::Literal(_) => None,
        })
    }

    /// Names of all query variables, in declared order
    pub fn query_variable_names(&self) -> impl Iterator<Item = &VariableName> {
        self.query_bindings.iter().map(|(_, name)| name)
    }

    /// Translate an inbound query key into its canonical variable name
    pub fn query_variable_for_key(&self, key: &str) -> Option<&VariableName> {
        self.query_bindings
            .iter()
            .find(|(declared, _)| declared.as_ref() == key)
            .map(|(_, name)| name)
    }

    /// The path shape as an axum route string (`<name>` becomes `{name}`)
    pub fn axum_path(&self) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                PathSegment::Literal(text) => path.push_str(text),
                PathSegment::Variable(name) => {
                    path.push('{');
                    path.push_str(name.as_ref());
                    path.push('}');
                }
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn names_of<'a>(iter: impl Iterator<Item = &'a VariableName>) -> Vec<&'a str> {
        iter.map(|name| name.as_ref()).collect()
    }

    #[test]
    fn compiles_plain_path() {
        let pattern = UrlPattern::compile("/v1/ehr").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                PathSegment::Literal("v1".to_string()),
                PathSegment::Literal("ehr".to_string())
            ]
        );
        assert!(pattern.query_bindings().is_empty());
    }

    #[test]
    fn compiles_root_path() {
        let pattern = UrlPattern::compile("/").unwrap();
        assert_eq!(pattern.segments(), &[PathSegment::Literal(String::new())]);
    }

    #[test]
    fn compiles_path_variables_in_order() {
        let pattern = UrlPattern::compile("/v1/patient/<uid>/version/<vuid>").unwrap();
        assert_eq!(names_of(pattern.path_variable_names()), vec!["uid", "vuid"]);
        assert!(names_of(pattern.query_variable_names()).is_empty());
    }

    #[test]
    fn compiles_query_bindings_in_declared_order() {
        let pattern =
            UrlPattern::compile("/v1/ehr?subject_id=<sid>&subject_namespace=<ns>").unwrap();
        assert_eq!(names_of(pattern.query_variable_names()), vec!["sid", "ns"]);
        assert_eq!(
            pattern.query_variable_for_key("subject_id").unwrap().as_ref(),
            "sid"
        );
        assert_eq!(
            pattern
                .query_variable_for_key("subject_namespace")
                .unwrap()
                .as_ref(),
            "ns"
        );
    }

    #[test]
    fn query_variable_for_unknown_key_is_none() {
        let pattern = UrlPattern::compile("/v1/patient/<uid>?version_at_time=<vat>").unwrap();
        assert_eq!(
            pattern
                .query_variable_for_key("version_at_time")
                .unwrap()
                .as_ref(),
            "vat"
        );
        assert!(pattern.query_variable_for_key("bogus").is_none());
    }

    #[test]
    fn rejects_duplicate_variable_across_path_and_query() {
        let err = UrlPattern::compile("/x/<a>?k=<a>").unwrap_err();
        assert!(matches!(err, PatternError::DuplicateVariable(name) if name == "a"));
    }

    #[test]
    fn rejects_duplicate_path_variable() {
        let err = UrlPattern::compile("/x/<a>/<a>").unwrap_err();
        assert!(matches!(err, PatternError::DuplicateVariable(name) if name == "a"));
    }

    #[rstest]
    #[case("not/starting/with/slash")]
    #[case("")]
    #[case("//double")]
    #[case("/x?key=value")]
    #[case("/x?key=<1bad>")]
    #[case("/x?=<name>")]
    #[case("/incomplete%2")]
    #[case("/bad<mix>ed")]
    #[case("/x?k=<a>&")]
    fn rejects_malformed_templates(#[case] template: &str) {
        let err = UrlPattern::compile(template).unwrap_err();
        assert!(matches!(err, PatternError::Malformed(_)));
    }

    #[test]
    fn accepts_percent_triples_in_literals() {
        let pattern = UrlPattern::compile("/path%20with/space?my%20key=<v>").unwrap();
        assert_eq!(
            pattern.segments()[0],
            PathSegment::Literal("path%20with".to_string())
        );
        assert_eq!(
            pattern.query_variable_for_key("my%20key").unwrap().as_ref(),
            "v"
        );
    }

    #[test]
    fn trailing_slash_is_preserved_in_shape() {
        let pattern = UrlPattern::compile("/v1/definition/template/adl1.4/").unwrap();
        assert_eq!(pattern.axum_path(), "/v1/definition/template/adl1.4/");
    }

    #[test]
    fn axum_path_uses_brace_captures() {
        let pattern = UrlPattern::compile("/v1/patient/<uid>?version_at_time=<vat>").unwrap();
        assert_eq!(pattern.axum_path(), "/v1/patient/{uid}");
    }

    proptest! {
        /// Any template assembled from grammar-conforming parts compiles,
        /// and the variable names are reported without duplicates.
        #[test]
        fn compile_accepts_generated_templates(
            literals in prop::collection::vec("[a-zA-Z0-9._~-]{1,10}", 1..5),
            names in prop::collection::hash_set("[a-z_][a-z0-9_]{0,6}", 0..6),
            query_split in 0usize..6,
        ) {
            let names: Vec<String> = names.into_iter().collect();
            let split = query_split.min(names.len());
            let (query_names, path_names) = names.split_at(split);

            let mut template = String::new();
            for literal in &literals {
                template.push('/');
                template.push_str(literal);
            }
            for name in path_names {
                template.push_str(&format!("/<{name}>"));
            }
            for (i, name) in query_names.iter().enumerate() {
                template.push(if i == 0 { '?' } else { '&' });
                template.push_str(&format!("k{i}=<{name}>"));
            }

            let pattern = UrlPattern::compile(&template).unwrap();

            let mut all: Vec<&str> = pattern
                .path_variable_names()
                .chain(pattern.query_variable_names())
                .map(|name| name.as_ref())
                .collect();
            prop_assert_eq!(all.len(), names.len());
            all.sort_unstable();
            all.dedup();
            prop_assert_eq!(all.len(), names.len());
        }
    }
}

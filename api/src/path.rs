//! Path template parsing and substitution.
//!
//! Templates contain `{name}` placeholders. Substituted values are inserted
//! verbatim: no URL-encoding is applied, so callers must pass segments that
//! are already safe to embed in a URL.

use indexmap::IndexMap;

use crate::endpoint::ParamRule;
use crate::value::{ParamMap, ParamValue};

/// Extracts placeholder names from a template.
///
/// Names are returned in order of first appearance; repeated placeholders
/// are reported once. An unclosed `{` ends the scan, and empty `{}` pairs
/// are ignored.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let name = &after[..close];
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
        rest = &after[close + 1..];
    }

    names
}

/// Substitutes placeholders in endpoint path templates.
///
/// Stateless: building the same inputs twice yields the same path.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathBuilder;

impl PathBuilder {
    /// Builds a concrete path from `template`.
    ///
    /// Each placeholder resolves, in order of precedence, from
    /// `path_overrides`, then `values`, then the matching rule's default.
    /// Placeholders that resolve from none of these are left untouched;
    /// validation is expected to have rejected such calls already.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use api_caller::path::PathBuilder;
    /// use api_caller::ParamMap;
    /// use indexmap::IndexMap;
    ///
    /// let values = ParamMap::from([("id".to_string(), 42.into())]);
    /// let path = PathBuilder::build("/items/{id}", &values, &ParamMap::new(), &IndexMap::new());
    /// assert_eq!(path, "/items/42");
    /// ```
    pub fn build(
        template: &str,
        values: &ParamMap,
        path_overrides: &ParamMap,
        rules: &IndexMap<String, ParamRule>,
    ) -> String {
        let mut path = String::with_capacity(template.len());
        let mut rest = template;

        // Single pass, so substituted text is never rescanned.
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                break;
            };
            let name = &after[..close];
            path.push_str(&rest[..open]);
            match Self::resolve(name, values, path_overrides, rules) {
                Some(segment) if !name.is_empty() => path.push_str(&segment),
                _ => path.push_str(&rest[open..open + close + 2]),
            }
            rest = &after[close + 1..];
        }
        path.push_str(rest);

        path
    }

    fn resolve(
        name: &str,
        values: &ParamMap,
        path_overrides: &ParamMap,
        rules: &IndexMap<String, ParamRule>,
    ) -> Option<String> {
        if let Some(value) = path_overrides.get(name).filter(|v| !v.is_null()) {
            return Some(value.to_path_segment());
        }
        if let Some(value) = values.get(name).filter(|v| !v.is_null()) {
            return Some(value.to_path_segment());
        }
        rules
            .get(name)
            .and_then(|rule| rule.default.clone())
            .map(|default| ParamValue::Value(default).to_path_segment())
    }
}

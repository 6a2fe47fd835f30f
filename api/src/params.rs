//! Parameter validation and classification.
//!
//! Validation checks a call's values against an endpoint's rules and path
//! placeholders. Classification then partitions the values into the body
//! (query for GET/DELETE) set and the file set.

use crate::endpoint::EndpointSpec;
use crate::error::RequestError;
use crate::value::{ParamMap, ParamValue};

/// Values partitioned for the transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedParams {
    /// Body parameters, or query parameters for methods without a body.
    pub body: ParamMap,
    /// File parameters.
    pub files: ParamMap,
}

fn is_present(values: &ParamMap, name: &str) -> bool {
    values.get(name).is_some_and(|v| !v.is_null())
}

/// Checks that every required parameter resolves and that typed rules match.
///
/// Type checks run first, over every supplied value governed by a typed rule,
/// in rule declaration order; the first mismatch fails the call. Missing
/// names are then collected in one pass: rules without a supplied value or
/// default, followed by path-only placeholders not covered by `values` or
/// `path_overrides`. `null` values count as missing in either map.
pub fn validate(
    endpoint: &EndpointSpec,
    path_overrides: &ParamMap,
    values: &ParamMap,
) -> Result<(), RequestError> {
    for (name, rule) in endpoint.params() {
        let (Some(kind), Some(value)) = (rule.kind, values.get(name)) else {
            continue;
        };
        if !value.is_null() && !kind.matches(value) {
            return Err(RequestError::TypeMismatch {
                param: name.clone(),
                expected: kind.to_string(),
            });
        }
    }

    let mut missing: Vec<String> = endpoint
        .params()
        .iter()
        .filter(|(name, rule)| !is_present(values, name) && rule.default.is_none())
        .map(|(name, _)| name.clone())
        .collect();

    missing.extend(
        endpoint
            .path_params()
            .into_iter()
            .filter(|name| {
                !is_present(values, name)
                    && !endpoint.params().contains_key(*name)
                    && !is_present(path_overrides, name)
            })
            .map(str::to_string),
    );

    if missing.is_empty() {
        Ok(())
    } else {
        Err(RequestError::missing(missing))
    }
}

/// Partitions `values` into body and file parameters.
///
/// - A value whose rule routes to files, or which is itself a
///   [`FileParam`](crate::value::FileParam), goes to the file set.
/// - A value consumed only as a path placeholder (no rule of its own) is
///   dropped from both sets.
/// - Everything else goes to the body set, in supplied order.
///
/// Rules with a default whose name was not supplied contribute the default,
/// appended after the supplied values in rule declaration order.
pub fn classify(endpoint: &EndpointSpec, values: &ParamMap) -> ClassifiedParams {
    let path_params = endpoint.path_params();
    let mut classified = ClassifiedParams::default();

    for (name, value) in values {
        let rule = endpoint.rule(name);
        if rule.is_none() && path_params.contains(&name.as_str()) {
            continue;
        }
        let to_files = value.is_file() || rule.is_some_and(|r| r.routes_to_files());
        let target = if to_files {
            &mut classified.files
        } else {
            &mut classified.body
        };
        target.insert(name.clone(), value.clone());
    }

    for (name, rule) in endpoint.params() {
        let Some(default) = &rule.default else {
            continue;
        };
        if is_present(values, name) {
            continue;
        }
        let target = if rule.routes_to_files() {
            &mut classified.files
        } else {
            &mut classified.body
        };
        target.insert(name.clone(), ParamValue::Value(default.clone()));
    }

    classified
}

/// Runs [`validate`] then [`classify`].
pub fn validate_and_classify(
    endpoint: &EndpointSpec,
    path_overrides: &ParamMap,
    values: &ParamMap,
) -> Result<ClassifiedParams, RequestError> {
    validate(endpoint, path_overrides, values)?;
    Ok(classify(endpoint, values))
}

//! Header defaults and per-call overrides.

use crate::value::Headers;

/// Merges endpoint default headers with caller-supplied overrides.
///
/// The result holds every key from both maps; on collision the override
/// wins. Defaults keep their position, new override keys are appended.
/// Names are compared by exact string, without case folding.
pub fn merge_headers(defaults: &Headers, overrides: Option<&Headers>) -> Headers {
    let mut merged = defaults.clone();
    if let Some(overrides) = overrides {
        for (name, value) in overrides {
            merged.insert(name.clone(), value.clone());
        }
    }
    merged
}

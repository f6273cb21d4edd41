//! Leaf-path enumeration
//!
//! Walks a nested document depth-first and yields the separator-joined path
//! of every leaf. Two documents are structurally equal iff their leaf-path
//! sets are set-equal, so this enumeration is the primitive behind snapshots
//! and structural comparison.

use serde_json::Value;

/// Collect every leaf path with a reference to its value.
///
/// Mapping keys are visited in document order, sequence indices become
/// decimal segments. Empty mappings and sequences contribute nothing; a
/// scalar root has no leaf paths.
///
/// # Examples
///
/// ```
/// use lockstep_doc::leaf::leaf_entries;
/// use serde_json::json;
///
/// let doc = json!({"a": {"b": 1}, "items": ["x"]});
/// let paths: Vec<_> = leaf_entries(&doc, "/")
///     .into_iter()
///     .map(|(path, _)| path)
///     .collect();
/// assert_eq!(paths, vec!["a/b", "items/0"]);
/// ```
pub fn leaf_entries<'a>(root: &'a Value, separator: &str) -> Vec<(String, &'a Value)> {
    let mut entries = Vec::new();
    collect_leaves(root, String::new(), separator, &mut entries);
    entries
}

/// Collect every leaf path.
pub fn leaf_paths(root: &Value, separator: &str) -> Vec<String> {
    leaf_entries(root, separator)
        .into_iter()
        .map(|(path, _)| path)
        .collect()
}

/// Collect leaf entries, dropping every path that matches any mask.
pub fn leaf_entries_filtered<'a>(
    root: &'a Value,
    separator: &str,
    masks: &[String],
) -> Vec<(String, &'a Value)> {
    leaf_entries(root, separator)
        .into_iter()
        .filter(|(path, _)| !masks.iter().any(|mask| matches_mask(mask, path)))
        .collect()
}

fn collect_leaves<'a>(
    value: &'a Value,
    prefix: String,
    separator: &str,
    out: &mut Vec<(String, &'a Value)>,
) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                collect_leaves(child, join(&prefix, key, separator), separator, out);
            }
        }
        Value::Array(arr) => {
            for (index, child) in arr.iter().enumerate() {
                let segment = index.to_string();
                collect_leaves(child, join(&prefix, &segment, separator), separator, out);
            }
        }
        _ => {
            if !prefix.is_empty() {
                out.push((prefix, value));
            }
        }
    }
}

fn join(prefix: &str, segment: &str, separator: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}{separator}{segment}")
    }
}

/// Match a path against a single-`*` wildcard pattern.
///
/// Without a `*` the match is exact. A leading `*` matches by suffix, a
/// trailing `*` by prefix, and a `*` in the middle by prefix and suffix
/// together. Only the first `*` is a wildcard.
///
/// # Examples
///
/// ```
/// use lockstep_doc::leaf::matches_mask;
///
/// assert!(matches_mask("a/b", "a/b"));
/// assert!(matches_mask("meta/*", "meta/updated"));
/// assert!(matches_mask("*/id", "users/id"));
/// assert!(matches_mask("a/*/c", "a/b/c"));
/// assert!(!matches_mask("meta/*", "data/meta"));
/// ```
pub fn matches_mask(pattern: &str, path: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == path,
        Some((prefix, suffix)) => {
            path.len() >= prefix.len() + suffix.len()
                && path.starts_with(prefix)
                && path.ends_with(suffix)
        }
    }
}

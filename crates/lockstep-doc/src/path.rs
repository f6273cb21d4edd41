//! Separator-delimited path addressing over nested documents
//!
//! This module provides utilities for navigating and modifying structured
//! documents using delimited paths (e.g. `a/b/2/c` with the default `/`
//! separator).
//!
//! # Path Syntax
//!
//! - Segments joined by a configurable separator: `config/database/host`
//! - Against a sequence, a segment must be a non-negative integer: `items/0/name`
//! - Against a mapping, every segment is a key, so the mapping key `"0"`
//!   stays addressable
//!
//! # Examples
//!
//! ```
//! use lockstep_doc::path::{get_path, set_path};
//! use serde_json::json;
//!
//! let mut value = json!({"config": {"servers": [{"host": "localhost"}]}});
//! assert_eq!(
//!     get_path(&value, "config/servers/0/host", "/"),
//!     Some(&json!("localhost"))
//! );
//!
//! set_path(&mut value, "config/servers/0/port", "/", json!(8080)).unwrap();
//! assert_eq!(get_path(&value, "config/servers/0/port", "/"), Some(&json!(8080)));
//! ```

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Split a path string into segments.
///
/// Fails with `InvalidPath` when the path is empty or contains an empty
/// segment (leading, trailing, or doubled separator).
///
/// # Examples
///
/// ```
/// use lockstep_doc::path::split_path;
///
/// assert_eq!(split_path("a/b/c", "/").unwrap(), vec!["a", "b", "c"]);
/// assert_eq!(split_path("a.b", ".").unwrap(), vec!["a", "b"]);
/// assert!(split_path("a//b", "/").is_err());
/// ```
pub fn split_path<'a>(path: &'a str, separator: &str) -> Result<Vec<&'a str>> {
    if path.is_empty() {
        return Err(Error::invalid_path(path, "path is empty"));
    }
    let segments: Vec<&str> = path.split(separator).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(Error::invalid_path(path, "path contains an empty segment"));
    }
    Ok(segments)
}

/// Interpret a segment as a sequence index.
fn as_index(segment: &str) -> Option<usize> {
    segment.parse::<usize>().ok()
}

/// Create the container for a missing intermediate slot.
///
/// The following segment decides the shape: an integer segment needs a
/// sequence to index into, anything else needs a mapping.
fn new_container(next_is_index: bool) -> Value {
    if next_is_index {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

/// Get a reference to the value at the given path.
///
/// Returns `None` whenever any segment fails to resolve: a missing mapping
/// key, a non-integer segment against a sequence, an out-of-range index, or
/// a scalar in the middle of the path.
///
/// # Examples
///
/// ```
/// use lockstep_doc::path::get_path;
/// use serde_json::json;
///
/// let value = json!({"config": {"host": "localhost"}});
/// assert_eq!(get_path(&value, "config/host", "/"), Some(&json!("localhost")));
/// assert_eq!(get_path(&value, "config/missing", "/"), None);
/// ```
pub fn get_path<'a>(root: &'a Value, path: &str, separator: &str) -> Option<&'a Value> {
    let segments = split_path(path, separator).ok()?;
    let mut current = root;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(arr) => arr.get(as_index(segment)?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Check whether a path resolves.
///
/// True for exact leaf paths and for valid prefixes addressing intermediate
/// containers.
pub fn contains_path(root: &Value, path: &str, separator: &str) -> bool {
    get_path(root, path, separator).is_some()
}

/// Descend one segment, creating or repairing the slot as needed.
///
/// A missing slot (or one occupied by a scalar) under a mapping or sequence
/// is replaced with a fresh container shaped for the next segment. Sequences
/// only accept integer segments and may grow by exactly one element.
fn descend_or_create<'a>(
    current: &'a mut Value,
    segment: &str,
    next_is_index: bool,
    path: &str,
) -> Result<&'a mut Value> {
    match current {
        Value::Object(map) => {
            let slot = map
                .entry(segment.to_string())
                .or_insert_with(|| new_container(next_is_index));
            if !slot.is_object() && !slot.is_array() {
                *slot = new_container(next_is_index);
            }
            Ok(slot)
        }
        Value::Array(arr) => {
            let idx = as_index(segment).ok_or_else(|| {
                Error::invalid_path(path, format!("segment '{segment}' is not a sequence index"))
            })?;
            if idx > arr.len() {
                return Err(Error::invalid_path(
                    path,
                    format!("sequence index {idx} is out of range (len {})", arr.len()),
                ));
            }
            if idx == arr.len() {
                arr.push(new_container(next_is_index));
            }
            let slot = &mut arr[idx];
            if !slot.is_object() && !slot.is_array() {
                *slot = new_container(next_is_index);
            }
            Ok(slot)
        }
        _ => Err(Error::invalid_path(path, "cannot traverse a scalar")),
    }
}

/// Set the value at the given path, creating missing intermediates.
///
/// The container created for a missing intermediate slot is a sequence when
/// the *next* segment is a non-negative integer, otherwise a mapping. A
/// sequence index equal to the current length appends; a greater index fails
/// with `InvalidPath`, as does a non-integer segment against a sequence.
///
/// # Examples
///
/// ```
/// use lockstep_doc::path::{get_path, set_path};
/// use serde_json::json;
///
/// let mut value = json!({});
/// set_path(&mut value, "servers/0/host", "/", json!("localhost")).unwrap();
/// assert_eq!(value, json!({"servers": [{"host": "localhost"}]}));
/// ```
pub fn set_path(root: &mut Value, path: &str, separator: &str, value: Value) -> Result<()> {
    let segments = split_path(path, separator)?;
    let mut current = root;
    for i in 0..segments.len() - 1 {
        let next_is_index = as_index(segments[i + 1]).is_some();
        current = descend_or_create(current, segments[i], next_is_index, path)?;
    }

    let last = segments[segments.len() - 1];
    match current {
        Value::Object(map) => {
            map.insert(last.to_string(), value);
            Ok(())
        }
        Value::Array(arr) => {
            let idx = as_index(last).ok_or_else(|| {
                Error::invalid_path(path, format!("segment '{last}' is not a sequence index"))
            })?;
            if idx < arr.len() {
                arr[idx] = value;
            } else if idx == arr.len() {
                arr.push(value);
            } else {
                return Err(Error::invalid_path(
                    path,
                    format!("sequence index {idx} is out of range (len {})", arr.len()),
                ));
            }
            Ok(())
        }
        _ => Err(Error::invalid_path(path, "cannot set a value inside a scalar")),
    }
}

/// Remove and return the value at the given path.
///
/// Returns `None` when the path does not resolve. Removing a sequence
/// element shifts later elements left; removing a mapping key preserves the
/// order of the remaining keys.
///
/// # Examples
///
/// ```
/// use lockstep_doc::path::remove_path;
/// use serde_json::json;
///
/// let mut value = json!({"name": "test", "version": "1.0"});
/// assert_eq!(remove_path(&mut value, "version", "/"), Some(json!("1.0")));
/// assert_eq!(value, json!({"name": "test"}));
/// ```
pub fn remove_path(root: &mut Value, path: &str, separator: &str) -> Option<Value> {
    let segments = split_path(path, separator).ok()?;
    let mut current = root;
    for segment in &segments[..segments.len() - 1] {
        current = match current {
            Value::Object(map) => map.get_mut(*segment)?,
            Value::Array(arr) => arr.get_mut(as_index(segment)?)?,
            _ => return None,
        };
    }

    let last = segments[segments.len() - 1];
    match current {
        Value::Object(map) => map.shift_remove(last),
        Value::Array(arr) => {
            let idx = as_index(last)?;
            if idx < arr.len() {
                Some(arr.remove(idx))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Remove containers left empty by a removal at `path`.
///
/// Walks the ancestor chain from the removal point toward the root, deleting
/// each container that is now empty and stopping at the first non-empty one.
/// The root container itself is never removed.
pub fn prune_empty_upward(root: &mut Value, path: &str, separator: &str) {
    let Ok(segments) = split_path(path, separator) else {
        return;
    };
    for depth in (1..segments.len()).rev() {
        let prefix = segments[..depth].join(separator);
        let now_empty = match get_path(root, &prefix, separator) {
            Some(Value::Object(map)) => map.is_empty(),
            Some(Value::Array(arr)) => arr.is_empty(),
            _ => false,
        };
        if !now_empty {
            break;
        }
        remove_path(root, &prefix, separator);
    }
}

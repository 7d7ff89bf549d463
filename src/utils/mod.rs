//! Utilities for input path expansion and object graph copying.

use crate::{Result, error::PageMergeError};
use lopdf::{Document, Object};
use std::path::PathBuf;

/// Characters that make an input argument a glob pattern.
const GLOB_CHARS: [char; 3] = ['*', '?', '['];

/// Expand command-line inputs into file paths, preserving argument order.
///
/// Arguments containing glob characters are expanded (matches sorted by the
/// `glob` crate); a pattern that matches nothing is reported as a missing
/// file. Plain paths are passed through untouched so that existence checks
/// happen in one place, when the file is loaded.
pub fn expand_inputs<T>(inputs: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        if input.contains(GLOB_CHARS) {
            let matches = collect_paths_for_pattern(input)?;
            if matches.is_empty() {
                return Err(PageMergeError::file_not_found(PathBuf::from(input)));
            }
            resolved_paths.extend(matches);
        } else {
            resolved_paths.push(PathBuf::from(input));
        }
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./scans/*.pdf"`
fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern).map_err(|err| PageMergeError::Other {
        message: format!("Invalid pattern {pattern:?}: {err}"),
    })?;

    for entry in paths {
        let path = entry.map_err(|err| PageMergeError::Other {
            message: err.to_string(),
        })?;
        if path.is_file() {
            resolved_paths.push(path);
        }
    }

    Ok(resolved_paths)
}

/// Copy every object reachable from `obj` out of `source` into `target`.
///
/// `Parent` links are not followed: a copied page must not drag its source
/// page tree (and with it every sibling page) into the output.
pub fn copy_references(target: &mut Document, source: &Document, obj: &Object) {
    match obj {
        Object::Reference(ref_id) => {
            if !target.objects.contains_key(ref_id)
                && let Ok(referenced_obj) = source.get_object(*ref_id)
            {
                target.objects.insert(*ref_id, referenced_obj.clone());
                copy_references(target, source, referenced_obj);
            }
        }
        Object::Dictionary(dict) => {
            for (key, value) in dict.iter() {
                if key.as_slice() != b"Parent" {
                    copy_references(target, source, value);
                }
            }
        }
        Object::Array(arr) => {
            for item in arr {
                copy_references(target, source, item);
            }
        }
        Object::Stream(stream) => {
            for (key, value) in stream.dict.iter() {
                if key.as_slice() != b"Parent" {
                    copy_references(target, source, value);
                }
            }
        }
        _ => {}
    }
}

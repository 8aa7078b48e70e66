// src/paths.rs

//! Path normalisation helpers.
//!
//! Runner patterns and event paths are compared as forward-slash strings.
//! Relative inputs are resolved lexically against the session root (no
//! filesystem access), so a path that does not exist any more (an `unlink`
//! event) normalises the same way as one that does.

use std::path::Path;

/// Replace every `\` with `/`.
pub fn to_forward_slashes(s: &str) -> String {
    s.replace('\\', "/")
}

/// Forward-slash string form of `root`, without a trailing slash
/// (except for a bare `/`).
pub fn root_str(root: &Path) -> String {
    let s = to_forward_slashes(&root.to_string_lossy());
    let trimmed = s.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Whether a forward-slash path is absolute (`/x` or `C:/x`).
pub fn is_absolute_str(s: &str) -> bool {
    if s.starts_with('/') {
        return true;
    }
    let bytes = s.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

/// Split a relative path into the number of leading `..` segments and the
/// remainder, dropping `.` segments along the way.
pub fn split_parent_segments(rel: &str) -> (usize, String) {
    let mut ups = 0;
    let mut rest: Vec<&str> = Vec::new();

    for segment in rel.split('/') {
        match segment {
            "" | "." => {}
            ".." if rest.is_empty() => ups += 1,
            ".." => {
                rest.pop();
            }
            other => rest.push(other),
        }
    }

    (ups, rest.join("/"))
}

/// Drop `ups` trailing components from a forward-slash root.
pub fn pop_components(root: &str, ups: usize) -> String {
    let mut base = root.to_string();
    for _ in 0..ups {
        match base.rfind('/') {
            Some(0) => {
                base.truncate(1);
                break;
            }
            Some(idx) => base.truncate(idx),
            None => break,
        }
    }
    base
}

/// Join `rel` onto `base`, both forward-slash strings.
pub fn join_str(base: &str, rel: &str) -> String {
    if rel.is_empty() {
        base.to_string()
    } else if base.ends_with('/') {
        format!("{base}{rel}")
    } else {
        format!("{base}/{rel}")
    }
}

/// Normalise a file path reported by the watcher or a caller:
/// forward slashes, resolved against `root` when relative.
pub fn normalize_file_path(root: &Path, file: &str) -> String {
    let file = to_forward_slashes(file);
    if is_absolute_str(&file) {
        return file;
    }

    let (ups, rest) = split_parent_segments(&file);
    join_str(&pop_components(&root_str(root), ups), &rest)
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path is not under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_forward_slashes(&rel.to_string_lossy()));
    }

    // Different absolute prefixes for the same directory (symlinks,
    // /private/var on macOS) only line up after canonicalisation.
    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(to_forward_slashes(&rel.to_string_lossy()));
        }
    }

    None
}

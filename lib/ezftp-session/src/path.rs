/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

//! Remote directory string helpers.
//!
//! Remote paths are compared as plain strings, the server being the only
//! authority on what they really point to.

use log::debug;

/// Strip one leading and then one trailing slash, never reducing `/` to nothing.
pub fn normalize(path: &str) -> &str {
    let path = match path.strip_prefix('/') {
        Some(p) if path.len() > 1 => p,
        _ => path,
    };
    match path.strip_suffix('/') {
        Some(p) if path.len() > 1 => p,
        _ => path,
    }
}

/// Case insensitive comparison of two normalized directory paths.
pub fn same_directory(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        debug!("unable to compare empty directory path ({a:?} vs {b:?})");
        return false;
    }
    normalize(a).eq_ignore_ascii_case(normalize(b))
}

/// The last component of a remote directory path.
///
/// One trailing slash is ignored. When no name follows the last slash the
/// whole trimmed path is returned. `None` for an empty result.
pub fn child_dir_name(path: &str) -> Option<&str> {
    let trimmed = match path.strip_suffix('/') {
        Some(p) if !p.is_empty() => p,
        _ => path,
    };
    let name = match trimmed.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name,
        _ => trimmed,
    };
    if name.is_empty() { None } else { Some(name) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_slashes() {
        assert_eq!(normalize("/data/"), "data");
        assert_eq!(normalize("/data"), "data");
        assert_eq!(normalize("data/"), "data");
        assert_eq!(normalize("/a/b/"), "a/b");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("//"), "/");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn compare() {
        assert!(same_directory("/data/", "data"));
        assert!(same_directory("/DATA", "data/"));
        assert!(same_directory("/", "/"));
        assert!(!same_directory("/data", "/other"));
        assert!(!same_directory("", "/data"));
        assert!(!same_directory("/data", ""));
    }

    #[test]
    fn child_name() {
        assert_eq!(child_dir_name("/a/b/c/"), Some("c"));
        assert_eq!(child_dir_name("/a/b/c"), Some("c"));
        assert_eq!(child_dir_name("/top"), Some("top"));
        assert_eq!(child_dir_name("top/"), Some("top"));
        assert_eq!(child_dir_name("top"), Some("top"));
        assert_eq!(child_dir_name("/"), Some("/"));
        assert_eq!(child_dir_name(""), None);
    }
}

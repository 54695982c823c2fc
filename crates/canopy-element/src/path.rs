// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Hierarchical path splitting with separator escaping.
//!
//! Element paths are separator-delimited (`a.b.c`). A literal separator
//! inside a name is written escaped (`a\.b`); splitting removes exactly
//! one layer of escaping per traversal.
//!
//! Both split functions consume their path argument in place: the element
//! tree descends by repeatedly taking the first name and creates missing
//! vertices bottom-up by repeatedly taking the last name.

// =============================================================================
// Constants
// =============================================================================

/// Hierarchy separator character.
pub const SEPARATOR: char = '.';

/// Escape character for literal separators inside a name.
pub const ESCAPE: char = '\\';

/// Display marker for the unnamed root element.
pub const ROOT_NAME: &str = "<ROOT>";

// =============================================================================
// Splitting
// =============================================================================

/// Splits off the first name of a path (before the first unescaped
/// separator).
///
/// The returned name and its trailing separator are erased from `path`.
/// Escape characters guarding a separator that was considered during the
/// scan are consumed. If the path holds no unescaped separator, the whole
/// path is taken as the name and `path` is left empty.
///
/// # Examples
///
/// ```
/// use canopy_element::path::split_first_name;
///
/// let mut path = String::from("a.b.c");
/// assert_eq!(split_first_name(&mut path), "a");
/// assert_eq!(path, "b.c");
///
/// let mut path = String::from("lev1\\.lev2.lev3");
/// assert_eq!(split_first_name(&mut path), "lev1.lev2");
/// assert_eq!(path, "lev3");
/// ```
pub fn split_first_name(path: &mut String) -> String {
    let mut sep = path.find(SEPARATOR);
    while let Some(i) = sep {
        if i > 0 && path.as_bytes()[i - 1] == ESCAPE as u8 {
            // Unescape: drop the escape character; the separator moves to
            // i - 1 and the scan continues after it.
            path.remove(i - 1);
            sep = path[i..].find(SEPARATOR).map(|off| off + i);
        } else {
            break;
        }
    }

    match sep {
        None => std::mem::take(path),
        Some(i) => {
            let name = path[..i].to_string();
            path.replace_range(..=i, "");
            name
        }
    }
}

/// Splits off the last name of a path (after the last unescaped
/// separator).
///
/// The returned name and its leading separator are erased from `path`.
/// Escape characters guarding a separator that was considered during the
/// scan are consumed. An empty result (empty path) yields the
/// [`ROOT_NAME`] marker.
///
/// # Examples
///
/// ```
/// use canopy_element::path::split_last_name;
///
/// let mut path = String::from("a.b.c");
/// assert_eq!(split_last_name(&mut path), "c");
/// assert_eq!(path, "a.b");
///
/// let mut path = String::new();
/// assert_eq!(split_last_name(&mut path), "<ROOT>");
/// ```
pub fn split_last_name(path: &mut String) -> String {
    let mut sep = path.rfind(SEPARATOR);
    while let Some(i) = sep {
        if i > 0 && path.as_bytes()[i - 1] == ESCAPE as u8 {
            // Unescape: drop the escape character; the separator moves to
            // i - 1 and the scan continues before it.
            path.remove(i - 1);
            sep = if i >= 2 {
                path[..i - 1].rfind(SEPARATOR)
            } else {
                None
            };
        } else {
            break;
        }
    }

    let name = match sep {
        None => std::mem::take(path),
        Some(i) => {
            let name = path[i + 1..].to_string();
            path.truncate(i);
            name
        }
    };

    if name.is_empty() {
        ROOT_NAME.to_string()
    } else {
        name
    }
}

/// Escapes a literal name for embedding into a path.
///
/// Every separator character in the name is prefixed with the escape
/// character, the inverse of one splitting traversal.
pub fn escape_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if c == SEPARATOR {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

// =============================================================================
// Tests
// =============================================================================

//! Slash-separated object path helpers
//!
//! Object keys are built by joining the backend prefix onto a caller path,
//! and listing results have that prefix removed again before they are
//! handed back.

/// Normalize a configured prefix by trimming leading and trailing `/`
pub fn clean_prefix(prefix: &str) -> String {
    prefix.trim_matches('/').to_string()
}

/// Join path elements with `/` and clean the result
///
/// Empty elements are ignored. Joining only empty elements yields an empty
/// string.
pub fn join(elements: &[&str]) -> String {
    let joined = elements
        .iter()
        .filter(|e| !e.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");

    if joined.is_empty() {
        return joined;
    }
    clean(&joined)
}

/// Lexically clean a slash path
///
/// Collapses repeated separators, drops `.` elements, resolves `..` against
/// the preceding element and removes any trailing `/`. An empty result is
/// returned as `.`.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            s => parts.push(s),
        }
    }

    let body = parts.join("/");
    if rooted {
        format!("/{body}")
    } else if body.is_empty() {
        ".".to_string()
    } else {
        body
    }
}

/// Remove the first occurrence of `"<prefix>/"` from a provider key
pub fn strip_prefix(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        return key.to_string();
    }
    key.replacen(&format!("{prefix}/"), "", 1)
}

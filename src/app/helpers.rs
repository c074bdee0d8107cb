use crate::model::ROOT_DIR;

/// Joins `name` onto `base` and cleans the result.
pub(crate) fn join_remote(base: &str, name: &str) -> String {
    if name.starts_with('/') {
        return clean_remote_path(name);
    }
    clean_remote_path(&format!("{}/{}", base.trim_end_matches('/'), name))
}

/// Lexical cleanup of a remote path: collapses `//`, `.` and `..` without going above `/`.
/// Relative paths stay relative.
pub(crate) fn clean_remote_path(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

pub(crate) fn parent_remote_dir(path: &str) -> String {
    path.trim_end_matches('/')
        .rsplit_once('/')
        .map(|(base, _)| {
            if base.is_empty() {
                ROOT_DIR.to_string()
            } else {
                base.to_string()
            }
        })
        .unwrap_or_else(|| ROOT_DIR.to_string())
}

/// Last path segment, as shown in status messages.
pub(crate) fn display_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => name,
        _ => ROOT_DIR,
    }
}

//! Workspace-relative path arithmetic.
//!
//! Paths handled here are always `/`-separated and relative to the
//! workspace root, whatever the host platform. A leading `/` is accepted and
//! means "workspace root".

/// Source extensions stripped from module specifiers.
const SCRIPT_EXTENSIONS: &[&str] = &[".d.ts", ".tsx", ".ts", ".jsx", ".mjs", ".js"];

/// Collapse `.`/`..`/empty segments and drop any leading `/`.
///
/// `..` above the root is discarded rather than kept.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Whether `path` climbs above the workspace root at any point.
pub fn escapes_root(path: &str) -> bool {
    let mut depth = 0usize;
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => match depth.checked_sub(1) {
                Some(parent) => depth = parent,
                None => return true,
            },
            _ => depth += 1,
        }
    }
    false
}

/// Join two workspace paths and normalize the result.
pub fn join(base: &str, tail: &str) -> String {
    normalize(&format!("{base}/{tail}"))
}

/// Directory part of a path (`""` for a top-level file).
pub fn dirname(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind('/') {
        Some(idx) => normalized[..idx].to_string(),
        None => String::new(),
    }
}

/// Final segment of a path.
pub fn basename(path: &str) -> String {
    let normalized = normalize(path);
    match normalized.rfind('/') {
        Some(idx) => normalized[idx + 1..].to_string(),
        None => normalized,
    }
}

/// Drop a trailing script extension (`.ts`, `.tsx`, `.js`, ...), keeping
/// inner dots such as `.module`.
pub fn strip_script_extension(path: &str) -> &str {
    SCRIPT_EXTENSIONS
        .iter()
        .find_map(|ext| path.strip_suffix(ext))
        .unwrap_or(path)
}

/// Module specifier for importing `target` from the file `from_file`.
///
/// The result is relative to the directory of `from_file`, has no script
/// extension, and starts with `./` for siblings and descendants:
/// `relative_specifier("a/b/x.module.ts", "a/b/y/y.module.ts") == "./y/y.module"`.
pub fn relative_specifier(from_file: &str, target: &str) -> String {
    let from_dir = dirname(from_file);
    let target = normalize(strip_script_extension(&normalize(target)));

    let from_parts: Vec<&str> = from_dir.split('/').filter(|s| !s.is_empty()).collect();
    let mut to_parts: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();
    let file_name = to_parts.pop().unwrap_or_default();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative: Vec<&str> = std::iter::repeat("..")
        .take(from_parts.len() - common)
        .collect();
    relative.extend(&to_parts[common..]);

    let prefix = if relative.first() == Some(&"..") {
        ""
    } else {
        "./"
    };

    relative.push(file_name);
    format!("{prefix}{}", relative.join("/"))
}

/// Resolve a relative module specifier found in `from_file` to a workspace
/// path without extension. Bare (package) specifiers resolve to `None`.
pub fn resolve_specifier(from_file: &str, specifier: &str) -> Option<String> {
    if !(specifier.starts_with("./") || specifier.starts_with("../") || specifier == "." || specifier == "..") {
        return None;
    }
    let joined = join(&dirname(from_file), specifier);
    Some(strip_script_extension(&joined).to_string())
}

//! Names, selectors and derived file paths for generated units.

use crate::paths;
use heck::{ToKebabCase, ToUpperCamelCase};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Suffix added to a module's base name to find its routing module.
pub const ROUTING_SUFFIX: &str = "-routing";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name cannot be empty.")]
    EmptyName,

    #[error("Names cannot start with a digit: {name}")]
    LeadingDigit { name: String },

    #[error("Selector ({selector}) is invalid.")]
    InvalidSelector { selector: String },
}

/// `fooBar`, `foo_bar` and `FooBar` all become `foo-bar`.
pub fn dasherize(name: &str) -> String {
    name.to_kebab_case()
}

/// `foo-bar` becomes `FooBar`.
pub fn classify(name: &str) -> String {
    name.to_upper_camel_case()
}

/// Build the component selector for `name`.
///
/// An explicit prefix wins; `Some("")` means "no prefix at all" and also
/// suppresses the project prefix. Otherwise the project prefix is used when
/// the project defines a non-empty one.
pub fn build_selector(name: &str, explicit_prefix: Option<&str>, project_prefix: Option<&str>) -> String {
    let selector = dasherize(name);
    match (explicit_prefix, project_prefix) {
        (Some(""), _) => selector,
        (Some(prefix), _) => format!("{prefix}-{selector}"),
        (None, Some(prefix)) if !prefix.is_empty() => format!("{prefix}-{selector}"),
        _ => selector,
    }
}

/// Whether `module_path` has enough `.`-separated segments for
/// [`routing_sibling_path`].
pub fn has_routing_sibling(module_path: &str) -> bool {
    module_path.split('.').count() >= 3
}

/// Path of the routing module next to `module_path`.
///
/// `-routing` is appended to the third-from-last `.`-separated segment:
/// `a/b/x.module.ts` becomes `a/b/x-routing.module.ts`.
///
/// # Panics
///
/// Panics if `module_path` has fewer than three segments. Callers check
/// [`has_routing_sibling`] first.
pub fn routing_sibling_path(module_path: &str) -> String {
    let mut parts: Vec<String> = module_path.split('.').map(str::to_string).collect();
    assert!(
        parts.len() >= 3,
        "routing sibling needs a `<name>.<kind>.<ext>` path, got {module_path:?}"
    );
    let idx = parts.len() - 3;
    parts[idx].push_str(ROUTING_SUFFIX);
    parts.join(".")
}

/// A name split into its final segment and the directory it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub path: String,
}

/// Move any directory part of `name` into `path`: `("src/app", "admin/users")`
/// gives name `users` in `src/app/admin`.
pub fn parse_name(path: &str, name: &str) -> Location {
    let full = paths::join(path, name);
    Location {
        name: paths::basename(name),
        path: paths::dirname(&full),
    }
}

pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(ValidationError::LeadingDigit {
            name: name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_html_selector(selector: &str) -> Result<(), ValidationError> {
    static SELECTOR: OnceLock<Regex> = OnceLock::new();
    let re = SELECTOR.get_or_init(|| {
        Regex::new(r"^[a-zA-Z][.0-9a-zA-Z]*(:?-[a-zA-Z][.0-9a-zA-Z]*)*$")
            .expect("selector pattern is a valid regex")
    });

    if re.is_match(selector) {
        Ok(())
    } else {
        Err(ValidationError::InvalidSelector {
            selector: selector.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dasherize_and_classify() {
        assert_eq!(dasherize("userProfile"), "user-profile");
        assert_eq!(dasherize("foo"), "foo");
        assert_eq!(classify("user-profileModule"), "UserProfileModule");
        assert_eq!(classify("fooModule"), "FooModule");
    }

    #[test]
    fn selector_uses_project_prefix() {
        assert_eq!(build_selector("foo", None, Some("app")), "app-foo");
    }

    #[test]
    fn selector_explicit_prefix_wins() {
        assert_eq!(build_selector("fooBar", Some("my"), Some("app")), "my-foo-bar");
    }

    #[test]
    fn selector_without_any_prefix() {
        assert_eq!(build_selector("foo", None, None), "foo");
        assert_eq!(build_selector("foo", None, Some("")), "foo");
        assert_eq!(build_selector("foo", Some(""), Some("app")), "foo");
    }

    #[test]
    fn routing_sibling_inserts_suffix() {
        assert_eq!(
            routing_sibling_path("src/app/app.module.ts"),
            "src/app/app-routing.module.ts"
        );
        assert_eq!(routing_sibling_path("a/b/x.module.ts"), "a/b/x-routing.module.ts");
    }

    #[test]
    #[should_panic(expected = "routing sibling needs")]
    fn routing_sibling_requires_three_segments() {
        let _ = routing_sibling_path("src/app/main.ts");
    }

    #[test]
    fn has_routing_sibling_checks_segments() {
        assert!(has_routing_sibling("x.module.ts"));
        assert!(!has_routing_sibling("main.ts"));
    }

    #[test]
    fn parse_name_moves_directories_into_path() {
        let location = parse_name("src/app", "admin/users");
        assert_eq!(location.name, "users");
        assert_eq!(location.path, "src/app/admin");

        let flat = parse_name("/src/app", "foo");
        assert_eq!(flat.name, "foo");
        assert_eq!(flat.path, "src/app");
    }

    #[test]
    fn name_validation() {
        assert!(validate_name("foo").is_ok());
        assert_eq!(validate_name(""), Err(ValidationError::EmptyName));
        assert!(matches!(
            validate_name("1foo"),
            Err(ValidationError::LeadingDigit { .. })
        ));
    }

    #[test]
    fn selector_validation() {
        assert!(validate_html_selector("app-foo").is_ok());
        assert!(validate_html_selector("app-foo-bar2").is_ok());
        assert!(validate_html_selector("app-1foo").is_err());
        assert!(validate_html_selector("-foo").is_err());
    }
}

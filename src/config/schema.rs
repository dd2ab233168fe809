use crate::ts::{RegistrationMethods, DEFAULT_REGISTRATION_METHODS};
use serde::Deserialize;
use std::fmt;

/// Contents of `route-patcher.toml`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct PatcherConfig {
    #[serde(default)]
    pub registration: Registration,
    #[serde(default)]
    pub defaults: Defaults,
}

impl PatcherConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.registration.methods.is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "registration.methods",
            });
        }

        for method in &self.registration.methods {
            if !is_identifier(method) {
                issues.push(ValidationIssue::InvalidValue {
                    field: "registration.methods",
                    message: format!("'{method}' is not a method name"),
                });
            }
        }

        let style = self.defaults.style.trim();
        if style.is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "defaults.style",
            });
        } else if style.starts_with('.') || style.contains('/') {
            issues.push(ValidationIssue::InvalidValue {
                field: "defaults.style",
                message: format!("'{style}' should be a bare extension such as 'css'"),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    pub fn registration_methods(&self) -> RegistrationMethods {
        RegistrationMethods::new(self.registration.methods.iter().cloned())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Registration {
    /// Methods whose first argument is the route array
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
}

impl Default for Registration {
    fn default() -> Self {
        Self {
            methods: default_methods(),
        }
    }
}

fn default_methods() -> Vec<String> {
    DEFAULT_REGISTRATION_METHODS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

/// Defaults for flags the command line leaves unset.
#[derive(Debug, Deserialize, Clone)]
pub struct Defaults {
    #[serde(default = "default_style")]
    pub style: String,
    #[serde(default = "default_true")]
    pub spec: bool,
    #[serde(default)]
    pub flat: bool,
    #[serde(default)]
    pub inline_style: bool,
    #[serde(default)]
    pub inline_template: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            style: default_style(),
            spec: true,
            flat: false,
            inline_style: false,
            inline_template: false,
        }
    }
}

fn default_style() -> String {
    "css".to_string()
}

fn default_true() -> bool {
    true
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    MissingField { field: &'static str },
    InvalidValue { field: &'static str, message: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "missing required field '{field}'")
            }
            ValidationIssue::InvalidValue { field, message } => {
                write!(f, "invalid value for '{field}': {message}")
            }
        }
    }
}

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeSitterError {
    #[error("failed to set language for parser")]
    LanguageSet,

    #[error("failed to parse {path}")]
    ParseFailed { path: PathBuf },

    #[error("invalid tree-sitter query: {message}")]
    InvalidQuery { message: String },

    #[error("syntax error in {path} at line {line}, column {column}{}", more_errors(.count))]
    SyntaxError {
        path: PathBuf,
        line: usize,
        column: usize,
        byte_start: usize,
        byte_end: usize,
        /// Total ERROR/MISSING nodes found
        count: usize,
    },

    #[error("no registration anchor in {path}: {miss} (searched for {}){}", .methods.join(", "), did_you_mean(.suggestion))]
    AnchorNotFound {
        path: PathBuf,
        methods: Vec<String>,
        miss: AnchorMiss,
        suggestion: Option<String>,
    },
}

/// Which step of anchor resolution came up empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorMiss {
    /// No call to any registration method
    NoRegistrationCall,
    /// The registration call has no arguments
    MissingArgument,
    /// First argument is an identifier with no variable declaration
    UnresolvedBinding { name: String },
    /// First argument (or its binding) is not an array literal
    NotAnArray { kind: String },
}

impl fmt::Display for AnchorMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorMiss::NoRegistrationCall => write!(f, "no registration call found"),
            AnchorMiss::MissingArgument => write!(f, "registration call has no arguments"),
            AnchorMiss::UnresolvedBinding { name } => {
                write!(f, "no variable declaration binds '{name}'")
            }
            AnchorMiss::NotAnArray { kind } => {
                write!(f, "expected an array literal, found {kind}")
            }
        }
    }
}

fn more_errors(count: &usize) -> String {
    if *count > 1 {
        format!(" ({} more)", count - 1)
    } else {
        String::new()
    }
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|s| format!("; did you mean '{s}'?"))
        .unwrap_or_default()
}

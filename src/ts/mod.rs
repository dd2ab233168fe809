//! Tree-sitter integration for TypeScript anchor files.
//!
//! This module parses routing modules into a concrete syntax tree and turns
//! it into byte offsets: where the imports end, and where the declaration
//! array handed to a registration call closes. Comments and formatting are
//! never touched.

pub mod errors;
pub mod locator;
pub mod parser;
pub mod query;
pub mod validator;

pub use errors::{AnchorMiss, TreeSitterError};
pub use locator::{Anchor, AnchorLocator, RegistrationMethods, DEFAULT_REGISTRATION_METHODS};
pub use parser::{Descendants, Dialect, SourceDocument, TypeScriptParser};
pub use query::{QueryEngine, QueryMatch};
pub use validator::validate_patch;

use crate::ts::errors::TreeSitterError;
use crate::ts::parser::SourceDocument;
use std::path::Path;

/// Validate that a patch didn't introduce syntax errors.
///
/// Offsets shift once text is inserted, so errors are compared by count: the
/// patched text may not contain more ERROR/MISSING nodes than the original.
pub fn validate_patch(path: &Path, original: &str, patched: &str) -> Result<(), TreeSitterError> {
    let before = SourceDocument::parse_lenient(path, original)?.error_nodes().len();
    let after = SourceDocument::parse_lenient(path, patched)?;

    if after.error_nodes().len() > before {
        after.ensure_valid()?;
    }

    Ok(())
}

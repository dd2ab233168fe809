//! Thread-local parser pooling.
//!
//! A generation run parses the anchor file at least twice (before planning
//! and again to validate the patched text). Keeping one parser per thread
//! avoids re-creating it and re-loading the grammar every time.

use crate::ts::{TreeSitterError, TypeScriptParser};
use std::cell::RefCell;

thread_local! {
    static TS_PARSER: RefCell<Option<TypeScriptParser>> = const { RefCell::new(None) };
}

/// Execute function with pooled parser instance.
///
/// On first call per thread, creates new parser. Subsequent calls reuse
/// the same parser instance; the caller picks the dialect per parse.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use route_patcher::pool::with_parser;
/// use route_patcher::ts::Dialect;
/// use std::path::Path;
///
/// let tree = with_parser(|parser| {
///     parser.parse(Path::new("a.ts"), "const routes = [];", Dialect::TypeScript)
/// })??;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(f: F) -> Result<R, TreeSitterError>
where
    F: FnOnce(&mut TypeScriptParser) -> R,
{
    TS_PARSER.with(|cell| {
        let mut slot = cell.borrow_mut();
        let parser = match slot.take() {
            Some(parser) => parser,
            None => TypeScriptParser::new()?,
        };
        Ok(f(slot.insert(parser)))
    })
}

//! Turns a located anchor into the insertions that register a new unit.

use crate::edit::Insertion;
use crate::paths;
use crate::ts::query::{queries, unquote};
use crate::ts::{Anchor, QueryEngine, SourceDocument, TreeSitterError};
use serde::Serialize;

/// A symbol the anchor file must import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportBinding {
    /// Exported name, e.g. `FooModule`
    pub symbol: String,
    /// Workspace path of the module that exports it, with or without extension
    pub module_path: String,
    /// Workspace path of the anchor file the import goes into
    pub source_file: String,
}

impl ImportBinding {
    /// Specifier to use in the anchor file, e.g. `./foo/foo.module`.
    pub fn specifier(&self) -> String {
        paths::relative_specifier(&self.source_file, &self.module_path)
    }

    fn target(&self) -> String {
        paths::normalize(paths::strip_script_extension(&paths::normalize(&self.module_path)))
    }
}

/// A lazily loaded route descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    /// URL path segment
    pub path: String,
    /// `<specifier>#<ClassName>`
    pub load_children: String,
}

impl RouteEntry {
    pub fn new(path: impl Into<String>, specifier: &str, class_name: &str) -> Self {
        Self {
            path: path.into(),
            load_children: format!("{specifier}#{class_name}"),
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{{ path: '{}', loadChildren: '{}' }}",
            self.path, self.load_children
        )
    }
}

/// Plan every insertion needed to register `entry` and import `binding`.
///
/// Offsets refer to `document`'s text; the import edit (if any) and the array
/// edit never overlap, so their order in the result does not matter.
pub fn plan(
    document: &SourceDocument,
    anchor: &Anchor<'_>,
    binding: &ImportBinding,
    entry: &RouteEntry,
) -> Result<Vec<Insertion>, TreeSitterError> {
    let mut edits = Vec::with_capacity(2);
    if let Some(import) = plan_import(document, binding)? {
        edits.push(import);
    }
    edits.push(plan_array_entry(anchor, &entry.render()));

    tracing::debug!(
        file = %document.path().display(),
        edits = edits.len(),
        "planned insertions"
    );
    Ok(edits)
}

/// Plan an `import { Symbol } from '...'` line, or nothing if the anchor
/// file already imports `binding.symbol` from the same module.
pub fn plan_import(
    document: &SourceDocument,
    binding: &ImportBinding,
) -> Result<Option<Insertion>, TreeSitterError> {
    let target = binding.target();

    let names = QueryEngine::for_document(document, queries::IMPORTED_NAMES)?;
    let already_imported = names.find_all(document).iter().any(|m| {
        let name = m.captures.get("name").map(|c| c.text.as_str());
        let source = m.captures.get("source").map(|c| unquote(&c.text));
        name == Some(binding.symbol.as_str())
            && source
                .and_then(|specifier| paths::resolve_specifier(&binding.source_file, specifier))
                .is_some_and(|resolved| resolved == target)
    });

    if already_imported {
        tracing::debug!(symbol = %binding.symbol, "import already present");
        return Ok(None);
    }

    let statement = format!(
        "import {{ {} }} from '{}';",
        binding.symbol,
        binding.specifier()
    );

    let imports = QueryEngine::for_document(document, queries::TOP_LEVEL_IMPORTS)?;
    let insertion = match imports.find_all(document).iter().map(|m| m.byte_end).max() {
        Some(end) => Insertion::new(end, format!("\n{statement}")),
        None => Insertion::new(0, format!("{statement}\n")),
    };

    Ok(Some(insertion))
}

/// Plan the insertion of `entry_text` just before the array's closing bracket.
///
/// A `, ` separator is prepended only when the array already has elements;
/// after a trailing comma a single space is enough.
pub fn plan_array_entry(anchor: &Anchor<'_>, entry_text: &str) -> Insertion {
    let separator = match anchor.element_count() {
        0 => "",
        _ if anchor.has_trailing_comma() => " ",
        _ => ", ",
    };
    Insertion::new(anchor.closing_offset(), format!("{separator}{entry_text}"))
}

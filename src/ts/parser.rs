use crate::pool;
use crate::ts::errors::TreeSitterError;
use ast_grep_language::{LanguageExt, SupportLang};
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree, TreeCursor};

/// TypeScript grammar flavour, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    TypeScript,
    Tsx,
}

impl Dialect {
    /// `.tsx`/`.jsx` files use the TSX grammar, everything else TypeScript.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("tsx") | Some("jsx") => Dialect::Tsx,
            _ => Dialect::TypeScript,
        }
    }

    pub(crate) fn language(self) -> tree_sitter::Language {
        match self {
            Dialect::TypeScript => SupportLang::TypeScript.get_ts_language(),
            Dialect::Tsx => SupportLang::Tsx.get_ts_language(),
        }
    }
}

/// Tree-sitter parser wrapper for TypeScript sources.
pub struct TypeScriptParser {
    parser: Parser,
    dialect: Dialect,
}

impl TypeScriptParser {
    /// Create a new parser for plain TypeScript.
    pub fn new() -> Result<Self, TreeSitterError> {
        Self::with_dialect(Dialect::default())
    }

    pub fn with_dialect(dialect: Dialect) -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.language())
            .map_err(|_| TreeSitterError::LanguageSet)?;

        Ok(Self { parser, dialect })
    }

    /// Parse source code, switching grammar first if needed.
    pub fn parse(
        &mut self,
        path: &Path,
        source: &str,
        dialect: Dialect,
    ) -> Result<Tree, TreeSitterError> {
        if dialect != self.dialect {
            self.parser
                .set_language(&dialect.language())
                .map_err(|_| TreeSitterError::LanguageSet)?;
            self.dialect = dialect;
        }

        self.parser
            .parse(source, None)
            .ok_or_else(|| TreeSitterError::ParseFailed {
                path: path.to_path_buf(),
            })
    }
}

/// An anchor file read once and parsed once.
///
/// The text is never mutated; every change is expressed as a list of
/// insertions against it.
pub struct SourceDocument {
    path: PathBuf,
    text: String,
    tree: Tree,
}

impl SourceDocument {
    /// Parse `text`, failing if the tree contains any ERROR or MISSING node.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, TreeSitterError> {
        let document = Self::parse_lenient(path, text)?;
        document.ensure_valid()?;
        Ok(document)
    }

    /// Parse `text` and keep the tree even if it has syntax errors.
    pub fn parse_lenient(
        path: impl Into<PathBuf>,
        text: impl Into<String>,
    ) -> Result<Self, TreeSitterError> {
        let path = path.into();
        let text = text.into();
        let dialect = Dialect::from_path(&path);
        let tree = pool::with_parser(|parser| parser.parse(&path, &text, dialect))??;

        Ok(Self { path, text, tree })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the root node of the tree.
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Extract text for a node's byte range.
    pub fn node_text(&self, node: Node<'_>) -> &str {
        &self.text[node.byte_range()]
    }

    /// Lazily walk every node of the tree in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants::new(self.tree.root_node())
    }

    /// Check if the tree contains any ERROR nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Get all ERROR and MISSING nodes in the tree.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        self.descendants()
            .filter(|node| node.is_error() || node.is_missing())
            .map(|node| ErrorNode {
                byte_start: node.start_byte(),
                byte_end: node.end_byte(),
                start_point: node.start_position(),
                end_point: node.end_position(),
            })
            .collect()
    }

    /// Report the first syntax error, if any.
    pub fn ensure_valid(&self) -> Result<(), TreeSitterError> {
        if !self.has_errors() {
            return Ok(());
        }

        let errors = self.error_nodes();
        // has_error() can be set on a node whose only problem is an
        // unexpected token folded into it; fall back to the root span.
        let first = errors.first().cloned().unwrap_or_else(|| {
            let root = self.root_node();
            ErrorNode {
                byte_start: root.start_byte(),
                byte_end: root.end_byte(),
                start_point: root.start_position(),
                end_point: root.end_position(),
            }
        });

        Err(TreeSitterError::SyntaxError {
            path: self.path.clone(),
            line: first.start_point.row + 1,
            column: first.start_point.column + 1,
            byte_start: first.byte_start,
            byte_end: first.byte_end,
            count: errors.len().max(1),
        })
    }
}

/// Information about an ERROR node in the parse tree.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start_point: tree_sitter::Point,
    pub end_point: tree_sitter::Point,
}

/// Pre-order depth-first iterator over a subtree.
pub struct Descendants<'tree> {
    cursor: TreeCursor<'tree>,
    done: bool,
}

impl<'tree> Descendants<'tree> {
    pub fn new(root: Node<'tree>) -> Self {
        Self {
            cursor: root.walk(),
            done: false,
        }
    }
}

impl<'tree> Iterator for Descendants<'tree> {
    type Item = Node<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let node = self.cursor.node();
        if self.cursor.goto_first_child() {
            return Some(node);
        }

        // Climb until a sibling exists; the cursor cannot leave its root.
        loop {
            if self.cursor.goto_next_sibling() {
                return Some(node);
            }
            if !self.cursor.goto_parent() {
                self.done = true;
                return Some(node);
            }
        }
    }
}

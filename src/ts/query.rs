use crate::ts::errors::TreeSitterError;
use crate::ts::parser::{Dialect, SourceDocument};
use std::collections::HashMap;
use tree_sitter::{Query, QueryCursor, StreamingIterator};

/// A match from a tree-sitter query with captured nodes.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    /// The full match byte range
    pub byte_start: usize,
    pub byte_end: usize,
    /// Named captures: capture_name -> node span and text
    pub captures: HashMap<String, CapturedNode>,
}

#[derive(Debug, Clone)]
pub struct CapturedNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub text: String,
    pub kind: String,
}

/// Engine for executing tree-sitter queries against a parsed document.
pub struct QueryEngine {
    query: Query,
    capture_names: Vec<String>,
}

impl QueryEngine {
    /// Compile a query for the given dialect.
    ///
    /// Queries use tree-sitter's S-expression syntax:
    /// ```text
    /// (program
    ///   (import_statement
    ///     source: (string) @source) @import)
    /// ```
    pub fn new(dialect: Dialect, query_str: &str) -> Result<Self, TreeSitterError> {
        let query = Query::new(&dialect.language(), query_str).map_err(|e| {
            TreeSitterError::InvalidQuery {
                message: e.to_string(),
            }
        })?;

        let capture_names = query.capture_names().iter().map(|s| s.to_string()).collect();

        Ok(Self {
            query,
            capture_names,
        })
    }

    /// Compile a query for the dialect of `document`.
    pub fn for_document(document: &SourceDocument, query_str: &str) -> Result<Self, TreeSitterError> {
        Self::new(Dialect::from_path(document.path()), query_str)
    }

    /// Execute the query and return all matches in document order.
    pub fn find_all(&self, document: &SourceDocument) -> Vec<QueryMatch> {
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(
            &self.query,
            document.root_node(),
            document.text().as_bytes(),
        );

        let mut results = Vec::new();

        while let Some(m) = matches.next() {
            let mut captures = HashMap::new();
            let mut overall_start = usize::MAX;
            let mut overall_end = 0usize;

            for capture in m.captures {
                let node = capture.node;
                let name = &self.capture_names[capture.index as usize];

                overall_start = overall_start.min(node.start_byte());
                overall_end = overall_end.max(node.end_byte());

                captures.insert(
                    name.clone(),
                    CapturedNode {
                        byte_start: node.start_byte(),
                        byte_end: node.end_byte(),
                        text: document.node_text(node).to_string(),
                        kind: node.kind().to_string(),
                    },
                );
            }

            if overall_start != usize::MAX {
                results.push(QueryMatch {
                    byte_start: overall_start,
                    byte_end: overall_end,
                    captures,
                });
            }
        }

        results.sort_by_key(|m| (m.byte_start, m.byte_end));
        results
    }

    /// Get capture names defined in the query.
    pub fn capture_names(&self) -> &[String] {
        &self.capture_names
    }
}

/// Queries over TypeScript module structure.
pub mod queries {
    /// Every top-level import declaration.
    pub const TOP_LEVEL_IMPORTS: &str = r#"(program
        (import_statement
            source: (string) @source) @import)"#;

    /// One match per imported binding of a top-level import: named
    /// specifiers (`import { A, B as C }`) capture the exported name,
    /// default imports capture the local name.
    pub const IMPORTED_NAMES: &str = r#"(program
        (import_statement
            (import_clause
                (named_imports
                    (import_specifier name: (_) @name)))
            source: (string) @source) @import)

        (program
        (import_statement
            (import_clause (identifier) @name)
            source: (string) @source) @import)"#;
}

/// Strip the quotes from a captured string literal.
pub fn unquote(literal: &str) -> &str {
    let trimmed = literal.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next_back()) {
        (Some(open), Some(close)) if open == close && matches!(open, '\'' | '"' | '`') => {
            &trimmed[1..trimmed.len() - 1]
        }
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_top_level_imports() {
        let source = r#"
import { NgModule } from '@angular/core';
import { Routes, RouterModule } from '@angular/router';

function lazy() {
    return import('./lazy');
}
"#;
        let document = SourceDocument::parse("app-routing.module.ts", source).unwrap();
        let engine = QueryEngine::for_document(&document, queries::TOP_LEVEL_IMPORTS).unwrap();

        let matches = engine.find_all(&document);
        assert_eq!(matches.len(), 2);
        assert_eq!(unquote(&matches[1].captures["source"].text), "@angular/router");
    }

    #[test]
    fn find_imported_names() {
        let source = r#"
import Default from './default';
import { A, B as C } from "./letters";
import './side-effect';
"#;
        let document = SourceDocument::parse("x.ts", source).unwrap();
        let engine = QueryEngine::for_document(&document, queries::IMPORTED_NAMES).unwrap();

        let names: Vec<(String, String)> = engine
            .find_all(&document)
            .into_iter()
            .map(|m| {
                (
                    m.captures["name"].text.clone(),
                    unquote(&m.captures["source"].text).to_string(),
                )
            })
            .collect();

        assert!(names.contains(&("Default".to_string(), "./default".to_string())));
        assert!(names.contains(&("A".to_string(), "./letters".to_string())));
        assert!(names.contains(&("B".to_string(), "./letters".to_string())));
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn invalid_query_error() {
        let result = QueryEngine::new(Dialect::TypeScript, "(not_a_node_kind) @x");
        assert!(matches!(result, Err(TreeSitterError::InvalidQuery { .. })));
    }

    #[test]
    fn unquote_literals() {
        assert_eq!(unquote("'./a'"), "./a");
        assert_eq!(unquote("\"./b\""), "./b");
        assert_eq!(unquote("bare"), "bare");
        assert_eq!(unquote("'"), "'");
    }
}

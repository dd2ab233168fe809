use crate::ts::errors::{AnchorMiss, TreeSitterError};
use crate::ts::parser::{Descendants, SourceDocument};
use std::collections::BTreeSet;
use tree_sitter::Node;

/// Registration methods recognized when no configuration overrides them.
pub const DEFAULT_REGISTRATION_METHODS: &[&str] = &["forRoot", "forChild"];

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const SUGGESTION_THRESHOLD: f64 = 0.85;

/// The fixed set of method names whose first argument is a declaration array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationMethods(BTreeSet<String>);

impl RegistrationMethods {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl Default for RegistrationMethods {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRATION_METHODS.iter().copied())
    }
}

/// A registration call and the declaration array it receives.
///
/// Borrowed from the [`SourceDocument`] it was located in, so it cannot
/// outlive or be applied to any other text.
#[derive(Debug, Clone, Copy)]
pub struct Anchor<'doc> {
    /// The `X.forRoot(...)` call expression
    pub call: Node<'doc>,
    /// The array literal holding the declarations
    pub array: Node<'doc>,
}

impl<'doc> Anchor<'doc> {
    /// Array elements, ignoring comments.
    pub fn elements(&self) -> Vec<Node<'doc>> {
        let mut cursor = self.array.walk();
        let elements = self
            .array
            .named_children(&mut cursor)
            .filter(|node| node.kind() != "comment")
            .collect();
        elements
    }

    pub fn element_count(&self) -> usize {
        self.elements().len()
    }

    /// Offset just before the closing bracket.
    pub fn closing_offset(&self) -> usize {
        self.array.end_byte().saturating_sub(1)
    }

    /// Whether the last element is followed by a trailing comma.
    pub fn has_trailing_comma(&self) -> bool {
        let Some(last) = self.elements().last().copied() else {
            return false;
        };
        let mut cursor = self.array.walk();
        let trailing = self
            .array
            .children(&mut cursor)
            .any(|token| token.kind() == "," && token.start_byte() >= last.end_byte());
        trailing
    }
}

/// Finds the declaration array handed to a registration call.
#[derive(Debug, Clone, Default)]
pub struct AnchorLocator {
    methods: RegistrationMethods,
}

impl AnchorLocator {
    pub fn new(methods: RegistrationMethods) -> Self {
        Self { methods }
    }

    /// Resolve the anchor of `document`.
    ///
    /// When several registration calls exist the one closest to the end of
    /// the file wins.
    pub fn locate<'doc>(&self, document: &'doc SourceDocument) -> Result<Anchor<'doc>, TreeSitterError> {
        let call = document
            .descendants()
            .filter_map(|node| self.registration_call(document, node))
            .last()
            .ok_or_else(|| self.not_found(document, AnchorMiss::NoRegistrationCall))?;

        let argument = first_argument(call)
            .ok_or_else(|| self.not_found(document, AnchorMiss::MissingArgument))?;

        let array = match argument.kind() {
            "identifier" => {
                let name = document.node_text(argument);
                let value = find_binding(document, name).ok_or_else(|| {
                    self.not_found(
                        document,
                        AnchorMiss::UnresolvedBinding {
                            name: name.to_string(),
                        },
                    )
                })?;
                unwrap_expression(value)
            }
            _ => unwrap_expression(argument),
        };

        if array.kind() != "array" {
            return Err(self.not_found(
                document,
                AnchorMiss::NotAnArray {
                    kind: array.kind().to_string(),
                },
            ));
        }

        tracing::debug!(
            file = %document.path().display(),
            call = call.start_byte(),
            array_start = array.start_byte(),
            array_end = array.end_byte(),
            "located registration anchor"
        );

        Ok(Anchor { call, array })
    }

    /// Return the call expression if `node` is a recognized method used as
    /// a callee (`RouterModule.forChild(...)` or a bare `forChild(...)`).
    fn registration_call<'doc>(
        &self,
        document: &SourceDocument,
        node: Node<'doc>,
    ) -> Option<Node<'doc>> {
        if !matches!(node.kind(), "identifier" | "property_identifier") {
            return None;
        }
        if !self.methods.contains(document.node_text(node)) {
            return None;
        }

        let mut callee = node;
        let parent = node.parent()?;
        if parent.kind() == "member_expression"
            && parent.child_by_field_name("property") == Some(node)
        {
            callee = parent;
        }

        let call = callee.parent()?;
        (call.kind() == "call_expression" && call.child_by_field_name("function") == Some(callee))
            .then_some(call)
    }

    fn not_found(&self, document: &SourceDocument, miss: AnchorMiss) -> TreeSitterError {
        let suggestion = match miss {
            AnchorMiss::NoRegistrationCall => self.suggest(document),
            _ => None,
        };

        TreeSitterError::AnchorNotFound {
            path: document.path().to_path_buf(),
            methods: self.methods.names(),
            miss,
            suggestion,
        }
    }

    /// Closest identifier in the file to any registration method name.
    fn suggest(&self, document: &SourceDocument) -> Option<String> {
        let names = self.methods.names();
        document
            .descendants()
            .filter(|node| matches!(node.kind(), "identifier" | "property_identifier"))
            .map(|node| document.node_text(node))
            .filter(|text| !self.methods.contains(text))
            .filter_map(|text| {
                names
                    .iter()
                    .map(|name| strsim::jaro_winkler(name, text))
                    .fold(None, |best: Option<f64>, score| {
                        Some(best.map_or(score, |b| b.max(score)))
                    })
                    .filter(|score| *score >= SUGGESTION_THRESHOLD)
                    .map(|score| (score, text))
            })
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, text)| text.to_string())
    }
}

fn first_argument(call: Node<'_>) -> Option<Node<'_>> {
    first_named(call.child_by_field_name("arguments")?)
}

fn first_named(node: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = node.walk();
    let first = node
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    first
}

/// Initializer of the first variable declarator binding `name`.
fn find_binding<'doc>(document: &'doc SourceDocument, name: &str) -> Option<Node<'doc>> {
    Descendants::new(document.root_node())
        .filter(|node| node.kind() == "variable_declarator")
        .find(|node| {
            node.child_by_field_name("name")
                .is_some_and(|binding| document.node_text(binding) == name)
        })
        .and_then(|node| node.child_by_field_name("value"))
}

/// Look through `x as T`, `x satisfies T`, `(x)` and `x!`.
fn unwrap_expression(mut node: Node<'_>) -> Node<'_> {
    while matches!(
        node.kind(),
        "as_expression" | "satisfies_expression" | "parenthesized_expression" | "non_null_expression"
    ) {
        match first_named(node) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

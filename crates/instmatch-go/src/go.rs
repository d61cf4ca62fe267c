//! Go language parser using Tree-sitter.

use tree_sitter::{Language, Node, Parser, Tree};

use crate::extractor::{Declaration, ParseError, SourceFile, SourceParser};

/// Extracts the package clause and top-level declarations from Go source.
pub struct GoParser {
    language: Language,
}

impl GoParser {
    /// Creates a new Go parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_go::LANGUAGE.into(),
        }
    }

    fn parse_tree(&self, source: &str) -> Result<Tree, ParseError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        parser.parse(source, None).ok_or(ParseError::NoTree)
    }

    fn text<'a>(node: &Node<'_>, src: &'a [u8]) -> &'a str {
        node.utf8_text(src).unwrap_or("")
    }

    fn extract_package(root: &Node<'_>, src: &[u8]) -> Result<String, ParseError> {
        let mut cursor = root.walk();
        let clause = root
            .children(&mut cursor)
            .find(|n| n.kind() == "package_clause")
            .ok_or(ParseError::MissingPackage)?;
        if clause.has_error() {
            return Err(Self::syntax_error(&clause));
        }
        let name = clause
            .named_child(0)
            .map(|id| Self::text(&id, src))
            .unwrap_or_default();
        if name.is_empty() {
            return Err(ParseError::MissingPackage);
        }
        Ok(name.to_owned())
    }

    /// Location of the first error or missing node under `node`.
    fn syntax_error(node: &Node<'_>) -> ParseError {
        let at = Self::first_error(*node).unwrap_or(*node);
        let pos = at.start_position();
        ParseError::Syntax {
            line: pos.row + 1,
            column: pos.column,
        }
    }

    fn first_error(node: Node<'_>) -> Option<Node<'_>> {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        let mut cursor = node.walk();
        let child = node.children(&mut cursor).find(Node::has_error);
        child.and_then(Self::first_error)
    }

    /// Receiver type as written, minus type arguments: `*Set[T]` is `*Set`.
    fn receiver_type(node: &Node<'_>, src: &[u8]) -> String {
        match node.kind() {
            "pointer_type" => node
                .named_child(0)
                .map(|inner| format!("*{}", Self::receiver_type(&inner, src)))
                .unwrap_or_default(),
            "generic_type" => node
                .child_by_field_name("type")
                .map(|base| Self::text(&base, src).to_owned())
                .unwrap_or_default(),
            "parenthesized_type" => node
                .named_child(0)
                .map(|inner| Self::receiver_type(&inner, src))
                .unwrap_or_default(),
            _ => Self::text(node, src).to_owned(),
        }
    }

    fn extract_receiver(node: &Node<'_>, src: &[u8]) -> String {
        let Some(params) = node.child_by_field_name("receiver") else {
            return String::new();
        };
        let mut cursor = params.walk();
        let param = params
            .named_children(&mut cursor)
            .find(|p| p.kind() == "parameter_declaration");
        param
            .and_then(|p| p.child_by_field_name("type"))
            .map(|ty| Self::receiver_type(&ty, src))
            .unwrap_or_default()
    }

    fn extract_func(node: &Node<'_>, src: &[u8]) -> Option<Declaration> {
        let name = Self::text(&node.child_by_field_name("name")?, src);
        let receiver = if node.kind() == "method_declaration" {
            Self::extract_receiver(node, src)
        } else {
            String::new()
        };
        Some(Declaration::func_decl(
            node.start_position().row + 1,
            name,
            receiver,
        ))
    }

    fn extract_types(node: &Node<'_>, src: &[u8], out: &mut Vec<Declaration>) {
        let mut cursor = node.walk();
        for spec in node.named_children(&mut cursor) {
            if !matches!(spec.kind(), "type_spec" | "type_alias") {
                continue;
            }
            if let Some(name) = spec.child_by_field_name("name") {
                out.push(Declaration::type_decl(
                    spec.start_position().row + 1,
                    Self::text(&name, src),
                ));
            }
        }
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for GoParser {
    fn parse_package(&self, source: &str) -> Result<String, ParseError> {
        let tree = self.parse_tree(source)?;
        Self::extract_package(&tree.root_node(), source.as_bytes())
    }

    fn parse_file(&self, source: &str) -> Result<SourceFile, ParseError> {
        let tree = self.parse_tree(source)?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(Self::syntax_error(&root));
        }

        let src = source.as_bytes();
        let package = Self::extract_package(&root, src)?;
        let mut declarations = Vec::new();

        let mut cursor = root.walk();
        for node in root.children(&mut cursor) {
            match node.kind() {
                "function_declaration" | "method_declaration" => {
                    if let Some(decl) = Self::extract_func(&node, src) {
                        declarations.push(decl);
                    }
                }
                "type_declaration" => Self::extract_types(&node, src, &mut declarations),
                _ => {}
            }
        }

        Ok(SourceFile {
            package,
            declarations,
        })
    }
}

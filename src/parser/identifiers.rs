// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifier-token extraction for the symbol-aware runner.
//!
//! Walks a tree-sitter AST and reports every identifier-like token whose text
//! equals a search term, classified as a declaration name, a read usage or a
//! write usage.

use std::collections::HashMap;

use tree_sitter::{Node, Parser, Tree};

use crate::parser::languages::LANGUAGES;

/// How an identifier token participates in the surrounding construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRole {
    /// The name of a declaration.
    Definition,
    /// A read-only usage.
    Read,
    /// An assignment/update target.
    Write,
}

/// One identifier token matching the search term.
#[derive(Debug, Clone)]
pub struct IdentifierHit {
    /// 1-based line.
    pub line: usize,
    /// 1-based column.
    pub column: usize,
    pub role: TokenRole,
    /// Node kind of the declaration for definitions, of the token otherwise.
    pub syntax_kind: String,
}

/// Extractor with per-language parser reuse across files.
pub struct IdentifierIndex {
    parser_cache: HashMap<String, Parser>,
}

impl Default for IdentifierIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self {
            parser_cache: HashMap::new(),
        }
    }

    /// All identifier tokens in `source` whose text equals `term`.
    ///
    /// Returns `None` when the language has no grammar or the file fails to
    /// parse; callers treat that as "no symbol information for this file".
    pub fn occurrences(
        &mut self,
        source: &str,
        language: &str,
        term: &str,
    ) -> Option<Vec<IdentifierHit>> {
        let tree = self.parse(source, language)?;
        let source_bytes = source.as_bytes();
        let mut hits: Vec<IdentifierHit> = Vec::new();
        let mut seen = std::collections::HashSet::new();

        walk_tree(tree.root_node(), &mut |node| {
            if !is_identifier_like(node.kind()) {
                return;
            }
            let Ok(text) = node.utf8_text(source_bytes) else {
                return;
            };
            if text != term {
                return;
            }

            let line = node.start_position().row + 1;
            let column = node.start_position().column + 1;
            if !seen.insert((line, column)) {
                return;
            }

            let (role, syntax_kind) = classify(node);
            hits.push(IdentifierHit {
                line,
                column,
                role,
                syntax_kind,
            });
        });

        Some(hits)
    }

    fn parse(&mut self, source: &str, language: &str) -> Option<Tree> {
        let lang = LANGUAGES.get(language)?;
        use std::collections::hash_map::Entry;

        let parser = match self.parser_cache.entry(language.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(Parser::new()),
        };
        parser.set_language(lang).ok()?;
        parser.parse(source, None)
    }
}

fn walk_tree<F>(root: Node<'_>, visitor: &mut F)
where
    F: FnMut(Node<'_>),
{
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        visitor(node);
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
}

fn is_identifier_like(kind: &str) -> bool {
    matches!(
        kind,
        "identifier"
            | "property_identifier"
            | "field_identifier"
            | "type_identifier"
            | "shorthand_property_identifier"
            | "shorthand_property_identifier_pattern"
            | "name"
    )
}

fn is_declaration_kind(kind: &str) -> bool {
    matches!(
        kind,
        "function_declaration"
            | "function_definition"
            | "generator_function_declaration"
            | "method_definition"
            | "class_declaration"
            | "class_definition"
            | "abstract_class_declaration"
            | "interface_declaration"
            | "type_alias_declaration"
            | "enum_declaration"
            | "variable_declarator"
            | "function_item"
            | "struct_item"
            | "enum_item"
            | "trait_item"
            | "const_item"
            | "static_item"
            | "mod_item"
            | "type_item"
            | "method_declaration"
            | "type_spec"
            | "var_spec"
            | "const_spec"
            | "field_declaration"
    )
}

fn classify(node: Node<'_>) -> (TokenRole, String) {
    if let Some(parent) = node.parent() {
        if is_declaration_kind(parent.kind()) && is_name_of(parent, node) {
            return (TokenRole::Definition, parent.kind().to_string());
        }
    }
    if is_write_access(node) {
        return (TokenRole::Write, node.kind().to_string());
    }
    (TokenRole::Read, node.kind().to_string())
}

fn is_name_of(decl: Node<'_>, node: Node<'_>) -> bool {
    decl.child_by_field_name("name")
        .map(|name| name.id() == node.id())
        .unwrap_or(false)
}

/// True when the token is the target of an assignment or update expression.
///
/// Climbs through list/tuple wrappers so `a, b = f()` style targets are
/// recognized too.
fn is_write_access(node: Node<'_>) -> bool {
    let mut current = node;
    while let Some(parent) = current.parent() {
        match parent.kind() {
            "assignment_expression"
            | "augmented_assignment_expression"
            | "assignment"
            | "augmented_assignment"
            | "assignment_statement"
            | "compound_assignment_expr" => {
                return assignment_target(parent)
                    .map(|target| covers(target, node))
                    .unwrap_or(false);
            }
            "update_expression" | "inc_statement" | "dec_statement" => {
                return assignment_target(parent)
                    .map(|target| covers(target, node))
                    .unwrap_or(true);
            }
            "expression_list" | "pattern_list" | "tuple_pattern" => {
                current = parent;
            }
            _ => return false,
        }
    }
    false
}

fn assignment_target<'a>(parent: Node<'a>) -> Option<Node<'a>> {
    for field in ["left", "lhs", "argument", "operand"] {
        if let Some(target) = parent.child_by_field_name(field) {
            return Some(target);
        }
    }
    None
}

fn covers(ancestor: Node<'_>, node: Node<'_>) -> bool {
    ancestor.start_byte() <= node.start_byte() && node.end_byte() <= ancestor.end_byte()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hits(source: &str, language: &str, term: &str) -> Vec<IdentifierHit> {
        IdentifierIndex::new()
            .occurrences(source, language, term)
            .expect("parse")
    }

    #[test]
    fn typescript_declaration_and_usages_are_classified() {
        let source = "function total(a: number) {\n  return a;\n}\nconst sum = total(1) + total(2);\n";
        let found = hits(source, "typescript", "total");
        assert_eq!(found.len(), 3);
        assert_eq!(found.iter().filter(|h| h.role == TokenRole::Definition).count(), 1);
        assert_eq!(found.iter().filter(|h| h.role == TokenRole::Read).count(), 2);

        let def = found
            .iter()
            .find(|h| h.role == TokenRole::Definition)
            .expect("definition");
        assert_eq!(def.line, 1);
        assert_eq!(def.syntax_kind, "function_declaration");
    }

    #[test]
    fn assignment_targets_are_write_accesses() {
        let source = "let counter = 0;\ncounter = 1;\ncounter += 2;\nconsole.log(counter);\n";
        let found = hits(source, "javascript", "counter");
        let writes: Vec<_> = found
            .iter()
            .filter(|h| h.role == TokenRole::Write)
            .map(|h| h.line)
            .collect();
        assert_eq!(writes, vec![2, 3]);
        assert!(found
            .iter()
            .any(|h| h.role == TokenRole::Definition && h.line == 1));
        assert!(found.iter().any(|h| h.role == TokenRole::Read && h.line == 4));
    }

    #[test]
    fn token_equality_is_exact_not_substring() {
        let source = "const foo = 1;\nconst foobar = 2;\n";
        let found = hits(source, "javascript", "foo");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 1);
    }

    #[test]
    fn python_definitions_are_found() {
        let source = "def handler(x):\n    return x\n\nvalue = handler(3)\n";
        let found = hits(source, "python", "handler");
        assert!(found
            .iter()
            .any(|h| h.role == TokenRole::Definition && h.syntax_kind == "function_definition"));
        assert!(found.iter().any(|h| h.role == TokenRole::Read && h.line == 4));
    }

    #[test]
    fn unknown_language_yields_none() {
        assert!(IdentifierIndex::new()
            .occurrences("x = 1", "cobol", "x")
            .is_none());
    }
}

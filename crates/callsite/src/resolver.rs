use std::collections::HashMap;
use tree_sitter::Node;

/// A qualified reference as resolved through `use` declarations and as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub resolved: String,
    pub original: String,
}

fn segments(text: &str) -> Vec<String> {
    text.split("::")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    &source[node.byte_range()]
}

/// Local names introduced by `use` declarations
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    names: HashMap<String, Vec<String>>,
}

impl AliasTable {
    /// Collect every `use` declaration of a source unit.
    ///
    /// Declarations are gathered file-wide regardless of the block they sit
    /// in; a later declaration of the same local name wins.
    pub fn collect(root: Node<'_>, source: &str) -> Self {
        let mut table = Self::default();
        table.visit(root, source);
        table
    }

    fn visit(&mut self, node: Node<'_>, source: &str) {
        if node.kind() == "use_declaration" {
            if let Some(argument) = node.child_by_field_name("argument") {
                self.add_clause(argument, source, &[]);
            }
            return;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, source);
        }
    }

    fn add_clause(&mut self, clause: Node<'_>, source: &str, prefix: &[String]) {
        match clause.kind() {
            "use_as_clause" => {
                let (Some(path), Some(alias)) = (
                    clause.child_by_field_name("path"),
                    clause.child_by_field_name("alias"),
                ) else {
                    return;
                };
                let alias = node_text(alias, source).trim();
                if alias == "_" {
                    return;
                }
                let mut full = prefix.to_vec();
                full.extend(segments(node_text(path, source)));
                self.insert(alias, full);
            }
            "scoped_use_list" => {
                let mut nested = prefix.to_vec();
                if let Some(path) = clause.child_by_field_name("path") {
                    nested.extend(segments(node_text(path, source)));
                }
                if let Some(list) = clause.child_by_field_name("list") {
                    self.add_clause(list, source, &nested);
                }
            }
            "use_list" => {
                let mut cursor = clause.walk();
                for item in clause.named_children(&mut cursor) {
                    self.add_clause(item, source, prefix);
                }
            }
            "use_wildcard" => {
                log::trace!("ignoring glob import {}", node_text(clause, source));
            }
            _ => {
                let mut full = prefix.to_vec();
                full.extend(segments(node_text(clause, source)));
                // `use a::b::{self}` imports `b`
                if full.last().is_some_and(|s| s == "self") {
                    full.pop();
                }
                if let Some(local) = full.last().cloned() {
                    self.insert(&local, full);
                }
            }
        }
    }

    fn insert(&mut self, local: &str, full: Vec<String>) {
        if full.is_empty() {
            return;
        }
        log::trace!("use {} as {local}", full.join("::"));
        self.names.insert(local.to_string(), full);
    }

    /// Full path bound to a local name
    pub fn lookup(&self, local: &str) -> Option<&[String]> {
        self.names.get(local).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Resolve a path as written through the table
    pub fn resolve(&self, written: &str) -> QualifiedName {
        let written = segments(written);
        let original = written.join("::");

        let resolved = match written.split_first() {
            Some((head, rest)) => match self.lookup(head) {
                Some(full) => full
                    .iter()
                    .chain(rest.iter())
                    .cloned()
                    .collect::<Vec<_>>()
                    .join("::"),
                None => original.clone(),
            },
            None => original.clone(),
        };

        QualifiedName { resolved, original }
    }
}

/// Resolved and original names of every qualified path in a tree, by node id
#[derive(Debug, Default)]
pub struct ResolvedNames {
    names: HashMap<usize, QualifiedName>,
}

impl ResolvedNames {
    pub fn resolve_tree(root: Node<'_>, source: &str, aliases: &AliasTable) -> Self {
        let mut names = Self::default();
        names.visit(root, source, aliases);
        names
    }

    fn visit(&mut self, node: Node<'_>, source: &str, aliases: &AliasTable) {
        match node.kind() {
            "use_declaration" => return,
            "scoped_identifier" | "scoped_type_identifier" => {
                self.record(node, source, aliases);
                if let Some(path) = node.child_by_field_name("path") {
                    self.record(path, source, aliases);
                }
            }
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, source, aliases);
        }
    }

    fn record(&mut self, node: Node<'_>, source: &str, aliases: &AliasTable) {
        self.names
            .entry(node.id())
            .or_insert_with(|| aliases.resolve(node_text(node, source)));
    }

    pub fn get(&self, node: Node<'_>) -> Option<&QualifiedName> {
        self.names.get(&node.id())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Whether a resolved type path denotes the target type.
///
/// Relative paths (`crate::`, `self::`, `super::`) match by suffix since the
/// crate they live in is unknown.
pub fn path_matches(resolved: &str, target: &str) -> bool {
    let resolved = segments(resolved);
    let target = segments(target);

    if resolved.is_empty() {
        return false;
    }
    if resolved == target {
        return true;
    }

    let relative = matches!(
        resolved[0].as_str(),
        "crate" | "self" | "super" | "$crate"
    );
    if relative {
        let tail: Vec<String> = resolved
            .iter()
            .skip_while(|s| matches!(s.as_str(), "crate" | "self" | "super" | "$crate"))
            .cloned()
            .collect();
        return !tail.is_empty() && target.ends_with(&tail);
    }

    // a bare name that no `use` resolved (glob imports, same module)
    resolved.len() == 1 && target.last() == resolved.last()
}

/// Last-resort comparison on the type name alone
pub fn last_segment_matches(resolved: &str, target: &str) -> bool {
    let resolved = segments(resolved);
    let target = segments(target);
    !resolved.is_empty() && resolved.last() == target.last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::SourceLanguage;

    fn aliases(source: &str) -> AliasTable {
        let mut parser = SourceLanguage::Rust.parser().unwrap();
        let tree = parser.parse(source, None).unwrap();
        AliasTable::collect(tree.root_node(), source)
    }

    #[test]
    fn test_collects_plain_and_aliased_imports() {
        let table = aliases(
            r"
use contract_assert::Assert as Check;
use std::collections::HashMap;
use contract_assert::{Args, dump as render};
use outer::{inner::{Deep as D}, other::{self}};
use glob::*;
use ignored::Thing as _;
",
        );

        assert_eq!(
            table.lookup("Check").unwrap(),
            ["contract_assert", "Assert"]
        );
        assert_eq!(table.lookup("HashMap").unwrap(), ["std", "collections", "HashMap"]);
        assert_eq!(table.lookup("Args").unwrap(), ["contract_assert", "Args"]);
        assert_eq!(table.lookup("render").unwrap(), ["contract_assert", "dump"]);
        assert_eq!(table.lookup("D").unwrap(), ["outer", "inner", "Deep"]);
        assert_eq!(table.lookup("other").unwrap(), ["outer", "other"]);
        assert!(table.lookup("Thing").is_none());
        assert!(table.lookup("_").is_none());
    }

    #[test]
    fn test_collects_imports_inside_functions() {
        let table = aliases(
            r"
fn check() {
    use contract_assert::Assert as A;
}
",
        );
        assert_eq!(table.lookup("A").unwrap(), ["contract_assert", "Assert"]);
    }

    #[test]
    fn test_resolve_keeps_original() {
        let table = aliases("use contract_assert::Assert as Check;");
        let name = table.resolve("Check");
        assert_eq!(name.resolved, "contract_assert::Assert");
        assert_eq!(name.original, "Check");

        let untouched = table.resolve("other :: Type");
        assert_eq!(untouched.resolved, "other::Type");
        assert_eq!(untouched.original, "other::Type");
    }

    #[test]
    fn test_path_matching() {
        let target = "contract_assert::Assert";
        assert!(path_matches("contract_assert::Assert", target));
        assert!(path_matches("::contract_assert::Assert", target));
        assert!(path_matches("crate::Assert", target));
        assert!(path_matches("super::super::Assert", target));
        assert!(path_matches("Assert", target));
        assert!(!path_matches("other::Assert", target));
        assert!(!path_matches("crate::Other", target));
        assert!(!path_matches("", target));

        assert!(last_segment_matches("prelude::Assert", target));
        assert!(!last_segment_matches("prelude::Other", target));
    }
}

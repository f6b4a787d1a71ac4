use std::collections::HashMap;
use tree_sitter::Node;

/// Nodes printed verbatim, never split into tokens
const ATOMIC_KINDS: &[&str] = &["string_literal", "raw_string_literal", "char_literal"];

const COMMENT_KINDS: &[&str] = &["line_comment", "block_comment"];

const NO_SPACE_AFTER: &[&str] = &["(", "[", "::", "."];

const NO_SPACE_BEFORE: &[&str] = &[",", ";", ")", "]", "?", ".", "::"];

/// Lists whose trailing comma is dropped
const TRAILING_COMMA_PARENTS: &[&str] = &["arguments", "array_expression"];

#[derive(Debug)]
struct Token<'s> {
    text: &'s str,
    start: usize,
    end: usize,
    trailing_comma_candidate: bool,
}

/// Prints a single syntax node on one line
pub struct Printer<'s> {
    source: &'s str,
    overrides: &'s HashMap<usize, String>,
}

impl<'s> Printer<'s> {
    /// `overrides` maps node ids to the text printed in place of the node
    pub fn new(source: &'s str, overrides: &'s HashMap<usize, String>) -> Self {
        Self { source, overrides }
    }

    pub fn print(&self, node: Node<'_>) -> String {
        let mut tokens = Vec::new();
        self.collect(node, &mut tokens);

        let mut out = String::new();
        let mut previous: Option<&Token<'_>> = None;

        for (index, token) in tokens.iter().enumerate() {
            if token.trailing_comma_candidate {
                let closes = tokens
                    .get(index + 1)
                    .is_some_and(|next| matches!(next.text, ")" | "]"));
                if closes {
                    continue;
                }
            }

            if let Some(prev) = previous {
                if needs_space(prev, token) {
                    out.push(' ');
                }
            }
            out.push_str(token.text);
            previous = Some(token);
        }

        out
    }

    fn collect(&self, node: Node<'_>, tokens: &mut Vec<Token<'s>>) {
        let kind = node.kind();
        if COMMENT_KINDS.contains(&kind) {
            return;
        }

        if let Some(text) = self.overrides.get(&node.id()) {
            tokens.push(Token {
                text: text.as_str(),
                start: node.start_byte(),
                end: node.end_byte(),
                trailing_comma_candidate: false,
            });
            return;
        }

        if node.child_count() == 0 || ATOMIC_KINDS.contains(&kind) {
            let text = &self.source[node.byte_range()];
            if text.is_empty() {
                // zero-width nodes inserted by error recovery
                return;
            }
            let trailing_comma_candidate = kind == ","
                && node
                    .parent()
                    .is_some_and(|parent| TRAILING_COMMA_PARENTS.contains(&parent.kind()));
            tokens.push(Token {
                text,
                start: node.start_byte(),
                end: node.end_byte(),
                trailing_comma_candidate,
            });
            return;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.collect(child, tokens);
        }
    }
}

fn needs_space(prev: &Token<'_>, next: &Token<'_>) -> bool {
    if NO_SPACE_AFTER.contains(&prev.text) || NO_SPACE_BEFORE.contains(&next.text) {
        return false;
    }
    prev.text == "," || next.start > prev.end
}

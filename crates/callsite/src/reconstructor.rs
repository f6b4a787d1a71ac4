use crate::error::{CallSiteError, Result};
use crate::language::SourceLanguage;
use crate::printer::Printer;
use crate::resolver::{last_segment_matches, path_matches, AliasTable, ResolvedNames};
use std::collections::HashMap;
use std::panic::Location;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};
use unicode_width::UnicodeWidthChar;

/// Where a call happened, as far as it is known
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallSite<'a> {
    pub file: Option<&'a str>,
    /// 1-based
    pub line: Option<u32>,
    /// 1-based, in characters
    pub column: Option<u32>,
}

impl<'a> CallSite<'a> {
    pub const fn new(file: &'a str, line: u32) -> Self {
        Self {
            file: Some(file),
            line: Some(line),
            column: None,
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: u32) -> Self {
        self.column = Some(column);
        self
    }

    pub fn from_location(location: &'a Location<'a>) -> Self {
        Self::new(location.file(), location.line()).with_column(location.column())
    }
}

/// Recovers the source text of the call made to a type at a call site
pub trait CallSiteReconstruction: Send + Sync {
    fn reconstruct_call(&self, site: CallSite<'_>, target_type: &str) -> Result<String>;
}

/// Reconstruction switched off; every call fails with [`CallSiteError::Disabled`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

impl CallSiteReconstruction for Disabled {
    fn reconstruct_call(&self, _site: CallSite<'_>, _target_type: &str) -> Result<String> {
        Err(CallSiteError::Disabled)
    }
}

/// Reconstructs calls by parsing the calling Rust source with tree-sitter
#[derive(Debug, Clone, Default)]
pub struct SourceReconstructor {
    roots: Vec<PathBuf>,
}

impl SourceReconstructor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Additional directories relative call-site paths are resolved against
    pub fn with_roots<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Locate a call-site file.
    ///
    /// Tried in order: the path as given, joined to every source root, joined
    /// to every ancestor of the current directory.
    pub fn resolve_path(&self, file: &str) -> Result<PathBuf> {
        let given = Path::new(file);
        let mut candidates = vec![given.to_path_buf()];

        if given.is_relative() {
            candidates.extend(self.roots.iter().map(|root| root.join(given)));
            if let Ok(cwd) = std::env::current_dir() {
                candidates.extend(cwd.ancestors().map(|dir| dir.join(given)));
            }
        }

        let searched = candidates.len();
        candidates
            .into_iter()
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| CallSiteError::SourceNotFound {
                file: file.to_string(),
                searched,
            })
    }

    /// Reconstruct the call to `target_type` starting at `line` of `source`
    pub fn reconstruct_source(
        &self,
        source: &str,
        line: u32,
        column: Option<u32>,
        target_type: &str,
    ) -> Result<String> {
        let mut parser = SourceLanguage::Rust.parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| CallSiteError::parse("Failed to parse source code"))?;
        let root = tree.root_node();

        let aliases = AliasTable::collect(root, source);
        log::trace!("{} imported name(s) in scope", aliases.len());

        let search = Search {
            lines: LineIndex::new(source),
            aliases: &aliases,
            line,
            target_type,
        };
        let mut candidates = Vec::new();
        search.unit(&mut parser, root, source, &Unit::File, &mut candidates)?;

        let strict: Vec<Candidate> = candidates.iter().filter(|c| c.strict).cloned().collect();
        let pool = if strict.is_empty() { candidates } else { strict };

        select(pool, line, column, target_type)
    }
}

impl CallSiteReconstruction for SourceReconstructor {
    fn reconstruct_call(&self, site: CallSite<'_>, target_type: &str) -> Result<String> {
        let (Some(file), Some(line)) = (site.file, site.line.filter(|&l| l > 0)) else {
            return Err(CallSiteError::PreconditionNotMet {
                target: target_type.to_string(),
            });
        };

        let language = SourceLanguage::from_path(file);
        if !language.supports_ast() {
            return Err(CallSiteError::UnsupportedLanguage(language.as_str().to_string()));
        }

        let path = self.resolve_path(file)?;
        let source = std::fs::read_to_string(&path).map_err(|source| CallSiteError::Io {
            path: path.clone(),
            source,
        })?;

        let text = self.reconstruct_source(&source, line, site.column, target_type)?;
        log::debug!("Reconstructed {}:{line}: {text}", path.display());
        Ok(text)
    }
}

fn select(
    mut pool: Vec<Candidate>,
    line: u32,
    column: Option<u32>,
    target_type: &str,
) -> Result<String> {
    if pool.len() > 1 {
        if let Some(column) = column {
            let at_column: Vec<Candidate> =
                pool.iter().filter(|c| c.column == column).cloned().collect();
            if !at_column.is_empty() {
                pool = at_column;
            }
        }
    }

    match pool.len() {
        0 => Err(CallSiteError::NoMatch {
            target: target_type.to_string(),
            line,
        }),
        1 => Ok(pool.remove(0).text),
        count => Err(CallSiteError::Ambiguous {
            target: target_type.to_string(),
            line,
            count,
        }),
    }
}

/// Byte offset to 1-based line and display column, counted the way
/// `Location::column` counts them
struct LineIndex<'s> {
    source: &'s str,
    starts: Vec<usize>,
}

impl<'s> LineIndex<'s> {
    fn new(source: &'s str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, starts }
    }

    fn line_of(&self, byte: usize) -> u32 {
        let index = self.starts.partition_point(|&start| start <= byte);
        u32::try_from(index).unwrap_or(u32::MAX)
    }

    fn position(&self, byte: usize) -> (u32, u32) {
        let line = self.line_of(byte);
        let start = self.starts[line as usize - 1];
        let column = self
            .source
            .get(start..byte)
            .map_or(0, |prefix| prefix.chars().map(display_width).sum::<usize>());
        (line, u32::try_from(column + 1).unwrap_or(u32::MAX))
    }
}

fn display_width(ch: char) -> usize {
    match ch {
        '\t' => 4,
        _ => ch.width().unwrap_or(1),
    }
}

/// Macro arguments are re-parsed as the arguments of a call to `__m`
const MACRO_PREFIX: &str = "fn __m(){__m";
const MACRO_SUFFIX: &str = ";}";

/// A parsed piece of the calling file
enum Unit {
    File,
    /// Re-parsed macro arguments whose opening delimiter sits at `origin`
    Macro { origin: usize },
}

impl Unit {
    /// Byte offset in the calling file
    fn to_file(&self, byte: usize) -> usize {
        match self {
            Self::File => byte,
            Self::Macro { origin } => origin + byte.saturating_sub(MACRO_PREFIX.len()),
        }
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    text: String,
    column: u32,
    strict: bool,
}

struct Search<'a> {
    lines: LineIndex<'a>,
    aliases: &'a AliasTable,
    line: u32,
    target_type: &'a str,
}

impl Search<'_> {
    fn unit(
        &self,
        parser: &mut Parser,
        root: Node<'_>,
        source: &str,
        unit: &Unit,
        candidates: &mut Vec<Candidate>,
    ) -> Result<()> {
        let names = ResolvedNames::resolve_tree(root, source, self.aliases);
        log::trace!("{} type path(s) resolved", names.len());
        self.visit(parser, root, source, unit, &names, candidates)
    }

    fn visit(
        &self,
        parser: &mut Parser,
        node: Node<'_>,
        source: &str,
        unit: &Unit,
        names: &ResolvedNames,
        candidates: &mut Vec<Candidate>,
    ) -> Result<()> {
        let first = self.lines.line_of(unit.to_file(node.start_byte()));
        let last = self.lines.line_of(unit.to_file(node.end_byte()));
        if first > self.line || last < self.line {
            return Ok(());
        }

        match node.kind() {
            "call_expression" if first == self.line => {
                if let Some(candidate) = self.candidate(node, source, unit, names) {
                    candidates.push(candidate);
                }
            }
            "token_tree" if node.parent().is_some_and(|p| p.kind() == "macro_invocation") => {
                return self.macro_arguments(parser, node, source, unit, candidates);
            }
            _ => {}
        }

        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        for child in children {
            self.visit(parser, child, source, unit, names, candidates)?;
        }
        Ok(())
    }

    fn candidate(
        &self,
        call: Node<'_>,
        source: &str,
        unit: &Unit,
        names: &ResolvedNames,
    ) -> Option<Candidate> {
        let mut callee = call.child_by_field_name("function")?;
        if callee.kind() == "generic_function" {
            callee = callee.child_by_field_name("function")?;
        }
        if callee.kind() != "scoped_identifier" {
            return None;
        }

        let path = callee.child_by_field_name("path")?;
        let name = names.get(path)?;

        let strict = path_matches(&name.resolved, self.target_type);
        if !strict && !last_segment_matches(&name.resolved, self.target_type) {
            return None;
        }

        let mut overrides = HashMap::new();
        overrides.insert(path.id(), name.original.clone());
        let text = Printer::new(source, &overrides).print(call);

        let (_, column) = self.lines.position(unit.to_file(call.start_byte()));
        log::debug!(
            "Candidate call of {} at {}:{column} ({}): {text}",
            name.resolved,
            self.line,
            if strict { "exact" } else { "by name" }
        );

        Some(Candidate {
            text,
            column,
            strict,
        })
    }

    fn macro_arguments(
        &self,
        parser: &mut Parser,
        token_tree: Node<'_>,
        source: &str,
        unit: &Unit,
        candidates: &mut Vec<Candidate>,
    ) -> Result<()> {
        let text = &source[token_tree.byte_range()];
        // delimiters are single-byte brackets
        let Some(inner) = text.get(1..text.len().saturating_sub(1)) else {
            return Ok(());
        };

        let wrapped = format!("{MACRO_PREFIX}({inner}){MACRO_SUFFIX}");
        let Some(tree) = parser.parse(&wrapped, None) else {
            log::debug!("Macro arguments at byte {} did not parse", token_tree.start_byte());
            return Ok(());
        };

        let nested = Unit::Macro {
            origin: unit.to_file(token_tree.start_byte()),
        };
        self.unit(parser, tree.root_node(), &wrapped, &nested, candidates)
    }
}

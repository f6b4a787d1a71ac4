use crate::error::{CallSiteError, Result};
use std::path::Path;

/// Language of a calling source unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    Rust,
    Unknown,
}

impl SourceLanguage {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Self::Rust,
            _ => Self::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Unknown, Self::from_extension)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Unknown => "unknown",
        }
    }

    /// Check if this language can be parsed for reconstruction
    pub const fn supports_ast(self) -> bool {
        matches!(self, Self::Rust)
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> Result<tree_sitter::Language> {
        match self {
            Self::Rust => Ok(tree_sitter_rust::LANGUAGE.into()),
            Self::Unknown => Err(CallSiteError::UnsupportedLanguage(
                self.as_str().to_string(),
            )),
        }
    }

    /// Parser configured for this language
    pub fn parser(self) -> Result<tree_sitter::Parser> {
        let language = self.tree_sitter_language()?;
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| CallSiteError::tree_sitter(format!("Failed to set language: {e}")))?;
        Ok(parser)
    }
}

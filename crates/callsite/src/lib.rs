//! # Contract Callsite
//!
//! Recovers the literal source text of a call from its file and line.
//!
//! ## Architecture
//!
//! ```text
//! CallSite { file, line, column }
//!     │
//!     ├──> Path resolution (as given, source roots, ancestors of cwd)
//!     │
//!     ├──> Tree-sitter parsing → AST
//!     │      └─ macro arguments re-parsed as expressions
//!     │
//!     ├──> Name resolution
//!     │      ├─ `use` declarations → alias table
//!     │      └─ every qualified path → (resolved, as written)
//!     │
//!     ├──> Matching
//!     │      ├─ call expressions starting on the line
//!     │      ├─ callee type resolves to the target type
//!     │      └─ several candidates narrowed by column
//!     │
//!     └──> Printing: the matched node only, normalised whitespace
//! ```
//!
//! ## Example
//!
//! ```rust
//! use contract_callsite::SourceReconstructor;
//!
//! let source = "use contract_assert::Assert as Check;\n\
//!               fn f() { Check::is_true(42 == 43)?; }\n";
//!
//! let text = SourceReconstructor::new()
//!     .reconstruct_source(source, 2, None, "contract_assert::Assert")
//!     .unwrap();
//! assert_eq!(text, "Check::is_true(42 == 43)");
//! ```

mod error;
mod language;
mod printer;
mod reconstructor;
mod resolver;

pub use error::{CallSiteError, Result};
pub use language::SourceLanguage;
pub use reconstructor::{CallSite, CallSiteReconstruction, Disabled, SourceReconstructor};
pub use resolver::QualifiedName;

//! Static analysis of code snippets.
//!
//! [`CodeAnalyzer::analyze`] runs these steps over one snippet:
//!
//! ```text
//! code ──▶ stats ──▶ syntax tree (Python) ──▶ complexity + structure
//!      ──▶ style ──▶ anti-patterns ──▶ performance ──▶ security
//!      ──▶ version changes against the previous snapshot (by identity)
//! ```
//!
//! Every step degrades on its own: a parse failure zeroes complexity and
//! empties the structure but the line-based checks still run.
//!
//! # Adding a New Language
//!
//! 1. Create a new module in `src/analysis/languages/`
//! 2. Implement the `SyntaxAnalyzer` trait
//! 3. Register the analyzer in `languages/mod.rs`

mod analyzer;
mod languages;
mod patterns;
mod security;
mod snapshots;
mod stats;
mod stdlib;
mod style;
mod traits;
mod types;
mod versions;

pub use analyzer::{AnalysisOptions, CodeAnalyzer, MAX_ARGUMENTS, SYNTAX_ERROR_ISSUE};
pub use languages::{get_analyzer, registered_extensions, PythonAnalyzer};
pub use patterns::{check_anti_patterns, check_performance, FindingKind, PatternFindings};
pub use security::{check_security, SecurityProfile};
pub use snapshots::{Snapshot, SnapshotStore, DEFAULT_SNAPSHOT_CAPACITY};
pub use stats::code_stats;
pub use stdlib::{dependencies, is_stdlib};
pub use style::{check_style, MAX_LINE_LENGTH};
pub use traits::{ParsedFile, Structure, SyntaxAnalyzer};
pub use types::{AnalysisResult, ClassInfo, CodeStats, Complexity, FunctionInfo, VersionChange};
pub use versions::{compare_versions, CurrentVersion, SIGNIFICANT_COMPLEXITY_DELTA};

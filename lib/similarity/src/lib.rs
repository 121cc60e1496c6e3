//! # curatX Similarity
//!
//! A near-duplicate guard for text columns of a curatX store.
//!
//! Before a producer appends a row, the guard compares the row's checked
//! column against every stored value in that column and rejects the row
//! when it is too close to one of them.
//!
//! ## Features
//!
//! - **Normalization**: NFKC, lowercase, URL/email/number placeholders,
//!   punctuation stripping, whitespace collapsing, each a separate stage
//! - **Character similarity**: longest-matching-blocks ratio
//! - **Token similarity**: Jaccard index over word tokens
//! - **OR fusion**: either score above its threshold rejects
//! - **Explainability**: row, scores and raw values of the first match
//!
//! ## Example
//!
//! ```rust
//! use curatx_similarity::{DuplicateGuard, GuardConfig, Verdict};
//!
//! let guard = DuplicateGuard::new("text", GuardConfig::default()).unwrap();
//! let existing = ["The cat sat on the mat."];
//!
//! let verdict = guard.evaluate(Some(&existing[..]), "the cat sat on the mat").unwrap();
//! assert!(matches!(verdict, Verdict::Reject(_)));
//!
//! let verdict = guard
//!     .evaluate(Some(&existing[..]), "Completely unrelated sentence about rockets.")
//!     .unwrap();
//! assert!(verdict.is_admitted());
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Record    │────>│  Normalize  │────>│  Tokenize   │
//! │ (column)    │     │  (stages)   │     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │  Sequence   │     │   Token     │
//!                     │   ratio     │     │  Jaccard    │
//!                     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            └──────┬────────────┘
//!                            ┌─────────────┐
//!                            │   Verdict   │
//!                            │  (explain)  │
//!                            └─────────────┘
//! ```

pub mod normalize;
pub mod distance;
pub mod guard;
pub mod explain;

// Re-export main types for convenience
pub use distance::{sequence_ratio, token_jaccard};
pub use explain::{admit_message, render_report, GuardReport, RETRY_INSTRUCTION};
pub use guard::{
    check_record,
    AdmitReason,
    DuplicateGuard,
    DuplicateMatch,
    GuardConfig,
    Verdict,
    DEFAULT_CHAR_THRESHOLD,
    DEFAULT_TOKEN_THRESHOLD,
};
pub use normalize::{normalize_text, tokenize};

//! # curatX
//!
//! An append-only CSV dataset store with a near-duplicate admission guard,
//! for datasets grown by automated or semi-automated producers.
//!
//! - The **store** lets the column set grow over time: a row with new fields
//!   widens the header and backfills earlier rows with empty cells, through
//!   an atomic rewrite.
//! - The **guard** vets a proposed row before it is written, comparing one
//!   column against everything already stored with two independent
//!   similarity metrics.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! curatx guard --file data.csv --check-col text text="My argument" \
//!   && curatx append --file data.csv text="My argument" label=positive
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use curatx::prelude::*;
//!
//! let record = Record::from_pairs(["text=My argument", "label=positive"])?;
//!
//! let verdict = check_record("data.csv", "text", &record, &GuardConfig::default())?;
//! if verdict.is_admitted() {
//!     let outcome = append_record("data.csv", record, &AppendOptions::default())?;
//!     println!("{}", outcome);
//! }
//! # Ok::<(), curatx::Error>(())
//! ```
//!
//! ## Crate Structure
//!
//! - [`curatx-core`](https://docs.rs/curatx-core) - Record, Schema, error taxonomy
//! - [`curatx-storage`](https://docs.rs/curatx-storage) - Schema-evolving CSV store, filename stamping
//! - [`curatx-similarity`](https://docs.rs/curatx-similarity) - Normalization, similarity, duplicate guard

// Re-export core types
pub use curatx_core::{Error, ErrorKind, Record, Result, Schema};

// Re-export storage
pub use curatx_storage::{
    append_record, resolve_stamped_path, AppendChange, AppendOptions, AppendOutcome, CsvStore,
    DatasetWriter, Snapshot,
};

// Re-export the guard
pub use curatx_similarity::{
    check_record, render_report, AdmitReason, DuplicateGuard, DuplicateMatch, GuardConfig,
    GuardReport, Verdict,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        append_record, check_record, AppendOptions, AppendOutcome, CsvStore, DatasetWriter,
        DuplicateGuard, Error, ErrorKind, GuardConfig, Record, Result, Schema, Verdict,
    };
}

/// Normalization stages and similarity metrics
pub mod text {
    pub use curatx_similarity::distance::{sequence_ratio, token_jaccard};
    pub use curatx_similarity::normalize::*;
}

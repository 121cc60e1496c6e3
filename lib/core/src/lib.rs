//! # curatX Core
//!
//! Core types shared by the curatX store and duplicate guard.
//!
//! - [`Record`] - One row: ordered field name to string value
//! - [`Schema`] - Ordered, append-only column set of a store
//! - [`Error`] / [`ErrorKind`] - Closed failure taxonomy with stable exit codes
//!
//! ## Example
//!
//! ```rust
//! use curatx_core::{Record, Schema};
//!
//! let record = Record::from_pairs(["text=Hello world", "label=positive"]).unwrap();
//! let schema = Schema::from_record(&record);
//! assert_eq!(schema.len(), 2);
//! assert_eq!(record.get("label"), Some("positive"));
//! ```

pub mod error;
pub mod record;
pub mod schema;

pub use error::{Error, ErrorKind, Result};
pub use record::Record;
pub use schema::Schema;

//! Near-duplicate admission guard
//!
//! Decides whether a proposed value for one column is too close to a value
//! already stored in that column. Either metric exceeding its threshold is
//! enough to reject:
//!
//! - character similarity catches near-verbatim text with small edits
//! - token Jaccard catches reordered or reworded text sharing vocabulary
//!
//! The guard only reads; admitting a record is left to the caller.

use crate::distance::{sequence_ratio, token_jaccard};
use crate::normalize::{normalize_text, tokenize};
use curatx_core::{Error, Record, Result};
use curatx_storage::CsvStore;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_CHAR_THRESHOLD: f64 = 0.78;
pub const DEFAULT_TOKEN_THRESHOLD: f64 = 0.60;

/// Tuning for the duplicate check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Run the normalization pipeline before comparing.
    pub normalize: bool,
    /// Reject when character similarity is strictly above this.
    pub char_threshold: f64,
    /// Reject when token Jaccard is strictly above this.
    pub token_threshold: f64,
    /// Proposed values shorter than this (after normalization) are always
    /// admitted. 0 disables the floor.
    pub min_length: usize,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            char_threshold: DEFAULT_CHAR_THRESHOLD,
            token_threshold: DEFAULT_TOKEN_THRESHOLD,
            min_length: 0,
        }
    }
}

impl GuardConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("char threshold", self.char_threshold),
            ("token threshold", self.token_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidInput(format!(
                    "{} must be within 0.0..=1.0, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Why a value was let through.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmitReason {
    /// The store file does not exist yet.
    StoreMissing,
    /// The store has no column with the checked name.
    ColumnAbsent,
    /// Too short for a reliable comparison.
    BelowMinLength { length: usize, min_length: usize },
    /// Compared against every stored value, none close enough.
    Unique { compared: usize },
}

/// Evidence for a rejection: the first stored value that matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateMatch {
    /// 0-based index among the data rows.
    pub row_index: usize,
    pub char_similarity: f64,
    pub token_similarity: f64,
    /// Raw stored value.
    pub existing: String,
    /// Raw proposed value.
    pub proposed: String,
}

impl DuplicateMatch {
    /// 1-based line in the file, counting the header as line 1.
    pub fn line_number(&self) -> usize {
        self.row_index + 2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Admit(AdmitReason),
    Reject(DuplicateMatch),
}

impl Verdict {
    #[inline]
    pub fn is_admitted(&self) -> bool {
        matches!(self, Verdict::Admit(_))
    }

    /// 0 when admitted, 1 when rejected as a near-duplicate.
    pub fn exit_code(&self) -> u8 {
        if self.is_admitted() {
            0
        } else {
            1
        }
    }
}

/// Duplicate check for one column.
#[derive(Debug, Clone)]
pub struct DuplicateGuard {
    column: String,
    config: GuardConfig,
}

impl DuplicateGuard {
    pub fn new(column: impl Into<String>, config: GuardConfig) -> Result<Self> {
        let column = column.into();
        if column.is_empty() {
            return Err(Error::InvalidInput("checked column name must be non-empty".to_string()));
        }
        config.validate()?;
        Ok(Self { column, config })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    fn prepare<'v>(&self, value: &'v str) -> Cow<'v, str> {
        if self.config.normalize {
            Cow::Owned(normalize_text(value))
        } else {
            Cow::Borrowed(value)
        }
    }

    /// Judge `proposed` against the stored values of the checked column.
    ///
    /// `existing` is `None` when the store has no such column, which admits
    /// unconditionally. Values are scanned in row order and the first one
    /// over either threshold is reported.
    pub fn evaluate<S: AsRef<str>>(&self, existing: Option<&[S]>, proposed: &str) -> Result<Verdict> {
        if proposed.trim().is_empty() {
            return Err(Error::MissingField(self.column.clone()));
        }

        let existing = match existing {
            Some(values) => values,
            None => {
                debug!("Column '{}' not in store, admitting", self.column);
                return Ok(Verdict::Admit(AdmitReason::ColumnAbsent));
            }
        };

        let candidate = self.prepare(proposed);
        let length = candidate.chars().count();
        if self.config.min_length > 0 && length < self.config.min_length {
            debug!(
                "Proposed value has length {} below floor {}, admitting",
                length, self.config.min_length
            );
            return Ok(Verdict::Admit(AdmitReason::BelowMinLength {
                length,
                min_length: self.config.min_length,
            }));
        }
        let candidate_tokens = tokenize(&candidate);

        for (row_index, value) in existing.iter().enumerate() {
            let value = value.as_ref();
            let stored = self.prepare(value);
            let char_similarity = sequence_ratio(&candidate, &stored);
            let token_similarity = token_jaccard(&candidate_tokens, &tokenize(&stored));

            if char_similarity > self.config.char_threshold
                || token_similarity > self.config.token_threshold
            {
                info!(
                    "Rejected near-duplicate of row {} (char {:.2}, token {:.2})",
                    row_index + 2,
                    char_similarity,
                    token_similarity
                );
                return Ok(Verdict::Reject(DuplicateMatch {
                    row_index,
                    char_similarity,
                    token_similarity,
                    existing: value.to_string(),
                    proposed: proposed.to_string(),
                }));
            }
        }

        Ok(Verdict::Admit(AdmitReason::Unique {
            compared: existing.len(),
        }))
    }

    /// Check the checked column of `record` against the store at `path`.
    ///
    /// The proposal is validated first: a missing column is invalid input,
    /// a blank one is [`Error::MissingField`]. A store that does not exist
    /// yet admits everything.
    pub fn check_store<P: AsRef<Path>>(&self, path: P, record: &Record) -> Result<Verdict> {
        let path = path.as_ref();
        let proposed = record
            .get(&self.column)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "proposed data is missing the column '{}'",
                    self.column
                ))
            })?
            .trim();
        if proposed.is_empty() {
            return Err(Error::MissingField(self.column.clone()));
        }

        let snapshot = match CsvStore::read_all(path) {
            Ok(snapshot) => snapshot,
            Err(Error::NotFound(_)) => {
                debug!("{} does not exist yet, admitting", path.display());
                return Ok(Verdict::Admit(AdmitReason::StoreMissing));
            }
            Err(e) => return Err(e),
        };

        let values = snapshot.column_values(&self.column);
        self.evaluate(values.as_deref(), proposed)
    }
}

/// Run the duplicate check for `column` of `record` against the store at `path`.
pub fn check_record<P: AsRef<Path>>(
    path: P,
    column: &str,
    record: &Record,
    config: &GuardConfig,
) -> Result<Verdict> {
    DuplicateGuard::new(column, config.clone())?.check_store(path, record)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(config: GuardConfig) -> DuplicateGuard {
        DuplicateGuard::new("text", config).unwrap()
    }

    fn eval(config: GuardConfig, existing: &[&str], proposed: &str) -> Result<Verdict> {
        guard(config).evaluate(Some(existing), proposed)
    }

    #[test]
    fn test_default_config() {
        let config = GuardConfig::default();
        assert!(config.normalize);
        assert_eq!(config.char_threshold, 0.78);
        assert_eq!(config.token_threshold, 0.60);
        assert_eq!(config.min_length, 0);
    }

    #[test]
    fn test_config_rejects_out_of_range_thresholds() {
        let config = GuardConfig {
            char_threshold: 1.5,
            ..GuardConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));

        let config = GuardConfig {
            token_threshold: f64::NAN,
            ..GuardConfig::default()
        };
        assert!(DuplicateGuard::new("text", config).is_err());
    }

    #[test]
    fn test_config_deserializes_partially() {
        let config: GuardConfig = serde_json::from_str(r#"{"min_length": 5}"#).unwrap();
        assert_eq!(config.min_length, 5);
        assert_eq!(config.char_threshold, DEFAULT_CHAR_THRESHOLD);
    }

    #[test]
    fn test_empty_proposal_is_missing_field() {
        let err = eval(GuardConfig::default(), &["anything"], "   ").unwrap_err();
        assert!(matches!(err, Error::MissingField(ref c) if c == "text"));
    }

    #[test]
    fn test_punctuation_and_case_variant_rejected() {
        let verdict = eval(GuardConfig::default(), &["The cat sat on the mat."], "the cat sat on the mat").unwrap();
        match verdict {
            Verdict::Reject(m) => {
                assert_eq!(m.row_index, 0);
                assert_eq!(m.line_number(), 2);
                assert!(m.char_similarity > 0.95);
                assert_eq!(m.existing, "The cat sat on the mat.");
                assert_eq!(m.proposed, "the cat sat on the mat");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_unrelated_sentence_admitted() {
        let verdict = eval(
            GuardConfig::default(),
            &["The cat sat on the mat."],
            "Completely unrelated sentence about rockets.",
        )
        .unwrap();
        assert_eq!(verdict, Verdict::Admit(AdmitReason::Unique { compared: 1 }));
    }

    #[test]
    fn test_exact_text_rejected_with_full_char_similarity() {
        let text = "A reasonably long example sentence for the dataset.";
        match eval(GuardConfig::default(), &[text], text).unwrap() {
            Verdict::Reject(m) => {
                assert_eq!(m.char_similarity, 1.0);
                assert_eq!(m.token_similarity, 1.0);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_reordered_words_caught_by_tokens() {
        let verdict = eval(
            GuardConfig::default(),
            &["rockets launch from florida every week"],
            "every week from florida rockets launch",
        )
        .unwrap();
        match verdict {
            Verdict::Reject(m) => assert_eq!(m.token_similarity, 1.0),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_first_match_is_reported() {
        let existing = ["nothing alike here", "hello world", "hello world!"];
        match eval(GuardConfig::default(), &existing, "Hello, World").unwrap() {
            Verdict::Reject(m) => assert_eq!(m.row_index, 1),
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_threshold_equality_admits() {
        // {a, b} vs {a, b, c, d}: Jaccard exactly 0.5
        let config = GuardConfig {
            char_threshold: 1.0,
            token_threshold: 0.5,
            ..GuardConfig::default()
        };
        let verdict = eval(config, &["a b c d"], "a b").unwrap();
        assert!(verdict.is_admitted());
    }

    #[test]
    fn test_column_absent_admits() {
        let verdict = guard(GuardConfig::default())
            .evaluate::<&str>(None, "anything at all")
            .unwrap();
        assert_eq!(verdict, Verdict::Admit(AdmitReason::ColumnAbsent));
    }

    #[test]
    fn test_below_min_length_admits() {
        let config = GuardConfig {
            min_length: 5,
            ..GuardConfig::default()
        };
        let verdict = eval(config, &["ok"], "OK!").unwrap();
        assert_eq!(
            verdict,
            Verdict::Admit(AdmitReason::BelowMinLength { length: 2, min_length: 5 })
        );
    }

    #[test]
    fn test_without_normalization_raw_text_is_compared() {
        let config = GuardConfig {
            normalize: false,
            ..GuardConfig::default()
        };
        let verdict = eval(config, &["Order 12345 shipped"], "Order 67890 shipped").unwrap();
        // Raw digits differ, so only "Order" and "shipped" are shared.
        assert!(verdict.is_admitted());

        let normalized = eval(GuardConfig::default(), &["Order 12345 shipped"], "Order 67890 shipped").unwrap();
        assert!(!normalized.is_admitted());
    }

    #[test]
    fn test_verdict_exit_codes() {
        assert_eq!(Verdict::Admit(AdmitReason::StoreMissing).exit_code(), 0);
        let reject = Verdict::Reject(DuplicateMatch {
            row_index: 0,
            char_similarity: 1.0,
            token_similarity: 1.0,
            existing: "x".into(),
            proposed: "x".into(),
        });
        assert_eq!(reject.exit_code(), 1);
    }
}

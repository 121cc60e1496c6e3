//! Human- and machine-readable explanations of guard verdicts
//!
//! A rejection is only useful to a producer if it says what it collided
//! with, so the report carries the matching line, both scores against their
//! thresholds and the two raw values.

use crate::guard::{AdmitReason, GuardConfig, Verdict};
use serde::Serialize;
use std::fmt::Write;

pub const RETRY_INSTRUCTION: &str = "Instruction: Generate a significantly different example.";

/// One-line summary for an admitted value.
pub fn admit_message(reason: &AdmitReason) -> String {
    match reason {
        AdmitReason::StoreMissing => "File does not exist yet. Input is unique.".to_string(),
        AdmitReason::ColumnAbsent => "PASS: Column not present yet; treating as unique.".to_string(),
        AdmitReason::BelowMinLength { .. } => {
            "PASS: Below min-length; skipping duplicate enforcement.".to_string()
        }
        AdmitReason::Unique { .. } => "PASS: Input appears unique.".to_string(),
    }
}

/// Full text report for a verdict.
pub fn render_report(verdict: &Verdict, config: &GuardConfig) -> String {
    let m = match verdict {
        Verdict::Admit(reason) => return admit_message(reason),
        Verdict::Reject(m) => m,
    };

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "REJECTED: Similar to existing row");
    let _ = writeln!(out, "Row: {}", m.line_number());
    let _ = writeln!(
        out,
        "Char-sim: {:.2} (threshold {:.2})",
        m.char_similarity, config.char_threshold
    );
    let _ = writeln!(
        out,
        "Token-Jaccard: {:.2} (threshold {:.2})",
        m.token_similarity, config.token_threshold
    );
    let _ = writeln!(out, "Existing: {}", m.existing);
    let _ = writeln!(out, "Proposed: {}", m.proposed);
    out.push_str(RETRY_INSTRUCTION);
    out
}

/// JSON envelope for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct GuardReport<'a> {
    pub admitted: bool,
    pub column: &'a str,
    pub verdict: &'a Verdict,
    pub config: &'a GuardConfig,
}

impl<'a> GuardReport<'a> {
    pub fn new(column: &'a str, verdict: &'a Verdict, config: &'a GuardConfig) -> Self {
        Self {
            admitted: verdict.is_admitted(),
            column,
            verdict,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::DuplicateMatch;

    fn rejection() -> Verdict {
        Verdict::Reject(DuplicateMatch {
            row_index: 3,
            char_similarity: 0.9712,
            token_similarity: 0.5,
            existing: "The cat sat on the mat.".to_string(),
            proposed: "the cat sat on the mat".to_string(),
        })
    }

    #[test]
    fn test_rejection_report() {
        let report = render_report(&rejection(), &GuardConfig::default());
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(
            lines,
            vec![
                "REJECTED: Similar to existing row",
                "Row: 5",
                "Char-sim: 0.97 (threshold 0.78)",
                "Token-Jaccard: 0.50 (threshold 0.60)",
                "Existing: The cat sat on the mat.",
                "Proposed: the cat sat on the mat",
                RETRY_INSTRUCTION,
            ]
        );
    }

    #[test]
    fn test_admit_messages() {
        let config = GuardConfig::default();
        assert_eq!(
            render_report(&Verdict::Admit(AdmitReason::Unique { compared: 2 }), &config),
            "PASS: Input appears unique."
        );
        assert!(render_report(&Verdict::Admit(AdmitReason::ColumnAbsent), &config)
            .contains("Column not present"));
    }

    #[test]
    fn test_json_report_shape() {
        let verdict = rejection();
        let config = GuardConfig::default();
        let value = serde_json::to_value(GuardReport::new("text", &verdict, &config)).unwrap();
        assert_eq!(value["admitted"], false);
        assert_eq!(value["column"], "text");
        assert_eq!(value["verdict"]["reject"]["row_index"], 3);
        assert_eq!(value["config"]["char_threshold"], 0.78);

        let admitted = Verdict::Admit(AdmitReason::ColumnAbsent);
        let value = serde_json::to_value(GuardReport::new("text", &admitted, &config)).unwrap();
        assert_eq!(value["verdict"]["admit"], "column_absent");
    }
}

//! The scan engine.
//!
//! This module orchestrates a full scan: validate the source, then execute
//! every registered rule against the resulting [`Document`] and aggregate
//! the findings. The engine is decoupled from presentation; its output is
//! structured data, never formatted terminal text.
//!
//! Rules run sequentially in registry (name) order. Each rule executes
//! inside a failure boundary: a rule that panics is recorded as a single
//! synthetic finding and the scan continues. One broken rule never aborts
//! a scan.

mod report;

pub use report::{ScanReport, ScanSummary};

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, error, info};

use crate::error::AnnolintError;
use crate::rules::{self, Rule};
use crate::schema::{self, Document};

/// The synthetic finding recorded when a rule fails internally.
const RULE_FAILURE_FINDING: &str = "Rule execution failed with an internal error.";

/// The aggregated result of one scan.
///
/// `findings` maps rule names to their finding strings, keyed in sorted
/// order; rules with no findings are absent. `total_findings` counts every
/// finding string, synthetic ones included.
#[derive(Clone, Debug)]
pub struct ScanResult {
    /// The validated document the rules ran against.
    pub document: Document,

    /// Findings per rule, keyed by rule name.
    pub findings: BTreeMap<String, Vec<String>>,

    /// Total number of findings across all rules.
    pub total_findings: usize,
}

/// Executes a full scan on an annotation file.
///
/// Validates the file, then runs every registered rule against the
/// document.
///
/// # Errors
///
/// Propagates validation errors unmodified; rule failures never surface as
/// errors (see [`run_rules`]).
pub fn run_scan(path: &Path) -> Result<ScanResult, AnnolintError> {
    info!(path = %path.display(), "starting scan");
    let document = schema::validate(path)?;
    Ok(run_rules(document))
}

/// Runs every registered rule against a validated document.
pub fn run_rules(document: Document) -> ScanResult {
    run_with_rules(document, rules::all_rules())
}

fn run_with_rules(document: Document, rules: &[Rule]) -> ScanResult {
    let mut findings: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut total_findings = 0;

    for rule in rules {
        debug!(rule = rule.name, "executing rule");
        match panic::catch_unwind(AssertUnwindSafe(|| (rule.run)(&document))) {
            Ok(rule_findings) => {
                if !rule_findings.is_empty() {
                    info!(
                        rule = rule.name,
                        count = rule_findings.len(),
                        "rule surfaced findings"
                    );
                    total_findings += rule_findings.len();
                    findings.insert(rule.name.to_string(), rule_findings);
                }
            }
            Err(_) => {
                // One broken rule must not take down the whole scan.
                error!(rule = rule.name, "rule execution failed, continuing scan");
                findings.insert(
                    format!("{}_execution_error", rule.name),
                    vec![RULE_FAILURE_FINDING.to_string()],
                );
                total_findings += 1;
            }
        }
    }

    info!(total_findings, "scan complete");
    ScanResult {
        document,
        findings,
        total_findings,
    }
}

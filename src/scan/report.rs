//! Scan report types and terminal formatting.
//!
//! A [`ScanReport`] is the lossless, exportable view of a [`ScanResult`]:
//! summary counts plus the full findings mapping. Serialization produces
//! the stable JSON shape consumed by downstream tooling; `Display` renders
//! a compact terminal view with long finding lists truncated.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::ScanResult;

/// Findings shown per rule in the terminal view. The JSON report is never
/// truncated.
const MAX_DISPLAY_FINDINGS: usize = 10;

/// The exportable summary of one scan.
#[derive(Clone, Debug, Serialize)]
pub struct ScanReport {
    /// Headline counts.
    pub summary: ScanSummary,

    /// Full, untruncated findings per rule.
    pub findings: BTreeMap<String, Vec<String>>,
}

/// Headline counts for a scan.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ScanSummary {
    /// Total number of findings across all rules.
    pub total_findings: usize,

    /// Number of images in the scanned dataset.
    pub images_scanned: usize,

    /// Number of annotations in the scanned dataset.
    pub annotations_scanned: usize,

    /// Number of categories in the scanned dataset.
    pub categories_found: usize,
}

impl ScanResult {
    /// Converts this result into its exportable report form.
    pub fn to_report(&self) -> ScanReport {
        ScanReport {
            summary: ScanSummary {
                total_findings: self.total_findings,
                images_scanned: self.document.images.len(),
                annotations_scanned: self.document.annotations.len(),
                categories_found: self.document.categories.len(),
            },
            findings: self.findings.clone(),
        }
    }
}

impl ScanReport {
    /// Serializes the full report as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scan Summary")?;
        writeln!(f, "  Images:      {}", self.summary.images_scanned)?;
        writeln!(f, "  Annotations: {}", self.summary.annotations_scanned)?;
        writeln!(f, "  Categories:  {}", self.summary.categories_found)?;
        writeln!(f, "  Findings:    {}", self.summary.total_findings)?;

        if self.findings.is_empty() {
            writeln!(f)?;
            writeln!(f, "No issues found. Your annotations look clean!")?;
            return Ok(());
        }

        for (rule_name, rule_findings) in &self.findings {
            writeln!(f)?;
            writeln!(f, "{} ({})", title_case(rule_name), rule_findings.len())?;
            for finding in rule_findings.iter().take(MAX_DISPLAY_FINDINGS) {
                writeln!(f, "  - {}", finding)?;
            }
            if rule_findings.len() > MAX_DISPLAY_FINDINGS {
                writeln!(
                    f,
                    "  ... and {} more.",
                    rule_findings.len() - MAX_DISPLAY_FINDINGS
                )?;
            }
        }

        Ok(())
    }
}

/// Converts a rule name like `category_duplicate_ids` to `Category
/// Duplicate Ids` for section headings.
fn title_case(rule_name: &str) -> String {
    rule_name
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

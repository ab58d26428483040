//! Formatted terminal output for a written document.
//!
//! We keep formatting code in one place so output changes are localized and
//! the pipeline code stays clean and testable.

use crate::domain::{IndicatorRecord, OutputDocument};

/// Format the per-indicator status table for `tripwires show`.
pub fn format_document_summary(doc: &OutputDocument) -> String {
    let mut out = String::new();

    out.push_str("=== tripwires - indicator status ===\n");
    out.push_str(&format!(
        "Generated: {} | start date: {}\n\n",
        doc.generated_utc, doc.start_date
    ));

    out.push_str(&format!(
        "{:<20} {:<8} {:>14} {:>10}  {}\n",
        "key", "status", "latest", "yoy%", "label"
    ));

    for (key, record) in &doc.indicators {
        match record {
            IndicatorRecord::Full {
                label,
                unit,
                status,
                summary,
                ..
            } => {
                let latest = summary
                    .latest_value
                    .map(|v| {
                        if unit.is_empty() {
                            format!("{v}")
                        } else {
                            format!("{v} {unit}")
                        }
                    })
                    .unwrap_or_else(|| "-".to_string());
                let yoy = summary
                    .yoy_pct
                    .map(|v| format!("{v:+.2}"))
                    .unwrap_or_else(|| "-".to_string());
                out.push_str(&format!(
                    "{:<20} {:<8} {:>14} {:>10}  {}\n",
                    key,
                    status.display_name(),
                    latest,
                    yoy,
                    label
                ));
            }
            IndicatorRecord::Error { error } => {
                out.push_str(&format!("{:<20} {:<8} {}\n", key, "error", error));
            }
        }
    }

    out
}

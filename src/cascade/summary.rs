//! Human-readable rendering of a cascade run summary.
//!
//! The rendered block is what the CI log (and anyone reading it) sees at the
//! end of a run: one line per candidate PR with its outcome, plus totals.

use std::fmt::Write;

use super::run::{PrOutcome, RunSummary};

/// Renders a run summary as a multi-line string.
pub fn render(summary: &RunSummary) -> String {
    if summary.reports.is_empty() {
        return format!("no auto-merge candidates target '{}'", summary.base);
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "cascade run for '{}': {} candidate(s)",
        summary.base,
        summary.reports.len()
    );

    for report in &summary.reports {
        match &report.outcome {
            PrOutcome::Conflict { message } | PrOutcome::Failed { message } => {
                let _ = writeln!(
                    out,
                    "  {} ({}): {}: {}",
                    report.pr,
                    report.head_ref,
                    report.outcome.label(),
                    message
                );
            }
            outcome => {
                let _ = writeln!(
                    out,
                    "  {} ({}): {}",
                    report.pr,
                    report.head_ref,
                    outcome.label()
                );
            }
        }
    }

    let updated = summary.count(|o| matches!(o, PrOutcome::Updated));
    let current = summary.count(|o| matches!(o, PrOutcome::AlreadyCurrent));
    let conflicts = summary.count(|o| matches!(o, PrOutcome::Conflict { .. }));
    let vanished = summary.count(|o| matches!(o, PrOutcome::Vanished));
    let failed = summary.count(|o| matches!(o, PrOutcome::Failed { .. }));

    let _ = write!(
        out,
        "totals: {} updated, {} already current, {} conflict(s), {} vanished, {} failed",
        updated, current, conflicts, vanished, failed
    );

    out
}

//! Shared output formatting for audit results.

use anyhow::Result;
use walkcheck::{AuditOutcome, Severity};

use crate::OutputFormat;

/// Print audit results in the specified format.
///
/// Text output streams per-file lines while the audit runs, so only the
/// summary is printed here.
pub fn print(outcome: &AuditOutcome, format: OutputFormat, fail_on: Severity) -> Result<()> {
    match format {
        OutputFormat::Text => print_summary(outcome, fail_on),
        OutputFormat::Json => return print_json(outcome),
        OutputFormat::Compact => print_compact(outcome),
    }
    Ok(())
}

fn print_summary(outcome: &AuditOutcome, fail_on: Severity) {
    let report = &outcome.report;
    let (errors, warnings, infos) = report.count_by_severity();
    let exceptions = report.exceptions().count();

    let summary_color = if outcome.error_count > 0 {
        "\x1b[31m"
    } else if warnings > 0 || errors > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s), {} exception(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, exceptions, report.files_checked
    );
    if outcome.error_count > 0 {
        println!("{} problem(s) at or above {}", outcome.error_count, fail_on);
    }
    if outcome.cancelled {
        println!("Audit cancelled after {} file(s)", outcome.files_processed);
    }
}

fn print_json(outcome: &AuditOutcome) -> Result<()> {
    let json = serde_json::to_string_pretty(&outcome.report)?;
    println!("{json}");
    Ok(())
}

fn print_compact(outcome: &AuditOutcome) {
    let report = &outcome.report;
    for (path, d) in report.diagnostics().chain(report.exceptions()) {
        let check = d.id.as_deref().unwrap_or(&d.check);
        println!(
            "{}:{}:{}: {} [{}] {}",
            path.display(),
            d.line,
            d.column,
            d.severity,
            check,
            d.message,
        );
    }
}

//! CLI presentation: text and JSON rendering of command results.

use crate::baseline::{Baseline, BaselineSummary};
use crate::cli::parse::OutputFormat;
use crate::error::MonitorError;
use crate::sink::IntegrityReport;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use std::path::Path;

pub fn format_baseline_summary(summary: &BaselineSummary, location: &Path) -> String {
    format!(
        "Baseline reset:\n  Location: {}\n  Entries: {}\n  Checksums: {}\n  Permissions: {}",
        location.display(),
        summary.entries,
        summary.checksums,
        summary.permissions
    )
}

pub fn format_report(report: &IntegrityReport, format: OutputFormat) -> Result<String, MonitorError> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)?);
    }

    if report.is_clean() {
        return Ok(format!("{}  No drift detected.", report.timestamp));
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Type", "File", "Message", "Reference", "Observed"]);
    for alert in &report.integrity_alerts {
        table.add_row(vec![
            alert.kind.to_string(),
            alert.path.display().to_string(),
            alert.message.clone(),
            alert.reference.clone().unwrap_or_default(),
            alert.observed.clone().unwrap_or_default(),
        ]);
    }
    Ok(format!(
        "{}  {} alert(s)\n{}",
        report.timestamp,
        report.integrity_alerts.len(),
        table
    ))
}

pub fn format_baseline(baseline: &Baseline, format: OutputFormat) -> Result<String, MonitorError> {
    if format == OutputFormat::Json {
        let rows: Vec<serde_json::Value> = baseline
            .entries()
            .map(|e| {
                serde_json::json!({
                    "path": e.path,
                    "checksum": e.content_digest.map(|d| d.to_hex()),
                    "permissions": e.permission_mode.map(|m| m.to_string()),
                })
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&rows)?);
    }

    if baseline.is_empty() {
        return Ok("Baseline is empty.".to_string());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Path", "Checksum", "Permissions"]);
    for entry in baseline.entries() {
        table.add_row(vec![
            entry.path.display().to_string(),
            entry
                .content_digest
                .map(|d| d.to_hex())
                .unwrap_or_else(|| "-".to_string()),
            entry
                .permission_mode
                .map(|m| m.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    Ok(table.to_string())
}

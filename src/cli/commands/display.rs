//! Shared display helpers for compliance tables.
//!
//! These helpers are used by `status`, `hosts` and `checks` so severities
//! and timestamps render the same everywhere.

use chrono::{DateTime, Utc};

use crate::checks::Severity;
use crate::dashboard::{HostStatusRow, Summary};
use crate::ui::table::Align;
use crate::ui::{should_use_colors, Table, UserInterface, WreckingballTheme};

/// Return the icon for a severity.
pub fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Ok => "✓",
        Severity::Warning => "⚠",
        Severity::Error => "✗",
    }
}

/// Theme for table cells.
pub fn theme() -> WreckingballTheme {
    if should_use_colors() {
        WreckingballTheme::new()
    } else {
        WreckingballTheme::plain()
    }
}

/// Format a timestamp for tables.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

/// One row per check with its compliance counts.
pub fn summary_table(summary: &Summary, theme: &WreckingballTheme) -> Table {
    let mut table = Table::new(&["Check", "Compliant", "Non-compliant", "Unknown"])
        .align(1, Align::Right)
        .align(2, Align::Right)
        .align(3, Align::Right);

    for check in &summary.checks {
        let counts = &check.counts;
        let non_compliant = if counts.non_compliant > 0 {
            theme.format_severity(Severity::Error, &counts.non_compliant.to_string())
        } else {
            counts.non_compliant.to_string()
        };
        let unknown = if counts.unknown > 0 {
            theme.format_severity(Severity::Warning, &counts.unknown.to_string())
        } else {
            counts.unknown.to_string()
        };
        table.add_row(vec![
            check.label.clone(),
            counts.compliant.to_string(),
            non_compliant,
            unknown,
        ]);
    }
    table
}

/// One row per host of a per-check listing.
pub fn hosts_table(rows: &[HostStatusRow], theme: &WreckingballTheme) -> Table {
    let mut table = Table::new(&["Host", "ID", "Status", "Evaluated", "Detail"]);
    for row in rows {
        let status = format!("{} {}", severity_icon(row.severity), row.value.label());
        table.add_row(vec![
            row.host_name.clone(),
            row.host_id.to_string(),
            theme.format_severity(row.severity, &status),
            format_timestamp(&row.evaluated_at),
            row.detail.clone(),
        ]);
    }
    table
}

/// Print a line styled by severity.
pub fn show_severity_line(ui: &mut dyn UserInterface, severity: Severity, line: &str) {
    match severity {
        Severity::Ok => ui.success(line),
        Severity::Warning => ui.warning(line),
        Severity::Error => ui.error(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{CheckKind, StatusCode};
    use crate::dashboard::{CheckSummary, StatusCounts};
    use crate::host::HostId;
    use crate::ui::MockUI;
    use chrono::TimeZone;

    #[test]
    fn severity_icon_values() {
        assert_eq!(severity_icon(Severity::Ok), "✓");
        assert_eq!(severity_icon(Severity::Warning), "⚠");
        assert_eq!(severity_icon(Severity::Error), "✗");
    }

    #[test]
    fn timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        assert_eq!(format_timestamp(&at), "2024-03-09 14:05");
    }

    #[test]
    fn summary_table_has_row_per_check() {
        let summary = Summary {
            checks: vec![CheckSummary {
                kind: CheckKind::HardwareVersion,
                label: "Hardware version".to_string(),
                counts: StatusCounts {
                    compliant: 3,
                    non_compliant: 1,
                    unknown: 1,
                },
            }],
        };
        let table = summary_table(&summary, &WreckingballTheme::plain());
        assert_eq!(table.row_count(), 1);
        let output = table.render();
        assert!(output.contains("Hardware version"));
        assert!(output.contains("Non-compliant"));
    }

    #[test]
    fn hosts_table_shows_status_label() {
        let rows = vec![HostStatusRow {
            host_id: HostId::new("2"),
            host_name: "db01".to_string(),
            value: StatusCode::OutOfDate,
            severity: Severity::Error,
            detail: "vmx-10".to_string(),
            evaluated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }];
        let output = hosts_table(&rows, &WreckingballTheme::plain()).render();
        assert!(output.contains("db01"));
        assert!(output.contains(StatusCode::OutOfDate.label()));
        assert!(output.contains("✗"));
    }

    #[test]
    fn severity_line_routes_by_severity() {
        let mut ui = MockUI::new();
        show_severity_line(&mut ui, Severity::Ok, "fine");
        show_severity_line(&mut ui, Severity::Warning, "hmm");
        show_severity_line(&mut ui, Severity::Error, "bad");
        assert!(ui.has_success("fine"));
        assert!(ui.has_warning("hmm"));
        assert!(ui.has_error("bad"));
    }
}

pub mod grade;
pub mod init;
pub mod show;
pub mod validate;

use comfy_table::{Cell, Table};

use metagrade_core::report::DiagnosticReport;
use metagrade_core::statistics::QuadrantAggregate;

/// Quadrant summary table: one row for the whole exam, then one per part and group.
pub fn summary_table(report: &DiagnosticReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Scope",
        "Master",
        "Lucky",
        "Delusion",
        "Deficiency",
        "Purity",
        "Error resist.",
        "Calibration",
    ]);

    table.add_row(aggregate_row("All", &report.overall));
    for (part, agg) in &report.per_part {
        table.add_row(aggregate_row(&format!("Part {part}"), agg));
    }
    for (group, agg) in &report.per_group {
        table.add_row(aggregate_row(group, agg));
    }

    table
}

fn aggregate_row(scope: &str, agg: &QuadrantAggregate) -> Vec<Cell> {
    vec![
        Cell::new(scope),
        Cell::new(agg.master),
        Cell::new(agg.lucky),
        Cell::new(agg.delusion),
        Cell::new(agg.deficiency),
        Cell::new(format!("{:.1}%", agg.score_purity * 100.0)),
        Cell::new(format!("{:.1}%", agg.error_resistance * 100.0)),
        Cell::new(format!("{:.1}%", agg.calibration_accuracy * 100.0)),
    ]
}

//! HTML report generator.
//!
//! Produces a self-contained HTML file of tables with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use metagrade_core::report::DiagnosticReport;
use metagrade_core::statistics::QuadrantAggregate;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from a diagnostic report.
pub fn generate_html(report: &DiagnosticReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>metagrade report: {} / {}</title>\n",
        html_escape(&report.exam.name),
        html_escape(&report.learner)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Diagnostic report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Exam: <strong>{}</strong> {} | Learner: <strong>{}</strong> | {}/{} responses graded | {}</p>\n",
        html_escape(&report.exam.name),
        html_escape(&report.exam.version),
        html_escape(&report.learner),
        report.coverage.graded,
        report.coverage.responses,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Summary
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    push_aggregate_table(&mut html, "Scope", [("All".to_string(), &report.overall)]);

    if !report.per_part.is_empty() {
        html.push_str("<h2>By part</h2>\n");
        push_aggregate_table(
            &mut html,
            "Part",
            report.per_part.iter().map(|(p, a)| (format!("Part {p}"), a)),
        );
    }

    if !report.per_group.is_empty() {
        html.push_str("<h2>By group</h2>\n");
        push_aggregate_table(
            &mut html,
            "Group",
            report.per_group.iter().map(|(g, a)| (g.clone(), a)),
        );
    }
    html.push_str("</section>\n");

    // Per-item results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Items</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Item</th><th onclick=\"sortTable(1)\">Correct</th><th onclick=\"sortTable(2)\">Confidence</th><th onclick=\"sortTable(3)\">Quadrant</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for item in &report.items {
        let quadrant = item.quadrant();
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td title=\"{}\">{}</td></tr>\n",
            quadrant.to_string().to_lowercase(),
            item.id(),
            if item.is_correct() { "yes" } else { "no" },
            item.confidence(),
            quadrant.description(),
            quadrant
        ));
    }

    html.push_str("</tbody></table>\n");

    if !report.coverage.ungraded.is_empty() {
        let ids: Vec<String> = report
            .coverage
            .ungraded
            .iter()
            .map(|id| id.to_string())
            .collect();
        html.push_str(&format!(
            "<p class=\"meta\">Not graded (no answer key entry): {}</p>\n",
            ids.join(", ")
        ));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &DiagnosticReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn push_aggregate_table<'a>(
    html: &mut String,
    label: &str,
    rows: impl IntoIterator<Item = (String, &'a QuadrantAggregate)>,
) {
    html.push_str("<table class=\"summary\">\n");
    html.push_str(&format!(
        "<thead><tr><th>{}</th><th>Master</th><th>Lucky</th><th>Delusion</th><th>Deficiency</th><th>Purity</th><th>Error resistance</th><th>Calibration</th></tr></thead>\n",
        html_escape(label)
    ));
    html.push_str("<tbody>\n");
    for (name, a) in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"delusion\">{}</td><td>{}</td><td>{:.1}%</td><td>{:.1}%</td><td>{:.1}%</td></tr>\n",
            html_escape(&name),
            a.master,
            a.lucky,
            a.delusion,
            a.deficiency,
            a.score_purity * 100.0,
            a.error_resistance * 100.0,
            a.calibration_accuracy * 100.0,
        ));
    }
    html.push_str("</tbody></table>\n");
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --master: #dcfce7; --lucky: #fef9c3; --delusion: #fde2e2; --deficiency: #e0e7ff; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --master: #064e3b; --lucky: #713f12; --delusion: #7f1d1d; --deficiency: #312e81; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.master { background: var(--master); }
.lucky { background: var(--lucky); }
.delusion { background: var(--delusion); }
.deficiency { background: var(--deficiency); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

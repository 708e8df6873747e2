//! Plain-text rendering of a report as a fixed-width table.

use std::fmt::Write as _;

use seta_core::report::{ReportDocument, ReportRow};

/// Render `doc` with one line per period, a rule, then the total line.
///
/// Outcome columns follow the report's kind, so a verification report shows
/// green/amber/red and an enrollment report active/completed/withdrawn.
pub fn render(doc: &ReportDocument) -> String {
  let outcomes = doc.kind.outcomes();

  let mut header: Vec<String> = vec!["Period".into(), "Total".into()];
  header.extend(outcomes.iter().map(|o| capitalise(&o.to_string())));
  header.push("Unique".into());

  let cells = |row: &ReportRow| -> Vec<String> {
    let mut cells = vec![row.period_label.clone(), row.total.to_string()];
    cells.extend(outcomes.iter().map(|o| row.counts.get(*o).to_string()));
    cells.push(row.unique_subjects.to_string());
    cells
  };

  let body: Vec<Vec<String>> = doc.report.rows.iter().map(&cells).collect();
  let summary = cells(&doc.report.summary);

  let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
  for line in body.iter().chain(std::iter::once(&summary)) {
    for (w, cell) in widths.iter_mut().zip(line) {
      *w = (*w).max(cell.chars().count());
    }
  }

  let mut out = String::new();
  push_line(&mut out, &header, &widths);
  let rule = widths.iter().sum::<usize>() + 2 * (widths.len() - 1);
  let _ = writeln!(out, "{}", "-".repeat(rule));
  for line in &body {
    push_line(&mut out, line, &widths);
  }
  if !body.is_empty() {
    let _ = writeln!(out, "{}", "-".repeat(rule));
  }
  push_line(&mut out, &summary, &widths);
  out
}

/// First column left-aligned, counts right-aligned.
fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
  let line: Vec<String> = cells
    .iter()
    .zip(widths)
    .enumerate()
    .map(|(i, (cell, &w))| {
      if i == 0 {
        format!("{cell:<w$}")
      } else {
        format!("{cell:>w$}")
      }
    })
    .collect();
  let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

fn capitalise(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

use crate::scheduler::{AssignmentTable, AvailabilityReport, Candidate};
use chrono::{DateTime, FixedOffset, Utc};
use std::fmt::Write as _;

/// Permet de customiser le rendu des résultats (texte, markdown, etc.).
pub trait ReportRenderer {
    fn render_availability(&self, report: &AvailabilityReport) -> String;
    fn render_assignments(&self, table: &AssignmentTable) -> String;
}

/// Rendu texte brut pour le terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReport;

fn utc(at: DateTime<FixedOffset>) -> String {
    at.with_timezone(&Utc).format("%a %d %b %Y %H:%M UTC").to_string()
}

fn local(at: DateTime<FixedOffset>) -> String {
    at.format("%a %d %b %Y %H:%M %:z").to_string()
}

fn candidate_line(c: &Candidate) -> String {
    let mut line = format!(
        "        - {} <{}> from {} to {}",
        c.name,
        c.email,
        local(c.local_start),
        local(c.local_end)
    );
    if c.on_holiday() {
        let days: Vec<String> = c.holidays.iter().map(|d| d.to_string()).collect();
        let _ = write!(line, " (public holiday: {})", days.join(", "));
    }
    line
}

impl ReportRenderer for TextReport {
    fn render_availability(&self, report: &AvailabilityReport) -> String {
        let mut out = String::new();
        for t in &report.templates {
            let _ = writeln!(out, "Shift availability for shift {}:", t.template);
            if t.pool.is_empty() {
                let _ = writeln!(out, "    WARNING: no occurrence in the schedule window");
                continue;
            }
            for shift in &t.pool {
                let i = &shift.instance;
                let _ = writeln!(
                    out,
                    "  - Time: {} through {} ({})",
                    utc(i.start()),
                    utc(i.end()),
                    i.chronotype()
                );
                let _ = writeln!(out, "    Available people:");
                if shift.is_uncovered() {
                    let _ = writeln!(out, "        WARNING: no available people for this shift day");
                    continue;
                }
                for c in &shift.candidates {
                    let _ = writeln!(out, "{}", candidate_line(c));
                }
            }
        }
        let uncovered = report.uncovered();
        if uncovered > 0 {
            let _ = writeln!(
                out,
                "WARNING: found {uncovered} shift(s) without available oncalls"
            );
        }
        out
    }

    fn render_assignments(&self, table: &AssignmentTable) -> String {
        let mut out = String::from("Assignments:\n");
        for row in &table.rows {
            let who = match &row.assignee {
                Some(a) => format!("{} <{}>", a.name, a.email),
                None => "UNASSIGNED".to_string(),
            };
            let _ = writeln!(
                out,
                "  - {} {} through {} -> {}",
                row.template,
                utc(row.start),
                utc(row.end),
                who
            );
        }
        if table.unassigned > 0 {
            let _ = writeln!(out, "WARNING: {} shift(s) left unassigned", table.unassigned);
        }
        out
    }
}

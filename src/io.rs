use crate::scheduler::{AssignmentTable, AvailabilityReport, TemplateAvailability};
use anyhow::Context;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

#[derive(Serialize)]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    uncovered: usize,
    templates: &'a [TemplateAvailability],
    #[serde(skip_serializing_if = "Option::is_none")]
    assignments: Option<&'a AssignmentTable>,
}

/// Export JSON du rapport (jolie mise en forme), écrit de manière atomique.
pub fn export_report_json<P: AsRef<Path>>(
    path: P,
    report: &AvailabilityReport,
    assignments: Option<&AssignmentTable>,
    generated_at: DateTime<Utc>,
) -> anyhow::Result<()> {
    let doc = ReportDocument {
        generated_at,
        uncovered: report.uncovered(),
        templates: &report.templates,
        assignments,
    };
    let json = serde_json::to_vec_pretty(&doc)?;
    write_atomic(path.as_ref(), &json)
}

fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("atomic rename to {}", path.display()))?;
    Ok(())
}

/// Export CSV de l'éligibilité : une ligne par (occurrence, candidat).
///
/// Header `template,shift_id,start,end,chronotype,name,email,local_start_hour,local_end_hour,holidays` ;
/// une occurrence sans candidat a une ligne aux colonnes membre vides.
pub fn export_availability_csv<P: AsRef<Path>>(
    path: P,
    report: &AvailabilityReport,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "template",
        "shift_id",
        "start",
        "end",
        "chronotype",
        "name",
        "email",
        "local_start_hour",
        "local_end_hour",
        "holidays",
    ])?;
    let mut start_hour = itoa::Buffer::new();
    let mut end_hour = itoa::Buffer::new();
    for t in &report.templates {
        for shift in &t.pool {
            let i = &shift.instance;
            let start = i.start().to_rfc3339();
            let end = i.end().to_rfc3339();
            let chronotype = i.chronotype().to_string();
            let base = [
                t.template.as_str(),
                i.id().as_str(),
                start.as_str(),
                end.as_str(),
                chronotype.as_str(),
            ];
            if shift.is_uncovered() {
                w.write_record(base.iter().copied().chain(["", "", "", "", ""]))?;
                continue;
            }
            for c in &shift.candidates {
                let holidays = c
                    .holidays
                    .iter()
                    .map(|d| d.to_string())
                    .collect::<Vec<_>>()
                    .join(";");
                w.write_record(base.iter().copied().chain([
                    c.name.as_str(),
                    c.email.as_str(),
                    start_hour.format(c.start_hour()),
                    end_hour.format(c.end_hour()),
                    holidays.as_str(),
                ]))?;
            }
        }
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des assignations: header `template,shift_id,start,end,assignee,email`
pub fn export_assignments_csv<P: AsRef<Path>>(
    path: P,
    table: &AssignmentTable,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["template", "shift_id", "start", "end", "assignee", "email"])?;
    for row in &table.rows {
        let start = row.start.to_rfc3339();
        let end = row.end.to_rfc3339();
        let (name, email) = row
            .assignee
            .as_ref()
            .map(|a| (a.name.as_str(), a.email.as_str()))
            .unwrap_or(("", ""));
        w.write_record([
            row.template.as_str(),
            row.shift_id.as_str(),
            start.as_str(),
            end.as_str(),
            name,
            email,
        ])?;
    }
    w.flush()?;
    Ok(())
}

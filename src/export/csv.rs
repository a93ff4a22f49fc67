// src/export/csv.rs

use anyhow::{anyhow, Context, Result};

use crate::interventions::Intervention;

const HEADERS: [&str; 11] = [
    "id",
    "company_id",
    "title",
    "description",
    "client_name",
    "technician_name",
    "status",
    "priority",
    "scheduled_date",
    "created_at",
    "created_by",
];

/// Render interventions as a CSV document in memory.
pub fn interventions_csv(interventions: &[Intervention]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(HEADERS).context("write csv header")?;

    for row in interventions {
        writer
            .write_record([
                row.id.as_str(),
                row.company_id.as_str(),
                row.title.as_str(),
                row.description.as_deref().unwrap_or(""),
                row.client_name.as_deref().unwrap_or(""),
                row.technician_name.as_deref().unwrap_or(""),
                row.status.as_str(),
                row.priority.as_str(),
                row.scheduled_date.as_deref().unwrap_or(""),
                row.created_at.as_str(),
                row.created_by.as_deref().unwrap_or(""),
            ])
            .context("write csv row")?;
    }

    writer
        .into_inner()
        .map_err(|e| anyhow!("flush csv writer: {}", e))
}

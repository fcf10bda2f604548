//! ---
//! cb_section: "04-bench"
//! cb_subsection: "module"
//! cb_type: "source"
//! cb_scope: "code"
//! cb_description: "CSV and JSON export of status tables and telemetry history."
//! cb_version: "v0.1.0"
//! cb_owner: "tbd"
//! ---
use std::io::Write;

use chrono::{DateTime, Utc};

use crate::analytics::StatusRow;
use crate::errors::Result;
use crate::history::{TelemetryHistory, TelemetrySample};

pub fn export_status_csv<W: Write>(rows: &[StatusRow], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_status_json<W: Write>(rows: &[StatusRow], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writer.write_all(b"\n")?;
    Ok(())
}

pub fn export_history_csv<W: Write>(history: &TelemetryHistory, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for sample in history.iter() {
        writer.serialize(sample)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_history_json<W: Write>(history: &TelemetryHistory, mut writer: W) -> Result<()> {
    let samples: Vec<&TelemetrySample> = history.iter().collect();
    serde_json::to_writer_pretty(&mut writer, &samples)?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// `battery_test_<bench-slug>_<YYYYmmdd_HHMM>.<ext>`
pub fn export_file_name(bench: &str, at: DateTime<Utc>, extension: &str) -> String {
    let slug = slugify(bench);
    let slug = if slug.is_empty() { "bench".to_owned() } else { slug };
    format!(
        "battery_test_{}_{}.{}",
        slug,
        at.format("%Y%m%d_%H%M"),
        extension.trim_start_matches('.')
    )
}

fn slugify(input: &str) -> String {
    let mut slug = String::new();
    let mut previous_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            previous_dash = false;
        } else if matches!(ch, ' ' | '-' | '_' | '.' | '/') && !previous_dash && !slug.is_empty() {
            slug.push('-');
            previous_dash = true;
        }
    }
    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}

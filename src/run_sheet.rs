use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::timeline::{EntryKind, EntrySource, Timeline, TimelineEntry};

pub struct RunSheetReport {
    pub path: PathBuf,
    pub entries: usize,
    pub next_break: usize,
}

pub fn default_file_name(at: DateTime<Local>) -> String {
    format!("run_sheet_{}.xlsx", at.format("%Y%m%d_%H%M%S"))
}

/// Writes the timeline in display order plus the flagged next-break rundown.
pub fn export_run_sheet(timeline: &Timeline, path: &Path) -> Result<RunSheetReport> {
    let entries = timeline.display_order();
    let next_break = timeline.next_break_entries();

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Timeline")?;
        write_rows(sheet, &entry_rows(&entries))?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("NextBreak")?;
        write_rows(sheet, &entry_rows(&next_break))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(RunSheetReport {
        path: path.to_path_buf(),
        entries: entries.len(),
        next_break: next_break.len(),
    })
}

pub fn entry_rows(entries: &[&TimelineEntry]) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        "Period".to_string(),
        "Time".to_string(),
        "Type".to_string(),
        "Text".to_string(),
        "Source".to_string(),
        "Next Break".to_string(),
        "Entry ID".to_string(),
    ]];
    for entry in entries {
        rows.push(vec![
            entry.period.clone(),
            entry.timestamp.clone(),
            kind_label(entry.kind).to_string(),
            entry.text.clone(),
            source_label(entry.source).to_string(),
            if entry.in_next_break { "yes" } else { "" }.to_string(),
            entry.id.to_string(),
        ]);
    }
    rows
}

pub fn kind_label(kind: EntryKind) -> &'static str {
    match kind {
        EntryKind::Scoring => "Scoring",
        EntryKind::Infraction => "Infraction",
        EntryKind::Highlight => "Highlight",
        EntryKind::Storyline => "Storyline",
        EntryKind::Note => "Note",
    }
}

fn source_label(source: EntrySource) -> &'static str {
    match source {
        EntrySource::EventBar => "event_bar",
        EntrySource::Manual => "manual",
    }
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

use std::path::{Path, PathBuf};

use tracing::{debug, error, info, instrument, warn};

use crate::config::Config;
use crate::error::{Result, ToolError};
use crate::filter::ColumnFilter;
use crate::io::{excel_read, excel_write};
use crate::model::{MAX_COLS, MAX_ROWS, RowIndex, Sheet};

/// Source that could not be merged, with the reason it was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a merge run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Sources whose rows made it into the destination, in merge order.
    pub merged: Vec<PathBuf>,
    /// Sources that failed to load or did not fit.
    pub skipped: Vec<SkippedSource>,
    /// Rows in the destination sheet.
    pub rows: usize,
    /// Cells copied into the destination sheet.
    pub cells: usize,
}

/// Rows and cells contributed by a single source sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendSummary {
    pub first_row: RowIndex,
    pub rows: usize,
    pub cells: usize,
}

/// First row index that is free for the next append: one past the last
/// created row, or 0 for an empty sheet.
pub fn next_free_row(sheet: &Sheet) -> RowIndex {
    sheet.last_row().map_or(0, |last| last + 1)
}

/// Appends every non-null row of `source` below the current content of
/// `destination`.
///
/// A source row at index `i` lands at `next_free_row(destination) + i`, each
/// cell keeping its column. Cells rejected by `filter` are left unset, though
/// their row is still created. The destination is untouched when the source
/// does not fit in the worksheet grid.
pub fn append_sheet(
    destination: &mut Sheet,
    source: &Sheet,
    filter: &ColumnFilter,
) -> Result<AppendSummary> {
    let first_row = next_free_row(destination);

    if let Some(last) = source.last_row() {
        let end = u64::from(first_row) + u64::from(last);
        if end >= u64::from(MAX_ROWS) {
            return Err(ToolError::SheetLimit(format!(
                "appending {} rows at row {} exceeds {MAX_ROWS} rows",
                u64::from(last) + 1,
                first_row
            )));
        }
    }
    let widest = source.rows().filter_map(|(_, row)| row.last_col()).max();
    if let Some(col) = widest.filter(|col| *col >= MAX_COLS) {
        return Err(ToolError::SheetLimit(format!(
            "column {col} exceeds {MAX_COLS} columns"
        )));
    }

    let mut summary = AppendSummary {
        first_row,
        rows: 0,
        cells: 0,
    };

    for (src_idx, src_row) in source.rows() {
        let dest_row = destination.create_row(first_row + src_idx);
        summary.rows += 1;
        for (col, cell) in src_row.cells() {
            if filter.allows(src_idx, col) {
                dest_row.set(col, cell.clone());
                summary.cells += 1;
            }
        }
    }

    Ok(summary)
}

/// Merges the first sheet of every source, in order, into a new sheet.
///
/// Sources that cannot be read or do not fit are logged and skipped; the
/// remaining sources are still merged.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub fn merge_sources(sources: &[PathBuf], filter: &ColumnFilter) -> (Sheet, MergeReport) {
    let mut destination = Sheet::default();
    let mut report = MergeReport::default();

    for path in sources {
        match merge_source(&mut destination, path, filter) {
            Ok(summary) => {
                info!(
                    source = %path.display(),
                    first_row = summary.first_row,
                    rows = summary.rows,
                    cells = summary.cells,
                    "merged source workbook"
                );
                report.merged.push(path.clone());
            }
            Err(error) => {
                error!(
                    source = %path.display(),
                    %error,
                    "failed to merge source workbook, skipping"
                );
                report.skipped.push(SkippedSource {
                    path: path.clone(),
                    reason: error.to_string(),
                });
            }
        }
    }

    report.rows = destination.row_count();
    report.cells = destination.cell_count();
    (destination, report)
}

fn merge_source(
    destination: &mut Sheet,
    path: &Path,
    filter: &ColumnFilter,
) -> Result<AppendSummary> {
    let source = excel_read::read_first_sheet(path)?;
    debug!(source = %path.display(), sheet = source.name(), "read first sheet");
    append_sheet(destination, &source, filter)
}

/// Runs a full merge as described by `config` and writes the destination
/// workbook.
///
/// Only configuration and destination failures are returned as errors;
/// per-source failures end up in [`MergeReport::skipped`].
#[instrument(
    level = "info",
    skip_all,
    fields(dest = %config.dest_path.display())
)]
pub fn run(config: &Config) -> Result<MergeReport> {
    let filter = config.column_filter()?;
    if config.src_excel_path.is_empty() {
        warn!("no source workbooks configured, writing an empty sheet");
    }
    for path in &config.src_excel_path {
        debug!(source = %path.display(), "queued source workbook");
    }
    if let Some(pattern) = filter.pattern() {
        info!(pattern, "copying only cells whose address matches the filter");
    }

    let (destination, report) = merge_sources(&config.src_excel_path, &filter);

    excel_write::write_sheet(&config.dest_path, &destination).inspect_err(|error| {
        error!(dest = %config.dest_path.display(), %error, "failed to write destination workbook");
    })?;

    info!(
        merged = report.merged.len(),
        skipped = report.skipped.len(),
        rows = report.rows,
        cells = report.cells,
        "destination workbook written"
    );
    Ok(report)
}

use std::collections::BTreeMap;

/// Zero-based row index, matching the xlsx row numbering used by the writer.
pub type RowIndex = u32;
/// Zero-based column index.
pub type ColIndex = u16;

/// Number of rows an xlsx worksheet can hold.
pub const MAX_ROWS: u32 = 1_048_576;
/// Number of columns an xlsx worksheet can hold.
pub const MAX_COLS: u16 = 16_384;

/// Name given to the single sheet of the merged workbook.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Typed value held by a single cell. The variant decides how the cell is
/// written to the destination workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Plain string.
    Text(String),
    /// Numeric value without a date format.
    Number(f64),
    /// Excel serial of a numeric cell carrying a date or time format.
    Date(f64),
    /// Day count of a numeric cell carrying an elapsed-time format such as
    /// `[h]:mm:ss`.
    Duration(f64),
    /// Boolean literal.
    Bool(bool),
    /// Formula text without the leading `=`, plus the cached result if the
    /// source workbook stored one.
    Formula {
        formula: String,
        cached: Option<String>,
    },
    /// Cell that exists but holds no value.
    Blank,
    /// Excel error literal such as `#DIV/0!`.
    Error(String),
}

impl CellValue {
    /// Short name of the variant, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Text(_) => "string",
            CellValue::Number(_) => "numeric",
            CellValue::Date(_) => "date",
            CellValue::Duration(_) => "duration",
            CellValue::Bool(_) => "boolean",
            CellValue::Formula { .. } => "formula",
            CellValue::Blank => "blank",
            CellValue::Error(_) => "error",
        }
    }

    /// Renders the value the way Excel would show it in a formula result.
    /// Returns `None` for cells without a value.
    pub fn as_result_text(&self) -> Option<String> {
        match self {
            CellValue::Text(value) | CellValue::Error(value) => Some(value.clone()),
            CellValue::Number(value) | CellValue::Date(value) | CellValue::Duration(value) => {
                Some(value.to_string())
            }
            CellValue::Bool(true) => Some("TRUE".to_string()),
            CellValue::Bool(false) => Some("FALSE".to_string()),
            CellValue::Formula { cached, .. } => cached.clone(),
            CellValue::Blank => None,
        }
    }
}

/// A single row: cells keyed by column. Missing keys are null cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<ColIndex, CellValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the cell at `col`.
    pub fn set(&mut self, col: ColIndex, value: CellValue) {
        self.cells.insert(col, value);
    }

    pub fn get(&self, col: ColIndex) -> Option<&CellValue> {
        self.cells.get(&col)
    }

    /// Iterates over the non-null cells in column order.
    pub fn cells(&self) -> impl Iterator<Item = (ColIndex, &CellValue)> {
        self.cells.iter().map(|(col, value)| (*col, value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Index of the right-most non-null cell.
    pub fn last_col(&self) -> Option<ColIndex> {
        self.cells.keys().next_back().copied()
    }
}

/// A sheet: rows keyed by row index. Rows that were never created are null
/// rows; a created row may still be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    rows: BTreeMap<RowIndex, Row>,
}

impl Sheet {
    /// Creates an empty sheet with the provided name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the last created row, `None` for an empty sheet.
    pub fn last_row(&self) -> Option<RowIndex> {
        self.rows.keys().next_back().copied()
    }

    /// Number of created rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of non-null cells across all rows.
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(Row::len).sum()
    }

    pub fn row(&self, index: RowIndex) -> Option<&Row> {
        self.rows.get(&index)
    }

    /// Returns the row at `index`, creating an empty one when it is null.
    pub fn create_row(&mut self, index: RowIndex) -> &mut Row {
        self.rows.entry(index).or_default()
    }

    /// Convenience for setting a single cell, creating its row as needed.
    pub fn set_cell(&mut self, row: RowIndex, col: ColIndex, value: CellValue) {
        self.create_row(row).set(col, value);
    }

    pub fn cell(&self, row: RowIndex, col: ColIndex) -> Option<&CellValue> {
        self.row(row).and_then(|r| r.get(col))
    }

    /// Iterates over the created rows in order.
    pub fn rows(&self) -> impl Iterator<Item = (RowIndex, &Row)> {
        self.rows.iter().map(|(index, row)| (*index, row))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new(DEFAULT_SHEET_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sheet_has_no_last_row() {
        let sheet = Sheet::default();
        assert_eq!(sheet.last_row(), None);
        assert_eq!(sheet.name(), DEFAULT_SHEET_NAME);
        assert!(sheet.is_empty());
    }

    #[test]
    fn last_row_tracks_highest_created_row() {
        let mut sheet = Sheet::new("Data");
        sheet.set_cell(4, 0, CellValue::Text("later".into()));
        sheet.set_cell(1, 2, CellValue::Number(2.5));
        sheet.create_row(2);

        assert_eq!(sheet.last_row(), Some(4));
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.cell_count(), 2);
        assert_eq!(sheet.cell(1, 2), Some(&CellValue::Number(2.5)));
        assert!(sheet.row(2).is_some_and(Row::is_empty));
    }

    #[test]
    fn result_text_matches_excel_rendering() {
        assert_eq!(CellValue::Bool(true).as_result_text().as_deref(), Some("TRUE"));
        assert_eq!(CellValue::Number(3.0).as_result_text().as_deref(), Some("3"));
        assert_eq!(CellValue::Blank.as_result_text(), None);
    }
}

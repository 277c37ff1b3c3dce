use std::path::Path;

use calamine::{DataType, Range, Reader, open_workbook_auto};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::io::xlsx_blanks;
use crate::model::{CellValue, ColIndex, RowIndex, Sheet};

/// Reads the first sheet of the workbook at `path` into memory.
///
/// The workbook format is detected from the file extension (xlsx, xlsm, xlsb,
/// xls, ods). Cell positions are absolute, so a sheet whose data starts at
/// `C3` keeps row 2 and column 2 for that cell. Empty cells are not stored,
/// except for xlsx cells that exist in the file without a value, which are
/// stored as [`CellValue::Blank`].
pub fn read_first_sheet(path: &Path) -> Result<Sheet> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ToolError::EmptyWorkbook(path.to_path_buf()))?;

    let values = workbook
        .worksheet_range(&sheet_name)
        .ok_or_else(|| ToolError::EmptyWorkbook(path.to_path_buf()))??;

    let formulas = match workbook.worksheet_formula(&sheet_name) {
        Some(Ok(range)) => Some(range),
        Some(Err(error)) => {
            debug!(%error, sheet = %sheet_name, "formulas unavailable, copying cached values");
            None
        }
        None => None,
    };

    let mut sheet = Sheet::new(sheet_name);
    ingest_values(&values, &mut sheet)?;
    if let Some(formulas) = formulas {
        ingest_formulas(&formulas, &mut sheet)?;
    }
    if xlsx_blanks::is_xlsx(path) {
        match xlsx_blanks::first_sheet_blanks(path) {
            Ok(blanks) => ingest_blanks(&blanks, &mut sheet),
            Err(error) => debug!(%error, "blank cells unavailable, copying valued cells only"),
        }
    }

    debug!(
        rows = sheet.row_count(),
        cells = sheet.cell_count(),
        "source sheet loaded"
    );
    Ok(sheet)
}

fn ingest_values(range: &Range<DataType>, sheet: &mut Sheet) -> Result<()> {
    let Some(origin) = range.start() else {
        return Ok(());
    };

    for (row, col, cell) in range.cells() {
        let Some(value) = convert_cell(cell) else {
            continue;
        };
        let (row, col) = absolute_position(origin, row, col)?;
        sheet.set_cell(row, col, value);
    }

    Ok(())
}

fn ingest_formulas(range: &Range<String>, sheet: &mut Sheet) -> Result<()> {
    let Some(origin) = range.start() else {
        return Ok(());
    };

    for (row, col, formula) in range.cells() {
        let formula = formula.trim_start_matches('=');
        if formula.is_empty() {
            continue;
        }
        let (row, col) = absolute_position(origin, row, col)?;
        let cached = sheet
            .cell(row, col)
            .and_then(CellValue::as_result_text);
        sheet.set_cell(
            row,
            col,
            CellValue::Formula {
                formula: formula.to_string(),
                cached,
            },
        );
    }

    Ok(())
}

fn ingest_blanks(blanks: &[(RowIndex, ColIndex)], sheet: &mut Sheet) {
    for &(row, col) in blanks {
        if sheet.cell(row, col).is_none() {
            sheet.set_cell(row, col, CellValue::Blank);
        }
    }
}

fn convert_cell(cell: &DataType) -> Option<CellValue> {
    let value = match cell {
        DataType::Empty => return None,
        DataType::String(value) if value.is_empty() => CellValue::Blank,
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Int(value) => CellValue::Number(*value as f64),
        DataType::Float(value) => CellValue::Number(*value),
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::DateTime(serial) => CellValue::Date(*serial),
        DataType::Duration(serial) => CellValue::Duration(*serial),
        DataType::Error(error) => CellValue::Error(error.to_string()),
        other => CellValue::Text(other.to_string()),
    };
    Some(value)
}

fn absolute_position(
    origin: (u32, u32),
    row: usize,
    col: usize,
) -> Result<(RowIndex, ColIndex)> {
    let row = u32::try_from(row)
        .ok()
        .and_then(|row| origin.0.checked_add(row))
        .ok_or_else(|| ToolError::SheetLimit(format!("row offset {row} out of range")))?;
    let col = u32::try_from(col)
        .ok()
        .and_then(|col| origin.1.checked_add(col))
        .and_then(|col| ColIndex::try_from(col).ok())
        .ok_or_else(|| ToolError::SheetLimit(format!("column offset {col} out of range")))?;
    Ok((row, col))
}

#[cfg(test)]
mod tests {
    use calamine::{CellErrorType, Xlsx, open_workbook};
    use tempfile::tempdir;

    use super::*;
    use crate::io::excel_write;

    #[test]
    fn empty_cells_are_null() {
        assert_eq!(convert_cell(&DataType::Empty), None);
        assert_eq!(
            convert_cell(&DataType::String(String::new())),
            Some(CellValue::Blank)
        );
    }

    #[test]
    fn numbers_and_dates_keep_their_type() {
        assert_eq!(convert_cell(&DataType::Int(7)), Some(CellValue::Number(7.0)));
        assert_eq!(
            convert_cell(&DataType::DateTime(45000.5)),
            Some(CellValue::Date(45000.5))
        );
        assert_eq!(
            convert_cell(&DataType::Duration(1.5)),
            Some(CellValue::Duration(1.5))
        );
    }

    #[test]
    fn error_cells_survive_a_write() {
        let div0 = convert_cell(&DataType::Error(CellErrorType::Div0)).unwrap();
        let pending = convert_cell(&DataType::Error(CellErrorType::GettingData)).unwrap();
        assert_eq!(div0, CellValue::Error("#DIV/0!".into()));

        let mut sheet = Sheet::default();
        sheet.set_cell(0, 0, div0);
        sheet.set_cell(0, 1, pending);

        let temp_dir = tempdir().expect("temporary directory");
        let output = temp_dir.path().join("errors.xlsx");
        excel_write::write_sheet(&output, &sheet).expect("workbook written");

        let mut workbook: Xlsx<_> = open_workbook(&output).expect("workbook opened");
        let formulas = workbook
            .worksheet_formula("Sheet1")
            .expect("Sheet1 present")
            .expect("formulas read");
        assert_eq!(formulas.get_value((0, 0)).map(String::as_str), Some("#DIV/0!"));
        assert_ne!(formulas.get_value((0, 1)).map(String::as_str), Some("#GETTING_DATA"));

        let values = workbook
            .worksheet_range("Sheet1")
            .expect("Sheet1 present")
            .expect("values read");
        let cached = values.get_value((0, 0));
        assert!(
            matches!(cached, Some(DataType::Error(CellErrorType::Div0)))
                || matches!(cached, Some(DataType::String(text)) if text == "#DIV/0!"),
            "unexpected cached value {cached:?}"
        );
        assert_eq!(
            values.get_value((0, 1)),
            Some(&DataType::String("#GETTING_DATA".into()))
        );
    }

    #[test]
    fn valueless_cells_become_blank_without_replacing_values() {
        let mut sheet = Sheet::default();
        sheet.set_cell(0, 0, CellValue::Text("kept".into()));
        ingest_blanks(&[(0, 0), (1, 0)], &mut sheet);

        assert_eq!(sheet.cell(0, 0), Some(&CellValue::Text("kept".into())));
        assert_eq!(sheet.cell(1, 0), Some(&CellValue::Blank));
    }

    #[test]
    fn positions_are_shifted_by_range_origin() {
        assert_eq!(absolute_position((2, 3), 1, 1).unwrap(), (3, 4));
        assert!(absolute_position((0, 16_380), 0, 70_000).is_err());
    }
}

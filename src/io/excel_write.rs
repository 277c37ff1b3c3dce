use std::path::Path;

use rust_xlsxwriter::{Format, Formula, Workbook, Worksheet};

use crate::error::Result;
use crate::model::{CellValue, ColIndex, RowIndex, Sheet};

/// Number format applied to dates without a time part.
pub const DATE_FORMAT: &str = "yyyy-mm-dd";
/// Number format applied to dates carrying a time of day.
pub const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";
/// Number format applied to elapsed-time values.
pub const DURATION_FORMAT: &str = "[h]:mm:ss";

/// Error values Excel accepts as formula literals.
const ERROR_LITERALS: [&str; 7] = [
    "#NULL!", "#DIV/0!", "#VALUE!", "#REF!", "#NAME?", "#NUM!", "#N/A",
];

struct CellFormats {
    date: Format,
    datetime: Format,
    duration: Format,
    blank: Format,
}

/// Writes the provided sheet as the only worksheet of a new workbook.
///
/// Error cells holding one of the standard error literals are written as a
/// formula consisting of that literal, with the literal as cached result.
/// Other error codes, such as `#GETTING_DATA`, are written as text.
pub fn write_sheet(path: &Path, sheet: &Sheet) -> Result<()> {
    let mut workbook_writer = Workbook::new();
    let formats = CellFormats {
        date: Format::new().set_num_format(DATE_FORMAT),
        datetime: Format::new().set_num_format(DATETIME_FORMAT),
        duration: Format::new().set_num_format(DURATION_FORMAT),
        blank: Format::new(),
    };

    let worksheet = workbook_writer.add_worksheet();
    worksheet.set_name(sheet.name())?;

    for (row_idx, row) in sheet.rows() {
        for (col_idx, cell) in row.cells() {
            write_cell(worksheet, row_idx, col_idx, cell, &formats)?;
        }
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: RowIndex,
    col: ColIndex,
    cell: &CellValue,
    formats: &CellFormats,
) -> Result<()> {
    match cell {
        CellValue::Text(value) => {
            worksheet.write_string(row, col, value)?;
        }
        CellValue::Number(value) => {
            worksheet.write_number(row, col, *value)?;
        }
        CellValue::Date(serial) => {
            let format = if serial.fract() == 0.0 {
                &formats.date
            } else {
                &formats.datetime
            };
            worksheet.write_number_with_format(row, col, *serial, format)?;
        }
        CellValue::Duration(value) => {
            worksheet.write_number_with_format(row, col, *value, &formats.duration)?;
        }
        CellValue::Bool(value) => {
            worksheet.write_boolean(row, col, *value)?;
        }
        CellValue::Formula { formula, cached } => {
            let mut excel_formula = Formula::new(formula);
            if let Some(result) = cached {
                excel_formula = excel_formula.set_result(result);
            }
            worksheet.write_formula(row, col, excel_formula)?;
        }
        CellValue::Blank => {
            worksheet.write_blank(row, col, &formats.blank)?;
        }
        CellValue::Error(code) if ERROR_LITERALS.contains(&code.as_str()) => {
            let excel_formula = Formula::new(code).set_result(code);
            worksheet.write_formula(row, col, excel_formula)?;
        }
        CellValue::Error(code) => {
            worksheet.write_string(row, col, code)?;
        }
    }
    Ok(())
}

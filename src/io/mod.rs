//! Spreadsheet adapters: calamine on the reading side, rust_xlsxwriter on the
//! writing side, with a small zip/XML scan recovering styled blank cells that
//! calamine does not report. All of them speak the [`crate::model::Sheet`] grid.

pub mod excel_read;
pub mod excel_write;
pub mod xlsx_blanks;

//! Core library for the sheet-merger command line application.
//!
//! The tool concatenates the first sheet of several workbooks into a single
//! destination sheet. Configuration lives in [`config`], the in-memory grid in
//! [`model`], the address-based column filter in [`filter`], spreadsheet IO
//! adapters under [`io`], and the append/orchestration logic in [`merge`].

pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod merge;
pub mod model;

pub use error::{Result, ToolError};

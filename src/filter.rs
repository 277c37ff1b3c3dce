use regex::Regex;
use rust_xlsxwriter::utility::row_col_to_cell;

use crate::error::{Result, ToolError};
use crate::model::{ColIndex, RowIndex};

/// Decides which source cells are copied, based on their A1 address.
///
/// An empty pattern copies every cell. Otherwise the pattern has to match the
/// whole address, so `^(A|B).*` keeps columns A and B while `A` alone matches
/// nothing (addresses always carry a row number).
#[derive(Debug, Clone, Default)]
pub struct ColumnFilter {
    pattern: Option<(String, Regex)>,
}

impl ColumnFilter {
    /// Compiles the filter. Empty patterns yield an unrestricted filter.
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self::default());
        }

        let anchored = format!("^(?:{pattern})$");
        let regex = Regex::new(&anchored).map_err(|source| ToolError::InvalidFilter {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: Some((pattern.to_string(), regex)),
        })
    }

    /// Filter that copies every cell.
    pub fn all() -> Self {
        Self::default()
    }

    /// The pattern as configured, `None` when every cell is copied.
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(|(raw, _)| raw.as_str())
    }

    pub fn is_unrestricted(&self) -> bool {
        self.pattern.is_none()
    }

    /// Returns whether the cell at the given source position is copied.
    pub fn allows(&self, row: RowIndex, col: ColIndex) -> bool {
        match &self.pattern {
            Some((_, regex)) => regex.is_match(&row_col_to_cell(row, col)),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pattern_allows_everything() {
        let filter = ColumnFilter::new("").unwrap();
        assert!(filter.is_unrestricted());
        assert!(filter.allows(0, 0));
        assert!(filter.allows(999, 300));
    }

    #[test]
    fn column_prefix_pattern_selects_columns() {
        let filter = ColumnFilter::new("^(A|C).*").unwrap();
        assert!(filter.allows(0, 0)); // A1
        assert!(!filter.allows(0, 1)); // B1
        assert!(filter.allows(41, 2)); // C42
        assert_eq!(filter.pattern(), Some("^(A|C).*"));
    }

    #[test]
    fn pattern_must_match_whole_address() {
        let filter = ColumnFilter::new("B").unwrap();
        assert!(!filter.allows(0, 1));

        let filter = ColumnFilter::new("B[0-9]+").unwrap();
        assert!(filter.allows(0, 1));
        assert!(!filter.allows(0, 27)); // AB1
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let error = ColumnFilter::new("^(A").unwrap_err();
        assert!(matches!(error, ToolError::InvalidFilter { .. }));
    }
}

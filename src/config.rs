use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ToolError};
use crate::filter::ColumnFilter;

/// Configuration file used when no `--config` argument is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Merge settings loaded from YAML.
///
/// ```yaml
/// dest_path: merged.xlsx
/// copy_column: "^(A|B|C).*"
/// src_excel_path:
///   - january.xlsx
///   - february.xlsx
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Workbook written once every source has been merged.
    pub dest_path: PathBuf,
    /// Pattern matched against source cell addresses. Absent or empty copies
    /// every cell.
    #[serde(default)]
    pub copy_column: Option<String>,
    /// Source workbooks, merged in order.
    #[serde(default)]
    pub src_excel_path: Vec<PathBuf>,
}

impl Config {
    /// Reads and parses the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }

    /// Parses a configuration document and validates the column filter.
    pub fn from_yaml(source: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(source)?;
        config.column_filter()?;
        Ok(config)
    }

    /// Replaces the destination and filter with values given on the command
    /// line, when present.
    pub fn with_overrides(
        mut self,
        dest_path: Option<PathBuf>,
        copy_column: Option<String>,
    ) -> Self {
        if let Some(dest_path) = dest_path {
            self.dest_path = dest_path;
        }
        if copy_column.is_some() {
            self.copy_column = copy_column;
        }
        self
    }

    /// Compiles the configured column filter.
    pub fn column_filter(&self) -> Result<ColumnFilter> {
        ColumnFilter::new(self.copy_column.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let yaml = "dest_path: out/merged.xlsx\n\
                    copy_column: \"^(A|B).*\"\n\
                    src_excel_path:\n  - a.xlsx\n  - b.xlsx\n";
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.dest_path, PathBuf::from("out/merged.xlsx"));
        assert_eq!(config.copy_column.as_deref(), Some("^(A|B).*"));
        assert_eq!(
            config.src_excel_path,
            vec![PathBuf::from("a.xlsx"), PathBuf::from("b.xlsx")]
        );
    }

    #[test]
    fn missing_or_null_filter_copies_everything() {
        let config = Config::from_yaml("dest_path: merged.xlsx\ncopy_column:\n").unwrap();
        assert!(config.column_filter().unwrap().is_unrestricted());
        assert!(config.src_excel_path.is_empty());

        let config = Config::from_yaml("dest_path: merged.xlsx\ncopy_column: ''\n").unwrap();
        assert!(config.column_filter().unwrap().is_unrestricted());
    }

    #[test]
    fn rejects_invalid_filter_and_unknown_keys() {
        let error = Config::from_yaml("dest_path: merged.xlsx\ncopy_column: '(A'\n").unwrap_err();
        assert!(matches!(error, ToolError::InvalidFilter { .. }));

        let error = Config::from_yaml("dest_path: merged.xlsx\nsheet: 2\n").unwrap_err();
        assert!(matches!(error, ToolError::Config(_)));
    }

    #[test]
    fn overrides_replace_configured_values() {
        let config = Config::from_yaml("dest_path: merged.xlsx\ncopy_column: '^(A).*'\n")
            .unwrap()
            .with_overrides(Some(PathBuf::from("other.xlsx")), None);
        assert_eq!(config.dest_path, PathBuf::from("other.xlsx"));
        assert_eq!(config.copy_column.as_deref(), Some("^(A).*"));

        let config = config.with_overrides(None, Some(String::new()));
        assert!(config.column_filter().unwrap().is_unrestricted());
    }

    #[test]
    fn load_reports_missing_file() {
        let error = Config::load(Path::new("does/not/exist.yaml")).unwrap_err();
        assert!(matches!(error, ToolError::MissingInput(_)));
    }
}

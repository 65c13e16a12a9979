//! Writers turning collected records into result files.

pub mod delimited;
pub mod html;
pub mod json;
pub mod spreadsheet;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScrapeError;
use crate::results::ProductRecord;

pub use delimited::write_csv;
pub use html::write_html;
pub use json::write_json;
pub use spreadsheet::write_xlsx;

/// Column headers shared by every tabular format
pub const HEADERS: [&str; 6] = [
    "Название",
    "Цена",
    "Валюта",
    "Ссылка",
    "Наличие",
    "Статус наличия",
];

pub const DEFAULT_STEM: &str = "results";

/// Files written by [`save_all`], `None` where nothing was written
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub xlsx: Option<PathBuf>,
    pub html: Option<PathBuf>,
}

impl ExportPaths {
    pub fn written(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.csv, &self.json, &self.xlsx, &self.html]
            .into_iter()
            .flatten()
    }
}

/// Write every format into `dir`, creating it if needed
pub fn save_all(records: &[ProductRecord], dir: &Path) -> Result<ExportPaths, ScrapeError> {
    if records.is_empty() {
        ::log::warn!("No records to save");
        return Ok(ExportPaths::default());
    }

    fs::create_dir_all(dir)?;
    let path_for = |extension: &str| dir.join(format!("{}.{}", DEFAULT_STEM, extension));

    let paths = ExportPaths {
        csv: write_csv(records, &path_for("csv"))?,
        json: write_json(records, &path_for("json"))?,
        xlsx: write_xlsx(records, &path_for("xlsx"))?,
        html: write_html(records, &path_for("html"))?,
    };

    for path in paths.written() {
        ::log::info!("Saved {} records to {}", records.len(), path.display());
    }
    Ok(paths)
}

/// Copy of `record` with empty fields replaced by the placeholder
pub(crate) fn normalized(record: &ProductRecord) -> ProductRecord {
    let [name, price, currency, url, instock_text, instock_schema] =
        record.fields().map(str::to_string);
    ProductRecord {
        name,
        price,
        currency,
        url,
        instock_text,
        instock_schema,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::PLACEHOLDER;
    use tempfile::tempdir;

    #[test]
    fn test_save_all_writes_every_format() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested").join("output");

        let paths = save_all(&test_records::sample(), &out).unwrap();

        assert_eq!(paths.written().count(), 4);
        assert_eq!(paths.csv, Some(out.join("results.csv")));
        assert_eq!(paths.json, Some(out.join("results.json")));
        assert_eq!(paths.html, Some(out.join("results.html")));
        for path in paths.written() {
            assert!(path.exists(), "{} missing", path.display());
        }
    }

    #[test]
    fn test_save_all_skips_empty_input() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("output");

        let paths = save_all(&[], &out).unwrap();

        assert_eq!(paths, ExportPaths::default());
        assert!(!out.exists());
    }

    #[test]
    fn test_normalized_fills_empty_fields() {
        let record = normalized(&test_records::sample()[1]);
        assert_eq!(record.price, PLACEHOLDER);
        assert_eq!(record.name, "Lamp \"A&B\" <mini>");
    }
}

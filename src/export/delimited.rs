use std::path::{Path, PathBuf};

use crate::error::ScrapeError;
use crate::export::HEADERS;
use crate::results::ProductRecord;

/// Write records as UTF-8 CSV with the localized header row
pub fn write_csv(records: &[ProductRecord], path: &Path) -> Result<Option<PathBuf>, ScrapeError> {
    if records.is_empty() {
        ::log::warn!("No records to write to {}", path.display());
        return Ok(None);
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(HEADERS)?;
    for record in records {
        writer.write_record(record.fields())?;
    }
    writer.flush()?;

    Ok(Some(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_records;
    use crate::results::PLACEHOLDER;
    use tempfile::tempdir;

    #[test]
    fn test_writes_header_and_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");

        write_csv(&test_records::sample(), &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, HEADERS);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "2 490руб.");
        assert_eq!(&rows[1][0], "Lamp \"A&B\" <mini>");
        assert_eq!(&rows[1][1], PLACEHOLDER);
        assert_eq!(&rows[1][3], "https://www.divan.ru/product/mini?a=1&b=2");
    }

    #[test]
    fn test_empty_input_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("results.csv");

        assert_eq!(write_csv(&[], &path).unwrap(), None);
        assert!(!path.exists());
    }
}

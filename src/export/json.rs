use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::ScrapeError;
use crate::export::normalized;
use crate::results::ProductRecord;

/// Write records as a pretty-printed JSON array
pub fn write_json(records: &[ProductRecord], path: &Path) -> Result<Option<PathBuf>, ScrapeError> {
    if records.is_empty() {
        ::log::warn!("No records to write to {}", path.display());
        return Ok(None);
    }

    let records: Vec<ProductRecord> = records.iter().map(normalized).collect();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.flush()?;

    Ok(Some(path.to_path_buf()))
}

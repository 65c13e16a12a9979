use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::error::ScrapeError;
use crate::export::HEADERS;
use crate::results::ProductRecord;

const SHEET_NAME: &str = "Товары";
const COLUMN_WIDTHS: [f64; 6] = [50.0, 15.0, 10.0, 60.0, 25.0, 35.0];

/// Write records to a single-sheet workbook.
///
/// When `path` cannot be written, usually because the file is open elsewhere,
/// the workbook is saved once more next to it under a timestamped name.
pub fn write_xlsx(records: &[ProductRecord], path: &Path) -> Result<Option<PathBuf>, ScrapeError> {
    if records.is_empty() {
        ::log::warn!("No records to write to {}", path.display());
        return Ok(None);
    }

    let mut workbook = build_workbook(records)?;
    match workbook.save(path) {
        Ok(()) => Ok(Some(path.to_path_buf())),
        Err(e) => {
            let fallback = timestamped_path(path);
            ::log::warn!(
                "Could not write {} ({}), saving to {} instead",
                path.display(),
                e,
                fallback.display()
            );
            workbook.save(&fallback)?;
            Ok(Some(fallback))
        }
    }
}

fn build_workbook(records: &[ProductRecord]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, (header, width)) in HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, *header, &bold)?;
        worksheet.set_column_width(col, width)?;
    }

    for (row, record) in records.iter().enumerate() {
        for (col, value) in record.fields().iter().enumerate() {
            worksheet.write_string(row as u32 + 1, col as u16, *value)?;
        }
    }

    Ok(workbook)
}

/// `results.xlsx` becomes `results_<unix seconds>.xlsx`
fn timestamped_path(path: &Path) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| crate::export::DEFAULT_STEM.to_string());
    path.with_file_name(format!("{}_{}.xlsx", stem, stamp))
}

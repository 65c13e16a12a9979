use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ScrapeError;
use crate::export::HEADERS;
use crate::results::ProductRecord;

const URL_COLUMN: usize = 3;

const STYLE: &str = "body { font-family: sans-serif; margin: 20px; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f2f2f2; }
tr:nth-child(even) { background-color: #fafafa; }";

/// Write records as a standalone HTML table
pub fn write_html(records: &[ProductRecord], path: &Path) -> Result<Option<PathBuf>, ScrapeError> {
    if records.is_empty() {
        ::log::warn!("No records to write to {}", path.display());
        return Ok(None);
    }

    fs::write(path, render_table(records))?;
    Ok(Some(path.to_path_buf()))
}

pub fn render_table(records: &[ProductRecord]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"ru\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Товары</title>\n<style>\n");
    html.push_str(STYLE);
    html.push_str("\n</style>\n</head>\n<body>\n<table>\n<thead>\n<tr>");
    for header in HEADERS {
        html.push_str(&format!("<th>{}</th>", escape(header)));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for record in records {
        html.push_str("<tr>");
        for (col, value) in record.fields().iter().enumerate() {
            let value = escape(value);
            if col == URL_COLUMN {
                html.push_str(&format!(
                    "<td><a href=\"{0}\" target=\"_blank\">{0}</a></td>",
                    value
                ));
            } else {
                html.push_str(&format!("<td>{}</td>", value));
            }
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

/// Escape text for use in element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

//! File-level import
//!
//! Materializes sheets from CSV and XLSX exports and feeds them through the
//! record extractor. Every sheet of a multi-sheet workbook is parsed
//! independently and the accepted records concatenated (and re-deduplicated
//! on merge).

use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use tracing::info;

use crate::error::{Error, Result};
use crate::extract::{detect_processor, extract_sheet, ExtractOutcome, Sheet};
use crate::models::Processor;

/// Read raw CSV rows without header interpretation.
///
/// The extractor derives headers itself so the title-row skip heuristic can
/// re-derive them from the second line.
pub fn read_csv_rows<R: Read>(reader: R) -> Result<Vec<Vec<String>>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(rows)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Materialize every sheet of a file. CSV files yield one unnamed sheet;
/// workbooks yield one named sheet each.
pub fn sheets_from_path(path: &Path) -> Result<Vec<Sheet>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    if matches!(extension.as_deref(), Some("xlsx") | Some("xls") | Some("xlsb")) {
        let mut workbook = open_workbook_auto(path)?;
        let mut sheets = Vec::new();
        for (name, range) in workbook.worksheets() {
            let rows: Vec<Vec<String>> = range
                .rows()
                .map(|row| row.iter().map(cell_to_string).collect())
                .collect();
            if let Some(sheet) = Sheet::from_rows(Some(name), rows) {
                sheets.push(sheet);
            }
        }
        Ok(sheets)
    } else {
        let file = std::fs::File::open(path)?;
        let rows = read_csv_rows(file)?;
        Sheet::from_rows(None, rows)
            .map(|s| vec![s])
            .ok_or_else(|| Error::Import(format!("{} is empty", path.display())))
    }
}

/// Import one export file into canonical records.
///
/// The processor comes from the caller or is auto-detected from the
/// filename; ambiguous filenames are an error, never a guess.
pub fn import_file(
    path: &Path,
    processor: Option<Processor>,
    explicit_month: Option<&str>,
) -> Result<ExtractOutcome> {
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let processor = match processor.or_else(|| detect_processor(&filename)) {
        Some(p) => p,
        None => {
            return Err(Error::UnsupportedProcessor(format!(
                "could not detect a processor from {:?}; pass one explicitly",
                filename
            )))
        }
    };

    let sheets = sheets_from_path(path)?;
    let mut outcome = ExtractOutcome::default();
    for sheet in &sheets {
        outcome.merge(extract_sheet(
            sheet,
            processor,
            explicit_month,
            Some(&filename),
        ));
    }

    info!(
        "Imported {}: {} records, {} errors, {} warnings",
        filename,
        outcome.records.len(),
        outcome.errors.len(),
        outcome.warnings.len()
    );
    Ok(outcome)
}

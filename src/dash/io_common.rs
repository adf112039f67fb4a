use std::collections::HashMap;

use crate::dash::{io_csv::read_csv_table, io_xlsx::read_excel_table, *};

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

pub fn detect_format(path: &str) -> DashResult<FileFormat> {
    let ext = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") => Ok(FileFormat::Csv),
        Some("xlsx") | Some("xlsm") => Ok(FileFormat::Xlsx),
        _ => UnsupportedFormatSnafu { path }.fail(),
    }
}

/// Reads a spreadsheet into a table, choosing the reader from the extension.
pub fn read_table(path: &str, worksheet: Option<&str>) -> DashResult<Table> {
    info!("Attempting to read table {:?}", path);
    let table = match detect_format(path)? {
        FileFormat::Csv => read_csv_table(path)?,
        FileFormat::Xlsx => read_excel_table(path, worksheet)?,
    };
    info!(
        "read_table: {}: {} rows, {} columns",
        simplify_file_name(path),
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Cleans up the names of the first row: blank names become `Unnamed: <i>`
/// and repeated names get a `.1`, `.2`, ... suffix.
pub fn normalize_header(raw: &[String]) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut res: Vec<String> = Vec::with_capacity(raw.len());
    for (idx, name) in raw.iter().enumerate() {
        let name = name.trim_start_matches('\u{feff}').trim();
        let name = if name.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            name.to_string()
        };
        let seen = counts.entry(name.clone()).or_insert(0);
        if *seen == 0 {
            res.push(name);
        } else {
            res.push(format!("{}.{}", name, seen));
        }
        *seen += 1;
    }
    res
}

/// Fails unless the table has every one of the given columns.
pub fn require_columns(table: &Table, columns: &[String], path: &str) -> DashResult<()> {
    for c in columns {
        ensure!(
            table.column_index(c).is_some(),
            SchemaMismatchSnafu {
                path,
                column: c.clone()
            }
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_cleanup() {
        let raw: Vec<String> = ["\u{feff}gerencia", "Q1", "", "Q1", " Q2 "]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            normalize_header(&raw),
            vec!["gerencia", "Q1", "Unnamed: 2", "Q1.1", "Q2"]
        );
    }

    #[test]
    fn formats_from_extension() {
        assert_eq!(detect_format("a/b/base_2023.XLSX").unwrap(), FileFormat::Xlsx);
        assert_eq!(detect_format("comentarios.csv").unwrap(), FileFormat::Csv);
        assert!(matches!(
            detect_format("notes.txt"),
            Err(DashError::UnsupportedFormat { .. })
        ));
        assert_eq!(simplify_file_name("/tmp/x/base_2023.csv"), "base_2023.csv");
    }
}

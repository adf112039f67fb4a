// Primitives for reading CSV files.

use survey_compare::builder::TableBuilder;

use crate::dash::{io_common::normalize_header, *};

/// Reads a CSV file with one header row.
///
/// CSV has no types: every non-blank field is kept as text and only read as
/// a number when it is used as a metric.
pub fn read_csv_table(path: &str) -> DashResult<Table> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;
    let mut records = rdr.into_records();

    let header_raw = records
        .next()
        .context(EmptyFileSnafu { path })?
        .context(CsvLineParseSnafu { path, lineno: 1usize })?;
    let header: Vec<String> = header_raw.iter().map(|s| s.to_string()).collect();
    let header = normalize_header(&header);
    debug!("read_csv_table: header: {:?}", header);

    let mut builder = TableBuilder::new(&header);
    for (idx, line_r) in records.enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        if line.len() > header.len() {
            warn!(
                "read_csv_table: {}: line {} has {} fields, only {} are kept",
                path,
                lineno,
                line.len(),
                header.len()
            );
        }
        let fields: Vec<&str> = line.iter().collect();
        builder.add_row_simple(&fields);
    }
    Ok(builder.build())
}

// CSV downloads: same layout as the tables on screen, UTF-8.

use std::io;

use crate::dash::*;

/// Comparison tables keep their row index as the first column.
pub fn comparison_csv<W: io::Write>(w: W, t: &ComparisonTable) -> Result<W, csv::Error> {
    let mut wtr = csv::Writer::from_writer(w);
    let mut header: Vec<&str> = vec![t.index_name.as_str()];
    header.extend(t.columns.iter().map(|s| s.as_str()));
    wtr.write_record(&header)?;
    for (label, values) in t.rows.iter() {
        let mut record: Vec<String> = vec![label.clone()];
        record.extend(values.iter().map(|v| v.to_string()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    wtr.into_inner().map_err(|e| e.into_error().into())
}

/// Filtered comment and sentiment tables are written without an index.
pub fn table_csv<W: io::Write>(w: W, t: &Table) -> Result<W, csv::Error> {
    let mut wtr = csv::Writer::from_writer(w);
    wtr.write_record(t.columns())?;
    for row in t.rows() {
        wtr.write_record(row.iter().map(|c| c.to_string()))?;
    }
    wtr.flush()?;
    wtr.into_inner().map_err(|e| e.into_error().into())
}

pub fn export_comparison(path: &str, t: &ComparisonTable) -> DashResult<()> {
    let f = fs::File::create(path).context(WritingOutputSnafu { path })?;
    comparison_csv(f, t).context(WritingCsvSnafu { path })?;
    info!("export_comparison: {} rows written to {:?}", t.rows.len(), path);
    Ok(())
}

pub fn export_table(path: &str, t: &Table) -> DashResult<()> {
    let f = fs::File::create(path).context(WritingOutputSnafu { path })?;
    table_csv(f, t).context(WritingCsvSnafu { path })?;
    info!("export_table: {} rows written to {:?}", t.len(), path);
    Ok(())
}

// Primitives for reading Excel workbooks.

use calamine::DataType;

use survey_compare::builder::TableBuilder;

use crate::dash::{io_common::normalize_header, *};

/// Reads a worksheet with one header row. Without a worksheet name, the
/// first worksheet of the workbook is used.
pub fn read_excel_table(path: &str, worksheet: Option<&str>) -> DashResult<Table> {
    let wrange = get_range(path, worksheet)?;

    let mut iter = wrange.rows();
    let header_raw = iter.next().context(EmptyFileSnafu { path })?;
    let header: Vec<String> = header_raw.iter().map(read_header_cell).collect();
    let header = normalize_header(&header);
    debug!("read_excel_table: header: {:?}", header);

    let mut builder = TableBuilder::new(&header);
    for row in iter {
        let cells: Vec<Cell> = row.iter().map(read_cell).collect();
        // Formatting can extend the used range with rows that hold nothing.
        if cells.iter().all(|c| *c == Cell::Missing) {
            continue;
        }
        builder.add_row(cells);
    }
    debug!("read_excel_table: {} data rows", builder.num_rows());
    Ok(builder.build())
}

fn get_range(path: &str, worksheet: Option<&str>) -> DashResult<calamine::Range<DataType>> {
    debug!("read_excel_table: path: {:?} worksheet: {:?}", path, worksheet);
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    match worksheet {
        // A worksheet name was provided, use it.
        Some(worksheet_name) => workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                path,
                worksheet: worksheet_name,
            })?
            .context(OpeningExcelSnafu { path }),
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyFileSnafu { path })?
            .context(OpeningExcelSnafu { path }),
    }
}

pub fn read_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Float(f) => Cell::Number(*f),
        DataType::DateTime(f) => Cell::Number(*f),
        DataType::String(s) if s.trim().is_empty() => Cell::Missing,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Bool(b) => Cell::Text(b.to_string()),
        // Empty cells and formula errors (#N/A, #DIV/0!, ...)
        _ => Cell::Missing,
    }
}

fn read_header_cell(cell: &DataType) -> String {
    match read_cell(cell) {
        Cell::Missing => String::new(),
        c => c.to_string(),
    }
}

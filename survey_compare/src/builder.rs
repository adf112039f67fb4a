pub use crate::config::*;

/// A builder for assembling a table row by row.
///
/// Readers produce raw strings or typed cells; the builder takes care of the
/// row width.
///
/// ```
/// use survey_compare::builder::TableBuilder;
/// use survey_compare::Cell;
///
/// let mut builder = TableBuilder::new(&["gerencia".to_string(), "Q1".to_string()]);
/// builder.add_row_simple(&["North", "80"]);
/// builder.add_row(vec![Cell::from("South"), Cell::from(60.0)]);
/// let table = builder.build();
///
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.get(0, "Q1").and_then(|c| c.parse_number()), Some(80.0));
/// ```
pub struct TableBuilder {
    pub(crate) _columns: Vec<String>,
    pub(crate) _rows: Vec<Vec<Cell>>,
}

impl TableBuilder {
    pub fn new(columns: &[String]) -> TableBuilder {
        TableBuilder {
            _columns: columns.to_vec(),
            _rows: Vec::new(),
        }
    }

    /// Adds a row of raw strings, as found in a CSV file.
    ///
    /// Blank strings are missing values, everything else is kept as text.
    /// Numeric reading happens later, when a value is used as a metric.
    pub fn add_row_simple(&mut self, cells: &[&str]) {
        let row: Vec<Cell> = cells
            .iter()
            .map(|s| {
                if s.trim().is_empty() {
                    Cell::Missing
                } else {
                    Cell::Text(s.to_string())
                }
            })
            .collect();
        self.add_row(row)
    }

    /// Adds a row of typed cells.
    pub fn add_row(&mut self, cells: Vec<Cell>) {
        self._rows.push(cells);
    }

    pub fn num_rows(&self) -> usize {
        self._rows.len()
    }

    pub fn build(self) -> Table {
        let mut table = Table::new(self._columns);
        for row in self._rows {
            table.push_row(row);
        }
        table
    }
}

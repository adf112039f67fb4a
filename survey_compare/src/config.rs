// ********* Input data structures ***********

use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;

/// The literal marker used in the survey exports for a suppressed value
/// (usually too few respondents to publish a percentage).
pub const SENTINEL: &str = "**";

/// A single value in a table, as read from a spreadsheet.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// The value as a grouping key (unit names, question labels).
    ///
    /// Whole numbers are printed without a fractional part so that a unit
    /// named `2023` in a spreadsheet matches the text `"2023"`.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Cell::Text(s) => Some(s.clone()),
            Cell::Number(n) => Some(format_number_key(*n)),
            Cell::Missing => None,
        }
    }

    /// Strict numeric reading. The sentinel, blank text, non-numeric text and
    /// non-finite numbers are all `None`.
    pub fn parse_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Number(_) => None,
            Cell::Text(s) => {
                let s = s.trim();
                if s.is_empty() || s == SENTINEL {
                    return None;
                }
                s.parse::<f64>().ok().filter(|x| x.is_finite())
            }
            Cell::Missing => None,
        }
    }

    /// Lossy metric reading: anything that is not a number counts as 0.
    pub fn to_metric(&self) -> f64 {
        self.parse_number().unwrap_or(0.0)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Number(n) => write!(f, "{}", format_number_key(*n)),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Missing => Ok(()),
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Cell {
        Cell::Number(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }
}

fn format_number_key(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// An ordered table of cells with named, ordered columns.
///
/// Every row has exactly one cell per column. By convention the first column
/// of a survey table holds the unit key.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Table {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, CompareErrors> {
        self.column_index(name)
            .ok_or_else(|| CompareErrors::SchemaMismatch {
                column: name.to_string(),
            })
    }

    /// Appends a row. Short rows are padded with missing cells, long rows
    /// are cut to the number of columns.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Missing);
        self.rows.push(row);
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// The distinct keys of a column, in order of first appearance.
    pub fn distinct_values(&self, column: &str) -> Result<Vec<String>, CompareErrors> {
        let idx = self.require_column(column)?;
        let mut seen: HashSet<String> = HashSet::new();
        let mut res: Vec<String> = Vec::new();
        for row in self.rows.iter() {
            if let Some(k) = row[idx].as_key() {
                if seen.insert(k.clone()) {
                    res.push(k);
                }
            }
        }
        Ok(res)
    }

    /// The same table, with a column renamed. Unknown columns are ignored.
    pub fn with_column_renamed(&self, from: &str, to: &str) -> Table {
        let mut res = self.clone();
        if let Some(idx) = self.column_index(from) {
            res.columns[idx] = to.to_string();
        }
        res
    }

    /// A new table with the same columns and the given rows.
    pub(crate) fn with_rows(&self, rows: Vec<Vec<Cell>>) -> Table {
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }
}

/// A survey table tagged with the cycle it comes from.
#[derive(PartialEq, Debug, Clone)]
pub struct CycleTable {
    /// The cycle label, for example "2023".
    pub label: String,
    /// The name of the column holding the unit key.
    pub unit_key: String,
    pub table: Table,
}

/// A free-text sheet (comments, sentiment scores) with its validated schema.
#[derive(PartialEq, Debug, Clone)]
pub struct SheetTable {
    pub unit_column: String,
    pub question_column: String,
    pub text_column: String,
    pub table: Table,
}

/// A choice of values made by the user, with an optional "select all" toggle.
///
/// An empty explicit selection without the toggle selects nothing.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Selection {
    pub explicit: Vec<String>,
    pub select_all: bool,
}

impl Selection {
    pub fn all() -> Selection {
        Selection {
            explicit: Vec::new(),
            select_all: true,
        }
    }

    pub fn of(values: &[String]) -> Selection {
        Selection {
            explicit: values.to_vec(),
            select_all: false,
        }
    }

    /// The values this selection stands for, given all the values available.
    pub fn resolve(&self, universe: &[String]) -> HashSet<String> {
        if self.select_all {
            universe.iter().cloned().collect()
        } else {
            self.explicit.iter().cloned().collect()
        }
    }

    /// Same as `resolve`, keeping the order of the universe.
    pub fn resolve_ordered(&self, universe: &[String]) -> Vec<String> {
        if self.select_all {
            universe.to_vec()
        } else {
            let mut res: Vec<String> = Vec::new();
            for v in self.explicit.iter() {
                if !res.contains(v) {
                    res.push(v.clone());
                }
            }
            res
        }
    }
}

/// A named set of alternative substrings, matched case-insensitively.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct KeywordGroup {
    pub name: String,
    pub keywords: Vec<String>,
}

impl KeywordGroup {
    /// The lexicon used to surface comments that mention harassment.
    pub fn harassment() -> KeywordGroup {
        KeywordGroup {
            name: "assedio".to_string(),
            keywords: [
                "assédio",
                "assedio",
                "assediado",
                "assediada",
                "abuso",
                "humilha",
                "constrang",
                "intimida",
                "ameaça",
                "grito",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

// ******** Output data structures *********

/// A dense table of metric values, indexed by unit (rows) and metric (columns).
#[derive(PartialEq, Debug, Clone, Default)]
pub struct NumericTable {
    pub units: Vec<String>,
    pub metrics: Vec<String>,
    /// `values[i][j]` is the value of `metrics[j]` for `units[i]`.
    pub values: Vec<Vec<f64>>,
}

impl NumericTable {
    pub fn get(&self, unit: &str, metric: &str) -> Option<f64> {
        let i = self.units.iter().position(|u| u == unit)?;
        let j = self.metrics.iter().position(|m| m == metric)?;
        Some(self.values[i][j])
    }

    pub fn row(&self, unit: &str) -> Option<&[f64]> {
        let i = self.units.iter().position(|u| u == unit)?;
        Some(self.values[i].as_slice())
    }

    /// Mean of a metric over all the units. `None` for an unknown metric or
    /// a table without units.
    pub fn column_mean(&self, metric: &str) -> Option<f64> {
        let j = self.metrics.iter().position(|m| m == metric)?;
        if self.units.is_empty() {
            return None;
        }
        let sum: f64 = self.values.iter().map(|r| r[j]).sum();
        Some(sum / self.units.len() as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty() || self.metrics.is_empty()
    }
}

/// Two survey tables reduced to their common units and metrics.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Alignment {
    pub a: NumericTable,
    pub b: NumericTable,
    /// Sorted ascending.
    pub units: Vec<String>,
    /// In the column order of the first table.
    pub metrics: Vec<String>,
}

/// An ordered mapping from a label (metric or unit) to a value.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Series(pub Vec<(String, f64)>);

impl Series {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, f64)> {
        self.0.iter()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Direction {
    /// Biggest drops first.
    Ascending,
    /// Biggest gains first.
    Descending,
}

#[derive(PartialEq, Debug, Clone)]
pub struct RankedMover {
    pub label: String,
    pub delta: f64,
}

/// One of the metrics with the largest average drop, with its average in
/// each cycle.
#[derive(PartialEq, Debug, Clone)]
pub struct DropDetail {
    pub metric: String,
    pub delta: f64,
    pub mean_a: f64,
    pub mean_b: f64,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Cycle {
    A,
    B,
}

/// Metrics as rows, one column per (unit, cycle), values truncated to
/// whole percentages.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ComparisonTable {
    pub index_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<(String, Vec<i64>)>,
}

/// The adherence percentage of a summary record.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Adherence {
    Percent(f64),
    Unparseable,
}

/// A named index reported for both cycles.
#[derive(PartialEq, Debug, Clone)]
pub struct IndexPair {
    pub name: String,
    pub cycle_a: Option<f64>,
    pub cycle_b: Option<f64>,
}

/// The fixed-field summary ("ficha") of one unit.
#[derive(PartialEq, Debug, Clone)]
pub struct SummaryRecord {
    pub unit: String,
    pub invited: Option<i64>,
    pub respondents: Option<i64>,
    pub feedback: Option<i64>,
    pub adherence: Adherence,
    pub indices: Vec<IndexPair>,
}

impl SummaryRecord {
    /// Respondents over invited, in percent.
    pub fn response_rate(&self) -> Option<f64> {
        match (self.respondents, self.invited) {
            (Some(r), Some(i)) if i > 0 => Some(r as f64 * 100.0 / i as f64),
            _ => None,
        }
    }
}

// ********* Session **********

/// All the tables loaded for one session. Every view reads from it, nothing
/// writes to it after it has been assembled.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct SessionContext {
    pub cycle_a: Option<CycleTable>,
    pub cycle_b: Option<CycleTable>,
    pub summary: Option<Table>,
    pub comments: Option<SheetTable>,
    pub sentiment: Option<SheetTable>,
}

impl SessionContext {
    /// Both cycles, when both have been loaded.
    pub fn cycles(&self) -> Option<(&CycleTable, &CycleTable)> {
        match (&self.cycle_a, &self.cycle_b) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }
}

/// Errors that prevent an operation from running at all.
///
/// Shape mismatches between tables are not errors: they are resolved by
/// intersecting.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum CompareErrors {
    /// A column the operation needs is absent from the table.
    SchemaMismatch { column: String },
}

impl Error for CompareErrors {}

impl Display for CompareErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareErrors::SchemaMismatch { column } => {
                write!(f, "column {:?} is missing from the table", column)
            }
        }
    }
}

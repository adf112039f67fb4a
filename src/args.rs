use clap::Parser;

/// Compares two cycles of an organizational climate survey, unit by unit and
/// statement by statement.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON session file listing the tables to load and the display options.
    /// The file flags below override the entries of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The survey table of the first cycle (.xlsx or .csv).
    #[clap(long, value_parser)]
    pub cycle_a: Option<String>,

    /// (file path) The survey table of the second cycle (.xlsx or .csv).
    #[clap(long, value_parser)]
    pub cycle_b: Option<String>,

    /// (default 2023) The label of the first cycle.
    #[clap(long, value_parser)]
    pub label_a: Option<String>,

    /// (default 2024) The label of the second cycle.
    #[clap(long, value_parser)]
    pub label_b: Option<String>,

    /// (column name, letter or 1-based position) The unit column of both survey tables.
    /// By default the first column.
    #[clap(long, value_parser)]
    pub unit_column: Option<String>,

    /// (file path) The summary table with one row per unit.
    #[clap(long, value_parser)]
    pub summary: Option<String>,

    /// (file path) The table of free-text comments.
    #[clap(long, value_parser)]
    pub comments: Option<String>,

    /// (file path) The table of sentiment-analysis results.
    #[clap(long, value_parser)]
    pub sentiment: Option<String>,

    /// When using Excel files, the name of the worksheet to use. By default the first worksheet.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default compare) One of compare, movers, card, comments or sentiment.
    #[clap(long, value_parser)]
    pub view: Option<String>,

    /// (list of comma-separated values) The units to show.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub units: Option<Vec<String>>,

    /// Selects all the units.
    #[clap(long, takes_value = false)]
    pub all_units: bool,

    /// (list of comma-separated values) The statements to compare.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub metrics: Option<Vec<String>>,

    /// Selects all the statements.
    #[clap(long, takes_value = false)]
    pub all_metrics: bool,

    /// (list of comma-separated values) The questions of the comments and sentiment tables.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub questions: Option<Vec<String>>,

    /// Selects all the questions.
    #[clap(long, takes_value = false)]
    pub all_questions: bool,

    /// (list of comma-separated labels, default both) The cycles shown in the comparison table.
    #[clap(long, value_parser, value_delimiter = ',')]
    pub cycles: Option<Vec<String>>,

    /// A single unit, for the card view and the per-unit movers.
    #[clap(long, value_parser)]
    pub unit: Option<String>,

    /// The name of a keyword group to filter the comments with (for example assedio).
    #[clap(long, value_parser)]
    pub keyword_group: Option<String>,

    /// Keeps only the rows whose text contains this string (case-insensitive).
    #[clap(long, value_parser)]
    pub search: Option<String>,

    /// (default 3) How many statements to list per unit in the movers view.
    #[clap(long, value_parser)]
    pub top: Option<usize>,

    /// (default 70) Values of the comparison table below this threshold are highlighted.
    #[clap(long, value_parser)]
    pub threshold: Option<f64>,

    /// (file path) Writes the table of the current view as CSV.
    #[clap(long, value_parser)]
    pub export: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the JSON report of the comparison is written to
    /// the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference JSON report. If provided, surveycmp checks that the computed report
    /// matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}

use log::{debug, info, warn};

use survey_compare::filter::{filter_by_selection, TextQuery};
use survey_compare::summary::{resolve_with_layout, SummaryLayout};
use survey_compare::*;

use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{open_workbook, Reader, Xlsx};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::dash::config_reader::*;
use crate::dash::export::{export_comparison, export_table};
use crate::dash::io_common::{read_table, require_columns, simplify_file_name};
use crate::dash::render::*;

pub mod config_reader;
mod export;
mod io_common;
mod io_csv;
mod io_xlsx;
mod render;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DashError {
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Excel file {path} has no worksheet named {worksheet:?}"))]
    MissingWorksheet { path: String, worksheet: String },
    #[snafu(display("File {path} is empty"))]
    EmptyFile { path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvLineParse {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error opening {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Unsupported file {path}: expected a .xlsx or .csv file"))]
    UnsupportedFormat { path: String },
    #[snafu(display("{path}: column {column:?} is missing"))]
    SchemaMismatch { path: String, column: String },
    #[snafu(display("{path}: cannot understand the column position {spec}"))]
    ColumnIndex { path: String, spec: String },
    #[snafu(display("Error writing CSV file {path}"))]
    WritingCsv { source: csv::Error, path: String },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Table operation failed"))]
    TableOperation { source: CompareErrors },
    #[snafu(display("The report differs from the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;

/// What a view produces: either an instructional message (missing input,
/// empty selection) or rendered text with an optional JSON report.
#[derive(PartialEq, Debug, Clone)]
pub enum Screen {
    Notice(String),
    Rendered {
        text: String,
        report: Option<JSValue>,
    },
}

/// The user choices shared by all the views.
#[derive(PartialEq, Debug, Clone)]
pub struct ViewSettings {
    pub units: Selection,
    pub metrics: Selection,
    pub questions: Selection,
    pub cycles: Vec<Cycle>,
    pub unit: Option<String>,
    pub keyword_group: Option<KeywordGroup>,
    pub search: String,
    pub threshold: f64,
    pub movers_count: usize,
    pub drops_count: usize,
    pub export: Option<String>,
}

impl Default for ViewSettings {
    fn default() -> ViewSettings {
        ViewSettings {
            units: Selection::default(),
            metrics: Selection::default(),
            questions: Selection::default(),
            cycles: vec![Cycle::A, Cycle::B],
            unit: None,
            keyword_group: None,
            search: String::new(),
            threshold: 70.0,
            movers_count: 3,
            drops_count: 5,
            export: None,
        }
    }
}

// **** Session loading ****

fn load_cycle(source: &FileSource, default_label: &str) -> DashResult<CycleTable> {
    let path = source.file_path.as_str();
    let table = read_table(path, source.excel_worksheet_name.as_deref())?;
    let unit_key = resolve_column(&source.unit_column, 0, table.columns(), path)?;
    let label = source
        .label
        .clone()
        .unwrap_or_else(|| default_label.to_string());
    info!(
        "load_cycle: cycle {} from {} (unit column {:?})",
        label,
        simplify_file_name(path),
        unit_key
    );
    Ok(CycleTable {
        label,
        unit_key,
        table,
    })
}

fn load_sheet(source: &FileSource) -> DashResult<SheetTable> {
    let path = source.file_path.as_str();
    let table = read_table(path, source.excel_worksheet_name.as_deref())?;
    let header = table.columns();
    let unit_column = resolve_column(&source.unit_column, 0, header, path)?;
    let question_column = resolve_column(&source.question_column, 1, header, path)?;
    let text_column = resolve_column(&source.text_column, 2, header, path)?;
    debug!(
        "load_sheet: {}: unit {:?}, question {:?}, text {:?}",
        path, unit_column, question_column, text_column
    );
    Ok(SheetTable {
        unit_column,
        question_column,
        text_column,
        table,
    })
}

fn load_summary(source: &FileSource, layout: &SummaryLayout) -> DashResult<(Table, SummaryLayout)> {
    let path = source.file_path.as_str();
    let table = read_table(path, source.excel_worksheet_name.as_deref())?;
    let mut layout = layout.clone();
    if source.unit_column.is_some() {
        layout.unit_column = resolve_column(&source.unit_column, 0, table.columns(), path)?;
    }
    require_columns(&table, &layout.required_columns(), path)?;
    Ok((table, layout))
}

/// The last two characters of a cycle label: "2023" is "23" in the names of
/// the summary index columns.
fn short_label(label: &str) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() > 2 {
        chars[chars.len() - 2..].iter().collect()
    } else {
        label.to_string()
    }
}

/// Loads every table named in the configuration. Tables that are not
/// configured stay empty; the views that need them show a notice.
pub fn load_session(config: &SessionConfig) -> DashResult<(SessionContext, SummaryLayout)> {
    let mut session = SessionContext::default();
    if let Some(s) = &config.cycle_a {
        session.cycle_a = Some(load_cycle(s, "2023")?);
    }
    if let Some(s) = &config.cycle_b {
        session.cycle_b = Some(load_cycle(s, "2024")?);
    }
    if let Some(s) = &config.comments {
        session.comments = Some(load_sheet(s)?);
    }
    if let Some(s) = &config.sentiment {
        session.sentiment = Some(load_sheet(s)?);
    }

    let (label_a, label_b) = cycle_labels(&session);
    let mut layout = SummaryLayout {
        suffix_a: short_label(&label_a),
        suffix_b: short_label(&label_b),
        ..SummaryLayout::default()
    };
    if let Some(indices) = &config.summary_indices {
        layout.indices = indices.clone();
    }
    if let Some(s) = &config.summary {
        let (table, l) = load_summary(s, &layout)?;
        session.summary = Some(table);
        layout = l;
    }
    Ok((session, layout))
}

fn cycle_labels(session: &SessionContext) -> (String, String) {
    (
        session
            .cycle_a
            .as_ref()
            .map(|c| c.label.clone())
            .unwrap_or_else(|| "2023".to_string()),
        session
            .cycle_b
            .as_ref()
            .map(|c| c.label.clone())
            .unwrap_or_else(|| "2024".to_string()),
    )
}

// **** Views ****

const MISSING_CYCLES: &str =
    "Load the survey tables of both cycles (--cycle-a and --cycle-b) to start the analysis.";

/// Aligns the two cycles over the selected units and statements. `None` when
/// the selection is empty.
fn selected_alignment(
    a: &CycleTable,
    b: &CycleTable,
    settings: &ViewSettings,
) -> DashResult<Option<Alignment>> {
    let units_universe = a
        .table
        .distinct_values(&a.unit_key)
        .context(TableOperationSnafu)?;
    let metrics_universe: Vec<String> = a
        .table
        .columns()
        .iter()
        .filter(|c| **c != a.unit_key)
        .cloned()
        .collect();
    let units = settings.units.resolve_ordered(&units_universe);
    let metrics = settings.metrics.resolve_ordered(&metrics_universe);
    if units.is_empty() || metrics.is_empty() {
        return Ok(None);
    }
    debug!(
        "selected_alignment: {} units, {} statements selected",
        units.len(),
        metrics.len()
    );

    let units_selection = Selection::of(&units);
    let fa = filter_by_selection(&a.table, &a.unit_key, &units_selection)
        .and_then(|t| restrict_metrics(&t, &a.unit_key, &metrics))
        .context(TableOperationSnafu)?;
    let fb = filter_by_selection(&b.table, &b.unit_key, &units_selection)
        .and_then(|t| restrict_metrics(&t, &b.unit_key, &metrics))
        .context(TableOperationSnafu)?
        .with_column_renamed(&b.unit_key, &a.unit_key);
    let alignment = align(&fa, &fb, &a.unit_key).context(TableOperationSnafu)?;
    Ok(Some(alignment))
}

fn fmt2(x: f64) -> String {
    format!("{:.2}", x)
}

fn build_report_js(labels: (&str, &str), alignment: &Alignment, settings: &ViewSettings) -> JSValue {
    let d = delta(&alignment.a, &alignment.b);
    let means = mean_delta(&d);
    let mut mean_js: JSMap<String, JSValue> = JSMap::new();
    for (metric, v) in means.iter() {
        mean_js.insert(metric.clone(), json!(fmt2(*v)));
    }
    let drops: Vec<JSValue> = drop_details(alignment, settings.drops_count)
        .iter()
        .map(|dd| {
            json!({
                "metric": dd.metric,
                "delta": fmt2(dd.delta),
                "cycleA": fmt2(dd.mean_a),
                "cycleB": fmt2(dd.mean_b),
            })
        })
        .collect();
    let gains: Vec<JSValue> = top_movers(&means, settings.drops_count, Direction::Descending)
        .iter()
        .map(|m| json!({"metric": m.label, "delta": fmt2(m.delta)}))
        .collect();
    json!({
        "config": {
            "cycleA": labels.0,
            "cycleB": labels.1,
            "units": alignment.units,
            "metrics": alignment.metrics,
        },
        "meanDelta": mean_js,
        "biggestDrops": drops,
        "biggestGains": gains,
    })
}

/// The side-by-side table of the selected units and statements, and the
/// statements with the biggest average drop.
pub fn view_compare(session: &SessionContext, settings: &ViewSettings) -> DashResult<Screen> {
    let (a, b) = match session.cycles() {
        Some(x) => x,
        None => return Ok(Screen::Notice(MISSING_CYCLES.to_string())),
    };
    let alignment = match selected_alignment(a, b, settings)? {
        Some(al) if !settings.cycles.is_empty() => al,
        _ => {
            return Ok(Screen::Notice(
                "Select at least one unit (--units or --all-units), one statement (--metrics or --all-metrics) and one cycle (--cycles).".to_string(),
            ))
        }
    };
    let labels = (a.label.as_str(), b.label.as_str());

    let comparison = side_by_side(&alignment, labels, &settings.cycles);
    if let Some(path) = &settings.export {
        export_comparison(path, &comparison)?;
    }

    let mut text = String::new();
    text.push_str("### Comparison table\n\n");
    text.push_str(&render_comparison(&comparison, settings.threshold));
    text.push_str("\n\n### Statements with the biggest drops\n\n");
    text.push_str(&render_drops(
        &drop_details(&alignment, settings.drops_count),
        labels,
    ));
    if let Some(path) = &settings.export {
        text.push_str(&format!("\n\n(Comparison exported to {})", path));
    }

    Ok(Screen::Rendered {
        text,
        report: Some(build_report_js(labels, &alignment, settings)),
    })
}

/// Biggest movers: averaged over the selected units, and for one unit when
/// `--unit` is given.
pub fn view_movers(session: &SessionContext, settings: &ViewSettings) -> DashResult<Screen> {
    let (a, b) = match session.cycles() {
        Some(x) => x,
        None => return Ok(Screen::Notice(MISSING_CYCLES.to_string())),
    };
    let alignment = match selected_alignment(a, b, settings)? {
        Some(al) => al,
        None => {
            return Ok(Screen::Notice(
                "Select at least one unit (--units or --all-units) and one statement (--metrics or --all-metrics).".to_string(),
            ))
        }
    };
    let labels = (a.label.as_str(), b.label.as_str());
    let d = delta(&alignment.a, &alignment.b);
    let means = mean_delta(&d);

    let mut text = String::new();
    text.push_str(&format!(
        "### Average movement {} -> {} over {} units\n\n",
        labels.0,
        labels.1,
        alignment.units.len()
    ));
    text.push_str("Drops:\n\n");
    text.push_str(&render_movers(
        "Afirmativa",
        &top_movers(&means, settings.drops_count, Direction::Ascending),
    ));
    text.push_str("\n\nGains:\n\n");
    text.push_str(&render_movers(
        "Afirmativa",
        &top_movers(&means, settings.drops_count, Direction::Descending),
    ));

    if let Some(unit) = &settings.unit {
        text.push_str(&format!("\n\n### Movers for {}\n\n", unit));
        match unit_series(&d, unit) {
            Some(series) => {
                text.push_str("Drops:\n\n");
                text.push_str(&render_movers(
                    "Afirmativa",
                    &top_movers(&series, settings.movers_count, Direction::Ascending),
                ));
                text.push_str("\n\nGains:\n\n");
                text.push_str(&render_movers(
                    "Afirmativa",
                    &top_movers(&series, settings.movers_count, Direction::Descending),
                ));
            }
            None => text.push_str("(this unit is not in both cycles or not selected)"),
        }
    }

    Ok(Screen::Rendered {
        text,
        report: Some(build_report_js(labels, &alignment, settings)),
    })
}

/// The summary card of the unit given with `--unit`.
pub fn view_card(
    session: &SessionContext,
    layout: &SummaryLayout,
    settings: &ViewSettings,
) -> DashResult<Screen> {
    let table = match &session.summary {
        Some(t) => t,
        None => {
            return Ok(Screen::Notice(
                "Load the summary table (--summary) to see the unit cards.".to_string(),
            ))
        }
    };
    let unit = match &settings.unit {
        Some(u) => u,
        None => return Ok(Screen::Notice("Select a unit (--unit).".to_string())),
    };
    let record = resolve_with_layout(table, layout, unit).context(TableOperationSnafu)?;
    match record {
        Some(rec) => Ok(Screen::Rendered {
            text: render_card(&rec, (layout.suffix_a.as_str(), layout.suffix_b.as_str())),
            report: None,
        }),
        None => Ok(Screen::Notice(format!(
            "No summary found for the unit {:?}.",
            unit
        ))),
    }
}

/// Comments or sentiment rows, filtered by unit, question, keyword group and
/// free-text search.
pub fn view_text(sheet: Option<&SheetTable>, name: &str, settings: &ViewSettings) -> DashResult<Screen> {
    let sheet = match sheet {
        Some(s) => s,
        None => {
            return Ok(Screen::Notice(format!(
                "Load the {} table (--{}) to see its rows.",
                name, name
            )))
        }
    };
    let empty = |s: &Selection| !s.select_all && s.explicit.is_empty();
    if empty(&settings.units) || empty(&settings.questions) {
        return Ok(Screen::Notice(
            "Select at least one unit (--units or --all-units) and one question (--questions or --all-questions).".to_string(),
        ));
    }
    let query = TextQuery {
        units: settings.units.clone(),
        questions: settings.questions.clone(),
        keyword_group: settings.keyword_group.clone(),
        search: settings.search.clone(),
    };
    let filtered = query.apply(sheet).context(TableOperationSnafu)?;
    info!(
        "view_text: {}: {} of {} rows",
        name,
        filtered.len(),
        sheet.table.len()
    );
    if let Some(path) = &settings.export {
        export_table(path, &filtered)?;
    }
    let mut text = format!("### {} ({} rows)\n\n", name, filtered.len());
    text.push_str(&render_table(&filtered));
    Ok(Screen::Rendered { text, report: None })
}

// **** Report output ****

pub fn read_reference(path: &str) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

fn output_report(report: &JSValue, out: Option<&str>, reference: Option<&str>) -> DashResult<()> {
    let pretty_js = serde_json::to_string_pretty(report).context(ParsingJsonSnafu {})?;
    match out {
        Some("stdout") => println!("{}", pretty_js),
        Some(path) => {
            fs::write(path, &pretty_js).context(WritingOutputSnafu { path })?;
            info!("Report written to {:?}", path);
        }
        None => {}
    }

    // The reference report, if provided for comparison
    if let Some(ref_path) = reference {
        let reference_js = read_reference(ref_path)?;
        let pretty_reference =
            serde_json::to_string_pretty(&reference_js).context(ParsingJsonSnafu {})?;
        if pretty_reference != pretty_js {
            warn!("Found differences with the reference report");
            print_diff(pretty_reference.as_str(), pretty_js.as_str(), "\n");
            return ReferenceMismatchSnafu { path: ref_path }.fail();
        }
        info!("The report matches the reference {:?}", ref_path);
    }
    Ok(())
}

// **** Entry point ****

fn file_source(path: &str, args: &Args) -> FileSource {
    let mut source = FileSource::from_path(path);
    source.excel_worksheet_name = args.excel_worksheet_name.clone();
    source
}

/// File flags given on the command line replace the entries of the session file.
fn merge_args(mut config: SessionConfig, args: &Args) -> SessionConfig {
    if let Some(p) = &args.cycle_a {
        config.cycle_a = Some(file_source(p, args));
    }
    if let Some(p) = &args.cycle_b {
        config.cycle_b = Some(file_source(p, args));
    }
    if let Some(p) = &args.summary {
        config.summary = Some(file_source(p, args));
    }
    if let Some(p) = &args.comments {
        config.comments = Some(file_source(p, args));
    }
    if let Some(p) = &args.sentiment {
        config.sentiment = Some(file_source(p, args));
    }
    for (source, label) in [
        (&mut config.cycle_a, &args.label_a),
        (&mut config.cycle_b, &args.label_b),
    ] {
        if let Some(s) = source.as_mut() {
            if label.is_some() {
                s.label = label.clone();
            }
            if let Some(c) = &args.unit_column {
                s.unit_column = Some(JSValue::String(c.clone()));
            }
        }
    }
    config
}

fn selection(explicit: &Option<Vec<String>>, select_all: bool) -> Selection {
    Selection {
        explicit: explicit.clone().unwrap_or_default(),
        select_all,
    }
}

fn view_settings(args: &Args, config: &SessionConfig, labels: (&str, &str)) -> DashResult<ViewSettings> {
    let defaults = ViewSettings::default();

    let cycles: Vec<Cycle> = match &args.cycles {
        None => defaults.cycles.clone(),
        Some(names) => names
            .iter()
            .filter_map(|n| {
                if n == labels.0 {
                    Some(Cycle::A)
                } else if n == labels.1 {
                    Some(Cycle::B)
                } else {
                    warn!("view_settings: unknown cycle {:?}, ignoring it", n);
                    None
                }
            })
            .collect(),
    };

    let keyword_group = match &args.keyword_group {
        None => None,
        Some(name) => match config.keyword_groups().into_iter().find(|g| g.name == *name) {
            Some(g) => Some(g),
            None => whatever!("Unknown keyword group {:?}", name),
        },
    };

    Ok(ViewSettings {
        units: selection(&args.units, args.all_units),
        metrics: selection(&args.metrics, args.all_metrics),
        questions: selection(&args.questions, args.all_questions),
        cycles,
        unit: args.unit.clone(),
        keyword_group,
        search: args.search.clone().unwrap_or_default(),
        threshold: args
            .threshold
            .or(config.highlight_threshold)
            .unwrap_or(defaults.threshold),
        movers_count: args
            .top
            .or(config.movers_count)
            .unwrap_or(defaults.movers_count),
        drops_count: config.drops_count.unwrap_or(defaults.drops_count),
        export: args.export.clone(),
    })
}

pub fn run_dashboard(args: &Args) -> DashResult<()> {
    let config = match &args.config {
        Some(p) => read_config(p)?,
        None => SessionConfig::default(),
    };
    let config = merge_args(config, args);
    info!("config: {:?}", config);

    let (session, layout) = load_session(&config)?;
    let (label_a, label_b) = cycle_labels(&session);
    let settings = view_settings(args, &config, (&label_a, &label_b))?;
    debug!("settings: {:?}", settings);

    let screen = match args.view.as_deref().unwrap_or("compare") {
        "compare" => view_compare(&session, &settings)?,
        "movers" => view_movers(&session, &settings)?,
        "card" => view_card(&session, &layout, &settings)?,
        "comments" => view_text(session.comments.as_ref(), "comments", &settings)?,
        "sentiment" => view_text(session.sentiment.as_ref(), "sentiment", &settings)?,
        x => whatever!(
            "Unknown view {:?}: expected compare, movers, card, comments or sentiment",
            x
        ),
    };

    match screen {
        Screen::Notice(msg) => println!("{}", msg),
        Screen::Rendered { text, report } => {
            println!("{}", text);
            if let Some(report) = report {
                output_report(&report, args.out.as_deref(), args.reference.as_deref())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_compare::builder::TableBuilder;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        let cols: Vec<String> = columns.iter().map(|s| s.to_string()).collect();
        let mut b = TableBuilder::new(&cols);
        for r in rows {
            b.add_row_simple(r);
        }
        b.build()
    }

    fn session() -> SessionContext {
        SessionContext {
            cycle_a: Some(CycleTable {
                label: "2023".to_string(),
                unit_key: "gerencia".to_string(),
                table: table(
                    &["gerencia", "Q1", "Q2"],
                    &[&["North", "80", "90"], &["South", "60", "**"]],
                ),
            }),
            cycle_b: Some(CycleTable {
                label: "2024".to_string(),
                unit_key: "unidade".to_string(),
                table: table(
                    &["unidade", "Q2", "Q1"],
                    &[&["South", "50", "90"], &["North", "88", "70"]],
                ),
            }),
            ..SessionContext::default()
        }
    }

    fn all() -> ViewSettings {
        ViewSettings {
            units: Selection::all(),
            metrics: Selection::all(),
            ..ViewSettings::default()
        }
    }

    #[test]
    fn compare_needs_both_cycles() {
        let mut s = session();
        s.cycle_b = None;
        assert_eq!(
            view_compare(&s, &all()).unwrap(),
            Screen::Notice(MISSING_CYCLES.to_string())
        );
    }

    #[test]
    fn compare_needs_a_selection() {
        let s = session();
        let settings = ViewSettings {
            metrics: Selection::all(),
            ..ViewSettings::default()
        };
        assert!(matches!(view_compare(&s, &settings).unwrap(), Screen::Notice(_)));
        let settings = ViewSettings {
            cycles: vec![],
            ..all()
        };
        assert!(matches!(view_compare(&s, &settings).unwrap(), Screen::Notice(_)));
    }

    #[test]
    fn compare_renders_and_reports() {
        let s = session();
        match view_compare(&s, &all()).unwrap() {
            Screen::Rendered { text, report } => {
                assert!(text.contains("North (2023)"));
                assert!(text.contains("South (2024)"));
                let report = report.unwrap();
                assert_eq!(report["meanDelta"]["Q1"], json!("10.00"));
                assert_eq!(report["meanDelta"]["Q2"], json!("24.00"));
                assert_eq!(report["biggestDrops"][0]["metric"], json!("Q1"));
                assert_eq!(report["config"]["units"], json!(["North", "South"]));
            }
            x => panic!("unexpected screen {:?}", x),
        }
    }

    #[test]
    fn movers_for_one_unit() {
        let s = session();
        let settings = ViewSettings {
            unit: Some("North".to_string()),
            movers_count: 1,
            ..all()
        };
        match view_movers(&s, &settings).unwrap() {
            Screen::Rendered { text, .. } => {
                assert!(text.contains("Movers for North"));
                assert!(text.contains("-10.00"));
            }
            x => panic!("unexpected screen {:?}", x),
        }
    }

    #[test]
    fn card_notices() {
        let s = session();
        let layout = SummaryLayout::default();
        assert!(matches!(
            view_card(&s, &layout, &all()).unwrap(),
            Screen::Notice(_)
        ));
        let mut s = s;
        s.summary = Some(table(
            &["gerencia", "convidados", "Respondentes", "Adesão", "Feedback"],
            &[&["North", "10", "8", "80%", "2"]],
        ));
        let settings = ViewSettings {
            unit: Some("West".to_string()),
            ..all()
        };
        assert!(matches!(
            view_card(&s, &layout, &settings).unwrap(),
            Screen::Notice(_)
        ));
        let settings = ViewSettings {
            unit: Some("North".to_string()),
            ..all()
        };
        assert!(matches!(
            view_card(&s, &layout, &settings).unwrap(),
            Screen::Rendered { .. }
        ));
    }

    #[test]
    fn text_view_filters_comments() {
        let sheet = SheetTable {
            unit_column: "gerencia".to_string(),
            question_column: "afirmativa".to_string(),
            text_column: "comentario".to_string(),
            table: table(
                &["gerencia", "afirmativa", "comentario"],
                &[
                    &["North", "Q1", "Houve assédio moral"],
                    &["South", "Q1", "Tudo certo"],
                ],
            ),
        };
        assert!(matches!(
            view_text(None, "comments", &all()).unwrap(),
            Screen::Notice(_)
        ));
        let settings = ViewSettings {
            questions: Selection::all(),
            keyword_group: Some(KeywordGroup::harassment()),
            ..all()
        };
        match view_text(Some(&sheet), "comments", &settings).unwrap() {
            Screen::Rendered { text, .. } => {
                assert!(text.contains("(1 rows)"));
                assert!(text.contains("Houve assédio moral"));
                assert!(!text.contains("Tudo certo"));
            }
            x => panic!("unexpected screen {:?}", x),
        }
    }

    fn write_fixture(name: &str, contents: &str) -> String {
        let p: PathBuf = std::env::temp_dir().join(format!(
            "surveycmp-{}-dash-{}",
            std::process::id(),
            name
        ));
        fs::write(&p, contents).unwrap();
        p.display().to_string()
    }

    #[test]
    fn summary_without_adherence_is_rejected() {
        let path = write_fixture(
            "ficha_sem_adesao.csv",
            "gerencia,convidados,Respondentes,Feedback\nNorth,10,8,2\n",
        );
        match load_summary(&FileSource::from_path(&path), &SummaryLayout::default()) {
            Err(DashError::SchemaMismatch { column, .. }) => assert_eq!(column, "Adesão"),
            x => panic!("unexpected result {:?}", x),
        }
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn sheet_needs_three_columns() {
        let path = write_fixture("comentarios_curto.csv", "gerencia,afirmativa\nNorth,Q1\n");
        assert!(matches!(
            load_sheet(&FileSource::from_path(&path)),
            Err(DashError::SchemaMismatch { .. })
        ));
        fs::remove_file(&path).unwrap();

        let path = write_fixture(
            "comentarios.csv",
            "gerencia,afirmativa,comentario,sentimento\nNorth,Q1,Bom,0.8\n",
        );
        let sheet = load_sheet(&FileSource::from_path(&path)).unwrap();
        assert_eq!(sheet.unit_column, "gerencia");
        assert_eq!(sheet.question_column, "afirmativa");
        assert_eq!(sheet.text_column, "comentario");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn report_is_checked_against_the_reference() {
        let report = json!({"meanDelta": {"Q1": "10.00"}});
        let path = write_fixture("reference_ok.json", r#"{"meanDelta":{"Q1":"10.00"}}"#);
        assert!(output_report(&report, None, Some(path.as_str())).is_ok());
        fs::remove_file(&path).unwrap();

        let path = write_fixture("reference_ko.json", r#"{"meanDelta":{"Q1":"-3.00"}}"#);
        assert!(matches!(
            output_report(&report, None, Some(path.as_str())),
            Err(DashError::ReferenceMismatch { .. })
        ));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn report_is_written_to_a_file() {
        let out = std::env::temp_dir()
            .join(format!("surveycmp-{}-dash-report.json", std::process::id()))
            .display()
            .to_string();
        let report = json!({"biggestDrops": []});
        output_report(&report, Some(out.as_str()), None).unwrap();
        assert_eq!(read_reference(&out).unwrap(), report);
        fs::remove_file(&out).unwrap();
    }

    #[test]
    fn command_line_files_override_the_session_file() {
        let mut cycle_a = FileSource::from_path("/data/old_2022.csv");
        cycle_a.label = Some("2022".to_string());
        let config = SessionConfig {
            cycle_a: Some(cycle_a),
            cycle_b: Some(FileSource::from_path("/data/base_2024.csv")),
            summary: Some(FileSource::from_path("/data/ficha.csv")),
            ..SessionConfig::default()
        };
        let args = Args {
            cycle_a: Some("base_2023.xlsx".to_string()),
            label_b: Some("B".to_string()),
            unit_column: Some("unidade".to_string()),
            excel_worksheet_name: Some("Dados".to_string()),
            ..Args::default()
        };
        let merged = merge_args(config, &args);

        let a = merged.cycle_a.unwrap();
        assert_eq!(a.file_path, "base_2023.xlsx");
        assert_eq!(a.excel_worksheet_name, Some("Dados".to_string()));
        assert_eq!(a.label, None);
        assert_eq!(a.unit_column, Some(json!("unidade")));

        let b = merged.cycle_b.unwrap();
        assert_eq!(b.file_path, "/data/base_2024.csv");
        assert_eq!(b.label, Some("B".to_string()));
        assert_eq!(b.unit_column, Some(json!("unidade")));

        assert_eq!(merged.summary.unwrap().file_path, "/data/ficha.csv");
    }

    #[test]
    fn summary_suffixes_follow_the_cycle_labels() {
        let path_a = write_fixture("base_2022.csv", "gerencia,Q1\nNorth,80\n");
        let path_b = write_fixture("base_2025.csv", "gerencia,Q1\nNorth,70\n");
        let path_s = write_fixture(
            "ficha_2225.csv",
            "gerencia,convidados,Respondentes,Adesão,Feedback,ENPS 22,ENPS 25\nNorth,10,8,80%,2,45,52\n",
        );
        let mut cycle_a = FileSource::from_path(&path_a);
        cycle_a.label = Some("2022".to_string());
        let mut cycle_b = FileSource::from_path(&path_b);
        cycle_b.label = Some("2025".to_string());
        let config = SessionConfig {
            cycle_a: Some(cycle_a),
            cycle_b: Some(cycle_b),
            summary: Some(FileSource::from_path(&path_s)),
            summary_indices: Some(vec!["ENPS".to_string()]),
            ..SessionConfig::default()
        };

        let (session, layout) = load_session(&config).unwrap();
        assert_eq!(layout.suffix_a, "22");
        assert_eq!(layout.suffix_b, "25");
        assert_eq!(layout.indices, vec!["ENPS".to_string()]);
        let table = session.summary.unwrap();
        let rec = resolve_with_layout(&table, &layout, "North").unwrap().unwrap();
        assert_eq!(rec.indices[0].cycle_a, Some(45.0));
        assert_eq!(rec.indices[0].cycle_b, Some(52.0));

        for p in [path_a, path_b, path_s] {
            fs::remove_file(&p).unwrap();
        }
    }

    #[test]
    fn short_labels() {
        assert_eq!(short_label("2023"), "23");
        assert_eq!(short_label("24"), "24");
    }
}

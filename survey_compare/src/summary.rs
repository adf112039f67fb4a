//! Lookup of the per-unit summary records ("fichas").

use log::{debug, warn};

pub use crate::config::*;

/// The column names of a summary table.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SummaryLayout {
    pub unit_column: String,
    pub invited_column: String,
    pub respondents_column: String,
    pub adherence_column: String,
    pub feedback_column: String,
    /// Index names. Each index has one column per cycle, named
    /// `"<name> <suffix>"`.
    pub indices: Vec<String>,
    pub suffix_a: String,
    pub suffix_b: String,
}

impl Default for SummaryLayout {
    fn default() -> SummaryLayout {
        SummaryLayout {
            unit_column: "gerencia".to_string(),
            invited_column: "convidados".to_string(),
            respondents_column: "Respondentes".to_string(),
            adherence_column: "Adesão".to_string(),
            feedback_column: "Feedback".to_string(),
            indices: vec!["ENPS".to_string(), "IVR".to_string(), "Retenção".to_string()],
            suffix_a: "23".to_string(),
            suffix_b: "24".to_string(),
        }
    }
}

impl SummaryLayout {
    /// The columns a summary table must have to be usable.
    pub fn required_columns(&self) -> Vec<String> {
        vec![
            self.unit_column.clone(),
            self.invited_column.clone(),
            self.respondents_column.clone(),
            self.adherence_column.clone(),
            self.feedback_column.clone(),
        ]
    }
}

/// Finds the summary record of a unit, with the default layout and the given
/// key column.
///
/// Returns `Ok(None)` when no row matches. When several rows match, the first
/// one is used.
pub fn resolve(
    table: &Table,
    unit_key: &str,
    unit: &str,
) -> Result<Option<SummaryRecord>, CompareErrors> {
    let layout = SummaryLayout {
        unit_column: unit_key.to_string(),
        ..SummaryLayout::default()
    };
    resolve_with_layout(table, &layout, unit)
}

pub fn resolve_with_layout(
    table: &Table,
    layout: &SummaryLayout,
    unit: &str,
) -> Result<Option<SummaryRecord>, CompareErrors> {
    let key_idx = table.require_column(&layout.unit_column)?;
    let matching: Vec<usize> = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row[key_idx].as_key().as_deref() == Some(unit))
        .map(|(idx, _)| idx)
        .collect();

    let row = match matching.as_slice() {
        [] => {
            debug!("resolve: no summary for unit {:?}", unit);
            return Ok(None);
        }
        [idx] => *idx,
        [idx, ..] => {
            warn!(
                "resolve: {} summary rows for unit {:?}, using the first one",
                matching.len(),
                unit
            );
            *idx
        }
    };

    let indices: Vec<IndexPair> = layout
        .indices
        .iter()
        .map(|name| IndexPair {
            name: name.clone(),
            cycle_a: table
                .get(row, &format!("{} {}", name, layout.suffix_a))
                .and_then(|c| c.parse_number()),
            cycle_b: table
                .get(row, &format!("{} {}", name, layout.suffix_b))
                .and_then(|c| c.parse_number()),
        })
        .collect();

    Ok(Some(SummaryRecord {
        unit: unit.to_string(),
        invited: parse_count(table.get(row, &layout.invited_column)),
        respondents: parse_count(table.get(row, &layout.respondents_column)),
        feedback: parse_count(table.get(row, &layout.feedback_column)),
        adherence: table
            .get(row, &layout.adherence_column)
            .map(parse_adherence)
            .unwrap_or(Adherence::Unparseable),
        indices,
    }))
}

/// Reads an adherence percentage: a number, or text with an optional
/// trailing `%` (a decimal comma is accepted).
pub fn parse_adherence(raw: &Cell) -> Adherence {
    let parsed = match raw {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => {
            let s = s.trim();
            let s = s.strip_suffix('%').unwrap_or(s).trim();
            let s = if s.contains('.') {
                s.to_string()
            } else {
                s.replace(',', ".")
            };
            s.parse::<f64>().ok().filter(|x| x.is_finite())
        }
        _ => None,
    };
    match parsed {
        Some(x) => Adherence::Percent(x),
        None => Adherence::Unparseable,
    }
}

fn parse_count(cell: Option<&Cell>) -> Option<i64> {
    cell.and_then(|c| c.parse_number()).map(|x| x.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TableBuilder;

    fn fichas() -> Table {
        let cols: Vec<String> = [
            "gerencia",
            "convidados",
            "Respondentes",
            "Adesão",
            "Feedback",
            "ENPS 23",
            "ENPS 24",
            "IVR 23",
            "IVR 24",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let mut b = TableBuilder::new(&cols);
        b.add_row_simple(&["North", "40", "35", "87.5%", "12", "45", "52", "80", "**"]);
        b.add_row(vec![
            Cell::from("South"),
            Cell::from(20.0),
            Cell::from(10.0),
            Cell::from(50.0),
            Cell::Missing,
            Cell::from(-5.0),
            Cell::from(3.0),
        ]);
        b.add_row_simple(&["South", "99", "99", "n/a", "0", "", "", "", ""]);
        b.build()
    }

    #[test]
    fn resolves_a_unit() {
        let t = fichas();
        let rec = resolve(&t, "gerencia", "North").unwrap().unwrap();
        assert_eq!(rec.invited, Some(40));
        assert_eq!(rec.respondents, Some(35));
        assert_eq!(rec.feedback, Some(12));
        assert_eq!(rec.adherence, Adherence::Percent(87.5));
        assert_eq!(rec.response_rate(), Some(87.5));
        assert_eq!(
            rec.indices[0],
            IndexPair {
                name: "ENPS".to_string(),
                cycle_a: Some(45.0),
                cycle_b: Some(52.0)
            }
        );
        assert_eq!(rec.indices[1].cycle_b, None);
        // No "Retenção" columns in this table.
        assert_eq!(rec.indices[2].cycle_a, None);
    }

    #[test]
    fn unknown_unit_is_not_found_and_input_is_untouched() {
        let t = fichas();
        let before = t.clone();
        assert_eq!(resolve(&t, "gerencia", "West"), Ok(None));
        assert_eq!(t, before);
    }

    #[test]
    fn duplicates_use_the_first_row() {
        let t = fichas();
        let rec = resolve(&t, "gerencia", "South").unwrap().unwrap();
        assert_eq!(rec.invited, Some(20));
        assert_eq!(rec.adherence, Adherence::Percent(50.0));
        assert_eq!(rec.feedback, None);
    }

    #[test]
    fn missing_key_column_is_an_error() {
        let t = fichas();
        assert!(resolve(&t, "unidade", "North").is_err());
    }

    #[test]
    fn adherence_parsing() {
        assert_eq!(parse_adherence(&Cell::from("87.5%")), Adherence::Percent(87.5));
        assert_eq!(parse_adherence(&Cell::from(" 90 % ")), Adherence::Percent(90.0));
        assert_eq!(parse_adherence(&Cell::from("72,5%")), Adherence::Percent(72.5));
        assert_eq!(parse_adherence(&Cell::from(64.0)), Adherence::Percent(64.0));
        assert_eq!(parse_adherence(&Cell::from("n/a")), Adherence::Unparseable);
        assert_eq!(parse_adherence(&Cell::Missing), Adherence::Unparseable);
        assert_eq!(parse_adherence(&Cell::from("%")), Adherence::Unparseable);
    }
}

// Console rendering of the views.

use tabled::{builder::Builder, settings::Style};

use crate::dash::*;

fn markdown(records: Vec<Vec<String>>) -> String {
    let mut builder = Builder::default();
    for r in records {
        builder.push_record(r);
    }
    builder.build().with(Style::markdown()).to_string()
}

/// The side-by-side table. Values under the threshold are marked with `*`.
pub fn render_comparison(t: &ComparisonTable, threshold: f64) -> String {
    let mut records: Vec<Vec<String>> = Vec::with_capacity(t.rows.len() + 1);
    let mut header: Vec<String> = vec![t.index_name.clone()];
    header.extend(t.columns.iter().cloned());
    records.push(header);
    let mut flagged = 0usize;
    for (label, values) in t.rows.iter() {
        let mut record: Vec<String> = vec![label.clone()];
        for v in values.iter() {
            if below_threshold(*v as f64, threshold) {
                flagged += 1;
                record.push(format!("{}*", v));
            } else {
                record.push(v.to_string());
            }
        }
        records.push(record);
    }
    let mut res = markdown(records);
    if flagged > 0 {
        res.push_str(&format!("\n(*) below {}%", threshold));
    }
    res
}

pub fn render_drops(details: &[DropDetail], labels: (&str, &str)) -> String {
    if details.is_empty() {
        return "(no statement in common)".to_string();
    }
    details
        .iter()
        .map(|d| {
            format!(
                "- {}: {}: {:.2}% -> {}: {:.2}% (drop of {:.2}%)",
                d.metric, labels.0, d.mean_a, labels.1, d.mean_b, d.delta
            )
        })
        .collect::<Vec<String>>()
        .join("\n")
}

pub fn render_movers(label_header: &str, movers: &[RankedMover]) -> String {
    if movers.is_empty() {
        return "(no data)".to_string();
    }
    let mut records: Vec<Vec<String>> = vec![vec![label_header.to_string(), "Delta".to_string()]];
    for m in movers.iter() {
        records.push(vec![m.label.clone(), format!("{:+.2}", m.delta)]);
    }
    markdown(records)
}

fn fmt_count(x: Option<i64>) -> String {
    x.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
}

fn fmt_index(x: Option<f64>) -> String {
    x.map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn render_card(rec: &SummaryRecord, labels: (&str, &str)) -> String {
    let adherence = match rec.adherence {
        Adherence::Percent(x) => format!("{:.1}%", x),
        Adherence::Unparseable => "N/A".to_string(),
    };
    let response_rate = rec
        .response_rate()
        .map(|x| format!("{:.1}%", x))
        .unwrap_or_else(|| "N/A".to_string());
    let mut records: Vec<Vec<String>> = vec![
        vec!["Gerência".to_string(), rec.unit.clone()],
        vec!["Convidados".to_string(), fmt_count(rec.invited)],
        vec!["Respondentes".to_string(), fmt_count(rec.respondents)],
        vec!["Taxa de resposta".to_string(), response_rate],
        vec!["Adesão".to_string(), adherence],
        vec!["Feedback".to_string(), fmt_count(rec.feedback)],
    ];
    for idx in rec.indices.iter() {
        records.push(vec![format!("{} {}", idx.name, labels.0), fmt_index(idx.cycle_a)]);
        records.push(vec![format!("{} {}", idx.name, labels.1), fmt_index(idx.cycle_b)]);
    }
    markdown(records)
}

pub fn render_table(t: &Table) -> String {
    if t.is_empty() {
        return "(no rows)".to_string();
    }
    let mut records: Vec<Vec<String>> = vec![t.columns().to_vec()];
    for row in t.rows() {
        records.push(row.iter().map(|c| c.to_string()).collect());
    }
    markdown(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_flags_low_values() {
        let t = ComparisonTable {
            index_name: "Afirmativa".to_string(),
            columns: vec!["North (2023)".to_string(), "North (2024)".to_string()],
            rows: vec![("Q1".to_string(), vec![80, 65])],
        };
        let s = render_comparison(&t, 70.0);
        assert!(s.contains("65*"));
        assert!(!s.contains("80*"));
        assert!(s.contains("(*) below 70%"));
    }

    #[test]
    fn card_shows_na_for_unparseable_adherence() {
        let rec = SummaryRecord {
            unit: "North".to_string(),
            invited: Some(40),
            respondents: Some(30),
            feedback: None,
            adherence: Adherence::Unparseable,
            indices: vec![IndexPair {
                name: "ENPS".to_string(),
                cycle_a: Some(45.0),
                cycle_b: None,
            }],
        };
        let s = render_card(&rec, ("23", "24"));
        assert!(s.contains("75.0%"));
        assert!(s.contains("ENPS 23"));
        assert!(s.contains("45.0"));
        assert!(s.contains("N/A"));
    }

    #[test]
    fn drops_are_listed_with_both_cycles() {
        let d = vec![DropDetail {
            metric: "Q3".to_string(),
            delta: -15.0,
            mean_a: 80.0,
            mean_b: 65.0,
        }];
        assert_eq!(
            render_drops(&d, ("2023", "2024")),
            "- Q3: 2023: 80.00% -> 2024: 65.00% (drop of -15.00%)"
        );
    }
}

mod config;
use log::{debug, info, warn};

use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
};

pub mod builder;
pub mod filter;
pub mod manual;
pub mod summary;

pub use crate::config::*;

// **** Alignment ****

/// The first row of every unit, by unit key. Rows without a key are skipped,
/// later rows of an already seen unit are dropped.
fn first_rows(table: &Table, key_idx: usize) -> HashMap<String, &[Cell]> {
    let mut res: HashMap<String, &[Cell]> = HashMap::new();
    for row in table.rows() {
        let key = match row[key_idx].as_key() {
            Some(k) => k,
            None => continue,
        };
        if res.contains_key(&key) {
            warn!("first_rows: unit {:?} appears more than once, keeping the first row", key);
            continue;
        }
        res.insert(key, row.as_slice());
    }
    res
}

fn numeric_block(
    units: &[String],
    metrics: &[String],
    rows: &HashMap<String, &[Cell]>,
    col_idxs: &[usize],
) -> NumericTable {
    let mut coerced = 0usize;
    let mut values: Vec<Vec<f64>> = Vec::with_capacity(units.len());
    for unit in units.iter() {
        let row = rows[unit];
        let mut line: Vec<f64> = Vec::with_capacity(col_idxs.len());
        for idx in col_idxs.iter() {
            let cell = &row[*idx];
            if cell.parse_number().is_none() {
                coerced += 1;
            }
            line.push(cell.to_metric());
        }
        values.push(line);
    }
    if coerced > 0 {
        debug!("numeric_block: {} cells could not be read as numbers and count as 0", coerced);
    }
    NumericTable {
        units: units.to_vec(),
        metrics: metrics.to_vec(),
        values,
    }
}

/// Reduces two survey tables to the units and metrics they have in common.
///
/// Arguments:
/// * `table_a` the table of the first cycle. Its column order decides the
/// order of the metrics.
/// * `table_b` the table of the second cycle.
/// * `unit_key` the column holding the unit names, in both tables.
///
/// The common units are sorted. Every cell is read as a number; the sentinel
/// and any other non-numeric content count as 0. Disjoint tables give an
/// empty alignment, not an error. The only error is a missing key column.
pub fn align(table_a: &Table, table_b: &Table, unit_key: &str) -> Result<Alignment, CompareErrors> {
    let key_a = table_a.require_column(unit_key)?;
    let key_b = table_b.require_column(unit_key)?;
    let rows_a = first_rows(table_a, key_a);
    let rows_b = first_rows(table_b, key_b);

    let units: Vec<String> = rows_a
        .keys()
        .filter(|u| rows_b.contains_key(*u))
        .cloned()
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();

    let cols_b: HashMap<&str, usize> = table_b
        .columns()
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != key_b)
        .map(|(idx, name)| (name.as_str(), idx))
        .collect();

    let mut metrics: Vec<String> = Vec::new();
    let mut idxs_a: Vec<usize> = Vec::new();
    let mut idxs_b: Vec<usize> = Vec::new();
    for (idx_a, name) in table_a.columns().iter().enumerate() {
        if idx_a == key_a || metrics.contains(name) {
            continue;
        }
        if let Some(idx_b) = cols_b.get(name.as_str()) {
            metrics.push(name.clone());
            idxs_a.push(idx_a);
            idxs_b.push(*idx_b);
        }
    }

    info!(
        "align: {} common units, {} common metrics",
        units.len(),
        metrics.len()
    );
    let a = numeric_block(&units, &metrics, &rows_a, &idxs_a);
    let b = numeric_block(&units, &metrics, &rows_b, &idxs_b);
    if a.is_empty() {
        info!("align: the two tables have nothing in common");
    }

    Ok(Alignment {
        a,
        b,
        units,
        metrics,
    })
}

// **** Deltas ****

/// `b - a`, cell by cell.
///
/// Aligned tables have the same shape. If they do not, the result only
/// covers the units and metrics of `a` that `b` also has.
pub fn delta(a: &NumericTable, b: &NumericTable) -> NumericTable {
    let unit_idx_b: HashMap<&str, usize> = b
        .units
        .iter()
        .enumerate()
        .map(|(i, u)| (u.as_str(), i))
        .collect();
    let metric_idx_b: HashMap<&str, usize> = b
        .metrics
        .iter()
        .enumerate()
        .map(|(j, m)| (m.as_str(), j))
        .collect();

    let metric_pairs: Vec<(usize, usize)> = a
        .metrics
        .iter()
        .enumerate()
        .filter_map(|(ja, m)| metric_idx_b.get(m.as_str()).map(|jb| (ja, *jb)))
        .collect();

    let mut res = NumericTable {
        units: Vec::new(),
        metrics: metric_pairs
            .iter()
            .map(|(ja, _)| a.metrics[*ja].clone())
            .collect(),
        values: Vec::new(),
    };
    for (ia, unit) in a.units.iter().enumerate() {
        if let Some(ib) = unit_idx_b.get(unit.as_str()) {
            let line: Vec<f64> = metric_pairs
                .iter()
                .map(|(ja, jb)| b.values[*ib][*jb] - a.values[ia][*ja])
                .collect();
            res.units.push(unit.clone());
            res.values.push(line);
        }
    }
    res
}

/// The mean of every metric over all the units of a delta table.
///
/// A table without units has no movement to report: the series is empty.
pub fn mean_delta(delta: &NumericTable) -> Series {
    if delta.units.is_empty() {
        return Series::default();
    }
    let n = delta.units.len() as f64;
    let res: Vec<(String, f64)> = delta
        .metrics
        .iter()
        .enumerate()
        .map(|(j, m)| {
            let sum: f64 = delta.values.iter().map(|row| row[j]).sum();
            (m.clone(), sum / n)
        })
        .collect();
    Series(res)
}

/// The metric deltas of a single unit.
pub fn unit_series(delta: &NumericTable, unit: &str) -> Option<Series> {
    let row = delta.row(unit)?;
    Some(Series(
        delta
            .metrics
            .iter()
            .cloned()
            .zip(row.iter().cloned())
            .collect(),
    ))
}

// **** Rankings ****

/// The `k` biggest movers of a series.
///
/// The sort is stable: labels with the same delta keep their order in the
/// series. Asking for more entries than the series has returns all of them.
pub fn top_movers(series: &Series, k: usize, direction: Direction) -> Vec<RankedMover> {
    let mut entries: Vec<&(String, f64)> = series.iter().collect();
    entries.sort_by(|x, y| {
        let ord = x.1.partial_cmp(&y.1).unwrap_or(Ordering::Equal);
        match direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    });
    entries
        .into_iter()
        .take(k)
        .map(|(label, delta)| RankedMover {
            label: label.clone(),
            delta: *delta,
        })
        .collect()
}

/// The `k` metrics with the largest average drop, with their average value in
/// each cycle.
pub fn drop_details(alignment: &Alignment, k: usize) -> Vec<DropDetail> {
    let d = delta(&alignment.a, &alignment.b);
    let means = mean_delta(&d);
    top_movers(&means, k, Direction::Ascending)
        .into_iter()
        .map(|mover| DropDetail {
            mean_a: alignment.a.column_mean(&mover.label).unwrap_or(0.0),
            mean_b: alignment.b.column_mean(&mover.label).unwrap_or(0.0),
            metric: mover.label,
            delta: mover.delta,
        })
        .collect()
}

// **** Presentation helpers ****

/// Keeps the unit key column and the selected metrics, in the order of the
/// selection. Selected metrics the table does not have are ignored.
pub fn restrict_metrics(
    table: &Table,
    unit_key: &str,
    metrics: &[String],
) -> Result<Table, CompareErrors> {
    let key_idx = table.require_column(unit_key)?;
    let mut idxs: Vec<usize> = vec![key_idx];
    for m in metrics.iter() {
        if m == unit_key {
            continue;
        }
        match table.column_index(m) {
            Some(idx) if !idxs.contains(&idx) => idxs.push(idx),
            Some(_) => {}
            None => debug!("restrict_metrics: metric {:?} not in table, skipping", m),
        }
    }
    let mut res = Table::new(idxs.iter().map(|i| table.columns()[*i].clone()).collect());
    for row in table.rows() {
        res.push_row(idxs.iter().map(|i| row[*i].clone()).collect());
    }
    Ok(res)
}

/// Lays the two cycles side by side: one row per metric, and for every unit
/// one column per requested cycle, headed `"<unit> (<label>)"`.
///
/// Values are truncated to whole percentages.
pub fn side_by_side(
    alignment: &Alignment,
    labels: (&str, &str),
    cycles: &[Cycle],
) -> ComparisonTable {
    let show_a = cycles.contains(&Cycle::A);
    let show_b = cycles.contains(&Cycle::B);

    let mut columns: Vec<String> = Vec::new();
    for unit in alignment.units.iter() {
        if show_a {
            columns.push(format!("{} ({})", unit, labels.0));
        }
        if show_b {
            columns.push(format!("{} ({})", unit, labels.1));
        }
    }

    let mut rows: Vec<(String, Vec<i64>)> = Vec::new();
    for (j, metric) in alignment.metrics.iter().enumerate() {
        let mut line: Vec<i64> = Vec::with_capacity(columns.len());
        for i in 0..alignment.units.len() {
            if show_a {
                line.push(alignment.a.values[i][j].trunc() as i64);
            }
            if show_b {
                line.push(alignment.b.values[i][j].trunc() as i64);
            }
        }
        rows.push((metric.clone(), line));
    }

    ComparisonTable {
        index_name: "Afirmativa".to_string(),
        columns,
        rows,
    }
}

/// Values strictly under the threshold are flagged in the comparison views.
pub fn below_threshold(value: f64, threshold: f64) -> bool {
    value < threshold
}

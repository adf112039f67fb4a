//! Row filters over tables.
//!
//! Every filter returns a new table and keeps the order of the rows.

use log::debug;
use std::collections::HashSet;

pub use crate::config::*;

/// Rows whose value in `column` is one of the allowed values.
///
/// An empty set of allowed values keeps no row.
pub fn filter_by_membership(
    table: &Table,
    column: &str,
    allowed: &HashSet<String>,
) -> Result<Table, CompareErrors> {
    let idx = table.require_column(column)?;
    let rows: Vec<Vec<Cell>> = table
        .rows()
        .iter()
        .filter(|row| matches!(row[idx].as_key(), Some(k) if allowed.contains(&k)))
        .cloned()
        .collect();
    debug!(
        "filter_by_membership: column {:?}: {} -> {} rows",
        column,
        table.len(),
        rows.len()
    );
    Ok(table.with_rows(rows))
}

/// Membership filter driven by a user selection. The "select all" toggle
/// stands for every value of the column, blank cells included.
pub fn filter_by_selection(
    table: &Table,
    column: &str,
    selection: &Selection,
) -> Result<Table, CompareErrors> {
    if selection.select_all {
        table.require_column(column)?;
        return Ok(table.clone());
    }
    let universe = table.distinct_values(column)?;
    let allowed = selection.resolve(&universe);
    filter_by_membership(table, column, &allowed)
}

/// Rows whose text in `column` contains `needle`.
///
/// Numbers are matched on their printed form, the same for both file
/// formats. Blank cells never match. An empty needle keeps every row.
pub fn filter_by_text_contains(
    table: &Table,
    column: &str,
    needle: &str,
    case_sensitive: bool,
) -> Result<Table, CompareErrors> {
    let idx = table.require_column(column)?;
    if needle.is_empty() {
        return Ok(table.clone());
    }
    let needle_cmp = if case_sensitive {
        needle.to_string()
    } else {
        needle.to_lowercase()
    };
    let rows: Vec<Vec<Cell>> = table
        .rows()
        .iter()
        .filter(|row| match row[idx].as_key() {
            Some(s) if case_sensitive => s.contains(needle_cmp.as_str()),
            Some(s) => s.to_lowercase().contains(needle_cmp.as_str()),
            None => false,
        })
        .cloned()
        .collect();
    Ok(table.with_rows(rows))
}

/// Rows whose text in `column` contains any keyword of the group, ignoring
/// case.
///
/// Blank keywords are ignored, so a group without any usable keyword keeps
/// no row.
pub fn filter_by_keyword_group(
    table: &Table,
    column: &str,
    group: &KeywordGroup,
) -> Result<Table, CompareErrors> {
    let idx = table.require_column(column)?;
    let keywords: Vec<String> = group
        .keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    let rows: Vec<Vec<Cell>> = table
        .rows()
        .iter()
        .filter(|row| match row[idx].as_key() {
            Some(s) => {
                let s = s.to_lowercase();
                keywords.iter().any(|k| s.contains(k.as_str()))
            }
            None => false,
        })
        .cloned()
        .collect();
    debug!(
        "filter_by_keyword_group: group {:?}: {} -> {} rows",
        group.name,
        table.len(),
        rows.len()
    );
    Ok(table.with_rows(rows))
}

/// The filters of the comment and sentiment views, combined with AND.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct TextQuery {
    pub units: Selection,
    pub questions: Selection,
    pub keyword_group: Option<KeywordGroup>,
    /// Free-text search, case-insensitive. Empty means no search.
    pub search: String,
}

impl TextQuery {
    /// Applies the filters in a fixed order: unit and question membership,
    /// then the keyword group, then the free-text search.
    pub fn apply(&self, sheet: &SheetTable) -> Result<Table, CompareErrors> {
        let t = filter_by_selection(&sheet.table, &sheet.unit_column, &self.units)?;
        let t = filter_by_selection(&t, &sheet.question_column, &self.questions)?;
        let t = match &self.keyword_group {
            Some(group) => filter_by_keyword_group(&t, &sheet.text_column, group)?,
            None => t,
        };
        filter_by_text_contains(&t, &sheet.text_column, self.search.trim(), false)
    }
}

/*!

# Input formats

All the inputs are spreadsheets, either Excel workbooks (`.xlsx`, first worksheet unless a
worksheet name is given) or CSV files (UTF-8, comma-separated, one header row).

## Survey tables (one per cycle)

The first row holds the column names. One column is the unit key (by default the first one),
every other column is a statement ("afirmativa") with the percentage of favorable answers.

| gerencia | Q1 - Recomendo a empresa | Q2 - Confio na liderança | ... |
|----------|--------------------------|--------------------------|-----|
| North    | 80                       | 72                       |     |
| South    | 60                       | **                       |     |

The marker `**` is used when a value was suppressed. It counts as 0, and so does anything else
that cannot be read as a number.

The two cycles do not need to have the same units or the same statements: the comparison only
covers the units and statements present in both. The units are sorted, the statements keep
the order of the first cycle.

## Summary table ("ficha")

One row per unit, with at least the following columns:

| gerencia | convidados | Respondentes | Adesão | Feedback | ENPS 23 | ENPS 24 | IVR 23 | IVR 24 | Retenção 23 | Retenção 24 |
|----------|------------|--------------|--------|----------|---------|---------|--------|--------|-------------|-------------|

`Adesão` may be a number or a text such as `87.5%`. When it cannot be read, it is displayed
as `N/A`. The index columns are optional; a missing index column shows an empty value.
If a unit appears on more than one row, the first row is used.

## Comment and sentiment tables

Free-text sheets need three columns: the unit, the question and the text. They can be named
in the session file (`unitColumn`, `questionColumn`, `textColumn`), either by name or by
position (`1` or `"A"` for the first column). The default is the first three columns, in that
order. The other columns (sentiment score, date, ...) are displayed as they are.

The text is never analyzed: the views only filter rows by unit, by question, by a keyword
group and by a free-text search, in that order.

Cells of a CSV file are kept as text, while an Excel workbook gives numbers for numeric cells.
The keyword and free-text filters read numbers in their printed form (`42`, `87.5`), so a
search gives the same rows whatever the format of the file.

*/

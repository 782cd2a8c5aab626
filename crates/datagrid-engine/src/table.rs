//! Table construction and traversal.
//!
//! A [`Table`] is built in one synchronous pass: columns are prepared and
//! frozen first, then one [`Row`] per source record, each row holding one
//! [`Cell`] per column in column order, and finally an optional total row
//! computed from a distinguished aggregate record. After construction the
//! topology never changes; cells share their column through `Arc`, so a
//! cell's column is pointer-identical to the table's column at the same
//! position.

use std::collections::HashMap;
use std::sync::Arc;

use datagrid_model::{Column, ColumnKind, MetaMap, Record, Value, ValueKind};
use tracing::debug;

use crate::coerce::coerce_value;
use crate::error::Result;
use crate::options::TableOptions;
use crate::resolve::{Resolved, resolve_value};

/// Shared handle to a caller-supplied source record.
pub type SourceRecord = Arc<dyn Record>;

/// Default render patterns prepared for a downstream renderer when a
/// date-like column declares none.
const DEFAULT_DATETIME_OUTPUT: &str = "m/d/Y h:i A";
const DEFAULT_DATE_OUTPUT: &str = "m/d/Y";

/// One value of the grid, tied to its column.
#[derive(Debug, Clone)]
pub struct Cell {
    column: Arc<Column>,
    value: Value,
    meta: MetaMap,
    position: usize,
}

impl Cell {
    /// The coerced value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The owning column (shared with the table).
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// The runtime kind of the value. Errs on values coercion should have
    /// normalized (composites, raw floats, lazy accessors) — that is a
    /// modeling bug, not a data problem.
    pub fn kind(&self) -> Result<ValueKind> {
        Ok(self.value.cell_kind()?)
    }

    /// Display prefix, falling back to the column's, then empty.
    pub fn prefix(&self) -> &str {
        self.column.prefix.as_deref().unwrap_or("")
    }

    /// Display suffix, falling back to the column's, then empty.
    pub fn suffix(&self) -> &str {
        self.column.suffix.as_deref().unwrap_or("")
    }

    /// Decimal display digits, falling back to the column's, then 2.
    pub fn precision(&self) -> u32 {
        self.column.precision.unwrap_or(2)
    }

    /// Position of this cell (and its column) within the row.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }
}

/// One row of the grid: the source record it was built from plus one cell
/// per column.
#[derive(Debug, Clone)]
pub struct Row {
    record: SourceRecord,
    cells: Vec<Cell>,
    meta: MetaMap,
    position: usize,
}

impl Row {
    /// Cells in column order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, position: usize) -> Option<&Cell> {
        self.cells.get(position)
    }

    /// The source record this row was built from.
    pub fn record(&self) -> &dyn Record {
        self.record.as_ref()
    }

    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }

    /// Position within the table (the total row comes after all data rows).
    pub fn position(&self) -> usize {
        self.position
    }

    /// The first cell holding a date or datetime value, if any.
    pub fn date_cell(&self) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|cell| matches!(cell.value(), Value::Date(_) | Value::DateTime(_)))
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

/// A typed, formattable grid over a collection of source records.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Arc<Column>>,
    by_name: HashMap<String, usize>,
    rows: Vec<Row>,
    total_row: Option<Row>,
    meta: MetaMap,
}

impl Table {
    /// Build a table from value-tree records with default options and no
    /// total row. Use [`Table::builder`] for the full construction surface.
    pub fn new(records: Vec<Value>, columns: Vec<Column>) -> Result<Self> {
        Self::builder(columns).records(records).build()
    }

    pub fn builder(columns: Vec<Column>) -> TableBuilder {
        TableBuilder::new(columns)
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().map(|column| column.as_ref())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, position: usize) -> Option<&Column> {
        self.columns.get(position).map(|column| column.as_ref())
    }

    /// Look a column up by name. Unnamed columns are not indexed; on
    /// duplicate names the last column wins.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.column_position(name).and_then(|i| self.column(i))
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Name-indexed view of the columns (unnamed columns excluded, last
    /// duplicate wins). Iteration order is unspecified.
    pub fn columns_by_name(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.by_name
            .iter()
            .map(|(name, position)| (name.as_str(), self.columns[*position].as_ref()))
    }

    /// Every `(row, cell)` pair of one column, in row order. Yields nothing
    /// for out-of-range positions.
    pub fn column_cells(&self, position: usize) -> impl Iterator<Item = (&Row, &Cell)> {
        self.rows
            .iter()
            .filter_map(move |row| row.cell(position).map(|cell| (row, cell)))
    }

    /// Data rows, one per source record, in input order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, position: usize) -> Option<&Row> {
        self.rows.get(position)
    }

    /// The synthesized total row, if a total record was supplied.
    pub fn total_row(&self) -> Option<&Row> {
        self.total_row.as_ref()
    }

    /// The aggregate record the total row was built from, if any.
    pub fn total_record(&self) -> Option<&dyn Record> {
        self.total_row.as_ref().map(|row| row.record())
    }

    /// Data rows followed by the total row when present.
    pub fn all_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().chain(self.total_row.as_ref())
    }

    /// All data-row cells in row-major, column-minor order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flat_map(|row| row.cells.iter())
    }

    /// Source records in input order.
    pub fn records(&self) -> impl Iterator<Item = &dyn Record> {
        self.rows.iter().map(|row| row.record())
    }

    /// Table-level metadata.
    pub fn meta(&self) -> &MetaMap {
        &self.meta
    }

    /// Number of data rows (the total row is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Traverse `(row, column, cell)` triples over the data rows in
    /// row-major, column-minor order.
    pub fn iter(&self) -> TableIter<'_> {
        TableIter {
            table: self,
            row: 0,
            column: 0,
        }
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = (&'a Row, &'a Column, &'a Cell);
    type IntoIter = TableIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Row-major traversal over a table's data rows.
pub struct TableIter<'a> {
    table: &'a Table,
    row: usize,
    column: usize,
}

impl<'a> Iterator for TableIter<'a> {
    type Item = (&'a Row, &'a Column, &'a Cell);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = self.table.rows.get(self.row)?;
            if let Some(cell) = row.cells.get(self.column) {
                let column = &self.table.columns[self.column];
                self.column += 1;
                return Some((row, column.as_ref(), cell));
            }
            self.row += 1;
            self.column = 0;
        }
    }
}

/// Staged inputs for [`Table`] construction.
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: Vec<Column>,
    records: Vec<SourceRecord>,
    total_record: Option<SourceRecord>,
    table_meta: MetaMap,
    row_meta: MetaMap,
    cell_meta: MetaMap,
    options: TableOptions,
}

impl TableBuilder {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Append one source record.
    pub fn record(mut self, record: impl Record + 'static) -> Self {
        self.records.push(Arc::new(record));
        self
    }

    /// Append a batch of source records.
    pub fn records<I, R>(mut self, records: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Record + 'static,
    {
        self.records
            .extend(records.into_iter().map(|record| Arc::new(record) as SourceRecord));
        self
    }

    /// Supply the aggregate record the total row is computed from.
    pub fn total_record(mut self, record: impl Record + 'static) -> Self {
        self.total_record = Some(Arc::new(record));
        self
    }

    /// Table-level metadata (also consulted for `default_value` during
    /// coercion).
    pub fn table_meta(mut self, meta: MetaMap) -> Self {
        self.table_meta = meta;
        self
    }

    /// Metadata copied onto every row.
    pub fn row_meta(mut self, meta: MetaMap) -> Self {
        self.row_meta = meta;
        self
    }

    /// Metadata copied onto every cell.
    pub fn cell_meta(mut self, meta: MetaMap) -> Self {
        self.cell_meta = meta;
        self
    }

    pub fn options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the single construction pass. On error the table does not exist.
    pub fn build(self) -> Result<Table> {
        let columns = prepare_columns(self.columns);

        let mut by_name = HashMap::new();
        for (position, column) in columns.iter().enumerate() {
            if !column.name.is_empty() {
                by_name.insert(column.name.clone(), position);
            }
        }

        let context = BuildContext {
            columns: &columns,
            table_meta: &self.table_meta,
            row_meta: &self.row_meta,
            cell_meta: &self.cell_meta,
            strict: self.options.strict_paths,
        };

        let mut rows = Vec::with_capacity(self.records.len());
        for (position, record) in self.records.into_iter().enumerate() {
            rows.push(build_row(&context, record, position, false)?);
        }

        let total_row = match self.total_record {
            Some(record) => Some(build_row(&context, record, rows.len(), true)?),
            None => None,
        };

        debug!(
            rows = rows.len(),
            columns = columns.len(),
            total = total_row.is_some(),
            "built table"
        );

        Ok(Table {
            columns,
            by_name,
            rows,
            total_row,
            meta: self.table_meta,
        })
    }
}

/// Freeze columns for sharing. Date-like columns get their default render
/// pattern here, once, so coercion never mutates column metadata.
fn prepare_columns(columns: Vec<Column>) -> Vec<Arc<Column>> {
    columns
        .into_iter()
        .map(|mut column| {
            if column.output_format.is_none() {
                column.output_format = match column.kind {
                    Some(ColumnKind::DateTime) => Some(DEFAULT_DATETIME_OUTPUT.to_owned()),
                    Some(ColumnKind::Date) => Some(DEFAULT_DATE_OUTPUT.to_owned()),
                    _ => None,
                };
            }
            Arc::new(column)
        })
        .collect()
}

struct BuildContext<'a> {
    columns: &'a [Arc<Column>],
    table_meta: &'a MetaMap,
    row_meta: &'a MetaMap,
    cell_meta: &'a MetaMap,
    strict: bool,
}

fn build_row(
    context: &BuildContext<'_>,
    record: SourceRecord,
    position: usize,
    total: bool,
) -> Result<Row> {
    let mut cells = Vec::with_capacity(context.columns.len());
    for (cell_position, column) in context.columns.iter().enumerate() {
        let getter = if total {
            column.total_getter()
        } else {
            &column.value
        };
        let value = match resolve_value(record.as_ref(), column, getter, context.strict)? {
            Resolved::Dynamic(value) => coerce_value(column, context.table_meta, value)?,
            Resolved::Literal(value) => value,
        };
        cells.push(Cell {
            column: Arc::clone(column),
            value,
            meta: context.cell_meta.clone(),
            position: cell_position,
        });
    }
    Ok(Row {
        record,
        cells,
        meta: context.row_meta.clone(),
        position,
    })
}

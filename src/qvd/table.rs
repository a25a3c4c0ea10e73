//! In-memory table model.
//!
//! A [`Table`] is an ordered list of named columns plus N rows. Each column
//! keeps its distinct values in an insertion-ordered symbol list with a
//! reverse dictionary for interning; a cell is a code into that list or
//! NULL. Values are immutable once interned — mutation replaces the cell's
//! code, and unused symbols linger until [`Table::compact`] runs.
//!
//! Derived operations (filter, sort, concat, join, head/tail) return fresh
//! tables; in-place operations validate their arguments before touching any
//! state, so a failed call leaves the table unchanged.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::qvd::format::NumberFormat;
use crate::qvd::value::Value;
use crate::QvdError;

static NULL_VALUE: Value = Value::Null;

/// One column: name, symbol dictionary, number format, and tags.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    symbols: Vec<Value>,
    codes: HashMap<Value, u32>,
    number_format: NumberFormat,
    tags: Vec<String>,
}

impl Column {
    /// Empty column with default metadata.
    pub fn new(name: impl Into<String>) -> Column {
        Column {
            name: name.into(),
            symbols: Vec::new(),
            codes: HashMap::new(),
            number_format: NumberFormat::default(),
            tags: Vec::new(),
        }
    }

    /// Column seeded with decoded symbols, keeping their on-disk order.
    pub fn from_symbols(
        name: impl Into<String>,
        symbols: Vec<Value>,
        number_format: NumberFormat,
        tags: Vec<String>,
    ) -> Column {
        let mut codes = HashMap::with_capacity(symbols.len());
        for (i, v) in symbols.iter().enumerate() {
            codes.entry(v.clone()).or_insert(i as u32);
        }
        Column {
            name: name.into(),
            symbols,
            codes,
            number_format,
            tags,
        }
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct symbols in insertion order.
    pub fn symbols(&self) -> &[Value] {
        &self.symbols
    }

    /// Declared number format.
    pub fn number_format(&self) -> &NumberFormat {
        &self.number_format
    }

    /// Replace the declared number format.
    pub fn set_number_format(&mut self, format: NumberFormat) {
        self.number_format = format;
    }

    /// Domain tags (`$numeric`, `$text`, `$date`, ...).
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Replace the tag list.
    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    /// Intern a value, reusing an equal symbol or appending a new one.
    /// NULL is out-of-band and yields no code.
    fn intern(&mut self, value: Value) -> Option<u32> {
        if value.is_null() {
            return None;
        }
        if let Some(&code) = self.codes.get(&value) {
            return Some(code);
        }
        let code = self.symbols.len() as u32;
        self.symbols.push(value.clone());
        self.codes.insert(value, code);
        Some(code)
    }

    fn value(&self, code: Option<u32>) -> &Value {
        match code {
            Some(c) => &self.symbols[c as usize],
            None => &NULL_VALUE,
        }
    }
}

/// How [`Table::join`] treats unmatched rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Only key matches.
    Inner,
    /// All left rows, NULL-filled right side where unmatched.
    Left,
    /// All right rows, NULL-filled left side where unmatched.
    Right,
    /// Union of left and right rows.
    Outer,
}

/// An in-memory QVD table.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Option<u32>>>,
}

impl Table {
    /// Empty table with no columns and no rows.
    pub fn new(name: impl Into<String>) -> Table {
        Table {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Assemble a table from decoded parts. Callers guarantee uniform row
    /// width and in-range codes; the reader validates both while decoding.
    pub(crate) fn from_parts(
        name: String,
        columns: Vec<Column>,
        rows: Vec<Vec<Option<u32>>>,
    ) -> Table {
        Table {
            name,
            columns,
            rows,
        }
    }

    /// Build a table from `(name, values)` pairs; all value sequences must
    /// have the same length and names must be unique.
    pub fn from_mapping(entries: Vec<(String, Vec<Value>)>) -> Result<Table, QvdError> {
        let mut table = Table::new(crate::qvd::constants::DEFAULT_TABLE_NAME);
        let row_count = entries.first().map(|(_, v)| v.len()).unwrap_or(0);
        for (name, values) in &entries {
            if values.len() != row_count {
                return Err(QvdError::Shape(format!(
                    "Column '{}' has {} values, expected {}",
                    name,
                    values.len(),
                    row_count
                )));
            }
        }
        table.rows = vec![Vec::with_capacity(entries.len()); row_count];
        for (name, values) in entries {
            if table.columns.iter().any(|c| c.name == name) {
                return Err(QvdError::DuplicateColumn(name));
            }
            let mut column = Column::new(name);
            for (row, value) in values.into_iter().enumerate() {
                let code = column.intern(value);
                table.rows[row].push(code);
            }
            table.columns.push(column);
        }
        Ok(table)
    }

    /// The table's materialized content as `(name, values)` pairs in
    /// column order.
    pub fn to_mapping(&self) -> Vec<(String, Vec<Value>)> {
        self.columns
            .iter()
            .enumerate()
            .map(|(j, c)| {
                let values = self
                    .rows
                    .iter()
                    .map(|row| c.value(row[j]).clone())
                    .collect();
                (c.name.clone(), values)
            })
            .collect()
    }

    /// Logical table name, used as the header `TableName` on write.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the table.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Column metadata in declared order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in declared order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub(crate) fn rows(&self) -> &[Vec<Option<u32>>] {
        &self.rows
    }

    fn column_index(&self, name: &str) -> Result<usize, QvdError> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| QvdError::UnknownColumn(name.to_string()))
    }

    fn check_row_index(&self, row: usize) -> Result<(), QvdError> {
        if row >= self.rows.len() {
            return Err(QvdError::Argument(format!(
                "Row index {} out of range ({} rows)",
                row,
                self.rows.len()
            )));
        }
        Ok(())
    }

    /// Borrow the cell value at `(row, column_index)`.
    pub fn value_at(&self, row: usize, column: usize) -> &Value {
        self.columns[column].value(self.rows[row][column])
    }

    /// The cell value at `(row, column_name)`.
    pub fn get(&self, row: usize, column: &str) -> Result<Value, QvdError> {
        let j = self.column_index(column)?;
        self.check_row_index(row)?;
        Ok(self.value_at(row, j).clone())
    }

    /// Replace the cell at `(row, column_name)`; the value is interned into
    /// the column's symbol list.
    pub fn set(&mut self, row: usize, column: &str, value: Value) -> Result<(), QvdError> {
        let j = self.column_index(column)?;
        self.check_row_index(row)?;
        let code = self.columns[j].intern(value);
        self.rows[row][j] = code;
        Ok(())
    }

    /// The full row at `index`.
    pub fn row(&self, index: usize) -> Result<Vec<Value>, QvdError> {
        self.check_row_index(index)?;
        Ok((0..self.columns.len())
            .map(|j| self.value_at(index, j).clone())
            .collect())
    }

    /// Replace the full row at `index`.
    pub fn set_row(&mut self, index: usize, row: Vec<Value>) -> Result<(), QvdError> {
        self.check_row_index(index)?;
        let coded = self.intern_row(row)?;
        self.rows[index] = coded;
        Ok(())
    }

    /// The full value sequence of a column.
    pub fn column_values(&self, name: &str) -> Result<Vec<Value>, QvdError> {
        let j = self.column_index(name)?;
        Ok(self
            .rows
            .iter()
            .map(|row| self.columns[j].value(row[j]).clone())
            .collect())
    }

    /// Replace a column's values wholesale. The replacement symbol list is
    /// rebuilt from the values, dropping anything no longer referenced.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), QvdError> {
        let j = self.column_index(name)?;
        if values.len() != self.rows.len() {
            return Err(QvdError::Shape(format!(
                "Column '{}' replacement has {} values, table has {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }
        let mut column = Column::new(name);
        column.number_format = self.columns[j].number_format.clone();
        column.tags = self.columns[j].tags.clone();
        let codes: Vec<Option<u32>> = values.into_iter().map(|v| column.intern(v)).collect();
        self.columns[j] = column;
        for (row, code) in self.rows.iter_mut().zip(codes) {
            row[j] = code;
        }
        Ok(())
    }

    /// Append a new column; its length must match the row count (any length
    /// defines the shape when the table has no columns yet).
    pub fn add_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), QvdError> {
        if self.columns.iter().any(|c| c.name == name) {
            return Err(QvdError::DuplicateColumn(name.to_string()));
        }
        if !self.columns.is_empty() && values.len() != self.rows.len() {
            return Err(QvdError::Shape(format!(
                "Column '{}' has {} values, table has {} rows",
                name,
                values.len(),
                self.rows.len()
            )));
        }
        if self.columns.is_empty() {
            self.rows = vec![Vec::new(); values.len()];
        }
        let mut column = Column::new(name);
        for (row, value) in values.into_iter().enumerate() {
            let code = column.intern(value);
            self.rows[row].push(code);
        }
        self.columns.push(column);
        Ok(())
    }

    /// Declare a column's number format (drives display regeneration and
    /// the emitted `<NumberFormat>` block).
    pub fn set_column_format(&mut self, name: &str, format: NumberFormat) -> Result<(), QvdError> {
        let j = self.column_index(name)?;
        self.columns[j].number_format = format;
        Ok(())
    }

    /// Replace a column's domain tags.
    pub fn set_column_tags(&mut self, name: &str, tags: Vec<String>) -> Result<(), QvdError> {
        let j = self.column_index(name)?;
        self.columns[j].tags = tags;
        Ok(())
    }

    /// Remove a column by name.
    pub fn drop_column(&mut self, name: &str) -> Result<(), QvdError> {
        let j = self.column_index(name)?;
        self.columns.remove(j);
        for row in &mut self.rows {
            row.remove(j);
        }
        Ok(())
    }

    fn intern_row(&mut self, row: Vec<Value>) -> Result<Vec<Option<u32>>, QvdError> {
        if row.len() != self.columns.len() {
            return Err(QvdError::Shape(format!(
                "Row has {} values, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        Ok(row
            .into_iter()
            .enumerate()
            .map(|(j, v)| self.columns[j].intern(v))
            .collect())
    }

    /// Append a row of values, coercing per the value model.
    pub fn append_row(&mut self, row: Vec<Value>) -> Result<(), QvdError> {
        let coded = self.intern_row(row)?;
        self.rows.push(coded);
        Ok(())
    }

    /// Insert a row at `index` (which may equal the row count).
    pub fn insert_row(&mut self, index: usize, row: Vec<Value>) -> Result<(), QvdError> {
        if index > self.rows.len() {
            return Err(QvdError::Argument(format!(
                "Insert index {} out of range ({} rows)",
                index,
                self.rows.len()
            )));
        }
        let coded = self.intern_row(row)?;
        self.rows.insert(index, coded);
        Ok(())
    }

    /// Remove the row at `index`.
    pub fn drop_row(&mut self, index: usize) -> Result<(), QvdError> {
        self.check_row_index(index)?;
        self.rows.remove(index);
        Ok(())
    }

    /// The first `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        self.slice(0, n.min(self.rows.len()))
    }

    /// The last `n` rows as a new table.
    pub fn tail(&self, n: usize) -> Table {
        let n = n.min(self.rows.len());
        self.slice(self.rows.len() - n, self.rows.len())
    }

    fn slice(&self, start: usize, end: usize) -> Table {
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows[start..end].to_vec(),
        }
    }

    /// Rows where `predicate` holds for the named column's value, in
    /// original order. Symbol lists are reused as-is.
    pub fn filter_by<F>(&self, column: &str, predicate: F) -> Result<Table, QvdError>
    where
        F: Fn(&Value) -> bool,
    {
        let j = self.column_index(column)?;
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(self.columns[j].value(row[j])))
            .cloned()
            .collect();
        Ok(Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Stable sort by the named column using the value model's order.
    pub fn sort_by(&self, column: &str, ascending: bool) -> Result<Table, QvdError> {
        self.sort_by_with(column, ascending, Value::cmp_order)
    }

    /// Stable sort with a caller-supplied comparator.
    pub fn sort_by_with<F>(
        &self,
        column: &str,
        ascending: bool,
        compare: F,
    ) -> Result<Table, QvdError>
    where
        F: Fn(&Value, &Value) -> Ordering,
    {
        let j = self.column_index(column)?;
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| {
            let va = self.columns[j].value(self.rows[a][j]);
            let vb = self.columns[j].value(self.rows[b][j]);
            let ord = compare(va, vb);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        });
        let rows = order.into_iter().map(|i| self.rows[i].clone()).collect();
        Ok(Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows,
        })
    }

    /// Row-wise union with `other` as a new table. Column sets must match
    /// by name; column order comes from `self`. Symbol lists are unioned
    /// preserving first-seen order and `other`'s codes are remapped.
    pub fn concat(&self, other: &Table) -> Result<Table, QvdError> {
        let mut out = self.clone();
        out.concat_inplace(other)?;
        Ok(out)
    }

    /// Row-wise union mutating `self`.
    pub fn concat_inplace(&mut self, other: &Table) -> Result<(), QvdError> {
        if other.columns.len() != self.columns.len() {
            return Err(QvdError::Shape(format!(
                "Cannot concat: {} columns vs {}",
                self.columns.len(),
                other.columns.len()
            )));
        }
        // Map each of our columns to other's column of the same name,
        // before mutating anything.
        let mut source = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            source.push(other.column_index(&column.name).map_err(|_| {
                QvdError::Shape(format!(
                    "Cannot concat: column '{}' missing from right-hand table",
                    column.name
                ))
            })?);
        }

        // Union symbol lists and build per-column code remaps for other.
        let mut remaps: Vec<Vec<u32>> = Vec::with_capacity(self.columns.len());
        for (j, column) in self.columns.iter_mut().enumerate() {
            let other_column = &other.columns[source[j]];
            let remap = other_column
                .symbols
                .iter()
                .map(|v| match column.intern(v.clone()) {
                    Some(code) => code,
                    None => unreachable!("symbol lists never hold NULL"),
                })
                .collect();
            remaps.push(remap);
        }

        self.rows.reserve(other.rows.len());
        for row in &other.rows {
            let mapped = (0..self.columns.len())
                .map(|j| row[source[j]].map(|code| remaps[j][code as usize]))
                .collect();
            self.rows.push(mapped);
        }
        Ok(())
    }

    /// Equi-join on one or more key columns.
    ///
    /// Key equality follows the value model (NULL keys match each other).
    /// Non-key names colliding across the two sides get `lsuffix`/`rsuffix`
    /// appended. Output rows: every matched left row in left order (paired
    /// with its right matches in right order), left-only rows for
    /// `Left`/`Outer`, then unmatched right rows in right order for
    /// `Right`/`Outer`.
    pub fn join(
        &self,
        other: &Table,
        on: &[&str],
        how: JoinKind,
        lsuffix: &str,
        rsuffix: &str,
    ) -> Result<Table, QvdError> {
        if on.is_empty() {
            return Err(QvdError::Argument(
                "Join requires at least one key column".to_string(),
            ));
        }
        let left_keys: Vec<usize> = on
            .iter()
            .map(|name| self.column_index(name))
            .collect::<Result<_, _>>()?;
        let right_keys: Vec<usize> = on
            .iter()
            .map(|name| other.column_index(name))
            .collect::<Result<_, _>>()?;

        let left_extra: Vec<usize> = (0..self.columns.len())
            .filter(|j| !left_keys.contains(j))
            .collect();
        let right_extra: Vec<usize> = (0..other.columns.len())
            .filter(|j| !right_keys.contains(j))
            .collect();

        // Resolve output names, applying suffixes to cross-side collisions.
        let mut names: Vec<String> = on.iter().map(|s| s.to_string()).collect();
        for &j in &left_extra {
            let base = &self.columns[j].name;
            let collides = right_extra
                .iter()
                .any(|&k| &other.columns[k].name == base);
            names.push(if collides {
                format!("{}{}", base, lsuffix)
            } else {
                base.clone()
            });
        }
        for &k in &right_extra {
            let base = &other.columns[k].name;
            let collides = left_extra.iter().any(|&j| &self.columns[j].name == base);
            names.push(if collides {
                format!("{}{}", base, rsuffix)
            } else {
                base.clone()
            });
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(QvdError::DuplicateColumn(name.clone()));
            }
        }

        // Seed output columns, carrying source metadata.
        let mut columns = Vec::with_capacity(names.len());
        let mut name_iter = names.into_iter();
        for &j in &left_keys {
            let mut c = Column::new(name_iter.next().unwrap_or_default());
            c.number_format = self.columns[j].number_format.clone();
            c.tags = self.columns[j].tags.clone();
            columns.push(c);
        }
        for &j in &left_extra {
            let mut c = Column::new(name_iter.next().unwrap_or_default());
            c.number_format = self.columns[j].number_format.clone();
            c.tags = self.columns[j].tags.clone();
            columns.push(c);
        }
        for &k in &right_extra {
            let mut c = Column::new(name_iter.next().unwrap_or_default());
            c.number_format = other.columns[k].number_format.clone();
            c.tags = other.columns[k].tags.clone();
            columns.push(c);
        }
        let mut out = Table {
            name: self.name.clone(),
            columns,
            rows: Vec::new(),
        };

        // Hash right rows by key, preserving right order within a key.
        let mut right_by_key: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
        for i in 0..other.rows.len() {
            let key: Vec<Value> = right_keys
                .iter()
                .map(|&k| other.value_at(i, k).clone())
                .collect();
            right_by_key.entry(key).or_default().push(i);
        }

        let mut right_matched = vec![false; other.rows.len()];
        for i in 0..self.rows.len() {
            let key: Vec<Value> = left_keys
                .iter()
                .map(|&j| self.value_at(i, j).clone())
                .collect();
            match right_by_key.get(&key) {
                Some(matches) => {
                    for &r in matches {
                        right_matched[r] = true;
                        let mut row: Vec<Value> = key.clone();
                        row.extend(left_extra.iter().map(|&j| self.value_at(i, j).clone()));
                        row.extend(right_extra.iter().map(|&k| other.value_at(r, k).clone()));
                        out.append_row(row)?;
                    }
                }
                None => {
                    if matches!(how, JoinKind::Left | JoinKind::Outer) {
                        let mut row: Vec<Value> = key.clone();
                        row.extend(left_extra.iter().map(|&j| self.value_at(i, j).clone()));
                        row.extend(right_extra.iter().map(|_| Value::Null));
                        out.append_row(row)?;
                    }
                }
            }
        }

        if matches!(how, JoinKind::Right | JoinKind::Outer) {
            for (r, matched) in right_matched.iter().enumerate() {
                if *matched {
                    continue;
                }
                let mut row: Vec<Value> = right_keys
                    .iter()
                    .map(|&k| other.value_at(r, k).clone())
                    .collect();
                row.extend(left_extra.iter().map(|_| Value::Null));
                row.extend(right_extra.iter().map(|&k| other.value_at(r, k).clone()));
                out.append_row(row)?;
            }
        }

        Ok(out)
    }

    /// Drop symbols no longer referenced by any row and renumber codes.
    pub fn compact(&mut self) {
        for j in 0..self.columns.len() {
            let mut used = vec![false; self.columns[j].symbols.len()];
            for row in &self.rows {
                if let Some(code) = row[j] {
                    used[code as usize] = true;
                }
            }
            if used.iter().all(|&u| u) {
                continue;
            }
            let mut remap = vec![None; used.len()];
            let mut symbols = Vec::new();
            for (old, keep) in used.iter().enumerate() {
                if *keep {
                    remap[old] = Some(symbols.len() as u32);
                    symbols.push(self.columns[j].symbols[old].clone());
                }
            }
            let column = Column::from_symbols(
                self.columns[j].name.clone(),
                symbols,
                self.columns[j].number_format.clone(),
                self.columns[j].tags.clone(),
            );
            self.columns[j] = column;
            for row in &mut self.rows {
                row[j] = row[j].and_then(|code| remap[code as usize]);
            }
        }
    }
}

impl PartialEq for Table {
    /// Value-wise equality: same column names in order and equal
    /// materialized cells. Symbol order, formats, and tags do not
    /// participate.
    fn eq(&self, other: &Table) -> bool {
        if self.columns.len() != other.columns.len() || self.rows.len() != other.rows.len() {
            return false;
        }
        if self
            .columns
            .iter()
            .zip(&other.columns)
            .any(|(a, b)| a.name != b.name)
        {
            return false;
        }
        for i in 0..self.rows.len() {
            for j in 0..self.columns.len() {
                if self.value_at(i, j) != other.value_at(i, j) {
                    return false;
                }
            }
        }
        true
    }
}

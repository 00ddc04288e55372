//! Merge engine: outer join on the canonical country key and column coalescing

use crate::columns::{normalize_table_columns, COUNTRY, COUNTRY_FULL_NAME};
use crate::config::MergeConfig;
use crate::error::{Error, Result};
use crate::names::resolve_cell;
use crate::outcome::Outcome;
use crate::table::{CellValue, Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Label used for the integrated table
pub const SOURCE_NAME: &str = "integrated";

/// Which side wins when both sides hold a value for a shared column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoalescePolicy {
    /// Take the left value; fall back to the right one where the left is null
    #[default]
    PreferLeft,
    /// Take the right value; fall back to the left one where the right is null
    PreferRight,
}

/// A column present in both tables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedColumn {
    /// Column name (identical on both sides)
    pub name: String,
    /// Index in the left table
    pub left: usize,
    /// Index in the right table
    pub right: usize,
}

/// The two values a shared column holds for one joined row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairedValue<'a> {
    pub left: &'a CellValue,
    pub right: &'a CellValue,
}

impl<'a> PairedValue<'a> {
    pub fn new(left: &'a CellValue, right: &'a CellValue) -> Self {
        Self { left, right }
    }

    /// First non-null value in policy order
    pub fn coalesce(&self, policy: CoalescePolicy) -> CellValue {
        let (first, second) = match policy {
            CoalescePolicy::PreferLeft => (self.left, self.right),
            CoalescePolicy::PreferRight => (self.right, self.left),
        };
        if first.is_empty() {
            second.clone()
        } else {
            first.clone()
        }
    }

    /// Both sides hold different non-null values
    pub fn is_conflict(&self) -> bool {
        !self.left.is_empty() && !self.right.is_empty() && self.left != self.right
    }
}

/// One output row of an outer join
#[derive(Debug, Clone)]
pub struct JoinedRow<'a> {
    /// Canonical key
    pub key: String,
    /// Matching row from the left table, if any
    pub left: Option<&'a Row>,
    /// Matching row from the right table, if any
    pub right: Option<&'a Row>,
}

/// Counters describing a join
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinStats {
    pub matched: usize,
    pub left_only: usize,
    pub right_only: usize,
    /// Rows dropped because their key was null
    pub keyless: usize,
    /// Per shared column, values taken from the fallback side
    pub filled: BTreeMap<String, usize>,
    /// Per shared column, rows where both sides disagreed
    pub conflicts: BTreeMap<String, usize>,
}

/// Structural outer join of two tables on a key column
///
/// Keeps the left row, the right row, and the shared-column pairing apart
/// so the coalesce policy is applied explicitly in [`OuterJoin::materialize`].
#[derive(Debug)]
pub struct OuterJoin<'a> {
    left: &'a Table,
    right: &'a Table,
    key_column: String,
    left_key: usize,
    right_key: usize,
    /// Joined rows ordered by key
    pub rows: Vec<JoinedRow<'a>>,
    /// Columns present on both sides, excluding the key
    pub shared: Vec<SharedColumn>,
    keyless: usize,
}

impl<'a> OuterJoin<'a> {
    /// Join `left` and `right` on `key_column`
    ///
    /// Keys are compared by their text form. Rows whose key is null are not
    /// joinable and are counted as keyless. Duplicate keys fan out into every
    /// left/right combination.
    pub fn new(left: &'a Table, right: &'a Table, key_column: &str) -> Result<Self> {
        let left_key = left.require_column(key_column)?;
        let right_key = right.require_column(key_column)?;

        // Using BTreeMap for deterministic ordering
        let mut groups: BTreeMap<String, (Vec<&'a Row>, Vec<&'a Row>)> = BTreeMap::new();
        let mut keyless = 0;

        for row in &left.rows {
            match join_key(row, left_key) {
                Some(key) => groups.entry(key).or_default().0.push(row),
                None => keyless += 1,
            }
        }
        for row in &right.rows {
            match join_key(row, right_key) {
                Some(key) => groups.entry(key).or_default().1.push(row),
                None => keyless += 1,
            }
        }

        let mut rows = Vec::new();
        for (key, (lefts, rights)) in groups {
            match (lefts.is_empty(), rights.is_empty()) {
                (false, false) => {
                    for l in &lefts {
                        for r in &rights {
                            rows.push(JoinedRow {
                                key: key.clone(),
                                left: Some(*l),
                                right: Some(*r),
                            });
                        }
                    }
                }
                (false, true) => rows.extend(lefts.into_iter().map(|l| JoinedRow {
                    key: key.clone(),
                    left: Some(l),
                    right: None,
                })),
                (true, false) => rows.extend(rights.into_iter().map(|r| JoinedRow {
                    key: key.clone(),
                    left: None,
                    right: Some(r),
                })),
                (true, true) => {}
            }
        }

        let shared = left
            .columns
            .iter()
            .filter(|c| c.name != key_column)
            .filter_map(|c| {
                right.column_index(&c.name).map(|r| SharedColumn {
                    name: c.name.clone(),
                    left: c.index,
                    right: r,
                })
            })
            .collect();

        Ok(Self {
            left,
            right,
            key_column: key_column.to_string(),
            left_key,
            right_key,
            rows,
            shared,
            keyless,
        })
    }

    /// Left and right values of a shared column for one joined row
    pub fn paired(&self, row: &JoinedRow<'a>, column: &SharedColumn) -> PairedValue<'a> {
        PairedValue::new(cell_at(row.left, column.left), cell_at(row.right, column.right))
    }

    /// Counters for this join, with coalescing measured under `policy`
    pub fn stats(&self, policy: CoalescePolicy) -> JoinStats {
        let mut stats = JoinStats {
            keyless: self.keyless,
            ..JoinStats::default()
        };
        for row in &self.rows {
            match (row.left.is_some(), row.right.is_some()) {
                (true, true) => stats.matched += 1,
                (true, false) => stats.left_only += 1,
                _ => stats.right_only += 1,
            }
            for column in &self.shared {
                let pair = self.paired(row, column);
                let preferred = match policy {
                    CoalescePolicy::PreferLeft => pair.left,
                    CoalescePolicy::PreferRight => pair.right,
                };
                if preferred.is_empty() && !pair.coalesce(policy).is_empty() {
                    *stats.filled.entry(column.name.clone()).or_default() += 1;
                }
                if pair.is_conflict() {
                    *stats.conflicts.entry(column.name.clone()).or_default() += 1;
                }
            }
        }
        stats
    }

    /// Build the joined table
    ///
    /// Column order: left columns (shared ones coalesced in place), then
    /// columns only the right table has.
    pub fn materialize(&self, policy: CoalescePolicy, source: &str) -> Table {
        enum Slot<'s> {
            Key,
            Left(usize),
            Shared(&'s SharedColumn),
            Right(usize),
        }

        let mut names = Vec::new();
        let mut slots = Vec::new();
        for col in &self.left.columns {
            names.push(col.name.clone());
            if col.index == self.left_key {
                slots.push(Slot::Key);
            } else if let Some(shared) = self.shared.iter().find(|s| s.left == col.index) {
                slots.push(Slot::Shared(shared));
            } else {
                slots.push(Slot::Left(col.index));
            }
        }
        let shared_right: HashSet<usize> = self.shared.iter().map(|s| s.right).collect();
        for col in &self.right.columns {
            if col.index != self.right_key && !shared_right.contains(&col.index) {
                names.push(col.name.clone());
                slots.push(Slot::Right(col.index));
            }
        }

        let mut table = Table::with_columns(source, &names);
        for joined in &self.rows {
            let cells = slots
                .iter()
                .map(|slot| match slot {
                    Slot::Key => {
                        let pair = PairedValue::new(
                            cell_at(joined.left, self.left_key),
                            cell_at(joined.right, self.right_key),
                        );
                        pair.coalesce(CoalescePolicy::PreferLeft)
                    }
                    Slot::Left(i) => cell_at(joined.left, *i).clone(),
                    Slot::Shared(column) => self.paired(joined, column).coalesce(policy),
                    Slot::Right(i) => cell_at(joined.right, *i).clone(),
                })
                .collect();
            table.rows.push(Row::new(cells));
        }
        debug!(
            key = %self.key_column,
            rows = table.row_count(),
            shared = self.shared.len(),
            "materialized outer join"
        );
        table
    }
}

static NULL_CELL: CellValue = CellValue::Empty;

fn cell_at(row: Option<&Row>, idx: usize) -> &CellValue {
    row.and_then(|r| r.get(idx)).unwrap_or(&NULL_CELL)
}

fn join_key(row: &Row, idx: usize) -> Option<String> {
    match row.get(idx)? {
        CellValue::Empty => None,
        cell => Some(cell.to_string_value()),
    }
}

/// Fold leftover `<name>_x` / `<name>_y` columns into `<name>`
///
/// Such columns only appear when an upstream source already carries suffixed
/// names. A suffixed column is skipped when `<name>` already exists; a
/// matching pair is coalesced left-first; a lone variant is renamed.
pub fn fold_suffixed_columns(table: &mut Table) {
    let suffixed: Vec<String> = table
        .columns
        .iter()
        .filter(|c| c.name.ends_with("_x") || c.name.ends_with("_y"))
        .map(|c| c.name.clone())
        .collect();

    for name in suffixed {
        if !table.has_column(&name) {
            continue; // consumed as the partner of an earlier column
        }
        let base = &name[..name.len() - 2];
        if base.is_empty() || table.has_column(base) {
            continue;
        }
        let x = format!("{base}_x");
        let y = format!("{base}_y");
        match (table.column_index(&x), table.column_index(&y)) {
            (Some(xi), Some(yi)) => {
                let merged: Vec<CellValue> = table
                    .rows
                    .iter()
                    .map(|row| {
                        PairedValue::new(cell_at(Some(row), xi), cell_at(Some(row), yi))
                            .coalesce(CoalescePolicy::PreferLeft)
                    })
                    .collect();
                table.drop_column(&x);
                table.drop_column(&y);
                table.push_column(base, merged);
            }
            _ => {
                table.rename_column(&name, base);
            }
        }
    }
}

/// Reconcile the relational and document tables into the integrated table
///
/// Both inputs must be non-empty; otherwise the result is
/// [`Outcome::Empty`] with an [`Error::IntegrationPrecondition`]. Any other
/// failure also yields an empty outcome carrying the reason.
pub fn integrate(relational: &Table, documents: &Table, config: &MergeConfig) -> Outcome<Table> {
    let mut missing = Vec::new();
    if relational.is_empty() {
        missing.push("relational");
    }
    if documents.is_empty() {
        missing.push("document");
    }
    if !missing.is_empty() {
        let reason =
            Error::IntegrationPrecondition(format!("{} table is empty", missing.join(" and ")));
        warn!(error = %reason, "skipping integration");
        return Outcome::Empty { reason };
    }

    match try_integrate(relational, documents, config) {
        Ok(table) => Outcome::Complete(table),
        Err(reason) => {
            warn!(error = %reason, "integration failed");
            Outcome::Empty { reason }
        }
    }
}

fn try_integrate(relational: &Table, documents: &Table, config: &MergeConfig) -> Result<Table> {
    let left = prepare_side(relational)?;
    let right = prepare_side(documents)?;

    let join = OuterJoin::new(&left, &right, COUNTRY)?;
    let stats = join.stats(config.coalesce);
    if stats.keyless > 0 {
        warn!(rows = stats.keyless, "dropped rows without a country key");
    }
    for (column, count) in &stats.conflicts {
        debug!(column = %column, rows = count, policy = ?config.coalesce, "sources disagree; policy side kept");
    }

    let mut table = join.materialize(config.coalesce, SOURCE_NAME);
    fold_suffixed_columns(&mut table);
    table.dedup_by_column(COUNTRY)?;

    if config.drop_empty_columns {
        let dropped = table.drop_empty_columns();
        if !dropped.is_empty() {
            debug!(columns = ?dropped, "dropped all-null columns");
        }
    }

    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        matched = stats.matched,
        relational_only = stats.left_only,
        document_only = stats.right_only,
        "integration finished"
    );
    Ok(table)
}

/// Resolve country names, collapse duplicate keys, drop the legacy name column
fn prepare_side(input: &Table) -> Result<Table> {
    let mut table = input.clone();
    normalize_table_columns(&mut table);

    if table.has_column(COUNTRY) {
        table.map_column(COUNTRY, resolve_cell);
    } else if table.has_column(COUNTRY_FULL_NAME) {
        let resolved: Vec<CellValue> = table
            .column_values(COUNTRY_FULL_NAME)
            .into_iter()
            .flatten()
            .map(resolve_cell)
            .collect();
        table.push_column(COUNTRY, resolved);
    } else {
        return Err(Error::missing_column(&table.source, COUNTRY));
    }

    table.dedup_by_column(COUNTRY)?;
    table.drop_column(COUNTRY_FULL_NAME);
    Ok(table)
}

//! Warehouse export projection of the integrated table

use crate::columns::{
    cost_field, AGING_RATE, AVG_TOTAL_COST, BIG_MAC_PRICE, CAPITAL, CONTINENT, COST_CATEGORIES,
    COUNTRY, POPULATION, PRICE_LEVELS, REGION,
};
use crate::error::{Error, Result};
use crate::relational::coerce_numeric_column;
use crate::table::{CellValue, Row, Table};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Column name fragments that mark a numeric column
const NUMERIC_MARKERS: [&str; 5] = ["precio", "costo", "tasa", "poblacion", "usd"];

/// Storage type of an exported column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Integer,
    Float,
    Structured,
}

impl ColumnKind {
    /// Warehouse SQL type name
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Text => "VARCHAR(255)",
            ColumnKind::Integer => "BIGINT",
            ColumnKind::Float => "FLOAT",
            ColumnKind::Structured => "JSONB",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportColumn {
    pub name: String,
    pub kind: ColumnKind,
}

/// Integrated table prepared for loading, with its column types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportTable {
    pub table: Table,
    pub schema: Vec<ExportColumn>,
}

/// Column order of the exported table; remaining columns follow as they were
pub fn preferred_order() -> Vec<String> {
    let mut order: Vec<String> = [
        COUNTRY,
        CAPITAL,
        CONTINENT,
        REGION,
        POPULATION,
        AGING_RATE,
        BIG_MAC_PRICE,
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    for category in COST_CATEGORIES {
        for level in PRICE_LEVELS {
            order.push(cost_field(category, level));
        }
    }
    order.push(AVG_TOTAL_COST.to_string());
    order
}

/// Build the export projection of an integrated table
pub fn prepare_export(integrated: &Table) -> ExportTable {
    let mut table = integrated.clone();

    let numeric: Vec<String> = table
        .column_names()
        .into_iter()
        .filter(|name| NUMERIC_MARKERS.iter().any(|m| name.contains(m)))
        .map(str::to_string)
        .collect();
    for column in &numeric {
        coerce_numeric_column(&mut table, column);
    }

    let before = table.row_count();
    table.retain_rows(|row| !row.is_blank());
    if table.row_count() < before {
        debug!(dropped = before - table.row_count(), "dropped all-null rows");
    }

    let mut table = reorder(&table, &preferred_order());
    table.rename_columns(|name| name.replace('.', "_"));

    let schema = table
        .columns
        .iter()
        .map(|col| {
            let kind = if col.name == POPULATION {
                ColumnKind::Integer
            } else if numeric.iter().any(|n| n.replace('.', "_") == col.name) {
                ColumnKind::Float
            } else if table
                .rows
                .iter()
                .any(|r| matches!(r.get(col.index), Some(CellValue::Structured(_))))
            {
                ColumnKind::Structured
            } else {
                ColumnKind::Text
            };
            ExportColumn {
                name: col.name.clone(),
                kind,
            }
        })
        .collect::<Vec<_>>();

    for column in &schema {
        match column.kind {
            ColumnKind::Integer => {
                table.map_column(&column.name, to_integer);
            }
            ColumnKind::Float => {
                table.map_column(&column.name, to_float);
            }
            _ => {}
        }
    }

    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        "export projection ready"
    );
    ExportTable { table, schema }
}

fn to_integer(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::Float(f) => CellValue::Integer(f.round() as i64),
        other => other.clone(),
    }
}

fn to_float(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::Integer(i) => CellValue::Float(*i as f64),
        other => other.clone(),
    }
}

/// Rebuild a table with `preferred` columns first
fn reorder(table: &Table, preferred: &[String]) -> Table {
    let mut indices: Vec<usize> = preferred
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();
    indices.extend(
        table
            .columns
            .iter()
            .map(|c| c.index)
            .filter(|i| !indices.contains(i))
            .collect::<Vec<_>>(),
    );

    let names: Vec<&str> = indices
        .iter()
        .map(|&i| table.columns[i].name.as_str())
        .collect();
    let mut out = Table::with_columns(table.source.clone(), &names);
    out.rows = table
        .rows
        .iter()
        .map(|row| {
            Row::new(
                indices
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or(CellValue::Empty))
                    .collect(),
            )
        })
        .collect();
    out
}

impl ExportTable {
    /// Write the projection as CSV; nulls become empty fields
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let source_name = self.table.source.clone();
        let csv_err = |e: csv::Error| Error::Csv {
            source_name: source_name.clone(),
            source: e,
        };

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer
            .write_record(self.table.columns.iter().map(|c| c.name.as_str()))
            .map_err(csv_err)?;
        for row in &self.table.rows {
            csv_writer
                .write_record(row.cells.iter().map(CellValue::to_string_value))
                .map_err(csv_err)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the projection to a CSV file
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_csv(BufWriter::new(file))
    }

    /// `CREATE TABLE` column list for the warehouse
    pub fn column_definitions(&self) -> Vec<String> {
        self.schema
            .iter()
            .map(|c| format!("{} {}", c.name, c.kind.sql_type()))
            .collect()
    }
}

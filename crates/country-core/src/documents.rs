//! Flattening and joining of the document-store collections
//!
//! Tourism documents carry a nested `category -> level -> price` object.
//! It is flattened into dotted columns, then the tourism table is joined
//! with the Big Mac price table on the canonical country.

use crate::columns::{
    canonical_column, cost_field, cost_key_aliases, normalize, normalize_table_columns,
    AVERAGE_LEVEL, AVG_TOTAL_COST, BIG_MAC_PRICE, COST_CATEGORIES, COUNTRY, DAILY_COSTS,
    PRICE_LEVELS,
};
use crate::error::{Error, Result};
use crate::merger::{CoalescePolicy, OuterJoin};
use crate::names::resolve_cell;
use crate::outcome::Outcome;
use crate::parser::RawRecord;
use crate::relational::coerce_numeric_column;
use crate::table::{CellValue, Row, Table};
use serde_json::{Map, Number, Value};
use tracing::{debug, info, warn};

/// Label used for the document table
pub const SOURCE_NAME: &str = "documents";
pub const TOURISM_SOURCE: &str = "tourism";
pub const PRICES_SOURCE: &str = "big_mac";

/// Column name fragments that mark a numeric price column
const PRICE_MARKERS: [&str; 3] = ["costo", "precio", "usd"];

type Step = fn(&Table) -> Result<Table>;

/// Steps run after the join, in order
const STEPS: &[(&str, Step)] = &[
    ("drop_duplicates", drop_duplicates as Step),
    ("normalize_columns", normalize_columns as Step),
    ("resolve_countries", resolve_countries as Step),
    ("coerce_prices", coerce_prices as Step),
];

/// Find the nested cost object of a tourism record
fn cost_object(record: &RawRecord) -> Option<&Map<String, Value>> {
    record
        .iter()
        .find(|(key, _)| canonical_column(&normalize(key)) == DAILY_COSTS)
        .and_then(|(_, value)| value.as_object())
}

/// Look up `key` or one of its English spellings
fn get_aliased<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object
        .get(key)
        .or_else(|| cost_key_aliases(key).find_map(|alias| object.get(alias)))
}

/// Price for a category and level, or `None` when any part is missing
///
/// Numbers and numeric strings count as prices. Malformed nesting is treated
/// as absent.
pub fn get_price(record: &RawRecord, category: &str, level: &str) -> Option<f64> {
    let costs = cost_object(record)?;
    let price = get_aliased(costs, category)?.as_object()?;
    let value = match get_aliased(price, level)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    value.filter(|f: &f64| f.is_finite())
}

/// Replace the nested cost object with flat `category.level` fields
///
/// Adds `costo_promedio_total`, the sum of the average prices present (0 when
/// none are). Records without a cost object are returned unchanged; a cost
/// field that is not an object is removed.
pub fn flatten_costs(record: &RawRecord) -> RawRecord {
    let Some(cost_key) = record
        .keys()
        .find(|key| canonical_column(&normalize(key)) == DAILY_COSTS)
        .cloned()
    else {
        return record.clone();
    };

    let mut flat: RawRecord = record
        .iter()
        .filter(|(key, _)| **key != cost_key)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    if cost_object(record).is_none() {
        debug!(field = %cost_key, "cost field is not an object; discarded");
        return flat;
    }

    let mut total = 0.0;
    for category in COST_CATEGORIES {
        for level in PRICE_LEVELS {
            let price = get_price(record, category, level);
            if level == AVERAGE_LEVEL {
                total += price.unwrap_or(0.0);
            }
            flat.insert(cost_field(category, level), number(price));
        }
    }
    flat.insert(AVG_TOTAL_COST.to_string(), number(Some(total)));
    flat
}

fn number(value: Option<f64>) -> Value {
    value
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Transform the tourism and price collections into one table
///
/// Either collection may be absent. When both are, the outcome is
/// [`Outcome::Empty`]. A failing step leaves the table as it stood before
/// that step, tagged partial.
pub fn transform(tourism: Option<&[RawRecord]>, prices: Option<&[RawRecord]>) -> Outcome<Table> {
    let flattened: Vec<RawRecord> = tourism.unwrap_or_default().iter().map(flatten_costs).collect();
    let tourism_table = Table::from_records(TOURISM_SOURCE, &flattened);
    let price_table = Table::from_records(PRICES_SOURCE, prices.unwrap_or_default());
    debug!(
        tourism_rows = tourism_table.row_count(),
        price_rows = price_table.row_count(),
        "document collections loaded"
    );

    let mut table = match combine(&tourism_table, &price_table) {
        Ok(table) => table,
        Err(reason @ Error::SourceUnavailable { .. }) => {
            warn!(error = %reason, "no document data");
            return Outcome::Empty { reason };
        }
        Err(reason) => {
            warn!(step = "combine", error = %reason, "document transform stopped early");
            return Outcome::Partial {
                value: tourism_table,
                reason,
            };
        }
    };

    for (name, step) in STEPS {
        match step(&table) {
            Ok(next) => table = next,
            Err(reason) => {
                warn!(step = *name, error = %reason, "document transform stopped early");
                return Outcome::Partial {
                    value: table,
                    reason,
                };
            }
        }
    }

    info!(
        rows = table.row_count(),
        columns = table.column_count(),
        "document transform finished"
    );
    Outcome::Complete(table)
}

/// Outer-join tourism with the Big Mac price column
fn combine(tourism: &Table, prices: &Table) -> Result<Table> {
    let mut table = match (tourism.is_empty(), prices.is_empty()) {
        (true, true) => {
            return Err(Error::unavailable(SOURCE_NAME, "tourism and price collections are empty"))
        }
        (false, true) => tourism.clone(),
        (true, false) => prices.clone(),
        (false, false) => {
            let left = resolve_countries(&normalize_columns(tourism)?)?;
            let right = price_projection(&resolve_countries(&normalize_columns(prices)?)?)?;
            OuterJoin::new(&left, &right, COUNTRY)?
                .materialize(CoalescePolicy::PreferLeft, SOURCE_NAME)
        }
    };
    table.source = SOURCE_NAME.to_string();
    Ok(table)
}

/// Keep only the country key and the Big Mac price
fn price_projection(prices: &Table) -> Result<Table> {
    let country = prices.require_column(COUNTRY)?;
    let price = prices.require_column(BIG_MAC_PRICE)?;

    let mut projected = Table::with_columns(prices.source.clone(), &[COUNTRY, BIG_MAC_PRICE]);
    projected.rows = prices
        .rows
        .iter()
        .map(|row| {
            Row::new(vec![
                row.get(country).cloned().unwrap_or(CellValue::Empty),
                row.get(price).cloned().unwrap_or(CellValue::Empty),
            ])
        })
        .collect();
    Ok(projected)
}

fn drop_duplicates(table: &Table) -> Result<Table> {
    let mut out = table.clone();
    out.drop_duplicates();
    Ok(out)
}

fn normalize_columns(table: &Table) -> Result<Table> {
    let mut out = table.clone();
    normalize_table_columns(&mut out);
    Ok(out)
}

fn resolve_countries(table: &Table) -> Result<Table> {
    let mut out = table.clone();
    if !out.map_column(COUNTRY, resolve_cell) {
        return Err(Error::missing_column(&table.source, COUNTRY));
    }
    Ok(out)
}

fn coerce_prices(table: &Table) -> Result<Table> {
    let mut out = table.clone();
    let price_columns: Vec<String> = out
        .column_names()
        .into_iter()
        .filter(|name| PRICE_MARKERS.iter().any(|m| name.contains(m)))
        .map(str::to_string)
        .collect();
    for column in &price_columns {
        let failures = coerce_numeric_column(&mut out, column);
        if failures > 0 {
            debug!(column = %column, failures, "unparseable prices set to null");
        }
    }
    Ok(out)
}

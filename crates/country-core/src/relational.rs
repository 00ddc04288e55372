//! Cleaning and typing of the relational extract

use crate::columns::{
    normalize_table_columns, AGING_RATE, CONTINENT, COUNTRY, COUNTRY_FULL_NAME, POPULATION,
};
use crate::error::{Error, Result};
use crate::outcome::Outcome;
use crate::parser::RawRecord;
use crate::table::{CellValue, Table};
use crate::text::title_case;
use tracing::{debug, info, warn};

/// Label used for the relational table
pub const SOURCE_NAME: &str = "relational";

/// Transform raw relational rows into a normalized table
///
/// Empty input yields [`Outcome::Empty`]. If the country or continent column
/// is missing, the table is returned as far as it got, tagged partial.
pub fn transform(records: &[RawRecord]) -> Outcome<Table> {
    if records.is_empty() {
        return Outcome::Empty {
            reason: Error::unavailable(SOURCE_NAME, "no rows extracted"),
        };
    }

    let mut table = Table::from_records(SOURCE_NAME, records);
    normalize_table_columns(&mut table);
    table.drop_duplicates();

    let outcome = match clean(&mut table) {
        Ok(()) => Outcome::Complete(table),
        Err(reason) => {
            warn!(error = %reason, "relational transform stopped early");
            Outcome::Partial {
                value: table,
                reason,
            }
        }
    };

    if let Some(table) = outcome.value() {
        info!(
            rows = table.row_count(),
            aging_rate_values = table.non_null_count(AGING_RATE),
            "relational transform finished"
        );
    }
    outcome
}

/// Column holding the country name: `pais` if present, else the full name
pub fn country_column(table: &Table) -> Option<&'static str> {
    [COUNTRY, COUNTRY_FULL_NAME]
        .into_iter()
        .find(|c| table.has_column(c))
}

fn clean(table: &mut Table) -> Result<()> {
    let country = country_column(table).ok_or_else(|| Error::missing_column(SOURCE_NAME, COUNTRY))?;
    table.require_column(CONTINENT)?;

    table.map_column(country, tidy_text);
    table.map_column(CONTINENT, tidy_text);

    for column in [POPULATION, AGING_RATE] {
        coerce_numeric_column(table, column);
    }

    let country_idx = table.require_column(country)?;
    let continent_idx = table.require_column(CONTINENT)?;
    let before = table.row_count();
    table.retain_rows(|row| {
        [country_idx, continent_idx]
            .iter()
            .all(|&i| row.get(i).is_some_and(|c| !c.is_empty()))
    });
    debug!(dropped = before - table.row_count(), "dropped rows without country or continent");
    Ok(())
}

/// Trim and title-case text; blank text becomes empty
fn tidy_text(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                CellValue::Empty
            } else {
                CellValue::String(title_case(trimmed))
            }
        }
        other => other.clone(),
    }
}

/// Coerce a column to numbers; unparseable values become empty
///
/// Returns the number of values that failed to parse. A missing column is
/// left alone.
pub fn coerce_numeric_column(table: &mut Table, column: &str) -> usize {
    let mut failures = 0;
    table.map_column(column, |cell| match cell.try_numeric(column) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "value coerced to null");
            failures += 1;
            CellValue::Empty
        }
    });
    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: serde_json::Value) -> Vec<RawRecord> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn test_empty_input_is_unavailable() {
        let outcome = transform(&[]);
        assert!(matches!(
            outcome,
            Outcome::Empty {
                reason: Error::SourceUnavailable { .. }
            }
        ));
    }

    #[test]
    fn test_transform_cleans_and_types() {
        let outcome = transform(&records(json!([
            {"nombre_pais": "  peru ", "continente": "south america", "poblacion": "33000000", "tasa_de_envejecimiento": "7.5"},
            {"nombre_pais": "  peru ", "continente": "south america", "poblacion": "33000000", "tasa_de_envejecimiento": "7.5"},
            {"nombre_pais": "chile", "continente": "south america", "poblacion": "n/a", "tasa_de_envejecimiento": 12}
        ])));

        assert!(outcome.is_complete());
        let table = outcome.into_value();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.value(0, COUNTRY_FULL_NAME), Some(&CellValue::String("Peru".into())));
        assert_eq!(table.value(0, CONTINENT), Some(&CellValue::String("South America".into())));
        assert_eq!(table.value(0, POPULATION), Some(&CellValue::Integer(33_000_000)));
        assert_eq!(table.value(0, AGING_RATE), Some(&CellValue::Float(7.5)));
        // unparseable population becomes null but the row survives
        assert_eq!(table.value(1, POPULATION), Some(&CellValue::Empty));
        assert_eq!(table.value(1, AGING_RATE), Some(&CellValue::Integer(12)));
    }

    #[test]
    fn test_english_columns_are_aliased() {
        let outcome = transform(&records(json!([
            {"country": "Peru", "continent": "America", "population": 1, "aging_rate": 2}
        ])));
        let table = outcome.into_value();
        assert_eq!(table.column_names(), vec![COUNTRY, CONTINENT, POPULATION, AGING_RATE]);
    }

    #[test]
    fn test_rows_without_country_or_continent_are_dropped() {
        let outcome = transform(&records(json!([
            {"pais": "Peru", "continente": null},
            {"pais": "   ", "continente": "America"},
            {"pais": "Chile", "continente": "America"}
        ])));
        let table = outcome.into_value();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.value(0, COUNTRY), Some(&CellValue::String("Chile".into())));
    }

    #[test]
    fn test_missing_continent_is_partial() {
        let outcome = transform(&records(json!([{"pais": "Peru", "poblacion": "5"}])));
        assert!(outcome.is_partial());
        assert!(matches!(outcome.reason(), Some(Error::MissingColumn { .. })));
        assert_eq!(outcome.value().map(Table::row_count), Some(1));
    }
}

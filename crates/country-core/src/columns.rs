//! Column name normalization and the canonical column vocabulary

use crate::table::Table;
use crate::text::strip_diacritics;

/// Canonical country key
pub const COUNTRY: &str = "pais";
/// Legacy full country name from the relational store
pub const COUNTRY_FULL_NAME: &str = "nombre_pais";
pub const CAPITAL: &str = "capital";
pub const CONTINENT: &str = "continente";
pub const REGION: &str = "region";
pub const POPULATION: &str = "poblacion";
pub const AGING_RATE: &str = "tasa_de_envejecimiento";
pub const BIG_MAC_PRICE: &str = "precio_big_mac_usd";
/// Nested `category -> level -> price` object on tourism documents
pub const DAILY_COSTS: &str = "costos_diarios_estimados_en_dolares";
/// Sum of the average price of every cost category
pub const AVG_TOTAL_COST: &str = "costo_promedio_total";

/// Cost categories, in output order
pub const COST_CATEGORIES: [&str; 4] = ["hospedaje", "comida", "transporte", "entretenimiento"];
/// Price levels, in output order
pub const PRICE_LEVELS: [&str; 3] = ["precio_bajo_usd", "precio_promedio_usd", "precio_alto_usd"];
/// Level summed into [`AVG_TOTAL_COST`]
pub const AVERAGE_LEVEL: &str = "precio_promedio_usd";

/// Input spellings accepted for canonical column names
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("country", COUNTRY),
    ("country_name", COUNTRY_FULL_NAME),
    ("continent", CONTINENT),
    ("population", POPULATION),
    ("aging_rate", AGING_RATE),
    ("big_mac_price_usd", BIG_MAC_PRICE),
    ("precio_big_mac_usd_usd", BIG_MAC_PRICE),
    ("daily_estimated_costs_usd", DAILY_COSTS),
    ("avg_total_cost", AVG_TOTAL_COST),
];

/// English spellings of the nested cost keys
const COST_KEY_ALIASES: &[(&str, &str)] = &[
    ("lodging", "hospedaje"),
    ("food", "comida"),
    ("transport", "transporte"),
    ("entertainment", "entretenimiento"),
    ("price_low_usd", "precio_bajo_usd"),
    ("price_avg_usd", "precio_promedio_usd"),
    ("price_high_usd", "precio_alto_usd"),
];

/// Strip diacritics, lower-case, and replace spaces with underscores
pub fn normalize(name: &str) -> String {
    strip_diacritics(name).to_lowercase().replace(' ', "_")
}

/// Map an already-normalized name onto the canonical vocabulary
pub fn canonical_column(normalized: &str) -> String {
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| normalized.to_string())
}

/// English spellings for a canonical cost category or level key
pub(crate) fn cost_key_aliases(canonical: &str) -> impl Iterator<Item = &'static str> + '_ {
    COST_KEY_ALIASES
        .iter()
        .filter(move |(_, c)| *c == canonical)
        .map(|(alias, _)| *alias)
}

/// Flattened field name for a category/level pair
pub fn cost_field(category: &str, level: &str) -> String {
    format!("{category}.{level}")
}

/// Normalize and alias every column name of a table
pub fn normalize_table_columns(table: &mut Table) {
    table.rename_columns(|name| canonical_column(&normalize(name)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{CellValue, Row};

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("País"), "pais");
        assert_eq!(normalize("Tasa de Envejecimiento"), "tasa_de_envejecimiento");
        assert_eq!(normalize("hospedaje.precio_bajo_usd"), "hospedaje.precio_bajo_usd");
    }

    #[test]
    fn test_canonical_column() {
        assert_eq!(canonical_column("country_name"), COUNTRY_FULL_NAME);
        assert_eq!(canonical_column("precio_big_mac_usd_usd"), BIG_MAC_PRICE);
        assert_eq!(canonical_column("capital"), "capital");
    }

    #[test]
    fn test_cost_key_aliases() {
        let aliases: Vec<&str> = cost_key_aliases("precio_promedio_usd").collect();
        assert_eq!(aliases, vec!["price_avg_usd"]);
        assert_eq!(cost_key_aliases("unknown").count(), 0);
    }

    #[test]
    fn test_normalize_table_columns() {
        let mut table = Table::with_columns("t", &["Country", "Aging Rate", "Capital"]);
        table.rows.push(Row::new(vec![
            CellValue::String("Peru".into()),
            CellValue::Float(0.1),
            CellValue::String("Lima".into()),
        ]));

        normalize_table_columns(&mut table);
        assert_eq!(table.column_names(), vec![COUNTRY, AGING_RATE, CAPITAL]);
    }
}

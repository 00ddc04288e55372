use std::path::PathBuf;

use country_core::config::{MergeConfig, PipelineConfig};
use country_core::insights::{CorrelationBand, Insight};
use country_core::{parse_csv_str, parse_documents, run, CellValue, CoalescePolicy, PipelineInput};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn fixture_input() -> PipelineInput {
    PipelineInput {
        relational: parse_csv_str(&read_fixture("relational.csv"), "relational").unwrap(),
        tourism: Some(parse_documents(&read_fixture("tourism.json"), "tourism").unwrap()),
        prices: Some(parse_documents(&read_fixture("prices.json"), "big_mac").unwrap()),
    }
}

fn text(v: &str) -> CellValue {
    CellValue::String(v.to_string())
}

// -------------------------------------------------------------------------
// Stages
// -------------------------------------------------------------------------

#[test]
fn relational_stage_cleans_rows() {
    let report = run(&fixture_input(), &PipelineConfig::default());
    let relational = report.relational.value().unwrap();

    assert!(report.relational.is_complete());
    // duplicate Chile row and continent-less Atlantis are gone
    assert_eq!(relational.row_count(), 7);
    assert_eq!(relational.value(0, "nombre_pais"), Some(&text("Spain")));
    assert_eq!(relational.value(0, "continente"), Some(&text("Europe")));
}

#[test]
fn document_stage_flattens_and_joins() {
    let report = run(&fixture_input(), &PipelineConfig::default());
    let documents = report.documents.value().unwrap();

    assert!(report.documents.is_complete());
    assert_eq!(documents.row_count(), 7);
    assert!(!documents.has_column("costos_diarios_estimados_en_dolares"));
    assert!(documents.has_column("entretenimiento.precio_alto_usd"));

    let spain = documents
        .rows
        .iter()
        .position(|r| r.cells[0] == text("Spain"))
        .unwrap();
    assert_eq!(documents.value(spain, "costo_promedio_total"), Some(&CellValue::Float(115.0)));
    assert_eq!(documents.value(spain, "precio_big_mac_usd"), Some(&CellValue::Float(5.0)));
}

// -------------------------------------------------------------------------
// Integration
// -------------------------------------------------------------------------

#[test]
fn integrated_table_is_keyed_by_canonical_country() {
    let report = run(&fixture_input(), &PipelineConfig::default());
    assert!(report.integrated.is_complete());

    let integrated = report.integrated_table();
    let keys: Vec<String> = integrated
        .column_values("pais")
        .unwrap()
        .map(CellValue::to_string_value)
        .collect();
    assert_eq!(keys, vec!["Chile", "Japan", "Peru", "Portugal", "Spain", "USA", "Vietnam"]);
    assert!(!integrated.has_column("nombre_pais"));

    let usa = keys.iter().position(|k| k == "USA").unwrap();
    assert_eq!(integrated.value(usa, "poblacion"), Some(&CellValue::Integer(331_000_000)));
    assert_eq!(integrated.value(usa, "precio_big_mac_usd"), Some(&CellValue::Float(5.7)));
    assert_eq!(integrated.value(usa, "capital"), Some(&text("Washington")));
}

#[test]
fn three_insights_are_produced() {
    let report = run(&fixture_input(), &PipelineConfig::default());
    let insights = &report.insights;

    assert_eq!(insights.insights.len(), 3);
    assert!(insights.skipped.is_empty());

    match &insights.insights[0] {
        Insight::AgingCost { correlation, .. } => {
            assert_eq!(correlation.band, CorrelationBand::StrongPositive);
            assert_eq!(correlation.sample, 7);
        }
        other => panic!("unexpected insight {other:?}"),
    }
    match &insights.insights[2] {
        Insight::PriceByRegion {
            cost_correlation, ..
        } => {
            let correlation = cost_correlation.as_ref().unwrap();
            assert_eq!(correlation.band, CorrelationBand::StrongPositive);
        }
        other => panic!("unexpected insight {other:?}"),
    }

    let rendered = insights.render();
    assert!(rendered[0].starts_with("INSIGHT 1: "));
    assert!(rendered[1].contains("- Large (20-100M): $3.83 USD"));
    assert!(rendered[1].contains("18.7% higher"));
    assert!(rendered[2].contains("Europe is 46.0% more expensive than Asia"));
}

#[test]
fn insights_skip_with_strict_minimum() {
    let mut config = PipelineConfig::default();
    config.insights.min_valid_rows = 8;

    let report = run(&fixture_input(), &config);
    assert!(report.insights.insights.is_empty());
    assert_eq!(report.insights.skipped.len(), 3);
    assert_eq!(report.insights.render().len(), 1);
}

// -------------------------------------------------------------------------
// Export and configuration
// -------------------------------------------------------------------------

#[test]
fn export_orders_columns_for_the_warehouse() {
    let report = run(&fixture_input(), &PipelineConfig::default());
    let export = report.export();

    let names = export.table.column_names();
    assert_eq!(
        &names[..6],
        &["pais", "capital", "continente", "poblacion", "tasa_de_envejecimiento", "precio_big_mac_usd"]
    );
    assert_eq!(names[6], "hospedaje_precio_bajo_usd");
    assert_eq!(names.last(), Some(&"costo_promedio_total"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("paises.csv");
    export.save_csv(&path).unwrap();
    let csv = std::fs::read_to_string(&path).unwrap();
    assert_eq!(csv.lines().count(), 8);
    assert!(csv.starts_with("pais,capital,continente"));
}

#[test]
fn config_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");

    let config = PipelineConfig {
        merge: MergeConfig {
            coalesce: CoalescePolicy::PreferRight,
            drop_empty_columns: false,
        },
        ..PipelineConfig::default()
    };
    config.save(&path).unwrap();

    let loaded = PipelineConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert!(std::fs::read_to_string(&path).unwrap().contains("\"prefer_right\""));
}

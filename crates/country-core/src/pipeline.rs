//! One sequential pass: transform both sources, merge, analyse

use crate::config::PipelineConfig;
use crate::documents;
use crate::export::{prepare_export, ExportTable};
use crate::insights::{self, InsightReport};
use crate::merger;
use crate::outcome::Outcome;
use crate::parser::RawRecord;
use crate::relational;
use crate::table::Table;
use chrono::{DateTime, Utc};
use tracing::info;

/// Raw records handed over by the ingestion collaborator
#[derive(Debug, Clone, Default)]
pub struct PipelineInput {
    pub relational: Vec<RawRecord>,
    pub tourism: Option<Vec<RawRecord>>,
    pub prices: Option<Vec<RawRecord>>,
}

/// Every stage result of one run
#[derive(Debug)]
pub struct PipelineReport {
    pub run_at: DateTime<Utc>,
    pub relational: Outcome<Table>,
    pub documents: Outcome<Table>,
    pub integrated: Outcome<Table>,
    pub insights: InsightReport,
}

impl PipelineReport {
    /// Integrated table, empty when integration did not happen
    pub fn integrated_table(&self) -> Table {
        self.integrated.value_or_default()
    }

    /// Export projection of the integrated table
    pub fn export(&self) -> ExportTable {
        self.integrated
            .value()
            .map(prepare_export)
            .unwrap_or_default()
    }
}

/// Run the whole engine over pre-loaded records
pub fn run(input: &PipelineInput, config: &PipelineConfig) -> PipelineReport {
    let run_at = Utc::now();

    let relational = relational::transform(&input.relational);
    let documents = documents::transform(input.tourism.as_deref(), input.prices.as_deref());

    let empty = Table::default();
    let integrated = merger::integrate(
        relational.value().unwrap_or(&empty),
        documents.value().unwrap_or(&empty),
        &config.merge,
    );

    let insights = insights::generate(integrated.value().unwrap_or(&empty), &config.insights);

    info!(
        run_at = %run_at,
        relational = relational.status(),
        documents = documents.status(),
        integrated = integrated.status(),
        insights = insights.insights.len(),
        "pipeline finished"
    );

    PipelineReport {
        run_at,
        relational,
        documents,
        integrated,
        insights,
    }
}

//! country-core: Normalization, entity resolution and merge engine for country statistics
//!
//! This library provides functionality to:
//! - Decode relational (CSV) and document (JSON) extracts into raw records
//! - Resolve inconsistent country spellings to one canonical key
//! - Normalize column names across sources
//! - Flatten nested tourism cost breakdowns
//! - Outer-join and coalesce both sources into one integrated table
//! - Derive correlation and grouping insights
//! - Prepare the integrated table for warehouse export

pub mod columns;
pub mod config;
pub mod documents;
pub mod error;
pub mod export;
pub mod insights;
pub mod merger;
pub mod names;
pub mod outcome;
pub mod parser;
pub mod pipeline;
pub mod relational;
pub mod table;
pub mod text;

pub use config::{InsightConfig, MergeConfig, PipelineConfig};
pub use documents::get_price;
pub use error::{Error, Result};
pub use export::{prepare_export, ColumnKind, ExportTable};
pub use insights::{CorrelationBand, Insight, InsightReport, PopulationBucket};
pub use merger::{integrate, CoalescePolicy, OuterJoin};
pub use names::resolve;
pub use outcome::Outcome;
pub use parser::{parse_csv_str, parse_documents, RawRecord};
pub use pipeline::{run, PipelineInput, PipelineReport};
pub use table::{CellValue, Column, Row, Table};

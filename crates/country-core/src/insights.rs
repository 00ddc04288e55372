//! Statistical insights over the integrated table
//!
//! Three independent analyses. Each one either yields an [`Insight`] or a
//! [`Skip`] saying why it could not run; none of them fails the pipeline.

use crate::columns::{AGING_RATE, BIG_MAC_PRICE, CONTINENT, POPULATION, REGION};
use crate::config::InsightConfig;
use crate::error::Error;
use crate::merger::SOURCE_NAME as SOURCE_TABLE;
use crate::table::{CellValue, Table};
use crate::text::title_case;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// Rendered when no analysis produced anything
pub const FALLBACK_MESSAGE: &str = "Not enough usable data to generate insights. \
Review the integration and cleaning of the source data.";

pub const AGING_COST: &str = "aging_cost_correlation";
pub const PRICE_BY_POPULATION: &str = "big_mac_by_population";
pub const PRICE_BY_REGION: &str = "big_mac_by_region";

/// Interpretation of a Pearson coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationBand {
    StrongPositive,
    ModeratePositive,
    NoneOrWeak,
    ModerateNegative,
    StrongNegative,
}

impl CorrelationBand {
    pub fn classify(r: f64) -> Self {
        if r > 0.5 {
            Self::StrongPositive
        } else if r > 0.2 {
            Self::ModeratePositive
        } else if r >= -0.2 {
            Self::NoneOrWeak
        } else if r >= -0.5 {
            Self::ModerateNegative
        } else {
            Self::StrongNegative
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::StrongPositive => "strong positive",
            Self::ModeratePositive => "moderate positive",
            Self::NoneOrWeak => "none or weak",
            Self::ModerateNegative => "moderate negative",
            Self::StrongNegative => "strong negative",
        }
    }
}

impl fmt::Display for CorrelationBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pearson correlation of paired samples
///
/// `None` when there are fewer than two pairs or either side has zero
/// variance.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    let r = cov / (var_x * var_y).sqrt();
    r.is_finite().then_some(r.clamp(-1.0, 1.0))
}

/// Population size class; intervals are right-closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PopulationBucket {
    Small,
    Medium,
    Large,
    VeryLarge,
}

impl PopulationBucket {
    pub const ALL: [PopulationBucket; 4] = [Self::Small, Self::Medium, Self::Large, Self::VeryLarge];

    /// Bucket for a population; non-positive populations have none
    pub fn classify(population: f64) -> Option<Self> {
        if population.is_nan() || population <= 0.0 {
            None
        } else if population <= 5e6 {
            Some(Self::Small)
        } else if population <= 20e6 {
            Some(Self::Medium)
        } else if population <= 100e6 {
            Some(Self::Large)
        } else {
            Some(Self::VeryLarge)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Small => "Small (<5M)",
            Self::Medium => "Medium (5-20M)",
            Self::Large => "Large (20-100M)",
            Self::VeryLarge => "Very Large (>100M)",
        }
    }
}

/// Mean Big Mac price of one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
    pub label: String,
    pub mean: f64,
}

/// Correlation found by an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub coefficient: f64,
    pub band: CorrelationBand,
    pub sample: usize,
}

impl Correlation {
    fn new(coefficient: f64, sample: usize) -> Self {
        Self {
            coefficient,
            band: CorrelationBand::classify(coefficient),
            sample,
        }
    }
}

/// Result of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Insight {
    /// Aging rate against average tourism cost
    AgingCost {
        cost_column: String,
        correlation: Correlation,
    },
    /// Big Mac price per population bucket, cheapest first
    PriceByPopulation {
        buckets: Vec<GroupMean>,
        sample: usize,
    },
    /// Big Mac price per continent or region, most expensive first
    PriceByRegion {
        group_column: String,
        groups: Vec<GroupMean>,
        sample: usize,
        cost_correlation: Option<Correlation>,
    },
}

/// Why an analysis did not run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    MissingColumn(String),
    InsufficientSample { required: usize, found: usize },
    /// One side of the correlation has no variance
    UndefinedCorrelation,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingColumn(c) => write!(f, "missing column '{c}'"),
            SkipReason::InsufficientSample { required, found } => {
                write!(f, "needs {required} valid rows, found {found}")
            }
            SkipReason::UndefinedCorrelation => f.write_str("correlation undefined (zero variance)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skip {
    pub analysis: String,
    pub reason: SkipReason,
}

impl Skip {
    /// Crate error equivalent; an undefined correlation has none
    pub fn to_error(&self) -> Option<Error> {
        match &self.reason {
            SkipReason::MissingColumn(column) => Some(Error::missing_column(SOURCE_TABLE, column)),
            SkipReason::InsufficientSample { required, found } => Some(Error::InsufficientSample {
                analysis: self.analysis.clone(),
                required: *required,
                found: *found,
            }),
            SkipReason::UndefinedCorrelation => None,
        }
    }
}

/// Everything the insight stage produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub insights: Vec<Insight>,
    pub skipped: Vec<Skip>,
}

impl InsightReport {
    /// Text blocks, one per insight, or the fallback message alone
    pub fn render(&self) -> Vec<String> {
        if self.insights.is_empty() {
            return vec![FALLBACK_MESSAGE.to_string()];
        }
        self.insights
            .iter()
            .map(|insight| format!("INSIGHT {}: {}", insight.number(), insight.render()))
            .collect()
    }
}

fn percent_above(high: f64, low: f64) -> String {
    if low > 0.0 {
        format!("{:.1}%", (high - low) / low * 100.0)
    } else {
        "n/a".to_string()
    }
}

fn aging_sentence(band: CorrelationBand) -> &'static str {
    match band {
        CorrelationBand::StrongPositive => {
            "There is a strong positive correlation: countries with older populations tend to have higher tourism costs."
        }
        CorrelationBand::ModeratePositive => {
            "There is a moderate positive correlation: countries with older populations may have slightly higher tourism costs."
        }
        CorrelationBand::NoneOrWeak => {
            "There is no significant correlation: population age does not appear to drive tourism costs."
        }
        CorrelationBand::ModerateNegative => {
            "There is a moderate negative correlation: countries with older populations tend to have slightly lower tourism costs."
        }
        CorrelationBand::StrongNegative => {
            "There is a strong negative correlation: countries with older populations tend to have markedly lower tourism costs."
        }
    }
}

fn price_cost_sentence(band: CorrelationBand) -> &'static str {
    match band {
        CorrelationBand::StrongPositive => {
            "a strong link between both indicators; the Big Mac price looks like a good predictor of tourism cost."
        }
        CorrelationBand::ModeratePositive => {
            "a moderate link; the Big Mac price gives some guidance on tourism costs, with exceptions."
        }
        CorrelationBand::NoneOrWeak => {
            "no clear link; the Big Mac price is not a good indicator of tourism costs."
        }
        CorrelationBand::ModerateNegative => {
            "a moderate inverse link; countries with pricier Big Macs tend to have somewhat lower tourism costs."
        }
        CorrelationBand::StrongNegative => {
            "a strong inverse link; countries with pricier Big Macs tend to have much lower tourism costs."
        }
    }
}

fn render_groups(out: &mut String, groups: &[GroupMean]) {
    for group in groups {
        out.push_str(&format!("- {}: ${:.2} USD\n", group.label, group.mean));
    }
}

impl Insight {
    /// Fixed position of the analysis in the report
    pub fn number(&self) -> usize {
        match self {
            Insight::AgingCost { .. } => 1,
            Insight::PriceByPopulation { .. } => 2,
            Insight::PriceByRegion { .. } => 3,
        }
    }

    /// Text of the insight, without the numbered prefix
    pub fn render(&self) -> String {
        match self {
            Insight::AgingCost {
                cost_column,
                correlation,
            } => format!(
                "The correlation between the aging rate and {} is {:.2}. {}",
                cost_column.replace('_', " "),
                correlation.coefficient,
                aging_sentence(correlation.band)
            ),
            Insight::PriceByPopulation { buckets, .. } => {
                let mut out = String::from("Average Big Mac price by country population size:\n");
                render_groups(&mut out, buckets);
                if let (Some(low), Some(high)) = (buckets.first(), buckets.last()) {
                    out.push_str(&format!(
                        "\n{} countries have a Big Mac price {} higher than {} countries.",
                        high.label,
                        percent_above(high.mean, low.mean),
                        low.label
                    ));
                }
                out
            }
            Insight::PriceByRegion {
                group_column,
                groups,
                cost_correlation,
                ..
            } => {
                let mut out = format!("{} ranked by average Big Mac price:\n", title_case(group_column));
                render_groups(&mut out, groups);
                if let (Some(high), Some(low)) = (groups.first(), groups.last()) {
                    out.push_str(&format!(
                        "\n{} is {} more expensive than {} in Big Mac prices.",
                        high.label,
                        percent_above(high.mean, low.mean),
                        low.label
                    ));
                }
                if let Some(c) = cost_correlation {
                    out.push_str(&format!(
                        "\n\nThe correlation between the Big Mac price and tourism costs is {:.2}, showing {}",
                        c.coefficient,
                        price_cost_sentence(c.band)
                    ));
                }
                out
            }
        }
    }
}

type Analysis = fn(&Table, usize) -> Result<Insight, SkipReason>;

/// Run every analysis over the integrated table
pub fn generate(table: &Table, config: &InsightConfig) -> InsightReport {
    let mut report = InsightReport::default();
    let analyses: [(&str, Analysis); 3] = [
        (AGING_COST, aging_cost as Analysis),
        (PRICE_BY_POPULATION, price_by_population as Analysis),
        (PRICE_BY_REGION, price_by_region as Analysis),
    ];

    for (name, analysis) in analyses {
        match analysis(table, config.min_valid_rows) {
            Ok(insight) => report.insights.push(insight),
            Err(reason) => {
                let skip = Skip {
                    analysis: name.to_string(),
                    reason,
                };
                match skip.to_error() {
                    Some(error) => debug!(error = %error, "analysis skipped"),
                    None => debug!(analysis = name, reason = %skip.reason, "analysis skipped"),
                }
                report.skipped.push(skip);
            }
        }
    }

    info!(
        produced = report.insights.len(),
        skipped = report.skipped.len(),
        "insights generated"
    );
    report
}

/// First column whose name contains `fragment`
fn column_containing<'a>(table: &'a Table, fragment: &str) -> Option<&'a str> {
    table
        .columns
        .iter()
        .map(|c| c.name.as_str())
        .find(|name| name.contains(fragment))
}

fn require<'a>(table: &'a Table, column: &'a str) -> Result<&'a str, SkipReason> {
    if table.has_column(column) {
        Ok(column)
    } else {
        Err(SkipReason::MissingColumn(column.to_string()))
    }
}

fn check_sample(found: usize, required: usize) -> Result<(), SkipReason> {
    if found < required {
        Err(SkipReason::InsufficientSample { required, found })
    } else {
        Ok(())
    }
}

/// Rows where both columns are numeric
fn numeric_pairs(table: &Table, x: &str, y: &str) -> Vec<(f64, f64)> {
    let (Some(xi), Some(yi)) = (table.column_index(x), table.column_index(y)) else {
        return Vec::new();
    };
    table
        .rows
        .iter()
        .filter_map(|row| Some((row.get(xi)?.as_f64()?, row.get(yi)?.as_f64()?)))
        .collect()
}

fn aging_cost(table: &Table, min_rows: usize) -> Result<Insight, SkipReason> {
    require(table, AGING_RATE)?;
    let cost_column = column_containing(table, "costo_promedio")
        .ok_or_else(|| SkipReason::MissingColumn("costo_promedio*".to_string()))?;

    let pairs = numeric_pairs(table, AGING_RATE, cost_column);
    check_sample(pairs.len(), min_rows)?;
    let r = pearson(&pairs).ok_or(SkipReason::UndefinedCorrelation)?;

    Ok(Insight::AgingCost {
        cost_column: cost_column.to_string(),
        correlation: Correlation::new(r, pairs.len()),
    })
}

fn price_by_population(table: &Table, min_rows: usize) -> Result<Insight, SkipReason> {
    require(table, BIG_MAC_PRICE)?;
    require(table, POPULATION)?;

    let pairs = numeric_pairs(table, POPULATION, BIG_MAC_PRICE);
    check_sample(pairs.len(), min_rows)?;

    let mut sums: BTreeMap<PopulationBucket, (f64, usize)> = BTreeMap::new();
    for (population, price) in &pairs {
        if let Some(bucket) = PopulationBucket::classify(*population) {
            let entry = sums.entry(bucket).or_default();
            entry.0 += price;
            entry.1 += 1;
        }
    }
    if sums.is_empty() {
        return Err(SkipReason::InsufficientSample {
            required: min_rows,
            found: 0,
        });
    }

    let mut buckets: Vec<GroupMean> = sums
        .into_iter()
        .map(|(bucket, (sum, count))| GroupMean {
            label: bucket.label().to_string(),
            mean: sum / count as f64,
        })
        .collect();
    buckets.sort_by(|a, b| a.mean.total_cmp(&b.mean));

    Ok(Insight::PriceByPopulation {
        buckets,
        sample: pairs.len(),
    })
}

fn price_by_region(table: &Table, min_rows: usize) -> Result<Insight, SkipReason> {
    let group_column = [CONTINENT, REGION]
        .into_iter()
        .find(|c| table.has_column(c))
        .ok_or_else(|| SkipReason::MissingColumn(CONTINENT.to_string()))?;
    require(table, BIG_MAC_PRICE)?;
    // the price/cost correlation is only added when a cost column exists
    let ci = column_containing(table, "costo_promedio")
        .or_else(|| column_containing(table, "costo_"))
        .and_then(|c| table.column_index(c));

    let (Some(gi), Some(pi)) = (
        table.column_index(group_column),
        table.column_index(BIG_MAC_PRICE),
    ) else {
        return Err(SkipReason::MissingColumn(group_column.to_string()));
    };

    // (group, price, cost)
    let valid: Vec<(String, f64, Option<f64>)> = table
        .rows
        .iter()
        .filter_map(|row| {
            let group = row.get(gi).filter(|c| !c.is_empty())?;
            let price = row.get(pi)?.as_f64()?;
            let cost = ci.and_then(|ci| row.get(ci)).and_then(CellValue::as_f64);
            Some((group.to_string_value(), price, cost))
        })
        .collect();
    check_sample(valid.len(), min_rows)?;

    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (group, price, _) in &valid {
        let entry = sums.entry(group.as_str()).or_default();
        entry.0 += price;
        entry.1 += 1;
    }
    let mut groups: Vec<GroupMean> = sums
        .into_iter()
        .map(|(label, (sum, count))| GroupMean {
            label: label.to_string(),
            mean: sum / count as f64,
        })
        .collect();
    groups.sort_by(|a, b| b.mean.total_cmp(&a.mean));

    let cost_pairs: Vec<(f64, f64)> = valid
        .iter()
        .filter_map(|(_, price, cost)| Some((*price, (*cost)?)))
        .collect();
    let cost_correlation = if cost_pairs.len() >= min_rows {
        pearson(&cost_pairs).map(|r| Correlation::new(r, cost_pairs.len()))
    } else {
        None
    };
    if cost_correlation.is_none() {
        debug!(rows = cost_pairs.len(), "price/cost correlation not computed");
    }

    Ok(Insight::PriceByRegion {
        group_column: group_column.to_string(),
        groups,
        sample: valid.len(),
        cost_correlation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Row;

    #[test]
    fn test_correlation_bands() {
        assert_eq!(CorrelationBand::classify(0.6), CorrelationBand::StrongPositive);
        assert_eq!(CorrelationBand::classify(0.5), CorrelationBand::ModeratePositive);
        assert_eq!(CorrelationBand::classify(0.2), CorrelationBand::NoneOrWeak);
        assert_eq!(CorrelationBand::classify(-0.2), CorrelationBand::NoneOrWeak);
        assert_eq!(CorrelationBand::classify(-0.5), CorrelationBand::ModerateNegative);
        assert_eq!(CorrelationBand::classify(-0.6), CorrelationBand::StrongNegative);
        assert_eq!(CorrelationBand::StrongNegative.label(), "strong negative");
    }

    #[test]
    fn test_pearson() {
        let perfect = [(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)];
        assert!((pearson(&perfect).unwrap() - 1.0).abs() < 1e-12);

        let inverse = [(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)];
        assert!((pearson(&inverse).unwrap() + 1.0).abs() < 1e-12);

        assert_eq!(pearson(&[(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)]), None);
        assert_eq!(pearson(&[(1.0, 1.0)]), None);
    }

    #[test]
    fn test_population_buckets() {
        assert_eq!(PopulationBucket::classify(4e6), Some(PopulationBucket::Small));
        assert_eq!(PopulationBucket::classify(5e6), Some(PopulationBucket::Small));
        assert_eq!(PopulationBucket::classify(6e6), Some(PopulationBucket::Medium));
        assert_eq!(PopulationBucket::classify(100e6), Some(PopulationBucket::Large));
        assert_eq!(PopulationBucket::classify(150e6), Some(PopulationBucket::VeryLarge));
        assert_eq!(PopulationBucket::classify(0.0), None);
        assert_eq!(PopulationBucket::classify(-3.0), None);
    }

    fn sample_table(rows: usize) -> Table {
        let mut table = Table::with_columns(
            "integrated",
            &["pais", "continente", "poblacion", "tasa_de_envejecimiento", "precio_big_mac_usd", "costo_promedio_total"],
        );
        let data = [
            ("A", "Europe", 3_000_000, 10.0, 5.0, 100.0),
            ("B", "Europe", 8_000_000, 12.0, 6.0, 120.0),
            ("C", "Asia", 50_000_000, 6.0, 3.0, 60.0),
            ("D", "Asia", 150_000_000, 5.0, 2.0, 50.0),
            ("E", "America", 4_000_000, 8.0, 4.0, 80.0),
            ("F", "America", 30_000_000, 9.0, 4.0, 90.0),
        ];
        for (pais, cont, pop, aging, price, cost) in data.into_iter().take(rows) {
            table.rows.push(Row::new(vec![
                CellValue::String(pais.into()),
                CellValue::String(cont.into()),
                CellValue::Integer(pop),
                CellValue::Float(aging),
                CellValue::Float(price),
                CellValue::Float(cost),
            ]));
        }
        table
    }

    #[test]
    fn test_generate_all_three() {
        let report = generate(&sample_table(6), &InsightConfig::default());
        assert_eq!(report.insights.len(), 3);
        assert!(report.skipped.is_empty());

        match &report.insights[0] {
            Insight::AgingCost {
                cost_column,
                correlation,
            } => {
                assert_eq!(cost_column, "costo_promedio_total");
                assert_eq!(correlation.band, CorrelationBand::StrongPositive);
                assert_eq!(correlation.sample, 6);
            }
            other => panic!("unexpected insight {other:?}"),
        }

        match &report.insights[1] {
            Insight::PriceByPopulation { buckets, .. } => {
                let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
                // Very Large 2.0, Large 3.5, Small 4.5, Medium 6.0
                assert_eq!(labels, vec!["Very Large (>100M)", "Large (20-100M)", "Small (<5M)", "Medium (5-20M)"]);
            }
            other => panic!("unexpected insight {other:?}"),
        }

        match &report.insights[2] {
            Insight::PriceByRegion {
                group_column,
                groups,
                cost_correlation,
                ..
            } => {
                assert_eq!(group_column, "continente");
                assert_eq!(groups[0], GroupMean { label: "Europe".into(), mean: 5.5 });
                assert_eq!(groups[2], GroupMean { label: "Asia".into(), mean: 2.5 });
                assert!(cost_correlation.is_some());
            }
            other => panic!("unexpected insight {other:?}"),
        }

        let text = report.render();
        assert!(text[0].starts_with("INSIGHT 1: The correlation between the aging rate and costo promedio total is"));
        assert!(text[1].contains("- Very Large (>100M): $2.00 USD"));
        assert!(text[1].contains("200.0% higher"));
        assert!(text[2].starts_with("INSIGHT 3: Continente ranked"));
        assert!(text[2].contains("Europe is 120.0% more expensive than Asia"));
    }

    #[test]
    fn test_small_sample_falls_back() {
        let report = generate(&sample_table(5), &InsightConfig::default());
        assert!(report.insights.is_empty());
        assert_eq!(report.skipped.len(), 3);
        assert!(matches!(
            report.skipped[0].reason,
            SkipReason::InsufficientSample { required: 6, found: 5 }
        ));
        assert_eq!(report.render(), vec![FALLBACK_MESSAGE.to_string()]);
    }

    #[test]
    fn test_min_rows_is_configurable() {
        let config = InsightConfig { min_valid_rows: 3 };
        let report = generate(&sample_table(5), &config);
        assert_eq!(report.insights.len(), 3);
    }

    #[test]
    fn test_skip_to_error() {
        let skip = Skip {
            analysis: AGING_COST.to_string(),
            reason: SkipReason::InsufficientSample { required: 6, found: 2 },
        };
        assert!(matches!(
            skip.to_error(),
            Some(Error::InsufficientSample { required: 6, found: 2, .. })
        ));
        let undefined = Skip {
            analysis: AGING_COST.to_string(),
            reason: SkipReason::UndefinedCorrelation,
        };
        assert!(undefined.to_error().is_none());
    }

    #[test]
    fn test_missing_columns_skip() {
        let table = Table::with_columns("integrated", &["pais"]);
        let report = generate(&table, &InsightConfig::default());
        assert!(report
            .skipped
            .iter()
            .all(|s| matches!(s.reason, SkipReason::MissingColumn(_))));
    }

    #[test]
    fn test_zero_variance_skips_correlation() {
        let mut table = sample_table(6);
        table.map_column("tasa_de_envejecimiento", |_| CellValue::Float(7.0));
        let report = generate(&table, &InsightConfig::default());
        assert_eq!(report.skipped[0].reason, SkipReason::UndefinedCorrelation);
        assert_eq!(report.insights.len(), 2);
        assert!(report.render()[0].starts_with("INSIGHT 2:"));
    }

    #[test]
    fn test_region_ranking_without_cost_column() {
        let mut table = Table::with_columns("integrated", &["pais", "continente", "precio_big_mac_usd"]);
        let data = [
            ("A", "Europe", 5.0),
            ("B", "Europe", 6.0),
            ("C", "Asia", 3.0),
            ("D", "Asia", 2.0),
            ("E", "America", 4.0),
            ("F", "America", 4.0),
        ];
        for (pais, cont, price) in data {
            table.rows.push(Row::new(vec![
                CellValue::String(pais.into()),
                CellValue::String(cont.into()),
                CellValue::Float(price),
            ]));
        }

        let report = generate(&table, &InsightConfig::default());
        assert_eq!(report.insights.len(), 1);
        match &report.insights[0] {
            Insight::PriceByRegion {
                groups,
                sample,
                cost_correlation,
                ..
            } => {
                assert_eq!(groups[0], GroupMean { label: "Europe".into(), mean: 5.5 });
                assert_eq!(*sample, 6);
                assert!(cost_correlation.is_none());
            }
            other => panic!("unexpected insight {other:?}"),
        }

        let text = report.render();
        assert!(text[0].starts_with("INSIGHT 3: "));
        assert!(!text[0].contains("tourism costs"));
    }

    fn aging_table(costs: [f64; 6]) -> Table {
        let mut table = Table::with_columns("integrated", &["tasa_de_envejecimiento", "costo_promedio_total"]);
        for (aging, cost) in [1.0, 2.0, 3.0, 4.0, 5.0, 6.0].into_iter().zip(costs) {
            table
                .rows
                .push(Row::new(vec![CellValue::Float(aging), CellValue::Float(cost)]));
        }
        table
    }

    #[test]
    fn test_moderate_sample_renders_strong_sentences() {
        // r = 0.626 over six rows
        let report = generate(&aging_table([1.0, 3.0, 2.0, 2.0, 5.0, 3.0]), &InsightConfig::default());
        assert_eq!(report.insights.len(), 1);
        let text = report.render();
        assert!(text[0].contains("costo promedio total is 0.63."));
        assert!(text[0].contains("There is a strong positive correlation"));

        let report = generate(&aging_table([-1.0, -3.0, -2.0, -2.0, -5.0, -3.0]), &InsightConfig::default());
        let text = report.render();
        assert!(text[0].contains("costo promedio total is -0.63."));
        assert!(text[0].contains("There is a strong negative correlation"));
    }
}

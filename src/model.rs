//! Report model construction
//!
//! Turns aggregated observations (or ESG inputs) into immutable report records.
//! Building is pure: identical inputs and clock give identical records.

use crate::error::{Result, ValidationError};
use crate::metrics::{Clock, MetricsAggregator, TimeWindow};
use crate::types::{
    CO2_EMISSIONS, EsgReportData, NamedCount, Pillar, PillarScore, ReportData, ReportMetric,
    SubScore, TOTAL_CONSUMPTION, TOTAL_COST, check_percentage,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Sum, mean, and maximum of a series
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SeriesSummary {
    /// Number of values
    pub count: usize,
    /// Sum of values
    pub sum: f64,
    /// Arithmetic mean (0 for an empty series)
    pub mean: f64,
    /// Maximum (0 for an empty series)
    pub max: f64,
}

/// Summarize a series; an empty series summarizes to zeros
pub fn summarize(values: impl IntoIterator<Item = f64>) -> SeriesSummary {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        count += 1;
        sum += v;
        max = max.max(v);
    }
    if count == 0 {
        return SeriesSummary::default();
    }
    SeriesSummary {
        count,
        sum,
        mean: sum / count as f64,
        max,
    }
}

/// Round to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Energy value with one decimal place
pub fn format_energy(value: f64) -> String {
    format!("{:.1}", value)
}

/// Currency value: two decimals below 1,000, then `K`/`M` abbreviations
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    // Tiers are chosen on the rounded value so 999.996 reads $1.0K, not $1000.00
    if round_to(abs / 1_000.0, 1) >= 1_000.0 {
        format!("{}${:.1}M", sign, abs / 1_000_000.0)
    } else if round_to(abs, 2) >= 1_000.0 {
        format!("{}${:.1}K", sign, abs / 1_000.0)
    } else {
        format!("{}${:.2}", sign, abs)
    }
}

/// Percent change from `previous` to `current`; `None` without a baseline
fn percent_change(current: f64, previous: &SeriesSummary) -> Option<f64> {
    if previous.count == 0 || previous.sum == 0.0 {
        return None;
    }
    Some(round_to((current - previous.sum) / previous.sum * 100.0, 1))
}

/// Raw pillar inputs
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PillarMetrics {
    /// Percentage sub-scores by key
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
    /// Counts by key
    #[serde(default)]
    pub counts: BTreeMap<String, u64>,
}

/// Raw ESG inputs
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EsgMetrics {
    /// Reporting company
    pub company_name: String,
    /// Human-readable period
    pub report_period: String,
    /// Overall score in `[0, 100]`
    pub overall_score: f64,
    /// Industry ranking (1 = best)
    pub industry_ranking: u32,
    /// Environmental sub-scores and counts
    pub environmental: PillarMetrics,
    /// Social sub-scores and counts
    pub social: PillarMetrics,
    /// Governance sub-scores and counts
    pub governance: PillarMetrics,
    /// Certifications held
    #[serde(default)]
    pub certifications: Vec<String>,
    /// Areas flagged for improvement
    #[serde(default)]
    pub improvement_areas: Vec<String>,
}

/// Builds report records from aggregated metrics
#[derive(Clone)]
pub struct ReportModelBuilder {
    clock: Arc<dyn Clock>,
    title: String,
    recommendations: Vec<String>,
}

impl ReportModelBuilder {
    /// Create a builder reading time from `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let defaults = crate::config::ReportConfig::default();
        Self {
            clock,
            title: defaults.analytics_title,
            recommendations: defaults.recommendations,
        }
    }

    /// Use the title and recommendations from a report config
    pub fn with_report_config(mut self, config: &crate::config::ReportConfig) -> Self {
        self.title = config.analytics_title.clone();
        self.recommendations = config.recommendations.clone();
        self
    }

    /// Replace the recommendations
    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    /// Build an analytics report for `window`
    ///
    /// Totals carry a trend against the preceding window of the same length
    /// when that window has data.
    pub fn build_analytics(
        &self,
        aggregator: &dyn MetricsAggregator,
        window: &TimeWindow,
    ) -> ReportData {
        let current = aggregator.observations(window);
        let previous = aggregator.observations(&window.previous());

        let consumption = summarize(current.iter().map(|o| o.consumption));
        let cost = summarize(current.iter().map(|o| o.cost));
        let co2 = summarize(current.iter().map(|o| o.co2_emissions));

        let prev_consumption = summarize(previous.iter().map(|o| o.consumption));
        let prev_cost = summarize(previous.iter().map(|o| o.cost));
        let prev_co2 = summarize(previous.iter().map(|o| o.co2_emissions));

        if consumption.count == 0 {
            tracing::warn!(
                start = %window.start,
                end = %window.end,
                "No observations in report window"
            );
        }

        let metrics = vec![
            ReportMetric::new(TOTAL_CONSUMPTION, format_energy(consumption.sum), "kWh")
                .with_trend(percent_change(consumption.sum, &prev_consumption)),
            ReportMetric::new(TOTAL_COST, format_currency(cost.sum), "")
                .with_trend(percent_change(cost.sum, &prev_cost)),
            ReportMetric::new(CO2_EMISSIONS, format_energy(co2.sum), "kg")
                .with_trend(percent_change(co2.sum, &prev_co2)),
            ReportMetric::new("Average Consumption", format_energy(consumption.mean), "kWh"),
            ReportMetric::new("Peak Consumption", format_energy(consumption.max), "kWh"),
        ];

        tracing::debug!(
            observations = consumption.count,
            total_kwh = consumption.sum,
            "Built analytics report"
        );

        ReportData {
            title: self.title.clone(),
            generated_at: self.clock.now(),
            metrics,
            recommendations: self.recommendations.clone(),
        }
    }

    /// Build an ESG report; every pillar needs its three scoring sub-metrics
    pub fn build_esg(&self, input: &EsgMetrics) -> Result<EsgReportData> {
        let report = EsgReportData {
            company_name: input.company_name.clone(),
            report_period: input.report_period.clone(),
            overall_score: input.overall_score,
            industry_ranking: input.industry_ranking,
            environmental: pillar_score(Pillar::Environmental, &input.environmental)?,
            social: pillar_score(Pillar::Social, &input.social)?,
            governance: pillar_score(Pillar::Governance, &input.governance)?,
            certifications: input.certifications.clone(),
            improvement_areas: input.improvement_areas.clone(),
            generated_at: self.clock.now(),
        };
        report.validate()?;
        Ok(report)
    }
}

/// Unweighted mean of the pillar's three required sub-scores, two decimals
pub fn pillar_score(pillar: Pillar, input: &PillarMetrics) -> Result<PillarScore> {
    let required = pillar.required_sub_scores();
    let mut sub_scores = Vec::with_capacity(input.scores.len());

    for (key, label) in required {
        let value = *input
            .scores
            .get(key)
            .ok_or_else(|| ValidationError::MissingSubScore {
                pillar: pillar.to_string(),
                key: key.to_string(),
            })?;
        check_percentage(&format!("{}.{}", pillar, key), value)?;
        sub_scores.push(SubScore {
            key: key.to_string(),
            label: label.to_string(),
            value,
        });
    }

    let score = round_to(summarize(sub_scores.iter().map(|s| s.value)).mean, 2);

    for (key, value) in &input.scores {
        if required.iter().any(|(k, _)| k == key) {
            continue;
        }
        check_percentage(&format!("{}.{}", pillar, key), *value)?;
        sub_scores.push(SubScore {
            key: key.clone(),
            label: title_case(key),
            value: *value,
        });
    }

    let counts = input
        .counts
        .iter()
        .map(|(key, value)| NamedCount {
            key: key.clone(),
            label: title_case(key),
            value: *value,
        })
        .collect();

    Ok(PillarScore {
        pillar,
        score,
        sub_scores,
        counts,
    })
}

/// `jobs_created` -> `Jobs Created`
fn title_case(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

//! Metric inputs consumed by the report builder
//!
//! The dashboard's data source is an external collaborator; it is reached only
//! through [`MetricsAggregator`], and time only through [`Clock`], so reports
//! can be built deterministically in tests.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One time-indexed energy observation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnergyObservation {
    /// Observation time
    pub timestamp: DateTime<Utc>,
    /// Energy consumed (kWh)
    pub consumption: f64,
    /// Cost of the consumed energy (currency units)
    pub cost: f64,
    /// Emissions (kg CO₂)
    pub co2_emissions: f64,
}

/// Time-frame choices offered by the dashboard
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    /// Last 24 hours
    Day,
    /// Last 7 days
    Week,
    /// Last 30 days
    Month,
    /// Last 365 days
    Year,
}

impl TimeFrame {
    /// Length of the frame
    pub fn duration(&self) -> Duration {
        match self {
            TimeFrame::Day => Duration::days(1),
            TimeFrame::Week => Duration::days(7),
            TimeFrame::Month => Duration::days(30),
            TimeFrame::Year => Duration::days(365),
        }
    }
}

/// Half-open interval `[start, end)`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Inclusive start
    pub start: DateTime<Utc>,
    /// Exclusive end
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window of `frame` length ending at `now`
    pub fn ending_at(now: DateTime<Utc>, frame: TimeFrame) -> Self {
        Self {
            start: now - frame.duration(),
            end: now,
        }
    }

    /// Equally long window immediately before this one
    pub fn previous(&self) -> Self {
        let len = self.end - self.start;
        Self {
            start: self.start - len,
            end: self.start,
        }
    }

    /// Whether `t` falls inside the window
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

/// Source of time-series observations
pub trait MetricsAggregator: Send + Sync {
    /// Observations inside `window`, ordered by timestamp
    fn observations(&self, window: &TimeWindow) -> Vec<EnergyObservation>;
}

/// Aggregator over an in-memory series
#[derive(Clone, Debug, Default)]
pub struct InMemoryAggregator {
    series: Vec<EnergyObservation>,
}

impl InMemoryAggregator {
    /// Create from observations in any order
    pub fn new(mut series: Vec<EnergyObservation>) -> Self {
        series.sort_by_key(|o| o.timestamp);
        Self { series }
    }

    /// Number of stored observations
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Whether the series is empty
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl MetricsAggregator for InMemoryAggregator {
    fn observations(&self, window: &TimeWindow) -> Vec<EnergyObservation> {
        self.series
            .iter()
            .filter(|o| window.contains(o.timestamp))
            .copied()
            .collect()
    }
}

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

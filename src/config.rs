//! Configuration types for ecoflow-reports

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Artifact output settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory artifacts are delivered to (default: "./reports")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Document capture settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Oversampling factor applied when rasterizing the page layout (default: 2.0)
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// Compress document streams (default: true)
    #[serde(default = "default_true")]
    pub compress: bool,

    /// Load system fonts for text layout (default: true)
    ///
    /// Without fonts, text nodes are dropped from the captured page.
    #[serde(default = "default_true")]
    pub load_system_fonts: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            compress: true,
            load_system_fonts: true,
        }
    }
}

/// Tabular export settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TabularConfig {
    /// Field delimiter for delimited-text output (default: ',')
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Worksheet name in spreadsheet output (default: "Report")
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
}

impl Default for TabularConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            sheet_name: default_sheet_name(),
        }
    }
}

/// Report store settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Database path (default: "./ecoflow-reports.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Report content settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Title of analytics reports
    #[serde(default = "default_analytics_title")]
    pub analytics_title: String,

    /// Recommendations attached to analytics reports
    #[serde(default = "default_recommendations")]
    pub recommendations: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            analytics_title: default_analytics_title(),
            recommendations: default_recommendations(),
        }
    }
}

/// Main configuration for the export pipeline
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Product name used in artifact names and page headers (default: "EcoFlow")
    #[serde(default = "default_product_name")]
    pub product_name: String,

    /// Artifact output
    #[serde(default)]
    pub output: OutputConfig,

    /// Document capture
    #[serde(default)]
    pub capture: CaptureConfig,

    /// CSV and spreadsheet output
    #[serde(default)]
    pub tabular: TabularConfig,

    /// Report store
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Report content
    #[serde(default)]
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            product_name: default_product_name(),
            output: OutputConfig::default(),
            capture: CaptureConfig::default(),
            tabular: TabularConfig::default(),
            persistence: PersistenceConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    /// Check settings that would otherwise fail deep inside a pipeline
    pub fn validate(&self) -> Result<()> {
        let name = self.product_name.trim();
        if name.is_empty() {
            return Err(Error::config("product_name", "product name must not be empty"));
        }
        if name.contains(['/', '\\']) {
            return Err(Error::config(
                "product_name",
                format!("product name '{}' must not contain path separators", name),
            ));
        }

        let scale = self.capture.scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::config(
                "capture.scale",
                format!("scale must be a positive number, got {}", scale),
            ));
        }

        let delimiter = self.tabular.delimiter;
        if !delimiter.is_ascii() || matches!(delimiter, '"' | '\n' | '\r') {
            return Err(Error::config(
                "tabular.delimiter",
                format!("unsupported delimiter {:?}", delimiter),
            ));
        }

        if self.tabular.sheet_name.trim().is_empty() {
            return Err(Error::config("tabular.sheet_name", "sheet name must not be empty"));
        }

        Ok(())
    }
}

fn default_product_name() -> String {
    "EcoFlow".into()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./reports")
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./ecoflow-reports.db")
}

fn default_scale() -> f32 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_delimiter() -> char {
    ','
}

fn default_sheet_name() -> String {
    "Report".into()
}

fn default_analytics_title() -> String {
    "Advanced Analytics Report".into()
}

fn default_recommendations() -> Vec<String> {
    vec![
        "Optimize energy usage during peak hours (2-6 PM) to reduce costs by 15%.".into(),
        "Consider installing smart thermostats to improve efficiency by 12%.".into(),
        "Implement demand response programs to earn $200+ monthly credits.".into(),
    ]
}

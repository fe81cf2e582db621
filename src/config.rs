use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::loader::LoadOptions;
use crate::data::model::{EDUCATION, SEX, WORKCLASS};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Settings read from an optional JSON file. Every key may be omitted.
///
/// ```json
/// {
///   "data_path": "data_clean.csv",
///   "filter_columns": ["sex", "education", "workclass"],
///   "breakdown_columns": ["education", "sex", "workclass"],
///   "missing_markers": ["", "NA"],
///   "title": "Adult Income Analysis Dashboard"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset file (`.csv`, `.json`, `.parquet`).
    pub data_path: PathBuf,
    /// Columns offered as filters, in sidebar order.
    pub filter_columns: Vec<String>,
    /// Columns charted against income, in page order.
    pub breakdown_columns: Vec<String>,
    /// Cell texts read as a missing categorical value.
    pub missing_markers: Vec<String>,
    pub title: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data_clean.csv"),
            filter_columns: vec![SEX.to_string(), EDUCATION.to_string(), WORKCLASS.to_string()],
            breakdown_columns: vec![EDUCATION.to_string(), SEX.to_string(), WORKCLASS.to_string()],
            missing_markers: LoadOptions::default().missing_markers,
            title: "Adult Income Analysis Dashboard".to_string(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("Read configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            missing_markers: self.missing_markers.clone(),
        }
    }
}

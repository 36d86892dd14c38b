use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FilterSelection, PageSize, Record};

/// File name offered for every CSV download.
pub const EXPORT_FILENAME: &str = "GapMinder_Filtered_Data.csv";

/// Inbound dashboard event. Each event carries the full selection at the
/// moment it was raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DashboardEvent {
    FiltersChanged {
        selection: FilterSelection,
        #[serde(default)]
        page: usize,
    },
    ExportClicked {
        #[serde(default)]
        n_clicks: Option<u64>,
        selection: FilterSelection,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum DashboardOutput {
    Table(TablePage),
    Download(ExportPayload),
    NoUpdate,
}

/// One page of the filtered table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePage {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
    pub page_index: usize,
    pub page_count: usize,
    pub page_size: PageSize,
    pub total_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPayload {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeControl<T> {
    pub min: T,
    pub max: T,
    pub step: T,
    pub marks: Vec<T>,
}

/// Options and bounds the filter controls are built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardControls {
    pub countries: Vec<String>,
    pub continents: Vec<String>,
    pub population: RangeControl<u64>,
    pub life_expectancy: RangeControl<f64>,
    pub page_sizes: Vec<PageSize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub source: String,
    pub rows: usize,
    pub countries: usize,
    pub continents: usize,
    pub loaded_at: DateTime<Utc>,
}

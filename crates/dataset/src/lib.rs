use std::{
    collections::HashSet,
    fmt, fs,
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{
    domain::{DatasetBounds, Record, ValueRange, RECORD_COLUMNS},
    protocol::DatasetInfo,
};
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/plotly/datasets/master/gapminderDataFiveYear.csv";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to fetch dataset from {url}: {source}")]
    Fetch {
        url: String,
        source: reqwest::Error,
    },
    #[error("dataset request to {url} failed with status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to read dataset file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed dataset csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset is missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid {column} value {value}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
}

/// Where the table is read from at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Url(String),
    Path(PathBuf),
}

impl DatasetSource {
    pub async fn load(&self) -> Result<Dataset, DatasetError> {
        match self {
            DatasetSource::Url(url) => Dataset::fetch(&reqwest::Client::new(), url).await,
            DatasetSource::Path(path) => Dataset::open(path),
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Url(url) => f.write_str(url),
            DatasetSource::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Facts derived once from the loaded records.
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub source: String,
    pub countries: Vec<String>,
    pub continents: Vec<String>,
    pub bounds: DatasetBounds,
    pub loaded_at: DateTime<Utc>,
}

/// The loaded table. Immutable after construction; clones share storage.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Arc<[Record]>,
    summary: Arc<DatasetSummary>,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    country: String,
    continent: String,
    pop: f64,
    #[serde(rename = "lifeExp")]
    life_exp: f64,
}

impl Dataset {
    pub fn from_records(source: impl Into<String>, records: Vec<Record>) -> Self {
        let summary = summarize(source.into(), &records);
        Self {
            records: records.into(),
            summary: Arc::new(summary),
        }
    }

    /// Parse CSV with a header row. Columns other than the four dashboard
    /// columns are ignored.
    pub fn from_csv_reader<R: Read>(
        source: impl Into<String>,
        reader: R,
    ) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = reader.headers()?.clone();
        for column in RECORD_COLUMNS {
            if !headers.iter().any(|header| header == column) {
                return Err(DatasetError::MissingColumn(column));
            }
        }

        let mut records = Vec::new();
        for (index, row) in reader.deserialize::<RawRecord>().enumerate() {
            let raw = row?;
            records.push(project(index + 1, raw)?);
        }

        Ok(Self::from_records(source, records))
    }

    pub fn open(path: &Path) -> Result<Self, DatasetError> {
        let file = fs::File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_csv_reader(path.display().to_string(), file)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            "dataset loaded from file"
        );
        Ok(dataset)
    }

    pub async fn fetch(client: &reqwest::Client, url: &str) -> Result<Self, DatasetError> {
        debug!(%url, "fetching dataset");
        let fetch_error = |source| DatasetError::Fetch {
            url: url.to_string(),
            source,
        };
        let response = client.get(url).send().await.map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DatasetError::Status {
                url: url.to_string(),
                status,
            });
        }
        let body = response.bytes().await.map_err(fetch_error)?;
        let dataset = Self::from_csv_reader(url, body.as_ref())?;
        info!(%url, rows = dataset.len(), "dataset fetched");
        Ok(dataset)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> &DatasetSummary {
        &self.summary
    }

    pub fn bounds(&self) -> &DatasetBounds {
        &self.summary.bounds
    }

    pub fn info(&self) -> DatasetInfo {
        DatasetInfo {
            source: self.summary.source.clone(),
            rows: self.len(),
            countries: self.summary.countries.len(),
            continents: self.summary.continents.len(),
            loaded_at: self.summary.loaded_at,
        }
    }
}

fn project(row: usize, raw: RawRecord) -> Result<Record, DatasetError> {
    if !raw.pop.is_finite() || raw.pop < 0.0 {
        return Err(DatasetError::InvalidValue {
            row,
            column: "pop",
            value: raw.pop.to_string(),
        });
    }
    if !raw.life_exp.is_finite() {
        return Err(DatasetError::InvalidValue {
            row,
            column: "lifeExp",
            value: raw.life_exp.to_string(),
        });
    }

    Ok(Record {
        country: raw.country,
        continent: raw.continent,
        population: raw.pop.round() as u64,
        life_expectancy: raw.life_exp,
    })
}

fn summarize(source: String, records: &[Record]) -> DatasetSummary {
    DatasetSummary {
        source,
        countries: distinct(records.iter().map(|record| record.country.as_str())),
        continents: distinct(records.iter().map(|record| record.continent.as_str())),
        bounds: bounds_of(records),
        loaded_at: Utc::now(),
    }
}

/// Distinct values in order of first appearance.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|value| seen.insert(*value))
        .map(str::to_string)
        .collect()
}

fn bounds_of(records: &[Record]) -> DatasetBounds {
    let Some(first) = records.first() else {
        return DatasetBounds::default();
    };

    let mut population = ValueRange::new(first.population, first.population);
    let mut life_expectancy = ValueRange::new(first.life_expectancy, first.life_expectancy);
    for record in &records[1..] {
        population.min = population.min.min(record.population);
        population.max = population.max.max(record.population);
        life_expectancy.min = life_expectancy.min.min(record.life_expectancy);
        life_expectancy.max = life_expectancy.max.max(record.life_expectancy);
    }

    DatasetBounds {
        population,
        life_expectancy: ValueRange::new(life_expectancy.min.floor(), life_expectancy.max.ceil()),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

//! Destination catalog and the dataset it can be derived from

use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Column holding destination names in the dataset
pub const DESTINATION_COLUMN: &str = "Destination";

/// Default number of rows shown by a dataset preview
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Destinations offered when no dataset is configured
const BUILTIN_DESTINATIONS: [&str; 9] = [
    "London", "Phuket", "Bali", "New York", "Tokyo", "Paris", "Sydney", "Dubai", "Bangkok",
];

/// Cell values treated as missing
const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "None", "null", "NULL", "<NA>", "#N/A",
    "#NA",
];

/// Ordered set of selectable destinations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationCatalog {
    destinations: Vec<String>,
}

impl DestinationCatalog {
    /// The hard-coded catalog, in display order
    pub fn builtin() -> Self {
        Self {
            destinations: BUILTIN_DESTINATIONS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Distinct, non-missing values sorted lexicographically
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = values
            .into_iter()
            .filter(|v| !is_missing(v.as_ref()))
            .map(|v| v.as_ref().to_string())
            .collect();
        Self {
            destinations: unique.into_iter().collect(),
        }
    }

    pub fn contains(&self, destination: &str) -> bool {
        self.destinations.iter().any(|d| d == destination)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.destinations.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.destinations
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }
}

fn is_missing(value: &str) -> bool {
    MISSING_TOKENS.contains(&value.trim())
}

/// First rows of the dataset, for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetPreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

/// A CSV dataset held fully in memory
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Read the whole CSV file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| PredictorError::from_io(path, e))?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes.as_slice());

        let dataset_err = |source| PredictorError::Dataset {
            path: path.to_path_buf(),
            source,
        };

        let headers: Vec<String> = reader
            .headers()
            .map_err(dataset_err)?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(dataset_err)?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        debug!(path = %path.display(), columns = headers.len(), rows = rows.len(), "Dataset loaded");

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of `column`, or [`PredictorError::MissingColumn`]
    pub fn column(&self, column: &str) -> Result<impl Iterator<Item = &str>> {
        let idx = self
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| PredictorError::MissingColumn {
                column: column.to_string(),
                path: self.path.clone(),
            })?;
        Ok(self
            .rows
            .iter()
            .map(move |row| row.get(idx).map(String::as_str).unwrap_or("")))
    }

    /// Catalog of the distinct destinations in the dataset
    pub fn destinations(&self) -> Result<DestinationCatalog> {
        Ok(DestinationCatalog::from_values(self.column(DESTINATION_COLUMN)?))
    }

    pub fn preview(&self, rows: usize) -> DatasetPreview {
        DatasetPreview {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(rows).cloned().collect(),
            total_rows: self.rows.len(),
        }
    }
}

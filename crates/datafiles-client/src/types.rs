//! Wire types for the data files API

use serde::{Deserialize, Serialize};

/// Server-assigned data file identifier
pub type DataFileId = i64;

/// Response to every create call
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDataFile {
    pub id: DataFileId,
}

/// A data file as returned by the read endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataFile {
    /// Data file ID
    pub id: DataFileId,
    /// Whether the first record is a column-header row
    pub header: bool,
    /// Any other fields the server sends, kept as-is
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Partial update for a data file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFileUpdate {
    pub header: bool,
}

/// JSON body of a create call. Exactly one source per request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum CreateSource {
    Url(String),
    Paste(String),
}

/// One page of a limit/offset listing
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of items across all pages
    pub count: u64,
    /// Items on this page
    pub results: Vec<T>,
}

/// Options for listing data files
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum items to return (server default 50, capped at 500)
    pub limit: Option<u32>,
    /// Number of items to skip
    pub offset: Option<u32>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set starting offset
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub(crate) fn to_query(self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset".to_string(), offset.to_string()));
        }
        query
    }
}

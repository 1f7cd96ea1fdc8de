//! Datasets: uploaded files with descriptive metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasetId(pub Uuid);

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DatasetId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Where a dataset's file lives in blob storage
#[derive(Debug, Clone, PartialEq)]
pub struct FileRef {
    /// Public path clients fetch the file from
    pub location: String,
    /// Unique storage key
    pub key: String,
    pub original_filename: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: i64,
    /// SHA-256 hex digest of the stored bytes
    pub checksum: String,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub id: DatasetId,
    /// Set at creation, never changed
    pub owner_id: UserId,
    pub title: String,
    pub author: String,
    pub experiment_type: String,
    pub tags: Vec<String>,
    pub file: FileRef,
    /// Decoded file text, when the upload was readable as text
    pub content: Option<String>,
    /// Lowercased metadata + content that searches match against
    pub indexed_text: String,
    pub created_at: DateTime<Utc>,
}

/// Dataset to be inserted; the store assigns id and creation time
#[derive(Debug, Clone)]
pub struct NewDataset {
    pub owner_id: UserId,
    pub title: String,
    pub author: String,
    pub experiment_type: String,
    pub tags: Vec<String>,
    pub file: FileRef,
    pub content: Option<String>,
    pub indexed_text: String,
}

impl NewDataset {
    /// Approximate persisted size of the record in bytes.
    pub fn record_size(&self) -> usize {
        let metadata = self.title.len()
            + self.author.len()
            + self.experiment_type.len()
            + self.tags.iter().map(String::len).sum::<usize>()
            + self.file.location.len()
            + self.file.key.len()
            + self.file.original_filename.as_deref().map_or(0, str::len)
            + self.file.content_type.as_deref().map_or(0, str::len)
            + self.file.checksum.len();

        metadata + self.content.as_deref().map_or(0, str::len) + self.indexed_text.len()
    }
}

/// Shallow owner view attached to admin listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnerSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Client-facing dataset record. Content and indexed text stay server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatasetView {
    pub id: DatasetId,
    pub title: String,
    pub author: String,
    pub experiment_type: String,
    pub tags: Vec<String>,
    pub file_location: String,
    pub file_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub size_bytes: i64,
    pub checksum: String,
    pub owner_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<&Dataset> for DatasetView {
    fn from(dataset: &Dataset) -> Self {
        Self {
            id: dataset.id,
            title: dataset.title.clone(),
            author: dataset.author.clone(),
            experiment_type: dataset.experiment_type.clone(),
            tags: dataset.tags.clone(),
            file_location: dataset.file.location.clone(),
            file_key: dataset.file.key.clone(),
            original_filename: dataset.file.original_filename.clone(),
            content_type: dataset.file.content_type.clone(),
            size_bytes: dataset.file.size_bytes,
            checksum: dataset.file.checksum.clone(),
            owner_id: dataset.owner_id,
            created_at: dataset.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewDataset {
        NewDataset {
            owner_id: UserId::new(),
            title: "Growth curve".into(),
            author: "Ann".into(),
            experiment_type: "qPCR".into(),
            tags: vec!["alpha".into(), "beta".into()],
            file: FileRef {
                location: "/uploads/k.csv".into(),
                key: "k.csv".into(),
                original_filename: None,
                content_type: None,
                size_bytes: 4,
                checksum: "00".into(),
            },
            content: Some("data".into()),
            indexed_text: "growth curve\ndata".into(),
        }
    }

    #[test]
    fn test_record_size_counts_content_and_index() {
        let base = sample();
        let mut bigger = base.clone();
        bigger.content = Some("x".repeat(100));
        assert_eq!(bigger.record_size() - base.record_size(), 96);
    }

    #[test]
    fn test_view_uses_camel_case() {
        let new = sample();
        let dataset = Dataset {
            id: DatasetId(Uuid::new_v4()),
            owner_id: new.owner_id,
            title: new.title,
            author: new.author,
            experiment_type: new.experiment_type,
            tags: new.tags,
            file: new.file,
            content: new.content,
            indexed_text: new.indexed_text,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(DatasetView::from(&dataset)).unwrap();
        assert_eq!(json["experimentType"], "qPCR");
        assert_eq!(json["fileLocation"], "/uploads/k.csv");
        assert!(json.get("content").is_none());
        assert!(json.get("indexedText").is_none());
        assert!(json.get("originalFilename").is_none());
    }
}

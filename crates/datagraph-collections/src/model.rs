//! Records exchanged with the collection REST backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of collection entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionType {
    Folder,
    Virtual,
    File,
    Link,
    ExternalFile,
    ApiFile,
    #[serde(other)]
    Other,
}

/// How a collection's content is split for training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrainingMode {
    Chunk,
    Qa,
    Auto,
    #[serde(other)]
    Other,
}

impl TrainingMode {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            TrainingMode::Chunk => Some("Chunk split"),
            TrainingMode::Qa => Some("QA split"),
            TrainingMode::Auto => Some("Auto"),
            TrainingMode::Other => None,
        }
    }
}

/// A dataset collection as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub dataset_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub collection_type: CollectionType,
    #[serde(default)]
    pub training_type: Option<TrainingMode>,
    #[serde(default)]
    pub training_amount: u64,
    #[serde(default)]
    pub data_amount: u64,
    #[serde(default)]
    pub forbid: bool,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Collection {
    pub fn is_folder(&self) -> bool {
        self.collection_type == CollectionType::Folder
    }

    pub fn has_pending_training(&self) -> bool {
        self.training_amount > 0
    }
}

/// Lifecycle status of the parent dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatasetStatus {
    Active,
    Syncing,
    #[serde(other)]
    Other,
}

/// The dataset the listed collections belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetDetail {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub status: DatasetStatus,
}

impl DatasetDetail {
    pub fn is_syncing(&self) -> bool {
        self.status == DatasetStatus::Syncing
    }
}

/// One breadcrumb entry leading to the current folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathItem {
    pub parent_id: String,
    pub parent_name: String,
}

/// Outcome of a link collection sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncResult {
    SameRaw,
    Success,
}

impl SyncResult {
    pub fn label(&self) -> &'static str {
        match self {
            SyncResult::SameRaw => "Content unchanged, no update needed",
            SyncResult::Success => "Sync started",
        }
    }
}

/// Paginated list request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub dataset_id: String,
    pub parent_id: String,
    pub search_text: String,
    pub page_num: u32,
    pub page_size: u32,
}

/// One page of collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionPage {
    pub list: Vec<Collection>,
    pub total: u64,
}

/// Partial update. Unset fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCollection {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forbid: Option<bool>,
}

/// New collection under a parent folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCollection {
    pub dataset_id: String,
    pub parent_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub collection_type: CollectionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_type: Option<TrainingMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u32>,
}

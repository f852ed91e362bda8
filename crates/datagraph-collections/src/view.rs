//! Row presentation for the collection table

use chrono::{DateTime, Utc};

use crate::model::Collection;

/// Tag colour for a row's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    Gray,
    Green,
}

/// Training status shown for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// Chunks still waiting to be embedded
    Embedding { total: u64 },
    Active,
}

impl RowStatus {
    pub fn of(collection: &Collection) -> Self {
        if collection.training_amount > 0 {
            RowStatus::Embedding { total: collection.training_amount }
        } else {
            RowStatus::Active
        }
    }

    pub fn text(&self) -> String {
        match self {
            RowStatus::Embedding { total } => format!("Embedding ({})", total),
            RowStatus::Active => "Active".to_string(),
        }
    }

    pub fn color(&self) -> ColorScheme {
        match self {
            RowStatus::Embedding { .. } => ColorScheme::Gray,
            RowStatus::Active => ColorScheme::Green,
        }
    }
}

/// One table row derived from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRow {
    pub collection: Collection,
    pub status: RowStatus,
}

impl CollectionRow {
    pub fn new(collection: Collection) -> Self {
        let status = RowStatus::of(&collection);
        Self { collection, status }
    }

    /// Training type column. Folders and unknown modes show `-`.
    pub fn training_type_text(&self) -> &'static str {
        if self.collection.is_folder() {
            return "-";
        }
        self.collection
            .training_type
            .and_then(|mode| mode.label())
            .unwrap_or("-")
    }

    pub fn data_amount_text(&self) -> String {
        match self.collection.data_amount {
            0 => "-".to_string(),
            n => n.to_string(),
        }
    }

    /// The enable switch is on when the collection is not forbidden.
    pub fn is_enabled(&self) -> bool {
        !self.collection.forbid
    }

    pub fn create_time_text(&self) -> String {
        format_ymd_hm(&self.collection.create_time)
    }

    pub fn update_time_text(&self) -> String {
        format_ymd_hm(&self.collection.update_time)
    }
}

fn format_ymd_hm(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M").to_string()
}

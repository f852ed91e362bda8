//! Dataset collection list
//!
//! REST client for the collection backend plus a headless controller that
//! drives the paginated, searchable, self-refreshing collection table.

pub mod client;
pub mod controller;
pub mod errors;
pub mod model;
pub mod notify;
pub mod view;

pub use client::{CollectionApi, CollectionClientConfig, RestCollectionApi};
pub use controller::{CollectionListController, ListState, ListViewConfig};
pub use errors::{CollectionError, CollectionResult};
pub use model::{
    Collection, CollectionPage, CollectionType, CreateCollection, DatasetDetail, DatasetStatus,
    ListQuery, PathItem, SyncResult, TrainingMode, UpdateCollection,
};
pub use notify::{Notifier, RecordingNotifier, Toast, ToastStatus, TracingNotifier};
pub use view::{CollectionRow, ColorScheme, RowStatus};

//! Storage Adapter - 远端对象存储与本地回退

mod gcs_storage;
mod local_storage;

pub use gcs_storage::{content_type_for, storage_key, GcsStorageBackend, GcsStorageConfig};
pub use local_storage::LocalStorageBackend;

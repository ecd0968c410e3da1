//! Object uploads and public URLs.
//!
//! ```ignore
//! let bucket = storage.from("product-images");
//! let name = unique_object_name("lamp.png");
//! let uploaded = bucket.upload(&name, bytes, FileOptions::new().cache_control("3600")).await;
//! let url = bucket.get_public_url(&name).public_url;
//! ```

pub mod bucket_api;
pub mod client;
pub mod naming;
pub mod types;

pub use bucket_api::{validate_object_name, StorageBucketApi};
pub use client::StorageClient;
pub use naming::{unique_object_name, unique_object_name_with};
pub use types::{FileOptions, PublicUrl, UploadResponse};

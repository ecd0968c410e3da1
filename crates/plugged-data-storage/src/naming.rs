use std::path::Path;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A collision-resistant object name keeping the original extension.
///
/// `photo.JPG` becomes something like `1718000000000-3f9a2c1d.JPG`.
pub fn unique_object_name(original_name: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    unique_object_name_with(original_name, Utc::now(), &token[..8])
}

/// Deterministic variant of [`unique_object_name`].
pub fn unique_object_name_with(original_name: &str, now: DateTime<Utc>, token: &str) -> String {
    let millis = now.timestamp_millis();
    match Path::new(original_name).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{millis}-{token}.{ext}"),
        _ => format!("{millis}-{token}"),
    }
}

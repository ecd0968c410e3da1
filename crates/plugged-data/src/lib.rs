//! Data access for the Plugged admin dashboard.
//!
//! One [`AdminClient`] carries the project URL and key and hands out the
//! three sub-clients: admin-gated auth, object storage, and table queries.
//!
//! ```ignore
//! use plugged_data::prelude::*;
//!
//! let client = SettingsStore::default_location()?.connect()?;
//! let signed_in = client.auth().sign_in_with_password("owner@plugged.example", "...").await;
//!
//! let pending = client
//!     .from("orders")
//!     .select("*")
//!     .eq("status", "pending")
//!     .order("created_at", OrderDirection::Descending)
//!     .limit(20)
//!     .await;
//! ```

pub mod client;
pub mod merge;
pub mod settings;
pub mod verify;

pub use client::AdminClient;
pub use merge::{fetch_then_patch, merge_edit};
pub use settings::{SettingsStore, SupabaseSettings};
pub use verify::{test_connection, verify_schema, verify_tables, SchemaReport, TableCheck, TableStatus, REQUIRED_TABLES};

pub use plugged_data_auth;
pub use plugged_data_core;
pub use plugged_data_query;
pub use plugged_data_storage;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use plugged_data::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{AdminClient, SettingsStore, SupabaseSettings};
    pub use plugged_data_auth::{FileSessionStore, MemorySessionStore, Session, SessionStore, User};
    pub use plugged_data_core::{
        row, ClientConfig, ClientError, DeleteResponse, EmptyResponse, ErrorInfo, ErrorKind,
        Outcome, ReadResponse, Response, Row, SingleResponse, WriteResponse,
    };
    pub use plugged_data_query::{Filterable, IsValue, Modifiable, OrderDirection};
    pub use plugged_data_storage::{unique_object_name, FileOptions, PublicUrl};
}

//! Connection and schema checks run from the settings screen.

use futures_util::future::join_all;

use plugged_data_core::{ErrorInfo, Response};
use plugged_data_query::Modifiable;

use crate::client::AdminClient;

/// Tables the dashboard reads and writes.
pub const REQUIRED_TABLES: [&str; 5] = [
    "products",
    "orders",
    "order_items",
    "profiles",
    "payment_instructions",
];

/// PostgreSQL `undefined_table`.
const UNDEFINED_TABLE: &str = "42P01";
/// PostgREST "relation not in schema cache".
const SCHEMA_CACHE_MISS: &str = "PGRST205";

#[derive(Debug, Clone, PartialEq)]
pub enum TableStatus {
    /// Reachable; `rows` is the exact count when the server sent one.
    Present { rows: Option<u64> },
    Missing,
    Failed(ErrorInfo),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCheck {
    pub table: String,
    pub status: TableStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaReport {
    pub tables: Vec<TableCheck>,
}

impl SchemaReport {
    pub fn missing(&self) -> Vec<&str> {
        self.tables
            .iter()
            .filter(|t| t.status == TableStatus::Missing)
            .map(|t| t.table.as_str())
            .collect()
    }

    pub fn failures(&self) -> Vec<(&str, &ErrorInfo)> {
        self.tables
            .iter()
            .filter_map(|t| match &t.status {
                TableStatus::Failed(e) => Some((t.table.as_str(), e)),
                _ => None,
            })
            .collect()
    }

    /// Every table is present.
    pub fn is_complete(&self) -> bool {
        self.tables
            .iter()
            .all(|t| matches!(t.status, TableStatus::Present { .. }))
    }
}

/// Check every table in [`REQUIRED_TABLES`].
pub async fn verify_schema(client: &AdminClient) -> SchemaReport {
    verify_tables(client, &REQUIRED_TABLES).await
}

/// Check the given tables concurrently; the report keeps their order.
pub async fn verify_tables(client: &AdminClient, tables: &[&str]) -> SchemaReport {
    let checks = tables.iter().map(|table| check_table(client, table));
    let tables = join_all(checks).await;
    let report = SchemaReport { tables };
    if report.is_complete() {
        tracing::info!("All required tables are present");
    } else {
        tracing::warn!(missing = ?report.missing(), "Schema is incomplete");
    }
    report
}

/// Count the rows of `products`, proving the URL and key work.
pub async fn test_connection(client: &AdminClient) -> Response<u64> {
    match count_rows(client, "products").await {
        Ok(rows) => Response::ok(rows.unwrap_or(0)),
        Err(e) => {
            tracing::warn!("Connection test failed: {e}");
            Response::error(e)
        }
    }
}

async fn check_table(client: &AdminClient, table: &str) -> TableCheck {
    let status = match count_rows(client, table).await {
        Ok(rows) => TableStatus::Present { rows },
        Err(e) if is_missing_table(&e) => TableStatus::Missing,
        Err(e) => TableStatus::Failed(e),
    };
    TableCheck {
        table: table.to_string(),
        status,
    }
}

async fn count_rows(client: &AdminClient, table: &str) -> Result<Option<u64>, ErrorInfo> {
    let resp = client.from(table).select("*").limit(1).count_exact().await;
    let count = resp.count();
    resp.into_result().map(|_| count)
}

fn is_missing_table(err: &ErrorInfo) -> bool {
    matches!(err.code.as_deref(), Some(UNDEFINED_TABLE) | Some(SCHEMA_CACHE_MISS))
        || (err.status == Some(404) && err.code.is_none())
}

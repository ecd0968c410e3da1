use serde::Serialize;
use serde_json::Value as JsonValue;

use plugged_data_core::{Connection, ErrorInfo, Row};

use crate::descriptor::QueryDescriptor;
use crate::filter::validate_identifier;
use crate::select::SelectBuilder;
use crate::write::{DeleteBuilder, InsertBuilder, UpdateBuilder};

/// Entry point for one table: pick a read or a write.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    conn: Connection,
    table: String,
}

impl QueryBuilder {
    pub fn new(conn: Connection, table: impl Into<String>) -> Self {
        Self {
            conn,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn table_error(&self) -> Option<ErrorInfo> {
        validate_identifier(&self.table, "Table").err()
    }

    /// Start a read returning dynamic [`Row`]s.
    ///
    /// `columns` is a comma-separated projection; `"*"` selects everything.
    pub fn select(self, columns: &str) -> SelectBuilder<Row> {
        self.select_as(columns)
    }

    /// Start a read whose rows decode into `T`.
    pub fn select_as<T>(self, columns: &str) -> SelectBuilder<T> {
        let invalid = self.table_error();
        SelectBuilder::new(self.conn, QueryDescriptor::new(self.table, columns), invalid)
    }

    /// Insert one object or an array of objects.
    pub fn insert<P: Serialize + ?Sized>(self, payload: &P) -> InsertBuilder<Row> {
        let payload = self.payload(payload);
        InsertBuilder::new(self.conn, self.table, payload)
    }

    /// Update the rows matched by the conditions chained next.
    pub fn update<P: Serialize + ?Sized>(self, payload: &P) -> UpdateBuilder<Row> {
        let payload = self.payload(payload);
        UpdateBuilder::new(self.conn, self.table, payload)
    }

    /// Delete the rows matched by the conditions chained next.
    pub fn delete(self) -> DeleteBuilder {
        DeleteBuilder::new(self.conn, self.table)
    }

    fn payload<P: Serialize + ?Sized>(&self, payload: &P) -> Result<JsonValue, ErrorInfo> {
        if let Some(err) = self.table_error() {
            return Err(err);
        }
        serde_json::to_value(payload)
            .map_err(|e| ErrorInfo::serialization(format!("Failed to encode payload: {e}")))
    }
}

/// Adds `from(table)` to anything holding a connection.
pub trait ConnectionQueryExt {
    fn from(&self, table: &str) -> QueryBuilder;
}

impl ConnectionQueryExt for Connection {
    fn from(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new(self.clone(), table)
    }
}

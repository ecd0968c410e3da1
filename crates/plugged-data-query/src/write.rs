use std::future::IntoFuture;
use std::marker::PhantomData;

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use plugged_data_core::{Connection, DeleteResponse, EmptyResponse, ErrorInfo, Response, Row, WriteResponse};

use crate::execute::{execute_empty, execute_rows};
use crate::filter::{Filter, Filterable};
use crate::postgrest::{build_delete, build_insert, build_update, RestRequest};

fn refuse_unfiltered(operation: &str) -> ErrorInfo {
    ErrorInfo::invalid_request(format!(
        "Refusing to {operation} without match conditions"
    ))
}

/// Insert of one row or a batch; sent on `.await` or [`execute`](Self::execute).
pub struct InsertBuilder<T = Row> {
    conn: Connection,
    table: String,
    payload: Result<JsonValue, ErrorInfo>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> InsertBuilder<T> {
    pub(crate) fn new(conn: Connection, table: String, payload: Result<JsonValue, ErrorInfo>) -> Self {
        Self {
            conn,
            table,
            payload,
            _marker: PhantomData,
        }
    }

    /// Decode the returned rows as `U`.
    pub fn returning<U>(self) -> InsertBuilder<U> {
        InsertBuilder::new(self.conn, self.table, self.payload)
    }

    pub fn to_request(&self) -> Result<RestRequest, ErrorInfo> {
        let payload = self.payload.clone()?;
        build_insert(&self.conn.rest_url(), &self.table, payload)
    }
}

impl<T: DeserializeOwned> InsertBuilder<T> {
    pub async fn execute(self) -> WriteResponse<T> {
        match self.to_request() {
            Ok(request) => execute_rows(&self.conn, request).await,
            Err(e) => Response::error(e),
        }
    }
}

impl<T> IntoFuture for InsertBuilder<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = WriteResponse<T>;
    type IntoFuture = BoxFuture<'static, WriteResponse<T>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

/// Partial update of the rows matching the attached conditions.
///
/// At least one condition is required; an update without one is refused
/// before anything is sent.
pub struct UpdateBuilder<T = Row> {
    conn: Connection,
    table: String,
    payload: Result<JsonValue, ErrorInfo>,
    filters: Vec<Filter>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Filterable for UpdateBuilder<T> {
    fn filters_mut(&mut self) -> &mut Vec<Filter> {
        &mut self.filters
    }
}

impl<T> UpdateBuilder<T> {
    pub(crate) fn new(conn: Connection, table: String, payload: Result<JsonValue, ErrorInfo>) -> Self {
        Self {
            conn,
            table,
            payload,
            filters: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Decode the returned rows as `U`.
    pub fn returning<U>(self) -> UpdateBuilder<U> {
        UpdateBuilder {
            conn: self.conn,
            table: self.table,
            payload: self.payload,
            filters: self.filters,
            _marker: PhantomData,
        }
    }

    pub fn to_request(&self) -> Result<RestRequest, ErrorInfo> {
        if self.filters.is_empty() {
            return Err(refuse_unfiltered("update"));
        }
        let payload = self.payload.clone()?;
        build_update(&self.conn.rest_url(), &self.table, &self.filters, payload)
    }
}

impl<T: DeserializeOwned> UpdateBuilder<T> {
    pub async fn execute(self) -> WriteResponse<T> {
        match self.to_request() {
            Ok(request) => execute_rows(&self.conn, request).await,
            Err(e) => Response::error(e),
        }
    }
}

impl<T> IntoFuture for UpdateBuilder<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = WriteResponse<T>;
    type IntoFuture = BoxFuture<'static, WriteResponse<T>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

/// Delete of the rows matching the attached conditions.
///
/// At least one condition is required.
pub struct DeleteBuilder {
    conn: Connection,
    table: String,
    filters: Vec<Filter>,
}

impl Filterable for DeleteBuilder {
    fn filters_mut(&mut self) -> &mut Vec<Filter> {
        &mut self.filters
    }
}

impl DeleteBuilder {
    pub(crate) fn new(conn: Connection, table: String) -> Self {
        Self {
            conn,
            table,
            filters: Vec::new(),
        }
    }

    pub fn to_request(&self) -> Result<RestRequest, ErrorInfo> {
        if self.filters.is_empty() {
            return Err(refuse_unfiltered("delete"));
        }
        build_delete(&self.conn.rest_url(), &self.table, &self.filters)
    }

    pub async fn execute(self) -> DeleteResponse {
        match self.to_request() {
            Ok(request) => execute_empty(&self.conn, request).await,
            Err(e) => EmptyResponse::error(e),
        }
    }
}

impl IntoFuture for DeleteBuilder {
    type Output = DeleteResponse;
    type IntoFuture = BoxFuture<'static, DeleteResponse>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugged_data_core::ErrorKind;
    use serde_json::json;

    fn conn() -> Connection {
        Connection::connect("https://example.supabase.co", "service-key").unwrap()
    }

    #[test]
    fn unfiltered_update_and_delete_are_refused() {
        let update: UpdateBuilder = UpdateBuilder::new(conn(), "orders".into(), Ok(json!({"status": "paid"})));
        let err = update.to_request().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidRequest);

        let delete = DeleteBuilder::new(conn(), "orders".into());
        assert!(delete.to_request().is_err());
    }

    #[test]
    fn invalid_column_does_not_count_as_condition() {
        let update: UpdateBuilder = UpdateBuilder::new(conn(), "orders".into(), Ok(json!({"status": "paid"})))
            .eq("id;--", 1);
        assert!(update.to_request().is_err());
    }

    #[test]
    fn payload_error_surfaces_from_request() {
        let insert: InsertBuilder =
            InsertBuilder::new(conn(), "products".into(), Err(ErrorInfo::serialization("bad payload")));
        assert_eq!(insert.to_request().unwrap_err().message, "bad payload");
    }

    #[tokio::test]
    async fn refused_delete_reports_error_without_sending() {
        let resp = DeleteBuilder::new(conn(), "orders".into()).await;
        assert!(resp.error_info().is_some());
    }
}

use std::future::{Future, IntoFuture};
use std::marker::PhantomData;

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;

use plugged_data_core::{Connection, ErrorInfo, ReadResponse, Response, Row, SingleResponse};

use crate::descriptor::{Modifiable, QueryDescriptor};
use crate::execute::execute_rows;
use crate::filter::{Filter, Filterable};
use crate::postgrest::{build_select, RestRequest};

/// A read being assembled.
///
/// Every method consumes the builder and returns the next stage, so a clone
/// kept from an earlier stage is unaffected by later calls. Nothing is sent
/// until [`execute`](Self::execute), [`single`](Self::single) or `.await`.
pub struct SelectBuilder<T = Row> {
    conn: Connection,
    descriptor: QueryDescriptor,
    /// Set when the table name was rejected; reported at execution.
    invalid: Option<ErrorInfo>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for SelectBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
            descriptor: self.descriptor.clone(),
            invalid: self.invalid.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for SelectBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectBuilder")
            .field("descriptor", &self.descriptor)
            .field("invalid", &self.invalid)
            .finish()
    }
}

impl<T> Filterable for SelectBuilder<T> {
    fn filters_mut(&mut self) -> &mut Vec<Filter> {
        &mut self.descriptor.filters
    }
}

impl<T> Modifiable for SelectBuilder<T> {
    fn descriptor_mut(&mut self) -> &mut QueryDescriptor {
        &mut self.descriptor
    }
}

impl<T> SelectBuilder<T> {
    pub(crate) fn new(conn: Connection, descriptor: QueryDescriptor, invalid: Option<ErrorInfo>) -> Self {
        Self {
            conn,
            descriptor,
            invalid,
            _marker: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    /// Decode rows as `U` instead of `T`.
    pub fn returns<U>(self) -> SelectBuilder<U> {
        SelectBuilder::new(self.conn, self.descriptor, self.invalid)
    }

    /// The request this builder would send.
    pub fn to_request(&self) -> Result<RestRequest, ErrorInfo> {
        if let Some(err) = &self.invalid {
            return Err(err.clone());
        }
        build_select(&self.conn.rest_url(), &self.descriptor)
    }
}

impl<T: DeserializeOwned> SelectBuilder<T> {
    /// Send the read and return every matching row.
    pub async fn execute(self) -> ReadResponse<T> {
        let request = match self.to_request() {
            Ok(request) => request,
            Err(e) => return Response::error(e),
        };
        execute_rows(&self.conn, request).await
    }

    /// Send the read restricted to one row and unwrap it.
    ///
    /// No match is `{ data: None, error: None }`; a failed read keeps its error.
    pub fn single(mut self) -> impl Future<Output = SingleResponse<T>> + Send
    where
        T: Send + 'static,
    {
        self.descriptor.first_row_only();
        async move { self.execute().await.into_single() }
    }
}

impl<T> IntoFuture for SelectBuilder<T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = ReadResponse<T>;
    type IntoFuture = BoxFuture<'static, ReadResponse<T>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.execute())
    }
}

use crate::error::ErrorInfo;

/// Response envelope matching the dashboard's `{ data, error }` convention.
///
/// At most one of `data` and `error` is set. A response with neither means
/// "nothing there" (e.g. `.single()` against zero rows), which is not a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<D> {
    data: Option<D>,
    error: Option<ErrorInfo>,
    count: Option<u64>,
}

/// Rows returned by a read.
pub type ReadResponse<T> = Response<Vec<T>>;
/// One row (or none) returned by `.single()`.
pub type SingleResponse<T> = Response<T>;
/// Rows echoed back by an insert or update.
pub type WriteResponse<T> = Response<Vec<T>>;

impl<D> Response<D> {
    /// Create a successful response with data.
    pub fn ok(data: D) -> Self {
        Self {
            data: Some(data),
            error: None,
            count: None,
        }
    }

    /// Create a successful response carrying no data.
    pub fn empty() -> Self {
        Self {
            data: None,
            error: None,
            count: None,
        }
    }

    /// Create an error response.
    pub fn error(err: impl Into<ErrorInfo>) -> Self {
        Self {
            data: None,
            error: Some(err.into()),
            count: None,
        }
    }

    /// Attach a total row count (only meaningful on success).
    pub fn with_count(mut self, count: Option<u64>) -> Self {
        if self.error.is_none() {
            self.count = count;
        }
        self
    }

    pub fn data(&self) -> Option<&D> {
        self.data.as_ref()
    }

    pub fn error_info(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    /// Total row count reported by the server, when it was requested.
    pub fn count(&self) -> Option<u64> {
        self.count
    }

    /// Split into `(data, error)`.
    pub fn into_parts(self) -> (Option<D>, Option<ErrorInfo>) {
        (self.data, self.error)
    }

    /// Convert into a Result, consuming the response.
    pub fn into_result(self) -> Result<Option<D>, ErrorInfo> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.data),
        }
    }

    /// Transform the data, keeping error and count untouched.
    pub fn map<U>(self, f: impl FnOnce(D) -> U) -> Response<U> {
        Response {
            data: self.data.map(f),
            error: self.error,
            count: self.count,
        }
    }
}

impl<T> Response<Vec<T>> {
    /// Keep only the first row: `[]` becomes an empty response, errors pass through.
    pub fn into_single(self) -> Response<T> {
        if let Some(err) = self.error {
            return Response::error(err);
        }
        match self.data.and_then(|rows| rows.into_iter().next()) {
            Some(row) => Response::ok(row).with_count(self.count),
            None => Response::empty().with_count(self.count),
        }
    }

    /// Number of rows returned (0 on error).
    pub fn len(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Envelope for operations that return nothing on success (delete, sign-out).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmptyResponse {
    error: Option<ErrorInfo>,
}

/// Result of a delete.
pub type DeleteResponse = EmptyResponse;

impl EmptyResponse {
    pub fn ok() -> Self {
        Self { error: None }
    }

    pub fn error(err: impl Into<ErrorInfo>) -> Self {
        Self {
            error: Some(err.into()),
        }
    }

    pub fn error_info(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    pub fn into_result(self) -> Result<(), ErrorInfo> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Shared view over every envelope kind.
pub trait Outcome {
    fn error_info(&self) -> Option<&ErrorInfo>;

    fn is_ok(&self) -> bool {
        self.error_info().is_none()
    }

    fn is_err(&self) -> bool {
        self.error_info().is_some()
    }

    /// Error message, if any, ready for display.
    fn error_message(&self) -> Option<&str> {
        self.error_info().map(|e| e.message.as_str())
    }
}

impl<D> Outcome for Response<D> {
    fn error_info(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }
}

impl Outcome for EmptyResponse {
    fn error_info(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }
}

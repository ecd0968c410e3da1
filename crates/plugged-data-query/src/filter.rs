use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use plugged_data_core::ErrorInfo;

/// Comparison operators understood by the REST endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    Is,
    In,
    Contains,
    TextSearch,
}

impl FilterOperator {
    /// Operator prefix placed before the value, without the dot.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Is => "is",
            Self::In => "in",
            Self::Contains => "cs",
            Self::TextSearch => "fts",
        }
    }
}

/// Right-hand side of an `is` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsValue {
    Null,
    True,
    False,
    Unknown,
}

impl IsValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::True => "true",
            Self::False => "false",
            Self::Unknown => "unknown",
        }
    }
}

/// A scalar compared against a column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(JsonValue),
}

impl FilterValue {
    /// Render as it appears after the operator prefix.
    pub fn render(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Json(JsonValue::String(s)) => s.clone(),
            Self::Json(v) => v.to_string(),
        }
    }

    /// Render as one member of an `in.(...)` list.
    ///
    /// Members containing list syntax are double-quoted.
    fn render_list_item(&self) -> String {
        let raw = self.render();
        if raw.contains([',', '(', ')', '"', ' ']) {
            format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
        } else {
            raw
        }
    }
}

/// Conversion into a [`FilterValue`].
pub trait IntoFilterValue {
    fn into_filter_value(self) -> FilterValue;
}

impl IntoFilterValue for FilterValue {
    fn into_filter_value(self) -> FilterValue {
        self
    }
}

impl IntoFilterValue for bool {
    fn into_filter_value(self) -> FilterValue {
        FilterValue::Bool(self)
    }
}

macro_rules! impl_int_filter_value {
    ($($ty:ty),*) => {
        $(
            impl IntoFilterValue for $ty {
                fn into_filter_value(self) -> FilterValue {
                    FilterValue::Int(i64::from(self))
                }
            }
        )*
    };
}

impl_int_filter_value!(i8, i16, i32, i64, u8, u16, u32);

impl IntoFilterValue for u64 {
    fn into_filter_value(self) -> FilterValue {
        match i64::try_from(self) {
            Ok(n) => FilterValue::Int(n),
            Err(_) => FilterValue::Text(self.to_string()),
        }
    }
}

impl IntoFilterValue for f32 {
    fn into_filter_value(self) -> FilterValue {
        FilterValue::Float(f64::from(self))
    }
}

impl IntoFilterValue for f64 {
    fn into_filter_value(self) -> FilterValue {
        FilterValue::Float(self)
    }
}

impl IntoFilterValue for String {
    fn into_filter_value(self) -> FilterValue {
        FilterValue::Text(self)
    }
}

impl IntoFilterValue for &str {
    fn into_filter_value(self) -> FilterValue {
        FilterValue::Text(self.to_string())
    }
}

impl IntoFilterValue for &String {
    fn into_filter_value(self) -> FilterValue {
        FilterValue::Text(self.clone())
    }
}

impl IntoFilterValue for Uuid {
    fn into_filter_value(self) -> FilterValue {
        FilterValue::Text(self.to_string())
    }
}

impl IntoFilterValue for DateTime<Utc> {
    fn into_filter_value(self) -> FilterValue {
        FilterValue::Text(self.to_rfc3339())
    }
}

impl IntoFilterValue for NaiveDate {
    fn into_filter_value(self) -> FilterValue {
        FilterValue::Text(self.to_string())
    }
}

impl IntoFilterValue for JsonValue {
    fn into_filter_value(self) -> FilterValue {
        match self {
            JsonValue::Null => FilterValue::Null,
            JsonValue::Bool(b) => FilterValue::Bool(b),
            JsonValue::String(s) => FilterValue::Text(s),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => FilterValue::Int(i),
                None => FilterValue::Json(JsonValue::Number(n)),
            },
            other => FilterValue::Json(other),
        }
    }
}

impl IntoFilterValue for &JsonValue {
    fn into_filter_value(self) -> FilterValue {
        self.clone().into_filter_value()
    }
}

impl<T: IntoFilterValue> IntoFilterValue for Option<T> {
    fn into_filter_value(self) -> FilterValue {
        match self {
            Some(v) => v.into_filter_value(),
            None => FilterValue::Null,
        }
    }
}

/// One `column=op.value` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub operator: FilterOperator,
    /// Operand as sent, already rendered (`(a,b)` for `in`, JSON for `cs`).
    pub operand: String,
}

impl Filter {
    pub fn new(column: impl Into<String>, operator: FilterOperator, operand: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator,
            operand: operand.into(),
        }
    }

    /// The query-string pair for this condition.
    pub fn to_query_pair(&self) -> (String, String) {
        (
            self.column.clone(),
            format!("{}.{}", self.operator.as_str(), self.operand),
        )
    }
}

/// Reject column names that could break out of the query string.
pub fn validate_column_name(name: &str) -> Result<(), ErrorInfo> {
    validate_identifier(name, "Column")
}

/// Validate a table or column name.
pub fn validate_identifier(name: &str, kind: &str) -> Result<(), ErrorInfo> {
    if name.trim().is_empty() {
        return Err(ErrorInfo::invalid_request(format!(
            "{kind} name cannot be empty"
        )));
    }
    if name.contains('"')
        || name.contains(';')
        || name.contains("--")
        || name.contains(['&', '=', '?', '#'])
    {
        return Err(ErrorInfo::invalid_request(format!(
            "Invalid {kind} name: {name:?} (contains prohibited characters)"
        )));
    }
    Ok(())
}

/// Filter methods shared by reads, updates and deletes.
///
/// Each call appends one condition; conditions are sent in call order.
/// A call with an invalid column name is logged and skipped.
pub trait Filterable: Sized {
    fn filters_mut(&mut self) -> &mut Vec<Filter>;

    /// Append an already-rendered condition.
    fn push_filter(mut self, column: &str, operator: FilterOperator, operand: String) -> Self {
        if let Err(e) = validate_column_name(column) {
            tracing::error!("Invalid column name in {} filter: {e}", operator.as_str());
            return self;
        }
        self.filters_mut().push(Filter::new(column, operator, operand));
        self
    }

    /// Filter: column = value
    fn eq(self, column: &str, value: impl IntoFilterValue) -> Self {
        self.push_filter(column, FilterOperator::Eq, value.into_filter_value().render())
    }

    /// Filter: column <> value
    fn neq(self, column: &str, value: impl IntoFilterValue) -> Self {
        self.push_filter(column, FilterOperator::Neq, value.into_filter_value().render())
    }

    /// Filter: column > value
    fn gt(self, column: &str, value: impl IntoFilterValue) -> Self {
        self.push_filter(column, FilterOperator::Gt, value.into_filter_value().render())
    }

    /// Filter: column < value
    fn lt(self, column: &str, value: impl IntoFilterValue) -> Self {
        self.push_filter(column, FilterOperator::Lt, value.into_filter_value().render())
    }

    /// Filter: column >= value
    fn gte(self, column: &str, value: impl IntoFilterValue) -> Self {
        self.push_filter(column, FilterOperator::Gte, value.into_filter_value().render())
    }

    /// Filter: column <= value
    fn lte(self, column: &str, value: impl IntoFilterValue) -> Self {
        self.push_filter(column, FilterOperator::Lte, value.into_filter_value().render())
    }

    /// Filter: column IS NULL / TRUE / FALSE / UNKNOWN
    fn is(self, column: &str, value: IsValue) -> Self {
        self.push_filter(column, FilterOperator::Is, value.as_str().to_string())
    }

    /// Filter: column IN (values)
    fn in_<V, I>(self, column: &str, values: I) -> Self
    where
        V: IntoFilterValue,
        I: IntoIterator<Item = V>,
    {
        let items: Vec<String> = values
            .into_iter()
            .map(|v| v.into_filter_value().render_list_item())
            .collect();
        self.push_filter(column, FilterOperator::In, format!("({})", items.join(",")))
    }

    /// Filter: column contains value (`cs`, JSON-encoded operand).
    fn contains(self, column: &str, value: &impl Serialize) -> Self {
        match serde_json::to_string(value) {
            Ok(json) => self.push_filter(column, FilterOperator::Contains, json),
            Err(e) => {
                tracing::error!("Cannot encode contains filter for {column}: {e}");
                self
            }
        }
    }

    /// Filter: full-text search (`fts`).
    fn text_search(self, column: &str, query: &str) -> Self {
        self.push_filter(column, FilterOperator::TextSearch, query.to_string())
    }

    /// One `eq` condition per column of `row`, in column order.
    fn match_row(self, row: &plugged_data_core::Row) -> Self {
        row.iter()
            .fold(self, |builder, (column, value)| builder.eq(column, value))
    }

    /// One `eq` condition per pair.
    fn match_filter<K, V, I>(self, pairs: I) -> Self
    where
        K: AsRef<str>,
        V: IntoFilterValue,
        I: IntoIterator<Item = (K, V)>,
    {
        pairs
            .into_iter()
            .fold(self, |builder, (column, value)| builder.eq(column.as_ref(), value))
    }
}

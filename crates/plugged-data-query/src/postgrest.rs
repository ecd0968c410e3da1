//! Rendering of descriptors into REST requests. No I/O happens here.

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::Value as JsonValue;
use url::Url;

use plugged_data_core::ErrorInfo;

use crate::descriptor::QueryDescriptor;
use crate::filter::Filter;

/// A fully rendered request, minus credentials.
#[derive(Debug, Clone)]
pub struct RestRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<JsonValue>,
}

impl RestRequest {
    /// Decoded query pairs in the order they will be sent.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Collapse whitespace around commas in a projection list.
pub fn normalize_projection(projection: &str) -> String {
    let cleaned = projection
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    if cleaned.is_empty() {
        "*".to_string()
    } else {
        cleaned
    }
}

/// Query pairs for a read: `select`, filters in call order, `order`, `limit`.
///
/// `limit` is left out when a range is set; the `Range` header carries the
/// window instead.
pub fn select_query_pairs(descriptor: &QueryDescriptor) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(descriptor.filters.len() + 3);
    pairs.push((
        "select".to_string(),
        normalize_projection(&descriptor.projection),
    ));
    pairs.extend(descriptor.filters.iter().map(Filter::to_query_pair));
    if let Some(order) = &descriptor.order {
        pairs.push((
            "order".to_string(),
            format!("{}.{}", order.column, order.direction.as_str()),
        ));
    }
    if descriptor.range.is_none() {
        if let Some(limit) = descriptor.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
    }
    pairs
}

/// Build a read request.
pub fn build_select(rest_url: &str, descriptor: &QueryDescriptor) -> Result<RestRequest, ErrorInfo> {
    let url = table_url(rest_url, &descriptor.table, &select_query_pairs(descriptor))?;
    let mut headers = HeaderMap::new();

    if let Some(range) = descriptor.range {
        headers.insert("range", header_value(&range.header_value())?);
        headers.insert("range-unit", HeaderValue::from_static("items"));
    }
    if descriptor.count {
        headers.insert("prefer", HeaderValue::from_static("count=exact"));
    }

    Ok(RestRequest {
        method: Method::GET,
        url,
        headers,
        body: None,
    })
}

/// Build an insert request for an object or an array of objects.
pub fn build_insert(rest_url: &str, table: &str, body: JsonValue) -> Result<RestRequest, ErrorInfo> {
    check_payload(&body, true)?;
    Ok(RestRequest {
        method: Method::POST,
        url: table_url(rest_url, table, &[])?,
        headers: representation_headers(),
        body: Some(body),
    })
}

/// Build an update request. The caller guarantees `filters` is non-empty.
pub fn build_update(
    rest_url: &str,
    table: &str,
    filters: &[Filter],
    body: JsonValue,
) -> Result<RestRequest, ErrorInfo> {
    check_payload(&body, false)?;
    Ok(RestRequest {
        method: Method::PATCH,
        url: table_url(rest_url, table, &filter_pairs(filters))?,
        headers: representation_headers(),
        body: Some(body),
    })
}

/// Build a delete request. The caller guarantees `filters` is non-empty.
pub fn build_delete(rest_url: &str, table: &str, filters: &[Filter]) -> Result<RestRequest, ErrorInfo> {
    Ok(RestRequest {
        method: Method::DELETE,
        url: table_url(rest_url, table, &filter_pairs(filters))?,
        headers: HeaderMap::new(),
        body: None,
    })
}

/// Parse the total from a `Content-Range` header (`0-9/42` or `*/42`).
pub fn parse_content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}

// ─── Internal Helpers ──────────────────────────────────────

fn filter_pairs(filters: &[Filter]) -> Vec<(String, String)> {
    filters.iter().map(Filter::to_query_pair).collect()
}

fn table_url(rest_url: &str, table: &str, pairs: &[(String, String)]) -> Result<Url, ErrorInfo> {
    let mut url = Url::parse(&format!("{}/{}", rest_url.trim_end_matches('/'), table))
        .map_err(|e| ErrorInfo::invalid_request(format!("Invalid table URL: {e}")))?;
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(pairs);
    }
    Ok(url)
}

fn representation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("prefer", HeaderValue::from_static("return=representation"));
    headers
}

fn header_value(value: &str) -> Result<HeaderValue, ErrorInfo> {
    HeaderValue::from_str(value)
        .map_err(|e| ErrorInfo::invalid_request(format!("Invalid header value: {e}")))
}

fn check_payload(body: &JsonValue, allow_array: bool) -> Result<(), ErrorInfo> {
    match body {
        JsonValue::Object(_) => Ok(()),
        JsonValue::Array(items) if allow_array => {
            if items.iter().all(JsonValue::is_object) {
                Ok(())
            } else {
                Err(ErrorInfo::invalid_request(
                    "Insert payload array must contain only objects",
                ))
            }
        }
        _ if allow_array => Err(ErrorInfo::invalid_request(
            "Insert payload must be an object or an array of objects",
        )),
        _ => Err(ErrorInfo::invalid_request("Update payload must be an object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{OrderBy, OrderDirection, RowRange};
    use crate::filter::FilterOperator;
    use serde_json::json;

    const REST: &str = "https://example.supabase.co/rest/v1";

    fn descriptor() -> QueryDescriptor {
        let mut d = QueryDescriptor::new("orders", "id, status, total");
        d.filters.push(Filter::new("status", FilterOperator::Eq, "pending"));
        d.filters.push(Filter::new("total", FilterOperator::Gt, "100"));
        d
    }

    #[test]
    fn select_pairs_follow_fixed_order() {
        let mut d = descriptor();
        d.order = Some(OrderBy {
            column: "created_at".into(),
            direction: OrderDirection::Descending,
        });
        d.limit = Some(20);
        let req = build_select(REST, &d).unwrap();
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.path(), "/rest/v1/orders");
        assert_eq!(
            req.query_pairs(),
            vec![
                ("select".into(), "id,status,total".into()),
                ("status".into(), "eq.pending".into()),
                ("total".into(), "gt.100".into()),
                ("order".into(), "created_at.desc".into()),
                ("limit".into(), "20".into()),
            ]
        );
        assert!(req.header("range").is_none());
        assert!(req.header("prefer").is_none());
    }

    #[test]
    fn range_wins_over_limit() {
        let mut d = descriptor();
        d.limit = Some(5);
        d.range = Some(RowRange { from: 20, to: 39 });
        let req = build_select(REST, &d).unwrap();
        assert_eq!(req.header("range"), Some("20-39"));
        assert_eq!(req.header("range-unit"), Some("items"));
        assert!(req.query_pairs().iter().all(|(k, _)| k != "limit"));
    }

    #[test]
    fn count_sets_prefer() {
        let mut d = QueryDescriptor::new("products", "*");
        d.count = true;
        let req = build_select(REST, &d).unwrap();
        assert_eq!(req.header("prefer"), Some("count=exact"));
        assert_eq!(req.query_pairs(), vec![("select".into(), "*".into())]);
    }

    #[test]
    fn writes_request_representation() {
        let req = build_insert(REST, "products", json!({"name": "Lamp"})).unwrap();
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.header("prefer"), Some("return=representation"));
        assert!(req.url.query().is_none());

        let filters = [Filter::new("id", FilterOperator::Eq, "7")];
        let req = build_update(REST, "orders", &filters, json!({"status": "paid"})).unwrap();
        assert_eq!(req.method, Method::PATCH);
        assert_eq!(req.query_pairs(), vec![("id".into(), "eq.7".into())]);

        let req = build_delete(REST, "orders", &filters).unwrap();
        assert_eq!(req.method, Method::DELETE);
        assert_eq!(req.url.query(), Some("id=eq.7"));
    }

    #[test]
    fn payload_shapes_are_checked() {
        assert!(build_insert(REST, "products", json!([{"a": 1}, {"a": 2}])).is_ok());
        assert!(build_insert(REST, "products", json!([1, 2])).is_err());
        assert!(build_insert(REST, "products", json!("x")).is_err());
        let filters = [Filter::new("id", FilterOperator::Eq, "7")];
        assert!(build_update(REST, "orders", &filters, json!([{"a": 1}])).is_err());
    }

    #[test]
    fn content_range_total() {
        assert_eq!(parse_content_range_total("0-9/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn projection_normalization() {
        assert_eq!(normalize_projection("id, is_admin, display_name"), "id,is_admin,display_name");
        assert_eq!(normalize_projection("*, order_items(id, qty)"), "*,order_items(id,qty)");
        assert_eq!(normalize_projection("  "), "*");
    }
}

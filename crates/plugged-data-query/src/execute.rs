use reqwest::header::HeaderValue;
use reqwest::Method;
use serde::de::DeserializeOwned;

use plugged_data_core::http::{api_key_headers, upstream_error};
use plugged_data_core::{Connection, EmptyResponse, ErrorInfo, ReadResponse, Response};

use crate::postgrest::{parse_content_range_total, RestRequest};

const FALLBACK_MESSAGE: &str = "Database request failed";

/// Raw outcome of one REST round trip.
struct RawReply {
    status: u16,
    count: Option<u64>,
    body: String,
}

/// Send a rendered request and parse the body as rows.
///
/// A bare object is accepted as a single row; an empty body or `204` is an
/// empty row list.
pub async fn execute_rows<T: DeserializeOwned>(conn: &Connection, request: RestRequest) -> ReadResponse<T> {
    let reply = match send(conn, request).await {
        Ok(reply) => reply,
        Err(e) => return Response::error(e),
    };

    if reply.status == 204 || reply.body.trim().is_empty() {
        return Response::ok(Vec::new()).with_count(reply.count);
    }

    match serde_json::from_str::<Vec<T>>(&reply.body) {
        Ok(rows) => Response::ok(rows).with_count(reply.count),
        Err(array_err) => match serde_json::from_str::<T>(&reply.body) {
            Ok(row) => Response::ok(vec![row]).with_count(reply.count),
            Err(_) => Response::error(ErrorInfo::serialization(format!(
                "Failed to parse response: {array_err}"
            ))),
        },
    }
}

/// Send a rendered request whose body is ignored on success.
pub async fn execute_empty(conn: &Connection, request: RestRequest) -> EmptyResponse {
    match send(conn, request).await {
        Ok(_) => EmptyResponse::ok(),
        Err(e) => EmptyResponse::error(e),
    }
}

async fn send(conn: &Connection, request: RestRequest) -> Result<RawReply, ErrorInfo> {
    let api_key = conn.api_key();
    let RestRequest {
        method,
        url,
        mut headers,
        body,
    } = request;

    headers.extend(api_key_headers(api_key).map_err(|e| ErrorInfo::from(e).redact(api_key))?);

    if conn.schema() != "public" {
        let profile = if method == Method::GET {
            "accept-profile"
        } else {
            "content-profile"
        };
        let value = HeaderValue::from_str(conn.schema())
            .map_err(|e| ErrorInfo::invalid_request(format!("Invalid schema name: {e}")))?;
        headers.insert(profile, value);
    }
    headers
        .entry("accept")
        .or_insert(HeaderValue::from_static("application/json"));

    tracing::debug!(method = %method, url = %url, "Executing REST request");

    let mut builder = conn.http().request(method, url).headers(headers);
    if let Some(body) = body {
        builder = builder.json(&body);
    }

    let response = builder
        .send()
        .await
        .map_err(|e| ErrorInfo::transport(e.to_string()).redact(api_key))?;

    let status = response.status().as_u16();
    let count = response
        .headers()
        .get("content-range")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range_total);

    let body = response
        .text()
        .await
        .map_err(|e| ErrorInfo::transport(e.to_string()).redact(api_key))?;

    if !(200..300).contains(&status) {
        tracing::debug!(status, "REST request failed");
        return Err(upstream_error(status, &body, FALLBACK_MESSAGE).redact(api_key));
    }

    Ok(RawReply {
        status,
        count,
        body,
    })
}

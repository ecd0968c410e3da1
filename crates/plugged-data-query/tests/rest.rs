//! REST round trips against a mock server.

use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use plugged_data_core::{Connection, ErrorKind, Outcome};
use plugged_data_query::{ConnectionQueryExt, Filterable, IsValue, Modifiable, OrderDirection};

const KEY: &str = "service-role-test-key";

async fn setup() -> (MockServer, Connection) {
    let server = MockServer::start().await;
    let conn = Connection::connect(server.uri(), KEY).unwrap();
    (server, conn)
}

async fn received_queries(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.query().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn filters_are_sent_once_in_call_order() {
    let (server, conn) = setup().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let resp = conn
        .from("orders")
        .select("*")
        .gte("total", 10)
        .eq("status", "completed")
        .is("cancelled_at", IsValue::Null)
        .in_("channel", ["web", "pos"])
        .lte("total", 500)
        .await;
    assert!(resp.is_ok());

    let queries = received_queries(&server).await;
    assert_eq!(
        queries,
        vec!["select=*&total=gte.10&status=eq.completed&cancelled_at=is.null&channel=in.%28web%2Cpos%29&total=lte.500"]
    );
}

#[tokio::test]
async fn filter_precedes_order() {
    let (server, conn) = setup().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .and(query_param("status", "eq.completed"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let resp = conn
        .from("orders")
        .select("*")
        .eq("status", "completed")
        .order("created_at", OrderDirection::Descending)
        .execute()
        .await;
    assert_eq!(resp.len(), 1);

    let query = &received_queries(&server).await[0];
    let status_at = query.find("status=eq.completed").unwrap();
    let order_at = query.find("order=created_at.desc").unwrap();
    assert!(status_at < order_at);
}

#[tokio::test]
async fn credentials_and_range_headers() {
    let (server, conn) = setup().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(header("apikey", KEY))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .and(header("range", "0-24"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let resp = conn.from("products").select("*").range(0, 24).limit(3).await;
    assert!(resp.is_ok());
    assert!(!received_queries(&server).await[0].contains("limit="));
}

#[tokio::test]
async fn single_unwraps_first_row() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Profile {
        id: i64,
        is_admin: bool,
    }

    let (server, conn) = setup().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .and(query_param("limit", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 4, "is_admin": true}])),
        )
        .mount(&server)
        .await;

    let resp = conn
        .from("profiles")
        .select_as::<Profile>("id, is_admin")
        .eq("user_id", "u-1")
        .single()
        .await;
    assert_eq!(resp.data(), Some(&Profile { id: 4, is_admin: true }));
    assert!(resp.error_info().is_none());
}

#[tokio::test]
async fn single_on_no_rows_is_empty_not_error() {
    let (server, conn) = setup().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let resp = conn.from("profiles").select("*").eq("id", 99).single().await;
    assert!(resp.data().is_none());
    assert!(resp.error_info().is_none());
}

#[tokio::test]
async fn upstream_error_lands_in_envelope() {
    let (server, conn) = setup().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "42P01",
            "message": "relation \"public.nope\" does not exist",
            "details": null,
            "hint": null
        })))
        .mount(&server)
        .await;

    let resp = conn.from("nope").select("*").await;
    let err = resp.error_info().unwrap();
    assert_eq!(err.kind, ErrorKind::UpstreamStatus);
    assert_eq!(err.status, Some(404));
    assert_eq!(err.code.as_deref(), Some("42P01"));
    assert!(resp.data().is_none());
}

#[tokio::test]
async fn error_messages_never_echo_the_key() {
    let (server, conn) = setup().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(401).set_body_string(format!("bad key {KEY}")))
        .mount(&server)
        .await;

    let resp = conn.from("orders").select("*").await;
    let message = resp.error_message().unwrap();
    assert!(!message.contains(KEY));
    assert!(message.contains("[redacted]"));
}

#[tokio::test]
async fn count_exact_reads_content_range() {
    let (server, conn) = setup().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/products"))
        .and(header("prefer", "count=exact"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-range", "0-0/17")
                .set_body_json(json!([{"id": 1}])),
        )
        .mount(&server)
        .await;

    let resp = conn.from("products").select("*").limit(1).count_exact().await;
    assert_eq!(resp.count(), Some(17));
}

#[tokio::test]
async fn concurrent_builders_do_not_share_filters() {
    let (server, conn) = setup().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let base = conn.from("orders").select("*");
    let a = base.clone().eq("status", "pending");
    let b = base.eq("status", "shipped").gt("total", 100);
    let (ra, rb) = tokio::join!(
        tokio::spawn(async move { a.await }),
        tokio::spawn(async move { b.await })
    );
    assert!(ra.unwrap().is_ok());
    assert!(rb.unwrap().is_ok());

    let mut queries = received_queries(&server).await;
    queries.sort();
    assert_eq!(
        queries,
        vec![
            "select=*&status=eq.pending".to_string(),
            "select=*&status=eq.shipped&total=gt.100".to_string(),
        ]
    );
}

#[tokio::test]
async fn insert_returns_representation() {
    let (server, conn) = setup().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/products"))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!({"name": "Desk lamp", "price": 49.5})))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([{"id": 12, "name": "Desk lamp", "price": 49.5}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resp = conn
        .from("products")
        .insert(&json!({"name": "Desk lamp", "price": 49.5}))
        .await;
    let rows = resp.data().unwrap();
    assert_eq!(rows[0].get_as::<i64>("id"), Some(12));
}

#[derive(Debug, Deserialize, PartialEq)]
struct OrderItem {
    id: i64,
    order_id: i64,
    quantity: u32,
}

#[tokio::test]
async fn batch_insert_decodes_typed_rows() {
    let (server, conn) = setup().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/order_items"))
        .and(header("prefer", "return=representation"))
        .and(body_json(json!([
            {"order_id": 7, "quantity": 2},
            {"order_id": 7, "quantity": 1}
        ])))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {"id": 31, "order_id": 7, "quantity": 2},
            {"id": 32, "order_id": 7, "quantity": 1}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let resp = conn
        .from("order_items")
        .insert(&json!([
            {"order_id": 7, "quantity": 2},
            {"order_id": 7, "quantity": 1}
        ]))
        .returning::<OrderItem>()
        .await;
    assert_eq!(
        resp.data().unwrap(),
        &vec![
            OrderItem { id: 31, order_id: 7, quantity: 2 },
            OrderItem { id: 32, order_id: 7, quantity: 1 },
        ]
    );
}

#[tokio::test]
async fn typed_update_and_read() {
    let (server, conn) = setup().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/order_items"))
        .and(query_param("id", "eq.31"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 31, "order_id": 7, "quantity": 5}])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/order_items"))
        .and(query_param("order_id", "eq.7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 31, "order_id": 7, "quantity": 5}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let updated = conn
        .from("order_items")
        .update(&json!({"quantity": 5}))
        .eq("id", 31)
        .returning::<OrderItem>()
        .await;
    assert_eq!(updated.data().unwrap()[0].quantity, 5);

    let read = conn
        .from("order_items")
        .select("*")
        .eq("order_id", 7)
        .returns::<OrderItem>()
        .await;
    assert_eq!(
        read.data().unwrap(),
        &vec![OrderItem { id: 31, order_id: 7, quantity: 5 }]
    );
}

#[tokio::test]
async fn update_and_delete_use_eq_conditions() {
    let (server, conn) = setup().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/orders"))
        .and(query_param("id", "eq.7"))
        .and(body_json(json!({"status": "paid"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7, "status": "paid"}])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/order_items"))
        .and(query_param("order_id", "eq.7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let updated = conn
        .from("orders")
        .update(&json!({"status": "paid"}))
        .eq("id", 7)
        .await;
    assert_eq!(updated.len(), 1);

    let deleted = conn
        .from("order_items")
        .delete()
        .match_filter([("order_id", 7)])
        .await;
    assert!(deleted.is_ok());
}

#[tokio::test]
async fn write_without_representation_is_empty_list() {
    let (server, conn) = setup().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/orders"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let resp = conn
        .from("orders")
        .update(&json!({"status": "paid"}))
        .eq("id", 7)
        .await;
    assert!(resp.is_ok());
    assert_eq!(resp.data().map(Vec::len), Some(0));
}

#[tokio::test]
async fn unfiltered_delete_never_reaches_server() {
    let (server, conn) = setup().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let resp = conn.from("orders").delete().await;
    assert_eq!(resp.error_info().unwrap().kind, ErrorKind::InvalidRequest);
}

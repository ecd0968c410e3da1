//! Uploads and public URLs against a mock storage server.

use serde_json::json;
use wiremock::matchers::{header, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use plugged_data_core::{Connection, ErrorKind, Outcome};
use plugged_data_storage::{unique_object_name, FileOptions, StorageClient};

const KEY: &str = "service-role-test-key";

fn storage(uri: &str) -> StorageClient {
    StorageClient::new(Connection::connect(uri, KEY).unwrap()).unwrap()
}

#[tokio::test]
async fn upload_posts_multipart_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/product-images/lamp.png"))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(header("cache-control", "max-age=3600"))
        .and(header("x-upsert", "false"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"Id": "obj-1", "Key": "product-images/lamp.png"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resp = storage(&server.uri())
        .from("product-images")
        .upload(
            "lamp.png",
            b"\x89PNG fake".to_vec(),
            FileOptions::new()
                .cache_control("3600")
                .content_type("image/png")
                .upsert(false),
        )
        .await;
    assert!(resp.is_ok());
    assert_eq!(resp.data().unwrap().key.as_deref(), Some("product-images/lamp.png"));

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body).to_lowercase();
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"lamp.png\""));
    assert!(body.contains("content-type: image/png"));
}

#[tokio::test]
async fn failed_upload_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/product-images/lamp.png"))
        .respond_with(ResponseTemplate::new(413).set_body_string("Payload too large"))
        .mount(&server)
        .await;

    let resp = storage(&server.uri())
        .from("product-images")
        .upload("lamp.png", vec![0; 16], FileOptions::default())
        .await;
    assert!(resp.data().is_none());
    let err = resp.error_info().unwrap();
    assert_eq!(err.kind, ErrorKind::UpstreamStatus);
    assert_eq!(err.status, Some(413));
    assert_eq!(err.message, "Upload failed: 413 Payload too large");
}

#[tokio::test]
async fn public_url_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let bucket = storage(&server.uri()).from("product-images");
    let first = bucket.get_public_url("a.png");
    let second = bucket.get_public_url("a.png");
    assert_eq!(first, second);
    assert_eq!(
        first.public_url,
        format!("{}/storage/v1/object/public/product-images/a.png", server.uri())
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unique_names_upload_independently() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Key": "k"})))
        .expect(2)
        .mount(&server)
        .await;

    let bucket = storage(&server.uri()).from("product-images");
    let a = unique_object_name("photo.jpg");
    let b = unique_object_name("photo.jpg");
    assert_ne!(a, b);
    assert!(bucket.upload(&a, vec![1], FileOptions::default()).await.is_ok());
    assert!(bucket.upload(&b, vec![2], FileOptions::default()).await.is_ok());
}

#[tokio::test]
async fn upload_and_public_url_address_the_same_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/object/product-images/summer%20sale/lamp.png"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Key": "k"})))
        .expect(1)
        .mount(&server)
        .await;

    let bucket = storage(&server.uri()).from("product-images");
    let resp = bucket
        .upload("summer sale/lamp.png", vec![1], FileOptions::default())
        .await;
    assert!(resp.is_ok());

    let uploaded_path = server.received_requests().await.unwrap()[0].url.path().to_string();
    let public_url = bucket.get_public_url("summer sale/lamp.png").public_url;
    assert!(public_url.ends_with(&uploaded_path.replace("/object/", "/object/public/")));
}

#[tokio::test]
async fn unsafe_object_names_are_never_uploaded() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let bucket = storage(&server.uri()).from("product-images");
    for name in ["lamp.png?download=1", "lamp#2.png", "../avatars/admin.png"] {
        let resp = bucket.upload(name, vec![1], FileOptions::default()).await;
        assert_eq!(resp.error_info().unwrap().kind, ErrorKind::InvalidRequest);
    }
}

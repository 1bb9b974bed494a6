//! Integration tests for the resource clients against a mocked HTTP API.
//!
//! These exercise the full path: client call, request shape on the wire,
//! envelope decoding, pagination and error mapping.

use dolua::api::types::DomainRecordEditRequest;
use dolua::api::{ApiError, Sdk};
use dolua::cloud::{domains, droplets, tags};
use dolua::cloud::{Domains, Droplets, Tags};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{bearer_token, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sdk_for(server: &MockServer) -> Sdk {
    Sdk::new("test-token")
        .unwrap()
        .with_base_url(url::Url::parse(&server.uri()).unwrap().join("/").unwrap())
}

#[tokio::test]
async fn droplet_get_decodes_the_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/droplets/42"))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "droplet": {
                "id": 42,
                "name": "lama",
                "size_slug": "4gb",
                "region": {"slug": "nyc3"},
                "networks": {
                    "v4": [{"ip_address": "127.0.0.1", "type": "public"}],
                    "v6": []
                }
            }
        })))
        .mount(&server)
        .await;

    let client = droplets::DropletsClient::new(sdk_for(&server), CancellationToken::new());
    let droplet = client.get(42).await.unwrap();
    assert_eq!(droplet.id, 42);
    assert_eq!(droplet.name, "lama");
    assert_eq!(droplet.public_ipv4(), Some("127.0.0.1"));
}

#[tokio::test]
async fn droplet_create_sends_slug_only_without_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/droplets"))
        .and(bearer_token("test-token"))
        .and(body_partial_json(json!({
            "name": "lama",
            "region": "nyc3",
            "size": "4gb",
            "image": "ubuntu-14-04-x64"
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "droplet": {"id": 42, "name": "lama"}
        })))
        .mount(&server)
        .await;

    let client = droplets::DropletsClient::new(sdk_for(&server), CancellationToken::new());
    let droplet = client
        .create("lama", "nyc3", "4gb", "ubuntu-14-04-x64", vec![])
        .await
        .unwrap();
    assert_eq!(droplet.id, 42);
}

#[tokio::test]
async fn droplet_delete_tolerates_an_empty_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/droplets/42"))
        .and(bearer_token("test-token"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = droplets::DropletsClient::new(sdk_for(&server), CancellationToken::new());
    client.delete(42).await.unwrap();
}

#[tokio::test]
async fn droplet_list_follows_page_links() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/droplets"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "droplets": [{"id": 1, "name": "one"}, {"id": 2, "name": "two"}],
            "links": {"pages": {"next": "?page=2", "last": "?page=2"}}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/droplets"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "droplets": [{"id": 3, "name": "three"}],
            "links": {}
        })))
        .mount(&server)
        .await;

    let client = droplets::DropletsClient::new(sdk_for(&server), CancellationToken::new());
    let (items, errs) = client.list(CancellationToken::new());
    let droplets = dolua::api::paginate::collect(items, errs).await.unwrap();
    assert_eq!(
        droplets.iter().map(|d| d.id).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[tokio::test]
async fn missing_resources_map_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/droplets/7"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "id": "not_found",
            "message": "The resource you were accessing could not be found."
        })))
        .mount(&server)
        .await;

    let client = droplets::DropletsClient::new(sdk_for(&server), CancellationToken::new());
    match client.get(7).await {
        Err(ApiError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn domain_records_nest_under_the_zone_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/domains/example.com/records"))
        .and(body_partial_json(json!({
            "type": "A",
            "name": "www",
            "data": "127.0.0.1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "domain_record": {"id": 7, "type": "A", "name": "www", "data": "127.0.0.1"}
        })))
        .mount(&server)
        .await;

    let client = domains::DomainsClient::new(sdk_for(&server));
    let record = client
        .create_record(
            "example.com",
            vec![domains::use_record(DomainRecordEditRequest {
                kind: "A".to_string(),
                name: "www".to_string(),
                data: "127.0.0.1".to_string(),
                ..Default::default()
            })],
        )
        .await
        .unwrap();
    assert_eq!(record.id, 7);
    assert_eq!(record.kind, "A");
}

#[tokio::test]
async fn untagging_sends_a_delete_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v2/tags/awesome/resources"))
        .and(body_partial_json(json!({
            "resources": [{"resource_id": "42", "resource_type": "droplet"}]
        })))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = tags::TagsClient::new(sdk_for(&server));
    client
        .untag_resources(
            "awesome",
            vec![dolua::api::types::TagResource {
                resource_id: "42".to_string(),
                resource_type: "droplet".to_string(),
            }],
        )
        .await
        .unwrap();
}

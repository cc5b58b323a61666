//! End-to-end behavior of the four gateway endpoints against a mock provider.

mod common;

use std::collections::HashMap;
use std::time::Duration;

use common::{client, closed_addr, gateway_config, start_gateway, start_mock_provider, start_programmable_provider};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

const KEY: &str = "test-key";
const PATHS: [&str; 4] = ["/autocomplete", "/details", "/geocode", "/reverse-geocode"];

fn query_of(target: &str) -> HashMap<String, String> {
    url::Url::parse(&format!("http://provider{}", target))
        .unwrap()
        .query_pairs()
        .into_owned()
        .collect()
}

fn path_of(target: &str) -> &str {
    target.split('?').next().unwrap_or_default()
}

fn assert_cors(response: &reqwest::Response) {
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert_eq!(
        headers["access-control-allow-headers"],
        "authorization, x-client-info, apikey, content-type"
    );
    assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
}

async fn post(url: String, body: Value) -> (StatusCode, Value) {
    let response = client().post(url).json(&body).send().await.unwrap();
    assert_cors(&response);
    let status = response.status();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_preflight_and_method_rejection_on_every_endpoint() {
    let (provider, log) = start_mock_provider(200, r#"{"status":"OK"}"#).await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    for path in PATHS {
        let response = client()
            .request(Method::OPTIONS, gw.url(path))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", path);
        assert_cors(&response);
        assert_eq!(response.text().await.unwrap(), "ok");

        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let response = client().request(method.clone(), gw.url(path)).send().await.unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{} {}", method, path);
            assert_cors(&response);
            let body: Value = response.json().await.unwrap();
            assert_eq!(body, json!({"error": "Method not allowed"}));
        }
    }

    assert_eq!(log.hits(), 0);
}

#[tokio::test]
async fn test_short_autocomplete_succeeds_without_api_key() {
    let (provider, log) = start_mock_provider(200, r#"{"status":"OK","predictions":[1]}"#).await;
    // No key either: the short-circuit wins over the configuration check.
    let gw = start_gateway(gateway_config(provider, None)).await;

    for body in [json!({"input": "a"}), json!({"input": ""}), json!({}), json!({"input": "é"})] {
        let (status, response) = post(gw.url("/autocomplete"), body.clone()).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(response, json!({"predictions": []}));
    }

    assert_eq!(log.hits(), 0);
}

#[tokio::test]
async fn test_autocomplete_passes_provider_payload_through() {
    let payload = json!({
        "status": "OK",
        "predictions": [{"description": "Boston, MA, USA", "place_id": "abc"}]
    });
    let (provider, log) = start_mock_provider(200, payload.to_string()).await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    let (status, body) = post(gw.url("/autocomplete"), json!({"input": "Bos"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, payload);

    let targets = log.targets();
    assert_eq!(targets.len(), 1);
    assert_eq!(path_of(&targets[0]), "/maps/api/place/autocomplete/json");
    let query = query_of(&targets[0]);
    assert_eq!(query["input"], "Bos");
    assert_eq!(query["types"], "(cities)");
    assert_eq!(query["components"], "country:us");
    assert_eq!(query["language"], "en");
    assert_eq!(query["key"], KEY);
}

#[tokio::test]
async fn test_autocomplete_custom_types_and_country() {
    let (provider, log) = start_mock_provider(200, r#"{"status":"ZERO_RESULTS","predictions":[]}"#).await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    let (status, body) = post(
        gw.url("/autocomplete"),
        json!({"input": "Main St", "types": "address", "componentRestrictions": {"country": "ca"}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ZERO_RESULTS");

    let query = query_of(&log.targets()[0]);
    assert_eq!(query["types"], "address");
    assert_eq!(query["components"], "country:ca");
}

#[tokio::test]
async fn test_details_requires_place_id() {
    let (provider, log) = start_mock_provider(200, r#"{"status":"OK"}"#).await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    for body in [json!({"place_id": ""}), json!({"place_id": 42}), json!({})] {
        let (status, response) = post(gw.url("/details"), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({"error": "place_id is required"}));
    }

    assert_eq!(log.hits(), 0);
}

#[tokio::test]
async fn test_details_fields_default_and_custom() {
    let (provider, log) = start_mock_provider(200, r#"{"status":"OK","result":{"name":"x"}}"#).await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    let (status, _) = post(gw.url("/details"), json!({"place_id": "abc"})).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(
        gw.url("/details"),
        json!({"place_id": "abc", "fields": ["name", "geometry"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let targets = log.targets();
    assert_eq!(path_of(&targets[0]), "/maps/api/place/details/json");
    let first = query_of(&targets[0]);
    assert_eq!(first["place_id"], "abc");
    assert_eq!(
        first["fields"],
        "formatted_address,geometry,name,place_id,address_components"
    );
    assert_eq!(query_of(&targets[1])["fields"], "name,geometry");
}

#[tokio::test]
async fn test_details_zero_results_is_an_error_but_not_elsewhere() {
    let (provider, _) = start_mock_provider(200, r#"{"status":"ZERO_RESULTS","results":[]}"#).await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    let (status, body) = post(gw.url("/details"), json!({"place_id": "gone"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Location provider returned an error");
    assert_eq!(body["status"], "ZERO_RESULTS");

    let (status, body) = post(gw.url("/geocode"), json!({"address": "nowhere"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ZERO_RESULTS", "results": []}));

    let (status, _) = post(gw.url("/reverse-geocode"), json!({"lat": 0.0, "lng": 0.0})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(gw.url("/autocomplete"), json!({"input": "zzz"})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_geocode_rejects_blank_address() {
    let (provider, log) = start_mock_provider(200, r#"{"status":"OK"}"#).await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    for body in [json!({"address": "   "}), json!({"address": ""}), json!({})] {
        let (status, response) = post(gw.url("/geocode"), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({"error": "address is required"}));
    }

    assert_eq!(log.hits(), 0);
}

#[tokio::test]
async fn test_geocode_sends_address_and_components() {
    let (provider, log) = start_mock_provider(200, r#"{"status":"OK","results":[]}"#).await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    post(gw.url("/geocode"), json!({"address": "1600 Amphitheatre Pkwy"})).await;
    post(
        gw.url("/geocode"),
        json!({"address": "10 Downing St", "components": "country:GB"}),
    )
    .await;

    let targets = log.targets();
    assert_eq!(path_of(&targets[0]), "/maps/api/geocode/json");
    let first = query_of(&targets[0]);
    assert_eq!(first["address"], "1600 Amphitheatre Pkwy");
    assert_eq!(first["components"], "country:US");
    assert_eq!(query_of(&targets[1])["components"], "country:GB");
}

#[tokio::test]
async fn test_reverse_geocode_requires_numbers() {
    let (provider, log) = start_mock_provider(200, r#"{"status":"OK"}"#).await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    for body in [
        json!({"lat": "40.7", "lng": -74.0}),
        json!({"lat": 40.7}),
        json!({"lat": null, "lng": 1}),
        json!({}),
    ] {
        let (status, response) = post(gw.url("/reverse-geocode"), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({"error": "lat and lng must be numbers"}));
    }

    assert_eq!(log.hits(), 0);
}

#[tokio::test]
async fn test_reverse_geocode_sends_latlng() {
    let (provider, log) = start_mock_provider(200, r#"{"status":"OK","results":[]}"#).await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    let (status, _) = post(gw.url("/reverse-geocode"), json!({"lat": 40.7128, "lng": -74.006})).await;
    assert_eq!(status, StatusCode::OK);

    let target = &log.targets()[0];
    assert_eq!(path_of(target), "/maps/api/geocode/json");
    assert_eq!(query_of(target)["latlng"], "40.7128,-74.006");
}

#[tokio::test]
async fn test_missing_api_key_is_a_configuration_error() {
    let (provider, log) = start_mock_provider(200, r#"{"status":"OK"}"#).await;
    let gw = start_gateway(gateway_config(provider, Some("   "))).await;

    let calls = [
        ("/autocomplete", json!({"input": "Boston"})),
        ("/details", json!({"place_id": "abc"})),
        ("/geocode", json!({"address": "Boston"})),
        ("/reverse-geocode", json!({"lat": 1, "lng": 2})),
    ];
    for (path, body) in calls {
        let (status, response) = post(gw.url(path), body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", path);
        assert_eq!(response, json!({"error": "API configuration error"}));
    }

    assert_eq!(log.hits(), 0);
}

#[tokio::test]
async fn test_provider_semantic_error_echoes_status_and_message() {
    let (provider, _) = start_mock_provider(
        200,
        r#"{"status":"REQUEST_DENIED","error_message":"The provided API key is invalid."}"#,
    )
    .await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    for (path, body) in [
        ("/autocomplete", json!({"input": "Boston"})),
        ("/details", json!({"place_id": "abc"})),
        ("/geocode", json!({"address": "Boston"})),
        ("/reverse-geocode", json!({"lat": 1, "lng": 2})),
    ] {
        let (status, response) = post(gw.url(path), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(
            response,
            json!({
                "error": "Location provider returned an error",
                "details": "The provided API key is invalid.",
                "status": "REQUEST_DENIED"
            })
        );
    }
}

#[tokio::test]
async fn test_unreachable_provider_is_bad_gateway() {
    let gw = start_gateway(gateway_config(closed_addr().await, Some(KEY))).await;

    let (status, body) = post(gw.url("/geocode"), json!({"address": "Boston"})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Upstream request failed"}));
}

#[tokio::test]
async fn test_provider_http_failure_reports_upstream_status() {
    let (provider, _) = start_mock_provider(500, r#"{"status":"UNKNOWN_ERROR"}"#).await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    let (status, body) = post(gw.url("/details"), json!({"place_id": "abc"})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Upstream request failed", "upstream_status": 500}));
}

#[tokio::test]
async fn test_non_json_provider_body_is_bad_gateway() {
    let (provider, _) = start_mock_provider(200, "<html>maintenance</html>").await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    let (status, body) = post(gw.url("/autocomplete"), json!({"input": "Boston"})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Upstream request failed");
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let (provider, _) = start_programmable_provider(|_| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (200, r#"{"status":"OK"}"#.to_string())
    })
    .await;
    let mut config = gateway_config(provider, Some(KEY));
    config.provider.timeout_secs = 1;
    let gw = start_gateway(config).await;

    let (status, body) = post(gw.url("/geocode"), json!({"address": "Boston"})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, json!({"error": "Upstream request failed"}));
}

#[tokio::test]
async fn test_inbound_deadline_still_answers_with_json() {
    let (provider, _) = start_programmable_provider(|_| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (200, r#"{"status":"OK"}"#.to_string())
    })
    .await;
    // Built directly, skipping the validation that rejects this ordering.
    let mut config = gateway_config(provider, Some(KEY));
    config.provider.timeout_secs = 3;
    config.timeouts.request_secs = 1;
    let gw = start_gateway(config).await;

    let response = client()
        .post(gw.url("/geocode"))
        .json(&json!({"address": "Boston"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(response.headers()["content-type"], "application/json");
    assert_cors(&response);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"error": "Upstream request failed"}));
}

#[tokio::test]
async fn test_malformed_and_oversized_bodies() {
    let (provider, log) = start_mock_provider(200, r#"{"status":"OK"}"#).await;
    let mut config = gateway_config(provider, Some(KEY));
    config.security.max_body_size = 1024;
    let gw = start_gateway(config).await;

    for raw in ["not json", "[1,2]", "\"text\""] {
        let response = client()
            .post(gw.url("/geocode"))
            .header("content-type", "application/json")
            .body(raw)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", raw);
        assert_cors(&response);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": "Invalid JSON body"}));
    }

    let big = json!({"address": "x".repeat(4096)});
    let response = client().post(gw.url("/geocode")).json(&big).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_cors(&response);

    assert_eq!(log.hits(), 0);
}

#[tokio::test]
async fn test_identical_requests_get_identical_responses() {
    let (provider, _) = start_mock_provider(
        200,
        r#"{"status":"OK","results":[{"formatted_address":"Boston, MA, USA"}]}"#,
    )
    .await;
    let gw = start_gateway(gateway_config(provider, Some(KEY))).await;

    let mut seen = Vec::new();
    for _ in 0..3 {
        let response = client()
            .post(gw.url("/geocode"))
            .json(&json!({"address": "Boston"}))
            .send()
            .await
            .unwrap();
        let status = response.status();
        let cors: Vec<_> = ["access-control-allow-origin", "access-control-allow-headers", "access-control-allow-methods"]
            .iter()
            .map(|h| response.headers()[*h].clone())
            .collect();
        let body = response.bytes().await.unwrap();
        seen.push((status, cors, body));
    }

    assert!(seen.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn test_config_reload_applies_new_key() {
    let (provider, log) = start_mock_provider(200, r#"{"status":"OK","results":[]}"#).await;
    let gw = start_gateway(gateway_config(provider, None)).await;

    let (status, _) = post(gw.url("/geocode"), json!({"address": "Boston"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    gw.config_updates
        .send(gateway_config(provider, Some("rotated-key")))
        .unwrap();

    let mut status = StatusCode::INTERNAL_SERVER_ERROR;
    for _ in 0..50 {
        status = post(gw.url("/geocode"), json!({"address": "Boston"})).await.0;
        if status == StatusCode::OK {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(status, StatusCode::OK);
    assert_eq!(query_of(&log.targets()[0])["key"], "rotated-key");
}

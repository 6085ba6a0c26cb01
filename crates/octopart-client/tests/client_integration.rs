//! HTTP contract tests for the Octopart client against a wiremock server.

use octopart_client::{
    ClientConfig, ClientError, FacetSpec, FilterSpec, MatchArgs, OctopartClient, QueryArgs,
    ResourceKind,
};
use serde_json::json;
use std::time::Duration;
use tokio::sync::oneshot;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Test Helpers
// ============================================================================

fn test_client(server: &MockServer) -> OctopartClient {
    let config = ClientConfig::v3().with_base_url(server.uri());
    OctopartClient::new("TESTKEY", config).unwrap()
}

/// Raw query string of the only request the server received.
async fn single_received_query(server: &MockServer) -> String {
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "expected exactly one request");
    requests[0].url.query().unwrap_or_default().to_string()
}

// ============================================================================
// By-ID Lookups
// ============================================================================

#[tokio::test]
async fn by_id_single_uid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/parts/abc123"))
        .and(header("accept", "application/json"))
        .and(query_param("apikey", "TESTKEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uid": "abc123",
            "mpn": "SN74S74N"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let part = client.parts().by_id("abc123", None).await.unwrap();

    assert_eq!(part["mpn"], "SN74S74N");
    assert_eq!(single_received_query(&server).await, "apikey=TESTKEY");
}

#[tokio::test]
async fn by_id_multi_keeps_uid_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/brands/get_multi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "b": {"name": "Texas Instruments"},
            "a": {"name": "Vishay"}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let filters = FilterSpec::new().show(["name"]);
    let brands = client
        .brands()
        .by_id(["b", "a"], Some(&filters))
        .await
        .unwrap();

    assert_eq!(brands["a"]["name"], "Vishay");
    assert_eq!(
        single_received_query(&server).await,
        "uid[]=b&uid[]=a&show[]=name&apikey=TESTKEY"
    );
}

#[tokio::test]
async fn every_resource_kind_is_routed() {
    let server = MockServer::start().await;

    for kind in ResourceKind::ALL {
        Mock::given(method("GET"))
            .and(path(format!("/api/v3/{}/search", kind.collection())))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": kind.collection()
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = test_client(&server);
    for kind in ResourceKind::ALL {
        let body = client
            .resource(kind)
            .search(&[QueryArgs::q("resistor")], None)
            .await
            .unwrap();
        assert_eq!(body["kind"], kind.collection());
    }
}

// ============================================================================
// Search, Match and Field-Filter Operations
// ============================================================================

#[tokio::test]
async fn search_sends_form_encoded_args() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/parts/search"))
        .and(query_param("q", "op amp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": 2})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let body = client
        .parts()
        .search(&[QueryArgs::q("op amp").param("limit", 5)], None)
        .await
        .unwrap();

    assert_eq!(body["hits"], 2);
    assert_eq!(
        single_received_query(&server).await,
        "q=op+amp&limit=5&apikey=TESTKEY"
    );
}

#[tokio::test]
async fn parts_match_sends_unquoted_includes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/parts/match"))
        .and(query_param("include[]", "datasheets"))
        .and(query_param("queries", r#"[{"mpn":"X"}]"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let args = MatchArgs::new([json!({"mpn": "X"})]).include(["datasheets", "imagesets"]);
    let body = client.parts_match(&args, None).await.unwrap();

    assert_eq!(body["results"], json!([]));
    assert_eq!(
        single_received_query(&server).await,
        "queries=%5B%7B%22mpn%22%3A%22X%22%7D%5D\
         &include[]=datasheets&include[]=imagesets&apikey=TESTKEY"
    );
}

#[tokio::test]
async fn parts_by_category_sends_category_uids() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/parts/search"))
        .and(query_param("filter[fields][category_uids][]", "8a1e4714bb3951d9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": 1})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let filters = FilterSpec::new().field("uids", ["8a1e4714bb3951d9"]);
    let body = client
        .parts_by_category(&filters, &[QueryArgs::new().param("limit", 15)])
        .await
        .unwrap();

    assert_eq!(body["hits"], 1);
    assert_eq!(
        single_received_query(&server).await,
        "limit=15&filter[fields][category_uids][]=8a1e4714bb3951d9&apikey=TESTKEY"
    );
}

#[tokio::test]
async fn nested_field_filter_never_reaches_server() {
    let server = MockServer::start().await;

    let client = test_client(&server);
    let filters = FilterSpec::new().slice("parent_uid", "1:2");
    let result = client.categories_by_filter(&[], &filters).await;

    assert!(matches!(result, Err(ClientError::Encode(_))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ============================================================================
// Error Classification
// ============================================================================

#[tokio::test]
async fn api_error_uses_body_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "bad key"})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.sellers().by_id("459", None).await.unwrap_err();

    assert_eq!(err.to_string(), "bad key");
    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn success_with_invalid_json_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.categories().by_id("4161", None).await;

    assert!(matches!(result, Err(ClientError::Decode(_))));
}

#[tokio::test]
async fn error_with_invalid_json_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.parts().by_id("abc", None).await;

    assert!(matches!(result, Err(ClientError::Decode(_))));
}

#[tokio::test]
async fn connection_failure_is_transport_error() {
    // Port 1 is reserved and closed on test hosts
    let config = ClientConfig::v3()
        .with_base_url("http://127.0.0.1:1")
        .with_timeout(Duration::from_secs(5));
    let client = OctopartClient::new("TESTKEY", config).unwrap();

    let result = client.parts().by_id("abc", None).await;
    assert!(matches!(result, Err(ClientError::Transport(_))));
}

#[tokio::test]
async fn transport_error_hides_api_key() {
    let config = ClientConfig::v3()
        .with_base_url("http://127.0.0.1:1")
        .with_timeout(Duration::from_secs(5));
    let client = OctopartClient::new("TESTKEY", config).unwrap();

    let (tx, rx) = oneshot::channel();
    client.parts().by_id_with_callback("a", None, move |result| {
        let _ = tx.send(result);
    });
    let err = rx.await.unwrap().unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
    assert!(!err.to_string().contains("TESTKEY"));
    assert!(!format!("{err:?}").contains("TESTKEY"));

    let err = client.parts().by_id("a", None).await.unwrap_err();
    assert!(!err.to_string().contains("TESTKEY"));
    assert!(!format!("{err:?}").contains("TESTKEY"));
}

// ============================================================================
// Callback and Fire-and-Forget Dispatch
// ============================================================================

#[tokio::test]
async fn callback_receives_result_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/parts/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"uid": "abc123"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let (tx, rx) = oneshot::channel();
    let handle = client.parts().by_id_with_callback("abc123", None, move |result| {
        tx.send(result).unwrap();
    });

    let result = rx.await.unwrap();
    assert_eq!(result.unwrap()["uid"], "abc123");
    assert!(handle.join().await.unwrap().is_none());
}

#[tokio::test]
async fn aggregate_search_callback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/parts/search"))
        .and(query_param("facet[fields][brand.name][include]", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let facets = FacetSpec::new().include("brand.name", true);
    let (tx, rx) = oneshot::channel();
    client.parts().search_with_aggregates_with_callback(
        &[QueryArgs::q("opamp")],
        None,
        Some(&facets),
        None,
        move |result| {
            tx.send(result).unwrap();
        },
    );

    assert_eq!(rx.await.unwrap().unwrap()["hits"], 3);
    assert_eq!(
        single_received_query(&server).await,
        "q=opamp&facet[fields][brand.name][include]=true&apikey=TESTKEY"
    );
}

#[tokio::test]
async fn callback_receives_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "bad key"})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let (tx, rx) = oneshot::channel();
    let _handle = client
        .parts()
        .search_with_callback(&[QueryArgs::q("x")], None, move |result| {
            let _ = tx.send(result);
        });

    let err = rx.await.unwrap().unwrap_err();
    assert_eq!(err.to_string(), "bad key");
}

#[tokio::test]
async fn dispatch_without_callback_still_sends() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/brands/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": 0})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let request = client.brands().build_search(&[QueryArgs::q("ti")], None);
    let handle = client.dispatch(request, None);

    let response = tokio_test::assert_ok!(handle.join().await).unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn abort_cancels_pending_callback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let (tx, rx) = oneshot::channel();
    let handle = client.parts().by_id_with_callback("slow", None, move |result| {
        let _ = tx.send(result);
    });

    handle.abort();

    assert!(matches!(handle.join().await, Err(ClientError::Aborted)));
    // The callback was dropped with the task, so the sender is gone
    assert!(rx.await.is_err());
}

#[tokio::test]
async fn concurrent_calls_are_independent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/parts/one"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"uid": "one"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/parts/two"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let parts = client.parts();
    let (one, two) = tokio::join!(parts.by_id("one", None), parts.by_id("two", None));

    assert_eq!(one.unwrap()["uid"], "one");
    assert_eq!(two.unwrap_err().to_string(), "not found");
}

mod common;

use std::time::Duration;

use serde_json::json;
use spotapi::Error;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path, query_param},
};

use common::{artist, client, token_response};

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_refreshes_and_retries_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("authorization", "Bearer initial"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "status": 401, "message": "The access token expired" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "display_name": "Jo"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("fresh")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    let me = client.users().me().run().await.unwrap();

    assert_eq!(me.id, "u1");
    let token = client.token().run().await.unwrap();
    assert_eq!(token.access_token, "fresh");
    // not rotated by the server, so the old one is kept
    assert_eq!(token.refresh_token.as_deref(), Some("refresh"));
    assert!(token.has_scope("user-follow-read"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_requests_identify_the_library() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("user-agent", concat!("spotapi/", env!("CARGO_PKG_VERSION"))))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
        .expect(1)
        .mount(&server)
        .await;

    let me = client(&server).await.users().me().run().await.unwrap();

    assert_eq!(me.id, "u1");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_second_unauthorized_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("fresh")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    let err = client.users().me().run().await.unwrap_err();

    assert!(err.is_auth(), "unexpected error: {err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_refresh_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Refresh token revoked"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    let err = client.users().me().run().await.unwrap_err();

    match err {
        Error::Auth(message) => assert!(message.contains("Refresh token revoked")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bad_request_is_caught_as_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/artists/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "status": 404, "message": "Resource not found" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/artists/broken"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "status": 400, "message": "invalid id" }
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;

    let missing = client.artists().get("missing").catch_bad_request().run().await;
    assert!(matches!(missing, Ok(None)));

    let broken = client.artists().get("broken").catch_bad_request().run().await;
    assert!(matches!(broken, Ok(None)));

    // without the combinator the error surfaces with its message
    match client.artists().get("missing").run().await {
        Err(Error::BadRequest { status, message }) => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(message, "Resource not found");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_forbidden_is_not_caught() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/me/player/pause"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "status": 403, "message": "Player command failed: Premium required" }
        })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let result = client.player().pause(None).catch_bad_request().run().await;

    match result {
        Err(Error::Forbidden(message)) => assert!(message.contains("Premium required")),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rate_limit_carries_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/artists/a1"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    let err = client.artists().get("a1").run().await.unwrap_err();

    assert!(matches!(err, Error::RateLimited { .. }));
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_retry_is_opt_in() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/artists/a1"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/artists/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(artist("a1")))
        .mount(&server)
        .await;

    let plain = client(&server).await;
    let err = plain.artists().get("a1").run().await.unwrap_err();
    assert!(matches!(err, Error::Server { .. }));

    Mock::given(method("GET"))
        .and(path("/v1/artists/a2"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/artists/a2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(artist("a2")))
        .mount(&server)
        .await;

    let retrying = common::builder(&server)
        .token(common::token("initial", 3600, Some("refresh")))
        .retry_on_server_error(true)
        .build_async()
        .await
        .unwrap();
    let artist = retrying.artists().get("a2").run().await.unwrap();
    assert_eq!(artist.name, "A2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/artists/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "a1" })))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let err = client.artists().get("a1").run().await.unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_no_content_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me/player"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let state = client.player().playback_state().run().await.unwrap();

    assert!(state.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_several_keeps_unknown_ids_as_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/artists"))
        .and(query_param("ids", "a1,nope,a2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artists": [artist("a1"), null, artist("a2")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    let artists = client
        .artists()
        .several(&["a1", "nope", "a2"])
        .run()
        .await
        .unwrap();

    assert_eq!(artists.len(), 3);
    assert_eq!(artists[0].as_ref().map(|a| a.id.as_str()), Some("a1"));
    assert!(artists[1].is_none());
    assert_eq!(artists[2].as_ref().map(|a| a.name.as_str()), Some("A2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_command_sends_query_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/me/player/volume"))
        .and(query_param("volume_percent", "100"))
        .and(query_param("device_id", "d1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/me/player"))
        .and(body_string_contains("\"device_ids\":[\"d2\"]"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    client.player().set_volume(250, Some("d1")).run().await.unwrap();
    client.player().transfer("d2", true).run().await.unwrap();
}

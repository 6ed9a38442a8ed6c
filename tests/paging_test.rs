mod common;

use futures::{StreamExt, TryStreamExt};
use serde_json::{Value, json};
use spotapi::{CursorState, Error, types::TimeRange};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param, query_param_is_missing},
};

use common::{artist, client};

fn cursor_page(server: &MockServer, ids: &[&str], after: Option<&str>) -> Value {
    let next = after.map(|cursor| {
        format!(
            "{}/v1/me/following?type=artist&limit=2&after={cursor}",
            server.uri()
        )
    });
    json!({
        "artists": {
            "href": format!("{}/v1/me/following?type=artist", server.uri()),
            "items": ids.iter().map(|id| artist(id)).collect::<Vec<_>>(),
            "limit": 2,
            "next": next,
            "cursors": { "after": after },
            "total": 5
        }
    })
}

/// Three pages of followed artists: a1 a2 | a3 a4 | a5
async fn mount_followed(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/me/following"))
        .and(query_param("type", "artist"))
        .and(query_param_is_missing("after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cursor_page(
            server,
            &["a1", "a2"],
            Some("a2"),
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/following"))
        .and(query_param("after", "a2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cursor_page(
            server,
            &["a3", "a4"],
            Some("a4"),
        )))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/following"))
        .and(query_param("after", "a4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cursor_page(server, &["a5"], None)))
        .mount(server)
        .await;
}

fn ids(artists: &[spotapi::types::Artist]) -> Vec<&str> {
    artists.iter().map(|a| a.id.as_str()).collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_all_items_follows_cursors_in_order() {
    let server = MockServer::start().await;
    mount_followed(&server).await;

    let client = client(&server).await;
    let artists = client
        .following()
        .followed_artists(2)
        .all_items()
        .run()
        .await
        .unwrap();

    assert_eq!(ids(&artists), vec!["a1", "a2", "a3", "a4", "a5"]);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_next_until_exhausted() {
    let server = MockServer::start().await;
    mount_followed(&server).await;

    let client = client(&server).await;
    let mut pager = client.following().followed_artists(2).run().await.unwrap();

    assert_eq!(pager.state(), CursorState::HasNext);
    assert_eq!(pager.total(), Some(5));
    assert_eq!(ids(pager.items()), vec!["a1", "a2"]);

    let second = pager.next().await.unwrap().unwrap();
    assert_eq!(second.items.len(), 2);

    let third = pager.next().await.unwrap().unwrap();
    assert_eq!(third.items[0].id, "a5");
    assert_eq!(pager.state(), CursorState::Exhausted);

    assert!(pager.next().await.unwrap().is_none());
    // no request is made once exhausted
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stream_yields_every_item() {
    let server = MockServer::start().await;
    mount_followed(&server).await;

    let client = client(&server).await;
    let pager = client.following().followed_artists(2).run().await.unwrap();

    let artists: Vec<_> = pager.into_stream().try_collect().await.unwrap();
    assert_eq!(ids(&artists), vec!["a1", "a2", "a3", "a4", "a5"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stream_is_lazy() {
    let server = MockServer::start().await;
    mount_followed(&server).await;

    let client = client(&server).await;
    let pager = client.following().followed_artists(2).run().await.unwrap();

    let first_two: Vec<_> = pager.into_stream().take(2).collect().await;
    assert_eq!(first_two.len(), 2);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_page_fails_the_drain() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me/following"))
        .and(query_param_is_missing("after"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cursor_page(&server, &["a1", "a2"], Some("a2"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/following"))
        .and(query_param("after", "a2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client(&server).await;
    let err = client
        .following()
        .followed_artists(2)
        .all_items()
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Server { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_offset_pages_go_back_and_forth() {
    let server = MockServer::start().await;
    let base = format!("{}/v1/me/top/artists?time_range=short_term&limit=2", server.uri());

    Mock::given(method("GET"))
        .and(path("/v1/me/top/artists"))
        .and(query_param("time_range", "short_term"))
        .and(query_param_is_missing("offset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [artist("a1"), artist("a2")],
            "limit": 2,
            "offset": 0,
            "total": 3,
            "next": format!("{base}&offset=2"),
            "previous": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/top/artists"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [artist("a3")],
            "limit": 2,
            "offset": 2,
            "total": 3,
            "next": null,
            "previous": format!("{base}&offset=0")
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/top/artists"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [artist("a1"), artist("a2")],
            "limit": 2,
            "offset": 0,
            "total": 3,
            "next": format!("{base}&offset=2"),
            "previous": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server).await;
    let mut pager = client
        .personalization()
        .top_artists(TimeRange::ShortTerm, 2)
        .run()
        .await
        .unwrap();

    assert!(pager.previous().await.unwrap().is_none());

    let last = pager.next().await.unwrap().unwrap();
    assert_eq!(last.offset, Some(2));
    assert_eq!(pager.state(), CursorState::Exhausted);

    let back = pager.previous().await.unwrap().unwrap();
    assert_eq!(back.items[1].id, "a2");
    assert_eq!(pager.state(), CursorState::HasNext);
}

mod common;

use common::*;
use serde_json::json;
use teaming_admin::{DashboardStats, Error, Route};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STATS: &str = "/api/stats/dashboard";
const REFRESH: &str = "/users/me/access-token";

fn stats_json() -> serde_json::Value {
    json!({ "totalUsers": 120, "totalTeams": 14, "activeUsers": 80, "newUsersThisMonth": 9 })
}

async fn mount_refresh(server: &MockServer, access: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(REFRESH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": access })))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn valid_token_is_attached_without_refresh() {
    let server = MockServer::start().await;
    let access = valid_token("a");
    Mock::given(method("GET"))
        .and(path(STATS))
        .and(header("authorization", bearer(&access).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_json()))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "unused", 0).await;

    let h = Harness::with_tokens(&server, &access, "r");
    let stats = h.client.stats().dashboard().await.unwrap();
    assert_eq!(
        stats,
        DashboardStats {
            total_users: 120,
            total_teams: 14,
            active_users: 80,
            new_users_this_month: 9
        }
    );
}

#[tokio::test]
async fn expired_token_is_refreshed_before_sending() {
    let server = MockServer::start().await;
    let fresh = valid_token("fresh");
    mount_refresh(&server, &fresh, 1).await;
    Mock::given(method("GET"))
        .and(path(STATS))
        .and(header("authorization", bearer(&fresh).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_json()))
        .expect(1)
        .mount(&server)
        .await;

    let h = Harness::with_tokens(&server, &expired_token(), "r");
    h.client.stats().dashboard().await.unwrap();
    assert_eq!(h.store.get_access_token(), Some(fresh));
}

#[tokio::test]
async fn unauthorized_response_is_retried_exactly_once() {
    let server = MockServer::start().await;
    let old = valid_token("old");
    let new = valid_token("new");

    Mock::given(method("GET"))
        .and(path(STATS))
        .and(header("authorization", bearer(&old).as_str()))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, &new, 1).await;
    Mock::given(method("GET"))
        .and(path(STATS))
        .and(header("authorization", bearer(&new).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_json()))
        .expect(1)
        .mount(&server)
        .await;

    let h = Harness::with_tokens(&server, &old, "r");
    let stats = h.client.stats().dashboard().await.unwrap();
    assert_eq!(stats.total_teams, 14);
    assert!(h.routes().is_empty());
}

#[tokio::test]
async fn second_unauthorized_response_invalidates_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh(&server, &valid_token("new"), 1).await;

    let h = Harness::with_tokens(&server, &valid_token("old"), "r");
    let err = h.client.stats().dashboard().await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired));
    assert_eq!(err.to_string(), "Your session has expired. Please sign in again.");
    assert!(!h.store.has_tokens());
    assert_eq!(h.routes(), vec![Route::Login]);
}

#[tokio::test]
async fn unauthorized_without_refresh_token_does_not_call_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "unused", 0).await;

    let h = Harness::new(&server);
    let err = h.client.stats().dashboard().await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired));
    assert_eq!(h.routes(), vec![Route::Login]);
}

#[tokio::test]
async fn other_statuses_surface_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Forbidden" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "unused", 0).await;

    let h = Harness::with_tokens(&server, &valid_token("a"), "r");
    let err = h.client.stats().dashboard().await.unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(matches!(err, Error::Http(_)));
    assert!(h.store.has_tokens());
}

#[tokio::test]
async fn retry_failing_with_other_status_keeps_session() {
    let server = MockServer::start().await;
    let old = valid_token("old");
    let new = valid_token("new");

    Mock::given(method("GET"))
        .and(path(STATS))
        .and(header("authorization", bearer(&old).as_str()))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_refresh(&server, &new, 1).await;
    Mock::given(method("GET"))
        .and(path(STATS))
        .and(header("authorization", bearer(&new).as_str()))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let h = Harness::with_tokens(&server, &old, "r");
    let err = h.client.stats().dashboard().await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert_eq!(h.store.get_access_token(), Some(new));
    assert!(h.routes().is_empty());
}

use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Db, Feature, FeatureList, Store, PAGE_SIZE};
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn seeded(rows: &[(&str, &str, i64)]) -> Db {
    let mut store = Store::default();
    for (title, description, votes) in rows {
        store.insert(title, description, *votes);
    }
    Arc::new(RwLock::new(store))
}

// --- list ---

#[tokio::test]
async fn list_features_empty() {
    let resp = app().oneshot(empty_request("GET", "/v1/features/")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let list: FeatureList = body_json(resp).await;
    assert_eq!(list.count, 0);
    assert!(!list.next);
    assert!(!list.previous);
    assert!(list.results.is_empty());
}

#[tokio::test]
async fn list_features_orders_by_votes() {
    let db = seeded(&[("Feature 1", "Description 1", 5), ("Feature 2", "Description 2", 3)]);
    let resp = app_with(db).oneshot(empty_request("GET", "/v1/features/")).await.unwrap();

    let list: FeatureList = body_json(resp).await;
    assert_eq!(list.count, 2);
    assert_eq!(list.results[0].title, "Feature 1");
    assert_eq!(list.results[0].votes, 5);
}

#[tokio::test]
async fn list_features_searches_title_and_description() {
    let db = seeded(&[
        ("Dark mode", "Easier on the eyes", 0),
        ("CSV export", "Download reports for the DARK archive", 0),
        ("Offline sync", "Work on planes", 0),
    ]);
    let resp = app_with(db)
        .oneshot(empty_request("GET", "/v1/features/?search=dark"))
        .await
        .unwrap();

    let list: FeatureList = body_json(resp).await;
    assert_eq!(list.count, 2);
    assert!(list.results.iter().all(|f| f.title != "Offline sync"));
}

#[tokio::test]
async fn list_features_paginates() {
    let rows: Vec<(String, i64)> = (0..PAGE_SIZE + 5)
        .map(|i| (format!("Feature number {i}"), i as i64))
        .collect();
    let rows: Vec<(&str, &str, i64)> = rows.iter().map(|(t, v)| (t.as_str(), "x", *v)).collect();
    let db = seeded(&rows);

    let first = app_with(db.clone())
        .oneshot(empty_request("GET", "/v1/features/"))
        .await
        .unwrap();
    let first: FeatureList = body_json(first).await;
    assert_eq!(first.results.len(), PAGE_SIZE);
    assert!(first.next);
    assert!(!first.previous);

    let second = app_with(db.clone())
        .oneshot(empty_request("GET", "/v1/features/?page=2"))
        .await
        .unwrap();
    let second: FeatureList = body_json(second).await;
    assert_eq!(second.results.len(), 5);
    assert!(!second.next);
    assert!(second.previous);

    let beyond = app_with(db)
        .oneshot(empty_request("GET", "/v1/features/?page=3"))
        .await
        .unwrap();
    assert_eq!(beyond.status(), StatusCode::NOT_FOUND);
}

// --- create ---

#[tokio::test]
async fn create_feature_returns_201() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/v1/features/",
            r#"{"title":"Test Feature","description":"This is a test feature description"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let feature: Feature = body_json(resp).await;
    assert_eq!(feature.title, "Test Feature");
    assert_eq!(feature.votes, 0);
}

#[tokio::test]
async fn create_feature_short_title_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/v1/features/", r#"{"title":"Tiny","description":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert!(body.get("title").is_some());
}

#[tokio::test]
async fn create_feature_missing_description_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/v1/features/", r#"{"title":"Long enough"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["description"][0], "This field is required.");
}

#[tokio::test]
async fn create_feature_duplicate_title_returns_400() {
    let db = seeded(&[("Dark mode", "Easier on the eyes", 0)]);
    let resp = app_with(db)
        .oneshot(json_request(
            "POST",
            "/v1/features/",
            r#"{"title":"dark MODE","description":"Again"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["title"][0], "A feature with this title already exists.");
}

// --- get / update / delete on missing ids ---

#[tokio::test]
async fn get_feature_not_found() {
    let resp = app().oneshot(empty_request("GET", "/v1/features/999/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Not found.");
}

#[tokio::test]
async fn get_feature_bad_id_returns_400() {
    let resp = app().oneshot(empty_request("GET", "/v1/features/abc/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_feature_not_found() {
    let resp = app()
        .oneshot(json_request("PATCH", "/v1/features/999/", r#"{"title":"Nope nope"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_feature_not_found() {
    let resp = app().oneshot(empty_request("DELETE", "/v1/features/999/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- votes ---

#[tokio::test]
async fn downvote_never_goes_below_zero() {
    let db = seeded(&[("Dark mode", "Easier on the eyes", 0)]);
    let resp = app_with(db)
        .oneshot(empty_request("POST", "/v1/features/1/downvote/"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["votes"], 0);
    assert_eq!(body["message"], "Feature downvoted successfully");
}

#[tokio::test]
async fn upvote_missing_feature_returns_404() {
    let resp = app()
        .oneshot(empty_request("POST", "/v1/features/5/upvote/"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- ranked views ---

#[tokio::test]
async fn top_voted_respects_limit() {
    let db = seeded(&[
        ("First one", "x", 1),
        ("Second one", "x", 7),
        ("Third one", "x", 4),
    ]);
    let resp = app_with(db)
        .oneshot(empty_request("GET", "/v1/features/top_voted/?limit=2"))
        .await
        .unwrap();

    let features: Vec<Feature> = body_json(resp).await;
    let votes: Vec<i64> = features.iter().map(|f| f.votes).collect();
    assert_eq!(votes, vec![7, 4]);
}

#[tokio::test]
async fn recent_lists_newest_first() {
    let db = seeded(&[("Older item", "x", 9), ("Newer item", "x", 0)]);
    let resp = app_with(db)
        .oneshot(empty_request("GET", "/v1/features/recent/"))
        .await
        .unwrap();

    let features: Vec<Feature> = body_json(resp).await;
    assert_eq!(features[0].title, "Newer item");
    assert_eq!(features.len(), 2);
}

// --- full lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/v1/features/",
            r#"{"title":"Walk the dog","description":"Daily reminder"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Feature = body_json(resp).await;
    let id = created.id;

    // upvote twice
    for expected in [1, 2] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(empty_request("POST", &format!("/v1/features/{id}/upvote/")))
            .await
            .unwrap();
        let body: Value = body_json(resp).await;
        assert_eq!(body["votes"], expected);
        assert_eq!(body["id"], id);
    }

    // update: partial, description only
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            &format!("/v1/features/{id}/"),
            r#"{"description":"Twice a day"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Feature = body_json(resp).await;
    assert_eq!(updated.title, "Walk the dog"); // unchanged
    assert_eq!(updated.description, "Twice a day");
    assert_eq!(updated.votes, 2);

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/v1/features/{id}/")))
        .await
        .unwrap();
    let fetched: Feature = body_json(resp).await;
    assert_eq!(fetched.description, "Twice a day");

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/v1/features/{id}/")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // get after delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/v1/features/{id}/")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

//! In-memory feature voting service speaking the `/v1/features/` contract.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

pub mod error;

use error::{FieldErrors, ServiceError};

pub const PAGE_SIZE: usize = 20;
pub const DEFAULT_LIMIT: usize = 10;
const TITLE_MIN_CHARS: usize = 5;
const TITLE_MAX_CHARS: usize = 200;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Feature {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub votes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeatureList {
    pub count: usize,
    pub next: bool,
    pub previous: bool,
    pub results: Vec<Feature>,
}

/// Body of both create and update. Which fields are required depends on the
/// operation, so presence is checked by the handlers.
#[derive(Debug, Default, Deserialize)]
pub struct FeatureInput {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: i64,
    features: HashMap<i64, Feature>,
}

impl Store {
    /// Insert without validation; used to seed fixtures.
    pub fn insert(&mut self, title: &str, description: &str, votes: i64) -> Feature {
        self.next_id += 1;
        let now = Utc::now();
        let feature = Feature {
            id: self.next_id,
            title: title.to_string(),
            description: description.to_string(),
            votes,
            created_at: now,
            updated_at: now,
        };
        self.features.insert(feature.id, feature.clone());
        feature
    }

    /// Highest votes first, newest first among equals.
    fn ranked(&self) -> Vec<Feature> {
        let mut features: Vec<Feature> = self.features.values().cloned().collect();
        features.sort_by(|a, b| {
            b.votes
                .cmp(&a.votes)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        features
    }

    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        let title = title.to_lowercase();
        self.features
            .values()
            .any(|f| Some(f.id) != except && f.title.to_lowercase() == title)
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Db::default())
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/v1/features/", get(list_features).post(create_feature))
        .route("/v1/features/top_voted/", get(top_voted))
        .route("/v1/features/recent/", get(recent))
        .route(
            "/v1/features/{id}/",
            get(get_feature).patch(update_feature).delete(delete_feature),
        )
        .route("/v1/features/{id}/upvote/", post(upvote))
        .route("/v1/features/{id}/downvote/", post(downvote))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Db::default()).await
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    info!("serving feature API on {}", listener.local_addr()?);
    axum::serve(listener, app_with(db)).await
}

async fn list_features(
    State(db): State<Db>,
    Query(params): Query<ListParams>,
) -> Result<Json<FeatureList>, ServiceError> {
    let store = db.read().await;
    let mut features = store.ranked();

    if let Some(term) = params.search.as_deref().map(str::to_lowercase).filter(|t| !t.is_empty()) {
        features.retain(|f| {
            f.title.to_lowercase().contains(&term) || f.description.to_lowercase().contains(&term)
        });
    }

    let count = features.len();
    let page = params.page.unwrap_or(1);
    let start = page.saturating_sub(1) * PAGE_SIZE;
    if page == 0 || (page > 1 && start >= count) {
        return Err(ServiceError::InvalidPage);
    }

    let results: Vec<Feature> = features.into_iter().skip(start).take(PAGE_SIZE).collect();
    Ok(Json(FeatureList {
        count,
        next: start + results.len() < count,
        previous: page > 1,
        results,
    }))
}

async fn create_feature(
    State(db): State<Db>,
    Json(input): Json<FeatureInput>,
) -> Result<(StatusCode, Json<Feature>), ServiceError> {
    let mut store = db.write().await;
    let (title, description) = validate(&store, &input, None)?;

    let feature = store.insert(
        &title.unwrap_or_default(),
        &description.unwrap_or_default(),
        0,
    );
    info!(id = feature.id, "created feature");
    Ok((StatusCode::CREATED, Json(feature)))
}

async fn get_feature(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Feature>, ServiceError> {
    let store = db.read().await;
    store.features.get(&id).cloned().map(Json).ok_or(ServiceError::NotFound)
}

async fn update_feature(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<FeatureInput>,
) -> Result<Json<Feature>, ServiceError> {
    let mut store = db.write().await;
    if !store.features.contains_key(&id) {
        return Err(ServiceError::NotFound);
    }
    let (title, description) = validate(&store, &input, Some(id))?;

    let feature = store.features.get_mut(&id).ok_or(ServiceError::NotFound)?;
    if let Some(title) = title {
        feature.title = title;
    }
    if let Some(description) = description {
        feature.description = description;
    }
    feature.updated_at = Utc::now();
    Ok(Json(feature.clone()))
}

async fn delete_feature(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    let mut store = db.write().await;
    store
        .features
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ServiceError::NotFound)
}

async fn upvote(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Value>, ServiceError> {
    vote(db, id, 1).await
}

async fn downvote(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Value>, ServiceError> {
    vote(db, id, -1).await
}

/// Counts never drop below zero.
async fn vote(db: Db, id: i64, delta: i64) -> Result<Json<Value>, ServiceError> {
    let mut store = db.write().await;
    let feature = store.features.get_mut(&id).ok_or(ServiceError::NotFound)?;
    feature.votes = (feature.votes + delta).max(0);
    let verb = if delta > 0 { "upvoted" } else { "downvoted" };
    Ok(Json(json!({
        "id": feature.id,
        "votes": feature.votes,
        "message": format!("Feature {verb} successfully"),
    })))
}

async fn top_voted(
    State(db): State<Db>,
    Query(params): Query<LimitParams>,
) -> Json<Vec<Feature>> {
    let store = db.read().await;
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    Json(store.ranked().into_iter().take(limit).collect())
}

async fn recent(State(db): State<Db>, Query(params): Query<LimitParams>) -> Json<Vec<Feature>> {
    let store = db.read().await;
    let mut features: Vec<Feature> = store.features.values().cloned().collect();
    features.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    features.truncate(params.limit.unwrap_or(DEFAULT_LIMIT));
    Json(features)
}

/// Check the fields present in `input`. On create (`existing` is `None`)
/// both fields are required. Returns the trimmed values to store.
fn validate(
    store: &Store,
    input: &FeatureInput,
    existing: Option<i64>,
) -> Result<(Option<String>, Option<String>), ServiceError> {
    let mut errors = FieldErrors::new();
    let creating = existing.is_none();

    let title = input.title.as_deref().map(str::trim);
    match title {
        None if creating => required(&mut errors, "title"),
        None => {}
        Some("") => blank(&mut errors, "title"),
        Some(t) if t.chars().count() < TITLE_MIN_CHARS => errors.entry("title").or_default().push(
            format!("Ensure this field has at least {TITLE_MIN_CHARS} characters."),
        ),
        Some(t) if t.chars().count() > TITLE_MAX_CHARS => errors.entry("title").or_default().push(
            format!("Ensure this field has no more than {TITLE_MAX_CHARS} characters."),
        ),
        Some(t) if store.title_taken(t, existing) => errors
            .entry("title")
            .or_default()
            .push("A feature with this title already exists.".to_string()),
        Some(_) => {}
    }

    let description = input.description.as_deref().map(str::trim);
    match description {
        None if creating => required(&mut errors, "description"),
        Some("") => blank(&mut errors, "description"),
        _ => {}
    }

    if !errors.is_empty() {
        return Err(ServiceError::Validation(errors));
    }
    Ok((title.map(str::to_string), description.map(str::to_string)))
}

fn required(errors: &mut FieldErrors, field: &'static str) {
    errors
        .entry(field)
        .or_default()
        .push("This field is required.".to_string());
}

fn blank(errors: &mut FieldErrors, field: &'static str) {
    errors
        .entry(field)
        .or_default()
        .push("This field may not be blank.".to_string());
}

//! Stateless HTTP request builder and response parser for the feature API.
//!
//! # Design
//! `FeatureClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the HTTP round-trip, keeping the core
//! deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    CreateFeature, Feature, FeatureId, FeatureList, ListQuery, UpdateFeature, VoteDirection,
    VoteResponse,
};

/// Synchronous, stateless client for the feature API.
#[derive(Debug, Clone)]
pub struct FeatureClient {
    base_url: String,
}

impl FeatureClient {
    /// `base_url` includes the API version prefix, e.g. `http://host/v1`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_features(&self, query: &ListQuery) -> HttpRequest {
        let mut params = Vec::new();
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(("search".to_string(), search.to_string()));
        }
        if let Some(page) = query.page {
            params.push(("page".to_string(), page.to_string()));
        }
        self.request(HttpMethod::Get, "/features/".to_string(), params, None)
    }

    pub fn build_get_feature(&self, id: FeatureId) -> HttpRequest {
        self.request(HttpMethod::Get, format!("/features/{id}/"), Vec::new(), None)
    }

    pub fn build_create_feature(&self, input: &CreateFeature) -> Result<HttpRequest, ApiError> {
        let body = to_body(input)?;
        Ok(self.request(HttpMethod::Post, "/features/".to_string(), Vec::new(), Some(body)))
    }

    pub fn build_update_feature(
        &self,
        id: FeatureId,
        input: &UpdateFeature,
    ) -> Result<HttpRequest, ApiError> {
        let body = to_body(input)?;
        Ok(self.request(HttpMethod::Patch, format!("/features/{id}/"), Vec::new(), Some(body)))
    }

    pub fn build_delete_feature(&self, id: FeatureId) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("/features/{id}/"), Vec::new(), None)
    }

    pub fn build_vote(&self, id: FeatureId, direction: VoteDirection) -> HttpRequest {
        let path = format!("/features/{id}/{}/", direction.segment());
        self.request(HttpMethod::Post, path, Vec::new(), None)
    }

    pub fn build_upvote_feature(&self, id: FeatureId) -> HttpRequest {
        self.build_vote(id, VoteDirection::Up)
    }

    pub fn build_downvote_feature(&self, id: FeatureId) -> HttpRequest {
        self.build_vote(id, VoteDirection::Down)
    }

    pub fn build_top_voted(&self, limit: Option<u32>) -> HttpRequest {
        self.request(HttpMethod::Get, "/features/top_voted/".to_string(), limit_param(limit), None)
    }

    pub fn build_recent(&self, limit: Option<u32>) -> HttpRequest {
        self.request(HttpMethod::Get, "/features/recent/".to_string(), limit_param(limit), None)
    }

    pub fn parse_list_features(&self, response: HttpResponse) -> Result<FeatureList, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_get_feature(&self, response: HttpResponse) -> Result<Feature, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_create_feature(&self, response: HttpResponse) -> Result<Feature, ApiError> {
        parse_json(&response, 201)
    }

    pub fn parse_update_feature(&self, response: HttpResponse) -> Result<Feature, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_delete_feature(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    /// Parses both upvote and downvote responses.
    pub fn parse_vote(&self, response: HttpResponse) -> Result<VoteResponse, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_top_voted(&self, response: HttpResponse) -> Result<Vec<Feature>, ApiError> {
        parse_json(&response, 200)
    }

    pub fn parse_recent(&self, response: HttpResponse) -> Result<Vec<Feature>, ApiError> {
        parse_json(&response, 200)
    }

    fn request(
        &self,
        method: HttpMethod,
        path: String,
        query: Vec<(String, String)>,
        body: Option<String>,
    ) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            query,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body,
        }
    }
}

fn limit_param(limit: Option<u32>) -> Vec<(String, String)> {
    limit
        .map(|limit| vec![("limit".to_string(), limit.to_string())])
        .unwrap_or_default()
}

fn to_body<T: Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn parse_json<T: DeserializeOwned>(response: &HttpResponse, expected: u16) -> Result<T, ApiError> {
    check_status(response, expected)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    Err(ApiError::from_status(response.status, &response.body))
}

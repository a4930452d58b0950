//! Executing requests.
//!
//! # Design
//! `Transport` is the seam between the pure build/parse core and the network.
//! `UreqTransport` is the blocking implementation; hosts with their own event
//! loop can skip it and drive the controllers with `FeatureClient` directly.
//! `FeatureService` glues a client and a transport into one method per
//! server operation. It never retries and never caches: every call is a
//! fresh round-trip.

use tracing::debug;

use crate::client::FeatureClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    CreateFeature, Feature, FeatureId, FeatureList, ListQuery, UpdateFeature, VoteResponse,
};

/// Performs one HTTP round-trip.
///
/// Implementations must return 4xx/5xx responses as data; `Err` is reserved
/// for requests that never produced a response.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let HttpRequest {
            method,
            path,
            query,
            headers,
            body,
        } = request;
        debug!(method = method.as_str(), %path, "sending request");

        let body = body.unwrap_or_default();
        let sent = match method {
            HttpMethod::Get => with_parts(self.agent.get(&path), &query, &headers).call(),
            HttpMethod::Delete => with_parts(self.agent.delete(&path), &query, &headers).call(),
            HttpMethod::Post => {
                with_parts(self.agent.post(&path), &query, &headers).send(body.as_bytes())
            }
            HttpMethod::Patch => {
                with_parts(self.agent.patch(&path), &query, &headers).send(body.as_bytes())
            }
        };
        let mut response = sent.map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        debug!(status, %path, "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_parts<B>(
    mut builder: ureq::RequestBuilder<B>,
    query: &[(String, String)],
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (key, value) in query {
        builder = builder.query(key, value);
    }
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// One method per server operation: build, execute, parse.
#[derive(Debug, Clone)]
pub struct FeatureService<T> {
    client: FeatureClient,
    transport: T,
}

impl FeatureService<UreqTransport> {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(FeatureClient::new(&config.base_url), UreqTransport::new())
    }
}

impl<T: Transport> FeatureService<T> {
    pub fn new(client: FeatureClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &FeatureClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn list_features(&self, query: &ListQuery) -> Result<FeatureList, ApiError> {
        let response = self.transport.execute(self.client.build_list_features(query))?;
        self.client.parse_list_features(response)
    }

    pub fn get_feature(&self, id: FeatureId) -> Result<Feature, ApiError> {
        let response = self.transport.execute(self.client.build_get_feature(id))?;
        self.client.parse_get_feature(response)
    }

    pub fn create_feature(&self, input: &CreateFeature) -> Result<Feature, ApiError> {
        let response = self.transport.execute(self.client.build_create_feature(input)?)?;
        self.client.parse_create_feature(response)
    }

    pub fn update_feature(&self, id: FeatureId, input: &UpdateFeature) -> Result<Feature, ApiError> {
        let response = self.transport.execute(self.client.build_update_feature(id, input)?)?;
        self.client.parse_update_feature(response)
    }

    pub fn delete_feature(&self, id: FeatureId) -> Result<(), ApiError> {
        let response = self.transport.execute(self.client.build_delete_feature(id))?;
        self.client.parse_delete_feature(response)
    }

    pub fn upvote_feature(&self, id: FeatureId) -> Result<VoteResponse, ApiError> {
        let response = self.transport.execute(self.client.build_upvote_feature(id))?;
        self.client.parse_vote(response)
    }

    pub fn downvote_feature(&self, id: FeatureId) -> Result<VoteResponse, ApiError> {
        let response = self.transport.execute(self.client.build_downvote_feature(id))?;
        self.client.parse_vote(response)
    }

    pub fn top_voted(&self, limit: Option<u32>) -> Result<Vec<Feature>, ApiError> {
        let response = self.transport.execute(self.client.build_top_voted(limit))?;
        self.client.parse_top_voted(response)
    }

    pub fn recent(&self, limit: Option<u32>) -> Result<Vec<Feature>, ApiError> {
        let response = self.transport.execute(self.client.build_recent(limit))?;
        self.client.parse_recent(response)
    }
}

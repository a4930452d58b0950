//! Domain DTOs for the feature voting API.
//!
//! # Design
//! These mirror the service's JSON schema but are defined independently of
//! the mock-server crate; integration tests catch drift between the two.
//! Server-owned fields (`id`, `votes`, timestamps) only appear on `Feature`,
//! never on the request payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned feature identifier.
pub type FeatureId = i64;

/// A votable feature request as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feature {
    pub id: FeatureId,
    pub title: String,
    pub description: String,
    pub votes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateFeature {
    pub title: String,
    pub description: String,
}

/// Partial update. Only the fields present in the JSON are applied; omitted
/// fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateFeature {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<CreateFeature> for UpdateFeature {
    fn from(input: CreateFeature) -> Self {
        Self {
            title: Some(input.title),
            description: Some(input.description),
        }
    }
}

/// One page of a list query.
///
/// `next` and `previous` only say whether a neighbouring page exists; the
/// client navigates by page number alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureList {
    pub count: u64,
    #[serde(default, deserialize_with = "page_link")]
    pub next: bool,
    #[serde(default, deserialize_with = "page_link")]
    pub previous: bool,
    pub results: Vec<Feature>,
}

/// Body of an upvote/downvote response. `votes` is the authoritative count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteResponse {
    #[serde(default)]
    pub id: Option<FeatureId>,
    pub votes: i64,
    #[serde(default)]
    pub message: Option<String>,
}

/// Parameters of a list query. `None` (or an empty search) is omitted from
/// the request so the server applies its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<u32>,
}

impl ListQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            page: None,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Direction of a vote action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub(crate) fn segment(&self) -> &'static str {
        match self {
            VoteDirection::Up => "upvote",
            VoteDirection::Down => "downvote",
        }
    }
}

/// Accepts either a boolean or a URL-or-null page link.
fn page_link<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Link {
        Flag(bool),
        Url(Option<String>),
    }

    Ok(match Link::deserialize(deserializer)? {
        Link::Flag(flag) => flag,
        Link::Url(url) => url.is_some(),
    })
}

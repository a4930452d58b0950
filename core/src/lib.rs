//! Client core for the feature voting service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern), and keeps a displayed list of
//! features consistent with mutations the server has confirmed.
//!
//! # Design
//! - `FeatureClient` is stateless: one `build_*`/`parse_*` pair per server
//!   operation.
//! - `FeatureService` pairs a client with a `Transport` for callers that just
//!   want one blocking call per operation.
//! - `FeatureListController` and `FeatureForm` are single-owner state
//!   machines. Each user action is split into `begin`/`complete` halves so
//!   the host decides how and when requests run.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod list;
pub mod route;
pub mod transport;
pub mod types;

pub use client::FeatureClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use form::{FeatureForm, FormErrors, FormMode, SubmitError, SubmitOutcome};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use list::{
    ActionError, FeatureListController, LoadOutcome, LoadRequest, LoadState, LoadTicket,
    Reconciliation,
};
pub use route::Route;
pub use transport::{FeatureService, Transport, UreqTransport};
pub use types::{
    CreateFeature, Feature, FeatureId, FeatureList, ListQuery, UpdateFeature, VoteDirection,
    VoteResponse,
};

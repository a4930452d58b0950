//! List reconciliation controller.
//!
//! # Design
//! `FeatureListController` owns the features shown for one query. Every
//! asynchronous action is split in two: `begin_*` returns the request to
//! send, `complete_*` takes whatever came back. The host may keep any number
//! of actions in flight and complete them in any order.
//!
//! - Loads are tagged with a `LoadTicket`; only the latest issued ticket may
//!   replace the list, so a slow earlier response never overwrites a newer
//!   one.
//! - Vote and delete patches are applied by id, only after the server
//!   confirms them. A patch for a row that is no longer present is a no-op.
//! - A row with an outstanding vote or delete rejects further actions until
//!   that one completes.
//! - Failures never escape as `Err` from `complete_*`: the list is left
//!   untouched, the error is logged and handed back inside the outcome.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::client::FeatureClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::route::Route;
use crate::types::{Feature, FeatureId, ListQuery, VoteDirection};

/// Whether the list reflects a settled response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
}

/// Identifies one issued list load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

/// A list request together with the ticket its response must be applied with.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub request: HttpRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The list was replaced by the response.
    Applied,
    /// A newer load was issued after this one; the response was dropped.
    Superseded,
    /// The load failed; the previous contents are still shown.
    Failed(ApiError),
}

/// Result of completing a vote or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The confirmed change was applied to the cached row.
    Applied,
    /// The server confirmed the change but the row is no longer listed.
    Missing,
    /// The server call failed; the list is unchanged.
    Failed(ApiError),
}

/// Why an action could not be started.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("the list is loading")]
    Loading,
    #[error("feature {0} already has a request in flight")]
    Busy(FeatureId),
}

#[derive(Debug, Clone)]
pub struct FeatureListController {
    client: FeatureClient,
    features: Vec<Feature>,
    state: LoadState,
    query: ListQuery,
    has_next: bool,
    has_previous: bool,
    total: u64,
    latest: LoadTicket,
    busy: HashSet<FeatureId>,
}

impl FeatureListController {
    /// Starts in `Loading`; call `reload` for the initial request.
    pub fn new(client: FeatureClient) -> Self {
        Self {
            client,
            features: Vec::new(),
            state: LoadState::Loading,
            query: ListQuery::default(),
            has_next: false,
            has_previous: false,
            total: 0,
            latest: LoadTicket(0),
            busy: HashSet::new(),
        }
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Active search term, empty when unfiltered.
    pub fn search_term(&self) -> &str {
        self.query.search.as_deref().unwrap_or_default()
    }

    /// Total matches reported by the last applied load.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn has_next(&self) -> bool {
        self.has_next
    }

    pub fn has_previous(&self) -> bool {
        self.has_previous
    }

    pub fn is_busy(&self, id: FeatureId) -> bool {
        self.busy.contains(&id)
    }

    /// Switch to a new search term and load its first page.
    pub fn search(&mut self, term: impl Into<String>) -> LoadRequest {
        let term = term.into();
        self.query = ListQuery {
            search: (!term.is_empty()).then_some(term),
            page: None,
        };
        self.issue_load()
    }

    /// Load another page of the current search.
    pub fn go_to_page(&mut self, page: u32) -> LoadRequest {
        self.query.page = Some(page);
        self.issue_load()
    }

    /// Reload the current query, e.g. after returning from a form.
    pub fn reload(&mut self) -> LoadRequest {
        self.issue_load()
    }

    fn issue_load(&mut self) -> LoadRequest {
        self.latest = LoadTicket(self.latest.0 + 1);
        self.state = LoadState::Loading;
        debug!(ticket = self.latest.0, search = self.search_term(), "issuing list load");
        LoadRequest {
            ticket: self.latest,
            request: self.client.build_list_features(&self.query),
        }
    }

    /// Apply the response for `ticket`. Only the latest ticket is applied.
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        outcome: Result<HttpResponse, ApiError>,
    ) -> LoadOutcome {
        if ticket != self.latest {
            debug!(ticket = ticket.0, latest = self.latest.0, "dropping superseded list load");
            return LoadOutcome::Superseded;
        }

        self.state = LoadState::Ready;
        match outcome.and_then(|response| self.client.parse_list_features(response)) {
            Ok(page) => {
                self.total = page.count;
                self.has_next = page.next;
                self.has_previous = page.previous;
                self.features = page.results;
                LoadOutcome::Applied
            }
            Err(err) => {
                warn!(error = %err, "error loading features");
                LoadOutcome::Failed(err)
            }
        }
    }

    pub fn begin_vote(
        &mut self,
        id: FeatureId,
        direction: VoteDirection,
    ) -> Result<HttpRequest, ActionError> {
        self.claim(id)?;
        Ok(self.client.build_vote(id, direction))
    }

    /// Overwrite the row's vote count with the value the server returned.
    pub fn complete_vote(
        &mut self,
        id: FeatureId,
        outcome: Result<HttpResponse, ApiError>,
    ) -> Reconciliation {
        self.busy.remove(&id);
        let vote = match outcome.and_then(|response| self.client.parse_vote(response)) {
            Ok(vote) => vote,
            Err(err) => {
                warn!(id, error = %err, "error voting");
                return Reconciliation::Failed(err);
            }
        };

        match self.features.iter_mut().find(|f| f.id == id) {
            Some(feature) => {
                feature.votes = vote.votes;
                Reconciliation::Applied
            }
            None => {
                debug!(id, "vote confirmed for a feature no longer listed");
                Reconciliation::Missing
            }
        }
    }

    /// Start deleting a row the user has already confirmed.
    pub fn begin_delete(&mut self, id: FeatureId) -> Result<HttpRequest, ActionError> {
        self.claim(id)?;
        Ok(self.client.build_delete_feature(id))
    }

    /// Drop the row once the server confirms the delete.
    pub fn complete_delete(
        &mut self,
        id: FeatureId,
        outcome: Result<HttpResponse, ApiError>,
    ) -> Reconciliation {
        self.busy.remove(&id);
        if let Err(err) = outcome.and_then(|response| self.client.parse_delete_feature(response)) {
            warn!(id, error = %err, "error deleting");
            return Reconciliation::Failed(err);
        }

        let before = self.features.len();
        self.features.retain(|f| f.id != id);
        if self.features.len() == before {
            return Reconciliation::Missing;
        }
        self.total = self.total.saturating_sub(1);
        Reconciliation::Applied
    }

    /// Where the shell should navigate to edit `id`. The change only shows up
    /// here after the edit flow returns and the list is reloaded.
    pub fn edit_route(&self, id: FeatureId) -> Route {
        Route::Edit(id)
    }

    fn claim(&mut self, id: FeatureId) -> Result<(), ActionError> {
        if self.state == LoadState::Loading {
            return Err(ActionError::Loading);
        }
        if !self.busy.insert(id) {
            return Err(ActionError::Busy(id));
        }
        Ok(())
    }
}

//! Create/edit form controller.
//!
//! Checks are advisory: the server stays the authority and its validation
//! messages are surfaced as the form's general error. Only one submission may
//! be outstanding at a time.

use thiserror::Error;
use tracing::warn;

use crate::client::FeatureClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::route::Route;
use crate::types::{CreateFeature, Feature, FeatureId, UpdateFeature};

pub const TITLE_MIN_CHARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(FeatureId),
}

/// Per-field messages plus a general slot for server errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub title: Option<String>,
    pub description: Option<String>,
    pub general: Option<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.general.is_none()
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("form has invalid fields")]
    Invalid(FormErrors),
    #[error("a submission is already in flight")]
    InFlight,
    #[error("the feature has not been loaded yet")]
    NotLoaded,
    #[error(transparent)]
    Encode(#[from] ApiError),
}

/// What happened to a finished submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved; go back to the list, which reloads.
    Saved(Feature),
    /// The server refused; the message is in `errors().general`.
    Rejected(ApiError),
    /// The feature no longer exists.
    Gone,
}

impl SubmitOutcome {
    pub fn navigation(&self) -> Option<Route> {
        match self {
            SubmitOutcome::Saved(_) | SubmitOutcome::Gone => Some(Route::List),
            SubmitOutcome::Rejected(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FeatureForm {
    client: FeatureClient,
    mode: FormMode,
    title: String,
    description: String,
    errors: FormErrors,
    submitting: bool,
    loaded: bool,
}

impl FeatureForm {
    pub fn create(client: FeatureClient) -> Self {
        Self::with_mode(client, FormMode::Create, true)
    }

    /// An edit form starts unloaded; send `load_request` and feed the
    /// response to `apply_loaded` before submitting.
    pub fn edit(client: FeatureClient, id: FeatureId) -> Self {
        Self::with_mode(client, FormMode::Edit(id), false)
    }

    /// Form for the screen behind `route`, if it has one.
    pub fn for_route(client: FeatureClient, route: Route) -> Option<Self> {
        match route {
            Route::Create => Some(Self::create(client)),
            Route::Edit(id) => Some(Self::edit(client, id)),
            Route::List => None,
        }
    }

    fn with_mode(client: FeatureClient, mode: FormMode, loaded: bool) -> Self {
        Self {
            client,
            mode,
            title: String::new(),
            description: String::new(),
            errors: FormErrors::default(),
            submitting: false,
            loaded,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// True while a submission is outstanding; the submit control is disabled.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Editing a field clears its error.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.errors.title = None;
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.errors.description = None;
    }

    pub fn load_request(&self) -> Option<HttpRequest> {
        match self.mode {
            FormMode::Edit(id) => Some(self.client.build_get_feature(id)),
            FormMode::Create => None,
        }
    }

    /// Prefill from the fetched feature. Returns where to navigate when the
    /// feature cannot be loaded.
    pub fn apply_loaded(&mut self, outcome: Result<HttpResponse, ApiError>) -> Option<Route> {
        match outcome.and_then(|response| self.client.parse_get_feature(response)) {
            Ok(feature) => {
                self.title = feature.title;
                self.description = feature.description;
                self.loaded = true;
                None
            }
            Err(err) => {
                warn!(error = %err, "error loading feature");
                Some(Route::List)
            }
        }
    }

    /// Local checks only; the payload is returned exactly as typed.
    pub fn validate(&self) -> Result<CreateFeature, FormErrors> {
        let mut errors = FormErrors::default();

        if self.title.trim().is_empty() {
            errors.title = Some("Title is required".to_string());
        } else if self.title.chars().count() < TITLE_MIN_CHARS {
            errors.title = Some(format!("Title must be at least {TITLE_MIN_CHARS} characters"));
        }

        if self.description.trim().is_empty() {
            errors.description = Some("Description is required".to_string());
        }

        if errors.is_empty() {
            Ok(CreateFeature {
                title: self.title.clone(),
                description: self.description.clone(),
            })
        } else {
            Err(errors)
        }
    }

    /// Validate and build the request. Nothing is built when validation
    /// fails or another submission is outstanding.
    pub fn submit(&mut self) -> Result<HttpRequest, SubmitError> {
        if self.submitting {
            return Err(SubmitError::InFlight);
        }
        if !self.loaded {
            return Err(SubmitError::NotLoaded);
        }

        let payload = match self.validate() {
            Ok(payload) => payload,
            Err(errors) => {
                self.errors = errors.clone();
                return Err(SubmitError::Invalid(errors));
            }
        };
        self.errors = FormErrors::default();

        let request = match self.mode {
            FormMode::Create => self.client.build_create_feature(&payload)?,
            FormMode::Edit(id) => self
                .client
                .build_update_feature(id, &UpdateFeature::from(payload))?,
        };
        self.submitting = true;
        Ok(request)
    }

    pub fn complete(&mut self, outcome: Result<HttpResponse, ApiError>) -> SubmitOutcome {
        self.submitting = false;
        let parsed = outcome.and_then(|response| match self.mode {
            FormMode::Create => self.client.parse_create_feature(response),
            FormMode::Edit(_) => self.client.parse_update_feature(response),
        });

        match parsed {
            Ok(feature) => SubmitOutcome::Saved(feature),
            Err(ApiError::NotFound) => {
                warn!("feature disappeared while editing");
                SubmitOutcome::Gone
            }
            Err(err) => {
                warn!(error = %err, "error saving feature");
                self.errors.general = Some(match &err {
                    ApiError::Validation { message, .. } => message.clone(),
                    other => other.to_string(),
                });
                SubmitOutcome::Rejected(err)
            }
        }
    }
}

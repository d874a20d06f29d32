//! State for the monitored-service catalog.
//!
//! The view never talks to the API itself. Callers perform the request and
//! report the outcome back; failures are logged and the previous state is
//! kept.

use super::form::{ServiceDraft, ValidationErrors};
use crate::error::CliError;
use crate::models::{MonitoredService, ServiceInput};
use std::time::{Duration, Instant};

/// How long a confirmation message stays visible.
pub const FLASH_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub mode: FormMode,
    pub draft: ServiceDraft,
    pub errors: ValidationErrors,
}

/// A validated form ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub mode: FormMode,
    pub input: ServiceInput,
}

#[derive(Debug, Clone)]
struct Flash {
    message: &'static str,
    expires_at: Instant,
}

#[derive(Debug, Default)]
pub struct CatalogView {
    services: Vec<MonitoredService>,
    loading: bool,
    form: Option<FormState>,
    flash: Option<Flash>,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn services(&self) -> &[MonitoredService] {
        &self.services
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn form(&self) -> Option<&FormState> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        self.form.as_mut()
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    pub fn load_succeeded(&mut self, services: Vec<MonitoredService>) {
        tracing::debug!(count = services.len(), "loaded services");
        self.services = services;
        self.loading = false;
    }

    pub fn load_failed(&mut self, err: &CliError) {
        tracing::error!(error = %err, "Failed to load services");
        self.loading = false;
    }

    // ------------------------------------------------------------------------
    // Form
    // ------------------------------------------------------------------------

    pub fn open_create(&mut self) {
        self.form = Some(FormState {
            mode: FormMode::Create,
            draft: ServiceDraft::default(),
            errors: ValidationErrors::default(),
        });
        self.flash = None;
    }

    /// Open the form pre-filled with a service fetched by the caller.
    pub fn open_edit(&mut self, service: &MonitoredService) {
        self.form = Some(FormState {
            mode: FormMode::Edit {
                id: service.id.clone(),
            },
            draft: ServiceDraft::from_service(service),
            errors: ValidationErrors::default(),
        });
        self.flash = None;
    }

    pub fn edit_fetch_failed(&mut self, id: &str, err: &CliError) {
        tracing::error!(service_id = id, error = %err, "Failed to load service for edit");
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.flash = None;
    }

    /// Validate the open form.
    ///
    /// Returns `None` when no form is open or validation failed; in the
    /// latter case the form stays open with its errors filled in.
    pub fn submit(&mut self) -> Option<Submission> {
        let form = self.form.as_mut()?;
        match form.draft.validate() {
            Ok(input) => {
                form.errors = ValidationErrors::default();
                Some(Submission {
                    mode: form.mode.clone(),
                    input,
                })
            }
            Err(errors) => {
                form.errors = errors;
                None
            }
        }
    }

    /// Close the form and show the confirmation. The caller reloads the list.
    pub fn submit_succeeded(&mut self, mode: &FormMode, now: Instant) {
        let message = match mode {
            FormMode::Create => "Service created successfully!",
            FormMode::Edit { .. } => "Service updated successfully!",
        };
        self.form = None;
        self.flash = Some(Flash {
            message,
            expires_at: now + FLASH_DURATION,
        });
    }

    pub fn submit_failed(&mut self, err: &CliError) {
        tracing::error!(error = %err, "Error submitting form");
    }

    /// The confirmation message, if it has not expired at `now`.
    pub fn flash(&self, now: Instant) -> Option<&'static str> {
        self.flash
            .as_ref()
            .filter(|f| now < f.expires_at)
            .map(|f| f.message)
    }

    // ------------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------------

    /// Remove a service locally once the server confirmed the delete.
    pub fn delete_succeeded(&mut self, id: &str) {
        self.services.retain(|s| s.id != id);
    }

    pub fn delete_failed(&mut self, id: &str, err: &CliError) {
        tracing::error!(service_id = id, error = %err, "Failed to delete service");
    }

    pub fn find(&self, id: &str) -> Option<&MonitoredService> {
        self.services.iter().find(|s| s.id == id)
    }
}

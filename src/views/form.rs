//! Create/edit form for a monitored service.
//!
//! A [`ServiceDraft`] holds what the user typed. [`ServiceDraft::validate`]
//! enforces the required fields and turns blank optionals into `None`, so
//! the request body carries `null` rather than empty strings.

use crate::models::{DEFAULT_EXPECTED_RESPONSE_TIME_MS, MonitoredService, ServiceInput};
use std::fmt;

/// Raw form contents. Text fields are kept exactly as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDraft {
    pub name: String,
    pub url: String,
    pub description: String,
    pub service_type: String,
    pub environment: String,
    pub expected_response_time_ms: Option<u32>,
    pub owner_team: String,
    pub contact_email: String,
    pub project_name: String,
    pub max_allowed_downtime_per_month: String,
    pub check_interval: String,
    /// Comma separated, as entered.
    pub tags: String,
}

impl Default for ServiceDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            url: String::new(),
            description: String::new(),
            service_type: String::new(),
            environment: String::new(),
            expected_response_time_ms: Some(DEFAULT_EXPECTED_RESPONSE_TIME_MS),
            owner_team: String::new(),
            contact_email: String::new(),
            project_name: String::new(),
            max_allowed_downtime_per_month: String::new(),
            check_interval: String::new(),
            tags: String::new(),
        }
    }
}

impl ServiceDraft {
    /// Pre-fill from a stored service.
    ///
    /// An absent expected response time falls back to the form default; a
    /// stored `0` is kept as is.
    pub fn from_service(service: &MonitoredService) -> Self {
        Self {
            name: service.name.clone(),
            url: service.url.clone(),
            description: service.description.clone().unwrap_or_default(),
            service_type: service.service_type.clone().unwrap_or_default(),
            environment: service.environment.clone().unwrap_or_default(),
            expected_response_time_ms: service
                .expected_response_time_ms
                .or(Some(DEFAULT_EXPECTED_RESPONSE_TIME_MS)),
            owner_team: service.owner_team.clone().unwrap_or_default(),
            contact_email: service.contact_email.clone().unwrap_or_default(),
            project_name: service.project_name.clone().unwrap_or_default(),
            max_allowed_downtime_per_month: service
                .max_allowed_downtime_per_month
                .clone()
                .unwrap_or_default(),
            check_interval: service.check_interval.clone().unwrap_or_default(),
            tags: service.tags().join(","),
        }
    }

    /// Check required fields and build the request body.
    pub fn validate(&self) -> Result<ServiceInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if self.name.trim().is_empty() {
            errors.push(Field::Name, "Name is required");
        }
        if self.url.trim().is_empty() {
            errors.push(Field::Url, "URL is required");
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ServiceInput {
            name: self.name.trim().to_string(),
            url: self.url.trim().to_string(),
            description: non_blank(&self.description),
            service_type: non_blank(&self.service_type),
            is_active: true,
            environment: non_blank(&self.environment),
            expected_response_time_ms: self.expected_response_time_ms,
            owner_team: non_blank(&self.owner_team),
            contact_email: non_blank(&self.contact_email),
            project_name: non_blank(&self.project_name),
            max_allowed_downtime_per_month: non_blank(&self.max_allowed_downtime_per_month),
            check_interval: non_blank(&self.check_interval),
            tags: parse_tags(&self.tags),
        })
    }
}

/// Split a comma separated tag list, dropping blank entries.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================================================
// Validation errors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Name,
    Url,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Url => "url",
        }
    }
}

/// Inline messages shown next to the offending inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<(Field, &'static str)>,
}

impl ValidationErrors {
    fn push(&mut self, field: Field, message: &'static str) {
        self.errors.push((field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, message)| *message)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.errors.iter().copied()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|(_, m)| *m).collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

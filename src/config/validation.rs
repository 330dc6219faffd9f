//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Guarantee exactly one view per pathname
//! - Keep organism field names clear of the fixed query fields
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DashboardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{DashboardConfig, OrganismConfig};
use crate::filters::DateRange;
use crate::views::codec::RESERVED_FIELDS;
use crate::views::query::GROUP_SEPARATOR;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no organisms configured")]
    NoOrganisms,

    #[error("duplicate organism key: {0}")]
    DuplicateOrganism(String),

    #[error("path segment {segment:?} of {organism} is used by another organism")]
    DuplicatePathSegment { organism: String, segment: String },

    #[error("invalid path segment {segment:?} of {organism}")]
    InvalidPathSegment { organism: String, segment: String },

    #[error("invalid lapis_url {url:?} of {organism}")]
    InvalidLapisUrl { organism: String, url: String },

    #[error("{organism}: {what} must not be empty")]
    Empty { organism: String, what: &'static str },

    #[error("{organism}: invalid field name {field:?}")]
    InvalidFieldName { organism: String, field: String },

    #[error("{organism}: field {field:?} is listed more than once")]
    DuplicateField { organism: String, field: String },

    #[error("{organism}: view {view} is listed more than once")]
    DuplicateView { organism: String, view: String },

    #[error("{organism}: default date range starts before the earliest date")]
    DefaultRangeBeforeEarliest { organism: String },

    #[error("{organism}: default date range ends before it starts")]
    ReversedDefaultRange { organism: String },

    #[error("invalid {what} address: {address}")]
    InvalidAddress { what: &'static str, address: String },

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &DashboardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            what: "server",
            address: config.server.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            what: "metrics",
            address: config.observability.metrics_address.clone(),
        });
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("server.request_timeout_secs"));
    }
    if config.lapis.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("lapis.timeout_secs"));
    }

    if config.organisms.is_empty() {
        errors.push(ValidationError::NoOrganisms);
    }

    let mut keys = HashSet::new();
    let mut segments = HashSet::new();
    for organism in &config.organisms {
        if !keys.insert(organism.key.as_str()) {
            errors.push(ValidationError::DuplicateOrganism(organism.key.clone()));
        }
        if !segments.insert(organism.path_segment.as_str()) {
            errors.push(ValidationError::DuplicatePathSegment {
                organism: organism.key.clone(),
                segment: organism.path_segment.clone(),
            });
        }
        validate_organism(organism, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_organism(organism: &OrganismConfig, errors: &mut Vec<ValidationError>) {
    let name = || organism.key.clone();

    if organism.key.is_empty() {
        errors.push(ValidationError::Empty {
            organism: name(),
            what: "key",
        });
    }

    let segment = &organism.path_segment;
    if segment.is_empty() || segment.contains(['/', '?', '#']) {
        errors.push(ValidationError::InvalidPathSegment {
            organism: name(),
            segment: segment.clone(),
        });
    }

    if Url::parse(&organism.lapis_url).is_err() {
        errors.push(ValidationError::InvalidLapisUrl {
            organism: name(),
            url: organism.lapis_url.clone(),
        });
    }

    if organism.date_field.is_empty() {
        errors.push(ValidationError::Empty {
            organism: name(),
            what: "date_field",
        });
    }
    if organism.location_fields.is_empty() {
        errors.push(ValidationError::Empty {
            organism: name(),
            what: "location_fields",
        });
    }
    if organism.lineage_fields.is_empty() {
        errors.push(ValidationError::Empty {
            organism: name(),
            what: "lineage_fields",
        });
    }
    if organism.views.is_empty() {
        errors.push(ValidationError::Empty {
            organism: name(),
            what: "views",
        });
    }

    // Location and lineage fields share one query namespace and one LAPIS namespace.
    let date_keys = [
        format!("{}From", organism.date_field),
        format!("{}To", organism.date_field),
    ];
    let mut fields = HashSet::new();
    for field in organism.location_fields.iter().chain(&organism.lineage_fields) {
        let invalid = field.is_empty()
            || field.contains([GROUP_SEPARATOR, ',', '&', '='])
            || RESERVED_FIELDS.contains(&field.as_str())
            || date_keys.contains(field);
        if invalid {
            errors.push(ValidationError::InvalidFieldName {
                organism: name(),
                field: field.clone(),
            });
        }
        if !fields.insert(field.as_str()) {
            errors.push(ValidationError::DuplicateField {
                organism: name(),
                field: field.clone(),
            });
        }
    }

    let mut views = HashSet::new();
    for view in &organism.views {
        if !views.insert(*view) {
            errors.push(ValidationError::DuplicateView {
                organism: name(),
                view: view.to_string(),
            });
        }
    }

    // Deserialized ranges bypass `DateRange::custom`.
    if let DateRange::Custom { from, to } = organism.default_date_range {
        if from > to {
            errors.push(ValidationError::ReversedDefaultRange { organism: name() });
        }
        if from < organism.earliest_date {
            errors.push(ValidationError::DefaultRangeBeforeEarliest { organism: name() });
        }
    }
}

// ── Validation layer ──
//
// Every entry point is gated here. Validators collect all problems into a
// list rather than stopping at the first one, so the user fixes everything
// in one pass.

use std::fmt;

use secrecy::ExposeSecret;
use serde::Serialize;
use url::Url;

use crate::config::RouterEndpoint;
use crate::error::CoreError;
use crate::model::interface::InterfaceSpec;
use crate::model::route::RouteRequest;
use crate::parser::parse_peer_config;

/// Longest description the router accepts for an interface.
pub const MAX_DISPLAY_NAME_LEN: usize = 32;

/// A problem with one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Turn a list of field errors into a result.
pub fn ensure_valid(errors: Vec<FieldError>) -> Result<(), CoreError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation { errors })
    }
}

pub fn validate_router_endpoint(endpoint: &RouterEndpoint) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let url = endpoint.url.trim();
    if url.is_empty() {
        errors.push(FieldError::new("url", "router address is required"));
    }
    if endpoint.login.trim().is_empty() {
        errors.push(FieldError::new("login", "login is required"));
    }
    if endpoint.password.expose_secret().is_empty() {
        errors.push(FieldError::new("password", "password is required"));
    }

    if !url.is_empty() {
        match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {}
            Ok(parsed) => errors.push(FieldError::new(
                "url",
                format!("expected an http:// or https:// address, got `{}`", parsed.scheme()),
            )),
            Err(e) => errors.push(FieldError::new(
                "url",
                format!("`{url}` is not an absolute URL ({e})"),
            )),
        }
    }

    errors
}

pub fn validate_interface_spec(spec: &InterfaceSpec) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if let Some(ref name) = spec.display_name {
        let name = name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "name must not be blank"));
        } else if name.chars().count() > MAX_DISPLAY_NAME_LEN {
            errors.push(FieldError::new(
                "name",
                format!("name must be at most {MAX_DISPLAY_NAME_LEN} characters"),
            ));
        }
    }

    if spec.path.as_os_str().is_empty() {
        errors.push(FieldError::new("path", "configuration file is required"));
    } else if let Err(e) = parse_peer_config(&spec.path) {
        errors.push(FieldError::new("path", e.to_string()));
    }

    errors
}

pub fn validate_route_request(request: &RouteRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if request.interface_id.trim().is_empty() {
        errors.push(FieldError::new("interface", "interface id is required"));
    }
    if request.files.is_empty() && request.urls.is_empty() {
        errors.push(FieldError::new(
            "sources",
            "at least one route file or URL is required",
        ));
    }

    errors
}

//! Errors raised by external collaborators.
//!
//! Planner stages never surface these to callers: every stage turns a
//! collaborator failure into its fallback path and logs the cause.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure, including timeouts.
    #[error("request to {service} failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with a non-success status.
    #[error("{service} answered with status {status}")]
    Status { service: &'static str, status: u16 },
    /// The payload could not be interpreted.
    #[error("{service} returned an unusable payload: {reason}")]
    Malformed { service: &'static str, reason: String },
    /// The service has no endpoint or credentials configured.
    #[error("{service} is not configured")]
    NotConfigured { service: &'static str },
}

impl ClientError {
    pub fn http(service: &'static str, source: reqwest::Error) -> Self {
        match source.status() {
            Some(status) => Self::Status {
                service,
                status: status.as_u16(),
            },
            None => Self::Http { service, source },
        }
    }

    pub fn malformed(service: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            service,
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http { source, .. } if source.is_timeout())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

//! Typed failures returned by the remote data gateway.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Gateway failure carrying a human-readable message.
///
/// Messages come from the server payload (`details`, then `error`) when
/// present, else from a per-operation fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Configured base url cannot be used.
    InvalidBaseUrl(String),
    /// Request never completed (connect, timeout, body read).
    Network { message: String, cause: String },
    /// 401: no or expired session.
    Unauthorized(String),
    /// 403: authenticated but not allowed (e.g. editing someone else's article).
    Forbidden(String),
    /// 404.
    NotFound(String),
    /// Any other non-success status.
    Server { status: u16, message: String },
    /// Success status but the body could not be read as expected.
    Decode(String),
}

impl GatewayError {
    /// Maps a non-success HTTP status to a typed error.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::Unauthorized(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::Server { status, message },
        }
    }

    /// Message suitable for showing to a user.
    pub fn user_message(&self) -> &str {
        match self {
            Self::InvalidBaseUrl(message)
            | Self::Network { message, .. }
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Server { message, .. }
            | Self::Decode(message) => message,
        }
    }

    /// HTTP status when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Whether the failure is an authorization refusal.
    pub fn is_permission(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::Forbidden(_))
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBaseUrl(message) => write!(f, "invalid backend url: {message}"),
            Self::Network { message, cause } => write!(f, "{message} ({cause})"),
            Self::Unauthorized(message) => write!(f, "unauthorized: {message}"),
            Self::Forbidden(message) => write!(f, "forbidden: {message}"),
            Self::NotFound(message) => write!(f, "not found: {message}"),
            Self::Server { status, message } => write!(f, "server error {status}: {message}"),
            Self::Decode(message) => write!(f, "unexpected backend response: {message}"),
        }
    }
}

impl Error for GatewayError {}

use crate::transport::TransportError;
use crate::types::content_filter::ContentFilterResults;
use serde::Deserialize;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "builder.endpoint", "request.deployment")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "url_router", "sse_decoder")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Why an in-flight operation stopped before completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller's cancellation token fired.
    Cancelled,
    /// The caller-supplied deadline elapsed.
    DeadlineExceeded,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::Cancelled => f.write_str("operation cancelled"),
            CancelReason::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Unified error type for the client.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Refusing to send credentials over insecure transport ({scheme}://); enable allow_insecure_credentials to override")]
    InsecureTransport { scheme: String },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error("Stream decode error: {message}{}", format_context(.context))]
    Decode {
        message: String,
        context: ErrorContext,
    },

    #[error("Cancelled: {0}")]
    Cancelled(CancelReason),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new decode error with structured context
    pub fn decode_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Decode {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::Validation { context, .. }
            | Error::Decode { context, .. } => Some(context),
            _ => None,
        }
    }

    /// HTTP status code, when the service answered with a failure status.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Response(r) => Some(r.status),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }
}

/// A non-success HTTP response, with whatever structured detail the body carried.
///
/// The body has always been fully read and dropped by the time this is built.
#[derive(Debug, Clone, Error)]
#[error("HTTP {status}{}: {}", .error_code.as_ref().map(|c| format!(" ({})", c)).unwrap_or_default(), .message.as_deref().unwrap_or("no error detail"))]
pub struct ResponseError {
    pub status: u16,
    /// Service error code (e.g. `content_filter`, `429`, `DeploymentNotFound`).
    pub error_code: Option<String>,
    pub message: Option<String>,
    /// Populated when the request was refused by content filtering.
    pub content_filter: Option<ContentFilterResults>,
    pub request_id: Option<String>,
    pub raw_body: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default, deserialize_with = "code_as_string")]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    innererror: Option<InnerError>,
}

#[derive(Debug, Deserialize)]
struct InnerError {
    #[serde(default)]
    content_filter_result: Option<ContentFilterResults>,
}

// Services report `code` as either a string or a number.
fn code_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl ResponseError {
    /// Build from a failed response's status, request id and body text.
    ///
    /// Bodies that are not the service's JSON error shape still produce an error; only
    /// `raw_body` is populated then.
    pub fn from_body(status: u16, request_id: Option<String>, body: String) -> Self {
        let parsed = serde_json::from_str::<ErrorEnvelope>(&body).ok();
        let (error_code, message, content_filter) = match parsed {
            Some(env) => {
                let content_filter = if env.error.code.as_deref() == Some("content_filter") {
                    env.error.innererror.and_then(|i| i.content_filter_result)
                } else {
                    None
                };
                (env.error.code, env.error.message, content_filter)
            }
            None => (None, None, None),
        };
        Self {
            status,
            error_code,
            message,
            content_filter,
            request_id,
            raw_body: body,
        }
    }

    pub fn is_content_filter(&self) -> bool {
        self.error_code.as_deref() == Some("content_filter")
    }
}

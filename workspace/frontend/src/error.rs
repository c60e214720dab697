use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Error types for the dashboard frontend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    /// The request never produced a response (network failure, CORS, ...)
    #[error("Request failed: {0}")]
    Request(String),

    /// The response body was not a valid prediction payload
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The request body could not be encoded
    #[error("Failed to serialize request: {0}")]
    Serialize(String),

    /// The chart library rejected the configuration or is not loaded
    #[error("Chart error: {0}")]
    Chart(String),

    /// A DOM operation failed
    #[error("DOM error: {0}")]
    Dom(String),
}

/// Renders a thrown JS value for logging.
pub(crate) fn describe_js(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failure to acquire or drive the drawing surface. The component reports
/// these as degraded rendering and leaves the region blank.
#[derive(Debug, Error)]
pub enum SurfaceError {
	#[error("no window or document available")]
	NoDocument,
	#[error("2d rendering context is not supported")]
	ContextUnavailable,
	#[error("browser call failed: {0}")]
	Js(String),
}

impl From<JsValue> for SurfaceError {
	fn from(value: JsValue) -> Self {
		SurfaceError::Js(
			value
				.as_string()
				.unwrap_or_else(|| format!("{:?}", value)),
		)
	}
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("malformed mesh config: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("invalid mesh config: {0}")]
	Invalid(&'static str),
}

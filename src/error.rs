use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Fetch itself failed (network down, CORS, aborted) or a browser API threw.
    #[error("request failed: {0}")]
    Js(String),
    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },
    #[error("requests can only be sent from the browser build")]
    Unsupported,
}

#[derive(Debug, Error)]
pub enum BootError {
    #[error("no window or document available")]
    NoWindow,
    #[error("element #{0} not found")]
    MissingElement(&'static str),
    #[error("invalid hunt snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

#[cfg(feature = "csr")]
impl From<wasm_bindgen::JsValue> for ApiError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        ApiError::Js(format!("{:?}", value))
    }
}

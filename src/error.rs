//! Structured error types for pdfmodal.
//!
//! Every failure path maps into one of these variants; none is fatal to the
//! controller, and each clears its associated guard flag before surfacing.

/// All errors that can occur while driving the viewer.
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// The engine rejected the document (network failure, malformed file).
    #[error("document load failed: {0}")]
    Load(String),

    /// A page rasterization failed.
    #[error("page render failed: {0}")]
    Render(String),

    /// Fetching or saving the document bytes failed.
    #[error("download failed: {0}")]
    Download(String),

    /// The print pipeline reported a failure.
    #[error("print failed: {0}")]
    Print(String),

    /// The host passed a malformed configuration object.
    #[error("invalid viewer configuration: {0}")]
    Config(String),

    /// The DOM is unavailable or element construction failed.
    #[error("DOM unavailable: {0}")]
    Dom(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(target_arch = "wasm32")]
impl From<ViewerError> for wasm_bindgen::JsValue {
    fn from(e: ViewerError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}

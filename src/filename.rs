//! Filename derivation for the download affordance.

/// Name used when the URL carries no usable path segment.
pub const FALLBACK_FILE_NAME: &str = "document.pdf";

/// Derive a save-as filename from a document URL: the last path segment with
/// query parameters and fragment stripped. Host-only URLs, trailing slashes,
/// and empty inputs fall back to [`FALLBACK_FILE_NAME`].
pub fn download_file_name(url: &str) -> String {
    let without_query = url.split(['?', '#']).next().unwrap_or_default();
    let path = match without_query.find("://") {
        // Skip the scheme and authority so a bare host never becomes a name.
        Some(idx) => {
            let rest = without_query.get(idx + 3..).unwrap_or_default();
            match rest.find('/') {
                Some(slash) => rest.get(slash + 1..).unwrap_or_default(),
                None => "",
            }
        }
        None => without_query,
    };
    let segment = path.rsplit('/').next().unwrap_or_default();
    if segment.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        segment.to_string()
    }
}

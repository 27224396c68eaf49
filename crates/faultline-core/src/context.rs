use http::Uri;

/// Read-only view of the request that failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// Path and query, as received
    pub url: String,
    /// Path only
    pub path: String,
}

impl RequestInfo {
    pub fn new(url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            path: path.into(),
        }
    }
}

impl From<&Uri> for RequestInfo {
    fn from(uri: &Uri) -> Self {
        let url = uri
            .path_and_query()
            .map_or_else(|| uri.path().to_owned(), ToString::to_string);

        Self {
            url,
            path: uri.path().to_owned(),
        }
    }
}

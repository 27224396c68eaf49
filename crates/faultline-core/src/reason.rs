use http::StatusCode;

/// Standard reason phrase for an HTTP status code
///
/// Codes without a registered phrase (including values outside the
/// three-digit range) map to an empty string rather than an error.
pub fn reason_phrase(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

//! Target URL validation.

use crate::error::AppError;
use url::Url;

/// Longest accepted target URL, in bytes.
pub const MAX_URL_LEN: usize = 2048;

/// Checks that `raw` is an absolute URL with both a scheme and a host.
///
/// Relative references such as `example.com` or `/path` fail to parse
/// without a base and are rejected, as are hostless URLs like `mailto:`.
///
/// # Errors
///
/// Returns [`AppError::Validation`] with code `invalid_url`.
pub fn validate_target_url(raw: &str) -> Result<Url, AppError> {
    if raw.is_empty() {
        return Err(AppError::invalid_url("URL must not be empty", raw));
    }

    if raw.len() > MAX_URL_LEN {
        return Err(AppError::invalid_url(
            format!("URL must be at most {MAX_URL_LEN} bytes"),
            raw,
        ));
    }

    let parsed = Url::parse(raw)
        .map_err(|e| AppError::invalid_url(format!("Invalid URL format: {e}"), raw))?;

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(AppError::invalid_url("URL must include a host", raw));
    }

    Ok(parsed)
}

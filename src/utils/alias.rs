//! Custom alias validation.

use crate::error::AppError;
use regex::Regex;
use std::sync::LazyLock;

pub const MIN_ALIAS_LEN: usize = 3;
pub const MAX_ALIAS_LEN: usize = 20;

static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Aliases that would shadow service routes.
const RESERVED_ALIASES: &[&str] = &["api", "health"];

/// Validates a user-provided custom alias.
///
/// # Rules
///
/// - Length: 3-20 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Cannot be a reserved route name
///
/// # Errors
///
/// Returns [`AppError::Validation`] with code `invalid_alias` if any rule is violated.
pub fn validate_custom_alias(alias: &str) -> Result<(), AppError> {
    let len = alias.chars().count();
    if !(MIN_ALIAS_LEN..=MAX_ALIAS_LEN).contains(&len) {
        return Err(AppError::invalid_alias(
            format!("Custom alias must be {MIN_ALIAS_LEN}-{MAX_ALIAS_LEN} characters"),
            alias,
        ));
    }

    if !ALIAS_REGEX.is_match(alias) {
        return Err(AppError::invalid_alias(
            "Custom alias can only contain letters, digits, hyphens and underscores",
            alias,
        ));
    }

    if is_reserved(alias) {
        return Err(AppError::invalid_alias("This alias is reserved", alias));
    }

    Ok(())
}

/// Returns true if `code` would be shadowed by a service route.
pub fn is_reserved(code: &str) -> bool {
    RESERVED_ALIASES.contains(&code)
}

/// Cheap shape check for an incoming short code.
///
/// Any stored code (generated or alias) is 1-20 characters from the alias
/// alphabet, so anything else can be answered as "not found" without I/O.
pub fn is_well_formed_code(code: &str) -> bool {
    (1..=MAX_ALIAS_LEN).contains(&code.len()) && ALIAS_REGEX.is_match(code)
}

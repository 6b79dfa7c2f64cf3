//! Credential extraction from the operator's cloud session cookie.
//!
//! The cloud console stores its session as a cookie whose value embeds a JSON
//! object; the API access token lives inside that object. [`extract_token`]
//! carves the object out of the surrounding cookie text (brace matching that
//! is aware of string literals and escapes) and pulls the token field.
//!
//! The dashboard is a server process, so instead of a browser cookie jar the
//! raw cookie string comes from the `RMR_COOKIE` environment variable,
//! falling back to the file configured as `[auth] cookie_file`. Extraction
//! failures are fatal to initialization; there is no anonymous mode.

use std::path::Path;

/// Environment variable holding the raw cookie string.
pub const COOKIE_ENV_VAR: &str = "RMR_COOKIE";

/// Why a usable access token could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("no cookie provided: set RMR_COOKIE or [auth] cookie_file")]
    Missing,
    #[error("cookie file {path}: {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("cookie does not contain a JSON object")]
    NoJsonFragment,
    #[error("cookie JSON object is never closed")]
    UnterminatedFragment,
    #[error("cookie JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("cookie JSON carries no access token")]
    NoToken,
}

/// Extract the access token from a raw cookie string.
///
/// Accepts the token under `accessToken` or `access_token`. An empty token
/// counts as absent.
pub fn extract_token(cookie: &str) -> Result<String, CredentialError> {
    let fragment = json_fragment(cookie)?;
    let value: serde_json::Value = serde_json::from_str(fragment)?;
    let token = value
        .get("accessToken")
        .or_else(|| value.get("access_token"))
        .and_then(|v| v.as_str())
        .filter(|t| !t.is_empty())
        .ok_or(CredentialError::NoToken)?;
    Ok(token.to_string())
}

/// Resolve the cookie string from the environment or the configured file,
/// then extract the token from it.
pub fn token_from_env_or_file(cookie_file: Option<&Path>) -> Result<String, CredentialError> {
    let cookie = match std::env::var(COOKIE_ENV_VAR) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => match cookie_file {
            Some(path) => {
                std::fs::read_to_string(path).map_err(|source| CredentialError::Unreadable {
                    path: path.display().to_string(),
                    source,
                })?
            }
            None => return Err(CredentialError::Missing),
        },
    };
    extract_token(&cookie)
}

// ---------------------------------------------------------------------------
// Fragment carving
// ---------------------------------------------------------------------------

/// Carve the first embedded JSON object out of a cookie string.
///
/// Scans from the first `{` to its matching `}`, tracking brace depth.
/// Braces inside JSON string literals do not count, and escaped quotes do
/// not terminate a literal.
fn json_fragment(cookie: &str) -> Result<&str, CredentialError> {
    let start = cookie.find('{').ok_or(CredentialError::NoJsonFragment)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in cookie.as_bytes()[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    // Both ends sit on ASCII braces, so the slice is valid.
                    return Ok(&cookie[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    Err(CredentialError::UnterminatedFragment)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

//! Bearer-token authentication for the protected routes.
//!
//! The token lives in a file under the data directory. It is generated on
//! first start and reused afterwards, so clients can read it once.

use std::path::Path;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use rand::Rng;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Random 64-character hex token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

fn read_token(path: &Path) -> Option<String> {
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn write_token(path: &Path, token: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, token)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

/// Reuse the token stored at `path`, or create and store a new one.
///
/// A token that cannot be written is still returned; it just won't survive
/// a restart.
pub fn load_or_generate_token(path: &Path) -> String {
    if let Some(token) = read_token(path) {
        info!(path = %path.display(), "API token loaded");
        return token;
    }

    let token = generate_token();
    match write_token(path, &token) {
        Ok(()) => info!(path = %path.display(), "API token generated"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to persist API token"),
    }
    token
}

/// Token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;
    let value = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header encoding".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| ApiError::Unauthorized("Expected a Bearer token".to_string()))
}

/// Compare without short-circuiting on the first differing byte.
fn tokens_match(given: &str, expected: &str) -> bool {
    given.len() == expected.len()
        && given
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Reject requests whose bearer token does not match `AppState::api_token`.
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let authorized = match bearer_token(req.headers()) {
        Ok(token) => !state.api_token.is_empty() && tokens_match(token, &state.api_token),
        Err(e) => return e.into_response(),
    };
    if authorized {
        next.run(req).await
    } else {
        ApiError::Unauthorized("Invalid bearer token".to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use tempfile::TempDir;

    #[test]
    fn test_generate_token_shape() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_is_persisted_and_reused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("api_token");

        let first = load_or_generate_token(&path);
        let second = load_or_generate_token(&path);
        assert_eq!(first, second);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_blank_token_file_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("api_token");
        std::fs::write(&path, "  \n").unwrap();
        let token = load_or_generate_token(&path);
        assert_eq!(token.len(), 64);
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc");
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("abc", "abc"));
        assert!(!tokens_match("abd", "abc"));
        assert!(!tokens_match("ab", "abc"));
    }
}

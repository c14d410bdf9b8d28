//! Bearer token extraction from an `Authorization` header.

use crate::error::{token_error, Error, TokenErrorKind};

const BEARER: &str = "Bearer ";

/// Returns the token carried by an `Authorization: Bearer <token>` header.
///
/// The header is split on `"Bearer "` and must produce exactly two parts, the second of which is
/// the token. Anything else, including an empty token, is rejected.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, Error> {
    let header = match authorization {
        Some(header) if !header.is_empty() => header,
        _ => {
            return Err(token_error(
                TokenErrorKind::Missing,
                "no Authorization header",
            ))
        }
    };

    let parts: Vec<&str> = header.split(BEARER).collect();
    match parts.as_slice() {
        [_, token] if !token.is_empty() => Ok(*token),
        _ => Err(token_error(
            TokenErrorKind::Malformed,
            "Authorization header is not a single bearer token",
        )),
    }
}

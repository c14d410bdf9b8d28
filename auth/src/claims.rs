//! Reads the claims carried in the payload segment of a JWT-shaped bearer token.
//!
//! The signature is not verified here; see `ScopeAuthorizer` for how claims are combined with
//! optional introspection.

use crate::error::{token_error, Error, TokenErrorKind};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub scope: Vec<String>,
}

impl Claims {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.iter().any(|granted| granted == scope)
    }
}

/// Decodes the base64url (unpadded) middle segment of `header.payload.signature` as JSON claims.
pub fn decode(token: &str) -> Result<Claims, Error> {
    let payload = token.split('.').nth(1).ok_or_else(|| {
        token_error(
            TokenErrorKind::Malformed,
            "token has no payload segment",
        )
    })?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| token_error(TokenErrorKind::Malformed, &e.to_string()))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| token_error(TokenErrorKind::InvalidClaims, &e.to_string()))
}

use crate::bearer::bearer_token;
use crate::claims;
use crate::introspection::IntrospectionClient;
use async_trait::async_trait;
use log::*;

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No usable credential, or one the authorization server no longer honours.
    Unauthenticated,
    /// A credential without the required capability.
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Denial),
}

/// Decides whether the caller behind an `Authorization` header may publish.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, authorization: Option<&str>) -> Decision;
}

/// Allows callers whose bearer token carries a required scope claim, optionally after
/// confirming with the authorization server that the token is still active.
pub struct ScopeAuthorizer {
    required_scope: String,
    introspection: Option<IntrospectionClient>,
}

impl ScopeAuthorizer {
    pub fn new(required_scope: impl Into<String>) -> Self {
        Self {
            required_scope: required_scope.into(),
            introspection: None,
        }
    }

    pub fn with_introspection(mut self, client: IntrospectionClient) -> Self {
        self.introspection = Some(client);
        self
    }
}

#[async_trait]
impl Authorizer for ScopeAuthorizer {
    async fn authorize(&self, authorization: Option<&str>) -> Decision {
        let token = match bearer_token(authorization) {
            Ok(token) => token,
            Err(e) => {
                info!("Missing or invalid token: {e}");
                return Decision::Deny(Denial::Unauthenticated);
            }
        };

        if let Some(introspection) = &self.introspection {
            if !introspection.is_active(token).await {
                info!("Token rejected by introspection");
                return Decision::Deny(Denial::Unauthenticated);
            }
        }

        match claims::decode(token) {
            Ok(claims) if claims.has_scope(&self.required_scope) => Decision::Allow,
            Ok(_) => {
                info!("Token lacks the {} scope", self.required_scope);
                Decision::Deny(Denial::Forbidden)
            }
            Err(e) => {
                info!("Invalid scope: {e}");
                Decision::Deny(Denial::Forbidden)
            }
        }
    }
}

//! # auth
//!
//! Authorization for the publish endpoint:
//! - Bearer token extraction from the `Authorization` header
//! - Scope claims read from the token payload
//! - Optional token introspection against the authorization server
//! - The `Authorizer` trait the HTTP layer depends on
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth::{Authorizer, Decision, ScopeAuthorizer};
//!
//! let authorizer = ScopeAuthorizer::new("topic-broker-publish");
//! match authorizer.authorize(Some("Bearer <jwt>")).await {
//!     Decision::Allow => { /* publish */ }
//!     Decision::Deny(denial) => { /* 401 or 403 */ }
//! }
//! ```

pub mod authorizer;
pub mod bearer;
pub mod claims;
pub mod error;
pub mod introspection;

// Re-export commonly used types
pub use authorizer::{Authorizer, Decision, Denial, ScopeAuthorizer};
pub use error::{Error, ErrorKind};
pub use introspection::IntrospectionClient;

//! Token verification and claim management: the contract the handlers
//! hold against whatever identity service fronts the deployment.

pub mod jwt;

use async_trait::async_trait;
use thiserror::Error;

/// Claims attached to a verified identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: String,
    pub admin: bool,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("no account for {0}")]
    UnknownUser(String),
    #[error("identity backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Validate a bearer token and return the caller's identity and
    /// claims. Expired, malformed, and badly signed tokens all fail the
    /// same way.
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError>;

    /// Resolve the uid registered for an email address.
    async fn uid_for_email(&self, email: &str) -> Result<String, IdentityError>;

    /// Set `admin: true` on the identity. Takes effect when the token
    /// issuer next mints a token for the user.
    async fn grant_admin(&self, uid: &str) -> Result<(), IdentityError>;
}

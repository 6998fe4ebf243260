//! Identities — the authenticated or guest principal that owns an
//! aggregate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Well-known email of the shared guest pseudo-account. Guest data is
/// namespaced under this value and never validated externally.
pub const GUEST_EMAIL: &str = "guest_user";

/// The principal on whose behalf an aggregate is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Unique key. All per-user storage is namespaced by this value.
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl Identity {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            picture: None,
        }
    }

    /// The synthesized guest identity. Requires no external call.
    pub fn guest() -> Self {
        Self {
            email: GUEST_EMAIL.to_string(),
            name: "Guest".to_string(),
            picture: None,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.email == GUEST_EMAIL
    }
}

/// External identity provider. Once obtained, an identity is treated as
/// valid for the process lifetime; no token refresh is in scope.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Interactive sign-in.
    async fn sign_in(&self) -> Result<Identity, AuthError>;
}

/// Provider that returns a fixed identity. Used by the CLI shell and in
/// tests.
pub struct StaticIdentityProvider {
    identity: Identity,
}

impl StaticIdentityProvider {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn sign_in(&self) -> Result<Identity, AuthError> {
        Ok(self.identity.clone())
    }
}

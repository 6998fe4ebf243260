//! Typed storage-key derivation.
//!
//! Every persisted key in the system is built here. Literal forms match
//! the keys the browser client already wrote, so existing data remains
//! readable.

use std::fmt;

/// A derived storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    /// The "current identity" key. Not namespaced: at most one identity
    /// is signed in at a time.
    pub fn identity() -> Self {
        Self("linkedin_strategy_user".to_string())
    }

    /// The per-identity aggregate (strategy / profile record).
    pub fn profile(email: &str) -> Self {
        Self(format!("linkedin_strategy_{email}"))
    }

    /// The per-identity scheduled-post collection.
    pub fn scheduled_posts(email: &str) -> Self {
        Self(format!("scheduled_posts_{email}"))
    }

    /// Daily follow-task counter.
    pub fn follow_count(email: &str) -> Self {
        Self(format!("followCount_{email}"))
    }

    /// Date of the last follow-tracker visit.
    pub fn last_follow_visit(email: &str) -> Self {
        Self(format!("lastFollowVisit_{email}"))
    }

    /// All keys owned by one identity. Start-over wipes exactly these,
    /// minus the shared identity key.
    pub fn owned_by(email: &str) -> Vec<Self> {
        vec![
            Self::profile(email),
            Self::scheduled_posts(email),
            Self::follow_count(email),
            Self::last_follow_visit(email),
        ]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//! Session reconciler — derives the resume state from whatever is in
//! storage.
//!
//! Runs at process start (and after mutating actions, via the workflow's
//! own writes). Idempotent: reconciling twice over unchanged store
//! contents yields the same `(identity, aggregate, step)` tuple. A parse
//! failure anywhere is recovered locally and never propagates.

use tracing::{info, warn};

use crate::error::StorageError;
use crate::identity::{GUEST_EMAIL, Identity};
use crate::model::{Strategy, UserProfileRecord};
use crate::session::state::{AppStep, SessionState};
use crate::store::{Key, KeyValueStore, Loaded, read_json, write_json};

/// Compute the resume state from the durable store.
///
/// Decision table:
///
/// | identity present? | aggregate present & parses? | step |
/// |---|---|---|
/// | no | — | `Unauthenticated` |
/// | yes | yes | `Dashboard` |
/// | yes | no (absent) | `ProfileInput` |
/// | yes | no (parse error) | `ProfileInput`, corrupted entry discarded |
///
/// With no identity key, a parseable guest aggregate adopts the guest
/// identity (and lands on `Dashboard`).
pub async fn reconcile(store: &dyn KeyValueStore) -> Result<SessionState, StorageError> {
    let mut state = SessionState::new();

    let identity = match read_json::<Identity>(store, &Key::identity()).await? {
        Loaded::Value(identity) => Some(identity),
        Loaded::Corrupt => {
            // The key itself is unreadable: discard it together with the
            // guest aggregate so the fallback below cannot resurrect a
            // session we no longer trust.
            warn!("Corrupt identity key; clearing identity and guest data");
            store.remove(&Key::identity()).await?;
            store.remove(&Key::profile(GUEST_EMAIL)).await?;
            None
        }
        Loaded::Absent => {
            // Guest fallback: an aggregate under the guest namespace means
            // a guest session to resume.
            if load_aggregate(store, GUEST_EMAIL).await?.is_some() {
                Some(Identity::guest())
            } else {
                None
            }
        }
    };

    let Some(identity) = identity else {
        state.step = AppStep::Unauthenticated;
        return Ok(state);
    };

    let aggregate = load_aggregate(store, &identity.email).await?;
    state.step = if aggregate.is_some() {
        AppStep::Dashboard
    } else {
        AppStep::ProfileInput
    };
    state.identity = Some(identity);
    state.aggregate = aggregate;
    Ok(state)
}

/// Load (and if needed migrate) the aggregate stored under `email`.
///
/// Shape handling:
/// - current `UserProfileRecord` → returned as-is;
/// - legacy bare `Strategy` → upgraded, rewritten under the same key, and
///   returned;
/// - anything else → discarded, treated as absent.
pub async fn load_aggregate(
    store: &dyn KeyValueStore,
    email: &str,
) -> Result<Option<UserProfileRecord>, StorageError> {
    let key = Key::profile(email);
    match read_json::<UserProfileRecord>(store, &key).await? {
        Loaded::Value(record) => Ok(Some(record)),
        Loaded::Absent => Ok(None),
        Loaded::Corrupt => match read_json::<Strategy>(store, &key).await? {
            Loaded::Value(strategy) => {
                let record = UserProfileRecord::from_legacy(strategy);
                write_json(store, &key, &record).await?;
                info!(%key, "Upgraded legacy strategy aggregate to profile record");
                Ok(Some(record))
            }
            _ => {
                store.remove(&key).await?;
                Ok(None)
            }
        },
    }
}

//! Restoring saved role snapshots.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::bot::host::ChatHost;
use crate::bot::store::{SnapshotStore, StoreError};

/// Re-applies stored role snapshots after re-validating them against the
/// guild's live role set.
pub struct RoleRestorer {
    store: Arc<SnapshotStore>,
    host: Arc<dyn ChatHost>,
}

impl RoleRestorer {
    pub fn new(store: Arc<SnapshotStore>, host: Arc<dyn ChatHost>) -> Self {
        Self { store, host }
    }

    /// Grant the member every snapshot role that still exists in the guild.
    ///
    /// Best-effort: a missing snapshot, an unreachable store or a failed
    /// grant is logged and skipped, never propagated. Roles deleted from the
    /// guild since the snapshot was taken are dropped, so a partially stale
    /// snapshot still restores its valid subset.
    pub async fn restore(&self, guild_id: u64, user_id: u64) {
        let snapshot = match self.store.get(user_id, guild_id) {
            Ok(s) => s,
            Err(StoreError::NotFound) => {
                info!("No roles saved for user {} in guild {}", user_id, guild_id);
                return;
            }
            Err(e) => {
                warn!("Unable to read saved roles for user {}: {}", user_id, e);
                return;
            }
        };

        let current = match self.host.guild_roles(guild_id).await {
            Ok(roles) => roles,
            Err(e) => {
                warn!("Unable to get roles in guild {}: {}", guild_id, e);
                return;
            }
        };

        let valid: HashSet<u64> = current.iter().map(|r| r.id).collect();
        let mut granted = 0usize;
        for role_id in snapshot.role_ids.iter().filter(|id| valid.contains(id)) {
            match self.host.grant_role(guild_id, user_id, *role_id).await {
                Ok(()) => granted += 1,
                Err(e) => warn!("Unable to restore role {} to user {}: {}", role_id, user_id, e),
            }
        }

        info!("Loaded {} role(s) for user {} in guild {}", granted, user_id, guild_id);
    }
}

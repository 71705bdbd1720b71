//! Share registry: create, validate, revoke, and list share links.

use std::sync::Arc;

use chrono::Duration;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info, warn};

use boxlite_core::config::share::ShareConfig;
use boxlite_core::error::AppError;
use boxlite_core::result::AppResult;
use boxlite_core::traits::clock::Clock;
use boxlite_core::types::id::{FileId, UserId};
use boxlite_entity::share::model::token_hint;
use boxlite_entity::share::{SharePermission, ShareRecord};

use super::link::LinkService;

/// Attempts before giving up on finding an unused token.
const MAX_TOKEN_ATTEMPTS: usize = 4;

/// Token-keyed share records.
///
/// Records are soft-invalidated only. Every mutation of a record runs
/// under its map shard lock, so validation's expiry flip and access count
/// bump are a single atomic step.
#[derive(Debug)]
pub struct ShareRegistry {
    shares: DashMap<String, ShareRecord>,
    links: LinkService,
    clock: Arc<dyn Clock>,
    config: ShareConfig,
}

impl ShareRegistry {
    /// Creates an empty registry.
    pub fn new(config: ShareConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            shares: DashMap::new(),
            links: LinkService::new(config.token_bytes),
            clock,
            config,
        }
    }

    /// Creates a share link for `file_id`. A `ttl_days` of `None` uses the
    /// configured default.
    ///
    /// The file is not looked up here; a link to a missing file fails when
    /// it is opened.
    pub fn create_link(
        &self,
        owner_id: &UserId,
        file_id: &FileId,
        permission: SharePermission,
        ttl_days: Option<i64>,
    ) -> AppResult<ShareRecord> {
        if owner_id.is_blank() {
            return Err(AppError::invalid_argument("Owner ID must be provided"));
        }
        if file_id.is_blank() {
            return Err(AppError::invalid_argument("File ID must be provided"));
        }
        let ttl_days = ttl_days.unwrap_or(self.config.default_ttl_days);
        if ttl_days <= 0 || ttl_days > self.config.max_ttl_days {
            return Err(AppError::invalid_argument(format!(
                "TTL must be between 1 and {} days",
                self.config.max_ttl_days
            )));
        }

        let now = self.clock.now();
        let expires_at = Duration::try_days(ttl_days)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::invalid_argument(format!("TTL of {ttl_days} days is out of range"))
            })?;

        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = self.links.generate_token();
            if let Entry::Vacant(slot) = self.shares.entry(token.clone()) {
                let record = ShareRecord {
                    token,
                    file_id: file_id.clone(),
                    owner_id: owner_id.clone(),
                    permission_level: permission,
                    is_valid: true,
                    created_at: now,
                    expires_at,
                    access_count: 0,
                    revoked_at: None,
                };
                slot.insert(record.clone());

                info!(
                    token = %record.token_hint(),
                    file_id = %file_id,
                    owner_id = %owner_id,
                    permission = %permission,
                    ttl_days,
                    "Share link created"
                );
                return Ok(record);
            }
            warn!("Share token collision, regenerating");
        }

        Err(AppError::internal("Failed to allocate a unique share token"))
    }

    /// Checks a token and counts the access.
    ///
    /// Revocation is reported before expiry. An expired token is
    /// invalidated on first sight and never validates again.
    pub fn validate(&self, token: &str) -> AppResult<ShareRecord> {
        let now = self.clock.now();
        let mut entry = self
            .shares
            .get_mut(token)
            .ok_or_else(|| AppError::not_found("Share link not found"))?;
        let share = entry.value_mut();

        if !share.is_valid {
            debug!(token = %share.token_hint(), "Rejected inactive share");
            return Err(if share.is_revoked() {
                AppError::revoked("Share link has been revoked")
            } else {
                AppError::expired("Share link has expired")
            });
        }

        if share.is_expired_at(now) {
            share.is_valid = false;
            info!(token = %share.token_hint(), "Share link expired");
            return Err(AppError::expired("Share link has expired"));
        }

        share.access_count += 1;
        Ok(share.clone())
    }

    /// Revokes a share. Only its owner may do so; revoking twice is a no-op.
    pub fn revoke(&self, token: &str, requester_id: &UserId) -> AppResult<()> {
        let mut entry = self
            .shares
            .get_mut(token)
            .ok_or_else(|| AppError::not_found("Share link not found"))?;
        let share = entry.value_mut();

        if share.owner_id != *requester_id {
            return Err(AppError::forbidden("You can only revoke your own shares"));
        }

        share.is_valid = false;
        if share.revoked_at.is_none() {
            share.revoked_at = Some(self.clock.now());
            info!(
                token = %share.token_hint(),
                owner_id = %requester_id,
                "Share link revoked"
            );
        }
        Ok(())
    }

    /// The owner's shares that would currently validate, newest first.
    /// Expired records met during the scan are invalidated.
    pub fn list_active(&self, owner_id: &UserId) -> Vec<ShareRecord> {
        let now = self.clock.now();
        let mut active = Vec::new();

        for mut entry in self.shares.iter_mut() {
            let share = entry.value_mut();
            if share.owner_id != *owner_id || !share.is_valid {
                continue;
            }
            if share.is_expired_at(now) {
                share.is_valid = false;
                continue;
            }
            active.push(share.clone());
        }

        active.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.token.cmp(&b.token))
        });
        active
    }

    /// A copy of the record without counting an access.
    pub fn get(&self, token: &str) -> Option<ShareRecord> {
        self.shares.get(token).map(|entry| entry.value().clone())
    }

    /// Number of records ever created, valid or not.
    pub fn len(&self) -> usize {
        self.shares.len()
    }

    /// Whether no share was ever created.
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Invalidates a share whose target is gone. Reported as revoked from
    /// then on.
    pub(crate) fn invalidate(&self, token: &str) {
        if let Some(mut entry) = self.shares.get_mut(token) {
            let share = entry.value_mut();
            share.is_valid = false;
            if share.revoked_at.is_none() {
                share.revoked_at = Some(self.clock.now());
            }
            warn!(
                token = %token_hint(token),
                file_id = %share.file_id,
                "Share invalidated: target file no longer exists"
            );
        }
    }
}

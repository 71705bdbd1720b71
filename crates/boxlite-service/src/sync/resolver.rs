//! Two-version conflict resolution.

use tracing::debug;

use boxlite_core::error::AppError;
use boxlite_core::result::AppResult;
use boxlite_entity::sync::{ConflictStatus, ResolvedVersion, VersionDescriptor};

/// Decides which of two descriptors of the same file survives.
///
/// Equal versions keep `local` untouched. Otherwise the side with the
/// strictly later `modified_at` wins, a missing timestamp counting as
/// older than any other; exact ties go to `remote`. The winner is
/// annotated with the loser's version.
pub fn resolve(
    local: &VersionDescriptor,
    remote: &VersionDescriptor,
) -> AppResult<ResolvedVersion> {
    let local_version = local
        .version
        .as_ref()
        .ok_or_else(|| AppError::missing_field("version"))?;
    let remote_version = remote
        .version
        .as_ref()
        .ok_or_else(|| AppError::missing_field("version"))?;

    if local_version == remote_version {
        return Ok(ResolvedVersion::unchanged(local.clone()));
    }

    // `None` orders before every `Some`.
    let (winner, status, losing_version) = if local.modified_at > remote.modified_at {
        (local, ConflictStatus::ResolvedKeepLocal, remote_version)
    } else {
        (remote, ConflictStatus::ResolvedKeepRemote, local_version)
    };

    debug!(
        file_id = %local.file_id,
        local_version = %local_version,
        remote_version = %remote_version,
        status = %status,
        "Resolved version conflict"
    );

    Ok(ResolvedVersion {
        descriptor: winner.clone(),
        conflict_status: Some(status),
        conflicting_version: Some(losing_version.clone()),
    })
}

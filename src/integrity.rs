//! Referential integrity fix-up for deletions: dependent comments get
//! their parent reference nulled out before the parent record is removed.
//! Comments themselves are never cascade-deleted.
//!
//! The two steps are not wrapped in a transaction; a crash in between
//! leaves comments already detached, which is the benign side of the
//! window. The in-memory backend runs each step under its own write lock.

use crate::models::Id;
use crate::repo::{Repo, RepoResult};

/// Detach every comment referencing the movie, then delete it. Returns
/// whether the movie record existed.
pub async fn delete_movie_cascade(repo: &dyn Repo, id: Id) -> RepoResult<bool> {
    let detached = repo.detach_comments_from_movie(id).await?;
    if detached > 0 {
        tracing::debug!(%id, detached, "detached comments before movie delete");
    }
    repo.delete_movie(id).await
}

/// Detach every comment referencing the user, then delete it.
pub async fn delete_user_cascade(repo: &dyn Repo, id: Id) -> RepoResult<bool> {
    let detached = repo.detach_comments_from_user(id).await?;
    if detached > 0 {
        tracing::debug!(%id, detached, "detached comments before user delete");
    }
    repo.delete_user(id).await
}

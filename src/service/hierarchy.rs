//! Parent link checks for celestial bodies.

use crate::error::AppError;
use crate::store::CatalogStore;

/// Longest ancestor chain walked before giving up.
pub const MAX_DEPTH: usize = 64;

/// Reject `parent_id` for `body_id` if it is missing, is the body itself, or has the body
/// among its ancestors.
pub async fn ensure_acyclic(
    store: &dyn CatalogStore,
    body_id: i64,
    parent_id: i64,
) -> Result<(), AppError> {
    if parent_id == body_id {
        return Err(AppError::BadRequest(
            "a celestial body cannot be its own parent".into(),
        ));
    }
    let mut current = parent_id;
    for _ in 0..MAX_DEPTH {
        match store.body_parent(current).await? {
            None if current == parent_id => {
                return Err(AppError::NotFound(format!(
                    "parent celestial body {} not found",
                    parent_id
                )));
            }
            None | Some(None) => return Ok(()),
            Some(Some(next)) if next == body_id => {
                return Err(AppError::BadRequest(format!(
                    "setting parent {} would create a cycle",
                    parent_id
                )));
            }
            Some(Some(next)) => current = next,
        }
    }
    Err(AppError::BadRequest(format!(
        "parent chain deeper than {} levels",
        MAX_DEPTH
    )))
}

//! Session wishlist.

use crate::error::{AppResult, Conflict};
use crate::models::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistOp {
    Add,
    Remove,
}

/// Add or remove a session key on a loaded profile.
///
/// Adding a key that is already present is a conflict. Removing an absent
/// key returns `false`.
pub fn apply_wishlist(profile: &mut Profile, session_key: &str, op: WishlistOp) -> AppResult<bool> {
    match op {
        WishlistOp::Add => {
            if profile.has_wishlisted(session_key) {
                return Err(Conflict::AlreadyInWishlist.into());
            }
            profile.sessions_wishlist.push(session_key.to_string());
            Ok(true)
        }
        WishlistOp::Remove => {
            let before = profile.sessions_wishlist.len();
            profile.sessions_wishlist.retain(|k| k != session_key);
            Ok(profile.sessions_wishlist.len() != before)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn add_twice_conflicts() {
        let mut profile = Profile::new("ada@example.com", "ada", "ada@example.com");
        assert!(apply_wishlist(&mut profile, "s1", WishlistOp::Add).unwrap());

        let err = apply_wishlist(&mut profile, "s1", WishlistOp::Add).unwrap_err();
        assert!(matches!(err, AppError::Conflict(Conflict::AlreadyInWishlist)));
        assert_eq!(profile.sessions_wishlist, vec!["s1".to_string()]);
    }

    #[test]
    fn remove_reports_whether_anything_changed() {
        let mut profile = Profile::new("ada@example.com", "ada", "ada@example.com");
        apply_wishlist(&mut profile, "s1", WishlistOp::Add).unwrap();

        assert!(!apply_wishlist(&mut profile, "s2", WishlistOp::Remove).unwrap());
        assert!(apply_wishlist(&mut profile, "s1", WishlistOp::Remove).unwrap());
        assert!(profile.sessions_wishlist.is_empty());
    }
}

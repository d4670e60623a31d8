use super::domain::ListingId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Listings the user has starred, keyed by identity only.
///
/// Updates return a new set; callers replace their copy wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet {
    ids: BTreeSet<ListingId>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the membership of `id`.
    #[must_use]
    pub fn toggle(&self, id: &ListingId) -> Self {
        let mut ids = self.ids.clone();
        if !ids.remove(id) {
            ids.insert(id.clone());
        }
        Self { ids }
    }

    pub fn is_favorite(&self, id: &ListingId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListingId> {
        self.ids.iter()
    }
}

impl FromIterator<ListingId> for FavoriteSet {
    fn from_iter<T: IntoIterator<Item = ListingId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

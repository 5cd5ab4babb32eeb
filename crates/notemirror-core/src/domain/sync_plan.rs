//! Local and remote snapshots, and the plan computed from them
//!
//! A [`SyncPlan`] is derived fresh on every reconciliation from a
//! [`LocalFileSet`] and a [`RemoteFileIndex`]. Nothing here touches the
//! filesystem or the network.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use super::newtypes::RemoteId;

/// Names of the synchronizable files in the local directory
pub type LocalFileSet = BTreeSet<String>;

/// Remote object name to ID mapping for one folder
///
/// One entry per distinct name. When the store reports the same name twice,
/// the entry seen last replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteFileIndex {
    entries: BTreeMap<String, RemoteId>,
}

impl RemoteFileIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; a duplicate name shadows the earlier ID
    pub fn insert(&mut self, name: String, id: RemoteId) {
        if let Some(shadowed) = self.entries.get(&name) {
            warn!(
                name = %name,
                shadowed = %shadowed,
                kept = %id,
                "Duplicate remote name, keeping the last listed object"
            );
        }
        self.entries.insert(name, id);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RemoteId> {
        self.entries.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, RemoteId> {
        self.entries.iter()
    }
}

impl FromIterator<(String, RemoteId)> for RemoteFileIndex {
    fn from_iter<I: IntoIterator<Item = (String, RemoteId)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (name, id) in iter {
            index.insert(name, id);
        }
        index
    }
}

impl<'a> IntoIterator for &'a RemoteFileIndex {
    type Item = (&'a String, &'a RemoteId);
    type IntoIter = btree_map::Iter<'a, String, RemoteId>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Operations needed to converge the remote folder onto the local directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Every local file; each one is created or overwritten
    pub to_upsert: Vec<String>,
    /// Remote objects with no local counterpart, in name order
    pub to_delete: Vec<(String, RemoteId)>,
}

impl SyncPlan {
    /// Diff the two snapshots
    ///
    /// Every local name is upserted (there is no content comparison); every
    /// remote name absent locally is deleted.
    #[must_use]
    pub fn compute(local: &LocalFileSet, remote: &RemoteFileIndex) -> Self {
        let to_upsert = local.iter().cloned().collect();
        let to_delete = remote
            .iter()
            .filter(|(name, _)| !local.contains(name.as_str()))
            .map(|(name, id)| (name.clone(), id.clone()))
            .collect();

        Self {
            to_upsert,
            to_delete,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_upsert.is_empty() && self.to_delete.is_empty()
    }
}

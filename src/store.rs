//! Entity store: typed accessors over the persisted folder collection,
//! per-folder conversation lists, and the standalone list.
//!
//! DESIGN
//! ======
//! Every collection lives under its own key (see [`crate::consts`]) and is
//! rewritten whole on mutation. Folder conversation counts are a cache of
//! the matching list's length; every list write is followed by a count sync
//! for that folder, so an observer never sees a count that disagrees with a
//! completed list write. If the sync fails the list write is undone.
//!
//! A conversation id lives in at most one list. Adding to a list evicts the
//! id from every other list first.
//!
//! ERROR HANDLING
//! ==============
//! Unknown folder or conversation ids are no-ops reported as `Ok(false)`.
//! Backend failures propagate as `StorageError`. A stored value that does
//! not decode is logged and read as empty.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::consts::{FOLDER_CONVERSATIONS_PREFIX, FOLDERS_KEY, STANDALONE_KEY};
use crate::model::{Container, ConversationRef, Folder};
use crate::storage::{KeyValueStore, StorageError};

/// Storage key of a folder's conversation list.
#[must_use]
pub fn folder_key(folder_id: &str) -> String {
    format!("{FOLDER_CONVERSATIONS_PREFIX}{folder_id}")
}

/// Storage key of a container's conversation list.
#[must_use]
pub fn container_key(container: &Container) -> String {
    match container {
        Container::Folder(id) => folder_key(id),
        Container::Standalone => STANDALONE_KEY.to_string(),
    }
}

/// Clamp a possibly negative position into `[0, max]`.
#[must_use]
pub fn clamp_index(position: i64, max: usize) -> usize {
    if position <= 0 {
        return 0;
    }
    usize::try_from(position).map_or(max, |p| p.min(max))
}

/// Insert `conv` into `list`, or move it if already present.
///
/// Absent: inserted at `position` clamped to `[0, len]`, or appended.
/// Present: moved to `position` clamped to `[0, len - 1]` when that differs
/// from its index; otherwise untouched. Returns whether the list changed.
pub fn upsert_at(list: &mut Vec<ConversationRef>, conv: ConversationRef, position: Option<i64>) -> bool {
    match list.iter().position(|c| c.id == conv.id) {
        Some(_) => match position {
            Some(pos) => move_to(list, &conv.id, pos),
            None => false,
        },
        None => {
            let index = position.map_or(list.len(), |pos| clamp_index(pos, list.len()));
            list.insert(index, conv);
            true
        }
    }
}

/// Move the entry with `conv_id` to `position` clamped to `[0, len - 1]`.
///
/// Stable single-element move: remove, then reinsert. Returns whether the
/// list changed.
pub fn move_to(list: &mut Vec<ConversationRef>, conv_id: &str, position: i64) -> bool {
    let Some(current) = list.iter().position(|c| c.id == conv_id) else {
        return false;
    };
    let target = clamp_index(position, list.len().saturating_sub(1));
    if target == current {
        return false;
    }
    let conv = list.remove(current);
    list.insert(target, conv);
    true
}

/// Typed CRUD and ordering over a [`KeyValueStore`].
pub struct EntityStore<S> {
    backend: S,
}

impl<S: KeyValueStore> EntityStore<S> {
    #[must_use]
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    // --- Folders ---

    /// All folders in display order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read fails.
    pub async fn folders(&self) -> Result<Vec<Folder>, StorageError> {
        self.load_list(FOLDERS_KEY).await
    }

    /// Look up one folder by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read fails.
    pub async fn folder(&self, folder_id: &str) -> Result<Option<Folder>, StorageError> {
        Ok(self.folders().await?.into_iter().find(|f| f.id == folder_id))
    }

    /// Append a new, empty, collapsed folder.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn create_folder(&self, name: &str) -> Result<Folder, StorageError> {
        let mut folders = self.folders().await?;
        let folder = Folder::new(name);
        folders.push(folder.clone());
        self.save_list(FOLDERS_KEY, &folders).await?;
        debug!(folder_id = %folder.id, "folder created");
        Ok(folder)
    }

    /// Remove a folder and its conversation list.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn delete_folder(&self, folder_id: &str) -> Result<bool, StorageError> {
        let mut folders = self.folders().await?;
        let before = folders.len();
        folders.retain(|f| f.id != folder_id);
        if folders.len() == before {
            return Ok(false);
        }
        self.save_list(FOLDERS_KEY, &folders).await?;
        self.backend.remove(&folder_key(folder_id)).await?;
        debug!(folder_id, "folder deleted");
        Ok(true)
    }

    /// Rename a folder in place.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn rename_folder(&self, folder_id: &str, name: &str) -> Result<bool, StorageError> {
        self.update_folders(|folders| {
            let Some(folder) = folders.iter_mut().find(|f| f.id == folder_id) else {
                return false;
            };
            if folder.name == name {
                return false;
            }
            folder.name = name.to_string();
            true
        })
        .await
    }

    /// Flip a folder's expanded flag. Returns the new state, or `None` for an
    /// unknown folder.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn toggle_folder_expand(&self, folder_id: &str) -> Result<Option<bool>, StorageError> {
        let mut folders = self.folders().await?;
        let Some(folder) = folders.iter_mut().find(|f| f.id == folder_id) else {
            return Ok(None);
        };
        folder.expanded = !folder.expanded;
        let expanded = folder.expanded;
        self.save_list(FOLDERS_KEY, &folders).await?;
        Ok(Some(expanded))
    }

    /// Collapse every folder.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn collapse_all_folders(&self) -> Result<bool, StorageError> {
        self.update_folders(|folders| {
            let mut changed = false;
            for folder in folders.iter_mut().filter(|f| f.expanded) {
                folder.expanded = false;
                changed = true;
            }
            changed
        })
        .await
    }

    /// Recompute every folder's cached count from its list.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn recount_folders(&self) -> Result<bool, StorageError> {
        let mut folders = self.folders().await?;
        let mut changed = false;
        for folder in &mut folders {
            let len = self.load_list::<ConversationRef>(&folder_key(&folder.id)).await?.len();
            if folder.conversation_count != len {
                folder.conversation_count = len;
                changed = true;
            }
        }
        if changed {
            self.save_list(FOLDERS_KEY, &folders).await?;
        }
        Ok(changed)
    }

    // --- Folder conversation lists ---

    /// The conversation list of a folder, in display order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read fails.
    pub async fn conversations_in_folder(&self, folder_id: &str) -> Result<Vec<ConversationRef>, StorageError> {
        self.load_list(&folder_key(folder_id)).await
    }

    /// Whether `conv_id` is filed in `folder_id`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read fails.
    pub async fn is_conversation_in_folder(&self, folder_id: &str, conv_id: &str) -> Result<bool, StorageError> {
        Ok(self.conversations_in_folder(folder_id).await?.iter().any(|c| c.id == conv_id))
    }

    /// File `conv` in a folder at `position` (or at the end).
    ///
    /// An id already in the folder is moved when `position` names a
    /// different index and left alone otherwise. An id filed elsewhere is
    /// removed from that list first. Unknown folders are a no-op.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn add_conversation_to_folder(
        &self,
        folder_id: &str,
        conv: ConversationRef,
        position: Option<i64>,
    ) -> Result<bool, StorageError> {
        self.add_conversation(&Container::Folder(folder_id.to_string()), conv, position).await
    }

    /// Drop `conv_id` from a folder's list.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn remove_conversation_from_folder(&self, folder_id: &str, conv_id: &str) -> Result<bool, StorageError> {
        self.remove_conversation(&Container::Folder(folder_id.to_string()), conv_id).await
    }

    /// Move `conv_id` within its folder to `new_position`, clamped to the
    /// list bounds.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn reorder_conversation(
        &self,
        folder_id: &str,
        conv_id: &str,
        new_position: i64,
    ) -> Result<bool, StorageError> {
        self.reorder(&Container::Folder(folder_id.to_string()), conv_id, new_position).await
    }

    // --- Standalone list ---

    /// The standalone list, in display order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read fails.
    pub async fn standalone_conversations(&self) -> Result<Vec<ConversationRef>, StorageError> {
        self.load_list(STANDALONE_KEY).await
    }

    /// Same contract as [`Self::add_conversation_to_folder`] on the standalone list.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn add_standalone_conversation(
        &self,
        conv: ConversationRef,
        position: Option<i64>,
    ) -> Result<bool, StorageError> {
        self.add_conversation(&Container::Standalone, conv, position).await
    }

    /// Drop `conv_id` from the standalone list.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn remove_standalone_conversation(&self, conv_id: &str) -> Result<bool, StorageError> {
        self.remove_conversation(&Container::Standalone, conv_id).await
    }

    /// Move `conv_id` within the standalone list.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn reorder_standalone_conversation(&self, conv_id: &str, new_position: i64) -> Result<bool, StorageError> {
        self.reorder(&Container::Standalone, conv_id, new_position).await
    }

    // --- Container-generic operations ---

    /// The list of any container.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read fails.
    pub async fn conversations(&self, container: &Container) -> Result<Vec<ConversationRef>, StorageError> {
        self.load_list(&container_key(container)).await
    }

    /// Where `conv_id` is filed and at which index.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read fails.
    pub async fn locate_conversation(&self, conv_id: &str) -> Result<Option<(Container, usize)>, StorageError> {
        for folder in self.folders().await? {
            let list = self.conversations_in_folder(&folder.id).await?;
            if let Some(index) = list.iter().position(|c| c.id == conv_id) {
                return Ok(Some((Container::Folder(folder.id), index)));
            }
        }
        let standalone = self.standalone_conversations().await?;
        Ok(standalone
            .iter()
            .position(|c| c.id == conv_id)
            .map(|index| (Container::Standalone, index)))
    }

    /// Insert or move `conv` in `container`, evicting it from other lists.
    /// Unknown folders are a no-op.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn add_conversation(
        &self,
        container: &Container,
        conv: ConversationRef,
        position: Option<i64>,
    ) -> Result<bool, StorageError> {
        if let Container::Folder(folder_id) = container {
            if self.folder(folder_id).await?.is_none() {
                return Ok(false);
            }
        }
        let conv_id = conv.id.clone();
        let evicted = self.evict_elsewhere(&conv_id, container).await?;
        let mut list = self.conversations(container).await?;
        if !upsert_at(&mut list, conv, position) {
            return Ok(evicted);
        }
        self.write_list(container, &list).await?;
        debug!(%container, conversation_id = %conv_id, "conversation filed");
        Ok(true)
    }

    /// Remove `conv_id` from `container`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn remove_conversation(&self, container: &Container, conv_id: &str) -> Result<bool, StorageError> {
        let mut list = self.conversations(container).await?;
        let before = list.len();
        list.retain(|c| c.id != conv_id);
        if list.len() == before {
            return Ok(false);
        }
        self.write_list(container, &list).await?;
        debug!(%container, conversation_id = conv_id, "conversation removed");
        Ok(true)
    }

    /// Move `conv_id` within `container`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend read or write fails.
    pub async fn reorder(&self, container: &Container, conv_id: &str, new_position: i64) -> Result<bool, StorageError> {
        let mut list = self.conversations(container).await?;
        if !move_to(&mut list, conv_id, new_position) {
            return Ok(false);
        }
        self.write_list(container, &list).await?;
        Ok(true)
    }

    // --- Internals ---

    async fn evict_elsewhere(&self, conv_id: &str, keep: &Container) -> Result<bool, StorageError> {
        let mut others: Vec<Container> = self
            .folders()
            .await?
            .into_iter()
            .map(|f| Container::Folder(f.id))
            .collect();
        others.push(Container::Standalone);

        let mut changed = false;
        for container in others.iter().filter(|c| *c != keep) {
            changed |= self.remove_conversation(container, conv_id).await?;
        }
        Ok(changed)
    }

    /// Persist a container list, then bring the folder's cached count in line.
    ///
    /// When the count cannot be written the list key is put back to what it
    /// held before, so list and count never disagree.
    async fn write_list(&self, container: &Container, list: &[ConversationRef]) -> Result<(), StorageError> {
        let key = container_key(container);
        let Container::Folder(folder_id) = container else {
            return self.save_list(&key, list).await;
        };

        let previous = self.backend.get(&key).await?;
        self.save_list(&key, list).await?;
        let len = list.len();
        let synced = self
            .update_folders(|folders| match folders.iter_mut().find(|f| f.id == *folder_id) {
                Some(folder) if folder.conversation_count != len => {
                    folder.conversation_count = len;
                    true
                }
                _ => false,
            })
            .await;
        if let Err(e) = synced {
            warn!(%folder_id, error = %e, "count sync failed; restoring list");
            let restored = match previous {
                Some(value) => self.backend.set(&key, value).await,
                None => self.backend.remove(&key).await,
            };
            if let Err(restore) = restored {
                warn!(%folder_id, error = %restore, "list restore failed");
            }
            return Err(e);
        }
        Ok(())
    }

    async fn update_folders<F>(&self, mutate: F) -> Result<bool, StorageError>
    where
        F: FnOnce(&mut Vec<Folder>) -> bool,
    {
        let mut folders = self.folders().await?;
        if !mutate(&mut folders) {
            return Ok(false);
        }
        self.save_list(FOLDERS_KEY, &folders).await?;
        Ok(true)
    }

    async fn load_list<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StorageError> {
        let Some(value) = self.backend.get(key).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_value(value) {
            Ok(list) => Ok(list),
            Err(e) => {
                warn!(key, error = %e, "discarding undecodable stored list");
                Ok(Vec::new())
            }
        }
    }

    async fn save_list<T: Serialize>(&self, key: &str, list: &[T]) -> Result<(), StorageError> {
        self.backend.set(key, serde_json::to_value(list)?).await
    }
}
